//! Built-in domain monitors.
//!
//! Each domain is a thin wrapper over [`Monitor`](crate::Monitor) with a
//! built-in [`DomainProfile`], a typed category enum and its entity record
//! operations.

use crate::profile::DomainProfile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a typed category enum whose variants map to profile names.
macro_rules! categories {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every category, in profile order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Category name as used by the profile and in samples.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Declares a domain monitor wrapping [`Monitor`](crate::Monitor) with the
/// module's `profile()` and the construction, metric and summary methods
/// every domain shares. Entity operations go in a separate `impl` block.
macro_rules! domain_monitor {
    ($(#[$meta:meta])* $name:ident, $category:ty) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            monitor: $crate::monitor::Monitor,
        }

        impl $name {
            pub fn new() -> $crate::error::Result<Self> {
                Self::with_config($crate::config::MonitorConfig::default())
            }

            pub fn with_config(config: $crate::config::MonitorConfig) -> $crate::error::Result<Self> {
                Ok(Self {
                    monitor: $crate::monitor::Monitor::with_config(profile(), config)?,
                })
            }

            pub fn with_clock(self, clock: std::sync::Arc<dyn $crate::clock::Clock>) -> Self {
                Self {
                    monitor: self.monitor.with_clock(clock),
                }
            }

            pub fn monitor(&self) -> &$crate::monitor::Monitor {
                &self.monitor
            }

            pub fn record_metric<I, S>(
                &self,
                name: &str,
                value: f64,
                unit: &str,
                category: $category,
                tags: I,
            ) -> $crate::error::Result<Option<$crate::threshold::Alert>>
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                self.monitor
                    .record_metric(name, value, unit, category.as_str(), tags)
            }

            pub fn get_summary(&self, window_hours: f64) -> $crate::summary::SummaryReport {
                self.monitor.get_summary(window_hours)
            }
        }
    };
}

pub mod ai;
pub mod engagement;
pub mod financial;
pub mod system;

/// The four built-in domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Ai,
    Financial,
    System,
    Engagement,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Ai,
        Domain::Financial,
        Domain::System,
        Domain::Engagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Ai => "ai",
            Domain::Financial => "financial",
            Domain::System => "system",
            Domain::Engagement => "engagement",
        }
    }

    /// Built-in profile of the domain.
    pub fn profile(&self) -> DomainProfile {
        match self {
            Domain::Ai => ai::profile(),
            Domain::Financial => financial::profile(),
            Domain::System => system::profile(),
            Domain::Engagement => engagement::profile(),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown domain '{}'", s))
    }
}
