//! Stress tests for dashmon
//!
//! Run with: cargo test --release stress -- --ignored

use dashmon::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[test]
#[ignore] // Run manually with --ignored
fn stress_test_ingestion() {
    let monitor = AiPerformanceMonitor::new().unwrap();
    let iterations = 200_000;
    let none: [&str; 0] = [];
    let start = Instant::now();

    for i in 0..iterations {
        let category = AiCategory::ALL[i % AiCategory::ALL.len()];
        let value = 100.0 + (i as f64 * 0.01).sin() * 50.0;
        monitor
            .record_metric("load", value, "", category, none)
            .unwrap();
    }

    let elapsed = start.elapsed();
    let rate = iterations as f64 / elapsed.as_secs_f64();

    println!("Recorded {} samples in {:?}", iterations, elapsed);
    println!("Rate: {:.0} samples/second", rate);

    assert_eq!(monitor.monitor().sample_count(), 1000);
    assert!(
        rate > 10_000.0,
        "Should record at least 10k samples/s, got {:.0}",
        rate
    );
}

#[test]
#[ignore]
fn stress_test_concurrent_producers_and_readers() {
    let monitor = Arc::new(SystemHealthMonitor::new().unwrap());
    let producers = 8;
    let per_producer = 5_000;

    let mut handles = Vec::new();
    for p in 0..producers {
        let monitor = Arc::clone(&monitor);
        handles.push(thread::spawn(move || {
            let none: [&str; 0] = [];
            for i in 0..per_producer {
                monitor
                    .record_metric("cpu", (i % 100) as f64, "%", SystemCategory::CpuUsage, none)
                    .unwrap();
                if i % 500 == 0 {
                    monitor
                        .record_service_health(
                            &format!("svc-{}", p),
                            ServiceStatus::Healthy,
                            50.0,
                            0.0,
                            99.9,
                            BTreeMap::new(),
                        )
                        .unwrap();
                }
            }
        }));
    }

    for _ in 0..2 {
        let monitor = Arc::clone(&monitor);
        handles.push(thread::spawn(move || {
            for _ in 0..200 {
                let report = monitor.get_summary(1.0);
                // A consistent view never exceeds the history bound
                assert!(report.sample_count <= 1000);
                if let Some(stats) = report.stats("cpu_usage") {
                    assert!(stats.count <= 100);
                    assert!(stats.min <= stats.average && stats.average <= stats.max);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(monitor.monitor().sample_count(), 1000);
    assert_eq!(monitor.monitor().snapshots().len(), producers);
}

#[test]
#[ignore]
fn stress_test_summary_latency() {
    let monitor = EngagementMonitor::new().unwrap();
    let none: [&str; 0] = [];
    for i in 0..1000 {
        let category = EngagementCategory::ALL[i % EngagementCategory::ALL.len()];
        monitor
            .record_metric("m", (i % 37) as f64, "", category, none)
            .unwrap();
    }

    let iterations = 1_000;
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = monitor.get_summary(24.0);
    }
    let per_call = start.elapsed() / iterations;
    println!("get_summary: {:?} per call", per_call);
    assert!(per_call.as_millis() < 10);
}
