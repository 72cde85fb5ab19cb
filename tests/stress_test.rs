//! Stress tests for the task manager

use parking_lot::Mutex;
use priority_tasks::prelude::*;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
#[ignore] // Run with --ignored flag
fn stress_test_many_producers_random_priorities() {
    const PRODUCERS: usize = 16;
    const PER_PRODUCER: usize = 10_000;

    let seen = Arc::new(Mutex::new(vec![0u8; PRODUCERS * PER_PRODUCER]));
    let manager = {
        let seen = seen.clone();
        Arc::new(TaskManager::new(8, 7, 64, Some(handler(move |tag: usize| {
            seen.lock()[tag] += 1;
        }))))
    };

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let manager = manager.clone();
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for i in 0..PER_PRODUCER {
                    manager.push_task(rng.gen_range(-2..10), p * PER_PRODUCER + i);
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    manager.shutdown().unwrap();

    assert!(seen.lock().iter().all(|&n| n == 1));
    assert_eq!(manager.metrics().empty_scans, 0);
}

#[test]
#[ignore]
fn stress_test_minimal_budget() {
    // one token for everything: every push waits for a worker
    let executed = Arc::new(AtomicUsize::new(0));
    let manager = {
        let executed = executed.clone();
        Arc::new(TaskManager::new(4, 3, 1, Some(handler(move |_: u64| {
            executed.fetch_add(1, Ordering::Relaxed);
        }))))
    };

    let producers: Vec<_> = (0..8)
        .map(|p| {
            let manager = manager.clone();
            thread::spawn(move || {
                for i in 0..5_000u64 {
                    manager.push_task((p % 4) as isize, i);
                    assert!(manager.pending_tasks() <= 1);
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    manager.shutdown().unwrap();

    assert_eq!(executed.load(Ordering::Relaxed), 40_000);
}

#[test]
#[ignore]
fn stress_test_panic_recovery() {
    let config = Config::builder()
        .num_workers(4)
        .max_priority(2)
        .max_pending_tasks(32)
        .panic_strategy(PanicStrategy::Isolate)
        .build();

    let ok = Arc::new(AtomicUsize::new(0));
    let manager = {
        let ok = ok.clone();
        TaskManager::with_config(config, Some(handler(move |i: usize| {
            if i % 10 == 0 {
                panic!("Intentional panic");
            }
            ok.fetch_add(1, Ordering::Relaxed);
        })))
        .unwrap()
    };

    for i in 0..10_000 {
        manager.push_task((i % 3) as isize, i);
    }
    manager.shutdown().unwrap();

    assert_eq!(ok.load(Ordering::Relaxed), 9_000);
    assert_eq!(manager.metrics().tasks_panicked, 1_000);
}

#[test]
#[ignore]
fn stress_test_repeated_construct_shutdown() {
    for i in 0..100 {
        let count = Arc::new(AtomicUsize::new(0));
        let manager = {
            let count = count.clone();
            TaskManager::new(4, 2, 8, Some(handler(move |_: ()| {
                count.fetch_add(1, Ordering::Relaxed);
            })))
        };

        for n in 0..100 {
            manager.push_task(n % 3, ());
        }
        drop(manager);

        assert_eq!(count.load(Ordering::Relaxed), 100, "Iteration {}", i);
    }
}
