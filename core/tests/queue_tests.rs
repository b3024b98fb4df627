use sift_core::WorkQueue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn finish_waits_for_all_tasks() {
    let queue = WorkQueue::with_threads(4);
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..100 {
        let counter = Arc::clone(&counter);
        queue.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }
    queue.finish();
    assert_eq!(counter.load(Ordering::SeqCst), 100);
    queue.join();
}

#[test]
fn finish_covers_transitively_spawned_tasks() {
    let queue = Arc::new(WorkQueue::with_threads(3));
    let counter = Arc::new(AtomicUsize::new(0));

    // Each task fans out into three children, three levels deep:
    // 1 + 3 + 9 + 27 tasks in total.
    fn spawn(queue: &Arc<WorkQueue>, counter: &Arc<AtomicUsize>, depth: usize) {
        let queue_inner = Arc::clone(queue);
        let counter_inner = Arc::clone(counter);
        queue.execute(move || {
            counter_inner.fetch_add(1, Ordering::SeqCst);
            if depth > 0 {
                for _ in 0..3 {
                    spawn(&queue_inner, &counter_inner, depth - 1);
                }
            }
        });
    }

    spawn(&queue, &counter, 3);
    queue.finish();
    assert_eq!(counter.load(Ordering::SeqCst), 1 + 3 + 9 + 27);
    queue.join();
}

#[test]
fn panicking_task_does_not_leak_pending_count() {
    let queue = WorkQueue::with_threads(2);
    let counter = Arc::new(AtomicUsize::new(0));

    queue.execute(|| panic!("boom"));
    let counter_clone = Arc::clone(&counter);
    queue.execute(move || {
        counter_clone.fetch_add(1, Ordering::SeqCst);
    });

    // Must return despite the panic.
    queue.finish();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    queue.join();
}

#[test]
fn queue_is_reusable_across_phases() {
    let queue = WorkQueue::with_threads(2);
    let counter = Arc::new(AtomicUsize::new(0));

    for phase in 0..3 {
        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            queue.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        queue.finish();
        assert_eq!(counter.load(Ordering::SeqCst), (phase + 1) * 10);
    }
    queue.join();
}

#[test]
fn finish_on_idle_queue_returns_immediately() {
    let queue = WorkQueue::with_threads(1);
    queue.finish();
    queue.finish();
    queue.join();
}

#[test]
fn zero_threads_falls_back_to_default() {
    let queue = WorkQueue::with_threads(0);
    assert_eq!(queue.size(), sift_core::queue::DEFAULT_THREADS);
    queue.join();
}

#[test]
fn tasks_submitted_after_shutdown_are_dropped() {
    let queue = WorkQueue::with_threads(2);
    let counter = Arc::new(AtomicUsize::new(0));
    queue.shutdown();

    let counter_clone = Arc::clone(&counter);
    queue.execute(move || {
        counter_clone.fetch_add(1, Ordering::SeqCst);
    });
    queue.finish();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn join_stops_all_workers() {
    let queue = WorkQueue::with_threads(4);
    assert_eq!(queue.size(), 4);
    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..20 {
        let counter = Arc::clone(&counter);
        queue.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }
    queue.join();
    assert_eq!(counter.load(Ordering::SeqCst), 20);
}
