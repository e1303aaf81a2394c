// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

fn tagged_job(id: usize, seen: &Arc<Mutex<Vec<usize>>>) -> Job {
    let seen = seen.clone();
    Job::new(async move {
        seen.lock().push(id);
        Ok(())
    })
}

#[tokio::test]
async fn test_pop_returns_jobs_in_submission_order() {
    let queue = JobQueue::new(10);
    let seen = Arc::new(Mutex::new(Vec::new()));

    for id in 0..5 {
        assert!(queue.submit(tagged_job(id, &seen)));
    }
    assert_eq!(queue.size(), 5);

    while let Some(job) = queue.pop() {
        job.run().await.unwrap();
    }

    assert_eq!(*seen.lock(), vec![0, 1, 2, 3, 4]);
    assert!(queue.is_empty());
}

#[test]
fn test_queue_is_shareable_across_tasks() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<JobQueue>();
}

#[test]
fn test_pop_on_empty_queue() {
    let queue = JobQueue::default();
    assert!(queue.pop().is_none());
    assert!(queue.is_empty());
    assert_eq!(queue.capacity(), DEFAULT_QUEUE_CAPACITY);
}

#[test]
fn test_submit_beyond_capacity_is_noop() {
    let queue = JobQueue::new(2);
    assert!(queue.submit(Job::new(async { Ok(()) })));
    assert!(queue.submit(Job::new(async { Ok(()) })));
    assert_eq!(queue.size(), 2);

    assert!(!queue.submit(Job::new(async { Ok(()) })));
    assert_eq!(queue.size(), 2);
}

#[tokio::test]
async fn test_job_is_lazy_until_run() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let job = tagged_job(7, &seen);
    assert!(seen.lock().is_empty());

    job.run().await.unwrap();
    assert_eq!(*seen.lock(), vec![7]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submit_and_pop_lose_nothing() {
    let queue = Arc::new(JobQueue::new(DEFAULT_QUEUE_CAPACITY));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let mut producers = Vec::new();
    for producer in 0..4 {
        let queue = queue.clone();
        let seen = seen.clone();
        producers.push(tokio::spawn(async move {
            for i in 0..50 {
                assert!(queue.submit(tagged_job(producer * 50 + i, &seen)));
            }
        }));
    }

    let consumer = {
        let queue = queue.clone();
        tokio::spawn(async move {
            let mut popped = Vec::new();
            while popped.len() < 100 {
                if let Some(job) = queue.pop() {
                    popped.push(job);
                } else {
                    tokio::task::yield_now().await;
                }
            }
            popped
        })
    };

    for producer in producers {
        producer.await.unwrap();
    }
    let mut popped = consumer.await.unwrap();
    while let Some(job) = queue.pop() {
        popped.push(job);
    }

    for job in popped {
        job.run().await.unwrap();
    }

    let seen = seen.lock();
    let unique: HashSet<_> = seen.iter().copied().collect();
    assert_eq!(seen.len(), 200);
    assert_eq!(unique.len(), 200);
}
