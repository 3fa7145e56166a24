// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use super::*;
use memo_core::{JobReason, PipelineStage, Priority};
use std::time::Duration;

fn job(path: &str, stages: Vec<PipelineStage>, priority: Priority) -> Job {
    Job::new(PathBuf::from(path), PathBuf::from("/root"), JobReason::Created, stages, 0, priority)
}

#[tokio::test]
async fn enqueue_then_claim_round_trips() {
    let queue = WorkQueue::new(4);
    queue.enqueue(job("/root/a.md", vec![PipelineStage::Metadata], Priority::Normal), Duration::from_millis(50))
        .await
        .unwrap();

    let claimed = queue.claim_next().await.unwrap();
    assert_eq!(claimed.path, PathBuf::from("/root/a.md"));
}

#[tokio::test]
async fn pending_job_for_same_path_coalesces_stages_and_priority() {
    let queue = WorkQueue::new(4);
    queue
        .enqueue(job("/root/a.md", vec![PipelineStage::Metadata], Priority::Background), Duration::from_millis(50))
        .await
        .unwrap();
    queue
        .enqueue(job("/root/a.md", vec![PipelineStage::Semantic], Priority::Critical), Duration::from_millis(50))
        .await
        .unwrap();

    assert_eq!(queue.len(), 1);
    let claimed = queue.claim_next().await.unwrap();
    assert!(claimed.stages.contains(&PipelineStage::Metadata));
    assert!(claimed.stages.contains(&PipelineStage::Semantic));
    assert_eq!(claimed.priority, Priority::Critical);
}

#[tokio::test]
async fn in_flight_job_accumulates_requeue_after_and_reappears_on_complete() {
    let queue = WorkQueue::new(4);
    queue.enqueue(job("/root/a.md", vec![PipelineStage::Metadata], Priority::Normal), Duration::from_millis(50))
        .await
        .unwrap();
    let claimed = queue.claim_next().await.unwrap();

    queue.enqueue(job("/root/a.md", vec![PipelineStage::Semantic], Priority::Normal), Duration::from_millis(50))
        .await
        .unwrap();
    assert_eq!(queue.len(), 0, "requeued job must not be visible until complete()");

    queue.complete(&claimed.path);
    assert_eq!(queue.len(), 1);
    let requeued = queue.claim_next().await.unwrap();
    assert!(requeued.stages.contains(&PipelineStage::Semantic));
}

#[tokio::test]
async fn enqueue_times_out_when_queue_stays_full() {
    let queue = WorkQueue::new(1);
    queue.enqueue(job("/root/a.md", vec![PipelineStage::Metadata], Priority::Normal), Duration::from_millis(50))
        .await
        .unwrap();

    let err = queue
        .enqueue(job("/root/b.md", vec![PipelineStage::Metadata], Priority::Normal), Duration::from_millis(30))
        .await
        .unwrap_err();
    assert!(matches!(err, QueueError::QueueFull));
}

#[tokio::test]
async fn closed_queue_rejects_enqueue_and_unblocks_claim() {
    let queue = Arc::new(WorkQueue::new(4));
    let waiter = tokio::spawn({
        let queue = queue.clone();
        async move { queue.claim_next().await }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    queue.close();

    assert!(waiter.await.unwrap().is_none());
    let err = queue
        .enqueue(job("/root/a.md", vec![PipelineStage::Metadata], Priority::Normal), Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, QueueError::Closed));
}
