// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deferred-callback jobs.
//!
//! A job produces a reply and posts it to a one-time callback address.
//! Jobs run on a [`TaskTracker`] so shutdown can drain them, at most
//! `max_concurrent` at a time. Each job publishes its progress on a
//! `watch` channel and in a registry operators can list.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use minwon_core::DeliveryAdapter;
use minwon_core::types::OutboundReply;
use serde::Serialize;
use tokio::sync::{Semaphore, watch};
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// Finished records kept for operator listing.
const MAX_FINISHED_RECORDS: usize = 256;

/// Lifecycle of a deferred job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Generating,
    Delivering,
    Delivered,
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Delivered | JobStatus::Failed(_))
    }
}

/// Operator-visible record of a job.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub sender_id: String,
    pub status: JobStatus,
    pub created_at: String,
    pub finished_at: Option<String>,
    #[serde(skip)]
    seq: u64,
}

/// Caller-side handle to a submitted job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    id: Uuid,
    status: watch::Receiver<JobStatus>,
}

impl JobHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current status without waiting.
    pub fn status(&self) -> JobStatus {
        self.status.borrow().clone()
    }

    /// Waits until the job reaches `Delivered` or `Failed`.
    pub async fn wait(&mut self) -> JobStatus {
        match self.status.wait_for(JobStatus::is_terminal).await {
            Ok(status) => status.clone(),
            // Sender dropped without a terminal status: the task was aborted.
            Err(_) => JobStatus::Failed("job aborted".to_string()),
        }
    }
}

/// Runs deferred-callback jobs and tracks their status.
#[derive(Clone)]
pub struct CallbackDispatcher {
    delivery: Arc<dyn DeliveryAdapter>,
    tracker: TaskTracker,
    permits: Arc<Semaphore>,
    jobs: Arc<DashMap<Uuid, JobRecord>>,
    next_seq: Arc<AtomicU64>,
}

impl CallbackDispatcher {
    pub fn new(delivery: Arc<dyn DeliveryAdapter>, max_concurrent: usize) -> Self {
        Self {
            delivery,
            tracker: TaskTracker::new(),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            jobs: Arc::new(DashMap::new()),
            next_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Submits a job: await `work` for the reply, then deliver it to `callback_url`.
    pub fn dispatch<F>(&self, sender_id: &str, callback_url: String, work: F) -> JobHandle
    where
        F: Future<Output = OutboundReply> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let (tx, rx) = watch::channel(JobStatus::Queued);
        self.jobs.insert(
            id,
            JobRecord {
                id,
                sender_id: sender_id.to_string(),
                status: JobStatus::Queued,
                created_at: minwon_core::now_rfc3339(),
                finished_at: None,
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            },
        );
        self.prune();

        let delivery = Arc::clone(&self.delivery);
        let permits = Arc::clone(&self.permits);
        let jobs = Arc::clone(&self.jobs);
        let span = info_span!("callback_job", job_id = %id, sender_id);

        self.tracker.spawn(
            async move {
                let set_status = |status: JobStatus| {
                    if let Some(mut record) = jobs.get_mut(&id) {
                        if status.is_terminal() {
                            record.finished_at = Some(minwon_core::now_rfc3339());
                        }
                        record.status = status.clone();
                    }
                    tx.send_replace(status);
                };

                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        set_status(JobStatus::Failed("dispatcher closed".to_string()));
                        return;
                    }
                };

                set_status(JobStatus::Generating);
                let reply = work.await;

                set_status(JobStatus::Delivering);
                match delivery.deliver(&callback_url, &reply).await {
                    Ok(()) => {
                        info!("deferred reply delivered");
                        set_status(JobStatus::Delivered);
                    }
                    Err(e) => {
                        warn!(error = %e, "deferred reply delivery failed");
                        set_status(JobStatus::Failed(e.to_string()));
                    }
                }
            }
            .instrument(span),
        );

        debug!(job_id = %id, "callback job queued");
        JobHandle { id, status: rx }
    }

    /// Jobs newest first.
    pub fn jobs(&self) -> Vec<JobRecord> {
        let mut records: Vec<JobRecord> = self.jobs.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| b.seq.cmp(&a.seq));
        records
    }

    /// Number of jobs not yet delivered or failed.
    pub fn in_flight(&self) -> usize {
        self.jobs.iter().filter(|r| !r.status.is_terminal()).count()
    }

    /// Runs a fire-and-forget task that shutdown also waits for.
    pub fn spawn_background<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(task);
    }

    /// Waits up to `timeout` for running jobs and background tasks.
    ///
    /// Returns `true` when everything finished in time. On timeout the
    /// permit pool is closed, so queued jobs fail with "dispatcher closed"
    /// instead of starting after the deadline.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending == 0 {
            info!("no callback jobs to drain");
            return true;
        }

        info!(count = pending, "waiting for callback jobs to complete");
        match tokio::time::timeout(timeout, self.tracker.wait()).await {
            Ok(()) => {
                info!("all callback jobs drained");
                true
            }
            Err(_) => {
                self.permits.close();
                warn!(remaining = self.tracker.len(), "timeout reached, callback jobs interrupted");
                false
            }
        }
    }

    /// Drops the oldest finished records beyond the retention limit.
    fn prune(&self) {
        let mut finished: Vec<(u64, Uuid)> = self
            .jobs
            .iter()
            .filter(|r| r.status.is_terminal())
            .map(|r| (r.seq, r.id))
            .collect();
        if finished.len() <= MAX_FINISHED_RECORDS {
            return;
        }
        finished.sort_unstable();
        let excess = finished.len() - MAX_FINISHED_RECORDS;
        for (_, id) in finished.into_iter().take(excess) {
            self.jobs.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minwon_test_utils::MockDelivery;

    fn reply(text: &str) -> OutboundReply {
        OutboundReply {
            text: text.to_string(),
            is_urgent: false,
        }
    }

    #[tokio::test]
    async fn job_runs_to_delivered() {
        let delivery = Arc::new(MockDelivery::new());
        let dispatcher = CallbackDispatcher::new(delivery.clone(), 4);

        let mut handle = dispatcher.dispatch("u1", "http://cb/1".into(), async { reply("done") });
        assert_eq!(handle.wait().await, JobStatus::Delivered);

        let delivered = delivery.deliveries();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, "http://cb/1");
        assert_eq!(delivered[0].1.text, "done");

        let records = dispatcher.jobs();
        assert_eq!(records[0].id, handle.id());
        assert_eq!(records[0].status, JobStatus::Delivered);
        assert!(records[0].finished_at.is_some());
    }

    #[tokio::test]
    async fn delivery_failure_is_recorded_not_retried() {
        let delivery = Arc::new(MockDelivery::failing());
        let dispatcher = CallbackDispatcher::new(delivery.clone(), 4);

        let mut handle = dispatcher.dispatch("u1", "http://cb/x".into(), async { reply("x") });
        assert!(matches!(handle.wait().await, JobStatus::Failed(_)));
        assert_eq!(delivery.attempts(), 1);
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn status_is_observable_while_generating() {
        let delivery = Arc::new(MockDelivery::new());
        let dispatcher = CallbackDispatcher::new(delivery, 1);
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let mut handle = dispatcher.dispatch("u1", "http://cb/2".into(), async move {
            let _ = release_rx.await;
            reply("late")
        });

        let mut rx = handle.status.clone();
        rx.wait_for(|s| *s == JobStatus::Generating).await.unwrap();
        assert_eq!(dispatcher.in_flight(), 1);

        release_tx.send(()).unwrap();
        assert_eq!(handle.wait().await, JobStatus::Delivered);
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let delivery = Arc::new(MockDelivery::new());
        let dispatcher = CallbackDispatcher::new(delivery, 1);
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let mut first = dispatcher.dispatch("a", "http://cb/a".into(), async move {
            let _ = release_rx.await;
            reply("a")
        });
        let mut second = dispatcher.dispatch("b", "http://cb/b".into(), async { reply("b") });

        let mut rx = first.status.clone();
        rx.wait_for(|s| *s == JobStatus::Generating).await.unwrap();
        tokio::task::yield_now().await;
        assert_eq!(second.status(), JobStatus::Queued);

        release_tx.send(()).unwrap();
        assert_eq!(first.wait().await, JobStatus::Delivered);
        assert_eq!(second.wait().await, JobStatus::Delivered);
    }

    #[tokio::test]
    async fn shutdown_drains_running_jobs() {
        let delivery = Arc::new(MockDelivery::new());
        let dispatcher = CallbackDispatcher::new(delivery.clone(), 4);
        dispatcher.dispatch("u1", "http://cb/3".into(), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            reply("drained")
        });

        assert!(dispatcher.shutdown(Duration::from_secs(5)).await);
        assert_eq!(delivery.deliveries().len(), 1);
    }

    #[tokio::test]
    async fn shutdown_times_out_on_stuck_job() {
        let delivery = Arc::new(MockDelivery::new());
        let dispatcher = CallbackDispatcher::new(delivery, 4);
        dispatcher.dispatch("u1", "http://cb/4".into(), std::future::pending::<OutboundReply>());
        assert!(!dispatcher.shutdown(Duration::from_millis(20)).await);
    }

    #[tokio::test]
    async fn queued_job_fails_once_drain_deadline_passes() {
        let delivery = Arc::new(MockDelivery::new());
        let dispatcher = CallbackDispatcher::new(delivery.clone(), 1);
        let first = dispatcher.dispatch("a", "http://cb/a".into(), std::future::pending::<OutboundReply>());
        let mut second = dispatcher.dispatch("b", "http://cb/b".into(), async { reply("b") });

        assert!(!dispatcher.shutdown(Duration::from_millis(20)).await);
        assert_eq!(
            second.wait().await,
            JobStatus::Failed("dispatcher closed".to_string())
        );
        assert_eq!(first.status(), JobStatus::Generating);
        assert!(delivery.deliveries().is_empty());

        let mut late = dispatcher.dispatch("c", "http://cb/c".into(), async { reply("c") });
        assert!(matches!(late.wait().await, JobStatus::Failed(_)));
    }

    #[tokio::test]
    async fn shutdown_waits_for_background_tasks() {
        let dispatcher = CallbackDispatcher::new(Arc::new(MockDelivery::new()), 1);
        let done = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&done);
        dispatcher.spawn_background(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            flag.store(true, Ordering::SeqCst);
        });

        assert!(dispatcher.shutdown(Duration::from_secs(5)).await);
        assert!(done.load(Ordering::SeqCst));
    }

    #[test]
    fn job_status_serializes_with_state_tag() {
        let json = serde_json::to_value(JobStatus::Failed("410".into())).unwrap();
        assert_eq!(json, serde_json::json!({"state": "failed", "error": "410"}));
        let json = serde_json::to_value(JobStatus::Delivering).unwrap();
        assert_eq!(json, serde_json::json!({"state": "delivering"}));
    }
}
