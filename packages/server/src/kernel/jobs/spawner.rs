//! Deferred execution of workflow jobs.
//!
//! Each accepted request becomes an independent tokio task. The triggering
//! request returns immediately; the task's outcome is observable through the
//! returned [`JobHandle`] and is otherwise reported only by the workflow's
//! own webhook. Errors never escape a task - there is no caller left on the
//! request path to receive them.

use std::future::Future;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{error, info};
use uuid::Uuid;

use super::job::{Job, JobStatus};

/// Terminal result of one deferred job.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub status: JobStatus,
    pub error: Option<String>,
}

impl JobOutcome {
    fn succeeded() -> Self {
        Self {
            status: JobStatus::Succeeded,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            status: JobStatus::Failed,
            error: Some(error),
        }
    }
}

/// Observable completion signal for an accepted job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    pub id: Uuid,
    pub job_type: String,
    outcome: watch::Receiver<Option<JobOutcome>>,
}

impl JobHandle {
    /// The outcome, if the job has already settled.
    pub fn outcome(&self) -> Option<JobOutcome> {
        self.outcome.borrow().clone()
    }

    /// Wait for the job to settle.
    pub async fn wait(&mut self) -> Result<JobOutcome> {
        let outcome = self
            .outcome
            .wait_for(Option::is_some)
            .await
            .context("job task dropped without reporting an outcome")?
            .clone();
        outcome.context("job outcome channel resolved empty")
    }
}

/// Runs workflow futures as tracked background tasks.
#[derive(Debug, Clone, Default)]
pub struct JobSpawner;

impl JobSpawner {
    pub fn new() -> Self {
        Self
    }

    /// Accept a unit of deferred work.
    ///
    /// The future runs to completion on its own task; its error, if any, is
    /// logged and published on the handle instead of propagating.
    pub fn spawn<F>(&self, job_type: &str, fut: F) -> JobHandle
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let job = Job::new(job_type);
        let (tx, rx) = watch::channel(None);

        info!(job_id = %job.id, job_type = %job.job_type, "job accepted");

        let job_id = job.id;
        let spawned_type = job.job_type.clone();
        tokio::spawn(async move {
            let outcome = match fut.await {
                Ok(()) => {
                    info!(job_id = %job_id, job_type = %spawned_type, "job succeeded");
                    JobOutcome::succeeded()
                }
                Err(e) => {
                    error!(
                        job_id = %job_id,
                        job_type = %spawned_type,
                        error = %format!("{e:#}"),
                        "job failed"
                    );
                    JobOutcome::failed(format!("{e:#}"))
                }
            };
            let _ = tx.send(Some(outcome));
        });

        JobHandle {
            id: job.id,
            job_type: job.job_type,
            outcome: rx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[tokio::test]
    async fn test_successful_job_reports_succeeded() {
        let spawner = JobSpawner::new();
        let mut handle = spawner.spawn("noop", async { Ok(()) });

        let outcome = handle.wait().await.unwrap();
        assert_eq!(outcome.status, JobStatus::Succeeded);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_failing_job_reports_failed_without_panicking() {
        let spawner = JobSpawner::new();
        let mut handle = spawner.spawn("boom", async { Err(anyhow!("stage exploded")) });

        let outcome = handle.wait().await.unwrap();
        assert_eq!(outcome.status, JobStatus::Failed);
        assert!(outcome.error.unwrap().contains("stage exploded"));
    }

    #[tokio::test]
    async fn test_outcome_is_none_before_completion() {
        let spawner = JobSpawner::new();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let mut handle = spawner.spawn("slow", async move {
            let _ = release_rx.await;
            Ok(())
        });

        assert!(handle.outcome().is_none());
        release_tx.send(()).unwrap();
        assert_eq!(handle.wait().await.unwrap().status, JobStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_jobs_run_concurrently() {
        let spawner = JobSpawner::new();
        let (tx_a, rx_a) = tokio::sync::oneshot::channel::<()>();
        let (tx_b, rx_b) = tokio::sync::oneshot::channel::<()>();

        // Each job unblocks the other: both must be running at once to finish.
        let mut first = spawner.spawn("first", async move {
            tx_b.send(()).ok();
            rx_a.await.ok();
            Ok(())
        });
        let mut second = spawner.spawn("second", async move {
            rx_b.await.ok();
            tx_a.send(()).ok();
            Ok(())
        });

        assert_eq!(first.wait().await.unwrap().status, JobStatus::Succeeded);
        assert_eq!(second.wait().await.unwrap().status, JobStatus::Succeeded);
    }
}
