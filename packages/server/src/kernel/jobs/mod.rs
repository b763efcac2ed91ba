//! Job infrastructure for deferred workflow execution.
//!
//! This module provides the kernel-level infrastructure for running a
//! workflow outside the request/response cycle:
//! - [`JobSpawner`] - Accepts a workflow future and runs it as a task
//! - [`JobHandle`] - Observable completion signal for an accepted job
//! - [`Job`] - Minimal job record (id, type, timestamps)
//!
//! # Architecture
//!
//! ```text
//! Route handler calls jobs.spawn(job_type, workflow_future)
//!     │
//!     ├─► Job record created, request gets its ack immediately
//!     ├─► tokio::spawn drives the workflow to completion
//!     └─► Outcome (succeeded/failed) published on the handle's channel
//! ```
//!
//! Job state lives in process memory only. There is no queue, no retry and
//! no persistence - a crashed process forgets its in-flight jobs, and the
//! caller only learns the outcome through the workflow's own webhook.

mod job;
mod spawner;

pub use job::{Job, JobStatus};
pub use spawner::{JobHandle, JobOutcome, JobSpawner};
