// Diary Webtoon Generation Service - API Core
//
// This crate provides the backend that turns a member's photo and diary text
// into generated webtoon images. Inbound requests are acknowledged
// immediately; the actual generation pipelines run as deferred jobs
// (see kernel/jobs) and report their outcome through outbound webhooks.
//
// Workflows are organized per-domain in domains/*/workflows/

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
