//! HTTP boundary: application setup and route handlers.

pub mod app;
pub mod routes;

pub use app::{build_app, build_deps, AxumAppState};
