//! HTTP surface. Each sub-module exposes a `configure_routes()` scope that
//! `main.rs` mounts on the application.

pub mod certificates;
pub mod exams;
