//! HTTP request handlers for the lifecycle API.
//!
//! - `cluster` - state inspection and manual reconcile trigger
//! - `common` - response envelope shared by all handlers
//! - `operations` - health, in-flight runs and schedule

pub mod cluster;
pub mod common;
pub mod operations;

pub use cluster::*;
pub use operations::*;
