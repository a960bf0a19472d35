//! Cluster lifecycle reconciliation
//!
//! Observes the remote cluster state, compares it to the desired state and
//! issues at most one transition to close the gap.
//!
//! ```text
//! ACTIVE --pause--> PAUSING --(remote)--> PAUSED --resume--> RESUMING --(remote)--> ACTIVE
//! ```
//!
//! The remote system owns the state. Nothing is remembered between runs, so
//! overlapping invocations may both act; the remote API is expected to absorb
//! a duplicate same-direction request.

pub mod engine;
pub mod types;

pub use engine::{decide, ClusterReconciler, Decision, ReconcilerSettings};
pub use types::{ClusterState, DesiredState, ErrorKind, ReconcileOutcome, Transition};
