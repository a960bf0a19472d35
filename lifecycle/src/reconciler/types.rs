//! Lifecycle states, transitions and the per-run outcome record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Externally reported state of a remote cluster.
///
/// Anything the reconciler has not seen before lands in `Unknown` with the
/// raw value preserved, so an API that grows new states never breaks parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusterState {
    Active,
    Resuming,
    Paused,
    Pausing,
    Unknown(String),
}

impl ClusterState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "ACTIVE" => ClusterState::Active,
            "RESUMING" => ClusterState::Resuming,
            "PAUSED" => ClusterState::Paused,
            "PAUSING" => ClusterState::Pausing,
            other => ClusterState::Unknown(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ClusterState::Unknown(_))
    }

    /// True when the cluster already sits at, or is moving toward, `desired`.
    pub fn satisfies(&self, desired: DesiredState) -> bool {
        match desired {
            DesiredState::Running => {
                matches!(self, ClusterState::Active | ClusterState::Resuming)
            }
            DesiredState::Paused => matches!(self, ClusterState::Paused | ClusterState::Pausing),
        }
    }
}

impl fmt::Display for ClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterState::Active => write!(f, "ACTIVE"),
            ClusterState::Resuming => write!(f, "RESUMING"),
            ClusterState::Paused => write!(f, "PAUSED"),
            ClusterState::Pausing => write!(f, "PAUSING"),
            ClusterState::Unknown(raw) => write!(f, "UNKNOWN({})", raw),
        }
    }
}

/// Target state requested by a schedule or a manual trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DesiredState {
    Running,
    Paused,
}

impl DesiredState {
    /// The one edge that moves a cluster toward this state
    pub fn transition(&self) -> Transition {
        match self {
            DesiredState::Running => Transition::Resume,
            DesiredState::Paused => Transition::Pause,
        }
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesiredState::Running => write!(f, "RUNNING"),
            DesiredState::Paused => write!(f, "PAUSED"),
        }
    }
}

impl FromStr for DesiredState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" | "resume" => Ok(DesiredState::Running),
            "paused" | "pause" => Ok(DesiredState::Paused),
            other => Err(format!(
                "unknown desired state '{}', expected RUNNING or PAUSED",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Transition {
    Resume,
    Pause,
}

impl Transition {
    /// Custom-method suffix on the cluster resource path
    pub fn action(&self) -> &'static str {
        match self {
            Transition::Resume => "resumeCluster",
            Transition::Pause => "pauseCluster",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Resume => write!(f, "resume"),
            Transition::Pause => write!(f, "pause"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Current state could not be determined
    StatusUnavailable,
    /// State reported but not recognized
    UnknownState,
    /// Transition attempted, remote answered non-2xx
    TransitionRejected,
    /// Transition attempted, no response
    TransitionUnreachable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::StatusUnavailable => "STATUS_UNAVAILABLE",
            ErrorKind::UnknownState => "UNKNOWN_STATE",
            ErrorKind::TransitionRejected => "TRANSITION_REJECTED",
            ErrorKind::TransitionUnreachable => "TRANSITION_UNREACHABLE",
        };
        write!(f, "{}", name)
    }
}

/// Result of one reconciliation attempt. Built fresh per run, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub cluster_id: String,
    pub desired: DesiredState,
    pub action_taken: bool,
    /// `None` when the state was never observed
    pub previous_state: Option<ClusterState>,
    pub requested_transition: Option<Transition>,
    pub success: bool,
    pub error: Option<ErrorKind>,
    pub detail: Option<String>,
    /// Rejected, but the cluster was already heading to `desired`
    pub superseded: bool,
    /// Kill switch was on; nothing was fetched or requested
    pub disabled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ReconcileOutcome {
    pub(crate) fn begin(cluster_id: &str, desired: DesiredState) -> Self {
        let now = Utc::now();
        Self {
            cluster_id: cluster_id.to_string(),
            desired,
            action_taken: false,
            previous_state: None,
            requested_transition: None,
            success: false,
            error: None,
            detail: None,
            superseded: false,
            disabled: false,
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Nothing to do and nothing went wrong
    pub fn is_noop(&self) -> bool {
        self.success && !self.action_taken
    }

    pub fn summary(&self) -> String {
        if self.disabled {
            return format!("{}: schedule disabled, skipped", self.cluster_id);
        }
        let observed = self
            .previous_state
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unobserved".to_string());
        match (&self.error, self.requested_transition) {
            (None, None) => format!(
                "{}: already {} (state {}), no action",
                self.cluster_id, self.desired, observed
            ),
            (None, Some(t)) => format!(
                "{}: {} requested from state {}",
                self.cluster_id, t, observed
            ),
            (Some(kind), _) => format!(
                "{}: {} while reconciling to {} (state {}){}",
                self.cluster_id,
                kind,
                self.desired,
                observed,
                self.detail
                    .as_ref()
                    .map(|d| format!(": {}", d))
                    .unwrap_or_default()
            ),
        }
    }
}
