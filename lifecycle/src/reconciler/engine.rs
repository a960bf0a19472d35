use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::types::{ClusterState, DesiredState, ErrorKind, ReconcileOutcome, Transition};
use crate::cloud::{Credentials, TidbCloudClient};
use crate::errors::ApiError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcilerSettings {
    /// Kill switch: every run becomes a no-op without touching the network
    pub disabled: bool,
}

/// What to do given an observed state and a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Already there or already moving there
    NoOp,
    Issue(Transition),
    /// State not recognized; never act on it
    FailClosed,
}

/// Single decision table for both directions.
pub fn decide(current: &ClusterState, desired: DesiredState) -> Decision {
    if !current.is_known() {
        return Decision::FailClosed;
    }
    if current.satisfies(desired) {
        Decision::NoOp
    } else {
        Decision::Issue(desired.transition())
    }
}

pub struct ClusterReconciler {
    client: Arc<TidbCloudClient>,
    settings: ReconcilerSettings,
}

impl ClusterReconciler {
    pub fn new(client: Arc<TidbCloudClient>, settings: ReconcilerSettings) -> Self {
        Self { client, settings }
    }

    pub fn is_disabled(&self) -> bool {
        self.settings.disabled
    }

    /// Bring `cluster_id` toward `desired`. Never returns an error: every
    /// failure is reported on the outcome and left for the next run.
    #[instrument(skip_all, fields(cluster = %cluster_id, desired = %desired))]
    pub async fn reconcile(
        &self,
        cluster_id: &str,
        desired: DesiredState,
        credentials: &Credentials,
    ) -> ReconcileOutcome {
        let mut outcome = ReconcileOutcome::begin(cluster_id, desired);

        if self.settings.disabled {
            info!("Schedule disabled, skipping reconcile of {}", cluster_id);
            outcome.disabled = true;
            outcome.success = true;
            return outcome.finish();
        }

        if cluster_id.trim().is_empty() {
            warn!("Refusing to reconcile an empty cluster id");
            outcome.error = Some(ErrorKind::StatusUnavailable);
            outcome.detail = Some("cluster id is empty".to_string());
            return outcome.finish();
        }

        let status = match self.client.get_status(cluster_id, credentials).await {
            Ok(status) => status,
            Err(e) => {
                warn!("Could not read state of {}: {}", cluster_id, e);
                outcome.error = Some(ErrorKind::StatusUnavailable);
                outcome.detail = Some(e.to_string());
                return outcome.finish();
            }
        };

        let current = ClusterState::parse(&status.state);
        outcome.previous_state = Some(current.clone());

        let transition = match decide(&current, desired) {
            Decision::FailClosed => {
                warn!(
                    "Cluster {} reported unrecognized state '{}', not acting",
                    cluster_id, status.state
                );
                outcome.error = Some(ErrorKind::UnknownState);
                outcome.detail = Some(format!("unrecognized state '{}'", status.state));
                return outcome.finish();
            }
            Decision::NoOp => {
                info!(
                    "Cluster {} is {}, already satisfies {}",
                    cluster_id, current, desired
                );
                outcome.success = true;
                return outcome.finish();
            }
            Decision::Issue(transition) => transition,
        };

        info!(
            "Cluster {} is {}, requesting {}",
            cluster_id, current, transition
        );
        outcome.action_taken = true;
        outcome.requested_transition = Some(transition);

        match self
            .client
            .transition(cluster_id, transition, credentials)
            .await
        {
            Ok(_) => {
                info!("{} accepted for {}", transition, cluster_id);
                outcome.success = true;
            }
            Err(ApiError::Status { status, body, .. }) => {
                outcome.error = Some(ErrorKind::TransitionRejected);
                outcome.detail = Some(format!("status {}: {}", status, body));
                outcome.superseded = self.confirm_superseded(cluster_id, desired, credentials).await;

                if outcome.superseded {
                    info!(
                        "{} for {} rejected with {} but cluster is already heading to {}",
                        transition, cluster_id, status, desired
                    );
                } else {
                    warn!(
                        "{} for {} rejected with {}: {}",
                        transition, cluster_id, status, body
                    );
                }
            }
            Err(e) => {
                warn!("{} for {} did not reach the API: {}", transition, cluster_id, e);
                outcome.error = Some(ErrorKind::TransitionUnreachable);
                outcome.detail = Some(e.to_string());
            }
        }

        outcome.finish()
    }

    /// After a rejection, one read to tell a lost same-direction race from a
    /// genuine refusal. Not a retry: no second transition is ever sent.
    async fn confirm_superseded(
        &self,
        cluster_id: &str,
        desired: DesiredState,
        credentials: &Credentials,
    ) -> bool {
        match self.client.get_status(cluster_id, credentials).await {
            Ok(status) => ClusterState::parse(&status.state).satisfies(desired),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_table() {
        use ClusterState::*;
        let cases = [
            (Active, DesiredState::Running, Decision::NoOp),
            (Resuming, DesiredState::Running, Decision::NoOp),
            (Paused, DesiredState::Running, Decision::Issue(Transition::Resume)),
            (Pausing, DesiredState::Running, Decision::Issue(Transition::Resume)),
            (Paused, DesiredState::Paused, Decision::NoOp),
            (Pausing, DesiredState::Paused, Decision::NoOp),
            (Active, DesiredState::Paused, Decision::Issue(Transition::Pause)),
            (Resuming, DesiredState::Paused, Decision::Issue(Transition::Pause)),
        ];

        for (state, desired, expected) in cases {
            assert_eq!(decide(&state, desired), expected, "{} -> {}", state, desired);
        }
    }

    #[test]
    fn test_unknown_state_fails_closed_both_directions() {
        let state = ClusterState::Unknown("MODIFYING".to_string());
        assert_eq!(decide(&state, DesiredState::Running), Decision::FailClosed);
        assert_eq!(decide(&state, DesiredState::Paused), Decision::FailClosed);
    }
}
