//! Mock cluster-control API
//!
//! Serves `GET /v1beta1/clusters/{id}` and the `:pauseCluster` /
//! `:resumeCluster` actions without a real cloud account.

use lifecycle::cloud::{ClientTimeouts, TidbCloudClient};
use lifecycle::reconciler::Transition;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, ResponseTemplate,
};

pub struct MockCloudServer {
    pub server: MockServer,
    pub base_url: String,
}

fn cluster_path(cluster_id: &str) -> String {
    format!("/v1beta1/clusters/{}", cluster_id)
}

fn transition_path(cluster_id: &str, transition: Transition) -> String {
    format!("/v1beta1/clusters/{}:{}", cluster_id, transition.action())
}

impl MockCloudServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Client with short deadlines suitable for tests
    pub fn client(&self) -> Arc<TidbCloudClient> {
        self.client_with_timeouts(Duration::from_secs(2), Duration::from_secs(2))
    }

    pub fn client_with_timeouts(&self, status: Duration, transition: Duration) -> Arc<TidbCloudClient> {
        Arc::new(
            TidbCloudClient::new(self.base_url.clone(), ClientTimeouts { status, transition })
                .expect("client should build"),
        )
    }

    fn state_response(cluster_id: &str, state: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "clusterId": cluster_id,
            "displayName": "nightly-cluster",
            "regionId": "aws-us-west-2",
            "state": state,
        }))
    }

    /// Every status read reports `state`
    pub async fn mock_state(&self, cluster_id: &str, state: &str) {
        Mock::given(method("GET"))
            .and(path(cluster_path(cluster_id)))
            .respond_with(Self::state_response(cluster_id, state))
            .with_priority(5)
            .mount(&self.server)
            .await;
    }

    /// Next `times` status reads report `state`, then fall through to
    /// lower-priority mocks
    pub async fn mock_state_times(&self, cluster_id: &str, state: &str, times: u64) {
        Mock::given(method("GET"))
            .and(path(cluster_path(cluster_id)))
            .respond_with(Self::state_response(cluster_id, state))
            .up_to_n_times(times)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status_error(&self, cluster_id: &str, status_code: u16) {
        Mock::given(method("GET"))
            .and(path(cluster_path(cluster_id)))
            .respond_with(ResponseTemplate::new(status_code).set_body_json(json!({
                "code": status_code,
                "message": "internal error"
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status_raw(&self, cluster_id: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(cluster_path(cluster_id)))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status_delayed(&self, cluster_id: &str, state: &str, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(cluster_path(cluster_id)))
            .respond_with(Self::state_response(cluster_id, state).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    /// Transition endpoint answering `status_code`; verified on drop to be
    /// hit exactly `expected_calls` times
    pub async fn mock_transition(
        &self,
        cluster_id: &str,
        transition: Transition,
        status_code: u16,
        expected_calls: u64,
    ) {
        let template = if status_code < 300 {
            ResponseTemplate::new(status_code).set_body_json(json!({}))
        } else {
            ResponseTemplate::new(status_code).set_body_json(json!({
                "code": status_code,
                "message": "cluster state does not allow this operation"
            }))
        };

        Mock::given(method("POST"))
            .and(path(transition_path(cluster_id, transition)))
            .respond_with(template)
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_transition_delayed(&self, cluster_id: &str, transition: Transition, delay: Duration) {
        Mock::given(method("POST"))
            .and(path(transition_path(cluster_id, transition)))
            .respond_with(ResponseTemplate::new(200).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    pub async fn transition_calls(&self) -> usize {
        self.requests()
            .await
            .iter()
            .filter(|r| r.method.as_str() == "POST")
            .count()
    }
}
