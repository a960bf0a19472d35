use digest_auth::{AuthContext, HttpMethod};
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Client, Method, Response, StatusCode};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{ClusterStatus, Credentials};
use crate::constants::api;
use crate::errors::ApiError;
use crate::reconciler::Transition;

/// Deadlines for the two kinds of calls the reconciler makes
#[derive(Debug, Clone, Copy)]
pub struct ClientTimeouts {
    pub status: Duration,
    pub transition: Duration,
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self {
            status: api::STATUS_TIMEOUT,
            transition: api::TRANSITION_TIMEOUT,
        }
    }
}

pub struct TidbCloudClient {
    client: Client,
    base_url: String,
    timeouts: ClientTimeouts,
}

impl TidbCloudClient {
    pub fn new(base_url: impl Into<String>, timeouts: ClientTimeouts) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .connect_timeout(api::CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ApiError::from_reqwest(&base_url, e))?;

        Ok(Self {
            client,
            base_url,
            timeouts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeouts(&self) -> ClientTimeouts {
        self.timeouts
    }

    fn cluster_url(&self, cluster_id: &str) -> String {
        format!("{}{}/{}", self.base_url, api::CLUSTERS_PATH, cluster_id)
    }

    fn transition_url(&self, cluster_id: &str, transition: Transition) -> String {
        format!("{}:{}", self.cluster_url(cluster_id), transition.action())
    }

    /// Read the reported state of a cluster.
    ///
    /// Non-2xx and bodies without a string `state` are errors; the caller
    /// decides what an unrecognized state value means.
    #[instrument(skip(self, credentials))]
    pub async fn get_status(
        &self,
        cluster_id: &str,
        credentials: &Credentials,
    ) -> Result<ClusterStatus, ApiError> {
        let url = self.cluster_url(cluster_id);

        with_deadline(&url, self.timeouts.status, async {
            let response = self.send(Method::GET, &url, credentials).await?;
            let body = read_success_body(&url, response).await?;

            serde_json::from_str::<ClusterStatus>(&body).map_err(|e| ApiError::Decode {
                url: url.clone(),
                reason: e.to_string(),
            })
        })
        .await
    }

    /// Request a pause or resume. Returns the response body on 2xx.
    #[instrument(skip(self, credentials))]
    pub async fn transition(
        &self,
        cluster_id: &str,
        transition: Transition,
        credentials: &Credentials,
    ) -> Result<String, ApiError> {
        let url = self.transition_url(cluster_id, transition);

        with_deadline(&url, self.timeouts.transition, async {
            let response = self.send(Method::POST, &url, credentials).await?;
            read_success_body(&url, response).await
        })
        .await
    }

    /// Send once; if the server answers with a digest challenge, answer it
    /// and send again.
    async fn send(
        &self,
        method: Method,
        url: &str,
        credentials: &Credentials,
    ) -> Result<Response, ApiError> {
        let response = self
            .client
            .request(method.clone(), url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(url, e))?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let challenge = match response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
        {
            Some(value) if value.trim_start().to_ascii_lowercase().starts_with("digest") => {
                value.to_string()
            }
            _ => return Ok(response),
        };

        debug!("Answering digest challenge for {}", url);
        let authorization = answer_challenge(&challenge, &method, url, credentials)?;

        self.client
            .request(method, url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(url, e))
    }
}

async fn with_deadline<T, F>(url: &str, deadline: Duration, call: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Transport {
            url: url.to_string(),
            timed_out: true,
            reason: format!("no response within {}ms", deadline.as_millis()),
        }),
    }
}

async fn read_success_body(url: &str, response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::from_reqwest(url, e))?;

    if !status.is_success() {
        return Err(ApiError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}

fn answer_challenge(
    challenge: &str,
    method: &Method,
    url: &str,
    credentials: &Credentials,
) -> Result<String, ApiError> {
    let auth_error = |reason: String| ApiError::Auth {
        url: url.to_string(),
        reason,
    };

    let uri = reqwest::Url::parse(url)
        .map(|u| u.path().to_string())
        .map_err(|e| auth_error(e.to_string()))?;

    let mut prompt = digest_auth::parse(challenge).map_err(|e| auth_error(e.to_string()))?;

    let http_method = if *method == Method::POST {
        HttpMethod::POST
    } else {
        HttpMethod::GET
    };

    let context = AuthContext::new_with_method(
        credentials.public_key.as_str(),
        credentials.private_key.as_str(),
        uri.as_str(),
        Option::<&[u8]>::None,
        http_method,
    );

    let answer = prompt
        .respond(&context)
        .map_err(|e| auth_error(e.to_string()))?;

    Ok(answer.to_header_string())
}
