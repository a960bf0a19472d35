//! Cluster-control API access
//!
//! Thin client over the dedicated-tier REST API:
//!
//! ```text
//! GET  /v1beta1/clusters/{id}                  -> { "state": "ACTIVE", ... }
//! POST /v1beta1/clusters/{id}:resumeCluster
//! POST /v1beta1/clusters/{id}:pauseCluster
//! ```
//!
//! All calls use HTTP digest authentication with the public/private key pair
//! and carry a fixed deadline. Expiry is reported as a transport failure.

pub mod client;

pub use client::{ClientTimeouts, TidbCloudClient};

use serde::{Deserialize, Serialize};
use std::fmt;

/// API key pair. The private half never appears in logs.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub public_key: String,
    pub private_key: String,
}

impl Credentials {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.public_key.is_empty() && !self.private_key.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Subset of the cluster resource the reconciler cares about
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    pub state: String,
    #[serde(default)]
    pub cluster_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}
