//! Reusable test utilities:
//! - Mock cluster API and alert webhook servers
//! - Test configuration builder

// Not every test binary uses every fixture
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_cloud;
pub mod mock_webhook;
pub mod test_config;

pub use mock_cloud::MockCloudServer;
pub use mock_webhook::MockWebhookServer;
pub use test_config::TestConfigBuilder;

pub const TEST_CLUSTER_ID: &str = "1379661944646413143";
