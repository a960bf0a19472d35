//! Builder for on-disk configuration directories

use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub struct TestConfig {
    pub temp_dir: TempDir,
}

impl TestConfig {
    pub fn config_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_dir_string(&self) -> String {
        self.config_dir().to_string_lossy().to_string()
    }
}

#[derive(Default)]
pub struct TestConfigBuilder {
    main_lines: Vec<String>,
    keys: Option<(String, String)>,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cluster_id(self, cluster_id: &str) -> Self {
        self.line(format!("cluster_id = \"{}\"", cluster_id))
    }

    pub fn api_base_url(self, url: &str) -> Self {
        self.line(format!("api_base_url = \"{}\"", url))
    }

    pub fn resume_schedule(self, cron: &str) -> Self {
        self.line(format!("resume_schedule = \"{}\"", cron))
    }

    pub fn pause_schedule(self, cron: &str) -> Self {
        self.line(format!("pause_schedule = \"{}\"", cron))
    }

    pub fn disable_schedule(self, disabled: bool) -> Self {
        self.line(format!("disable_schedule = {}", disabled))
    }

    pub fn keys(mut self, public_key: &str, private_key: &str) -> Self {
        self.keys = Some((public_key.to_string(), private_key.to_string()));
        self
    }

    pub fn line(mut self, line: String) -> Self {
        self.main_lines.push(line);
        self
    }

    pub fn build(self) -> TestConfig {
        let temp_dir = TempDir::new().expect("temp dir");

        if !self.main_lines.is_empty() {
            fs::write(temp_dir.path().join("main.toml"), self.main_lines.join("\n"))
                .expect("write main.toml");
        }

        if let Some((public_key, private_key)) = self.keys {
            let secrets = format!(
                "[tidb_cloud]\npublic_key = \"{}\"\nprivate_key = \"{}\"\n",
                public_key, private_key
            );
            fs::write(temp_dir.path().join("secrets.toml"), secrets).expect("write secrets.toml");
        }

        TestConfig { temp_dir }
    }
}
