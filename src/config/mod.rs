//! @acp:module "Configuration"
//! @acp:summary "Client configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config
//!
//! Configuration
//!
//! Client configuration loading and defaults. Stored as JSON in
//! `.testbank.config.json` next to where the CLI runs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = ".testbank.config.json";

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_max_negotiation_rounds() -> u32 {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// Main client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the question bank server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Endpoint paths, relative to `server_url`
    #[serde(default)]
    pub endpoints: Endpoints,

    /// Where generated test artifacts are written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_dir: Option<PathBuf>,

    /// Hand generated artifacts to the platform opener
    #[serde(default = "default_true")]
    pub open_artifacts: bool,

    /// Upper bound on shortfall/retry rounds during random selection
    #[serde(default = "default_max_negotiation_rounds")]
    pub max_negotiation_rounds: u32,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            endpoints: Endpoints::default(),
            artifact_dir: None,
            open_artifacts: true,
            max_negotiation_rounds: default_max_negotiation_rounds(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Load config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_FILE).unwrap_or_default()
    }

    /// Directory generated artifacts are written to
    pub fn artifact_dir(&self) -> PathBuf {
        self.artifact_dir
            .clone()
            .or_else(|| dirs::download_dir().map(|d| d.join("testbank")))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Endpoint paths on the question bank server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Question pool retrieval (also used for manual search)
    pub pool: String,
    /// Point- and count-bounded subset selection
    pub select: String,
    /// Test creation
    pub create: String,
    /// Generated test artifact
    pub generate: String,
    /// Questions of an existing test, suffixed with the test id
    pub modify_load: String,
    /// Update of an existing test
    pub modify_submit: String,
    /// New question submission
    pub process_question: String,
    pub add_record: String,
    pub add_new_tester: String,
    pub add_existing_tester: String,
    pub update_score: String,
    pub update_date: String,
    pub update_status: String,
    pub display_history: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            pool: "/get_questions".to_string(),
            select: "/select_questions".to_string(),
            create: "/test_creation".to_string(),
            generate: "/generate_test".to_string(),
            modify_load: "/get-questions-for-modify".to_string(),
            modify_submit: "/handle_test_creation_for_modify".to_string(),
            process_question: "/process_question".to_string(),
            add_record: "/add_record".to_string(),
            add_new_tester: "/add_new_tester".to_string(),
            add_existing_tester: "/add_existing_tester".to_string(),
            update_score: "/update_score".to_string(),
            update_date: "/update_date".to_string(),
            update_status: "/update_status".to_string(),
            display_history: "/display_history".to_string(),
        }
    }
}
