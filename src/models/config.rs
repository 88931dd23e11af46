use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_share_tolerance() -> f64 {
    0.01
}

fn default_max_retries() -> usize {
    2
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("output/artifacts")
}

fn default_oracle_model() -> String {
    "gemini-1.5-flash-002".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_temperature() -> f32 {
    0.0
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

/// Reasoning-oracle client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_oracle_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: default_oracle_model(),
            api_base: default_api_base(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VeridocConfig {
    /// Allowed deviation of share sums from 1.0
    #[serde(default = "default_share_tolerance")]
    pub share_tolerance: f64,

    /// Maximum semantic retries (at most max_retries + 1 verification passes)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Where per-validator audit snapshots are written
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    #[serde(default)]
    pub oracle: OracleConfig,
}

impl Default for VeridocConfig {
    fn default() -> Self {
        Self {
            share_tolerance: default_share_tolerance(),
            max_retries: default_max_retries(),
            artifacts_dir: default_artifacts_dir(),
            oracle: OracleConfig::default(),
        }
    }
}

impl VeridocConfig {
    /// Load config from veridoc.toml under the given root, falling back to
    /// defaults when the file does not exist.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let config_path = root.join("veridoc.toml");
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: VeridocConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
