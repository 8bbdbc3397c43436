use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::error::AppError;
use crate::diff::DiffOptions;
use crate::logging;
use crate::replay::{EnvironmentMapping, SequenceOptions};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamProxyConfig {
    pub enabled: bool,
    pub url: String,
    pub bypass_domains: String,
}

/// Settings for the stock reqwest-based caller
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HttpClientConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub ssl_insecure: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub upstream_proxy: UpstreamProxyConfig,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("RelayCraft-Replay/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            ssl_insecure: false,
            user_agent: default_user_agent(),
            upstream_proxy: UpstreamProxyConfig::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvDiffConfig {
    #[serde(default)]
    pub verbose_logging: bool,
    /// Root for domain log files; domain logging stays off when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub diff: DiffOptions,
    #[serde(default)]
    pub environments: EnvironmentMapping,
    #[serde(default)]
    pub sequence: SequenceOptions,
    #[serde(default)]
    pub http: HttpClientConfig,
}

impl EnvDiffConfig {
    /// Reject settings that would make every replay or diff fail
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.diff.timing_threshold.is_finite() || self.diff.timing_threshold < 0.0 {
            return Err(AppError::Config(format!(
                "timingThreshold must be a non-negative number, got {}",
                self.diff.timing_threshold
            )));
        }
        for (name, env) in &self.environments {
            if url::Url::parse(&env.base_url).is_err() {
                return Err(AppError::Config(format!(
                    "environment {} has an invalid baseUrl: {}",
                    name, env.base_url
                )));
            }
        }
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Load configuration from a JSON or YAML file.
///
/// A missing file gives the defaults; so does a file that fails to parse,
/// after logging a warning. A file that parses but fails `validate` is an
/// error.
pub fn load_config(path: &Path) -> Result<EnvDiffConfig, AppError> {
    if !path.exists() {
        return Ok(EnvDiffConfig::default());
    }

    let content = fs::read_to_string(path)?;

    let parsed = if is_yaml(path) {
        serde_yaml::from_str::<EnvDiffConfig>(&content).map_err(AppError::from)
    } else {
        serde_json::from_str::<EnvDiffConfig>(&content).map_err(AppError::from)
    };

    match parsed {
        Ok(config) => {
            config.validate()?;
            Ok(config)
        }
        Err(e) => {
            log::warn!("Failed to parse {:?}, using defaults: {}", path, e);
            Ok(EnvDiffConfig::default())
        }
    }
}

pub fn save_config(path: &Path, config: &EnvDiffConfig) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = if is_yaml(path) {
        serde_yaml::to_string(config)?
    } else {
        serde_json::to_string_pretty(config)?
    };
    fs::write(path, content)?;
    let _ = logging::write_domain_log("audit", &format!("Saved configuration to {:?}", path));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::EnvironmentConfig;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EnvDiffConfig::default();
        assert!(!config.verbose_logging);
        assert_eq!(config.diff.timing_threshold, 20.0);
        assert!(config.sequence.continue_on_error);
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.environments.is_empty());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("absent.json")).unwrap();
        assert_eq!(config, EnvDiffConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config").join("envdiff.json");

        let mut config = EnvDiffConfig::default();
        config.environments.insert(
            "staging".into(),
            EnvironmentConfig::new("https://staging.example.com"),
        );
        config.sequence.delay_ms = 250;
        save_config(&path, &config).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_yaml_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("envdiff.yaml");
        fs::write(
            &path,
            "environments:\n  staging:\n    baseUrl: https://staging.example.com\n    headers:\n      X-Env: staging\ndiff:\n  timingThreshold: 50\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        let staging = config.environments.get("staging").unwrap();
        assert_eq!(staging.base_url, "https://staging.example.com");
        assert_eq!(staging.headers.as_ref().unwrap().get("X-Env").unwrap(), "staging");
        assert_eq!(config.diff.timing_threshold, 50.0);
        // Untouched fields keep their defaults
        assert_eq!(config.diff.ignore_headers.len(), 4);
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_environment_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("envdiff.json");
        fs::write(&path, r#"{"environments":{"broken":{"baseUrl":"not a url"}}}"#).unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("broken")));
    }

    #[test]
    fn test_negative_threshold_is_rejected() {
        let mut config = EnvDiffConfig::default();
        config.diff.timing_threshold = -1.0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_unparsable_file_falls_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("envdiff.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config(&path).unwrap(), EnvDiffConfig::default());
    }
}
