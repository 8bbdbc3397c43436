//! Replay Data Models

use crate::common::models::ResponseSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A request captured earlier, used as replay input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedRequest {
    pub id: String,
    pub timestamp: i64,
    /// Where the capture came from (proxy, har, manual, ...)
    pub source: String,
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseSnapshot>,
}

/// Where a replayed request is sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum ReplayTarget {
    /// The captured URL, unchanged
    Original,
    /// The captured path and query on a named environment's base URL
    NamedEnvironment(String),
    /// A literal URL replacing the captured one entirely
    Custom(String),
}

impl std::fmt::Display for ReplayTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayTarget::Original => write!(f, "original"),
            ReplayTarget::NamedEnvironment(name) => write!(f, "environment:{}", name),
            ReplayTarget::Custom(url) => write!(f, "custom:{}", url),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

impl EnvironmentConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: None,
        }
    }
}

/// Environment name to base URL (and optional headers)
pub type EnvironmentMapping = HashMap<String, EnvironmentConfig>;

/// Everything needed to replay one captured request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayConfig {
    pub captured_request: CapturedRequest,
    pub target: ReplayTarget,
    /// Replaces the executor's default mapping when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_mapping: Option<EnvironmentMapping>,
    /// Takes precedence over the URL carried by `ReplayTarget::Custom`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_overrides: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_override: Option<String>,
}

impl ReplayConfig {
    pub fn new(captured_request: CapturedRequest, target: ReplayTarget) -> Self {
        Self {
            captured_request,
            target,
            environment_mapping: None,
            custom_url: None,
            header_overrides: None,
            body_override: None,
        }
    }
}

/// The request actually sent for a replay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingRequest {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Outcome of one replay attempt.
///
/// `success` is false exactly when `error` is set and `response` is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayResult {
    pub id: String,
    pub capture_id: String,
    pub target: ReplayTarget,
    pub request: OutgoingRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseSnapshot>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: i64,
    pub completed_at: i64,
    pub duration_ms: u64,
}

impl ReplayResult {
    pub(crate) fn succeeded(
        id: String,
        config: &ReplayConfig,
        request: OutgoingRequest,
        response: ResponseSnapshot,
        started_at: i64,
        duration_ms: u64,
    ) -> Self {
        Self {
            id,
            capture_id: config.captured_request.id.clone(),
            target: config.target.clone(),
            request,
            response: Some(response),
            success: true,
            error: None,
            started_at,
            completed_at: started_at + duration_ms as i64,
            duration_ms,
        }
    }

    pub(crate) fn failed(
        id: String,
        config: &ReplayConfig,
        request: OutgoingRequest,
        error: String,
        started_at: i64,
        duration_ms: u64,
    ) -> Self {
        Self {
            id,
            capture_id: config.captured_request.id.clone(),
            target: config.target.clone(),
            request,
            response: None,
            success: false,
            error: Some(error),
            started_at,
            completed_at: started_at + duration_ms as i64,
            duration_ms,
        }
    }

    /// The replayed response, ready to diff against the captured one
    pub fn snapshot(&self) -> Option<&ResponseSnapshot> {
        self.response.as_ref()
    }
}

fn default_true() -> bool {
    true
}

/// Policy for replaying a batch of requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceOptions {
    #[serde(default = "default_true")]
    pub continue_on_error: bool,
    /// Pause between consecutive requests
    #[serde(default)]
    pub delay_ms: u64,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            delay_ms: 0,
        }
    }
}
