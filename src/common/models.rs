use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-phase timing breakdown of one response, in milliseconds.
///
/// A phase is `None` when it was not measured, which is distinct from a
/// measured phase of zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTiming {
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttfb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<f64>,
}

impl ResponseTiming {
    pub fn total(total: f64) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }
}

/// Captured status, headers, body and timing of one HTTP response.
///
/// Header keys are stored as received; comparisons lower-case them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSnapshot {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub timing: ResponseTiming,
    pub timestamp: i64,
}

impl ResponseSnapshot {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers: HashMap::new(),
            body: body.into(),
            timing: ResponseTiming::default(),
            timestamp: crate::common::utils::now_millis(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_timing(mut self, timing: ResponseTiming) -> Self {
        self.timing = timing;
        self
    }
}
