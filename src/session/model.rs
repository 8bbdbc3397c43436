//! Flow Data Models - HAR 1.2 Compatible
//!
//! The subset of RelayCraft's captured flow format needed to feed replay and
//! diff. Unknown fields are ignored, so full session exports parse as well.

use crate::common::models::{ResponseSnapshot, ResponseTiming};
use crate::common::utils::now_millis;
use crate::replay::CapturedRequest;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==================== HAR 1.2 Standard Types ====================

/// HAR standard header
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct HarHeader {
    pub name: String,
    pub value: String,
}

/// HAR standard post data
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct HarPostData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// HAR standard content
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct HarContent {
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// HAR standard timings (milliseconds)
/// -1 means not applicable
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct HarTimings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive: Option<f64>,
}

// ==================== Core Structures ====================

/// Flow request
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FlowRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Vec<HarHeader>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_data: Option<HarPostData>,
}

/// Flow response
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FlowResponse {
    pub status: i32,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: Vec<HarHeader>,
    #[serde(default)]
    pub content: HarContent,
}

/// Complete Flow structure
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: String,
    #[serde(default)]
    pub started_date_time: String,
    /// Total elapsed time in milliseconds
    #[serde(default)]
    pub time: f64,
    pub request: FlowRequest,
    #[serde(default)]
    pub response: Option<FlowResponse>,
    #[serde(default)]
    pub timings: HarTimings,
}

/// Session container
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub flows: Vec<Flow>,
}

// ==================== Conversions ====================

/// Collapse HAR header pairs into a map; repeated names are comma-joined
pub fn headers_to_map(headers: &[HarHeader]) -> HashMap<String, String> {
    let mut map: HashMap<String, String> = HashMap::new();
    for header in headers {
        map.entry(header.name.clone())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&header.value);
            })
            .or_insert_with(|| header.value.clone());
    }
    map
}

/// HAR uses -1 for "not measured"
fn measured(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v >= 0.0)
}

/// Parse an ISO 8601 timestamp to Unix milliseconds
pub fn parse_timestamp(value: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

impl HarContent {
    /// Body text, decoding base64 content.
    ///
    /// Decoded bytes that are not UTF-8 are mapped one byte per char, which
    /// keeps control bytes visible to the binary heuristic.
    pub fn decoded_text(&self) -> String {
        let text = self.text.clone().unwrap_or_default();
        if self.encoding.as_deref() != Some("base64") {
            return text;
        }

        match base64::engine::general_purpose::STANDARD.decode(text.trim()) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(s) => s,
                Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
            },
            Err(e) => {
                log::warn!("Failed to decode base64 body, keeping raw text: {}", e);
                text
            }
        }
    }
}

impl FlowResponse {
    pub fn to_snapshot(&self, total: f64, timings: &HarTimings, timestamp: i64) -> ResponseSnapshot {
        ResponseSnapshot {
            status: u16::try_from(self.status).unwrap_or_default(),
            status_text: self.status_text.clone(),
            headers: headers_to_map(&self.headers),
            body: self.content.decoded_text(),
            timing: ResponseTiming {
                total,
                dns: measured(timings.dns),
                connect: measured(timings.connect),
                tls: measured(timings.ssl),
                ttfb: measured(timings.wait),
                download: measured(timings.receive),
            },
            timestamp,
        }
    }
}

impl Flow {
    /// Turn a captured flow into replay input, keeping its response (if the
    /// flow completed) as the baseline for diffing.
    pub fn to_captured_request(&self) -> CapturedRequest {
        let timestamp = parse_timestamp(&self.started_date_time).unwrap_or_else(now_millis);
        let response = self
            .response
            .as_ref()
            .filter(|r| r.status > 0)
            .map(|r| r.to_snapshot(self.time, &self.timings, timestamp));

        CapturedRequest {
            id: self.id.clone(),
            timestamp,
            source: "har".to_string(),
            method: self.request.method.clone(),
            url: self.request.url.clone(),
            headers: headers_to_map(&self.request.headers),
            body: self
                .request
                .post_data
                .as_ref()
                .and_then(|p| p.text.clone()),
            response,
        }
    }
}

impl Session {
    pub fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.flows.iter().map(Flow::to_captured_request).collect()
    }
}
