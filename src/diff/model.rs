//! Diff Data Models
//!
//! Result types produced by the comparators. Every result is built once and
//! never mutated afterwards.

use crate::common::models::ResponseSnapshot;
use serde::{Deserialize, Serialize};

// ==================== Options ====================

fn default_ignore_headers() -> Vec<String> {
    ["date", "x-request-id", "x-correlation-id", "set-cookie"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

fn default_timing_threshold() -> f64 {
    20.0
}

fn default_true() -> bool {
    true
}

/// Options for a full response diff.
///
/// Each field a caller sets replaces the default for that field outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffOptions {
    /// Header names skipped on both sides (case-insensitive)
    #[serde(default = "default_ignore_headers")]
    pub ignore_headers: Vec<String>,
    /// JSON paths skipped on both sides (exact match)
    #[serde(default)]
    pub ignore_json_paths: Vec<String>,
    /// Percentage change above which timing counts as a significant difference
    #[serde(default = "default_timing_threshold")]
    pub timing_threshold: f64,
    #[serde(default = "default_true")]
    pub semantic_json_diff: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            ignore_headers: default_ignore_headers(),
            ignore_json_paths: Vec::new(),
            timing_threshold: default_timing_threshold(),
            semantic_json_diff: true,
        }
    }
}

/// Options for the body comparator alone
#[derive(Debug, Clone, PartialEq)]
pub struct BodyCompareOptions {
    pub semantic_json_diff: bool,
    pub ignore_json_paths: Vec<String>,
}

impl Default for BodyCompareOptions {
    fn default() -> Self {
        Self {
            semantic_json_diff: true,
            ignore_json_paths: Vec::new(),
        }
    }
}

// ==================== Headers ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderDiffEntry {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_value: Option<String>,
}

// ==================== Body ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JsonChangeKind {
    Added,
    Removed,
    Modified,
    TypeChanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonDiffEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: JsonChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineChange {
    Unchanged,
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDiffLine {
    #[serde(rename = "type")]
    pub kind: LineChange,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyDiffKind {
    Identical,
    Different,
    JsonSemantic,
    Binary,
}

impl BodyDiffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyDiffKind::Identical => "identical",
            BodyDiffKind::Different => "different",
            BodyDiffKind::JsonSemantic => "json-semantic",
            BodyDiffKind::Binary => "binary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyDiffResult {
    #[serde(rename = "type")]
    pub kind: BodyDiffKind,
    pub similarity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_diff: Option<Vec<TextDiffLine>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_diff: Option<Vec<JsonDiffEntry>>,
}

impl BodyDiffResult {
    /// Whether the bodies differ in a way worth flagging.
    ///
    /// A semantic JSON comparison with no entries (reordered keys, whitespace)
    /// counts as no difference.
    pub fn has_difference(&self) -> bool {
        match self.kind {
            BodyDiffKind::Identical => false,
            BodyDiffKind::JsonSemantic => self
                .json_diff
                .as_ref()
                .map_or(false, |entries| !entries.is_empty()),
            BodyDiffKind::Different | BodyDiffKind::Binary => true,
        }
    }
}

// ==================== Timing ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingDiffResult {
    pub total_delta: f64,
    pub percentage_change: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttfb_delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_delta: Option<f64>,
}

// ==================== Aggregate ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDiff {
    pub identical: bool,
    pub left_status: u16,
    pub left_status_text: String,
    pub right_status: u16,
    pub right_status_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub has_status_diff: bool,
    pub has_header_diff: bool,
    pub has_body_diff: bool,
    pub has_significant_timing_diff: bool,
    pub overall_similarity: f64,
}

/// Complete comparison of two response snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub id: String,
    pub left: ResponseSnapshot,
    pub right: ResponseSnapshot,
    pub status_diff: StatusDiff,
    pub header_diff: Vec<HeaderDiffEntry>,
    pub body_diff: BodyDiffResult,
    pub timing_diff: TimingDiffResult,
    pub summary: DiffSummary,
    pub created_at: i64,
}

impl DiffResult {
    /// True when none of the four difference flags is raised
    pub fn is_equivalent(&self) -> bool {
        !(self.summary.has_status_diff
            || self.summary.has_header_diff
            || self.summary.has_body_diff
            || self.summary.has_significant_timing_diff)
    }
}
