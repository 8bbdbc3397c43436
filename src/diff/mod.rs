//! Response comparison.
//!
//! `diff` runs the header, body and timing comparators over two snapshots and
//! folds them into one similarity-scored `DiffResult`. Every call is pure apart
//! from id generation, so concurrent calls need no coordination.

use crate::common::models::ResponseSnapshot;
use crate::common::utils::{generate_id, now_millis};
use crate::logging;
use std::fmt::Write as _;

pub mod body;
pub mod headers;
pub mod json;
pub mod model;
pub mod text;
pub mod timing;

pub use body::compare_bodies;
pub use headers::compare_headers;
pub use json::compare_json;
pub use model::*;
pub use text::text_similarity;
pub use timing::compare_timing;

/// Header score lost per differing header
const HEADER_PENALTY: f64 = 0.1;
/// Timing score when the change exceeds the threshold
const SLOW_TIMING_SCORE: f64 = 0.5;

/// Compare two response snapshots
pub fn diff(left: &ResponseSnapshot, right: &ResponseSnapshot, options: &DiffOptions) -> DiffResult {
    let status_diff = StatusDiff {
        identical: left.status == right.status && left.status_text == right.status_text,
        left_status: left.status,
        left_status_text: left.status_text.clone(),
        right_status: right.status,
        right_status_text: right.status_text.clone(),
    };

    let header_diff = compare_headers(&left.headers, &right.headers, &options.ignore_headers);

    let body_diff = compare_bodies(
        &left.body,
        &right.body,
        &BodyCompareOptions {
            semantic_json_diff: options.semantic_json_diff,
            ignore_json_paths: options.ignore_json_paths.clone(),
        },
    );

    let timing_diff = compare_timing(&left.timing, &right.timing);
    let significant_timing = timing_diff.percentage_change.abs() > options.timing_threshold;

    // Equal weights across the four components
    let status_score = if status_diff.identical { 1.0 } else { 0.0 };
    let header_score = (1.0 - HEADER_PENALTY * header_diff.len() as f64).max(0.0);
    let body_score = body_diff.similarity;
    let timing_score = if significant_timing {
        SLOW_TIMING_SCORE
    } else {
        1.0
    };
    let overall_similarity =
        ((status_score + header_score + body_score + timing_score) / 4.0).clamp(0.0, 1.0);

    let summary = DiffSummary {
        has_status_diff: !status_diff.identical,
        has_header_diff: !header_diff.is_empty(),
        has_body_diff: body_diff.has_difference(),
        has_significant_timing_diff: significant_timing,
        overall_similarity,
    };

    let result = DiffResult {
        id: generate_id("diff"),
        left: left.clone(),
        right: right.clone(),
        status_diff,
        header_diff,
        body_diff,
        timing_diff,
        summary,
        created_at: now_millis(),
    };

    log::debug!(
        "Computed diff {}: similarity={:.3}, headers={}, body={}",
        result.id,
        overall_similarity,
        result.header_diff.len(),
        result.body_diff.kind.as_str()
    );
    let _ = logging::write_domain_log(
        "diff",
        &format!(
            "{} status={}->{} similarity={:.1}%",
            result.id,
            left.status,
            right.status,
            overall_similarity * 100.0
        ),
    );

    result
}

/// Render a multi-line, human-readable report of a diff
pub fn summarize(result: &DiffResult) -> String {
    let mut out = String::new();
    let status = &result.status_diff;

    let _ = writeln!(out, "Diff: {}", result.id);
    let _ = writeln!(
        out,
        "Overall similarity: {:.1}%",
        result.summary.overall_similarity * 100.0
    );

    if status.identical {
        let _ = writeln!(
            out,
            "Status: {} {} ✓",
            status.left_status, status.left_status_text
        );
    } else {
        let _ = writeln!(
            out,
            "Status: {} {} → {} {}",
            status.left_status, status.left_status_text, status.right_status, status.right_status_text
        );
    }

    if result.header_diff.is_empty() {
        let _ = writeln!(out, "Headers: no differences");
    } else {
        let _ = writeln!(out, "Headers: {} difference(s)", result.header_diff.len());
        for entry in &result.header_diff {
            let left = entry.left_value.as_deref().unwrap_or_default();
            let right = entry.right_value.as_deref().unwrap_or_default();
            let _ = match entry.kind {
                ChangeKind::Added => writeln!(out, "  + {}: {}", entry.key, right),
                ChangeKind::Removed => writeln!(out, "  - {}: {}", entry.key, left),
                ChangeKind::Modified => writeln!(out, "  ~ {}: {} → {}", entry.key, left, right),
            };
        }
    }

    let _ = writeln!(
        out,
        "Body: {} ({:.1}% similar)",
        result.body_diff.kind.as_str(),
        result.body_diff.similarity * 100.0
    );
    let _ = write!(
        out,
        "Timing: {:+.0}ms ({:+.1}%)",
        result.timing_diff.total_delta, result.timing_diff.percentage_change
    );

    out
}
