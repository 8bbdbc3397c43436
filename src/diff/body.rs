use super::json::compare_json;
use super::model::{BodyCompareOptions, BodyDiffKind, BodyDiffResult};
use super::text::{line_diff, text_similarity};

/// Number of leading characters inspected by the binary heuristic
const BINARY_SAMPLE_SIZE: usize = 1000;
/// Share of control characters above which a body is treated as binary
const BINARY_THRESHOLD: f64 = 0.1;

/// Heuristic binary detection over the first `BINARY_SAMPLE_SIZE` characters.
///
/// Tab, line feed and carriage return are not counted as control characters.
pub fn looks_binary(body: &str) -> bool {
    let mut sampled = 0usize;
    let mut nonprintable = 0usize;

    for c in body.chars().take(BINARY_SAMPLE_SIZE) {
        sampled += 1;
        if c.is_control() && !matches!(c, '\t' | '\n' | '\r') {
            nonprintable += 1;
        }
    }

    sampled > 0 && nonprintable as f64 / sampled as f64 > BINARY_THRESHOLD
}

/// Classify and score the difference between two response bodies
pub fn compare_bodies(left: &str, right: &str, options: &BodyCompareOptions) -> BodyDiffResult {
    if left == right {
        return BodyDiffResult {
            kind: BodyDiffKind::Identical,
            similarity: 1.0,
            text_diff: None,
            json_diff: None,
        };
    }

    if looks_binary(left) || looks_binary(right) {
        return BodyDiffResult {
            kind: BodyDiffKind::Binary,
            similarity: 0.0,
            text_diff: None,
            json_diff: None,
        };
    }

    if options.semantic_json_diff {
        // Unparsable JSON is not an error, it just takes the text path
        if let (Ok(l), Ok(r)) = (
            serde_json::from_str::<serde_json::Value>(left),
            serde_json::from_str::<serde_json::Value>(right),
        ) {
            let comparison = compare_json(&l, &r, &options.ignore_json_paths);
            return BodyDiffResult {
                kind: BodyDiffKind::JsonSemantic,
                similarity: comparison.similarity(),
                text_diff: None,
                json_diff: Some(comparison.entries),
            };
        }
    }

    BodyDiffResult {
        kind: BodyDiffKind::Different,
        similarity: text_similarity(left, right),
        text_diff: Some(line_diff(left, right)),
        json_diff: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::{JsonChangeKind, LineChange};
    use rstest::rstest;

    fn options() -> BodyCompareOptions {
        BodyCompareOptions::default()
    }

    #[test]
    fn test_identical() {
        let result = compare_bodies("hello", "hello", &options());
        assert_eq!(result.kind, BodyDiffKind::Identical);
        assert_eq!(result.similarity, 1.0);
        assert!(!result.has_difference());
    }

    #[rstest]
    #[case(16, 84, true)]
    #[case(10, 90, false)]
    #[case(0, 100, false)]
    fn test_binary_ratio(#[case] control: usize, #[case] text: usize, #[case] binary: bool) {
        let body = format!("{}{}", "\u{1}".repeat(control), "a".repeat(text));
        assert_eq!(body.chars().count(), 100);
        assert_eq!(looks_binary(&body), binary);
    }

    #[test]
    fn test_whitespace_controls_are_printable() {
        assert!(!looks_binary("\t\t\t\n\n\n\r\r\rab"));
        assert!(!looks_binary(""));
    }

    #[test]
    fn test_binary_classification() {
        let left = format!("{}{}", "\u{0}".repeat(16), "x".repeat(84));
        let right = format!("{}{}", "\u{0}".repeat(16), "y".repeat(84));
        let result = compare_bodies(&left, &right, &options());
        assert_eq!(result.kind, BodyDiffKind::Binary);
        assert_eq!(result.similarity, 0.0);
        assert!(result.text_diff.is_none());
    }

    #[test]
    fn test_json_key_order_irrelevant() {
        let result = compare_bodies(r#"{"a":1,"b":2}"#, r#"{"b":2,"a":1}"#, &options());
        assert_eq!(result.kind, BodyDiffKind::JsonSemantic);
        assert_eq!(result.json_diff.as_ref().unwrap().len(), 0);
        assert_eq!(result.similarity, 1.0);
        assert!(!result.has_difference());
    }

    #[test]
    fn test_json_number_forms_are_equal() {
        let result = compare_bodies(r#"{"price":10,"n":100}"#, r#"{"price":10.0,"n":1e2}"#, &options());
        assert_eq!(result.kind, BodyDiffKind::JsonSemantic);
        assert!(result.json_diff.as_ref().unwrap().is_empty());
        assert_eq!(result.similarity, 1.0);
        assert!(!result.has_difference());
    }

    #[test]
    fn test_large_disjoint_bodies_stay_bounded() {
        let left: String = (0..20_000).map(|i| format!("left line {:05} aaaaaa\n", i)).collect();
        let right: String = (0..20_000).map(|i| format!("right line {:05} bbbbb\n", i)).collect();

        let started = std::time::Instant::now();
        let result = compare_bodies(&left, &right, &options());
        assert!(started.elapsed() < std::time::Duration::from_secs(5));

        assert_eq!(result.kind, BodyDiffKind::Different);
        let lines = result.text_diff.unwrap();
        assert_eq!(lines.len(), 40_000);
        assert!(lines.iter().all(|l| l.kind != LineChange::Unchanged));
    }

    #[test]
    fn test_json_added_leaf() {
        let result = compare_bodies(r#"{"a":1}"#, r#"{"a":1,"b":2}"#, &options());
        assert_eq!(result.kind, BodyDiffKind::JsonSemantic);
        let entries = result.json_diff.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "b");
        assert_eq!(entries[0].kind, JsonChangeKind::Added);
    }

    #[test]
    fn test_json_disabled_falls_back_to_text() {
        let opts = BodyCompareOptions {
            semantic_json_diff: false,
            ..Default::default()
        };
        let result = compare_bodies(r#"{"a":1}"#, r#"{"a":2}"#, &opts);
        assert_eq!(result.kind, BodyDiffKind::Different);
        assert!(result.json_diff.is_none());
    }

    #[test]
    fn test_malformed_json_falls_back_to_text() {
        let result = compare_bodies(r#"{"a":1"#, r#"{"a":1}"#, &options());
        assert_eq!(result.kind, BodyDiffKind::Different);
        assert!(result.similarity > 0.8 && result.similarity < 1.0);
        assert!(result.has_difference());
    }

    #[test]
    fn test_text_diff_lines() {
        let result = compare_bodies("line one\nline two", "line one\nline 2", &options());
        assert_eq!(result.kind, BodyDiffKind::Different);
        let lines = result.text_diff.unwrap();
        assert_eq!(lines[0].kind, LineChange::Unchanged);
        assert!(lines.iter().any(|l| l.kind == LineChange::Removed && l.content == "line two"));
        assert!(lines.iter().any(|l| l.kind == LineChange::Added && l.content == "line 2"));
    }
}
