use super::model::{LineChange, TextDiffLine};
use similar::{ChangeTag, TextDiff};
use std::time::Duration;

/// Above this many characters the edit distance table is skipped
pub const EDIT_DISTANCE_LIMIT: usize = 10_000;
/// Budget for the line diff; past it the remaining ranges are emitted as
/// whole removals and additions
pub const LINE_DIFF_TIMEOUT: Duration = Duration::from_millis(500);

/// Similarity of two strings in `[0, 1]`.
///
/// Short inputs use `1 - levenshtein / max_len`. Longer inputs fall back to
/// counting equal characters at equal positions, which is linear but blind to
/// insertions.
pub fn text_similarity(left: &str, right: &str) -> f64 {
    if left == right {
        return 1.0;
    }
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();
    let max_len = left.len().max(right.len());

    if max_len > EDIT_DISTANCE_LIMIT {
        let matches = left
            .iter()
            .zip(right.iter())
            .filter(|(a, b)| a == b)
            .count();
        return matches as f64 / max_len as f64;
    }

    let distance = levenshtein(&left, &right);
    (1.0 - distance as f64 / max_len as f64).clamp(0.0, 1.0)
}

/// Edit distance over characters
pub fn levenshtein(left: &[char], right: &[char]) -> usize {
    if left.is_empty() {
        return right.len();
    }
    if right.is_empty() {
        return left.len();
    }

    let mut prev: Vec<usize> = (0..=right.len()).collect();
    let mut curr = vec![0; right.len() + 1];

    for (i, lc) in left.iter().enumerate() {
        curr[0] = i + 1;
        for (j, rc) in right.iter().enumerate() {
            let cost = if lc == rc { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[right.len()]
}

/// Line-oriented diff, each line tagged unchanged/added/removed.
///
/// Bounded by `LINE_DIFF_TIMEOUT`, so the result may be coarser than minimal
/// on large inputs but always covers every line of both sides.
pub fn line_diff(left: &str, right: &str) -> Vec<TextDiffLine> {
    TextDiff::configure()
        .timeout(LINE_DIFF_TIMEOUT)
        .diff_lines(left, right)
        .iter_all_changes()
        .map(|change| TextDiffLine {
            kind: match change.tag() {
                ChangeTag::Equal => LineChange::Unchanged,
                ChangeTag::Insert => LineChange::Added,
                ChangeTag::Delete => LineChange::Removed,
            },
            content: change.value().trim_end_matches(['\r', '\n']).to_string(),
        })
        .collect()
}
