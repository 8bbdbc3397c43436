use super::model::{ChangeKind, HeaderDiffEntry};
use crate::common::utils::lowercase_keys;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Compare two header maps by lower-cased key.
///
/// Keys in `ignore` are dropped from both sides before comparing. Entries are
/// returned in key order.
pub fn compare_headers(
    left: &HashMap<String, String>,
    right: &HashMap<String, String>,
    ignore: &[String],
) -> Vec<HeaderDiffEntry> {
    let ignored: HashSet<String> = ignore.iter().map(|k| k.to_lowercase()).collect();
    let left = lowercase_keys(left);
    let right = lowercase_keys(right);

    let keys: BTreeSet<&String> = left
        .keys()
        .chain(right.keys())
        .filter(|k| !ignored.contains(*k))
        .collect();

    keys.into_iter()
        .filter_map(|key| match (left.get(key), right.get(key)) {
            (None, Some(r)) => Some(HeaderDiffEntry {
                key: key.clone(),
                kind: ChangeKind::Added,
                left_value: None,
                right_value: Some(r.clone()),
            }),
            (Some(l), None) => Some(HeaderDiffEntry {
                key: key.clone(),
                kind: ChangeKind::Removed,
                left_value: Some(l.clone()),
                right_value: None,
            }),
            (Some(l), Some(r)) if l != r => Some(HeaderDiffEntry {
                key: key.clone(),
                kind: ChangeKind::Modified,
                left_value: Some(l.clone()),
                right_value: Some(r.clone()),
            }),
            _ => None,
        })
        .collect()
}
