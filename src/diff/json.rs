//! Semantic JSON comparison over canonical node paths.
//!
//! Paths use `.key` for object members and `[index]` for array elements. The
//! root node is addressed as `$`, and its direct members drop the leading dot
//! (`user.addresses[0].city`).

use super::model::{JsonChangeKind, JsonDiffEntry};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

pub const ROOT_PATH: &str = "$";

/// Outcome of a semantic comparison
#[derive(Debug, Clone, PartialEq)]
pub struct JsonComparison {
    pub entries: Vec<JsonDiffEntry>,
    /// Distinct paths across both documents, composite nodes included
    pub total_paths: usize,
}

impl JsonComparison {
    /// `1 - entries / total_paths`, floored at zero
    pub fn similarity(&self) -> f64 {
        if self.total_paths == 0 {
            return 1.0;
        }
        (1.0 - self.entries.len() as f64 / self.total_paths as f64).max(0.0)
    }
}

/// Runtime type name of a JSON value
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_composite(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// Leaf equality; numbers compare by value so `10`, `10.0` and `1e1` match
fn leaf_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => {
            if let (Some(a), Some(b)) = (l.as_i64(), r.as_i64()) {
                a == b
            } else if let (Some(a), Some(b)) = (l.as_u64(), r.as_u64()) {
                a == b
            } else {
                l.as_f64() == r.as_f64()
            }
        }
        _ => left == right,
    }
}

/// Enumerate every reachable node with its path, parents before children
pub fn collect_paths(value: &Value) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    walk(value, None, &mut out);
    out
}

fn walk<'a>(value: &'a Value, path: Option<&str>, out: &mut Vec<(String, &'a Value)>) {
    out.push((path.unwrap_or(ROOT_PATH).to_string(), value));

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = match path {
                    Some(p) => format!("{}.{}", p, key),
                    None => key.clone(),
                };
                walk(child, Some(&child_path), out);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                let child_path = format!("{}[{}]", path.unwrap_or(""), idx);
                walk(child, Some(&child_path), out);
            }
        }
        _ => {}
    }
}

/// Compare two parsed documents path by path.
///
/// Composite nodes are only reported when they appear, disappear or change
/// type; value changes are reported on the differing leaves.
pub fn compare_json(left: &Value, right: &Value, ignore_paths: &[String]) -> JsonComparison {
    let left_paths = collect_paths(left);
    let right_paths = collect_paths(right);

    let left_index: HashMap<&str, &Value> =
        left_paths.iter().map(|(p, v)| (p.as_str(), *v)).collect();
    let right_index: HashMap<&str, &Value> =
        right_paths.iter().map(|(p, v)| (p.as_str(), *v)).collect();

    // Left order first, then paths only the right side has
    let mut seen: HashSet<&str> = HashSet::new();
    let union: Vec<&str> = left_paths
        .iter()
        .chain(right_paths.iter())
        .map(|(p, _)| p.as_str())
        .filter(|p| seen.insert(*p))
        .collect();

    let ignored: HashSet<&str> = ignore_paths.iter().map(|p| p.as_str()).collect();
    let mut entries = Vec::new();

    for path in &union {
        if ignored.contains(path) {
            continue;
        }

        match (left_index.get(path), right_index.get(path)) {
            (None, Some(r)) => entries.push(JsonDiffEntry {
                path: path.to_string(),
                kind: JsonChangeKind::Added,
                left_value: None,
                right_value: Some((*r).clone()),
                left_type: None,
                right_type: None,
            }),
            (Some(l), None) => entries.push(JsonDiffEntry {
                path: path.to_string(),
                kind: JsonChangeKind::Removed,
                left_value: Some((*l).clone()),
                right_value: None,
                left_type: None,
                right_type: None,
            }),
            (Some(l), Some(r)) => {
                let (lt, rt) = (type_name(l), type_name(r));
                if lt != rt {
                    entries.push(JsonDiffEntry {
                        path: path.to_string(),
                        kind: JsonChangeKind::TypeChanged,
                        left_value: Some((*l).clone()),
                        right_value: Some((*r).clone()),
                        left_type: Some(lt.to_string()),
                        right_type: Some(rt.to_string()),
                    });
                } else if !is_composite(l) && !is_composite(r) && !leaf_eq(l, r) {
                    entries.push(JsonDiffEntry {
                        path: path.to_string(),
                        kind: JsonChangeKind::Modified,
                        left_value: Some((*l).clone()),
                        right_value: Some((*r).clone()),
                        left_type: None,
                        right_type: None,
                    });
                }
            }
            (None, None) => {}
        }
    }

    JsonComparison {
        entries,
        total_paths: union.len(),
    }
}
