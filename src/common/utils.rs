use std::collections::HashMap;

/// Current wall clock time as Unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a process-unique identifier with the given prefix.
///
/// Backed by random v4 UUIDs, so concurrent callers never need to coordinate.
pub fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Copy a header map with every key lower-cased.
///
/// Keys that differ only in case are merged, their values comma-joined in
/// order of the original key.
pub fn lowercase_keys(headers: &HashMap<String, String>) -> HashMap<String, String> {
    let mut pairs: Vec<(&String, &String)> = headers.iter().collect();
    pairs.sort();

    let mut lowered: HashMap<String, String> = HashMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        lowered
            .entry(key.to_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.clone());
    }
    lowered
}

/// Convert timestamp (milliseconds) to ISO 8601 string
pub fn format_timestamp(ts: i64) -> String {
    use chrono::{TimeZone, Utc};

    if ts == 0 {
        return "".to_string();
    }

    Utc.timestamp_millis_opt(ts)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}
