//! Display formatting for counts, numbers and timestamps.

use chrono::{DateTime, Local};
use serde_json::Value;

/// Group an integer with commas: `12345` -> `"12,345"`.
pub fn format_count(n: u64) -> String {
    group_digits(&n.to_string())
}

/// Format a JSON scalar the way the dashboard shows it.
///
/// Integers are comma grouped, floats are grouped with at most three
/// fraction digits, strings are returned as-is (callers escape them).
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                format_count(u)
            } else if let Some(i) = n.as_i64() {
                format!("-{}", format_count(i.unsigned_abs()))
            } else {
                n.as_f64().map(format_float).unwrap_or_else(|| n.to_string())
            }
        }
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Render epoch seconds as a local date-time string,
/// e.g. `Tue Nov 14 2023 22:13:20 GMT+0000`.
///
/// Returns `None` when the timestamp is out of range.
pub fn format_timestamp(epoch_secs: i64) -> Option<String> {
    let utc = DateTime::from_timestamp(epoch_secs, 0)?;
    Some(
        utc.with_timezone(&Local)
            .format("%a %b %d %Y %H:%M:%S GMT%z")
            .to_string(),
    )
}

fn format_float(f: f64) -> String {
    if !f.is_finite() {
        return f.to_string();
    }
    let rounded = format!("{:.3}", f.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');
    let sign = if f < 0.0 && (int_part != "0" || !frac.is_empty()) {
        "-"
    } else {
        ""
    };
    if frac.is_empty() {
        format!("{sign}{}", group_digits(int_part))
    } else {
        format!("{sign}{}.{frac}", group_digits(int_part))
    }
}

fn group_digits(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}
