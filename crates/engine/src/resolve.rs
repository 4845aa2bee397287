//! Candidate-key-path resolution over raw JSON values.
//!
//! Every backend service spells its field names differently, so every
//! normalizer extracts values through an ordered list of candidate key
//! paths (one level of dot nesting allowed, e.g. `product.precio`). The
//! first candidate that is present and non-null wins. These functions are
//! pure and never fail; typed helpers degrade to a caller-supplied or
//! documented default.

use rust_decimal::Decimal;
use serde_json::Value;

/// Resolve the first present, non-null value among `candidates`.
///
/// Candidates may contain a single `.` for one level of nesting. Returns
/// `None` when `raw` is not an object or no candidate matches.
#[must_use]
pub fn resolve<'a>(raw: Option<&'a Value>, candidates: &[&str]) -> Option<&'a Value> {
    let obj = raw?.as_object()?;

    for candidate in candidates {
        let found = match candidate.split_once('.') {
            Some((outer, inner)) => obj.get(outer).and_then(|v| v.get(inner)),
            None => obj.get(*candidate),
        };
        if let Some(value) = found
            && !value.is_null()
        {
            return Some(value);
        }
    }

    None
}

/// Resolve a string field, defaulting to the empty string.
///
/// Numbers are stringified (backends occasionally send numeric ids where
/// names are expected); other value types resolve to the default.
#[must_use]
pub fn resolve_string(raw: Option<&Value>, candidates: &[&str]) -> String {
    match resolve(raw, candidates) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Resolve a non-negative decimal field, defaulting to zero.
///
/// Accepts JSON numbers and numeric strings; parse failure and negative
/// values both degrade to zero rather than erroring.
#[must_use]
pub fn resolve_decimal(raw: Option<&Value>, candidates: &[&str]) -> Decimal {
    resolve(raw, candidates)
        .and_then(value_to_decimal)
        .filter(|d| !d.is_sign_negative())
        .unwrap_or(Decimal::ZERO)
}

/// Resolve a quantity field: non-negative integer, defaulting to 1 when
/// absent or unparseable.
#[must_use]
pub fn resolve_quantity(raw: Option<&Value>, candidates: &[&str]) -> u32 {
    resolve(raw, candidates).map_or(1, |v| value_to_u32(v).unwrap_or(1))
}

/// Resolve an integer id field from a number or numeric string.
#[must_use]
pub fn resolve_id(raw: Option<&Value>, candidates: &[&str]) -> Option<i64> {
    resolve(raw, candidates).and_then(value_to_i64)
}

/// Coerce a JSON value to a decimal: number or numeric string.
#[must_use]
pub fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(Decimal::from_f64_retain)
            }
        }
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}

/// Coerce a JSON value to an i64: number or numeric string.
#[must_use]
pub fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Coerce a JSON value to a non-negative integer, clamping negatives to 0.
#[must_use]
pub fn value_to_u32(value: &Value) -> Option<u32> {
    value_to_i64(value).map(|n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}
