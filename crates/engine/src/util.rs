//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use chrono::NaiveDate;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse a stored `YYYY-MM-DD` date.
///
/// Stored dates come from free-form input in older data, so a bad value is
/// logged and dropped instead of failing the whole listing.
pub(crate) fn parse_stored_date(value: Option<&str>, record_id: &str) -> Option<NaiveDate> {
    let raw = value.map(str::trim).filter(|v| !v.is_empty())?;
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(err) => {
            tracing::warn!("record {record_id}: ignoring unparseable date {raw:?}: {err}");
            None
        }
    }
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Case, accent and punctuation insensitive key used for category uniqueness.
///
/// `"Ahorro e Inversión"` and `"ahorro  e inversion!"` share the same key.
pub(crate) fn normalize_category_key(value: &str) -> ResultEngine<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in value.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim();
    if normalized.is_empty() {
        return Err(EngineError::InvalidName(
            "category name must contain letters or digits".to_string(),
        ));
    }
    Ok(normalized.to_string())
}

/// Validate a `#rrggbb` color tag.
pub(crate) fn normalize_color(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    let valid = trimmed.len() == 7
        && trimmed.starts_with('#')
        && trimmed[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(EngineError::InvalidName(format!(
            "invalid color tag: {trimmed}"
        )));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// A recorded amount must lie in `0..=Money::MAX_RECORD`.
pub(crate) fn require_amount(amount: Money, label: &str) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(format!("{label} must be >= 0")));
    }
    if amount > Money::MAX_RECORD {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must be <= {}",
            Money::MAX_RECORD
        )));
    }
    Ok(())
}
