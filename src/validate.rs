use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;

use crate::error::ValidationError;
use crate::record::{Photo, Record, RecordDraft, RecordStatus};

/// Pace must be "minutes:seconds" with exactly two second digits, e.g. "5:30".
static PACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+:\d{2}$").expect("pace pattern compiles"));

pub fn pace_is_valid(pace: &str) -> bool {
    PACE_PATTERN.is_match(pace)
}

/// Today's date as an ISO 8601 calendar date, the default when a submission
/// omits the date.
pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// A draft that passed validation, with normalized fields: trimmed strings,
/// numeric distance, date default-filled.
#[derive(Debug, Clone)]
pub struct ValidDraft {
    pub name: String,
    pub distance: f64,
    pub pace: String,
    pub date: String,
    pub reflections: String,
    pub photo: Option<Photo>,
    pub status: RecordStatus,
}

/// Check a candidate record before admission to the store.
///
/// Fail-fast: rules run in order and the first failing one is returned, so a
/// caller gets exactly one field-level error per attempt. A missing date is
/// not a failure; it is filled with today's date.
pub fn validate_draft(draft: &RecordDraft) -> Result<ValidDraft, ValidationError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingField("name"));
    }

    if !draft.distance.is_finite() || draft.distance <= 0.0 {
        return Err(ValidationError::InvalidField("distance"));
    }

    let pace = draft.pace.trim();
    if !pace_is_valid(pace) {
        return Err(ValidationError::InvalidField("pace"));
    }

    let date = match draft.date.as_deref().map(str::trim) {
        Some(date) if !date.is_empty() => date.to_string(),
        _ => today(),
    };

    Ok(ValidDraft {
        name: name.to_string(),
        distance: draft.distance,
        pace: pace.to_string(),
        date,
        reflections: draft
            .reflections
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        photo: draft.photo.clone(),
        status: draft.status.unwrap_or_default(),
    })
}

/// Re-check the invariants on a fully merged record, used after applying a
/// partial update so a patch can never take a persisted record out of
/// invariant.
pub fn validate_record(record: &Record) -> Result<(), ValidationError> {
    if record.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if !record.distance.is_finite() || record.distance <= 0.0 {
        return Err(ValidationError::InvalidField("distance"));
    }
    if !pace_is_valid(&record.pace) {
        return Err(ValidationError::InvalidField("pace"));
    }
    Ok(())
}
