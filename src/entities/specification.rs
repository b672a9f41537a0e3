//! Specification sections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::core::identity::RecordId;

/// A specification section, e.g. "09 91 00 Painting"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    /// Unique identifier
    pub id: RecordId,

    /// Project this section belongs to
    pub project_id: RecordId,

    /// Section number, required
    pub number: String,

    /// Section title, required
    pub title: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Partial update for a specification section
#[derive(Debug, Clone, Default)]
pub struct SpecificationPatch {
    pub number: Option<String>,
    pub title: Option<String>,
}

impl SpecificationPatch {
    pub fn apply(&self, spec: &mut Specification) {
        if let Some(v) = &self.number {
            spec.number = v.clone();
        }
        if let Some(v) = &self.title {
            spec.title = v.clone();
        }
    }
}

/// Numeric-aware string ordering for section numbers
///
/// Digit runs compare as integers so "2" sorts before "10" and
/// "09 91 00" before "09 91 13"; everything else compares
/// case-insensitively character by character.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();

    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let na = take_number(&mut ca);
                    let nb = take_number(&mut cb);
                    match na.cmp(&nb) {
                        Ordering::Equal => continue,
                        other => return other,
                    }
                }
                let x = x.to_ascii_lowercase();
                let y = y.to_ascii_lowercase();
                if x != y {
                    return x.cmp(&y);
                }
                ca.next();
                cb.next();
            }
        }
    }
}

// Consumes a digit run, comparing by (value, length) so leading zeros
// still order deterministically ("007" after "7").
fn take_number(chars: &mut std::iter::Peekable<std::str::Chars>) -> (u128, usize) {
    let mut value: u128 = 0;
    let mut len = 0;
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        value = value.saturating_mul(10).saturating_add((c as u8 - b'0') as u128);
        len += 1;
        chars.next();
    }
    (value, len)
}
