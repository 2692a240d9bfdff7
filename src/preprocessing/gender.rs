//! Free-text gender normalization

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

const MALE_TOKENS: &[&str] = &["m", "male", "man", "cis male", "cis-male", "msle", "mail"];
const FEMALE_TOKENS: &[&str] = &["f", "female", "woman", "cis female", "cis-female"];

/// Closed vocabulary that free-text gender answers collapse into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Trans,
    #[serde(rename = "Non-binary")]
    NonBinary,
    Other,
}

impl Gender {
    /// Classify a raw answer against the trimmed, lower-cased text.
    ///
    /// An answer equal to a token is classified by that token. Otherwise the
    /// rules are checked in priority order and the first hit wins: any male
    /// token as a substring, any female token as a substring, "trans",
    /// non-binary markers.
    pub fn from_text(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();

        if MALE_TOKENS.contains(&s.as_str()) {
            Gender::Male
        } else if FEMALE_TOKENS.contains(&s.as_str()) {
            Gender::Female
        } else if MALE_TOKENS.iter().any(|tok| s.contains(tok)) {
            Gender::Male
        } else if FEMALE_TOKENS.iter().any(|tok| s.contains(tok)) {
            Gender::Female
        } else if s.contains("trans") {
            Gender::Trans
        } else if s.contains("non-binary") || s == "nb" || s.contains("enby") || s.contains("genderqueer") {
            Gender::NonBinary
        } else {
            Gender::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Trans => "Trans",
            Gender::NonBinary => "Non-binary",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize one cell. Non-text values (nulls, numbers) map to `Other`.
pub fn normalize_gender(value: &AnyValue) -> Gender {
    match value {
        AnyValue::String(s) => Gender::from_text(s),
        AnyValue::StringOwned(s) => Gender::from_text(s.as_str()),
        _ => Gender::Other,
    }
}

/// Apply [`normalize_gender`] to every cell, producing a string series under
/// the same name with no nulls.
pub fn normalize_gender_column(column: &Column) -> PolarsResult<Series> {
    let values = (0..column.len())
        .map(|i| column.get(i).map(|v| normalize_gender(&v).as_str()))
        .collect::<PolarsResult<Vec<&str>>>()?;

    Ok(Series::new(column.name().clone(), values))
}
