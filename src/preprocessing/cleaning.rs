//! Survey cleaning and target derivation

use super::{
    age::normalize_age_column, gender::normalize_gender_column, imputer::most_frequent,
    pipeline::FeatureTransformer,
};
use crate::error::{PredictorError, Result};
use ndarray::Array1;
use polars::prelude::*;
use tracing::{debug, info};

/// Free-text or high-missingness columns removed before anything else
pub const DROPPED_COLUMNS: &[&str] = &["comments", "state", "Timestamp"];
pub const AGE_COLUMN: &str = "Age";
pub const GENDER_COLUMN: &str = "Gender";
pub const SELF_EMPLOYED_COLUMN: &str = "self_employed";
pub const WORK_INTERFERE_COLUMN: &str = "work_interfere";
pub const TARGET_COLUMN: &str = "treatment";

/// Label given to a missing `work_interfere` answer
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Output of [`preprocess_raw`]
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// Cleaned feature table, target column removed
    pub features: DataFrame,
    /// 1.0 where the respondent sought treatment, else 0.0
    pub target: Array1<f64>,
    /// Transform over `features`, not yet fit
    pub transform: FeatureTransformer,
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Row-level cleaning shared by training and inference.
///
/// Drops unused columns, normalizes `Age` and `Gender`, fills `self_employed`
/// with its mode and `work_interfere` with `"Unknown"`. Every step is skipped
/// when its column is absent.
pub fn clean_features(df: &DataFrame) -> Result<DataFrame> {
    let mut df = df.clone();

    for name in DROPPED_COLUMNS {
        if has_column(&df, name) {
            df = df.drop(name)?;
        }
    }

    if has_column(&df, AGE_COLUMN) {
        let ages = normalize_age_column(df.column(AGE_COLUMN)?)?;
        df.with_column(ages)?;
    }

    if has_column(&df, GENDER_COLUMN) {
        let genders = normalize_gender_column(df.column(GENDER_COLUMN)?)?;
        df.with_column(genders)?;
    }

    if has_column(&df, SELF_EMPLOYED_COLUMN) {
        let column = df.column(SELF_EMPLOYED_COLUMN)?.cast(&DataType::String)?;
        match most_frequent(column.str()?.into_iter().flatten()) {
            Some(mode) => {
                let filled = fill_text(&column, &mode)?;
                df.with_column(filled)?;
            }
            None => debug!(column = SELF_EMPLOYED_COLUMN, "no observed values, left unfilled"),
        }
    }

    if has_column(&df, WORK_INTERFERE_COLUMN) {
        let column = df.column(WORK_INTERFERE_COLUMN)?.cast(&DataType::String)?;
        let filled = fill_text(&column, UNKNOWN_LABEL)?;
        df.with_column(filled)?;
    }

    Ok(df)
}

fn fill_text(column: &Column, value: &str) -> Result<Series> {
    let filled: StringChunked = column
        .str()?
        .into_iter()
        .map(|opt| Some(opt.unwrap_or(value)))
        .collect();
    Ok(filled.with_name(column.name().clone()).into_series())
}

/// Binary target: 1.0 where `treatment`, trimmed and lower-cased, equals
/// `"yes"`. Nulls count as 0.0.
pub fn derive_target(df: &DataFrame) -> Result<Array1<f64>> {
    if !has_column(df, TARGET_COLUMN) {
        return Err(PredictorError::ConfigError(format!(
            "Column '{TARGET_COLUMN}' not found in dataframe"
        )));
    }

    let column = df.column(TARGET_COLUMN)?.cast(&DataType::String)?;
    let target = column
        .str()?
        .into_iter()
        .map(|v| match v {
            Some(s) if s.trim().eq_ignore_ascii_case("yes") => 1.0,
            _ => 0.0,
        })
        .collect();

    Ok(target)
}

/// Clean a raw survey table, split off the target and build the (unfit)
/// feature transform over the remaining columns.
pub fn preprocess_raw(df: &DataFrame) -> Result<PreparedData> {
    let cleaned = clean_features(df)?;
    let target = derive_target(&cleaned)?;
    let features = cleaned.drop(TARGET_COLUMN)?;
    let transform = FeatureTransformer::from_frame(&features);

    info!(
        rows = features.height(),
        numeric = transform.numeric_columns().len(),
        categorical = transform.categorical_columns().len(),
        positives = target.sum() as u64,
        "Survey preprocessed"
    );

    Ok(PreparedData {
        features,
        target,
        transform,
    })
}
