//! Missing value imputation

use crate::error::{PredictorError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Strategy for imputing missing values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with the median of observed values (numeric columns)
    Median,
    /// Replace with the most frequent observed value (categorical columns)
    MostFrequent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum ImputeValue {
    Numeric(f64),
    Text(String),
    /// Column had no observed values at fit time; nulls are left in place.
    Unobserved,
}

/// Per-column imputer with a fit/transform contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: HashMap<String, ImputeValue>,
    is_fitted: bool,
}

impl Imputer {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: HashMap::new(),
            is_fitted: false,
        }
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Learn one fill value per column from the observed (non-null) cells
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| PredictorError::FeatureNotFound(col_name.to_string()))?;

            let fill_value = self.compute_fill_value(col_name, column)?;
            self.fill_values.insert(col_name.to_string(), fill_value);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace nulls in every fitted column. Numeric columns come back as
    /// Float64, categorical columns as String.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PredictorError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (col_name, fill_value) in &self.fill_values {
            let column = df
                .column(col_name)
                .map_err(|_| PredictorError::FeatureNotFound(col_name.clone()))?;
            let filled = self.fill_column(column, fill_value)?;
            result.with_column(filled)?;
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Numeric fill value learned for `column`, if any
    pub fn numeric_fill(&self, column: &str) -> Option<f64> {
        match self.fill_values.get(column) {
            Some(ImputeValue::Numeric(v)) => Some(*v),
            _ => None,
        }
    }

    /// Categorical fill value learned for `column`, if any
    pub fn text_fill(&self, column: &str) -> Option<&str> {
        match self.fill_values.get(column) {
            Some(ImputeValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    fn compute_fill_value(&self, name: &str, column: &Column) -> Result<ImputeValue> {
        match self.strategy {
            ImputeStrategy::Median => {
                let casted = column.cast(&DataType::Float64)?;
                match casted.f64()?.median() {
                    Some(median) => Ok(ImputeValue::Numeric(median)),
                    None => {
                        warn!(column = name, "no observed values, imputing 0.0");
                        Ok(ImputeValue::Numeric(0.0))
                    }
                }
            }
            ImputeStrategy::MostFrequent => {
                let casted = column.cast(&DataType::String)?;
                match most_frequent(casted.str()?.into_iter().flatten()) {
                    Some(mode) => Ok(ImputeValue::Text(mode)),
                    None => {
                        warn!(column = name, "no observed values, nulls left in place");
                        Ok(ImputeValue::Unobserved)
                    }
                }
            }
        }
    }

    fn fill_column(&self, column: &Column, fill_value: &ImputeValue) -> Result<Series> {
        let name = column.name().clone();
        match fill_value {
            ImputeValue::Numeric(val) => {
                let casted = column.cast(&DataType::Float64)?;
                let filled: Float64Chunked = casted
                    .f64()?
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(*val)))
                    .collect();
                Ok(filled.with_name(name).into_series())
            }
            ImputeValue::Text(val) => {
                let casted = column.cast(&DataType::String)?;
                let filled: StringChunked = casted
                    .str()?
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(val.as_str())))
                    .collect();
                Ok(filled.with_name(name).into_series())
            }
            ImputeValue::Unobserved => {
                let dtype = match self.strategy {
                    ImputeStrategy::Median => DataType::Float64,
                    ImputeStrategy::MostFrequent => DataType::String,
                };
                Ok(column.cast(&dtype)?.as_materialized_series().clone())
            }
        }
    }
}

/// Most frequent value; ties go to the lexicographically smallest.
pub(crate) fn most_frequent<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for val in values {
        *counts.entry(val).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (val, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((val, count));
        }
    }
    best.map(|(val, _)| val.to_string())
}
