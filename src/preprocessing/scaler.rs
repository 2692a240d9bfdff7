//! Zero-mean / unit-variance scaling

use crate::error::{PredictorError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters for one fitted column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: f64,
    /// Population standard deviation, or 1.0 when the column is constant
    pub scale: f64,
}

/// Standard scaler: `(x - mean) / std`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: HashMap<String, ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| PredictorError::FeatureNotFound(col_name.to_string()))?;

            let params = Self::compute_params(column)?;
            self.params.insert(col_name.to_string(), params);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale every fitted column. Builds all replacement columns first, then
    /// applies them in a single pass.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PredictorError::ModelNotFitted);
        }

        let replacements = self
            .params
            .iter()
            .map(|(col_name, params)| {
                let column = df
                    .column(col_name)
                    .map_err(|_| PredictorError::FeatureNotFound(col_name.clone()))?;
                Self::scale_column(column, params)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result.with_column(scaled)?;
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn params(&self, column: &str) -> Option<ScalerParams> {
        self.params.get(column).copied()
    }

    fn compute_params(column: &Column) -> Result<ScalerParams> {
        let casted = column.cast(&DataType::Float64)?;
        let ca = casted.f64()?;

        let mean = ca.mean().unwrap_or(0.0);
        let std = ca.std(0).unwrap_or(0.0);
        Ok(ScalerParams {
            mean,
            scale: if std == 0.0 || !std.is_finite() { 1.0 } else { std },
        })
    }

    fn scale_column(column: &Column, params: &ScalerParams) -> Result<Series> {
        let casted = column.cast(&DataType::Float64)?;
        let scaled: Float64Chunked = casted
            .f64()?
            .into_iter()
            .map(|opt| opt.map(|v| (v - params.mean) / params.scale))
            .collect();

        Ok(scaled.with_name(column.name().clone()).into_series())
    }
}
