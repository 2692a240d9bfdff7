//! Column-wise feature transform: impute + scale numeric, impute + one-hot categorical

use super::{
    encoder::OneHotEncoder,
    imputer::{ImputeStrategy, Imputer},
    scaler::StandardScaler,
};
use crate::error::{PredictorError, Result};
use ndarray::{concatenate, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Check if dtype is numeric
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Reusable transform from a cleaned feature table to a dense numeric matrix.
///
/// Output layout is the numeric columns (in the order given) followed by one
/// one-hot block per categorical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTransformer {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    numeric_imputer: Imputer,
    scaler: StandardScaler,
    categorical_imputer: Imputer,
    encoder: OneHotEncoder,
    is_fitted: bool,
}

impl FeatureTransformer {
    pub fn new(numeric_columns: Vec<String>, categorical_columns: Vec<String>) -> Self {
        Self {
            numeric_columns,
            categorical_columns,
            numeric_imputer: Imputer::new(ImputeStrategy::Median),
            scaler: StandardScaler::new(),
            categorical_imputer: Imputer::new(ImputeStrategy::MostFrequent),
            encoder: OneHotEncoder::new(),
            is_fitted: false,
        }
    }

    /// Partition the columns of `df` by dtype: integer and float columns are
    /// numeric, everything else is categorical.
    pub fn from_frame(df: &DataFrame) -> Self {
        let (numeric, categorical): (Vec<&Column>, Vec<&Column>) = df
            .get_columns()
            .iter()
            .partition(|c| is_numeric_dtype(c.dtype()));

        Self::new(
            numeric.iter().map(|c| c.name().to_string()).collect(),
            categorical.iter().map(|c| c.name().to_string()).collect(),
        )
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Fit every step on `df`. Each step is fit on the output of the one before.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let start = Instant::now();
        self.check_columns(df)?;

        let numeric: Vec<&str> = self.numeric_columns.iter().map(String::as_str).collect();
        let categorical: Vec<&str> = self.categorical_columns.iter().map(String::as_str).collect();

        let imputed = self.numeric_imputer.fit_transform(df, &numeric)?;
        self.scaler.fit(&imputed, &numeric)?;

        let imputed = self.categorical_imputer.fit_transform(df, &categorical)?;
        self.encoder.fit(&imputed, &categorical)?;

        self.is_fitted = true;
        debug!(
            rows = df.height(),
            numeric = numeric.len(),
            categorical = categorical.len(),
            features = self.n_features(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Feature transform fitted"
        );
        Ok(self)
    }

    /// Map rows of `df` to the fitted feature space
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PredictorError::ModelNotFitted);
        }
        self.check_columns(df)?;

        let numeric = self.numeric_block(df)?;
        let imputed = self.categorical_imputer.transform(df)?;
        let onehot = self.encoder.transform(&imputed)?;

        Ok(concatenate(Axis(1), &[numeric.view(), onehot.view()])?)
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Width of the transformed matrix
    pub fn n_features(&self) -> usize {
        self.numeric_columns.len() + self.encoder.n_features()
    }

    /// Human-readable name of every output column, in output order
    pub fn feature_names(&self) -> Vec<String> {
        self.numeric_columns
            .iter()
            .cloned()
            .chain(self.encoder.feature_names())
            .collect()
    }

    fn numeric_block(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let scaled = self.scaler.transform(&self.numeric_imputer.transform(df)?)?;

        let mut block = Array2::<f64>::zeros((df.height(), self.numeric_columns.len()));
        for (j, name) in self.numeric_columns.iter().enumerate() {
            let column = scaled.column(name)?;
            for (i, value) in column.f64()?.into_iter().enumerate() {
                block[[i, j]] = value.unwrap_or(0.0);
            }
        }
        Ok(block)
    }

    fn check_columns(&self, df: &DataFrame) -> Result<()> {
        let missing = self
            .numeric_columns
            .iter()
            .chain(&self.categorical_columns)
            .find(|name| df.get_column_index(name).is_none());

        match missing {
            Some(name) => Err(PredictorError::FeatureNotFound(name.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train_frame() -> DataFrame {
        df! {
            "Age" => &[Some(20_i64), Some(30), None, Some(50)],
            "Gender" => &["Male", "Female", "Male", "Other"],
            "benefits" => &[Some("Yes"), None, Some("No"), Some("No")],
        }
        .unwrap()
    }

    #[test]
    fn test_from_frame_partitions_by_dtype() {
        let transformer = FeatureTransformer::from_frame(&train_frame());
        assert_eq!(transformer.numeric_columns(), &["Age".to_string()]);
        assert_eq!(
            transformer.categorical_columns(),
            &["Gender".to_string(), "benefits".to_string()]
        );
    }

    #[test]
    fn test_fit_transform_layout() {
        let mut transformer = FeatureTransformer::from_frame(&train_frame());
        let x = transformer.fit_transform(&train_frame()).unwrap();

        assert_eq!(
            transformer.feature_names(),
            vec![
                "Age",
                "Gender_Female",
                "Gender_Male",
                "Gender_Other",
                "benefits_No",
                "benefits_Yes",
            ]
        );
        assert_eq!(x.dim(), (4, 6));

        // Missing age imputed with the median, 30
        assert!((x[[2, 0]] - x[[1, 0]]).abs() < 1e-12);
        assert!(x.column(0).sum().abs() < 1e-9);
        // Missing benefits imputed with the mode "No"
        assert_eq!(x[[1, 4]], 1.0);
        assert_eq!(x[[1, 5]], 0.0);
    }

    #[test]
    fn test_unseen_category_at_transform() {
        let mut transformer = FeatureTransformer::from_frame(&train_frame());
        transformer.fit(&train_frame()).unwrap();

        let row = df! {
            "Age" => &[Some(40_i64)],
            "Gender" => &["Trans"],
            "benefits" => &[Some("Yes")],
        }
        .unwrap();
        let x = transformer.transform(&row).unwrap();

        assert_eq!(x.row(0).slice(ndarray::s![1..4]).sum(), 0.0);
        assert_eq!(x[[0, 5]], 1.0);
    }

    #[test]
    fn test_missing_column_at_transform() {
        let mut transformer = FeatureTransformer::from_frame(&train_frame());
        transformer.fit(&train_frame()).unwrap();

        let row = df! { "Age" => &[40_i64], "Gender" => &["Male"] }.unwrap();
        let err = transformer.transform(&row).unwrap_err();
        assert!(matches!(err, PredictorError::FeatureNotFound(name) if name == "benefits"));
    }

    #[test]
    fn test_transform_before_fit() {
        let transformer = FeatureTransformer::from_frame(&train_frame());
        assert!(matches!(
            transformer.transform(&train_frame()),
            Err(PredictorError::ModelNotFitted)
        ));
    }
}
