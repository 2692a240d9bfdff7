//! One-hot encoding with a vocabulary frozen at fit time

use crate::error::{PredictorError, Result};
use ndarray::Array2;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Vocabulary of one categorical column, sorted lexicographically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CategoryBlock {
    column: String,
    categories: Vec<String>,
}

impl CategoryBlock {
    fn position(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }
}

/// One-hot encoder.
///
/// Each column expands into one indicator per category seen during `fit`.
/// Values outside that vocabulary (and nulls) produce an all-zero block
/// rather than an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    blocks: Vec<CategoryBlock>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Learn the vocabulary of every column. Columns are scanned in parallel;
    /// block order follows `columns`.
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.blocks = columns
            .par_iter()
            .map(|col_name| {
                let column = df
                    .column(col_name)
                    .map_err(|_| PredictorError::FeatureNotFound(col_name.to_string()))?;
                let casted = column.cast(&DataType::String)?;
                let categories: BTreeSet<&str> = casted.str()?.into_iter().flatten().collect();

                Ok(CategoryBlock {
                    column: col_name.to_string(),
                    categories: categories.into_iter().map(String::from).collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Encode the fitted columns of `df` into a dense indicator matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PredictorError::ModelNotFitted);
        }

        let mut out = Array2::<f64>::zeros((df.height(), self.n_features()));
        let mut offset = 0;

        for block in &self.blocks {
            let column = df
                .column(&block.column)
                .map_err(|_| PredictorError::FeatureNotFound(block.column.clone()))?;
            let casted = column.cast(&DataType::String)?;

            for (row, value) in casted.str()?.into_iter().enumerate() {
                if let Some(pos) = value.and_then(|v| block.position(v)) {
                    out[[row, offset + pos]] = 1.0;
                }
            }
            offset += block.categories.len();
        }

        Ok(out)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<Array2<f64>> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Total number of indicator columns
    pub fn n_features(&self) -> usize {
        self.blocks.iter().map(|b| b.categories.len()).sum()
    }

    /// `<column>_<category>` for every indicator, in output order
    pub fn feature_names(&self) -> Vec<String> {
        self.blocks
            .iter()
            .flat_map(|b| b.categories.iter().map(move |c| format!("{}_{}", b.column, c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df! {
            "leave" => &["Very easy", "Don't know", "Somewhat easy", "Don't know"],
            "benefits" => &["Yes", "No", "Yes", "Don't know"],
        }
        .unwrap()
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&frame(), &["leave", "benefits"]).unwrap();

        assert_eq!(
            encoder.feature_names(),
            vec![
                "leave_Don't know",
                "leave_Somewhat easy",
                "leave_Very easy",
                "benefits_Don't know",
                "benefits_No",
                "benefits_Yes",
            ]
        );
        assert_eq!(encoder.n_features(), 6);
    }

    #[test]
    fn test_onehot_rows() {
        let mut encoder = OneHotEncoder::new();
        let out = encoder.fit_transform(&frame(), &["leave", "benefits"]).unwrap();

        assert_eq!(out.dim(), (4, 6));
        assert_eq!(out.row(0).to_vec(), vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        for row in out.rows() {
            assert_eq!(row.sum(), 2.0);
        }
    }

    #[test]
    fn test_unseen_category_is_zero_block() {
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&frame(), &["leave", "benefits"]).unwrap();

        let unseen = df! {
            "leave" => &["Impossible"],
            "benefits" => &["No"],
        }
        .unwrap();
        let out = encoder.transform(&unseen).unwrap();

        assert_eq!(out.row(0).to_vec(), vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_null_is_zero_block() {
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&frame(), &["benefits"]).unwrap();

        let df = DataFrame::new(vec![Column::new("benefits".into(), &[None::<&str>])]).unwrap();
        let out = encoder.transform(&df).unwrap();
        assert_eq!(out.sum(), 0.0);
    }

    #[test]
    fn test_transform_before_fit() {
        let encoder = OneHotEncoder::new();
        assert!(matches!(encoder.transform(&frame()), Err(PredictorError::ModelNotFitted)));
    }
}
