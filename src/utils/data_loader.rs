//! CSV loading for raw survey exports

use crate::error::{PredictorError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Markers read as missing, matching what common dataframe tooling treats as NA
pub const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Delimited-file loader
#[derive(Debug, Clone)]
pub struct DataLoader {
    delimiter: u8,
    /// Rows scanned for schema inference; `None` scans the whole file
    infer_schema_length: Option<usize>,
    null_markers: Vec<String>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            infer_schema_length: None,
            null_markers: DEFAULT_NULL_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Replace the set of cell values read as null
    pub fn with_null_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Load a CSV file with a header row
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let start = Instant::now();
        let file = File::open(path)
            .map_err(|e| PredictorError::DataError(format!("{}: {}", path.display(), e)))?;

        let null_values = NullValues::AllColumns(
            self.null_markers.iter().map(|s| PlSmallStr::from(s.as_str())).collect(),
        );
        let parse_opts = CsvParseOptions::default()
            .with_separator(self.delimiter)
            .with_null_values(Some(null_values));

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| PredictorError::DataError(format!("{}: {}", path.display(), e)))?;

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded CSV"
        );
        Ok(df)
    }
}
