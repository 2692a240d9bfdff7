//! Survey preprocessing
//!
//! - Age and gender normalization of raw answers
//! - Cleaning, target derivation and column partitioning
//! - Fit/transform steps: median and most-frequent imputation, standard
//!   scaling, one-hot encoding with a frozen vocabulary

pub mod age;
pub mod gender;
mod cleaning;
mod imputer;
mod scaler;
mod encoder;
mod pipeline;

pub use age::{normalize_age, MAX_AGE, MIN_AGE};
pub use cleaning::{
    clean_features, derive_target, preprocess_raw, PreparedData, DROPPED_COLUMNS, TARGET_COLUMN,
    UNKNOWN_LABEL,
};
pub use encoder::OneHotEncoder;
pub use gender::{normalize_gender, Gender};
pub use imputer::{ImputeStrategy, Imputer};
pub use pipeline::{is_numeric_dtype, FeatureTransformer};
pub use scaler::{ScalerParams, StandardScaler};
