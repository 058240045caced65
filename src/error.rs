use thiserror::Error;

/// Errors that can end an analysis run
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("could not load dataset from '{path}': {reason}")]
    DatasetLoad { path: String, reason: String },

    #[error("could not write '{path}': {reason}")]
    Export { path: String, reason: String },

    #[error("regression is undefined: {reason}")]
    DegenerateRegression { reason: String },

    #[error("cannot take the logarithm of {column} = {value} for {country} (must be > 0)")]
    Domain {
        country: String,
        column: &'static str,
        value: f64,
    },

    #[error("column {column} is not present in this dataset")]
    MissingColumn { column: &'static str },

    #[error("column {column} has no values")]
    EmptyColumn { column: &'static str },

    #[error("column {column} contains a non-numeric value")]
    NonNumericColumn { column: &'static str },

    #[error("length mismatch: y has {y_len} values, x has {x_len}")]
    LengthMismatch { y_len: usize, x_len: usize },

    #[error("correlation between {x} and {y} is undefined")]
    UndefinedCorrelation { x: &'static str, y: &'static str },

    #[error("distribution error: {0}")]
    Distribution(String),

    #[error("failed to render plot: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
