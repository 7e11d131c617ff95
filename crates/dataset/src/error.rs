use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Dataset file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read the dataset: {0}")]
    Read(#[from] polars::prelude::PolarsError),

    #[error("Required column '{0}' is missing from the dataset header")]
    MissingColumn(String),

    #[error("Column '{column}' is empty on line {line}")]
    MissingValue { column: String, line: usize },

    #[error("Column '{column}' on line {line} has an unparsable value '{value}'")]
    InvalidValue {
        column: String,
        line: usize,
        value: String,
    },
}
