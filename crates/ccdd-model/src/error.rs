use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CcddError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing reference table {table}: {}", path.display())]
    MissingReference { table: String, path: PathBuf },
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, CcddError>;
