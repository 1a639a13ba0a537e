use ringback_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("source file not found: {0}")]
    MissingSource(PathBuf),
    #[error("{path} must contain columns: {}", .columns.join(", "))]
    MissingColumns {
        path: PathBuf,
        columns: Vec<&'static str>,
    },
    #[error("no pending contact at position {0}")]
    InvalidPosition(usize),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: Box<StoreError>,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Io,
    Csv,
    Core,
    MissingSource,
    MissingColumns,
    InvalidPosition,
    Write,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Io(_) => StoreErrorKind::Io,
            StoreError::Csv(_) => StoreErrorKind::Csv,
            StoreError::Core(_) => StoreErrorKind::Core,
            StoreError::MissingSource(_) => StoreErrorKind::MissingSource,
            StoreError::MissingColumns { .. } => StoreErrorKind::MissingColumns,
            StoreError::InvalidPosition(_) => StoreErrorKind::InvalidPosition,
            StoreError::Write { .. } => StoreErrorKind::Write,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: impl Into<StoreError>) -> Self {
        StoreError::Write {
            path: path.into(),
            source: Box::new(source.into()),
        }
    }
}
