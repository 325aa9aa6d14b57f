use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the CSR engine and external sorter.
#[derive(Error, Debug)]
pub enum CsrFlowError {
    #[error("invalid csr: {reason}")]
    InvalidCsr { reason: String },

    #[error("io error during {op}{}", path.as_ref().map(|p| format!(" ({})", p.display())).unwrap_or_default())]
    Io {
        op: &'static str,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("index {index} is out of range for {bound} rows")]
    IndexOutOfRange { index: i64, bound: usize },

    #[error("shape mismatch: {nrows}x{ncols} requires {} elements, got {len}", nrows * ncols)]
    ShapeMismatch { nrows: usize, ncols: usize, len: usize },
}

impl CsrFlowError {
    pub(crate) fn io(op: &'static str, path: Option<&std::path::Path>, source: std::io::Error) -> Self {
        CsrFlowError::Io { op, path: path.map(PathBuf::from), source }
    }
}

pub type Result<T> = std::result::Result<T, CsrFlowError>;
