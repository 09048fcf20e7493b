use std::path::PathBuf;

use thiserror::Error;

use crate::expr::ExprError;

/// Result alias for the data and series layers.
pub type Result<T> = std::result::Result<T, PlotterError>;

/// Errors produced by the data store and the series registry.
///
/// Every variant is recoverable at the call site; the UI shows them in the
/// status line and the CLI reports them and exits.
#[derive(Debug, Error)]
pub enum PlotterError {
    /// Failed to open or read a data file.
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed delimited input.
    #[error("failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// refresh() before any successful load.
    #[error("no data file has been loaded yet")]
    NoDataLoaded,

    /// A requested field name is not in the loaded table.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// x and y vectors must line up one to one.
    #[error("x/y length mismatch: x has {x_len} values, y has {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },

    /// resolve_label() on a label with no valid `id=<n>` prefix, or an id
    /// the registry never minted.
    #[error("no series matches label {0:?}")]
    UnknownSeries(String),

    /// Expression rejected by the function evaluator.
    #[error(transparent)]
    Expr(#[from] ExprError),
}

impl PlotterError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
