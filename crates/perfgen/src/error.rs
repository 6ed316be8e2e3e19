use std::path::PathBuf;

use perfgen_emit::EmitError;
use perfgen_emit::interp::EvalError;
use perfgen_model::ModelError;
use thiserror::Error;

/// Generator errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error("Equation \"{equation}\" for {set} :: {counter} does not evaluate: {source}")]
    Eval {
        set: String,
        counter: String,
        equation: String,
        #[source]
        source: EvalError,
    },
    #[error("Input file {} does not exist", .0.display())]
    MissingInput(PathBuf),
    #[error("Output path {} has no file name", .0.display())]
    BadOutputPath(PathBuf),
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether the error is caused by how the tool was invoked rather than
    /// by the metric descriptions.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::MissingInput(_) | Self::BadOutputPath(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
