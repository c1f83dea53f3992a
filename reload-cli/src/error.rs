//! Error types emitted by the reload CLI.
//!
//! Keep this error type reasonably small, as every CLI helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use reload_core::{ParseStrategyError, ProblemError, SolveError};
use thiserror::Error;

/// Errors emitted by the reload CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Name of the missing option.
        field: &'static str,
        /// Environment variable that could supply it.
        env: &'static str,
    },
    /// A strategy name is not recognised.
    #[error(transparent)]
    UnknownStrategy(#[from] ParseStrategyError),
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Option naming the path.
        field: &'static str,
        /// Path that was looked up.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option naming the path.
        field: &'static str,
        /// Path that was looked up.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option naming the path.
        field: &'static str,
        /// Path that was looked up.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Opening the problem file failed.
    #[error("failed to open problem at {path:?}: {source}")]
    OpenProblem {
        /// Problem file path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Problem JSON could not be decoded.
    #[error("failed to parse problem JSON at {path:?}: {source}")]
    ParseProblem {
        /// Problem file path.
        path: Utf8PathBuf,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// The problem failed validation.
    #[error("problem in {path:?} failed validation: {source}")]
    InvalidProblem {
        /// Problem file path.
        path: Utf8PathBuf,
        /// First violated precondition.
        #[source]
        source: ProblemError,
    },
    /// The solve pipeline failed.
    #[error("solve failed: {source}")]
    Solve {
        /// Pipeline failure.
        source: SolveError,
    },
    /// Serialising the route plan failed.
    #[error("failed to serialise route plan: {0}")]
    SerialiseRoutePlan(#[source] serde_json::Error),
    /// Writing the solve output failed.
    #[error("failed to write solve output: {0}")]
    WriteSolveOutput(#[source] std::io::Error),
}
