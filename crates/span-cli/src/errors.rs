use std::path::PathBuf;

use span_core::ResolveError;
use thiserror::Error;

/// Código de salida para Skip.
pub const EXIT_SKIP: i32 = 3;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_RESOLVE: i32 = 4;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("resolution failed: {0}")]
    Resolve(#[from] ResolveError),
    #[error("configuration error: {0}")]
    Config(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Resolve(_) => EXIT_RESOLVE,
            CliError::Io { .. } | CliError::Json { .. } | CliError::Config(_) => EXIT_USAGE,
        }
    }
}
