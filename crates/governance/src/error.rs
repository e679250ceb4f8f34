use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GovernanceError>;

#[derive(Error, Debug)]
pub enum GovernanceError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Template directory not found: {}", .0.display())]
    MissingTemplate(PathBuf),
}

impl GovernanceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
