use std::path::PathBuf;

use stencil_fast_types::MaskError;
use thiserror::Error;

use crate::settings::ConfigError;

#[derive(Debug, Error)]
pub enum StencilError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{} has no pixels", path.display())]
    EmptyImage { path: PathBuf },

    #[error("encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("mask error: {0}")]
    Mask(#[from] MaskError),

    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl StencilError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StencilError::Io {
            path: path.into(),
            source,
        }
    }
}
