use thiserror::Error;

/// Errors surfaced by the scratch card engine and its hosts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScratchError {
    /// An image source could not be fetched or decoded.
    #[error("failed to load image `{src}`: {reason}")]
    AssetLoad { src: String, reason: String },

    /// The surfaces would be created with a zero or non-finite size.
    #[error("invalid surface geometry {width}x{height}")]
    InvalidGeometry { width: f64, height: f64 },

    #[error("invalid options: {0}")]
    Options(String),

    #[error("engine has been destroyed")]
    Destroyed,

    /// The host platform rejected an operation.
    #[error("host error: {0}")]
    Host(String),
}

impl ScratchError {
    pub fn asset_load(src: &str, reason: impl ToString) -> Self {
        Self::AssetLoad {
            src: src.to_string(),
            reason: reason.to_string(),
        }
    }
}
