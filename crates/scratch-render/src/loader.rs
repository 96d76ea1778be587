//! Filesystem image loading.

use crate::raster::RasterImage;
use scratch_core::{ImageLoader, ScratchError};
use std::path::PathBuf;

/// Resolves image sources as paths relative to a root directory.
#[derive(Debug, Clone, Default)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageLoader for FsImageLoader {
    type Image = RasterImage;

    async fn load(&self, src: &str) -> Result<RasterImage, ScratchError> {
        let path = self.root.join(src);
        log::debug!("loading image {}", path.display());
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ScratchError::asset_load(src, e))?;
        RasterImage::decode(src, &bytes)
    }
}
