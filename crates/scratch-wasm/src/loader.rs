//! Browser image loading via `HtmlImageElement::decode`.

use crate::surface::WebImage;
use scratch_core::{ImageLoader, ScratchError};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

#[derive(Debug, Clone, Copy, Default)]
pub struct WebImageLoader;

impl ImageLoader for WebImageLoader {
    type Image = WebImage;

    async fn load(&self, src: &str) -> Result<WebImage, ScratchError> {
        let image = HtmlImageElement::new().map_err(|e| ScratchError::asset_load(src, format!("{e:?}")))?;
        image.set_src(src);
        JsFuture::from(image.decode())
            .await
            .map_err(|e| ScratchError::asset_load(src, format!("{e:?}")))?;
        Ok(WebImage(image))
    }
}
