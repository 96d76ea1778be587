//! Drawing-surface capability consumed by the engine.
//!
//! Implemented by `scratch-render` (tiny-skia pixmaps) and `scratch-wasm`
//! (HTML canvas). The engine only ever talks to surfaces through this trait.

use crate::options::Pen;
use kurbo::BezPath;

/// How newly drawn content combines with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Draw on top.
    #[default]
    SourceOver,
    /// Subtract opacity from existing content.
    DestinationOut,
}

/// A decoded raster image.
pub trait Image {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// A raster drawing surface.
pub trait Surface {
    type Image: Image;

    fn size(&self) -> (u32, u32);

    /// Resize, clearing all content and resetting composite mode and alpha.
    fn resize(&mut self, width: u32, height: u32);

    /// Make every pixel transparent.
    fn clear(&mut self);

    fn set_composite(&mut self, composite: Composite);

    /// Global alpha applied to subsequent draws.
    fn set_alpha(&mut self, alpha: f32);

    /// Draw `image` stretched over the whole surface.
    fn draw_image(&mut self, image: &Self::Image);

    /// Draw another surface at the origin, at its natural size.
    fn draw_surface(&mut self, other: &Self);

    /// Stroke `path` with the pen: black, round joins, feathered by `pen.blur`.
    fn stroke(&mut self, path: &BezPath, pen: &Pen);

    /// Row-major, non-premultiplied RGBA8 pixels.
    fn pixels(&self) -> Vec<u8>;
}
