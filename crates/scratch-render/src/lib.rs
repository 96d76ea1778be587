//! Headless backend for the scratch card engine.
//!
//! Renders into tiny-skia pixmaps, decodes images from disk with `image`,
//! and drives frames and fade ticks from a manual clock. Used for offscreen
//! rendering and for exercising the engine end to end.

pub mod headless;
pub mod loader;
pub mod raster;

pub use headless::{FRAME_INTERVAL, HeadlessHost, HeadlessScratcher};
pub use loader::FsImageLoader;
pub use raster::{RasterImage, RasterSurface};
