//! Scratch card reveal engine.
//!
//! A cover image is painted over a reward image; pointer and touch strokes
//! erase the cover until a coverage threshold is crossed, after which the
//! remaining cover fades out on its own. Drawing, scheduling, image loading
//! and input delivery are supplied by a [`Host`] implementation.

pub mod coverage;
pub mod engine;
pub mod error;
pub mod fade;
pub mod geometry;
pub mod host;
pub mod input;
pub mod options;
pub mod pair;
pub mod stroke;
pub mod surface;

pub use engine::{Assets, EngineState, Scratcher, load_assets};
pub use error::ScratchError;
pub use geometry::Point;
pub use host::{FrameHandle, Host, ImageLoader, TimerHandle};
pub use input::InputEvent;
pub use options::{LineCap, Pen, ScratcherOptions};
pub use surface::{Composite, Image, Surface};

// Re-export kurbo so backends don't need a direct dependency to read paths
pub use kurbo::{BezPath, PathEl};
