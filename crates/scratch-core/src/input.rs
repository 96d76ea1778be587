//! Input abstraction layer.
//!
//! Normalizes mouse, touch and container-resize notifications into a single
//! `InputEvent` enum consumed by the engine. Positions are client-space; the
//! engine converts them against the visible surface's on-screen origin.

use crate::geometry::Point;
use smallvec::SmallVec;

/// Changed touch points of one touch event.
pub type Touches = SmallVec<[Point; 4]>;

/// A normalized input event from the host platform.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer entered the surface.
    PointerEnter(Point),

    /// Pointer moved over the surface.
    PointerMove(Point),

    /// Pointer left the surface; ends the current stroke.
    PointerLeave,

    /// One or more fingers touched down.
    TouchStart(Touches),

    /// One or more fingers moved.
    TouchMove(Touches),

    /// Fingers lifted; ends the current stroke.
    TouchEnd,

    /// Touch sequence interrupted by the platform; ends the current stroke.
    TouchCancel,

    /// The hosting container changed size.
    Resize,
}

impl InputEvent {
    pub fn from_pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove(Point::new(x, y))
    }

    pub fn from_pointer_enter(x: f64, y: f64) -> Self {
        Self::PointerEnter(Point::new(x, y))
    }

    pub fn from_touch_move(touches: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self::TouchMove(touches.into_iter().map(Point::from).collect())
    }

    pub fn from_touch_start(touches: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self::TouchStart(touches.into_iter().map(Point::from).collect())
    }

    /// Client-space sample positions carried by this event, oldest first.
    pub fn samples(&self) -> &[Point] {
        match self {
            Self::PointerEnter(p) | Self::PointerMove(p) => std::slice::from_ref(p),
            Self::TouchStart(touches) | Self::TouchMove(touches) => touches.as_slice(),
            _ => &[],
        }
    }

    /// Whether this event terminates the stroke in progress.
    pub fn ends_stroke(&self) -> bool {
        matches!(self, Self::PointerLeave | Self::TouchEnd | Self::TouchCancel)
    }
}
