//! Host platform collaborators.
//!
//! The host owns the container the visible surface lives in, schedules
//! repaint frames and fade ticks, and delivers input. It calls back into the
//! engine with `Scratcher::frame`, `Scratcher::fade_tick` and
//! `Scratcher::handle_input`.

use crate::error::ScratchError;
use crate::geometry::Point;
use crate::surface::{Image, Surface};
use std::future::Future;
use std::time::Duration;

/// Identifies a requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Identifies a running interval timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub i32);

pub trait Host {
    type Surface: Surface;

    fn create_surface(&mut self) -> Result<Self::Surface, ScratchError>;

    /// Show `surface` inside the container.
    fn attach(&mut self, surface: &Self::Surface) -> Result<(), ScratchError>;

    fn detach(&mut self, surface: &Self::Surface);

    /// Current container width, used when no explicit width is configured.
    fn container_width(&self) -> f64;

    /// Client-space top-left corner of the attached surface.
    fn surface_origin(&self) -> Point;

    /// Monotonic clock.
    fn now(&self) -> Duration;

    /// Ask for `Scratcher::frame` before the next display refresh.
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Call `Scratcher::fade_tick` every `period` until cancelled.
    fn start_interval(&mut self, period: Duration) -> TimerHandle;

    fn cancel_interval(&mut self, handle: TimerHandle);

    /// Start delivering pointer, touch and resize input.
    fn subscribe(&mut self);

    fn unsubscribe(&mut self);
}

/// Resolves an image source string to a decoded image.
pub trait ImageLoader {
    type Image: Image;

    fn load(&self, src: &str) -> impl Future<Output = Result<Self::Image, ScratchError>>;
}
