//! Deterministic host.
//!
//! Nothing fires on its own: callers advance the clock and pump frames and
//! fade ticks explicitly, which makes rendering reproducible.

use crate::raster::RasterSurface;
use scratch_core::{FrameHandle, Host, Point, ScratchError, Scratcher, TimerHandle};
use std::time::Duration;

/// Clock advance per pumped repaint frame (~60 Hz).
pub const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

#[derive(Debug, Default)]
pub struct HeadlessHost {
    container_width: f64,
    origin: Point,
    clock: Duration,
    next_handle: i32,
    frame: Option<FrameHandle>,
    interval: Option<(TimerHandle, Duration)>,
    attached: bool,
    subscribed: bool,
}

impl HeadlessHost {
    pub fn new(container_width: f64) -> Self {
        Self {
            container_width,
            ..Default::default()
        }
    }

    /// Place the visible surface at `origin` in client space.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn set_container_width(&mut self, width: f64) {
        self.container_width = width;
    }

    pub fn advance(&mut self, by: Duration) {
        self.clock += by;
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.frame
    }

    pub fn interval(&self) -> Option<TimerHandle> {
        self.interval.map(|(handle, _)| handle)
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    fn next_handle(&mut self) -> i32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl Host for HeadlessHost {
    type Surface = RasterSurface;

    fn create_surface(&mut self) -> Result<RasterSurface, ScratchError> {
        Ok(RasterSurface::new())
    }

    fn attach(&mut self, _surface: &RasterSurface) -> Result<(), ScratchError> {
        self.attached = true;
        Ok(())
    }

    fn detach(&mut self, _surface: &RasterSurface) {
        self.attached = false;
    }

    fn container_width(&self) -> f64 {
        self.container_width
    }

    fn surface_origin(&self) -> Point {
        self.origin
    }

    fn now(&self) -> Duration {
        self.clock
    }

    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_handle());
        self.frame = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.frame == Some(handle) {
            self.frame = None;
        }
    }

    fn start_interval(&mut self, period: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_handle());
        self.interval = Some((handle, period));
        handle
    }

    fn cancel_interval(&mut self, handle: TimerHandle) {
        if self.interval.is_some_and(|(h, _)| h == handle) {
            self.interval = None;
        }
    }

    fn subscribe(&mut self) {
        self.subscribed = true;
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
    }
}

/// Pumping helpers for an engine running on a [`HeadlessHost`].
pub trait HeadlessScratcher {
    /// Deliver the pending repaint frame, if any. Returns whether one ran.
    fn pump_frame(&mut self) -> bool;

    /// Deliver one fade tick, if the fade timer is running.
    fn pump_fade_tick(&mut self) -> bool;

    /// Deliver fade ticks until the timer stops. Returns the tick count.
    fn run_fade(&mut self) -> usize;
}

impl HeadlessScratcher for Scratcher<HeadlessHost> {
    fn pump_frame(&mut self) -> bool {
        if self.host().pending_frame().is_none() {
            return false;
        }
        let host = self.host_mut();
        host.frame = None;
        host.advance(FRAME_INTERVAL);
        self.frame();
        true
    }

    fn pump_fade_tick(&mut self) -> bool {
        let Some((_, period)) = self.host().interval else {
            return false;
        };
        self.host_mut().advance(period);
        self.fade_tick();
        true
    }

    fn run_fade(&mut self) -> usize {
        let mut ticks = 0;
        while self.pump_fade_tick() {
            ticks += 1;
        }
        ticks
    }
}
