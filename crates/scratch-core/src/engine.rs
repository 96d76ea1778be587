//! The reveal engine.
//!
//! `Scratcher` owns the surface pair, the pending stroke queue and the clear
//! callbacks. Lifecycle:
//!
//! ```text
//! Uninitialized ──init──▶ Running ──clear──▶ Clearing ──fade done──▶ Terminated
//!        └──────────────────┴──────────────────┴────────destroy──────────▶ Destroyed
//! ```
//!
//! At most one loop is active at a time: the repaint loop while `Running`,
//! the fade timer while `Clearing`. Host callbacks that arrive for a loop
//! that is no longer active are ignored.

use crate::error::ScratchError;
use crate::fade::{self, FadeOut, FadeStep};
use crate::geometry::Point;
use crate::host::{FrameHandle, Host, ImageLoader, TimerHandle};
use crate::input::InputEvent;
use crate::options::ScratcherOptions;
use crate::pair::SurfacePair;
use crate::stroke::StrokeAccumulator;
use crate::surface::Surface;
use std::time::Duration;

/// Quiet period before a container resize is acted upon.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

type ImageOf<H> = <<H as Host>::Surface as Surface>::Image;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Running,
    Clearing,
    Terminated,
    Destroyed,
}

enum ActiveLoop {
    Idle,
    Repaint(FrameHandle),
    Fade { timer: TimerHandle, fade: FadeOut },
}

/// Decoded cover and reward images.
pub struct Assets<I> {
    pub cover: I,
    pub reward: I,
}

/// Load the cover image, then the reward image.
pub async fn load_assets<L: ImageLoader>(
    loader: &L,
    options: &ScratcherOptions,
) -> Result<Assets<L::Image>, ScratchError> {
    let cover = loader.load(&options.mask_src).await?;
    let reward = loader.load(&options.back_src).await?;
    Ok(Assets { cover, reward })
}

pub struct Scratcher<H: Host> {
    options: ScratcherOptions,
    host: H,
    pair: SurfacePair<H::Surface>,
    strokes: StrokeAccumulator,
    /// Explicit size; `None` follows the container.
    width: Option<u32>,
    height: Option<u32>,
    state: EngineState,
    active: ActiveLoop,
    listening: bool,
    resize_requested_at: Option<Duration>,
    clear_callbacks: Vec<Box<dyn FnOnce()>>,
}

impl<H: Host> Scratcher<H> {
    /// Create both surfaces and attach the visible one to the container.
    ///
    /// Nothing is drawn until [`Scratcher::init`] or [`Scratcher::start`].
    pub fn new(options: ScratcherOptions, mut host: H) -> Result<Self, ScratchError> {
        let mask = host.create_surface()?;
        let back = host.create_surface()?;
        host.attach(&back)?;

        Ok(Self {
            width: options.width(),
            height: options.height(),
            options,
            host,
            pair: SurfacePair::new(mask, back),
            strokes: StrokeAccumulator::new(),
            state: EngineState::Uninitialized,
            active: ActiveLoop::Idle,
            listening: false,
            resize_requested_at: None,
            clear_callbacks: Vec::new(),
        })
    }

    pub fn options(&self) -> &ScratcherOptions {
        &self.options
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn surfaces(&self) -> &SurfacePair<H::Surface> {
        &self.pair
    }

    /// Samples buffered for the next repaint, in surface-local coordinates.
    pub fn pending_points(&self) -> &[Point] {
        self.strokes.pending()
    }

    /// Fraction of the cover still fully opaque.
    pub fn coverage(&self) -> f64 {
        self.pair.coverage()
    }

    /// Load both images through `loader`, then [`start`](Self::start).
    pub async fn init<L>(&mut self, loader: &L) -> Result<(), ScratchError>
    where
        L: ImageLoader<Image = ImageOf<H>>,
    {
        if self.state == EngineState::Destroyed {
            return Err(ScratchError::Destroyed);
        }
        let assets = load_assets(loader, &self.options).await?;
        self.start(assets)
    }

    /// Size the surfaces, paint the cover, and begin the repaint loop.
    pub fn start(&mut self, assets: Assets<ImageOf<H>>) -> Result<(), ScratchError> {
        if self.state == EngineState::Destroyed {
            return Err(ScratchError::Destroyed);
        }
        self.stop_loop();
        self.strokes.clear();
        self.resize_requested_at = None;

        self.pair.set_images(assets.cover, assets.reward);
        let (width, height) = self.target_size(self.width, self.height)?;
        self.pair.resize(width, height);
        self.pair.restore_cover();
        self.pair.composite();

        self.state = EngineState::Running;
        self.active = ActiveLoop::Repaint(self.host.request_frame());
        self.listen();
        log::debug!("scratcher running at {width}x{height}");
        Ok(())
    }

    /// Re-derive the surface size and repaint a fresh cover.
    ///
    /// Explicit dimensions override container-driven sizing. All erasure
    /// progress is discarded. Ignored unless running.
    pub fn resize(&mut self, width: Option<u32>, height: Option<u32>) -> Result<(), ScratchError> {
        if self.state != EngineState::Running {
            log::debug!("resize ignored in state {:?}", self.state);
            return Ok(());
        }
        let width = width.filter(|w| *w > 0);
        let height = height.filter(|h| *h > 0);
        let (w, h) = self.target_size(width, height)?;
        self.width = width;
        self.height = height;

        self.pair.resize(w, h);
        self.pair.restore_cover();
        self.pair.composite();
        self.strokes.clear();
        self.resize_requested_at = None;
        log::debug!("scratcher resized to {w}x{h}");
        Ok(())
    }

    /// Stop scratching and fade out whatever cover remains over `duration`
    /// seconds. Clear callbacks fire once the fade completes.
    pub fn clear(&mut self, duration: f64) {
        if self.state != EngineState::Running {
            log::debug!("clear ignored in state {:?}", self.state);
            return;
        }
        self.stop_loop();
        self.unlisten();
        self.state = EngineState::Clearing;

        let fade = FadeOut::new(duration);
        let timer = self.host.start_interval(fade::tick_period());
        self.active = ActiveLoop::Fade { timer, fade };
        log::debug!("clearing over {} ticks", fade.total_ticks());
    }

    /// Register a callback fired once when clearing completes.
    pub fn on_clear(&mut self, callback: impl FnOnce() + 'static) {
        self.clear_callbacks.push(Box::new(callback));
    }

    /// Cancel everything and detach from the container. Terminal.
    pub fn destroy(&mut self) {
        if self.state == EngineState::Destroyed {
            return;
        }
        self.stop_loop();
        self.unlisten();
        self.host.detach(self.pair.back());
        self.pair.release_images();
        self.strokes.clear();
        self.clear_callbacks.clear();
        self.state = EngineState::Destroyed;
        log::debug!("scratcher destroyed");
    }

    /// Feed one input event. Returns `true` when the host should suppress
    /// the platform's default handling (scrolling and the like).
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if !self.listening {
            return false;
        }
        match event {
            InputEvent::Resize => {
                if self.width.is_none() && self.height.is_none() {
                    self.resize_requested_at = Some(self.host.now());
                }
                false
            }
            event if event.ends_stroke() => {
                self.wipe(true);
                self.strokes.clear();
                true
            }
            event => {
                let origin = self.host.surface_origin();
                for sample in event.samples() {
                    self.strokes.push(sample.relative_to(origin));
                }
                true
            }
        }
    }

    /// One repaint tick. Reschedules itself before doing any work.
    pub fn frame(&mut self) {
        if self.state != EngineState::Running || !matches!(self.active, ActiveLoop::Repaint(_)) {
            return;
        }
        self.active = ActiveLoop::Repaint(self.host.request_frame());

        if let Some(at) = self.resize_requested_at
            && self.host.now().saturating_sub(at) >= RESIZE_DEBOUNCE
        {
            if let Err(err) = self.resize(None, None) {
                log::warn!("container resize skipped: {err}");
            }
            self.resize_requested_at = None;
        }

        self.wipe(false);
    }

    /// One fade timer tick.
    pub fn fade_tick(&mut self) {
        let step = match &mut self.active {
            ActiveLoop::Fade { fade, .. } => fade.advance(),
            _ => return,
        };
        match step {
            FadeStep::Frame { alpha } => {
                log::trace!("fade alpha {alpha:.3}");
                self.pair.composite_with_alpha(alpha);
            }
            FadeStep::Done => self.finish_clear(),
        }
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Apply buffered samples to the mask and check the clear threshold.
    fn wipe(&mut self, force: bool) {
        if self.state != EngineState::Running || self.strokes.is_empty() || !self.pair.is_drawable() {
            return;
        }
        let Some(path) = self.strokes.take_stroke(force) else {
            return;
        };
        self.pair.erase(&path, &self.options.pen());

        let remaining = self.pair.coverage();
        log::trace!("stroke applied, coverage {remaining:.4}");
        let threshold = self.options.clear_threshold();
        if threshold > 0.0 && remaining < threshold {
            self.clear(self.options.clear_duration());
            return;
        }
        self.pair.composite();
    }

    fn finish_clear(&mut self) {
        self.stop_loop();
        self.pair.reveal();
        self.state = EngineState::Terminated;
        log::debug!("clear finished, firing {} callback(s)", self.clear_callbacks.len());
        for callback in std::mem::take(&mut self.clear_callbacks) {
            callback();
        }
    }

    fn target_size(&self, width: Option<u32>, height: Option<u32>) -> Result<(u32, u32), ScratchError> {
        let width = match width {
            Some(w) => w as f64,
            None => self.host.container_width(),
        };
        let height = match height {
            Some(h) => h as f64,
            None => width * self.pair.reward_aspect().unwrap_or(0.0),
        };
        if !(width >= 1.0 && height >= 1.0) || !width.is_finite() || !height.is_finite() {
            return Err(ScratchError::InvalidGeometry { width, height });
        }
        Ok((width as u32, height as u32))
    }

    fn stop_loop(&mut self) {
        match std::mem::replace(&mut self.active, ActiveLoop::Idle) {
            ActiveLoop::Idle => {}
            ActiveLoop::Repaint(handle) => self.host.cancel_frame(handle),
            ActiveLoop::Fade { timer, .. } => self.host.cancel_interval(timer),
        }
    }

    fn listen(&mut self) {
        if !self.listening {
            self.host.subscribe();
            self.listening = true;
        }
    }

    fn unlisten(&mut self) {
        if self.listening {
            self.host.unsubscribe();
            self.listening = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Pen;
    use crate::surface::{Composite, Image};
    use kurbo::BezPath;
    use pretty_assertions::assert_eq;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    // ─── Test doubles ────────────────────────────────────────────────────

    #[derive(Debug, Clone, Copy)]
    struct FakeImage(u32, u32);

    impl Image for FakeImage {
        fn width(&self) -> u32 {
            self.0
        }
        fn height(&self) -> u32 {
            self.1
        }
    }

    /// Tracks how many pixels stay opaque; every erasing stroke removes a
    /// fixed number of them.
    struct FakeSurface {
        size: (u32, u32),
        opaque: usize,
        composite: Composite,
        erase_per_stroke: Rc<Cell<usize>>,
    }

    impl Surface for FakeSurface {
        type Image = FakeImage;

        fn size(&self) -> (u32, u32) {
            self.size
        }
        fn resize(&mut self, width: u32, height: u32) {
            self.size = (width, height);
            self.opaque = 0;
            self.composite = Composite::SourceOver;
        }
        fn clear(&mut self) {
            self.opaque = 0;
        }
        fn set_composite(&mut self, composite: Composite) {
            self.composite = composite;
        }
        fn set_alpha(&mut self, _alpha: f32) {}
        fn draw_image(&mut self, _image: &FakeImage) {
            self.opaque = (self.size.0 * self.size.1) as usize;
        }
        fn draw_surface(&mut self, _other: &Self) {}
        fn stroke(&mut self, _path: &BezPath, _pen: &Pen) {
            if self.composite == Composite::DestinationOut {
                self.opaque = self.opaque.saturating_sub(self.erase_per_stroke.get());
            }
        }
        fn pixels(&self) -> Vec<u8> {
            let total = (self.size.0 * self.size.1) as usize;
            (0..total)
                .flat_map(|i| if i < self.opaque { [9, 9, 9, 255] } else { [0; 4] })
                .collect()
        }
    }

    #[derive(Default)]
    struct Log {
        frames_requested: usize,
        frames_cancelled: usize,
        intervals_started: usize,
        intervals_cancelled: usize,
        subscribed: bool,
        attached: usize,
    }

    struct FakeHost {
        container_width: f64,
        now: Rc<Cell<Duration>>,
        erase_per_stroke: Rc<Cell<usize>>,
        log: Rc<RefCell<Log>>,
        next: i32,
    }

    impl Host for FakeHost {
        type Surface = FakeSurface;

        fn create_surface(&mut self) -> Result<FakeSurface, ScratchError> {
            Ok(FakeSurface {
                size: (0, 0),
                opaque: 0,
                composite: Composite::SourceOver,
                erase_per_stroke: self.erase_per_stroke.clone(),
            })
        }
        fn attach(&mut self, _surface: &FakeSurface) -> Result<(), ScratchError> {
            self.log.borrow_mut().attached += 1;
            Ok(())
        }
        fn detach(&mut self, _surface: &FakeSurface) {
            self.log.borrow_mut().attached -= 1;
        }
        fn container_width(&self) -> f64 {
            self.container_width
        }
        fn surface_origin(&self) -> Point {
            Point::new(10.0, 20.0)
        }
        fn now(&self) -> Duration {
            self.now.get()
        }
        fn request_frame(&mut self) -> FrameHandle {
            self.next += 1;
            self.log.borrow_mut().frames_requested += 1;
            FrameHandle(self.next)
        }
        fn cancel_frame(&mut self, _handle: FrameHandle) {
            self.log.borrow_mut().frames_cancelled += 1;
        }
        fn start_interval(&mut self, period: Duration) -> TimerHandle {
            assert_eq!(period, fade::tick_period());
            self.next += 1;
            self.log.borrow_mut().intervals_started += 1;
            TimerHandle(self.next)
        }
        fn cancel_interval(&mut self, _handle: TimerHandle) {
            self.log.borrow_mut().intervals_cancelled += 1;
        }
        fn subscribe(&mut self) {
            self.log.borrow_mut().subscribed = true;
        }
        fn unsubscribe(&mut self) {
            self.log.borrow_mut().subscribed = false;
        }
    }

    struct FakeLoader {
        fail: Option<&'static str>,
    }

    impl ImageLoader for FakeLoader {
        type Image = FakeImage;

        async fn load(&self, src: &str) -> Result<FakeImage, ScratchError> {
            if self.fail == Some(src) {
                return Err(ScratchError::asset_load(src, "undecodable"));
            }
            Ok(FakeImage(100, 50))
        }
    }

    struct Rig {
        engine: Scratcher<FakeHost>,
        log: Rc<RefCell<Log>>,
        now: Rc<Cell<Duration>>,
        erase_per_stroke: Rc<Cell<usize>>,
    }

    fn rig(options: ScratcherOptions, container_width: f64) -> Rig {
        let log = Rc::new(RefCell::new(Log::default()));
        let now = Rc::new(Cell::new(Duration::ZERO));
        let erase_per_stroke = Rc::new(Cell::new(0));
        let host = FakeHost {
            container_width,
            now: now.clone(),
            erase_per_stroke: erase_per_stroke.clone(),
            log: log.clone(),
            next: 0,
        };
        Rig {
            engine: Scratcher::new(options, host).unwrap(),
            log,
            now,
            erase_per_stroke,
        }
    }

    fn started(options: ScratcherOptions) -> Rig {
        let mut rig = rig(options, 200.0);
        rig.engine
            .start(Assets {
                cover: FakeImage(100, 50),
                reward: FakeImage(100, 50),
            })
            .unwrap();
        rig
    }

    fn scratch(engine: &mut Scratcher<FakeHost>, n: usize) {
        for i in 0..n {
            engine.handle_input(&InputEvent::from_pointer_move(10.0 + i as f64, 20.0));
        }
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let fired = Rc::new(Cell::new(0));
        let handle = fired.clone();
        (fired, move || handle.set(handle.get() + 1))
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    #[test]
    fn construction_attaches_only_the_visible_surface() {
        let rig = rig(ScratcherOptions::new("m", "b"), 200.0);
        assert_eq!(rig.engine.state(), EngineState::Uninitialized);
        assert_eq!(rig.log.borrow().attached, 1);
        assert_eq!(rig.log.borrow().frames_requested, 0);
    }

    #[tokio::test]
    async fn init_sizes_from_reward_aspect_and_starts_loop() {
        let mut rig = rig(ScratcherOptions::new("m", "b"), 200.0);
        rig.engine.init(&FakeLoader { fail: None }).await.unwrap();

        assert_eq!(rig.engine.state(), EngineState::Running);
        assert_eq!(rig.engine.surfaces().size(), (200, 100));
        assert_eq!(rig.engine.surfaces().mask().size(), (200, 100));
        assert_eq!(rig.engine.coverage(), 1.0);
        assert_eq!(rig.log.borrow().frames_requested, 1);
        assert!(rig.log.borrow().subscribed);
    }

    #[tokio::test]
    async fn undecodable_image_fails_init() {
        let mut rig = rig(ScratcherOptions::new("m", "b"), 200.0);
        let err = rig.engine.init(&FakeLoader { fail: Some("b") }).await.unwrap_err();
        assert!(matches!(err, ScratchError::AssetLoad { ref src, .. } if src == "b"));
        assert_eq!(rig.engine.state(), EngineState::Uninitialized);
        assert!(!rig.log.borrow().subscribed);
    }

    #[tokio::test]
    async fn zero_width_container_is_invalid_geometry() {
        let mut rig = rig(ScratcherOptions::new("m", "b"), 0.0);
        let err = rig.engine.init(&FakeLoader { fail: None }).await.unwrap_err();
        assert!(matches!(err, ScratchError::InvalidGeometry { .. }));
    }

    #[test]
    fn explicit_size_wins_over_container() {
        let rig = started(ScratcherOptions::new("m", "b").with_size(64, 48));
        assert_eq!(rig.engine.surfaces().size(), (64, 48));
    }

    // ─── Strokes ─────────────────────────────────────────────────────────

    #[test]
    fn input_is_converted_to_surface_local_points() {
        let mut rig = started(ScratcherOptions::new("m", "b"));
        let consumed = rig.engine.handle_input(&InputEvent::from_pointer_move(15.0, 27.0));
        assert!(consumed);
        assert_eq!(rig.engine.pending_points(), &[Point::new(5.0, 7.0)]);
    }

    #[test]
    fn frame_waits_for_three_points_then_keeps_the_last() {
        let mut rig = started(ScratcherOptions::new("m", "b"));
        rig.erase_per_stroke.set(100);

        scratch(&mut rig.engine, 2);
        rig.engine.frame();
        assert_eq!(rig.engine.pending_points().len(), 2);
        assert_eq!(rig.engine.coverage(), 1.0);

        scratch(&mut rig.engine, 1);
        rig.engine.frame();
        assert_eq!(rig.engine.pending_points(), &[Point::new(0.0, 0.0)]);
        assert!(rig.engine.coverage() < 1.0);
        // One request at start, one per frame.
        assert_eq!(rig.log.borrow().frames_requested, 3);
    }

    #[test]
    fn stroke_end_flushes_and_empties_the_queue() {
        let mut rig = started(ScratcherOptions::new("m", "b"));
        rig.erase_per_stroke.set(100);

        scratch(&mut rig.engine, 1);
        rig.engine.handle_input(&InputEvent::TouchEnd);
        assert!(rig.engine.pending_points().is_empty());
        assert!(rig.engine.coverage() < 1.0);
        // The flush does not start a second repaint loop.
        assert_eq!(rig.log.borrow().frames_requested, 1);
    }

    #[test]
    fn resize_restores_the_cover() {
        let mut rig = started(ScratcherOptions::new("m", "b"));
        rig.erase_per_stroke.set(5000);
        scratch(&mut rig.engine, 3);
        rig.engine.frame();
        assert!(rig.engine.coverage() < 1.0);

        scratch(&mut rig.engine, 2);
        rig.engine.resize(Some(80), Some(30)).unwrap();
        assert_eq!(rig.engine.surfaces().size(), (80, 30));
        assert_eq!(rig.engine.surfaces().mask().size(), (80, 30));
        assert_eq!(rig.engine.coverage(), 1.0);
        assert!(rig.engine.pending_points().is_empty());
    }

    #[test]
    fn container_resize_is_debounced() {
        let mut rig = started(ScratcherOptions::new("m", "b"));
        rig.engine.host_mut().container_width = 300.0;
        rig.engine.handle_input(&InputEvent::Resize);

        rig.now.set(Duration::from_millis(50));
        rig.engine.frame();
        assert_eq!(rig.engine.surfaces().size(), (200, 100));

        rig.now.set(Duration::from_millis(120));
        rig.engine.frame();
        assert_eq!(rig.engine.surfaces().size(), (300, 150));
    }

    #[test]
    fn failed_resize_keeps_the_previous_configuration() {
        let mut rig = rig(ScratcherOptions::new("m", "b").with_size(64, 48), 0.0);
        rig.engine
            .start(Assets {
                cover: FakeImage(100, 50),
                reward: FakeImage(100, 50),
            })
            .unwrap();
        scratch(&mut rig.engine, 2);

        let err = rig.engine.resize(None, None).unwrap_err();
        assert!(matches!(err, ScratchError::InvalidGeometry { .. }));
        assert_eq!(rig.engine.surfaces().size(), (64, 48));
        assert_eq!(rig.engine.pending_points().len(), 2);

        // The explicit size still pins the card against container changes.
        rig.engine.host_mut().container_width = 200.0;
        rig.engine.handle_input(&InputEvent::Resize);
        rig.now.set(Duration::from_secs(1));
        rig.engine.frame();
        assert_eq!(rig.engine.surfaces().size(), (64, 48));
    }

    #[test]
    fn container_resize_is_ignored_with_explicit_size() {
        let mut rig = started(ScratcherOptions::new("m", "b").with_size(64, 48));
        rig.engine.host_mut().container_width = 300.0;
        rig.engine.handle_input(&InputEvent::Resize);
        rig.now.set(Duration::from_secs(1));
        rig.engine.frame();
        assert_eq!(rig.engine.surfaces().size(), (64, 48));
    }

    // ─── Auto-clear ──────────────────────────────────────────────────────

    #[test]
    fn crossing_threshold_starts_the_fade() {
        let mut rig = started(ScratcherOptions::new("m", "b").with_clear(0.1, 1.0));
        let (fired, callback) = counter();
        rig.engine.on_clear(callback);

        // 200x100 surface: one stroke leaves 5% covered.
        rig.erase_per_stroke.set(19_000);
        scratch(&mut rig.engine, 3);
        rig.engine.frame();

        assert_eq!(rig.engine.state(), EngineState::Clearing);
        assert_eq!(rig.log.borrow().frames_cancelled, 1);
        assert_eq!(rig.log.borrow().intervals_started, 1);
        assert!(!rig.log.borrow().subscribed);

        for _ in 0..29 {
            rig.engine.fade_tick();
        }
        assert_eq!(fired.get(), 0, "callbacks must wait for the fade");
        rig.engine.fade_tick();
        assert_eq!(fired.get(), 1);
        assert_eq!(rig.engine.state(), EngineState::Terminated);
        assert_eq!(rig.log.borrow().intervals_cancelled, 1);

        rig.engine.fade_tick();
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn coverage_equal_to_threshold_keeps_running() {
        let mut rig = started(ScratcherOptions::new("m", "b").with_clear(0.5, 1.0));
        // 200x100 surface: one stroke leaves exactly half covered.
        rig.erase_per_stroke.set(10_000);
        scratch(&mut rig.engine, 3);
        rig.engine.frame();

        assert_eq!(rig.engine.coverage(), 0.5);
        assert_eq!(rig.engine.state(), EngineState::Running);
        assert_eq!(rig.log.borrow().intervals_started, 0);
    }

    #[test]
    fn zero_threshold_never_clears() {
        let mut rig = started(ScratcherOptions::new("m", "b"));
        rig.erase_per_stroke.set(usize::MAX);
        scratch(&mut rig.engine, 3);
        rig.engine.frame();
        assert_eq!(rig.engine.coverage(), 0.0);
        assert_eq!(rig.engine.state(), EngineState::Running);
    }

    #[test]
    fn stale_frames_after_clear_are_ignored() {
        let mut rig = started(ScratcherOptions::new("m", "b"));
        rig.engine.clear(1.0);
        let requested = rig.log.borrow().frames_requested;
        rig.engine.frame();
        assert_eq!(rig.log.borrow().frames_requested, requested);
    }

    #[test]
    fn callbacks_fire_in_registration_order() {
        let mut rig = started(ScratcherOptions::new("m", "b"));
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let order = order.clone();
            rig.engine.on_clear(move || order.borrow_mut().push(i));
        }
        rig.engine.clear(0.0);
        rig.engine.fade_tick();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    // ─── Idempotence ─────────────────────────────────────────────────────

    #[test]
    fn clear_twice_starts_one_timer() {
        let mut rig = started(ScratcherOptions::new("m", "b"));
        rig.engine.clear(1.0);
        rig.engine.clear(1.0);
        assert_eq!(rig.log.borrow().intervals_started, 1);
    }

    #[test]
    fn destroy_is_idempotent_and_silences_clear() {
        let mut rig = started(ScratcherOptions::new("m", "b"));
        let (fired, callback) = counter();
        rig.engine.on_clear(callback);

        rig.engine.destroy();
        rig.engine.destroy();
        rig.engine.clear(1.0);
        rig.engine.fade_tick();

        assert_eq!(rig.engine.state(), EngineState::Destroyed);
        assert_eq!(fired.get(), 0);
        assert_eq!(rig.log.borrow().attached, 0);
        assert_eq!(rig.log.borrow().frames_cancelled, 1);
        assert_eq!(rig.log.borrow().intervals_started, 0);
        assert!(!rig.engine.handle_input(&InputEvent::from_pointer_move(1.0, 1.0)));
    }

    #[test]
    fn destroy_during_fade_cancels_the_timer() {
        let mut rig = started(ScratcherOptions::new("m", "b"));
        let (fired, callback) = counter();
        rig.engine.on_clear(callback);
        rig.engine.clear(1.0);
        rig.engine.destroy();
        for _ in 0..60 {
            rig.engine.fade_tick();
        }
        assert_eq!(rig.log.borrow().intervals_cancelled, 1);
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn start_after_destroy_is_rejected() {
        let mut rig = rig(ScratcherOptions::new("m", "b"), 200.0);
        rig.engine.destroy();
        let err = rig
            .engine
            .start(Assets {
                cover: FakeImage(1, 1),
                reward: FakeImage(1, 1),
            })
            .unwrap_err();
        assert_eq!(err, ScratchError::Destroyed);
    }
}
