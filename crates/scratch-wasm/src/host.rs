//! Browser host: DOM container, animation frames, timers and listeners.
//!
//! Callbacks hold a weak reference back to the engine so dropping the
//! `ScratchCard` releases everything. A callback that finds the engine
//! already borrowed (re-entrant JS) drops the event.

use crate::surface::{CanvasSurface, host_error, warn_on_err};
use scratch_core::{FrameHandle, Host, InputEvent, Point, ScratchError, Scratcher, TimerHandle};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlCanvasElement, HtmlElement, MouseEvent, TouchEvent, Window};

pub type SharedScratcher = Rc<RefCell<Scratcher<WebHost>>>;

/// Events listened for on the visible canvas.
const SURFACE_EVENTS: [&str; 7] = [
    "mousemove",
    "mouseenter",
    "mouseleave",
    "touchmove",
    "touchstart",
    "touchend",
    "touchcancel",
];

struct Listener {
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

pub struct WebHost {
    window: Window,
    document: Document,
    container: HtmlElement,
    /// The attached, visible canvas that input listeners live on.
    visible: Option<HtmlCanvasElement>,
    frame_callback: Option<Closure<dyn FnMut()>>,
    fade_callback: Option<Closure<dyn FnMut()>>,
    surface_listeners: Vec<Listener>,
    resize_listener: Option<Closure<dyn FnMut(Event)>>,
    subscribed: bool,
}

impl WebHost {
    pub fn new(container: HtmlElement) -> Result<Self, ScratchError> {
        let window = web_sys::window().ok_or_else(|| ScratchError::Host("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| ScratchError::Host("no document".into()))?;
        Ok(Self {
            window,
            document,
            container,
            visible: None,
            frame_callback: None,
            fade_callback: None,
            surface_listeners: Vec::new(),
            resize_listener: None,
            subscribed: false,
        })
    }
}

/// Wire frame, fade and input callbacks of `engine`'s host back to it.
/// Must run before the engine starts.
pub fn bind(engine: &SharedScratcher) {
    let weak = Rc::downgrade(engine);

    let frame = {
        let weak = weak.clone();
        Closure::<dyn FnMut()>::new(move || with_engine(&weak, |e| e.frame()))
    };
    let fade = {
        let weak = weak.clone();
        Closure::<dyn FnMut()>::new(move || with_engine(&weak, |e| e.fade_tick()))
    };
    let surface_listeners = SURFACE_EVENTS
        .iter()
        .map(|&event| Listener {
            event,
            callback: input_callback(weak.clone()),
        })
        .collect();
    let resize = input_callback(weak);

    let mut engine = engine.borrow_mut();
    let host = engine.host_mut();
    host.frame_callback = Some(frame);
    host.fade_callback = Some(fade);
    host.surface_listeners = surface_listeners;
    host.resize_listener = Some(resize);
}

fn with_engine(weak: &Weak<RefCell<Scratcher<WebHost>>>, f: impl FnOnce(&mut Scratcher<WebHost>)) {
    let Some(engine) = weak.upgrade() else {
        return;
    };
    let Ok(mut engine) = engine.try_borrow_mut() else {
        log::warn!("scratcher busy, dropping callback");
        return;
    };
    f(&mut engine);
}

fn input_callback(weak: Weak<RefCell<Scratcher<WebHost>>>) -> Closure<dyn FnMut(Event)> {
    Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(input) = to_input_event(&event) else {
            return;
        };
        with_engine(&weak, |engine| {
            if engine.handle_input(&input) {
                event.prevent_default();
            }
        });
    })
}

/// Translate a DOM event into client-space engine input.
fn to_input_event(event: &Event) -> Option<InputEvent> {
    let mouse = || {
        event
            .dyn_ref::<MouseEvent>()
            .map(|m| (m.client_x() as f64, m.client_y() as f64))
    };
    let touches = || {
        let list = event.dyn_ref::<TouchEvent>()?.changed_touches();
        Some(
            (0..list.length())
                .filter_map(|i| list.get(i))
                .map(|t| (t.client_x() as f64, t.client_y() as f64))
                .collect::<Vec<_>>(),
        )
    };

    match event.type_().as_str() {
        "mousemove" => mouse().map(|(x, y)| InputEvent::from_pointer_move(x, y)),
        "mouseenter" => mouse().map(|(x, y)| InputEvent::from_pointer_enter(x, y)),
        "mouseleave" => Some(InputEvent::PointerLeave),
        "touchstart" => touches().map(InputEvent::from_touch_start),
        "touchmove" => touches().map(InputEvent::from_touch_move),
        "touchend" => Some(InputEvent::TouchEnd),
        "touchcancel" => Some(InputEvent::TouchCancel),
        "resize" => Some(InputEvent::Resize),
        _ => None,
    }
}

impl Host for WebHost {
    type Surface = CanvasSurface;

    fn create_surface(&mut self) -> Result<CanvasSurface, ScratchError> {
        CanvasSurface::new(&self.document)
    }

    fn attach(&mut self, surface: &CanvasSurface) -> Result<(), ScratchError> {
        self.container.append_child(surface.canvas()).map_err(host_error)?;
        self.visible = Some(surface.canvas().clone());
        Ok(())
    }

    fn detach(&mut self, surface: &CanvasSurface) {
        if let Err(err) = self.container.remove_child(surface.canvas()) {
            log::warn!("removing canvas failed: {err:?}");
        }
        self.visible = None;
    }

    fn container_width(&self) -> f64 {
        self.container.client_width() as f64
    }

    fn surface_origin(&self) -> Point {
        self.visible
            .as_ref()
            .map(|canvas| {
                let rect = canvas.get_bounding_client_rect();
                Point::new(rect.left(), rect.top())
            })
            .unwrap_or_default()
    }

    fn now(&self) -> Duration {
        let ms = self.window.performance().map(|p| p.now()).unwrap_or(0.0);
        Duration::from_secs_f64(ms.max(0.0) / 1000.0)
    }

    fn request_frame(&mut self) -> FrameHandle {
        let Some(callback) = &self.frame_callback else {
            log::warn!("frame requested before callbacks were bound");
            return FrameHandle(0);
        };
        match self.window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(id) => FrameHandle(id),
            Err(err) => {
                log::warn!("requestAnimationFrame failed: {err:?}");
                FrameHandle(0)
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0) {
            log::warn!("cancelAnimationFrame failed: {err:?}");
        }
    }

    fn start_interval(&mut self, period: Duration) -> TimerHandle {
        let Some(callback) = &self.fade_callback else {
            log::warn!("interval requested before callbacks were bound");
            return TimerHandle(0);
        };
        let timeout = period.as_millis().min(i32::MAX as u128) as i32;
        match self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), timeout)
        {
            Ok(id) => TimerHandle(id),
            Err(err) => {
                log::warn!("setInterval failed: {err:?}");
                TimerHandle(0)
            }
        }
    }

    fn cancel_interval(&mut self, handle: TimerHandle) {
        self.window.clear_interval_with_handle(handle.0);
    }

    fn subscribe(&mut self) {
        if self.subscribed {
            return;
        }
        if let Some(canvas) = &self.visible {
            for listener in &self.surface_listeners {
                warn_on_err(
                    listener.event,
                    canvas.add_event_listener_with_callback(listener.event, listener.callback.as_ref().unchecked_ref()),
                );
            }
        }
        if let Some(resize) = &self.resize_listener {
            warn_on_err(
                "resize",
                self.window
                    .add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref()),
            );
        }
        self.subscribed = true;
    }

    fn unsubscribe(&mut self) {
        if !self.subscribed {
            return;
        }
        if let Some(canvas) = &self.visible {
            for listener in &self.surface_listeners {
                warn_on_err(
                    listener.event,
                    canvas.remove_event_listener_with_callback(listener.event, listener.callback.as_ref().unchecked_ref()),
                );
            }
        }
        if let Some(resize) = &self.resize_listener {
            warn_on_err(
                "resize",
                self.window
                    .remove_event_listener_with_callback("resize", resize.as_ref().unchecked_ref()),
            );
        }
        self.subscribed = false;
    }
}
