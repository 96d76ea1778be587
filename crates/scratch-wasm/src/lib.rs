//! WASM bridge: exposes the scratch card engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. JS creates a card inside a
//! container element and awaits image loading:
//!
//! ```js
//! const card = await createScratchCard(el, JSON.stringify({
//!   maskSrc: "cover.png", backSrc: "prize.png", clearThreshold: 0.3,
//! }));
//! card.onClear(() => console.log("revealed"));
//! ```

mod host;
mod loader;
mod surface;

pub use host::{SharedScratcher, WebHost};
pub use loader::WebImageLoader;
pub use surface::{CanvasSurface, WebImage};

use scratch_core::{EngineState, Host, ScratchError, Scratcher, ScratcherOptions, load_assets};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

/// A running scratch card. All interaction from JS goes through this struct.
#[wasm_bindgen]
pub struct ScratchCard {
    engine: SharedScratcher,
}

/// Create a scratch card inside `container`.
///
/// Resolves once both images have decoded and the card is interactive;
/// rejects if either image fails to load or the container has no width.
#[wasm_bindgen(js_name = createScratchCard)]
pub async fn create_scratch_card(container: HtmlElement, options_json: String) -> Result<ScratchCard, JsValue> {
    console_error_panic_hook_setup();

    let options = ScratcherOptions::from_json(&options_json).map_err(to_js)?;
    let host = WebHost::new(container).map_err(to_js)?;
    let engine = Rc::new(RefCell::new(Scratcher::new(options.clone(), host).map_err(to_js)?));
    host::bind(&engine);

    // Load outside the borrow so DOM callbacks never see a held engine.
    let assets = load_assets(&WebImageLoader, &options).await.map_err(to_js)?;
    engine.borrow_mut().start(assets).map_err(to_js)?;
    Ok(ScratchCard { engine })
}

#[wasm_bindgen]
impl ScratchCard {
    /// Resize the card. Omitted dimensions follow the container.
    /// Scratch progress is reset.
    pub fn resize(&self, width: Option<u32>, height: Option<u32>) -> Result<(), JsValue> {
        self.engine_mut()?.resize(width, height).map_err(to_js)
    }

    /// Fade out the remaining cover over `duration` seconds.
    pub fn clear(&self, duration: f64) -> Result<(), JsValue> {
        self.engine_mut()?.clear(duration);
        Ok(())
    }

    /// Register a callback fired once the cover has fully faded.
    #[wasm_bindgen(js_name = onClear)]
    pub fn on_clear(&self, callback: js_sys::Function) -> Result<(), JsValue> {
        self.engine_mut()?.on_clear(move || {
            // Deferred so the callback may call back into this card.
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = callback.call0(&JsValue::NULL) {
                    log::warn!("onClear callback threw: {err:?}");
                }
            });
        });
        Ok(())
    }

    /// Tear the card down and remove its canvas from the container.
    pub fn destroy(&self) -> Result<(), JsValue> {
        self.engine_mut()?.destroy();
        Ok(())
    }

    /// Fraction of the cover still unscratched.
    pub fn coverage(&self) -> f64 {
        self.engine.try_borrow().map(|e| e.coverage()).unwrap_or(0.0)
    }

    /// Lifecycle state: `running`, `clearing`, `terminated` or `destroyed`.
    pub fn state(&self) -> String {
        let state = self.engine.try_borrow().map(|e| e.state());
        match state {
            Ok(EngineState::Uninitialized) => "uninitialized",
            Ok(EngineState::Running) => "running",
            Ok(EngineState::Clearing) => "clearing",
            Ok(EngineState::Terminated) => "terminated",
            Ok(EngineState::Destroyed) => "destroyed",
            Err(_) => "busy",
        }
        .to_string()
    }

    fn engine_mut(&self) -> Result<std::cell::RefMut<'_, Scratcher<WebHost>>, JsValue> {
        self.engine
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("scratch card is busy"))
    }
}

// JS may free the card without calling `destroy()`; the browser would
// otherwise keep calling into dropped closures.
impl Drop for ScratchCard {
    fn drop(&mut self) {
        release(&self.engine);
    }
}

fn release<H: Host>(engine: &RefCell<Scratcher<H>>) {
    match engine.try_borrow_mut() {
        Ok(mut engine) => engine.destroy(),
        Err(_) => log::warn!("scratch card dropped while busy, skipping teardown"),
    }
}

fn to_js(err: ScratchError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("scratch card WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
