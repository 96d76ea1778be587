//! Canvas2D surfaces.
//!
//! Each surface is an `HtmlCanvasElement` with its 2D context. Composite
//! modes, alpha and stroke styling map one to one onto context state.

use scratch_core::{BezPath, Composite, Image, PathEl, Pen, ScratchError, Surface};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

/// A decoded `<img>`.
pub struct WebImage(pub HtmlImageElement);

impl Image for WebImage {
    fn width(&self) -> u32 {
        self.0.natural_width()
    }

    fn height(&self) -> u32 {
        self.0.natural_height()
    }
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(document: &Document) -> Result<Self, ScratchError> {
        let canvas = document
            .create_element("canvas")
            .map_err(host_error)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| ScratchError::Host("created element is not a canvas".into()))?;
        let ctx = canvas
            .get_context("2d")
            .map_err(host_error)?
            .ok_or_else(|| ScratchError::Host("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ScratchError::Host("unexpected context type".into()))?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    type Image = WebImage;

    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    // Assigning width/height clears the bitmap and resets context state.
    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
    }

    fn set_composite(&mut self, composite: Composite) {
        let op = match composite {
            Composite::SourceOver => "source-over",
            Composite::DestinationOut => "destination-out",
        };
        warn_on_err("globalCompositeOperation", self.ctx.set_global_composite_operation(op));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
    }

    fn draw_image(&mut self, image: &WebImage) {
        let (w, h) = self.size();
        warn_on_err(
            "drawImage",
            self.ctx
                .draw_image_with_html_image_element_and_dw_and_dh(&image.0, 0.0, 0.0, w as f64, h as f64),
        );
    }

    fn draw_surface(&mut self, other: &Self) {
        warn_on_err(
            "drawImage",
            self.ctx.draw_image_with_html_canvas_element(&other.canvas, 0.0, 0.0),
        );
    }

    fn stroke(&mut self, path: &BezPath, pen: &Pen) {
        let ctx = &self.ctx;
        ctx.set_stroke_style_str("rgba(0,0,0,1)");
        ctx.set_line_cap(pen.cap.as_str());
        ctx.set_line_width(pen.width);
        ctx.set_line_join("round");
        ctx.set_shadow_blur(pen.blur);
        ctx.set_shadow_color("#000000");

        ctx.begin_path();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => ctx.move_to(p.x, p.y),
                PathEl::LineTo(p) => ctx.line_to(p.x, p.y),
                PathEl::QuadTo(c, p) => ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
                PathEl::CurveTo(c1, c2, p) => ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
                PathEl::ClosePath => ctx.close_path(),
            }
        }
        ctx.stroke();
    }

    fn pixels(&self) -> Vec<u8> {
        let (w, h) = self.size();
        if w == 0 || h == 0 {
            return Vec::new();
        }
        match self.ctx.get_image_data(0.0, 0.0, w as f64, h as f64) {
            Ok(data) => data.data().0,
            Err(err) => {
                log::warn!("getImageData failed: {err:?}");
                Vec::new()
            }
        }
    }
}

pub(crate) fn host_error(err: JsValue) -> ScratchError {
    ScratchError::Host(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

pub(crate) fn warn_on_err(what: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        log::warn!("{what} failed: {err:?}");
    }
}
