//! tiny-skia surfaces.
//!
//! Mirrors Canvas2D semantics closely enough for the engine: images are
//! stretched on draw, strokes honour the composite mode, and the pen's blur
//! is approximated with concentric translucent passes around the stroke.

use scratch_core::{BezPath, Composite, Image, LineCap, PathEl, Pen, ScratchError, Surface};
use tiny_skia::{
    BlendMode, Color, ColorU8, FilterQuality, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

/// Translucent passes used to feather a stroke's edge.
const FEATHER_PASSES: u32 = 4;

/// A decoded image held as a premultiplied pixmap.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixmap: Pixmap,
}

impl RasterImage {
    /// Build from non-premultiplied RGBA8 rows.
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> Result<Self, ScratchError> {
        let mut pixmap = Pixmap::new(width, height).ok_or(ScratchError::InvalidGeometry {
            width: width as f64,
            height: height as f64,
        })?;
        if rgba.len() != pixmap.data().len() {
            return Err(ScratchError::asset_load(
                "<memory>",
                format!("expected {} bytes, got {}", pixmap.data().len(), rgba.len()),
            ));
        }
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.chunks_exact(4)) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Ok(Self { pixmap })
    }

    /// A single-colour image.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, ScratchError> {
        let data: Vec<u8> = rgba.iter().copied().cycle().take(width as usize * height as usize * 4).collect();
        Self::from_rgba8(width, height, &data)
    }

    /// Decode PNG or JPEG bytes.
    pub fn decode(src: &str, bytes: &[u8]) -> Result<Self, ScratchError> {
        let decoded = image::load_from_memory(bytes).map_err(|e| ScratchError::asset_load(src, e))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.as_raw()).map_err(|e| ScratchError::asset_load(src, e))
    }
}

impl Image for RasterImage {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }
}

/// A software surface. Zero-sized surfaces hold no pixmap and ignore draws.
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixmap: Option<Pixmap>,
    composite: Composite,
    alpha: f32,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterSurface {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            pixmap: None,
            composite: Composite::SourceOver,
            alpha: 1.0,
        }
    }

    /// Non-premultiplied RGBA at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.as_ref()?.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    fn blend_mode(&self) -> BlendMode {
        match self.composite {
            Composite::SourceOver => BlendMode::SourceOver,
            Composite::DestinationOut => BlendMode::DestinationOut,
        }
    }

    fn pixmap_paint(&self) -> PixmapPaint {
        PixmapPaint {
            opacity: self.alpha,
            blend_mode: self.blend_mode(),
            quality: FilterQuality::Bilinear,
        }
    }
}

impl Surface for RasterSurface {
    type Image = RasterImage;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.pixmap = Pixmap::new(width, height);
        // Only a real pixmap gives the surface a size.
        (self.width, self.height) = match &self.pixmap {
            Some(_) => (width, height),
            None => (0, 0),
        };
        self.composite = Composite::SourceOver;
        self.alpha = 1.0;
    }

    fn clear(&mut self) {
        if let Some(pixmap) = &mut self.pixmap {
            pixmap.fill(Color::TRANSPARENT);
        }
    }

    fn set_composite(&mut self, composite: Composite) {
        self.composite = composite;
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn draw_image(&mut self, image: &RasterImage) {
        let paint = self.pixmap_paint();
        let Some(pixmap) = &mut self.pixmap else {
            return;
        };
        let sx = pixmap.width() as f32 / image.pixmap.width() as f32;
        let sy = pixmap.height() as f32 / image.pixmap.height() as f32;
        pixmap.draw_pixmap(0, 0, image.pixmap.as_ref(), &paint, Transform::from_scale(sx, sy), None);
    }

    fn draw_surface(&mut self, other: &Self) {
        let paint = self.pixmap_paint();
        let (Some(pixmap), Some(src)) = (&mut self.pixmap, &other.pixmap) else {
            return;
        };
        pixmap.draw_pixmap(0, 0, src.as_ref(), &paint, Transform::identity(), None);
    }

    fn stroke(&mut self, path: &BezPath, pen: &Pen) {
        let blend_mode = self.blend_mode();
        let alpha = self.alpha;
        let (Some(pixmap), Some(path)) = (&mut self.pixmap, to_skia_path(path)) else {
            return;
        };

        let mut stroke = Stroke {
            width: pen.width as f32,
            line_cap: map_cap(pen.cap),
            line_join: LineJoin::Round,
            ..Default::default()
        };
        let mut paint = Paint {
            blend_mode,
            anti_alias: true,
            ..Default::default()
        };

        if pen.blur > 0.0 {
            let pass_alpha = alpha / (FEATHER_PASSES + 1) as f32;
            for pass in (1..=FEATHER_PASSES).rev() {
                let spread = pen.blur * pass as f64 / FEATHER_PASSES as f64;
                stroke.width = (pen.width + spread) as f32;
                paint.set_color(black(pass_alpha));
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }

        stroke.width = pen.width as f32;
        paint.set_color(black(alpha));
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    fn pixels(&self) -> Vec<u8> {
        let Some(pixmap) = &self.pixmap else {
            return Vec::new();
        };
        pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn black(alpha: f32) -> Color {
    Color::from_rgba(0.0, 0.0, 0.0, alpha.clamp(0.0, 1.0)).unwrap_or(Color::BLACK)
}

fn map_cap(cap: LineCap) -> tiny_skia::LineCap {
    match cap {
        LineCap::Butt => tiny_skia::LineCap::Butt,
        LineCap::Round => tiny_skia::LineCap::Round,
        LineCap::Square => tiny_skia::LineCap::Square,
    }
}

fn to_skia_path(path: &BezPath) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}
