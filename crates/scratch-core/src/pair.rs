//! Surface pair: the erasable mask and the visible output.
//!
//! The mask holds the cover image and gets holes punched into it. The back
//! surface is what the user sees: the reward image with the mask drawn over
//! it. Both surfaces always share one size.

use crate::coverage;
use crate::options::Pen;
use crate::surface::{Composite, Image, Surface};
use kurbo::BezPath;

pub struct SurfacePair<S: Surface> {
    mask: S,
    back: S,
    cover: Option<S::Image>,
    reward: Option<S::Image>,
}

impl<S: Surface> SurfacePair<S> {
    pub fn new(mask: S, back: S) -> Self {
        Self {
            mask,
            back,
            cover: None,
            reward: None,
        }
    }

    pub fn mask(&self) -> &S {
        &self.mask
    }

    /// The visible surface.
    pub fn back(&self) -> &S {
        &self.back
    }

    pub fn set_images(&mut self, cover: S::Image, reward: S::Image) {
        self.cover = Some(cover);
        self.reward = Some(reward);
    }

    pub fn release_images(&mut self) {
        self.cover = None;
        self.reward = None;
    }

    pub fn has_images(&self) -> bool {
        self.cover.is_some() && self.reward.is_some()
    }

    pub fn size(&self) -> (u32, u32) {
        self.back.size()
    }

    /// Both images loaded and a non-degenerate size.
    pub fn is_drawable(&self) -> bool {
        let (w, h) = self.size();
        w > 0 && h > 0 && self.has_images()
    }

    /// Height over width of the reward image.
    pub fn reward_aspect(&self) -> Option<f64> {
        let reward = self.reward.as_ref()?;
        (reward.width() > 0).then(|| reward.height() as f64 / reward.width() as f64)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.mask.resize(width, height);
        self.back.resize(width, height);
    }

    /// Paint a fresh cover onto the mask, discarding every erased hole.
    pub fn restore_cover(&mut self) {
        self.mask.set_composite(Composite::SourceOver);
        self.mask.set_alpha(1.0);
        self.mask.clear();
        if let Some(cover) = &self.cover {
            self.mask.draw_image(cover);
        }
    }

    /// Subtract a stroke from the mask.
    pub fn erase(&mut self, path: &BezPath, pen: &Pen) {
        self.mask.set_composite(Composite::DestinationOut);
        self.mask.stroke(path, pen);
    }

    /// Fraction of the mask still fully opaque.
    pub fn coverage(&self) -> f64 {
        let (w, h) = self.mask.size();
        coverage::opaque_fraction(&self.mask.pixels(), w, h)
    }

    /// Recompose the visible output: reward below, mask on top.
    pub fn composite(&mut self) {
        self.composite_with_alpha(1.0);
    }

    /// Recompose with the mask drawn at `alpha`.
    pub fn composite_with_alpha(&mut self, alpha: f32) {
        self.back.clear();
        self.back.set_composite(Composite::SourceOver);
        self.back.set_alpha(1.0);
        if let Some(reward) = &self.reward {
            self.back.draw_image(reward);
        }
        self.back.set_alpha(alpha);
        self.back.draw_surface(&self.mask);
        self.back.set_alpha(1.0);
    }

    /// Show the reward alone, with no cover left.
    pub fn reveal(&mut self) {
        self.back.clear();
        self.back.set_composite(Composite::SourceOver);
        self.back.set_alpha(1.0);
        if let Some(reward) = &self.reward {
            self.back.draw_image(reward);
        }
    }
}
