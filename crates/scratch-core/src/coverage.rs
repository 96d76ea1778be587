//! Coverage metering over an RGBA pixel buffer.

/// A pixel counts as covered only when all four channels are nonzero.
#[inline]
pub fn is_covered(px: &[u8]) -> bool {
    px.iter().all(|c| *c != 0)
}

/// Fraction of a `width` x `height` RGBA buffer that is still covered.
///
/// Always within `[0, 1]`. A degenerate surface has nothing left covered.
pub fn opaque_fraction(pixels: &[u8], width: u32, height: u32) -> f64 {
    let total = width as usize * height as usize;
    if total == 0 {
        return 0.0;
    }
    let covered = pixels
        .chunks_exact(4)
        .take(total)
        .filter(|px| is_covered(px))
        .count();
    covered as f64 / total as f64
}
