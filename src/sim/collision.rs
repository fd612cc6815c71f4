//! Pixel-exact contact test against a composited bitmap.
//!
//! ✔ reads the bitmap back through `Bitmap::read_row`, never raw bytes
//! ✔ short-circuits on the first overlapping row
//! ✔ every black pixel counts, so the target must hold lethal pixels only
//!   (the renderer keeps a separate contact layer without the checkerboard)

use smallvec::SmallVec;

use crate::raster::{Bitmap, Pattern};

/// A figure about to be drawn at screen `(x, y)`.
#[derive(Clone, Copy, Debug)]
pub struct Placement<'a> {
    pub x: i32,
    pub y: i32,
    /// Rows to test, at most `mask.height()`.
    pub height: usize,
    pub mask: &'a Pattern,
}

impl<'a> Placement<'a> {
    pub fn new(x: i32, y: i32, mask: &'a Pattern) -> Self {
        Self {
            x,
            y,
            height: mask.height(),
            mask,
        }
    }
}

/// `true` as soon as any mask bit lands on a black pixel.
///
/// Everything lethal must already be in `bmp`; ghost walls and the gray
/// backdrop must not be.
pub fn check_figure(bmp: &Bitmap, at: &Placement<'_>) -> bool {
    let mask = at.mask;
    let mut under: SmallVec<[u8; 8]> = SmallVec::from_elem(0, mask.stride());
    for r in 0..at.height.min(mask.height()) {
        bmp.read_row(at.x, at.y + r as i32, mask.width(), &mut under);
        let hit = mask
            .row(r)
            .iter()
            .zip(under.iter())
            .any(|(&m, &u)| m & u != 0);
        if hit {
            return true;
        }
    }
    false
}

/*──────────────────────────────── Tests ───────────────────────────────*/
