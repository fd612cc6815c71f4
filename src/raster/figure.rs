//! Figure compositing primitives shared by the ship, bunkers, fuel cells,
//! craters, shots and explosion shards.
//!
//! Every figure is a definition [`Pattern`] plus a mask of the same size.
//! Coordinates are screen pixels of the figure's top-left corner.
//!
//! The gray background is a checkerboard whose pixel is black iff
//! `(world_x + world_y)` is even.  [`alignment`] gives that parity for a
//! figure's top-left world position and [`background_for`] turns it into
//! the two row bytes (even rows, odd rows relative to the figure top).
//!
//! [`erase_figure`] and [`shift_figure`] are not part of the frame sequence.
//! The renderer's ship shadow is a [`gray_figure`] laid under the terrain;
//! these two are for callers that want a hard black rim instead.

use smallvec::SmallVec;

use super::{Bitmap, Pattern, RasterOp};

/// Drop-shadow vector, shared by the gray ship shadow and [`shift_figure`].
pub const SHADOW_DX: i32 = 1;
pub const SHADOW_DY: i32 = 1;

/// Checkerboard byte whose leftmost pixel is black.
pub const BACK_EVEN: u8 = 0xAA;
/// Checkerboard byte whose leftmost pixel is white.
pub const BACK_ODD: u8 = 0x55;

/// Dither bytes for even and odd figure rows.
pub type Background = [u8; 2];

type RowBuf = SmallVec<[u8; 8]>;

/// Parity of a world position, 0 when the gray pixel there is black.
#[inline]
pub fn alignment(world_x: i32, world_y: i32) -> u8 {
    (world_x.wrapping_add(world_y) & 1) as u8
}

/// Background rows for a figure whose top-left pixel has `align` parity.
#[inline]
pub fn background_for(align: u8) -> Background {
    if align & 1 == 0 {
        [BACK_EVEN, BACK_ODD]
    } else {
        [BACK_ODD, BACK_EVEN]
    }
}

/// Is the gray backdrop black at this world position?
#[inline]
pub fn dither_bit(world_x: i32, world_y: i32) -> bool {
    alignment(world_x, world_y) == 0
}

/// Opaque blit: clear the mask footprint, then OR the definition.
pub fn full_figure(bmp: &mut Bitmap, x: i32, y: i32, def: &Pattern, mask: &Pattern) {
    let rows = def.height().min(mask.height());
    for r in 0..rows {
        let yy = y + r as i32;
        bmp.blit_row(x, yy, mask.row(r), mask.width(), RasterOp::AndNot);
        bmp.blit_row(x, yy, def.row(r), def.width(), RasterOp::Or);
    }
}

/// Gray blit: inside the mask the backdrop checkerboard is restored, so a
/// shadow falling on white terrain reads as gray and blends into the gray
/// elsewhere.
pub fn gray_figure(bmp: &mut Bitmap, x: i32, y: i32, mask: &Pattern, background: Background) {
    for r in 0..mask.height() {
        let back = background[r & 1];
        let row: RowBuf = mask.row(r).iter().map(|m| m & back).collect();
        let yy = y + r as i32;
        bmp.blit_row(x, yy, mask.row(r), mask.width(), RasterOp::AndNot);
        bmp.blit_row(x, yy, &row, mask.width(), RasterOp::Or);
    }
}

/// Paint the mask footprint white.
pub fn erase_figure(bmp: &mut Bitmap, x: i32, y: i32, mask: &Pattern) {
    for r in 0..mask.height() {
        bmp.blit_row(x, y + r as i32, mask.row(r), mask.width(), RasterOp::AndNot);
    }
}

/// Drop shadow without a second buffer: clear the footprint, then paint the
/// mask black again offset by the shadow vector.  A following
/// [`full_figure`] at `(x, y)` leaves only the offset rim visible.
pub fn shift_figure(bmp: &mut Bitmap, x: i32, y: i32, mask: &Pattern) {
    erase_figure(bmp, x, y, mask);
    for r in 0..mask.height() {
        bmp.blit_row(
            x + SHADOW_DX,
            y + SHADOW_DY + r as i32,
            mask.row(r),
            mask.width(),
            RasterOp::Or,
        );
    }
}

/// Rectangle copy of a figure already composited over the backdrop
/// (see `Sprite::aligned`): no per-pixel mask work at draw time.
pub fn aligned_figure(bmp: &mut Bitmap, x: i32, y: i32, image: &Pattern) {
    let full: RowBuf = SmallVec::from_elem(0xFF, image.stride());
    for r in 0..image.height() {
        let yy = y + r as i32;
        bmp.blit_row(x, yy, &full, image.width(), RasterOp::AndNot);
        bmp.blit_row(x, yy, image.row(r), image.width(), RasterOp::Or);
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
