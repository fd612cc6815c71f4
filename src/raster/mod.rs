//! 1-bit raster layer.
//!
//! *Nothing outside this module touches raw frame-buffer bytes.*
//! Terrain, figures and the contact test all go through the
//! [`Bitmap`] primitives, combining rows of packed bits with a [`RasterOp`].
//!
//! * Bit 7 of every byte is the leftmost pixel.
//! * A set bit is black, a clear bit is white.
//! * Every primitive clips silently, so half-visible geometry needs no
//!   explicit clipping at the call-site.

mod bitmap;
pub mod figure;
mod pattern;

pub use bitmap::Bitmap;
pub use figure::{
    BACK_EVEN, BACK_ODD, Background, aligned_figure, alignment, background_for, dither_bit, erase_figure, full_figure,
    gray_figure, shift_figure,
};
pub use pattern::{Pattern, PatternError};

/// How a source row is combined into the destination.
///
/// `cover` selects which destination bits take part; everything outside it
/// is left untouched whatever the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterOp {
    /// Paint black where the source is set.
    Or,
    /// Invert where the source is set.
    Xor,
    /// Keep only where the source is set (a clear source bit paints white).
    And,
    /// Paint white where the source is set.
    AndNot,
}

impl RasterOp {
    #[inline(always)]
    pub fn apply(self, dst: u8, src: u8, cover: u8) -> u8 {
        match self {
            RasterOp::Or => dst | (src & cover),
            RasterOp::Xor => dst ^ (src & cover),
            RasterOp::And => dst & (src | !cover),
            RasterOp::AndNot => dst & !(src & cover),
        }
    }
}

/// Left-aligned run of `len` set bits (`len <= 32`) as big-endian bytes.
#[inline]
pub fn run_bits(len: u32) -> [u8; 4] {
    match len {
        0 => [0; 4],
        1..=31 => (u32::MAX << (32 - len)).to_be_bytes(),
        _ => u32::MAX.to_be_bytes(),
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ops_respect_cover() {
        // only the high nibble takes part
        let cover = 0xF0;
        assert_eq!(RasterOp::Or.apply(0x00, 0xFF, cover), 0xF0);
        assert_eq!(RasterOp::Xor.apply(0xFF, 0xFF, cover), 0x0F);
        assert_eq!(RasterOp::And.apply(0xFF, 0x00, cover), 0x0F);
        assert_eq!(RasterOp::AndNot.apply(0xFF, 0xFF, cover), 0x0F);
    }

    #[test]
    fn run_bits_edges() {
        assert_eq!(run_bits(0), [0, 0, 0, 0]);
        assert_eq!(run_bits(1), [0x80, 0, 0, 0]);
        assert_eq!(run_bits(10), [0xFF, 0xC0, 0, 0]);
        assert_eq!(run_bits(32), [0xFF; 4]);
    }
}
