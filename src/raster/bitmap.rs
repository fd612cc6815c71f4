//! ---------------------------------------------------------------------------
//! Packed 1-bit frame-buffer
//!
//! * Row-major, `stride = ceil(width / 8)` bytes per row.
//! * Padding bits past `width` in the last byte of a row are kept clear.
//! * Never resized during a frame; `clone()` gives a scratch copy.
//! ---------------------------------------------------------------------------

use std::ops::Range;

use super::RasterOp;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    stride: usize,
    bytes: Vec<u8>,
}

impl Bitmap {
    /// All-white raster of `width × height` pixels.
    pub fn new(width: usize, height: usize) -> Self {
        let stride = width.div_ceil(8);
        Self {
            width,
            height,
            stride,
            bytes: vec![0; stride * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The whole raster, row-major, for presentation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of black pixels.
    pub fn count_ones(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Set every byte to `value` (padding bits stay clear).
    pub fn fill(&mut self, value: u8) {
        for y in 0..self.height {
            let row = y * self.stride;
            for b in 0..self.stride {
                self.bytes[row + b] = value & self.byte_cover(b);
            }
        }
    }

    /*──────────────────────── single pixels ─────────────────────────*/

    pub fn get_pixel(&self, x: i32, y: i32) -> bool {
        match self.locate(x, y) {
            Some((idx, bit)) => self.bytes[idx] & bit != 0,
            None => false,
        }
    }

    pub fn set_pixel(&mut self, x: i32, y: i32) {
        if let Some((idx, bit)) = self.locate(x, y) {
            self.bytes[idx] |= bit;
        }
    }

    pub fn clear_pixel(&mut self, x: i32, y: i32) {
        if let Some((idx, bit)) = self.locate(x, y) {
            self.bytes[idx] &= !bit;
        }
    }

    /*──────────────────────── byte-aligned spans ────────────────────*/

    /// XOR `value` into bytes `bytes` of row `y`.
    pub fn xor_span(&mut self, y: i32, bytes: Range<usize>, value: u8) {
        self.span(y, bytes, value, RasterOp::Xor);
    }

    /// AND `value` into bytes `bytes` of row `y`.
    pub fn and_span(&mut self, y: i32, bytes: Range<usize>, value: u8) {
        self.span(y, bytes, value, RasterOp::And);
    }

    /// OR `value` into bytes `bytes` of row `y`.
    pub fn or_span(&mut self, y: i32, bytes: Range<usize>, value: u8) {
        self.span(y, bytes, value, RasterOp::Or);
    }

    fn span(&mut self, y: i32, bytes: Range<usize>, value: u8, op: RasterOp) {
        let Some(row) = self.row_offset(y) else {
            return;
        };
        for b in bytes.start..bytes.end.min(self.stride) {
            let cover = self.byte_cover(b);
            let cell = &mut self.bytes[row + b];
            *cell = op.apply(*cell, value, cover);
        }
    }

    /*──────────────────────── unaligned rows ────────────────────────*/

    /// Combine the first `width` bits of `bits` (bit 7 of `bits[0]` first)
    /// into row `y`, starting at pixel column `x`.
    ///
    /// This is the word-oriented blit every figure, white piece and wall run
    /// goes through: each source byte is split across the two destination
    /// bytes it straddles.
    pub fn blit_row(&mut self, x: i32, y: i32, bits: &[u8], width: usize, op: RasterOp) {
        let Some(row) = self.row_offset(y) else {
            return;
        };
        let width = width.min(bits.len() * 8);
        for (i, &src) in bits.iter().enumerate().take(width.div_ceil(8)) {
            let valid = valid_bits(width - i * 8);
            let px = x + (i as i32) * 8;
            let shift = px.rem_euclid(8) as u32;
            let b0 = px.div_euclid(8);

            self.combine(row, b0, src >> shift, valid >> shift, op);
            if shift != 0 {
                self.combine(row, b0 + 1, src << (8 - shift), valid << (8 - shift), op);
            }
        }
    }

    /// Copy `width` pixels of row `y` starting at column `x` into `out`
    /// (left-aligned, same bit order as [`blit_row`](Self::blit_row)).
    /// Pixels outside the raster read as white.
    pub fn read_row(&self, x: i32, y: i32, width: usize, out: &mut [u8]) {
        out.fill(0);
        let Some(row) = self.row_offset(y) else {
            return;
        };
        let width = width.min(out.len() * 8);
        for (i, dst) in out.iter_mut().enumerate().take(width.div_ceil(8)) {
            let px = x + (i as i32) * 8;
            let shift = px.rem_euclid(8) as u32;
            let b0 = px.div_euclid(8);
            let pair = (u16::from(self.byte_at(row, b0)) << 8) | u16::from(self.byte_at(row, b0 + 1));
            *dst = ((pair << shift) >> 8) as u8 & valid_bits(width - i * 8);
        }
    }

    /*──────────────────────── internals ─────────────────────────────*/

    #[inline]
    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        Some((y * self.stride + x / 8, 0x80 >> (x % 8)))
    }

    #[inline]
    fn row_offset(&self, y: i32) -> Option<usize> {
        (y >= 0 && (y as usize) < self.height).then(|| y as usize * self.stride)
    }

    /// Bits of byte `b` that lie inside the raster.
    #[inline]
    fn byte_cover(&self, b: usize) -> u8 {
        let tail = self.width % 8;
        if b + 1 == self.stride && tail != 0 {
            valid_bits(tail)
        } else {
            0xFF
        }
    }

    #[inline]
    fn byte_at(&self, row: usize, b: i32) -> u8 {
        if b < 0 || b as usize >= self.stride {
            0
        } else {
            self.bytes[row + b as usize]
        }
    }

    #[inline]
    fn combine(&mut self, row: usize, b: i32, value: u8, cover: u8, op: RasterOp) {
        if b < 0 || b as usize >= self.stride || cover == 0 {
            return;
        }
        let cover = cover & self.byte_cover(b as usize);
        let cell = &mut self.bytes[row + b as usize];
        *cell = op.apply(*cell, value, cover);
    }
}

/// Mask of the leading `n` bits of a byte (`n >= 8` gives `0xFF`).
#[inline(always)]
fn valid_bits(n: usize) -> u8 {
    if n >= 8 { 0xFF } else { !(0xFFu8 >> n) }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_rounds_up() {
        let bmp = Bitmap::new(13, 2);
        assert_eq!(bmp.stride(), 2);
        assert_eq!(bmp.as_bytes().len(), 4);
    }

    #[test]
    fn pixels_outside_are_ignored() {
        let mut bmp = Bitmap::new(16, 4);
        bmp.set_pixel(-1, 0);
        bmp.set_pixel(16, 0);
        bmp.set_pixel(0, 4);
        assert_eq!(bmp.count_ones(), 0);
        assert!(!bmp.get_pixel(-3, -3));
    }

    #[test]
    fn leftmost_pixel_is_bit_seven() {
        let mut bmp = Bitmap::new(16, 1);
        bmp.set_pixel(0, 0);
        bmp.set_pixel(9, 0);
        assert_eq!(bmp.as_bytes(), &[0x80, 0x40]);
        bmp.clear_pixel(0, 0);
        assert_eq!(bmp.as_bytes(), &[0x00, 0x40]);
    }

    #[test]
    fn fill_keeps_padding_clear() {
        let mut bmp = Bitmap::new(12, 2);
        bmp.fill(0xFF);
        assert_eq!(bmp.as_bytes(), &[0xFF, 0xF0, 0xFF, 0xF0]);
        assert_eq!(bmp.count_ones(), 24);
    }

    #[test]
    fn spans_clip_to_stride() {
        let mut bmp = Bitmap::new(16, 2);
        bmp.or_span(1, 1..10, 0x0F);
        assert_eq!(bmp.as_bytes(), &[0, 0, 0, 0x0F]);
        bmp.xor_span(1, 0..2, 0xFF);
        assert_eq!(bmp.as_bytes(), &[0, 0, 0xFF, 0xF0]);
        bmp.and_span(1, 0..1, 0x3C);
        assert_eq!(bmp.as_bytes(), &[0, 0, 0x3C, 0xF0]);
        bmp.or_span(7, 0..2, 0xFF);
        assert_eq!(bmp.count_ones(), 8);
    }

    #[test]
    fn unaligned_blit_straddles_bytes() {
        let mut bmp = Bitmap::new(24, 1);
        bmp.blit_row(5, 0, &[0xFF, 0xC0], 10, RasterOp::Or);
        // pixels 5..15
        assert_eq!(bmp.as_bytes(), &[0x07, 0xFE, 0x00]);
    }

    #[test]
    fn blit_clips_left_and_right() {
        let mut bmp = Bitmap::new(12, 1);
        bmp.blit_row(-4, 0, &[0xFF], 8, RasterOp::Or);
        assert_eq!(bmp.as_bytes(), &[0xF0, 0x00]);
        bmp.blit_row(8, 0, &[0xFF], 8, RasterOp::Or);
        assert_eq!(bmp.as_bytes(), &[0xF0, 0xF0]);
        bmp.blit_row(-20, 0, &[0xFF], 8, RasterOp::Xor);
        assert_eq!(bmp.count_ones(), 8);
    }

    #[test]
    fn and_blit_preserves_outside_width() {
        let mut bmp = Bitmap::new(16, 1);
        bmp.fill(0xFF);
        // only 3 bits take part, all clear → three white pixels
        bmp.blit_row(2, 0, &[0x00], 3, RasterOp::And);
        assert_eq!(bmp.as_bytes(), &[0xC7, 0xFF]);
    }

    #[test]
    fn read_row_matches_blit() {
        let mut bmp = Bitmap::new(40, 2);
        bmp.blit_row(11, 1, &[0xA5, 0x3C], 16, RasterOp::Or);
        let mut out = [0u8; 2];
        bmp.read_row(11, 1, 16, &mut out);
        assert_eq!(out, [0xA5, 0x3C]);

        // partially outside: the missing part reads white
        bmp.read_row(-3, 1, 8, &mut out);
        assert_eq!(out, [0, 0]);
        bmp.read_row(30, 1, 16, &mut out);
        assert_eq!(out, [0, 0]);
    }

    #[test]
    fn xor_twice_restores() {
        let mut bmp = Bitmap::new(32, 3);
        bmp.fill(0x5A);
        let before = bmp.clone();
        bmp.blit_row(3, 2, &[0xF0, 0x0F, 0xAA], 21, RasterOp::Xor);
        assert_ne!(bmp, before);
        bmp.blit_row(3, 2, &[0xF0, 0x0F, 0xAA], 21, RasterOp::Xor);
        assert_eq!(bmp, before);
    }
}
