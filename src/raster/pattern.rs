// Fixed-size 1-bit bit patterns: sprite definitions, masks, white pieces.
// Rows are packed like `Bitmap` rows and padding bits are always clear.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    /// Zero width or height.
    #[error("pattern must be at least 1×1, got {width}×{height}")]
    Empty { width: usize, height: usize },

    /// Buffer length does not match `height * ceil(width / 8)`.
    #[error("pattern {width}×{height} needs {expected} bytes, got {got}")]
    Size {
        width: usize,
        height: usize,
        expected: usize,
        got: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    width: usize,
    height: usize,
    stride: usize,
    bits: Vec<u8>,
}

impl Pattern {
    /// Wrap a packed buffer, checking its size.
    pub fn from_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self, PatternError> {
        if width == 0 || height == 0 {
            return Err(PatternError::Empty { width, height });
        }
        let stride = width.div_ceil(8);
        let expected = stride * height;
        if bytes.len() != expected {
            return Err(PatternError::Size {
                width,
                height,
                expected,
                got: bytes.len(),
            });
        }
        let mut pat = Self {
            width,
            height,
            stride,
            bits: bytes.to_vec(),
        };
        pat.clear_padding();
        Ok(pat)
    }

    /// 16-pixel-wide pattern from one word per row.
    pub fn from_words(words: &[u16]) -> Self {
        let mut bits = vec![0u8; words.len() * 2];
        BigEndian::write_u16_into(words, &mut bits);
        Self {
            width: 16,
            height: words.len(),
            stride: 2,
            bits,
        }
    }

    /// Up to 32-pixel-wide pattern from one long word per row.
    pub fn from_longs(width: usize, longs: &[u32]) -> Self {
        let width = width.min(32);
        let stride = width.div_ceil(8);
        let mut bits = Vec::with_capacity(stride * longs.len());
        for &l in longs {
            bits.extend_from_slice(&l.to_be_bytes()[..stride]);
        }
        let mut pat = Self {
            width,
            height: longs.len(),
            stride,
            bits,
        };
        pat.clear_padding();
        pat
    }

    /// Solid `width × height` block.
    pub fn solid(width: usize, height: usize) -> Self {
        let stride = width.div_ceil(8);
        let mut pat = Self {
            width,
            height,
            stride,
            bits: vec![0xFF; stride * height],
        };
        pat.clear_padding();
        pat
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Packed bytes of row `r`.
    #[inline]
    pub fn row(&self, r: usize) -> &[u8] {
        &self.bits[r * self.stride..(r + 1) * self.stride]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Build a pattern of the same size whose bytes are `f(row, byte_index)`.
    pub fn map_bytes(&self, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut bits = Vec::with_capacity(self.bits.len());
        for r in 0..self.height {
            for b in 0..self.stride {
                bits.push(f(r, b));
            }
        }
        let mut pat = Self {
            width: self.width,
            height: self.height,
            stride: self.stride,
            bits,
        };
        pat.clear_padding();
        pat
    }

    /// Pixel test, `false` outside the pattern.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.stride + x / 8] & (0x80 >> (x % 8)) != 0
    }

    fn clear_padding(&mut self) {
        let tail = self.width % 8;
        if tail == 0 {
            return;
        }
        let keep = !(0xFFu8 >> tail);
        for r in 0..self.height {
            self.bits[r * self.stride + self.stride - 1] &= keep;
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_checked() {
        let err = Pattern::from_bytes(12, 3, &[0; 5]).unwrap_err();
        assert_eq!(
            err,
            PatternError::Size {
                width: 12,
                height: 3,
                expected: 6,
                got: 5
            }
        );
        assert!(matches!(
            Pattern::from_bytes(0, 3, &[]),
            Err(PatternError::Empty { .. })
        ));
    }

    #[test]
    fn padding_is_cleared() {
        let pat = Pattern::from_bytes(4, 2, &[0xFF, 0xFF]).unwrap();
        assert_eq!(pat.as_bytes(), &[0xF0, 0xF0]);
    }

    #[test]
    fn words_are_big_endian() {
        let pat = Pattern::from_words(&[0x8001, 0x00FF]);
        assert_eq!(pat.row(0), &[0x80, 0x01]);
        assert_eq!(pat.row(1), &[0x00, 0xFF]);
        assert!(pat.get(0, 0));
        assert!(pat.get(15, 0));
        assert!(!pat.get(1, 0));
    }

    #[test]
    fn longs_truncate_to_width() {
        let pat = Pattern::from_longs(20, &[0xFFFF_FFFF]);
        assert_eq!(pat.stride(), 3);
        assert_eq!(pat.row(0), &[0xFF, 0xFF, 0xF0]);
    }
}
