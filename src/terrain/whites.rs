//! White underside pieces.
//!
//! A piece is a small bit pattern stamped during the white pass.  Plain
//! pieces are ANDed in (a clear bit paints white); hashed pieces are XORed
//! in and carry their own checkerboard.  Rows are `u32`, left-aligned, so
//! merged junction patches can grow past 16 pixels.

use std::cmp::Ordering;

use bitflags::bitflags;
use glam::IVec2;
use once_cell::sync::Lazy;
use smallvec::SmallVec;

use crate::world::{NewType, Wall, WallId};

bitflags! {
    /// Where a piece came from and how it is drawn.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PieceFlags: u8 {
        /// Start/end piece from the per-direction table.
        const ENDPOINT    = 1 << 0;
        /// Fix-up piece for NE, ENE and ESE walls.
        const GLITCH      = 1 << 1;
        /// Added while shortening a band at a close pair.
        const CLOSE_PATCH = 1 << 2;
        /// Merged patch standing in for the endpoint pieces of a junction.
        const JUNCTION    = 1 << 3;
        /// Carries a crosshatch; drawn with XOR.
        const HASHED      = 1 << 4;
    }
}

pub type PieceRows = SmallVec<[u32; 6]>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhitePiece {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub rows: PieceRows,
    pub flags: PieceFlags,
    /// Wall end (0 start, 1 end) the piece belongs to, if any.
    pub anchor: Option<(WallId, u8)>,
}

impl WhitePiece {
    fn from_words(x: i32, y: i32, words: &[u16], flags: PieceFlags) -> Self {
        Self {
            x,
            y,
            width: 16,
            rows: words.iter().map(|&w| widen(w)).collect(),
            flags,
            anchor: None,
        }
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.rows.len() as i32
    }

    #[inline]
    pub fn is_xor(&self) -> bool {
        self.flags.contains(PieceFlags::HASHED)
    }

    #[inline]
    pub fn pos(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    /// Inclusive world box.
    pub fn bounds(&self) -> (IVec2, IVec2) {
        (
            self.pos(),
            IVec2::new(self.x + self.width as i32 - 1, self.y + self.height() - 1),
        )
    }

    /// Does this piece paint `(x, y)` white?
    pub fn whitens(&self, x: i32, y: i32) -> bool {
        let (dx, dy) = (x - self.x, y - self.y);
        if dx < 0 || dy < 0 || dx >= self.width as i32 || dy >= self.height() || self.is_xor() {
            return false;
        }
        self.rows[dy as usize] & (0x8000_0000 >> dx) == 0
    }

    /// Row `r` as big-endian bytes for the blitter.
    #[inline]
    pub fn row_bytes(&self, r: usize) -> [u8; 4] {
        self.rows[r].to_be_bytes()
    }
}

/// 16-bit table row → `u32` row, unused low bits kept black.
#[inline]
pub(crate) fn widen(w: u16) -> u32 {
    (u32::from(w) << 16) | 0xFFFF
}

/// Mask of the first `width` bits of a row.
#[inline]
pub(crate) fn lead_bits(width: u32) -> u32 {
    match width {
        0 => 0,
        1..=31 => u32::MAX << (32 - width),
        _ => u32::MAX,
    }
}

/*------------------------------ tables -------------------------------*/

const GENERIC_TOP: [u16; 6] = [0xFFFF, 0x3FFF, 0x0FFF, 0x03FF, 0x00FF, 0x007F];
const NNE_BOT: [u16; 6] = [0x800F, 0xC01F, 0xF01F, 0xFC3F, 0xFF3F, 0xFFFF];
const NE_BOT: [u16; 6] = [0x8001, 0xC003, 0xF007, 0xFC0F, 0xFF1F, 0xFFFF];
const ENE_LEFT: [u16; 6] = [0x8000, 0xC000, 0xF000, 0xFC01, 0xFF07, 0xFFDF];
const E_LEFT: [u16; 6] = [0xFFFF, 0xFFFF, 0xF000, 0xFC00, 0xFF00, 0xFF80];
const ESE_RIGHT: [u16; 6] = [0xFFFF, 0x3FFF, 0x8FFF, 0xE3FF, 0xF8FF, 0xFE7F];
const SE_TOP: [u16; 6] = [0xFFFF, 0xFFFF, 0xEFFF, 0xF3FF, 0xF8FF, 0xFC3F];
const SE_BOT: [u16; 6] = [0x87FF, 0xC3FF, 0xF1FF, 0xFCFF, 0xFF7F, 0xFFFF];
const SSE_TOP: [u16; 6] = [0xFFFF, 0xBFFF, 0xCFFF, 0xC3FF, 0xE0FF, 0xE03F];
const SSE_BOT: [u16; 6] = [0x80FF, 0xC07F, 0xF07F, 0xFC3F, 0xFF3F, 0xFFFF];
const S_BOT: [u16; 6] = [0x803F, 0xC03F, 0xF03F, 0xFC3F, 0xFF3F, 0xFFFF];

const NE_GLITCH: [u16; 4] = [0xEFFF, 0xCFFF, 0x8FFF, 0x0FFF];
const ENE_GLITCH1: [u16; 3] = [0x07FF, 0x1FFF, 0x7FFF];
const ENE_GLITCH2: [u16; 5] = [0xFF3F, 0xFC3F, 0xF03F, 0xC03F, 0x003F];
const ESE_GLITCH: [u16; 4] = [0x3FFF, 0xCFFF, 0xF3FF, 0xFDFF];

/// Stair step used when an NE wall starts at a close pair.
pub(crate) const NE_PATCH: [u16; 4] = [0xE000, 0xC001, 0x8003, 0x0007];

/// Longest band cut-back at a close pair.
pub(crate) const N_PATCH_MAX: usize = 22;

/// `[start, end]` endpoint patterns indexed by `NewType`.
static ENDPOINT_PICTS: [[Option<&[u16; 6]>; 2]; 9] = [
    [None, None],
    [Some(&GENERIC_TOP), Some(&S_BOT)],
    [Some(&SSE_TOP), Some(&SSE_BOT)],
    [Some(&SE_TOP), Some(&SE_BOT)],
    [None, Some(&ESE_RIGHT)],
    [Some(&E_LEFT), Some(&GENERIC_TOP)],
    [Some(&ENE_LEFT), Some(&GENERIC_TOP)],
    [Some(&NE_BOT), Some(&GENERIC_TOP)],
    [Some(&NNE_BOT), Some(&GENERIC_TOP)],
];

/// `npatch` rows: 10 white pixels then black, as wide rows.
pub(crate) static N_PATCH: Lazy<[u32; N_PATCH_MAX]> = Lazy::new(|| [widen(0x003F); N_PATCH_MAX]);

/// One glitch piece: offset from the wall start (`false`) or end (`true`).
struct Glitch {
    from_end: bool,
    dx: i32,
    dy: i32,
    rows: &'static [u16],
}

static GLITCHES: Lazy<[Vec<Glitch>; 9]> = Lazy::new(|| {
    let mut t: [Vec<Glitch>; 9] = Default::default();
    t[NewType::Ne.index()].push(Glitch {
        from_end: true,
        dx: -4,
        dy: 2,
        rows: &NE_GLITCH,
    });
    t[NewType::Ene.index()].push(Glitch {
        from_end: false,
        dx: 16,
        dy: 0,
        rows: &ENE_GLITCH1,
    });
    t[NewType::Ene.index()].push(Glitch {
        from_end: true,
        dx: -10,
        dy: 1,
        rows: &ENE_GLITCH2,
    });
    t[NewType::Ese.index()].push(Glitch {
        from_end: true,
        dx: -7,
        dy: -2,
        rows: &ESE_GLITCH,
    });
    t
});

/*------------------------------ builders -----------------------------*/

/// Endpoint and glitch pieces for every wall, in wall order.
///
/// Glitch pieces are part of the expected picture and stay exactly where
/// they are, odd as they look.
pub fn build_white_pieces<'a>(walls: impl IntoIterator<Item = &'a Wall>) -> Vec<WhitePiece> {
    let mut out = Vec::new();
    for w in walls {
        let nt = w.new_type.index();
        for (end, pict) in ENDPOINT_PICTS[nt].iter().enumerate() {
            if let Some(words) = pict {
                let p = w.endpoint(end);
                let mut piece = WhitePiece::from_words(p.x, p.y, &words[..], PieceFlags::ENDPOINT);
                piece.anchor = Some((w.id, end as u8));
                out.push(piece);
            }
        }
        for g in &GLITCHES[nt] {
            let base = w.endpoint(g.from_end as usize);
            let mut piece =
                WhitePiece::from_words(base.x + g.dx, base.y + g.dy, g.rows, PieceFlags::GLITCH);
            piece.anchor = Some((w.id, g.from_end as u8));
            out.push(piece);
        }
    }
    out
}

/// Swap the close patch anchored at `anchor` for a taller one.
///
/// Returns `false` (and changes nothing) when there is no such patch or
/// the existing one is already at least `rows.len()` high.
pub fn replace_white(
    pieces: &mut [WhitePiece],
    anchor: (WallId, u8),
    at: IVec2,
    rows: &[u32],
) -> bool {
    let found = pieces.iter_mut().find(|p| {
        p.flags.contains(PieceFlags::CLOSE_PATCH)
            && p.anchor == Some(anchor)
            && p.height() < rows.len() as i32
    });
    match found {
        Some(p) => {
            p.x = at.x;
            p.y = at.y;
            p.rows = rows.iter().copied().collect();
            true
        }
        None => false,
    }
}

pub(crate) fn close_patch(at: IVec2, rows: &[u32], anchor: (WallId, u8)) -> WhitePiece {
    WhitePiece {
        x: at.x,
        y: at.y,
        width: 16,
        rows: rows.iter().copied().collect(),
        flags: PieceFlags::CLOSE_PATCH,
        anchor: Some(anchor),
    }
}

pub(crate) fn ne_patch(at: IVec2, anchor: (WallId, u8)) -> WhitePiece {
    let mut p = WhitePiece::from_words(at.x, at.y, &NE_PATCH, PieceFlags::CLOSE_PATCH);
    p.anchor = Some(anchor);
    p
}

/// Stable sort by x, then y.
pub fn sort_pieces(pieces: &mut [WhitePiece]) {
    pieces.sort_by(|a, b| match a.x.cmp(&b.x) {
        Ordering::Equal => a.y.cmp(&b.y),
        o => o,
    });
}

/// Widest piece the organizer ever produces.
pub const MAX_PIECE_WIDTH: i32 = 32;

/// First piece that can reach column `left`, pieces sorted by x.
pub fn first_visible(pieces: &[WhitePiece], left: i32) -> usize {
    pieces.partition_point(|p| p.x + MAX_PIECE_WIDTH <= left)
}

/*──────────────────────────────── Tests ───────────────────────────────*/
