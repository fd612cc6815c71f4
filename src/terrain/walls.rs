//! Per-wall derived state: kind buckets, face geometry and underside spans.

use glam::IVec2;
use tracing::warn;

use crate::world::{NewType, Wall, WallId, WallKind};

/// Black-pass buckets plus the NNE list that gets the first-white lip.
///
/// Within a bucket walls keep wall-index order; later walls overdraw
/// earlier ones where they share pixels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KindLists {
    lists: [Vec<WallId>; 4],
    unknown: Vec<WallId>,
    first_white: Vec<WallId>,
}

impl KindLists {
    /// Walls of `kind`, in drawing order.  Empty for an unknown kind.
    pub fn of(&self, kind: WallKind) -> &[WallId] {
        match kind.bucket() {
            Some(b) => &self.lists[b],
            None => &[],
        }
    }

    /// Walls whose kind code the game does not know.
    pub fn unknown(&self) -> &[WallId] {
        &self.unknown
    }

    pub fn first_white(&self) -> &[WallId] {
        &self.first_white
    }

    /// Every drawable wall, bucket by bucket.
    pub fn known(&self) -> impl Iterator<Item = WallId> + '_ {
        self.lists.iter().flatten().copied()
    }

    /// Every drawable wall in wall-index order.
    pub fn drawable(&self) -> Vec<WallId> {
        let mut ids: Vec<WallId> = self.known().collect();
        ids.sort_unstable();
        ids
    }
}

/// Sort walls into the four kind buckets.
///
/// Unknown kinds are collected separately and reported; they are never
/// drawn, but never silently lost either.
pub fn classify(walls: &[Wall]) -> KindLists {
    let mut out = KindLists::default();
    for w in walls {
        match w.kind.bucket() {
            Some(b) => {
                out.lists[b].push(w.id);
                if w.new_type == NewType::Nne {
                    out.first_white.push(w.id);
                }
            }
            None => {
                warn!(wall = w.id, kind = ?w.kind, "unknown wall kind, wall will not be drawn");
                out.unknown.push(w.id);
            }
        }
    }
    out
}

/*--------------------------- face geometry ---------------------------*/

/// Which way the per-step runs go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Run {
    /// To the right of the line pixel.
    Horizontal,
    /// Below the line pixel.
    Vertical,
}

/// Shape of a wall's black top and white underside, per step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
    pub run: Run,
    /// Black pixels per step.
    pub footprint: i32,
    /// Pixels cleared per underside step, footprint included.
    pub band: i32,
}

impl Face {
    pub fn of(nt: NewType) -> Self {
        use NewType::*;
        let run = match nt {
            S | Sse | Nne => Run::Horizontal,
            Se | Ne | Ese | E | Ene => Run::Vertical,
        };
        let footprint = match nt {
            Ese | E | Ene => 2,
            _ => 1,
        };
        let band = match nt {
            S => 10,
            Sse | Nne => 9,
            _ => 6,
        };
        Self {
            run,
            footprint,
            band,
        }
    }

    /// Run of `len` pixels starting at `p`, as (origin, width, height).
    #[inline]
    pub fn rect(&self, p: IVec2, len: i32) -> (IVec2, i32, i32) {
        match self.run {
            Run::Horizontal => (p, len, 1),
            Run::Vertical => (p, 1, len),
        }
    }
}

/// Inclusive world box of everything a wall can touch in either pass.
pub fn extent(w: &Wall) -> (IVec2, IVec2) {
    let face = Face::of(w.new_type);
    let (min, max) = w.bounds();
    let (lo, hi) = (min - IVec2::new(1, 0), max);
    match face.run {
        Run::Horizontal => (lo, hi + IVec2::new(face.band, 0)),
        Run::Vertical => (lo, hi + IVec2::new(0, face.band)),
    }
}

/*--------------------------- underside span --------------------------*/

const SIMPLE_H1: [i32; 9] = [0, 6, 6, 6, 12, 16, 0, 1, 0];
const SIMPLE_H2: [i32; 9] = [0, 0, 0, 0, -1, 0, -11, -5, -5];

/// Steps `h1..h2` of a wall get the plain underside band; the rest is
/// covered by white pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandSpan {
    pub h1: i32,
    pub h2: i32,
}

impl BandSpan {
    pub fn simple(w: &Wall) -> Self {
        let i = w.new_type.index();
        let h1 = SIMPLE_H1[i].clamp(0, w.length);
        let h2 = (w.length + SIMPLE_H2[i]).clamp(0, w.length);
        Self { h1, h2 }
    }

    #[inline]
    pub fn steps(&self) -> std::ops::Range<i32> {
        self.h1..self.h2.max(self.h1)
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
