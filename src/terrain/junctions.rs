//! Places where wall ends meet.
//!
//! * [`cluster_endpoints`] groups every wall end with the ends near it.
//!   Clusters shared by two or more walls are [`Junction`]s; every cluster
//!   is also a hash site that gets a crosshatch.
//! * [`close_whites`] shortens underside bands where two ends almost touch
//!   and adds the patches that take over from them.
//! * [`merge_junction_patches`] folds the endpoint pieces of each junction
//!   into one patch.
//! * [`hash_merge`] bakes the crosshatch into isolated pieces so it can be
//!   drawn in one XOR.

use glam::IVec2;
use smallvec::SmallVec;
use tracing::trace;

use super::walls::BandSpan;
use super::whites::{
    N_PATCH, PieceFlags, PieceRows, WhitePiece, close_patch, lead_bits, ne_patch, replace_white,
};
use crate::world::{Wall, WallId};

/// Two ends this close (in both axes) share a cluster.
pub const JUNCTION_RADIUS: i32 = 3;
/// Two ends strictly closer than this (in both axes) are a close pair.
pub const CLOSE_RADIUS: i32 = 3;
/// Pieces this near the world's left or right edge never get hashed.
pub const HASH_MARGIN: i32 = 8;

/// 6-row crosshatch drawn at junctions, 16-bit rows.
pub const HASH_FIGURE: [u16; 6] = [0x8000, 0x6000, 0x1800, 0x0600, 0x0180, 0x0040];
/// Columns the crosshatch spans.
pub const HASH_WIDTH: i32 = 10;
pub const HASH_HEIGHT: i32 = HASH_FIGURE.len() as i32;

pub type Members = SmallVec<[(WallId, u8); 4]>;

/// A cluster of wall ends shared by at least two walls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Junction {
    /// First wall end that founded the cluster.
    pub pos: IVec2,
    /// Every wall end in the cluster, in discovery order.
    pub members: Members,
}

impl Junction {
    pub fn walls(&self) -> impl Iterator<Item = WallId> + '_ {
        self.members.iter().map(|&(w, _)| w)
    }
}

/// Clustering result: junctions and hash sites, both sorted by x.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Clusters {
    pub junctions: Vec<Junction>,
    pub sites: Vec<IVec2>,
}

/// Group wall ends in wall-index order (start before end).  An end joins
/// the first earlier cluster whose founding point is within
/// [`JUNCTION_RADIUS`]; otherwise it founds a new one.
pub fn cluster_endpoints<'a>(walls: impl IntoIterator<Item = &'a Wall>) -> Clusters {
    let mut found: Vec<(IVec2, Members)> = Vec::new();
    for w in walls {
        for end in 0..2u8 {
            let p = w.endpoint(end as usize);
            let hit = found.iter_mut().find(|(c, _)| {
                (c.x - p.x).abs() <= JUNCTION_RADIUS && (c.y - p.y).abs() <= JUNCTION_RADIUS
            });
            match hit {
                Some((_, members)) => members.push((w.id, end)),
                None => {
                    let mut members = Members::new();
                    members.push((w.id, end));
                    found.push((p, members));
                }
            }
        }
    }
    // stable: equal x keeps discovery order
    found.sort_by_key(|(p, _)| p.x);

    let mut out = Clusters::default();
    for (pos, members) in found {
        out.sites.push(pos);
        let first = members[0].0;
        if members.iter().any(|&(w, _)| w != first) {
            out.junctions.push(Junction { pos, members });
        }
    }
    out
}

/// Junction list only.
pub fn detect_junctions<'a>(walls: impl IntoIterator<Item = &'a Wall>) -> Vec<Junction> {
    cluster_endpoints(walls).junctions
}

/*--------------------------- close pairs -----------------------------*/

#[inline]
fn is_close(a: IVec2, b: IVec2) -> bool {
    (a.x - b.x).abs() < CLOSE_RADIUS && (a.y - b.y).abs() < CLOSE_RADIUS
}

/// Visit every close pair of wall ends and let [`one_close`] adjust the
/// first wall's band and patches.  `spans` is indexed by wall id.
pub fn close_whites(walls: &[&Wall], spans: &mut [BandSpan], pieces: &mut Vec<WhitePiece>) {
    for w1 in walls {
        for n in 0..2 {
            let p1 = w1.endpoint(n);
            for w2 in walls {
                for m in 0..2 {
                    if is_close(p1, w2.endpoint(m)) {
                        let span = &mut spans[w1.id as usize];
                        one_close(w1, w2, n, m, span, pieces);
                    }
                }
            }
        }
    }
}

/// Patch for wall end `n` of `w1` meeting end `m` of `w2`.
///
/// Headings are 16-point compass directions pointing away from the shared
/// point along each wall.  Only a wall leaving due north (the end of a
/// vertical wall) and a wall leaving north-east (the start of an NE wall)
/// need work; every other combination renders cleanly as is.
pub fn one_close(
    w1: &Wall,
    w2: &Wall,
    n: usize,
    m: usize,
    span: &mut BandSpan,
    pieces: &mut Vec<WhitePiece>,
) {
    let dir1 = w1.new_type.compass(n);
    let dir2 = w2.new_type.compass(m);
    if dir1 == dir2 {
        return;
    }
    match dir1 {
        0 => {
            let i = match dir2 {
                15 | 1 => 21,
                2 => 10,
                3 | 14 => 6,
                _ => return,
            };
            let h2 = span.h2;
            if w1.length - i > h2 {
                return;
            }
            let anchor = (w1.id, 1);
            let at = w1.end - IVec2::new(0, i);
            let rows = &N_PATCH[..i as usize];
            if h2 < w1.length {
                replace_white(pieces, anchor, at, rows);
            } else {
                pieces.push(close_patch(at, rows, anchor));
            }
            span.h2 = w1.length - i;
            trace!(wall = w1.id, h2 = span.h2, "band shortened at close pair");
        }
        2 => {
            let i = match dir2 {
                0 => 3,
                1 => 6,
                3 => 4,
                14 => 1,
                15 => 2,
                _ => return,
            };
            for j in (0..4 * i).step_by(4) {
                if span.h1 < 5 + j {
                    let at = w1.start + IVec2::new(3 + j, -4 - j);
                    pieces.push(ne_patch(at, (w1.id, 0)));
                }
            }
            span.h1 = span.h1.max(5 + 4 * (i - 1));
            trace!(wall = w1.id, h1 = span.h1, "band start moved at close pair");
        }
        _ => {}
    }
}

/*--------------------------- junction patches ------------------------*/

/// Replace the endpoint pieces of every junction by one merged patch.
///
/// A merged row is the AND of the member rows, each shifted to its own
/// position, so it paints white exactly where some member did.
pub fn merge_junction_patches(pieces: &mut Vec<WhitePiece>, junctions: &[Junction]) {
    for j in junctions {
        let (taken, rest): (Vec<WhitePiece>, Vec<WhitePiece>) =
            std::mem::take(pieces).into_iter().partition(|p| {
                p.flags.contains(PieceFlags::ENDPOINT)
                    && p.anchor.is_some_and(|a| j.members.contains(&a))
            });
        *pieces = rest;
        match taken.len() {
            0 => {}
            1 => pieces.extend(taken),
            _ => pieces.push(merge_rows(&taken)),
        }
    }
}

fn merge_rows(members: &[WhitePiece]) -> WhitePiece {
    let x0 = members.iter().map(|p| p.x).min().unwrap_or(0);
    let y0 = members.iter().map(|p| p.y).min().unwrap_or(0);
    let x1 = members.iter().map(|p| p.x + p.width as i32).max().unwrap_or(x0);
    let y1 = members.iter().map(|p| p.y + p.height()).max().unwrap_or(y0);
    let width = (x1 - x0).min(32) as u32;

    let mut rows = PieceRows::new();
    for y in y0..y1 {
        let mut acc = u32::MAX;
        for p in members {
            let r = y - p.y;
            if r < 0 || r >= p.height() {
                continue;
            }
            let dx = (p.x - x0) as u32;
            let shifted = (p.rows[r as usize] | !lead_bits(p.width)) >> dx;
            acc &= shifted | !(u32::MAX >> dx);
        }
        rows.push(acc | !lead_bits(width));
    }
    WhitePiece {
        x: x0,
        y: y0,
        width,
        rows,
        flags: PieceFlags::JUNCTION,
        anchor: None,
    }
}

/*------------------------------ hashing ------------------------------*/

/// No other piece starts within 3 pixels of `pieces[idx]`.
pub fn no_close_piece(pieces: &[WhitePiece], idx: usize) -> bool {
    let p = &pieces[idx];
    !pieces.iter().enumerate().any(|(k, q)| {
        k != idx && (q.x - p.x).abs() < CLOSE_RADIUS && (q.y - p.y).abs() < CLOSE_RADIUS
    })
}

/// Checkerboard row for a piece row whose first pixel has parity `align`.
#[inline]
fn back_row(align: i32) -> u32 {
    if align & 1 == 0 { 0xAAAA_AAAA } else { 0x5555_5555 }
}

/// Turn isolated endpoint pieces and junction patches that sit on a hash
/// site into XOR pieces with the crosshatch baked in.  Consumed sites are
/// removed from `sites`.
///
/// An endpoint piece must start exactly on its site; a junction patch may
/// hold the site anywhere the whole crosshatch fits.
pub fn hash_merge(pieces: &mut [WhitePiece], sites: &mut Vec<IVec2>, world_width: i32) {
    for idx in 0..pieces.len() {
        let p = &pieces[idx];
        let eligible = p.flags.intersects(PieceFlags::ENDPOINT | PieceFlags::JUNCTION)
            && !p.is_xor()
            && p.x > HASH_MARGIN
            && p.x < world_width - HASH_MARGIN;
        if !eligible || !no_close_piece(pieces, idx) {
            continue;
        }
        let junction = p.flags.contains(PieceFlags::JUNCTION);
        let fits = |s: &IVec2| {
            let (ox, oy) = (s.x - p.x, s.y - p.y);
            if junction {
                ox >= 0
                    && oy >= 0
                    && ox + HASH_WIDTH <= p.width as i32
                    && oy + HASH_HEIGHT <= p.height()
            } else {
                ox == 0 && oy == 0
            }
        };
        let Some(k) = sites.iter().position(fits) else {
            continue;
        };
        let site = sites.remove(k);
        let offset = site - p.pos();
        let hashed = hashed_rows(p, offset);

        let p = &mut pieces[idx];
        p.rows = hashed;
        p.flags |= PieceFlags::HASHED;
    }
}

fn hashed_rows(p: &WhitePiece, offset: IVec2) -> PieceRows {
    let keep = lead_bits(p.width);
    p.rows
        .iter()
        .enumerate()
        .map(|(r, &data)| {
            let hr = r as i32 - offset.y;
            let hash = if (0..HASH_HEIGHT).contains(&hr) {
                (u32::from(HASH_FIGURE[hr as usize]) << 16) >> offset.x
            } else {
                0
            };
            let back = back_row(p.x + p.y + r as i32);
            ((back & (!data | hash)) ^ hash) & keep
        })
        .collect()
}

/*──────────────────────────────── Tests ───────────────────────────────*/
