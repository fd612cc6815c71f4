//! The two terrain passes.
//!
//! Every function draws one viewport pass; callers loop over
//! [`Viewport::passes`] so geometry across the seam lands on both edges.
//! Screen position is always `world - viewport origin`.

use glam::IVec2;
use tracing::warn;

use super::Terrain;
use super::junctions::{HASH_FIGURE, HASH_HEIGHT, HASH_WIDTH};
use super::walls::Face;
use super::whites::first_visible;
use crate::raster::{BACK_EVEN, BACK_ODD, Bitmap, RasterOp, run_bits};
use crate::world::{Viewport, Wall, WallId, WallKind};

/// Fill the whole bitmap with the world-anchored checkerboard for `vp`.
pub fn fill_background(bmp: &mut Bitmap, vp: &Viewport) {
    let stride = bmp.stride();
    for y in 0..bmp.height() as i32 {
        let byte = if (vp.x + vp.y + y) & 1 == 0 {
            BACK_EVEN
        } else {
            BACK_ODD
        };
        bmp.and_span(y, 0..stride, 0);
        bmp.or_span(y, 0..stride, byte);
    }
}

/// White pass: pieces, first-white lips, undersides, then the crosshatch
/// at every junction no piece took care of.
pub fn white_terrain(bmp: &mut Bitmap, terrain: &Terrain, vp: &Viewport) {
    let pieces = terrain.pieces();
    for p in &pieces[first_visible(pieces, vp.x)..] {
        if p.x >= vp.right {
            break;
        }
        let (min, max) = p.bounds();
        if !vp.overlaps(min, max) {
            continue;
        }
        let op = if p.is_xor() {
            RasterOp::Xor
        } else {
            RasterOp::And
        };
        let s = vp.to_screen(p.pos());
        for r in 0..p.rows.len() {
            bmp.blit_row(s.x, s.y + r as i32, &p.row_bytes(r), p.width as usize, op);
        }
    }

    for &id in terrain.lists().first_white() {
        if !visible(terrain, id, vp) {
            continue;
        }
        let w = terrain.wall(id);
        for t in (1..w.length).step_by(2) {
            let s = vp.to_screen(w.step(t));
            bmp.clear_pixel(s.x - 1, s.y);
        }
    }

    for id in terrain.lists().known() {
        if !visible(terrain, id, vp) {
            continue;
        }
        let w = terrain.wall(id);
        let face = Face::of(w.new_type);
        for t in 0..w.length {
            paint(bmp, vp, w, t, &face, face.footprint, RasterOp::AndNot);
        }
        for t in terrain.span(id).steps() {
            paint(bmp, vp, w, t, &face, face.band, RasterOp::AndNot);
        }
    }

    for &site in terrain.hash_sites() {
        let max = site + IVec2::new(HASH_WIDTH - 1, HASH_HEIGHT - 1);
        if !vp.overlaps(site, max) {
            continue;
        }
        let s = vp.to_screen(site);
        for (r, row) in HASH_FIGURE.iter().enumerate() {
            bmp.blit_row(s.x, s.y + r as i32, &row.to_be_bytes(), 16, RasterOp::Or);
        }
    }
}

/// Black pass for one kind: XOR every footprint of the walls in its bucket.
///
/// Running it twice restores the bitmap.
pub fn black_terrain(bmp: &mut Bitmap, terrain: &Terrain, vp: &Viewport, kind: WallKind) {
    if kind.bucket().is_none() {
        warn!(?kind, "black pass requested for unknown wall kind, skipped");
        return;
    }
    for &id in terrain.lists().of(kind) {
        if !visible(terrain, id, vp) {
            continue;
        }
        let w = terrain.wall(id);
        let face = Face::of(w.new_type);
        for t in 0..w.length {
            paint(bmp, vp, w, t, &face, face.footprint, RasterOp::Xor);
        }
    }
}

#[inline]
fn visible(terrain: &Terrain, id: WallId, vp: &Viewport) -> bool {
    let (min, max) = terrain.extent(id);
    vp.overlaps(min, max)
}

/// Apply `op` to the `len`-pixel run of step `t`.
#[inline]
fn paint(bmp: &mut Bitmap, vp: &Viewport, w: &Wall, t: i32, face: &Face, len: i32, op: RasterOp) {
    let (origin, width, height) = face.rect(vp.to_screen(w.step(t)), len);
    let bits = run_bits(width as u32);
    for dy in 0..height {
        bmp.blit_row(origin.x, origin.y + dy, &bits, width as usize, op);
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::dither_bit;
    use crate::world::{LineDir, UpDown, WorldBounds};

    fn wall(id: WallId, x: i32, y: i32, dir: LineDir, ud: UpDown, len: i32, kind: WallKind) -> Wall {
        Wall::new(id, IVec2::new(x, y), dir, ud, len, kind).unwrap()
    }

    fn world(wrap: bool) -> WorldBounds {
        WorldBounds::new(1024, 600, wrap).unwrap()
    }

    fn render(terrain: &Terrain, vp: &Viewport) -> Bitmap {
        let mut bmp = Bitmap::new(vp.width() as usize, vp.height() as usize);
        fill_background(&mut bmp, vp);
        for pass in vp.passes(terrain.bounds()) {
            white_terrain(&mut bmp, terrain, &pass);
        }
        for kind in WallKind::ORDERED {
            for pass in vp.passes(terrain.bounds()) {
                black_terrain(&mut bmp, terrain, &pass, kind);
            }
        }
        bmp
    }

    #[test]
    fn dither_is_anchored_to_world() {
        let a = Viewport::new(10, 20, 64, 16);
        let b = Viewport::new(13, 21, 64, 16);
        let mut ba = Bitmap::new(64, 16);
        let mut bb = Bitmap::new(64, 16);
        fill_background(&mut ba, &a);
        fill_background(&mut bb, &b);
        for wy in 21..36 {
            for wx in 13..74 {
                let pa = ba.get_pixel(wx - a.x, wy - a.y);
                let pb = bb.get_pixel(wx - b.x, wy - b.y);
                assert_eq!(pa, pb, "({wx},{wy})");
                assert_eq!(pa, dither_bit(wx, wy));
            }
        }
    }

    #[test]
    fn single_south_wall() {
        let w = wall(0, 200, 100, LineDir::N, UpDown::Down, 50, WallKind::Normal);
        let terrain = Terrain::build(world(false), vec![w]);
        let vp = Viewport::new(0, 0, 512, 342);
        let bmp = render(&terrain, &vp);

        // the crosshatch baked into the end pieces
        let hash_pixel = |x: i32, y: i32| {
            [IVec2::new(200, 100), IVec2::new(200, 150)].iter().any(|s| {
                let (dx, dy) = (x - s.x, y - s.y);
                (0..16).contains(&dx)
                    && (0..6).contains(&dy)
                    && HASH_FIGURE[dy as usize] & (0x8000 >> dx) != 0
            })
        };

        for y in 100..150 {
            assert!(bmp.get_pixel(200, y), "line pixel (200,{y})");
            assert!(
                !bmp.get_pixel(201, y) || hash_pixel(201, y),
                "underside pixel (201,{y})"
            );
        }
        assert!(!bmp.get_pixel(200, 99));
        assert!(!bmp.get_pixel(201, 120));

        // everything else black is background or crosshatch
        for y in 0..342 {
            for x in 0..512 {
                let on_line = x == 200 && (100..150).contains(&y);
                if bmp.get_pixel(x, y) && !on_line && !hash_pixel(x, y) {
                    assert!(dither_bit(x, y), "stray terrain pixel ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn black_pass_twice_is_identity() {
        let walls = vec![
            wall(0, 100, 100, LineDir::N, UpDown::Down, 50, WallKind::Ghost),
            wall(1, 120, 160, LineDir::Ne, UpDown::Up, 30, WallKind::Ghost),
            wall(2, 150, 170, LineDir::E, UpDown::Down, 60, WallKind::Normal),
        ];
        let terrain = Terrain::build(world(false), walls);
        let vp = Viewport::new(0, 0, 512, 342);
        let before = render(&terrain, &vp);
        for kind in WallKind::ORDERED {
            let mut bmp = before.clone();
            black_terrain(&mut bmp, &terrain, &vp, kind);
            black_terrain(&mut bmp, &terrain, &vp, kind);
            assert_eq!(bmp, before, "{kind:?}");
        }
        // and a single ghost pass really changes something
        let mut bmp = before.clone();
        black_terrain(&mut bmp, &terrain, &vp, WallKind::Ghost);
        assert_ne!(bmp, before);
    }

    #[test]
    fn unknown_kind_pass_is_a_no_op() {
        let walls = vec![wall(0, 100, 100, LineDir::N, UpDown::Down, 50, WallKind::Unknown(5))];
        let terrain = Terrain::build(world(false), walls);
        let vp = Viewport::new(0, 0, 256, 256);
        let before = render(&terrain, &vp);
        let mut bmp = before.clone();
        black_terrain(&mut bmp, &terrain, &vp, WallKind::Unknown(5));
        assert_eq!(bmp, before);

        let mut plain = Bitmap::new(256, 256);
        fill_background(&mut plain, &vp);
        assert_eq!(before, plain);
    }

    #[test]
    fn nne_wall_gets_lip() {
        let w = wall(0, 100, 200, LineDir::Nne, UpDown::Up, 40, WallKind::Normal);
        let terrain = Terrain::build(world(false), vec![w.clone()]);
        let vp = Viewport::new(0, 0, 256, 256);
        let bmp = render(&terrain, &vp);
        for t in (1..40).step_by(2) {
            let p = w.step(t);
            assert!(!bmp.get_pixel(p.x - 1, p.y), "lip at step {t}");
        }
    }

    #[test]
    fn seam_render_matches_two_halves() {
        let walls = vec![
            wall(0, 850, 100, LineDir::N, UpDown::Down, 60, WallKind::Normal),
            wall(1, 900, 200, LineDir::Ene, UpDown::Up, 40, WallKind::Bounce),
            wall(2, 60, 120, LineDir::E, UpDown::Down, 80, WallKind::Explode),
            wall(3, 150, 220, LineDir::Nne, UpDown::Up, 30, WallKind::Ghost),
        ];
        let w = world(true);
        let terrain = Terrain::build(w, walls);

        let seam = Viewport::new(800, 50, 512, 256);
        assert!(seam.on_right_side(&w));
        let full = render(&terrain, &seam);

        let left = Viewport::new(800, 50, 224, 256);
        let right = Viewport::new(0, 50, 288, 256);
        assert!(!left.on_right_side(&w));
        let lb = render(&terrain, &left);
        let rb = render(&terrain, &right);

        for y in 0..256 {
            for x in 0..512 {
                let expect = if x < 224 {
                    lb.get_pixel(x, y)
                } else {
                    rb.get_pixel(x - 224, y)
                };
                assert_eq!(full.get_pixel(x, y), expect, "({x},{y})");
            }
        }
    }
}
