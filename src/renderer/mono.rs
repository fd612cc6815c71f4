//! ---------------------------------------------------------------------------
//! 1-bit software renderer
//!
//! Per frame, in this order (every world-space step runs once per wrap pass):
//!
//! 1. checkerboard over the whole view,
//! 2. craters (pre-aligned rectangle copies),
//! 3. ship shadow (gray), so terrain drawn next covers it,
//! 4. white terrain,
//! 5. black terrain: NORMAL, BOUNCE, GHOST, EXPLODE,
//! 6. bunkers and fuel cells,
//! 7. ship mask tested against the contact layer, then the ship itself,
//! 8. shots and shards.
//!
//! The contact layer is a second bitmap that only ever receives the black
//! footprints of NORMAL, BOUNCE and EXPLODE walls plus the objects.  It has
//! no checkerboard, so a one pixel diagonal wall counts on either parity.
//!
//! Reordering any of these changes the picture and what the ship hits.
//! ---------------------------------------------------------------------------

use glam::IVec2;
use smallvec::SmallVec;
use tracing::warn;

use super::{FrameInspect, FrameReport, Pass, PassRecord, Renderer, Scene};
use crate::raster::figure::{SHADOW_DX, SHADOW_DY};
use crate::raster::{
    Bitmap, RasterOp, aligned_figure, alignment, background_for, full_figure, gray_figure,
};
use crate::sim::{Placement, check_figure};
use crate::terrain::{black_terrain, fill_background, white_terrain};
use crate::world::{Sprite, SpriteBank, Viewport, WallKind, WorldBounds};

pub struct MonoRenderer {
    bitmap: Bitmap,
    /// Lethal pixels only, what the ship is tested against.
    contact: Bitmap,
    viewport: Option<Viewport>,
    log: Vec<PassRecord>,
}

impl Default for MonoRenderer {
    fn default() -> Self {
        Self {
            bitmap: Bitmap::new(0, 0),
            contact: Bitmap::new(0, 0),
            viewport: None,
            log: Vec::new(),
        }
    }
}

impl MonoRenderer {
    #[inline]
    fn record(&mut self, pass: Pass, viewport: Viewport) {
        self.log.push(PassRecord { pass, viewport });
    }

    fn draw_craters(&mut self, scene: &Scene<'_>, passes: &[Viewport]) {
        let craters = &scene.planet.craters;
        let crater = if craters.is_empty() {
            None
        } else {
            lookup(scene.sprites, "crater")
        };
        for vp in passes {
            if let Some(s) = crater {
                for c in craters {
                    let tl = top_left(c.pos, s);
                    if let Some(p) = on_screen(vp, tl, s) {
                        let img = &s.aligned[alignment(tl.x, tl.y) as usize];
                        aligned_figure(&mut self.bitmap, p.x, p.y, img);
                    }
                }
            }
            self.record(Pass::Craters, *vp);
        }
    }

    /// Gray copy of the ship mask one pixel down and right.
    fn draw_shadow(&mut self, s: &Sprite, tl: IVec2, vp: &Viewport, bounds: &WorldBounds) {
        let shadow = IVec2::new(tl.x + SHADOW_DX, tl.y + SHADOW_DY);
        let at = screen_of(vp, shadow, bounds);
        gray_figure(
            &mut self.bitmap,
            at.x,
            at.y,
            &s.mask,
            background_for(alignment(shadow.x, shadow.y)),
        );
        self.record(Pass::Shadow, *vp);
    }

    /// White pass, then the four black passes.  Lethal kinds also go into
    /// the contact layer.
    fn draw_terrain(&mut self, scene: &Scene<'_>, passes: &[Viewport]) {
        for vp in passes {
            white_terrain(&mut self.bitmap, scene.terrain, vp);
            self.record(Pass::White, *vp);
        }
        for kind in WallKind::ORDERED {
            for vp in passes {
                black_terrain(&mut self.bitmap, scene.terrain, vp, kind);
                if kind.is_solid() {
                    black_terrain(&mut self.contact, scene.terrain, vp, kind);
                }
                self.record(Pass::Black(kind), *vp);
            }
        }
    }

    /// Live bunkers and fuel cells, into the frame and the contact layer.
    fn draw_objects(&mut self, scene: &Scene<'_>, passes: &[Viewport]) {
        let planet = scene.planet;
        let fuel = if planet.fuels.iter().any(|f| f.alive) {
            lookup(scene.sprites, "fuel")
        } else {
            None
        };
        for vp in passes {
            for b in planet.bunkers.iter().filter(|b| b.alive) {
                let name = format!("bunker/{}/{}", b.kind, b.rot);
                if let Some(s) = lookup(scene.sprites, &name) {
                    if let Some(p) = on_screen(vp, top_left(b.pos, s), s) {
                        self.solid_figure(p, s);
                    }
                }
            }
            if let Some(s) = fuel {
                for f in planet.fuels.iter().filter(|f| f.alive) {
                    if let Some(p) = on_screen(vp, top_left(f.pos, s), s) {
                        self.solid_figure(p, s);
                    }
                }
            }
            self.record(Pass::Objects, *vp);
        }
    }

    #[inline]
    fn solid_figure(&mut self, p: IVec2, s: &Sprite) {
        full_figure(&mut self.bitmap, p.x, p.y, &s.def, &s.mask);
        full_figure(&mut self.contact, p.x, p.y, &s.def, &s.mask);
    }

    /// Contact test, then the ship.  Returns whether it touched anything.
    fn draw_ship(&mut self, s: &Sprite, tl: IVec2, vp: &Viewport, bounds: &WorldBounds) -> bool {
        let at = screen_of(vp, tl, bounds);
        let collided = check_figure(&self.contact, &Placement::new(at.x, at.y, &s.mask));
        self.record(Pass::Contact, *vp);

        full_figure(&mut self.bitmap, at.x, at.y, &s.def, &s.mask);
        self.record(Pass::Ship, *vp);
        collided
    }

    fn draw_shots(&mut self, scene: &Scene<'_>, vp: &Viewport) {
        let bounds = scene.terrain.bounds();
        for shot in scene.shots {
            let p = screen_of(vp, shot.pos - IVec2::ONE, bounds);
            for dy in 0..2 {
                self.bitmap.blit_row(p.x, p.y + dy, &[0xC0], 2, RasterOp::Or);
            }
        }
        for shard in scene.shards {
            let name = format!("shard/{}/{}", shard.kind, shard.rot);
            if let Some(s) = lookup(scene.sprites, &name) {
                let p = screen_of(vp, top_left(shard.pos, s), bounds);
                full_figure(&mut self.bitmap, p.x, p.y, &s.def, &s.mask);
            }
        }
        self.record(Pass::Shots, *vp);
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for MonoRenderer {
    fn begin_frame(&mut self, w: usize, h: usize) {
        if w != self.bitmap.width() || h != self.bitmap.height() {
            self.bitmap = Bitmap::new(w, h);
            self.contact = Bitmap::new(w, h);
        }
        self.bitmap.fill(0);
        self.contact.fill(0);
        self.viewport = None;
        self.log.clear();
    }

    fn draw_scene(&mut self, scene: &Scene<'_>) -> FrameReport {
        let bounds = *scene.terrain.bounds();
        let vp = Viewport::follow(
            scene.camera,
            self.bitmap.width() as i32,
            self.bitmap.height() as i32,
            &bounds,
        );
        let passes: SmallVec<[Viewport; 2]> = vp.passes(&bounds);
        self.viewport = Some(vp);

        let ship = scene.ship.and_then(|ship| {
            let s = lookup(scene.sprites, &format!("ship/{}", ship.rot))?;
            Some((s, top_left(ship.pos, s)))
        });

        fill_background(&mut self.bitmap, &vp);
        self.record(Pass::Background, vp);

        self.draw_craters(scene, &passes);
        if let Some((s, tl)) = ship {
            self.draw_shadow(s, tl, &vp, &bounds);
        }
        self.draw_terrain(scene, &passes);
        self.draw_objects(scene, &passes);
        let collided = match ship {
            Some((s, tl)) => self.draw_ship(s, tl, &vp, &bounds),
            None => false,
        };
        self.draw_shots(scene, &vp);

        FrameReport {
            viewport: vp,
            collided,
        }
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[u8], usize, usize),
    {
        submit(
            self.bitmap.as_bytes(),
            self.bitmap.width(),
            self.bitmap.height(),
        );
    }
}

impl FrameInspect for MonoRenderer {
    fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    fn contact(&self) -> &Bitmap {
        &self.contact
    }

    fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn passes(&self) -> &[PassRecord] {
        &self.log
    }
}

/*──────────────────────── helpers ────────────────────────────────────*/

fn lookup<'b>(bank: &'b SpriteBank, name: &str) -> Option<&'b Sprite> {
    let s = bank.get(name);
    if s.is_none() {
        warn!(sprite = name, "missing sprite, not drawn");
    }
    s
}

#[inline]
fn top_left(center: IVec2, s: &Sprite) -> IVec2 {
    center - IVec2::new(s.width() as i32 / 2, s.height() as i32 / 2)
}

/// Screen corner of a fixed object seen through `vp`, if any of it shows.
fn on_screen(vp: &Viewport, tl: IVec2, s: &Sprite) -> Option<IVec2> {
    let br = tl + IVec2::new(s.width() as i32 - 1, s.height() as i32 - 1);
    vp.overlaps(tl, br).then(|| vp.to_screen(tl))
}

/// Screen corner of a moving object, short way round the seam.
#[inline]
fn screen_of(vp: &Viewport, tl: IVec2, bounds: &WorldBounds) -> IVec2 {
    IVec2::new(vp.wrapped_screen_x(tl.x, bounds), tl.y - vp.y)
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Pattern;
    use crate::renderer::{RendererExt, Ship, Shot};
    use crate::terrain::Terrain;
    use crate::world::{Bunker, LineDir, Planet, UpDown, Wall, WallId};

    const W: usize = 512;
    const H: usize = 342;

    fn world(wrap: bool) -> WorldBounds {
        WorldBounds::new(1024, 600, wrap).unwrap()
    }

    /// Solid slab: E walls every other row, 200 long, rows 100‥=201.
    fn slab(kind: WallKind) -> Vec<Wall> {
        (0..51)
            .map(|i| {
                Wall::new(
                    i as WallId,
                    IVec2::new(100, 100 + 2 * i),
                    LineDir::E,
                    UpDown::Down,
                    200,
                    kind,
                )
                .unwrap()
            })
            .collect()
    }

    fn sprites() -> SpriteBank {
        let mut bank = SpriteBank::new();
        let ship = Sprite::from_patterns(Pattern::solid(32, 32), Pattern::solid(32, 32));
        bank.insert("ship/0", ship).unwrap();
        let bunker = Sprite::from_patterns(Pattern::solid(16, 16), Pattern::solid(16, 16));
        bank.insert("bunker/0/0", bunker).unwrap();
        bank
    }

    /// Only a solid `size × size` ship.
    fn ship_bank(size: usize) -> SpriteBank {
        let mut bank = SpriteBank::new();
        let ship = Sprite::from_patterns(Pattern::solid(size, size), Pattern::solid(size, size));
        bank.insert("ship/0", ship).unwrap();
        bank
    }

    fn screen(r: &MonoRenderer, p: IVec2) -> IVec2 {
        r.viewport().unwrap().to_screen(p)
    }

    fn frame(planet: &Planet, bank: &SpriteBank, ship: Option<Ship>, camera: IVec2) -> (MonoRenderer, FrameReport) {
        let terrain = Terrain::from_planet(planet);
        let scene = Scene {
            planet,
            terrain: &terrain,
            sprites: bank,
            camera,
            ship,
            shots: &[],
            shards: &[],
        };
        let mut r = MonoRenderer::default();
        let report = r.draw_frame(W, H, &scene, |_, _, _| {});
        (r, report)
    }

    #[test]
    fn ship_inside_bounce_slab_collides() {
        let planet = Planet::new(world(false), slab(WallKind::Bounce));
        let ship = Ship {
            pos: IVec2::new(200, 150),
            rot: 0,
        };
        let (_, report) = frame(&planet, &sprites(), Some(ship), ship.pos);
        assert!(report.collided);
    }

    #[test]
    fn ship_on_empty_planet_is_clear() {
        let planet = Planet::new(world(false), Vec::new());
        let ship = Ship {
            pos: IVec2::new(240, 150),
            rot: 0,
        };
        let (_, report) = frame(&planet, &sprites(), Some(ship), ship.pos);
        assert!(!report.collided);
    }

    #[test]
    fn ghost_slab_is_passable_but_visible() {
        let planet = Planet::new(world(false), slab(WallKind::Ghost));
        let ship = Ship {
            pos: IVec2::new(200, 150),
            rot: 0,
        };
        let (r, report) = frame(&planet, &sprites(), Some(ship), ship.pos);
        assert!(!report.collided);
        let p = screen(&r, IVec2::new(150, 120));
        assert!(r.bitmap().get_pixel(p.x, p.y));
        assert!(!r.contact().get_pixel(p.x, p.y));
    }

    /// One pixel wide diagonals put every line pixel on the same parity.
    /// Both parities must count as contact.
    #[test]
    fn one_pixel_diagonals_collide_on_either_parity() {
        let cases = [
            (LineDir::Ne, UpDown::Up),
            (LineDir::Ne, UpDown::Down),
            (LineDir::Nne, UpDown::Down),
        ];
        for (dir, ud) in cases {
            for start in [IVec2::new(100, 300), IVec2::new(101, 300)] {
                let wall = Wall::new(0, start, dir, ud, 60, WallKind::Explode).unwrap();
                let hit = wall.step(30);
                let planet = Planet::new(world(false), vec![wall]);

                let ship = Ship { pos: hit, rot: 0 };
                let (_, report) = frame(&planet, &ship_bank(4), Some(ship), hit);
                assert!(report.collided, "{dir:?} {ud:?} from {start}");

                let clear = Ship {
                    pos: hit + IVec2::new(40, 0),
                    rot: 0,
                };
                let (r, report) = frame(&planet, &ship_bank(4), Some(clear), hit);
                assert!(!report.collided, "{dir:?} {ud:?} from {start}");
                let p = screen(&r, hit);
                assert!(r.bitmap().get_pixel(p.x, p.y));
                assert!(r.contact().get_pixel(p.x, p.y));
            }
        }
    }

    #[test]
    fn explode_ne_wall_from_even_start_collides() {
        let wall = Wall::new(0, IVec2::new(100, 300), LineDir::Ne, UpDown::Up, 60, WallKind::Explode)
            .unwrap();
        let planet = Planet::new(world(false), vec![wall]);
        let ship = Ship {
            pos: IVec2::new(130, 270),
            rot: 0,
        };
        let (_, report) = frame(&planet, &ship_bank(4), Some(ship), ship.pos);
        assert!(report.collided);
    }

    #[test]
    fn shadow_lies_under_terrain() {
        // S wall down x=141, ship body on x 125..=140, shadow on 126..=141
        let wall = Wall::new(0, IVec2::new(141, 150), LineDir::N, UpDown::Down, 100, WallKind::Normal)
            .unwrap();
        let planet = Planet::new(world(false), vec![wall]);
        let camera = IVec2::new(256, 171);
        let ship = Ship {
            pos: IVec2::new(133, 200),
            rot: 0,
        };
        let bank = ship_bank(16);
        let (with, _) = frame(&planet, &bank, Some(ship), camera);
        let (without, _) = frame(&planet, &bank, None, camera);
        assert_eq!(with.viewport().map(|v| (v.x, v.y)), Some((0, 0)));

        for y in 193..=208 {
            assert!(with.bitmap().get_pixel(141, y), "wall pixel at y={y}");
            for x in 141..=150 {
                assert_eq!(
                    with.bitmap().get_pixel(x, y),
                    without.bitmap().get_pixel(x, y),
                    "({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn ship_just_left_of_seam_shows_at_left_edge() {
        let planet = Planet::new(world(true), Vec::new());
        let camera = IVec2::new(256, 171);
        let ship = Ship {
            pos: IVec2::new(1023, 100),
            rot: 0,
        };
        let (with, _) = frame(&planet, &ship_bank(4), Some(ship), camera);
        let (without, _) = frame(&planet, &ship_bank(4), None, camera);
        assert_eq!(with.viewport().map(|v| v.x), Some(0));

        // body spans world x 1021..=1024, i.e. screen -3..=0
        assert!(!without.bitmap().get_pixel(0, 99));
        assert!(with.bitmap().get_pixel(0, 99));
        assert!(!with.bitmap().get_pixel(1, 98));
    }

    #[test]
    fn bunkers_are_solid() {
        let mut planet = Planet::new(world(false), Vec::new());
        planet.bunkers.push(Bunker {
            pos: IVec2::new(210, 150),
            kind: 0,
            rot: 0,
            alive: true,
        });
        let ship = Ship {
            pos: IVec2::new(200, 150),
            rot: 0,
        };
        let (_, report) = frame(&planet, &sprites(), Some(ship), ship.pos);
        assert!(report.collided);
    }

    #[test]
    fn pass_log_follows_fixed_order() {
        let planet = Planet::new(world(true), slab(WallKind::Normal));
        let ship = Ship {
            pos: IVec2::new(1000, 150),
            rot: 0,
        };
        let (r, report) = frame(&planet, &sprites(), Some(ship), ship.pos);
        assert!(report.viewport.on_right_side(&planet.bounds));

        let kinds: Vec<WallKind> = r
            .passes()
            .iter()
            .filter_map(|p| match p.pass {
                Pass::Black(k) => Some(k),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                WallKind::Normal,
                WallKind::Normal,
                WallKind::Bounce,
                WallKind::Bounce,
                WallKind::Ghost,
                WallKind::Ghost,
                WallKind::Explode,
                WallKind::Explode,
            ]
        );

        let mut order: Vec<Pass> = r.passes().iter().map(|p| p.pass).collect();
        order.dedup();
        assert_eq!(
            &order[..4],
            &[Pass::Background, Pass::Craters, Pass::Shadow, Pass::White]
        );
        assert_eq!(&order[order.len() - 3..], &[Pass::Contact, Pass::Ship, Pass::Shots]);
        let white = order.iter().position(|p| *p == Pass::White);
        let black = order.iter().position(|p| matches!(p, Pass::Black(_)));
        assert!(white < black);
    }

    #[test]
    fn missing_sprites_are_skipped() {
        let planet = Planet::new(world(false), Vec::new());
        let ship = Ship {
            pos: IVec2::new(200, 150),
            rot: 9,
        };
        let (r, report) = frame(&planet, &SpriteBank::new(), Some(ship), ship.pos);
        assert!(!report.collided);
        assert!(
            !r.passes()
                .iter()
                .any(|p| matches!(p.pass, Pass::Shadow | Pass::Ship))
        );
    }

    #[test]
    fn shots_are_two_by_two() {
        let planet = Planet::new(world(false), Vec::new());
        let terrain = Terrain::from_planet(&planet);
        let bank = SpriteBank::new();
        let shots = [Shot {
            pos: IVec2::new(101, 101),
        }];
        let scene = Scene {
            planet: &planet,
            terrain: &terrain,
            sprites: &bank,
            camera: IVec2::new(0, 0),
            ship: None,
            shots: &shots,
            shards: &[],
        };
        let mut r = MonoRenderer::default();
        let mut bytes = Vec::new();
        r.draw_frame(W, H, &scene, |fb, w, h| {
            assert_eq!((w, h), (W, H));
            bytes.extend_from_slice(fb);
        });
        assert_eq!(bytes.len(), W / 8 * H);
        for (x, y) in [(100, 100), (101, 100), (100, 101), (101, 101)] {
            assert!(r.bitmap().get_pixel(x, y));
        }
    }
}
