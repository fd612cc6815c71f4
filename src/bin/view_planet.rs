//! Scroll around a demo planet with the arrow keys.
//!
//! ```bash
//! cargo run --release -- --world-width 1920 --log-level debug
//! ```
//!
//! Space fires, Escape quits.  The title bar flags ship contact.

use clap::Parser;
use glam::IVec2;
use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};
use std::time::{Duration, Instant};
use tracing::{Level, info};

use monoterrain::{
    logging::setup_logging,
    raster::Pattern,
    renderer::{MonoRenderer, RendererExt, Scene, Ship, Shot},
    terrain::Terrain,
    world::{
        Bunker, Crater, Fuel, LineDir, Planet, Sprite, SpriteBank, UpDown, Wall, WallId, WallKind,
        WorldBounds,
    },
};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Planet width in pixels (even when wrapping)
    #[arg(long, default_value_t = 1920)]
    world_width: i32,

    #[arg(long, default_value_t = 700)]
    world_height: i32,

    /// Clamp at the edges instead of wrapping round
    #[arg(long)]
    no_wrap: bool,

    #[arg(long, default_value_t = 512)]
    view_width: usize,

    #[arg(long, default_value_t = 342)]
    view_height: usize,

    /// Initial camera position (world pixels)
    #[arg(long)]
    camera_x: Option<i32>,

    #[arg(long)]
    camera_y: Option<i32>,

    /// Pixels per frame while an arrow key is held
    #[arg(long, default_value_t = 4)]
    speed: i32,

    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

/// One leg of the repeating ridge: direction, up/down, length, kind.
const RIDGE: [(LineDir, UpDown, i32, WallKind); 6] = [
    (LineDir::Ne, UpDown::Up, 60, WallKind::Normal),
    (LineDir::E, UpDown::Down, 60, WallKind::Normal),
    (LineDir::Nne, UpDown::Up, 40, WallKind::Bounce),
    (LineDir::Ene, UpDown::Down, 80, WallKind::Normal),
    (LineDir::Ne, UpDown::Down, 60, WallKind::Explode),
    (LineDir::E, UpDown::Down, 40, WallKind::Normal),
];
const RIDGE_SPAN: i32 = 320;
const GROUND: i32 = 560;

struct Bullet {
    shot: Shot,
    dx: i32,
    life: u32,
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    setup_logging(opts.log_level)?;

    let bounds = WorldBounds::new(opts.world_width, opts.world_height, !opts.no_wrap)?;
    let planet = demo_planet(bounds)?;
    let terrain = Terrain::from_planet(&planet);
    let sprites = demo_sprites()?;
    info!(
        walls = planet.walls.len(),
        junctions = terrain.junctions().len(),
        "planet ready"
    );

    let (w, h) = (opts.view_width, opts.view_height);
    let mut win = Window::new(
        "monoterrain",
        w,
        h,
        WindowOptions {
            scale: Scale::X2,
            ..WindowOptions::default()
        },
    )?;
    win.set_target_fps(30);

    let mut renderer = MonoRenderer::default();
    let mut camera = IVec2::new(
        opts.camera_x.unwrap_or(w as i32 / 2),
        opts.camera_y.unwrap_or(GROUND - 200),
    );
    let mut bullets: Vec<Bullet> = Vec::new();
    let mut pixels: Vec<u32> = vec![0; w * h];
    let mut was_hit = false;

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();

        /* scrolling -------------------------------------------------------- */
        if win.is_key_down(Key::Left) {
            camera.x -= opts.speed;
        }
        if win.is_key_down(Key::Right) {
            camera.x += opts.speed;
        }
        if win.is_key_down(Key::Up) {
            camera.y -= opts.speed;
        }
        if win.is_key_down(Key::Down) {
            camera.y += opts.speed;
        }
        camera.y = camera.y.clamp(0, bounds.height() - 1);
        camera.x = if bounds.wraps() {
            camera.x.rem_euclid(bounds.width())
        } else {
            camera.x.clamp(0, bounds.width() - 1)
        };

        /* shots ------------------------------------------------------------ */
        if win.is_key_pressed(Key::Space, KeyRepeat::No) {
            bullets.push(Bullet {
                shot: Shot { pos: camera },
                dx: 8,
                life: 40,
            });
        }
        for b in &mut bullets {
            b.shot.pos.x = (b.shot.pos.x + b.dx).rem_euclid(bounds.width());
            b.life -= 1;
        }
        bullets.retain(|b| b.life > 0);
        let shots: Vec<Shot> = bullets.iter().map(|b| b.shot).collect();

        /* draw ------------------------------------------------------------- */
        let scene = Scene {
            planet: &planet,
            terrain: &terrain,
            sprites: &sprites,
            camera,
            ship: Some(Ship {
                pos: camera,
                rot: 0,
            }),
            shots: &shots,
            shards: &[],
        };
        let report = renderer.draw_frame(w, h, &scene, |fb, fw, fh| expand(fb, fw, fh, &mut pixels));
        win.update_with_buffer(&pixels, w, h)?;

        if report.collided != was_hit {
            was_hit = report.collided;
            win.set_title(if was_hit {
                "monoterrain (contact)"
            } else {
                "monoterrain"
            });
        }

        acc_time += t0.elapsed();
        acc_frames += 1;
        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            info!(avg_ms = format_args!("{avg_ms:.2}"), x = report.viewport.x, "render");
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}

/// 1 bit per pixel (bit 7 leftmost, set = black) → 0RGB.
fn expand(fb: &[u8], w: usize, h: usize, out: &mut Vec<u32>) {
    let stride = w.div_ceil(8);
    out.resize(w * h, 0);
    for y in 0..h {
        let row = &fb[y * stride..(y + 1) * stride];
        for x in 0..w {
            let black = row[x / 8] & (0x80 >> (x % 8)) != 0;
            out[y * w + x] = if black { 0x000000 } else { 0xFFFFFF };
        }
    }
}

fn demo_planet(bounds: WorldBounds) -> anyhow::Result<Planet> {
    let mut walls: Vec<Wall> = Vec::new();
    let mut at = IVec2::new(0, GROUND);
    let legs = (bounds.width() / RIDGE_SPAN).max(1);

    for _ in 0..legs {
        for &(dir, ud, len, kind) in &RIDGE {
            let w = Wall::new(walls.len() as WallId, at, dir, ud, len, kind)?;
            at = w.end;
            walls.push(w);
        }
    }

    // a floating ghost ledge and a hanging spike
    walls.push(Wall::new(
        walls.len() as WallId,
        IVec2::new(400, 300),
        LineDir::E,
        UpDown::Down,
        120,
        WallKind::Ghost,
    )?);
    walls.push(Wall::new(
        walls.len() as WallId,
        IVec2::new(700, 250),
        LineDir::N,
        UpDown::Down,
        60,
        WallKind::Normal,
    )?);

    // bunker on the high flat, fuel on the low one
    let mut planet = Planet::new(bounds, walls);
    for leg in 0..legs {
        let x0 = leg * RIDGE_SPAN;
        planet.bunkers.push(Bunker {
            pos: IVec2::new(x0 + 90, GROUND - 60 - 8),
            kind: 0,
            rot: 0,
            alive: true,
        });
        planet.fuels.push(Fuel {
            pos: IVec2::new(x0 + 300, GROUND - 8),
            alive: leg % 2 == 0,
        });
    }
    planet.craters.push(Crater {
        pos: IVec2::new(150, GROUND - 120),
    });
    Ok(planet)
}

fn demo_sprites() -> anyhow::Result<SpriteBank> {
    let mut bank = SpriteBank::new();

    let (outline, fill) = diamond(32);
    bank.insert(
        "ship/0",
        Sprite::from_patterns(Pattern::from_longs(32, &outline), Pattern::from_longs(32, &fill)),
    )?;

    let box_rows: Vec<u16> = (0..16)
        .map(|r| if r == 0 || r == 15 { 0xFFFF } else { 0x8001 })
        .collect();
    bank.insert(
        "bunker/0/0",
        Sprite::from_patterns(Pattern::from_words(&box_rows), Pattern::solid(16, 16)),
    )?;

    let fuel_rows = [
        0x0FF0, 0x1008, 0x2004, 0x2FF4, 0x2004, 0x2FF4, 0x2004, 0x2FF4, 0x2004, 0x2FF4, 0x2004,
        0x2004, 0x2004, 0x2004, 0x1008, 0x0FF0,
    ];
    let fuel_mask: Vec<u16> = fuel_rows.iter().map(|&r| if r == 0 { 0 } else { 0x3FFC }).collect();
    bank.insert(
        "fuel",
        Sprite::from_patterns(Pattern::from_words(&fuel_rows), Pattern::from_words(&fuel_mask)),
    )?;

    let crater_rows = [
        0x0000, 0x0000, 0x03C0, 0x0C30, 0x1008, 0x2424, 0x2004, 0x4812, 0x4002, 0x2004, 0x2424,
        0x1008, 0x0C30, 0x03C0, 0x0000, 0x0000,
    ];
    let crater_mask: Vec<u16> = crater_rows
        .iter()
        .map(|&r| if r == 0 { 0 } else { 0x7FFE })
        .collect();
    bank.insert(
        "crater",
        Sprite::from_patterns(Pattern::from_words(&crater_rows), Pattern::from_words(&crater_mask)),
    )?;

    Ok(bank)
}

/// A `size × size` diamond: outline rows and filled rows, one long per row.
fn diamond(size: u32) -> (Vec<u32>, Vec<u32>) {
    let half = size / 2;
    let mut outline = Vec::with_capacity(size as usize);
    let mut fill = Vec::with_capacity(size as usize);
    for r in 0..size {
        let reach = if r < half { r } else { size - 1 - r };
        let left = half - 1 - reach;
        let right = half + reach;
        let span = (u32::MAX >> left) & !(u32::MAX.checked_shr(right + 1).unwrap_or(0));
        let edges = (0x8000_0000 >> left) | (0x8000_0000 >> right);
        outline.push(edges);
        fill.push(span);
    }
    (outline, fill)
}
