//! Frame orchestration.
//!
//! *Game state never touches the frame-buffer directly.*
//! It describes one frame as a [`Scene`] and hands it to a type that
//! implements [`Renderer`].
//!
//! * The compositing order is fixed (see [`mono`]); every step is logged as
//!   a [`PassRecord`] so tests can check it through [`FrameInspect`].
//! * A helper blanket-impl [`RendererExt`] adds `draw_frame` so call-sites
//!   stay short.

use glam::IVec2;

use crate::raster::Bitmap;
use crate::terrain::Terrain;
use crate::world::{Planet, SpriteBank, Viewport, WallKind};

pub mod mono;

pub use mono::MonoRenderer;

/// Player ship, centred on `pos` (world coordinates).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ship {
    pub pos: IVec2,
    /// Rotation frame, selects sprite `ship/{rot}`.
    pub rot: u8,
}

/// A bullet: a 2×2 dot centred on `pos`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shot {
    pub pos: IVec2,
}

/// Explosion debris, sprite `shard/{kind}/{rot}` centred on `pos`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shard {
    pub pos: IVec2,
    pub kind: u8,
    pub rot: u8,
}

/// Everything one frame shows.
pub struct Scene<'a> {
    pub planet: &'a Planet,
    pub terrain: &'a Terrain,
    pub sprites: &'a SpriteBank,
    /// Point the view is centred on.
    pub camera: IVec2,
    pub ship: Option<Ship>,
    pub shots: &'a [Shot],
    pub shards: &'a [Shard],
}

/// One step of the per-frame sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    Background,
    Craters,
    /// Gray ship shadow, laid down before the terrain covers it.
    Shadow,
    White,
    Black(WallKind),
    Objects,
    /// Ship mask tested against the contact layer.
    Contact,
    Ship,
    Shots,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassRecord {
    pub pass: Pass,
    /// Viewport the step drew through (shifted on the wrapped pass).
    pub viewport: Viewport,
}

/// What a frame found out while drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    pub viewport: Viewport,
    /// The ship mask touched lethal terrain or an object.
    pub collided: bool,
}

/// A renderer that owns the frame's bitmap.
///
/// `end_frame` lends the finished bitmap to a user-supplied closure.
pub trait Renderer {
    /// (Re)allocate the bitmap for the requested resolution.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// Composite the whole scene.
    fn draw_scene(&mut self, scene: &Scene<'_>) -> FrameReport;

    /// Finish the frame and **loan** the bitmap bytes to `submit`.
    ///
    /// * `submit(bytes, w, h)` runs exactly once per frame.
    /// * `bytes` is row-major, `ceil(w / 8)` bytes per row, bit 7 leftmost.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[u8], usize, usize);
}

/// Convenience blanket-impl with a one-liner `draw_frame` adaptor.
pub trait RendererExt: Renderer {
    fn draw_frame<F>(&mut self, width: usize, height: usize, scene: &Scene<'_>, submit: F) -> FrameReport
    where
        F: FnOnce(&[u8], usize, usize),
    {
        self.begin_frame(width, height);
        let report = self.draw_scene(scene);
        self.end_frame(submit);
        report
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}

/// Read-only view of the last frame, for tests and tools.
pub trait FrameInspect {
    fn bitmap(&self) -> &Bitmap;
    /// Lethal terrain and objects only: no checkerboard, no ghosts, no ship.
    fn contact(&self) -> &Bitmap;
    fn viewport(&self) -> Option<Viewport>;
    fn passes(&self) -> &[PassRecord];
}
