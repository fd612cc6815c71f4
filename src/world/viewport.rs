use glam::IVec2;
use smallvec::{SmallVec, smallvec};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("world must be at least 1×1, got {width}×{height}")]
    Empty { width: i32, height: i32 },

    /// The checkerboard would break at the seam.
    #[error("wrapping world width {0} must be even")]
    OddWrapWidth(i32),
}

/// Planet extent. Horizontal wrap is optional, vertical never wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldBounds {
    width: i32,
    height: i32,
    wrap: bool,
}

impl WorldBounds {
    pub fn new(width: i32, height: i32, wrap: bool) -> Result<Self, WorldError> {
        if width <= 0 || height <= 0 {
            return Err(WorldError::Empty { width, height });
        }
        if wrap && width % 2 != 0 {
            return Err(WorldError::OddWrapWidth(width));
        }
        Ok(Self {
            width,
            height,
            wrap,
        })
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn wraps(&self) -> bool {
        self.wrap
    }
}

/// World-coordinate window currently on screen (`right`/`bottom` exclusive).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            right: x + width,
            bottom: y + height,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.right - self.x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom - self.y
    }

    /// Centre a `width × height` view on `camera`.
    ///
    /// The vertical axis is always clamped to the world.  Horizontally a
    /// wrapping world normalises `x` into `0..world.width`, so `right` may
    /// pass the seam; otherwise `x` is clamped as well.
    pub fn follow(camera: IVec2, width: i32, height: i32, world: &WorldBounds) -> Self {
        let y = (camera.y - height / 2).clamp(0, (world.height - height).max(0));
        let x = camera.x - width / 2;
        let x = if world.wrap {
            x.rem_euclid(world.width)
        } else {
            x.clamp(0, (world.width - width).max(0))
        };
        Self::new(x, y, width, height)
    }

    /// The view runs past the seam and needs a second pass.
    #[inline]
    pub fn on_right_side(&self, world: &WorldBounds) -> bool {
        world.wrap && self.right > world.width
    }

    pub fn shifted(&self, dx: i32) -> Self {
        Self {
            x: self.x + dx,
            right: self.right + dx,
            ..*self
        }
    }

    /// Viewports every world-space layer is drawn through: the view itself,
    /// then the same view moved one world width left when it crosses the
    /// seam.  Both map onto the same screen.
    pub fn passes(&self, world: &WorldBounds) -> SmallVec<[Viewport; 2]> {
        let mut out: SmallVec<[Viewport; 2]> = smallvec![*self];
        if self.on_right_side(world) {
            out.push(self.shifted(-world.width));
        }
        out
    }

    /// World point → screen pixel for this pass.
    #[inline]
    pub fn to_screen(&self, p: IVec2) -> IVec2 {
        IVec2::new(p.x - self.x, p.y - self.y)
    }

    /// Screen x of a moving object, taking the short way round the seam.
    ///
    /// On a wrapping world the result lies within half a world of the view
    /// centre, whichever side of the seam either of them is on.
    pub fn wrapped_screen_x(&self, world_x: i32, world: &WorldBounds) -> i32 {
        let sx = world_x - self.x;
        if !world.wrap {
            return sx;
        }
        let half = world.width / 2;
        let mid = self.width() / 2;
        (sx - mid + half).rem_euclid(world.width) - half + mid
    }

    /// Does the world rectangle `min ..= max` touch this view?
    #[inline]
    pub fn overlaps(&self, min: IVec2, max: IVec2) -> bool {
        max.x >= self.x && min.x < self.right && max.y >= self.y && min.y < self.bottom
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
