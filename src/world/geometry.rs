use glam::IVec2;
use thiserror::Error;

pub type WallId = u16;

/*--------------------------- directions -----------------------------*/

/// Legacy direction of a wall, always drawn left to right (or top-down for
/// `N`); the vertical sense comes from [`UpDown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LineDir {
    N = 1,
    Nne = 2,
    Ne = 3,
    Ene = 4,
    E = 5,
}

/// Half-unit x extent per unit of length, indexed by `LineDir`.
const XLENGTH: [i32; 6] = [0, 0, 1, 2, 2, 2];
/// Half-unit y extent per unit of length, indexed by `LineDir`.
const YLENGTH: [i32; 6] = [0, 2, 2, 2, 1, 0];

impl LineDir {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(LineDir::N),
            2 => Some(LineDir::Nne),
            3 => Some(LineDir::Ne),
            4 => Some(LineDir::Ene),
            5 => Some(LineDir::E),
            _ => None,
        }
    }

    #[inline]
    pub fn xlength(self) -> i32 {
        XLENGTH[self as usize]
    }

    #[inline]
    pub fn ylength(self) -> i32 {
        YLENGTH[self as usize]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum UpDown {
    Up = -1,
    Down = 1,
}

impl UpDown {
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(UpDown::Up),
            1 => Some(UpDown::Down),
            _ => None,
        }
    }

    #[inline]
    pub fn sign(self) -> i32 {
        self as i8 as i32
    }
}

/// The 8-way classification every renderer table is keyed by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum NewType {
    S = 1,
    Sse = 2,
    Se = 3,
    Ese = 4,
    E = 5,
    Ene = 6,
    Ne = 7,
    Nne = 8,
}

impl NewType {
    pub const ALL: [NewType; 8] = [
        NewType::S,
        NewType::Sse,
        NewType::Se,
        NewType::Ese,
        NewType::E,
        NewType::Ene,
        NewType::Ne,
        NewType::Nne,
    ];

    /// `None` for an upward vertical, which must be stored top-down instead.
    pub fn classify(dir: LineDir, up_down: UpDown) -> Option<Self> {
        Some(match (dir, up_down) {
            (LineDir::N, UpDown::Down) => NewType::S,
            (LineDir::N, UpDown::Up) => return None,
            (LineDir::Nne, UpDown::Down) => NewType::Sse,
            (LineDir::Ne, UpDown::Down) => NewType::Se,
            (LineDir::Ene, UpDown::Down) => NewType::Ese,
            (LineDir::E, _) => NewType::E,
            (LineDir::Ene, UpDown::Up) => NewType::Ene,
            (LineDir::Ne, UpDown::Up) => NewType::Ne,
            (LineDir::Nne, UpDown::Up) => NewType::Nne,
        })
    }

    /// Table index, 1‥=8.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// 16-point compass heading (0 = north, clockwise) pointing from the
    /// wall's endpoint `end` (0 start, 1 end) along the wall.
    #[inline]
    pub fn compass(self, end: usize) -> i32 {
        let dir = 9 - self as i32;
        if end == 0 { dir } else { (dir + 8) & 15 }
    }
}

/*----------------------------- kinds --------------------------------*/

/// What a wall does to the ship; also its black-pass bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallKind {
    Normal,
    Bounce,
    Ghost,
    Explode,
    /// Code the game does not know; such walls are reported and skipped.
    Unknown(u8),
}

impl WallKind {
    /// Canonical black-pass order.
    pub const ORDERED: [WallKind; 4] = [
        WallKind::Normal,
        WallKind::Bounce,
        WallKind::Ghost,
        WallKind::Explode,
    ];

    pub fn from_code(code: u8) -> Self {
        match code {
            0 => WallKind::Normal,
            1 => WallKind::Bounce,
            2 => WallKind::Ghost,
            3 => WallKind::Explode,
            other => WallKind::Unknown(other),
        }
    }

    /// Position in [`ORDERED`](Self::ORDERED).
    pub fn bucket(self) -> Option<usize> {
        match self {
            WallKind::Normal => Some(0),
            WallKind::Bounce => Some(1),
            WallKind::Ghost => Some(2),
            WallKind::Explode => Some(3),
            WallKind::Unknown(_) => None,
        }
    }

    /// Touching it ends (or deflects) the flight.
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            WallKind::Normal | WallKind::Bounce | WallKind::Explode
        )
    }
}

/*----------------------------- walls --------------------------------*/

/// A wall record as handed over by the level loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawWall {
    pub startx: i32,
    pub starty: i32,
    pub length: i32,
    pub endx: i32,
    pub endy: i32,
    pub dir: u8,
    pub up_down: i8,
    pub kind: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WallError {
    #[error("wall {id}: unknown direction code {code}")]
    BadDirection { id: usize, code: u8 },

    #[error("wall {id}: up/down code {code} is neither -1 nor 1")]
    BadUpDown { id: usize, code: i8 },

    #[error("wall {id}: length {length} must be positive")]
    BadLength { id: usize, length: i32 },

    #[error("wall {id}: vertical walls must be stored top-down")]
    UpwardVertical { id: usize },

    #[error(
        "wall {id}: stored end ({stored_x},{stored_y}) does not match derived end ({derived_x},{derived_y})"
    )]
    EndpointMismatch {
        id: usize,
        stored_x: i32,
        stored_y: i32,
        derived_x: i32,
        derived_y: i32,
    },

    #[error("{0} walls exceed the wall id range")]
    TooMany(usize),
}

/// One terrain line segment (immutable after planet load).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wall {
    pub id: WallId,
    pub start: IVec2,
    pub end: IVec2,
    /// Extent along the primary axis.
    pub length: i32,
    pub dir: LineDir,
    pub up_down: UpDown,
    pub new_type: NewType,
    pub kind: WallKind,
}

impl Wall {
    /// Build a wall from its start, direction and length; the end point is
    /// derived and therefore consistent by construction.
    pub fn new(
        id: WallId,
        start: IVec2,
        dir: LineDir,
        up_down: UpDown,
        length: i32,
        kind: WallKind,
    ) -> Result<Self, WallError> {
        let idx = id as usize;
        if length <= 0 {
            return Err(WallError::BadLength { id: idx, length });
        }
        let new_type = NewType::classify(dir, up_down).ok_or(WallError::UpwardVertical { id: idx })?;
        Ok(Self {
            id,
            start,
            end: start + offset(dir, up_down, length),
            length,
            dir,
            up_down,
            new_type,
            kind,
        })
    }

    /// Validate a loader record: the stored end must equal the derived one.
    pub fn from_raw(id: WallId, raw: &RawWall) -> Result<Self, WallError> {
        let idx = id as usize;
        let dir = LineDir::from_code(raw.dir).ok_or(WallError::BadDirection {
            id: idx,
            code: raw.dir,
        })?;
        let up_down = UpDown::from_code(raw.up_down).ok_or(WallError::BadUpDown {
            id: idx,
            code: raw.up_down,
        })?;
        let wall = Self::new(
            id,
            IVec2::new(raw.startx, raw.starty),
            dir,
            up_down,
            raw.length,
            WallKind::from_code(raw.kind),
        )?;
        if wall.end != IVec2::new(raw.endx, raw.endy) {
            return Err(WallError::EndpointMismatch {
                id: idx,
                stored_x: raw.endx,
                stored_y: raw.endy,
                derived_x: wall.end.x,
                derived_y: wall.end.y,
            });
        }
        Ok(wall)
    }

    /// Start (`0`) or end (`1`) point.
    #[inline]
    pub fn endpoint(&self, end: usize) -> IVec2 {
        if end == 0 { self.start } else { self.end }
    }

    /// Line pixel after `t` steps along the primary axis.
    #[inline]
    pub fn step(&self, t: i32) -> IVec2 {
        self.start + offset(self.dir, self.up_down, t)
    }

    /// Inclusive bounding box of the line itself.
    pub fn bounds(&self) -> (IVec2, IVec2) {
        (self.start.min(self.end), self.start.max(self.end))
    }
}

#[inline]
fn offset(dir: LineDir, up_down: UpDown, t: i32) -> IVec2 {
    IVec2::new(
        (dir.xlength() * t) >> 1,
        up_down.sign() * ((dir.ylength() * t) >> 1),
    )
}

/// Validate a whole loader wall array, ids following array order.
pub fn walls_from_raw(raw: &[RawWall]) -> Result<Vec<Wall>, WallError> {
    if raw.len() > WallId::MAX as usize {
        return Err(WallError::TooMany(raw.len()));
    }
    raw.iter()
        .enumerate()
        .map(|(i, r)| Wall::from_raw(i as WallId, r))
        .collect()
}

/*------------------------- other planet objects ---------------------*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bunker {
    pub pos: IVec2,
    pub kind: u8,
    pub rot: u8,
    pub alive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fuel {
    pub pos: IVec2,
    pub alive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crater {
    pub pos: IVec2,
}

/*──────────────────────────────── Tests ───────────────────────────────*/
