mod geometry;
mod planet;
mod sprites;
mod viewport;

pub use geometry::{
    Bunker, Crater, Fuel, LineDir, NewType, RawWall, UpDown, Wall, WallError, WallId, WallKind,
    walls_from_raw,
};

pub use planet::{Planet, PlanetError};

pub use sprites::{Sprite, SpriteBank, SpriteError, SpriteId};

pub use viewport::{Viewport, WorldBounds, WorldError};
