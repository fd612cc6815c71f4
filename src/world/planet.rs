use thiserror::Error;

use super::geometry::{Bunker, Crater, Fuel, RawWall, Wall, WallError, walls_from_raw};
use super::viewport::{WorldBounds, WorldError};

/// Anything that can go wrong while handing a planet to the core.
#[derive(Debug, Error)]
pub enum PlanetError {
    #[error(transparent)]
    Wall(#[from] WallError),

    #[error(transparent)]
    World(#[from] WorldError),
}

/// One planet's worth of read-only arrays.
///
/// Walls never change after load; [`Planet::replace_walls`] swaps the
/// whole set, after which derived terrain must be rebuilt.
#[derive(Clone, Debug)]
pub struct Planet {
    pub bounds: WorldBounds,
    pub walls: Vec<Wall>,
    pub bunkers: Vec<Bunker>,
    pub fuels: Vec<Fuel>,
    pub craters: Vec<Crater>,
}

impl Planet {
    pub fn new(bounds: WorldBounds, walls: Vec<Wall>) -> Self {
        Self {
            bounds,
            walls,
            bunkers: Vec::new(),
            fuels: Vec::new(),
            craters: Vec::new(),
        }
    }

    /// Validate loader output; fails on the first malformed record.
    pub fn from_raw(
        width: i32,
        height: i32,
        wrap: bool,
        walls: &[RawWall],
    ) -> Result<Self, PlanetError> {
        let bounds = WorldBounds::new(width, height, wrap)?;
        Ok(Self::new(bounds, walls_from_raw(walls)?))
    }

    pub fn replace_walls(&mut self, walls: &[RawWall]) -> Result<(), PlanetError> {
        self.walls = walls_from_raw(walls)?;
        Ok(())
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;

    fn south(x: i32, endy: i32) -> RawWall {
        RawWall {
            startx: x,
            starty: 100,
            length: 50,
            endx: x,
            endy,
            dir: 1,
            up_down: 1,
            kind: 0,
        }
    }

    #[test]
    fn first_bad_wall_aborts_load() {
        let err = Planet::from_raw(1024, 600, true, &[south(10, 150), south(20, 149)]).unwrap_err();
        assert!(matches!(
            err,
            PlanetError::Wall(WallError::EndpointMismatch { id: 1, .. })
        ));
    }

    #[test]
    fn bad_world_is_reported() {
        let err = Planet::from_raw(1025, 600, true, &[]).unwrap_err();
        assert!(matches!(err, PlanetError::World(WorldError::OddWrapWidth(1025))));
    }

    #[test]
    fn replace_swaps_whole_set() {
        let mut planet = Planet::from_raw(1024, 600, false, &[south(10, 150)]).unwrap();
        planet.replace_walls(&[south(30, 150), south(40, 150)]).unwrap();
        assert_eq!(planet.walls.len(), 2);
        assert_eq!(planet.walls[0].start.x, 30);
        assert!(planet.replace_walls(&[south(50, 0)]).is_err());
    }
}
