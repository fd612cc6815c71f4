//! Planet terrain: derived wall state and the two-pass compositor.
//!
//! [`Terrain::build`] runs the whole organizer once per wall set:
//!
//! 1. kind buckets and the first-white list,
//! 2. endpoint and glitch white pieces,
//! 3. close-pair band cut-backs and patches,
//! 4. junction clustering and patch merging,
//! 5. sort by position, then crosshatch isolated pieces.
//!
//! Nothing is updated incrementally; a new wall set means a new build.

use glam::IVec2;
use tracing::{debug, warn};

mod compositor;
pub mod junctions;
pub mod walls;
pub mod whites;

pub use compositor::{black_terrain, fill_background, white_terrain};
pub use junctions::{Junction, cluster_endpoints, detect_junctions};
pub use walls::{BandSpan, Face, KindLists, Run, classify};
pub use whites::{PieceFlags, WhitePiece, build_white_pieces};

use crate::world::{Planet, Wall, WallId, WorldBounds};

pub struct Terrain {
    bounds: WorldBounds,
    walls: Vec<Wall>,
    lists: KindLists,
    spans: Vec<BandSpan>,
    extents: Vec<(IVec2, IVec2)>,
    pieces: Vec<WhitePiece>,
    junctions: Vec<Junction>,
    hash_sites: Vec<IVec2>,
}

impl Terrain {
    /// Derive everything the compositor needs from `walls`.
    ///
    /// Wall ids are expected to be array positions (as
    /// [`walls_from_raw`](crate::world::walls_from_raw) assigns them);
    /// anything else is renumbered.
    pub fn build(bounds: WorldBounds, mut walls: Vec<Wall>) -> Self {
        for (i, w) in walls.iter_mut().enumerate() {
            if w.id as usize != i {
                warn!(id = w.id, index = i, "wall id does not match its position, renumbering");
                w.id = i as WallId;
            }
        }

        let lists = classify(&walls);
        let drawable: Vec<&Wall> = lists
            .drawable()
            .into_iter()
            .map(|id| &walls[id as usize])
            .collect();

        let mut pieces = build_white_pieces(drawable.iter().copied());
        let mut spans: Vec<BandSpan> = walls.iter().map(BandSpan::simple).collect();
        junctions::close_whites(&drawable, &mut spans, &mut pieces);

        let clusters = cluster_endpoints(drawable.iter().copied());
        junctions::merge_junction_patches(&mut pieces, &clusters.junctions);
        whites::sort_pieces(&mut pieces);

        let mut hash_sites = clusters.sites;
        junctions::hash_merge(&mut pieces, &mut hash_sites, bounds.width());

        let extents = walls.iter().map(walls::extent).collect();

        debug!(
            walls = walls.len(),
            pieces = pieces.len(),
            junctions = clusters.junctions.len(),
            hash_sites = hash_sites.len(),
            "terrain organized"
        );

        Self {
            bounds,
            walls,
            lists,
            spans,
            extents,
            pieces,
            junctions: clusters.junctions,
            hash_sites,
        }
    }

    pub fn from_planet(planet: &Planet) -> Self {
        Self::build(planet.bounds, planet.walls.clone())
    }

    /// Swap in a new wall set and rebuild all derived state.
    pub fn replace(&mut self, walls: Vec<Wall>) {
        *self = Self::build(self.bounds, walls);
    }

    #[inline]
    pub fn bounds(&self) -> &WorldBounds {
        &self.bounds
    }

    #[inline]
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    #[inline]
    pub fn wall(&self, id: WallId) -> &Wall {
        &self.walls[id as usize]
    }

    #[inline]
    pub fn lists(&self) -> &KindLists {
        &self.lists
    }

    #[inline]
    pub fn span(&self, id: WallId) -> BandSpan {
        self.spans[id as usize]
    }

    /// World box a wall can paint into.
    #[inline]
    pub fn extent(&self, id: WallId) -> (IVec2, IVec2) {
        self.extents[id as usize]
    }

    /// White pieces sorted by (x, y).
    #[inline]
    pub fn pieces(&self) -> &[WhitePiece] {
        &self.pieces
    }

    #[inline]
    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    /// Crosshatch sites not already baked into a piece, sorted by x.
    #[inline]
    pub fn hash_sites(&self) -> &[IVec2] {
        &self.hash_sites
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
