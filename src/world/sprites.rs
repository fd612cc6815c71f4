// Repository of 1-bit figures supplied by the asset extractor.
// Renderers look figures up by name ("ship/3", "bunker/0/7", "fuel", ...).

use std::collections::HashMap;

use crate::raster::{Pattern, PatternError, background_for};

/// Runtime handle for a sprite in this bank.
pub type SpriteId = u16;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SpriteError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Definition, mask and aligned variants must share one size.
    #[error("sprite `{name}`: {part} is {got_w}×{got_h}, expected {want_w}×{want_h}")]
    SizeMismatch {
        name: String,
        part: &'static str,
        want_w: usize,
        want_h: usize,
        got_w: usize,
        got_h: usize,
    },

    #[error("sprite name `{0}` already present in bank")]
    Duplicate(String),

    #[error("sprite id {0} out of range")]
    BadId(SpriteId),
}

/// Definition + mask, plus the two figures pre-composited over the
/// checkerboard (index = alignment parity of the top-left pixel).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sprite {
    pub def: Pattern,
    pub mask: Pattern,
    pub aligned: [Pattern; 2],
}

impl Sprite {
    /// Build from packed buffers; the aligned variants are derived.
    pub fn from_bytes(
        width: usize,
        height: usize,
        def: &[u8],
        mask: &[u8],
    ) -> Result<Self, SpriteError> {
        let def = Pattern::from_bytes(width, height, def)?;
        let mask = Pattern::from_bytes(width, height, mask)?;
        Ok(Self::from_patterns(def, mask))
    }

    pub fn from_patterns(def: Pattern, mask: Pattern) -> Self {
        let aligned = [align(&def, &mask, 0), align(&def, &mask, 1)];
        Self { def, mask, aligned }
    }

    /// Use extractor-supplied aligned variants instead of deriving them.
    pub fn with_aligned(
        name: &str,
        def: Pattern,
        mask: Pattern,
        aligned: [Pattern; 2],
    ) -> Result<Self, SpriteError> {
        let (w, h) = (def.width(), def.height());
        let parts = [
            ("mask", &mask),
            ("even variant", &aligned[0]),
            ("odd variant", &aligned[1]),
        ];
        for (part, pat) in parts {
            if pat.width() != w || pat.height() != h {
                return Err(SpriteError::SizeMismatch {
                    name: name.to_owned(),
                    part,
                    want_w: w,
                    want_h: h,
                    got_w: pat.width(),
                    got_h: pat.height(),
                });
            }
        }
        Ok(Self { def, mask, aligned })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.def.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.def.height()
    }
}

/// `def | (backdrop & !mask)` for figures whose corner has parity `align`.
fn align(def: &Pattern, mask: &Pattern, align: u8) -> Pattern {
    let back = background_for(align);
    def.map_bytes(|r, b| {
        let d = def.row(r)[b];
        let m = mask.row(r).get(b).copied().unwrap_or(0);
        d | (back[r & 1] & !m)
    })
}

/// Name-indexed cache of sprites.
///
/// * Stores exactly one copy of every name.
/// * Ids are dense and stable for the life of the bank.
#[derive(Default)]
pub struct SpriteBank {
    by_name: HashMap<String, SpriteId>,
    data: Vec<Sprite>,
}

impl SpriteBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn id(&self, name: &str) -> Option<SpriteId> {
        self.by_name.get(name).copied()
    }

    pub fn sprite(&self, id: SpriteId) -> Result<&Sprite, SpriteError> {
        self.data.get(id as usize).ok_or(SpriteError::BadId(id))
    }

    /// Name lookup for the renderer; `None` means "draw nothing".
    pub fn get(&self, name: &str) -> Option<&Sprite> {
        self.id(name).and_then(|id| self.data.get(id as usize))
    }

    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        sprite: Sprite,
    ) -> Result<SpriteId, SpriteError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(SpriteError::Duplicate(name));
        }
        let id = self.data.len() as SpriteId;
        self.data.push(sprite);
        self.by_name.insert(name, id);
        Ok(id)
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
