use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};
use crate::geom::Point;
use crate::piece::{IdentityColor, Piece, PieceId};
use crate::surface::MaskSampler;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitStrategy {
    #[default]
    Mask,
    Geometric,
}

impl HitStrategy {
    pub fn name(self) -> &'static str {
        match self {
            HitStrategy::Mask => "mask",
            HitStrategy::Geometric => "geometric",
        }
    }

    pub fn uses_mask(self) -> bool {
        self == HitStrategy::Mask
    }
}

impl FromStr for HitStrategy {
    type Err = PuzzleError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mask" => Ok(HitStrategy::Mask),
            "geometric" => Ok(HitStrategy::Geometric),
            other => Err(PuzzleError::Config(format!("unknown hit strategy `{other}`"))),
        }
    }
}

/// Identity key to piece lookup, rebuilt whenever the grid is regenerated.
#[derive(Clone, Debug, Default)]
pub struct IdentityIndex {
    by_key: HashMap<u32, PieceId>,
}

impl IdentityIndex {
    pub fn build(pieces: &[Piece]) -> Self {
        let by_key = pieces
            .iter()
            .map(|piece| (piece.identity().key(), piece.id))
            .collect();
        Self { by_key }
    }

    pub fn lookup(&self, color: IdentityColor) -> Option<PieceId> {
        self.by_key.get(&color.key()).copied()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Maps a pointer location to the topmost piece under it.
///
/// `pieces` is in z-order, last is topmost.
pub trait HitResolver {
    fn resolve(&self, pieces: &[Piece], index: &IdentityIndex, at: Point) -> Option<PieceId>;
}

/// Rectangle footprint test; tabs are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeometricResolver;

impl HitResolver for GeometricResolver {
    fn resolve(&self, pieces: &[Piece], _index: &IdentityIndex, at: Point) -> Option<PieceId> {
        pieces
            .iter()
            .rev()
            .find(|piece| piece.bounds().contains(at))
            .map(|piece| piece.id)
    }
}

/// Reads the identity mask under the pointer. Transparent pixels and
/// colors that belong to no piece are misses.
pub struct MaskResolver<'a, M: MaskSampler + ?Sized> {
    mask: &'a M,
}

impl<'a, M: MaskSampler + ?Sized> MaskResolver<'a, M> {
    pub fn new(mask: &'a M) -> Self {
        Self { mask }
    }
}

impl<M: MaskSampler + ?Sized> HitResolver for MaskResolver<'_, M> {
    fn resolve(&self, _pieces: &[Piece], index: &IdentityIndex, at: Point) -> Option<PieceId> {
        let rgba = self.mask.sample(at)?;
        let color = IdentityColor::from_rgba(rgba)?;
        index.lookup(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeSet;

    struct FixedMask([u8; 4]);

    impl MaskSampler for FixedMask {
        fn sample(&self, _at: Point) -> Option<[u8; 4]> {
            Some(self.0)
        }
    }

    fn piece(id: u32, x: f32, color: IdentityColor) -> Piece {
        Piece::new(
            PieceId(id),
            0,
            id,
            Point::new(x, 0.0),
            50.0,
            50.0,
            EdgeSet::default(),
            color,
        )
    }

    #[test]
    fn geometric_prefers_topmost() {
        let pieces = vec![
            piece(0, 0.0, IdentityColor::new(1, 0, 0)),
            piece(1, 20.0, IdentityColor::new(2, 0, 0)),
        ];
        let index = IdentityIndex::build(&pieces);
        let resolver = GeometricResolver;
        assert_eq!(resolver.resolve(&pieces, &index, Point::new(30.0, 10.0)), Some(PieceId(1)));
        assert_eq!(resolver.resolve(&pieces, &index, Point::new(10.0, 10.0)), Some(PieceId(0)));
        assert_eq!(resolver.resolve(&pieces, &index, Point::new(200.0, 10.0)), None);
    }

    #[test]
    fn mask_maps_color_to_piece() {
        let pieces = vec![piece(4, 0.0, IdentityColor::new(10, 20, 30))];
        let index = IdentityIndex::build(&pieces);
        let hit = MaskResolver::new(&FixedMask([10, 20, 30, 255]));
        assert_eq!(hit.resolve(&pieces, &index, Point::default()), Some(PieceId(4)));
        let transparent = MaskResolver::new(&FixedMask([10, 20, 30, 0]));
        assert_eq!(transparent.resolve(&pieces, &index, Point::default()), None);
        let stranger = MaskResolver::new(&FixedMask([99, 20, 30, 255]));
        assert_eq!(stranger.resolve(&pieces, &index, Point::default()), None);
    }

    #[test]
    fn strategy_parses() {
        assert_eq!("Mask".parse::<HitStrategy>().unwrap(), HitStrategy::Mask);
        assert!("pixel".parse::<HitStrategy>().is_err());
    }
}
