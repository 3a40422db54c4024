use crate::error::{PuzzleError, Result};
use crate::geom::Point;
use crate::rng::GridRng;

pub const TAB_POSITION_MIN: f32 = 0.3;
pub const TAB_POSITION_MAX: f32 = 0.7;

pub const NECK_RATIO: f32 = 0.05;
pub const TAB_HALF_WIDTH_RATIO: f32 = 0.3;
pub const TAB_HEIGHT_RATIO: f32 = 0.3;
/// Fraction of the tab height where the neck control points sit.
pub const TAB_SHOULDER_RATIO: f32 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Clockwise, starting at the top-left corner.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Unit vector pointing away from the piece.
    pub fn outward(self) -> Point {
        match self {
            Side::Top => Point::new(0.0, -1.0),
            Side::Right => Point::new(1.0, 0.0),
            Side::Bottom => Point::new(0.0, 1.0),
            Side::Left => Point::new(-1.0, 0.0),
        }
    }

    /// Clockwise travel direction along this side.
    pub fn along(self) -> Point {
        match self {
            Side::Top => Point::new(1.0, 0.0),
            Side::Right => Point::new(0.0, 1.0),
            Side::Bottom => Point::new(-1.0, 0.0),
            Side::Left => Point::new(0.0, -1.0),
        }
    }

    /// Corner the clockwise walk starts this side from, relative to the piece origin.
    pub fn start_corner(self, width: f32, height: f32) -> Point {
        match self {
            Side::Top => Point::new(0.0, 0.0),
            Side::Right => Point::new(width, 0.0),
            Side::Bottom => Point::new(width, height),
            Side::Left => Point::new(0.0, height),
        }
    }

    pub fn length(self, width: f32, height: f32) -> f32 {
        match self {
            Side::Top | Side::Bottom => width,
            Side::Right | Side::Left => height,
        }
    }

    /// Whether the clockwise walk runs against the top-left based tab position.
    fn reversed(self) -> bool {
        matches!(self, Side::Bottom | Side::Left)
    }
}

/// Signed tab descriptor for one non-boundary side.
///
/// Positive values protrude out of the piece (a tab), negative values recede
/// into it (a blank). The magnitude is the tab center's position along the
/// side, measured from the top or left end, as a fraction of the side length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeTab(f32);

impl EdgeTab {
    pub fn new(value: f32) -> Result<Self> {
        let magnitude = value.abs();
        if !value.is_finite() || magnitude <= TAB_POSITION_MIN || magnitude >= TAB_POSITION_MAX {
            return Err(PuzzleError::InvalidEdge(value));
        }
        Ok(Self(value))
    }

    /// Uniform magnitude strictly inside the tab range, independent sign.
    pub fn random(rng: &mut GridRng) -> Self {
        let sign = if rng.coin() { -1.0 } else { 1.0 };
        let magnitude = loop {
            let magnitude = rng.range(TAB_POSITION_MIN, TAB_POSITION_MAX);
            if magnitude > TAB_POSITION_MIN && magnitude < TAB_POSITION_MAX {
                break magnitude;
            }
        };
        Self(sign * magnitude)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    pub fn position(self) -> f32 {
        self.0.abs()
    }

    /// `1.0` for a tab, `-1.0` for a blank.
    pub fn direction(self) -> f32 {
        self.0.signum()
    }

    pub fn is_tab(self) -> bool {
        self.0 > 0.0
    }

    pub fn complement(self) -> EdgeTab {
        EdgeTab(-self.0)
    }

    /// Distance of the tab center from the start of the clockwise walk.
    pub fn offset_along(self, side: Side, length: f32) -> f32 {
        if side.reversed() {
            length * (1.0 - self.position())
        } else {
            length * self.position()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeSet {
    pub top: Option<EdgeTab>,
    pub right: Option<EdgeTab>,
    pub bottom: Option<EdgeTab>,
    pub left: Option<EdgeTab>,
}

impl EdgeSet {
    pub fn get(&self, side: Side) -> Option<EdgeTab> {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }

    pub fn set(&mut self, side: Side, edge: Option<EdgeTab>) {
        match side {
            Side::Top => self.top = edge,
            Side::Right => self.right = edge,
            Side::Bottom => self.bottom = edge,
            Side::Left => self.left = edge,
        }
    }

    pub fn flat_count(&self) -> usize {
        Side::ALL.iter().filter(|side| self.get(**side).is_none()).count()
    }
}

/// Tab proportions, all scaled by the shorter side of the piece.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TabMetrics {
    pub neck: f32,
    pub half_width: f32,
    pub height: f32,
}

impl TabMetrics {
    pub fn for_piece(width: f32, height: f32) -> Self {
        let size = width.min(height);
        Self {
            neck: size * NECK_RATIO,
            half_width: size * TAB_HALF_WIDTH_RATIO,
            height: size * TAB_HEIGHT_RATIO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_magnitudes() {
        assert!(EdgeTab::new(0.5).is_ok());
        assert!(EdgeTab::new(-0.31).is_ok());
        assert!(EdgeTab::new(0.1).is_err());
        assert!(EdgeTab::new(-0.9).is_err());
        assert!(EdgeTab::new(f32::NAN).is_err());
        assert!(EdgeTab::new(TAB_POSITION_MIN).is_err());
        assert!(EdgeTab::new(-TAB_POSITION_MAX).is_err());
    }

    #[test]
    fn random_tabs_stay_in_range() {
        let mut rng = GridRng::new(99);
        for _ in 0..1000 {
            let tab = EdgeTab::random(&mut rng);
            assert!(tab.position() > TAB_POSITION_MIN);
            assert!(tab.position() < TAB_POSITION_MAX);
            assert!(EdgeTab::new(tab.value()).is_ok());
        }
    }

    #[test]
    fn shared_edge_centers_coincide() {
        // A right edge and its neighbor's left edge must place the tab at the same height.
        let tab = EdgeTab::new(0.4).unwrap();
        let right_from_top = tab.offset_along(Side::Right, 100.0);
        let left_from_bottom = tab.complement().offset_along(Side::Left, 100.0);
        assert!((right_from_top - 40.0).abs() < 1e-4);
        assert!((100.0 - left_from_bottom - 40.0).abs() < 1e-4);
    }
}
