use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::edge::{EdgeSet, EdgeTab};
use crate::error::{PuzzleError, Result};
use crate::geom::{Point, Rect};
use crate::piece::{IdentityColor, Piece, PieceId};
use crate::rng::GridRng;

/// Black is the outline stroke color on the mask surface, never an identity.
const RESERVED_IDENTITY: IdentityColor = IdentityColor::new(0, 0, 0);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Insane,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Insane,
    ];

    /// `(rows, cols)` for the tier.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Difficulty::Easy => (3, 3),
            Difficulty::Medium => (5, 5),
            Difficulty::Hard => (10, 10),
            Difficulty::Insane => (40, 25),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Insane => "insane",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Insane => "Insane",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = PuzzleError;

    fn from_str(value: &str) -> Result<Self> {
        let needle = value.trim();
        Difficulty::ALL
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| PuzzleError::UnknownDifficulty(value.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PuzzleConfig {
    pub rows: u32,
    pub cols: u32,
    pub board: Rect,
}

impl PuzzleConfig {
    pub fn new(rows: u32, cols: u32, board: Rect) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(PuzzleError::InvalidGrid { rows, cols });
        }
        if !board.is_valid() {
            return Err(PuzzleError::InvalidBoard {
                width: board.width,
                height: board.height,
            });
        }
        Ok(Self { rows, cols, board })
    }

    pub fn for_difficulty(difficulty: Difficulty, board: Rect) -> Result<Self> {
        let (rows, cols) = difficulty.dimensions();
        Self::new(rows, cols, board)
    }

    pub fn with_board(&self, board: Rect) -> Result<Self> {
        Self::new(self.rows, self.cols, board)
    }

    pub fn piece_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub fn piece_size(&self) -> (f32, f32) {
        (
            self.board.width / self.cols as f32,
            self.board.height / self.rows as f32,
        )
    }

    pub fn home_of(&self, row: u32, col: u32) -> Point {
        Point::new(
            self.board.x + self.board.width * col as f32 / self.cols as f32,
            self.board.y + self.board.height * row as f32 / self.rows as f32,
        )
    }
}

/// Board placement inside the viewport.
pub type BoardRect = Rect;

impl BoardRect {
    /// Scales the camera frame to fit the viewport, shrinks it by `scale`
    /// and centers the result.
    pub fn fit(view_width: f32, view_height: f32, frame_width: f32, frame_height: f32, scale: f32) -> Result<Rect> {
        if !(frame_width > 0.0 && frame_height > 0.0) {
            return Err(PuzzleError::InvalidBoard {
                width: frame_width,
                height: frame_height,
            });
        }
        let fit = scale * (view_width / frame_width).min(view_height / frame_height);
        let width = frame_width * fit;
        let height = frame_height * fit;
        let board = Rect::new(
            (view_width - width) * 0.5,
            (view_height - height) * 0.5,
            width,
            height,
        );
        if !board.is_valid() {
            return Err(PuzzleError::InvalidBoard { width, height });
        }
        Ok(board)
    }
}

/// Builds `rows * cols` pieces in row-major order, each at its home.
pub fn generate_pieces(config: &PuzzleConfig, rng: &mut GridRng) -> Vec<Piece> {
    let rows = config.rows as usize;
    let cols = config.cols as usize;
    let (width, height) = config.piece_size();
    let mut edges = vec![EdgeSet::default(); rows * cols];

    for row in 0..rows {
        for col in 0..cols.saturating_sub(1) {
            let tab = EdgeTab::random(rng);
            edges[row * cols + col].right = Some(tab);
            edges[row * cols + col + 1].left = Some(tab.complement());
        }
    }
    for row in 0..rows.saturating_sub(1) {
        for col in 0..cols {
            let tab = EdgeTab::random(rng);
            edges[row * cols + col].bottom = Some(tab);
            edges[(row + 1) * cols + col].top = Some(tab.complement());
        }
    }

    let mut used = HashSet::with_capacity(config.piece_count() + 1);
    used.insert(RESERVED_IDENTITY.key());
    let pieces: Vec<Piece> = edges
        .into_iter()
        .enumerate()
        .map(|(index, edge_set)| {
            let row = (index / cols) as u32;
            let col = (index % cols) as u32;
            let identity = draw_identity(rng, &mut used);
            Piece::new(
                PieceId(index as u32),
                row,
                col,
                config.home_of(row, col),
                width,
                height,
                edge_set,
                identity,
            )
        })
        .collect();

    tracing::debug!(
        rows = config.rows,
        cols = config.cols,
        piece_width = width,
        piece_height = height,
        "generated puzzle grid"
    );
    pieces
}

fn draw_identity(rng: &mut GridRng, used: &mut HashSet<u32>) -> IdentityColor {
    loop {
        let color = IdentityColor::new(rng.byte(), rng.byte(), rng.byte());
        if used.insert(color.key()) {
            return color;
        }
    }
}

/// Drops every piece at a uniformly random spot that keeps its rectangle
/// inside the surface.
pub fn scatter_pieces(pieces: &mut [Piece], surface_width: f32, surface_height: f32, rng: &mut GridRng) {
    for piece in pieces.iter_mut() {
        let span_x = (surface_width - piece.width()).max(0.0);
        let span_y = (surface_height - piece.height()).max(0.0);
        piece.position = Point::new(rng.unit() * span_x, rng.unit() * span_y);
        piece.correct = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Rect {
        Rect::new(10.0, 20.0, 300.0, 200.0)
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Insane".parse::<Difficulty>().unwrap(), Difficulty::Insane);
        assert_eq!(" easy ".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert!("nightmare".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Insane.dimensions(), (40, 25));
    }

    #[test]
    fn rejects_empty_grid_and_board() {
        assert!(PuzzleConfig::new(0, 3, board()).is_err());
        assert!(PuzzleConfig::new(3, 3, Rect::new(0.0, 0.0, 0.0, 10.0)).is_err());
    }

    #[test]
    fn home_positions_follow_grid_math() {
        let config = PuzzleConfig::new(2, 3, board()).unwrap();
        assert_eq!(config.piece_size(), (100.0, 100.0));
        assert_eq!(config.home_of(1, 2), Point::new(210.0, 120.0));
        let pieces = generate_pieces(&config, &mut GridRng::new(1));
        assert_eq!(pieces.len(), 6);
        assert_eq!(pieces[5].home(), Point::new(210.0, 120.0));
        assert!(pieces.iter().all(|piece| piece.correct && piece.position == piece.home()));
    }

    #[test]
    fn board_fit_is_centered() {
        let rect = BoardRect::fit(1000.0, 800.0, 640.0, 480.0, 0.6).unwrap();
        let scale = 0.6 * (1000.0f32 / 640.0).min(800.0 / 480.0);
        assert!((rect.width - 640.0 * scale).abs() < 1e-3);
        assert!((rect.x - (1000.0 - rect.width) / 2.0).abs() < 1e-3);
        assert!((rect.y - (800.0 - rect.height) / 2.0).abs() < 1e-3);
        assert!(BoardRect::fit(1000.0, 800.0, 0.0, 480.0, 0.6).is_err());
    }

    #[test]
    fn scatter_keeps_pieces_on_surface() {
        let config = PuzzleConfig::new(4, 4, board()).unwrap();
        let mut rng = GridRng::new(3);
        let mut pieces = generate_pieces(&config, &mut rng);
        scatter_pieces(&mut pieces, 320.0, 240.0, &mut rng);
        for piece in &pieces {
            assert!(!piece.correct);
            assert!(piece.position.x >= 0.0 && piece.position.x <= 320.0 - piece.width());
            assert!(piece.position.y >= 0.0 && piece.position.y <= 240.0 - piece.height());
        }
    }
}
