use crate::action::GameEvent;
use crate::error::Result;
use crate::geom::{Point, Rect};
use crate::grid::{generate_pieces, scatter_pieces, Difficulty, PuzzleConfig};
use crate::hit::IdentityIndex;
use crate::piece::{Piece, PieceId};
use crate::rng::GridRng;

/// Piece held by the pointer and the grab point relative to its origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    pub piece: PieceId,
    pub offset: Point,
}

/// State of one puzzle: grid, pieces in z-order, selection and timing.
pub struct PuzzleSession {
    difficulty: Difficulty,
    config: PuzzleConfig,
    pieces: Vec<Piece>,
    index: IdentityIndex,
    selection: Option<Selection>,
    start_ms: Option<f64>,
    end_ms: Option<f64>,
    rng: GridRng,
}

impl PuzzleSession {
    /// Generates the tier's grid with every piece at home and no timer.
    pub fn new(difficulty: Difficulty, board: Rect, mut rng: GridRng) -> Result<Self> {
        let config = PuzzleConfig::for_difficulty(difficulty, board)?;
        let pieces = generate_pieces(&config, &mut rng);
        let index = IdentityIndex::build(&pieces);
        Ok(Self {
            difficulty,
            config,
            pieces,
            index,
            selection: None,
            start_ms: None,
            end_ms: None,
            rng,
        })
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    /// Pieces in z-order; the last one is drawn on top.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn identity_index(&self) -> &IdentityIndex {
        &self.index
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.id == id)
    }

    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.iter_mut().find(|piece| piece.id == id)
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub(crate) fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn start_ms(&self) -> Option<f64> {
        self.start_ms
    }

    pub fn end_ms(&self) -> Option<f64> {
        self.end_ms
    }

    pub fn is_solved(&self) -> bool {
        self.end_ms.is_some()
    }

    /// Reshuffles the current pieces over the surface and restarts the clock.
    /// Edge shapes are kept.
    pub fn restart(&mut self, now_ms: f64, surface_width: f32, surface_height: f32) {
        scatter_pieces(&mut self.pieces, surface_width, surface_height, &mut self.rng);
        self.selection = None;
        self.start_ms = Some(now_ms);
        self.end_ms = None;
        tracing::info!(
            difficulty = %self.difficulty,
            pieces = self.pieces.len(),
            "puzzle restarted"
        );
    }

    /// Begins a game on `difficulty`. The grid is only regenerated when the
    /// tier changes; starting the same tier again keeps every edge shape and
    /// identity color and just reshuffles. Returns whether it regenerated.
    pub fn start(
        &mut self,
        difficulty: Difficulty,
        now_ms: f64,
        surface_width: f32,
        surface_height: f32,
    ) -> Result<bool> {
        let regenerate = difficulty != self.difficulty;
        if regenerate {
            self.set_difficulty(difficulty)?;
        }
        self.restart(now_ms, surface_width, surface_height);
        Ok(regenerate)
    }

    /// Regenerates the grid for `difficulty` with fresh edges and identity
    /// colors. Pieces start at home and the clock is cleared.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<()> {
        let config = PuzzleConfig::for_difficulty(difficulty, self.config.board)?;
        self.pieces = generate_pieces(&config, &mut self.rng);
        self.index = IdentityIndex::build(&self.pieces);
        self.config = config;
        self.difficulty = difficulty;
        self.selection = None;
        self.start_ms = None;
        self.end_ms = None;
        tracing::debug!(difficulty = %difficulty, "difficulty changed");
        Ok(())
    }

    /// Moves the board. Homes and sizes follow the grid math, loose pieces
    /// keep their place relative to the board.
    pub fn relayout(&mut self, board: Rect) -> Result<()> {
        let config = self.config.with_board(board)?;
        let old = self.config.board;
        let scale_x = board.width / old.width;
        let scale_y = board.height / old.height;
        let (width, height) = config.piece_size();
        for piece in &mut self.pieces {
            let home = config.home_of(piece.row, piece.col);
            piece.place_on_grid(home, width, height);
            piece.position = if piece.correct {
                home
            } else {
                Point::new(
                    board.x + (piece.position.x - old.x) * scale_x,
                    board.y + (piece.position.y - old.y) * scale_y,
                )
            };
        }
        if let Some(selection) = self.selection.as_mut() {
            selection.offset = Point::new(selection.offset.x * scale_x, selection.offset.y * scale_y);
        }
        self.config = config;
        Ok(())
    }

    /// Moves the piece to the end of the z-order. Returns false when it was
    /// already topmost or is unknown.
    pub fn bring_to_front(&mut self, id: PieceId) -> bool {
        let Some(index) = self.pieces.iter().position(|piece| piece.id == id) else {
            return false;
        };
        if index + 1 == self.pieces.len() {
            return false;
        }
        let piece = self.pieces.remove(index);
        self.pieces.push(piece);
        true
    }

    pub fn is_complete(&self) -> bool {
        self.pieces.iter().all(|piece| piece.correct)
    }

    /// Records the end time the first time a started puzzle is found complete.
    ///
    /// Before the first [`restart`](Self::restart) the board is an assembled
    /// preview behind the menu with no clock, so nothing can be solved yet.
    pub fn check_completion(&mut self, now_ms: f64) -> Option<GameEvent> {
        if self.end_ms.is_some() {
            return None;
        }
        let start = self.start_ms?;
        if !self.is_complete() {
            return None;
        }
        self.end_ms = Some(now_ms);
        let elapsed_ms = now_ms - start;
        tracing::info!(difficulty = %self.difficulty, elapsed_ms, "puzzle solved");
        Some(GameEvent::PuzzleSolved { elapsed_ms })
    }

    /// Running time while unsolved, frozen once solved.
    pub fn elapsed_ms(&self, now_ms: f64) -> Option<f64> {
        let start = self.start_ms?;
        Some(self.end_ms.unwrap_or(now_ms) - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> PuzzleSession {
        PuzzleSession::new(
            Difficulty::Easy,
            Rect::new(0.0, 0.0, 300.0, 300.0),
            GridRng::new(11),
        )
        .unwrap()
    }

    #[test]
    fn new_session_is_assembled_without_clock() {
        let session = session();
        assert_eq!(session.pieces().len(), 9);
        assert!(session.is_complete());
        assert_eq!(session.elapsed_ms(100.0), None);
        assert_eq!(session.identity_index().len(), 9);
    }

    #[test]
    fn restart_keeps_edges_and_starts_clock() {
        let mut session = session();
        let edges: Vec<_> = session.pieces().iter().map(|p| *p.edges()).collect();
        session.restart(1_000.0, 800.0, 600.0);
        let after: Vec<_> = session.pieces().iter().map(|p| *p.edges()).collect();
        assert_eq!(edges, after);
        assert!(!session.is_complete());
        assert_eq!(session.elapsed_ms(1_500.0), Some(500.0));
    }

    #[test]
    fn set_difficulty_regenerates() {
        let mut session = session();
        session.restart(0.0, 800.0, 600.0);
        session.set_difficulty(Difficulty::Medium).unwrap();
        assert_eq!(session.pieces().len(), 25);
        assert_eq!(session.config().rows, 5);
        assert!(session.is_complete());
        assert_eq!(session.start_ms(), None);
    }

    #[test]
    fn completion_waits_for_first_start() {
        let mut session = session();
        assert!(session.is_complete());
        assert_eq!(session.check_completion(50.0), None);
        assert_eq!(session.end_ms(), None);

        session.restart(100.0, 800.0, 600.0);
        for id in 0..9 {
            session.piece_mut(PieceId(id)).unwrap().snap_home();
        }
        assert_eq!(
            session.check_completion(700.0),
            Some(GameEvent::PuzzleSolved { elapsed_ms: 600.0 })
        );
    }

    #[test]
    fn same_tier_start_keeps_shapes() {
        let mut session = session();
        let edges = |session: &PuzzleSession| -> Vec<_> {
            session.pieces().iter().map(|p| (p.id, *p.edges(), p.identity())).collect()
        };
        let mut before = edges(&session);
        assert!(!session.start(Difficulty::Easy, 0.0, 800.0, 600.0).unwrap());
        assert!(!session.is_complete());
        let mut first = edges(&session);
        assert!(!session.start(Difficulty::Easy, 5_000.0, 800.0, 600.0).unwrap());
        let mut second = edges(&session);
        for list in [&mut before, &mut first, &mut second] {
            list.sort_by_key(|entry| entry.0);
        }
        assert_eq!(before, first);
        assert_eq!(first, second);
        assert_eq!(session.start_ms(), Some(5_000.0));
    }

    #[test]
    fn tier_change_start_regenerates() {
        let mut session = session();
        assert!(session.start(Difficulty::Medium, 0.0, 800.0, 600.0).unwrap());
        assert_eq!(session.difficulty(), Difficulty::Medium);
        assert_eq!(session.pieces().len(), 25);
        assert!(!session.is_complete());
        assert_eq!(session.start_ms(), Some(0.0));
        assert!(!session.start(Difficulty::Medium, 10.0, 800.0, 600.0).unwrap());
        assert!(session.start(Difficulty::Easy, 20.0, 800.0, 600.0).unwrap());
        assert_eq!(session.pieces().len(), 9);
    }

    #[test]
    fn relayout_moves_homes_and_keeps_correct_pieces_home() {
        let mut session = session();
        session.piece_mut(PieceId(0)).unwrap().position = Point::new(150.0, 30.0);
        session.piece_mut(PieceId(0)).unwrap().correct = false;
        session.relayout(Rect::new(100.0, 50.0, 600.0, 600.0)).unwrap();
        let moved = session.piece(PieceId(0)).unwrap();
        assert_eq!(moved.position, Point::new(400.0, 110.0));
        assert_eq!(moved.width(), 200.0);
        let settled = session.piece(PieceId(4)).unwrap();
        assert_eq!(settled.position, Point::new(300.0, 250.0));
        assert_eq!(settled.position, settled.home());
    }
}
