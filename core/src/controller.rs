use crate::action::{GameEvent, PointerAction};
use crate::config::GameConfig;
use crate::geom::Point;
use crate::hit::HitResolver;
use crate::piece::{PieceId, SNAP_DISTANCE_RATIO};
use crate::session::{PuzzleSession, Selection};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControllerState {
    Idle,
    Dragging(PieceId),
}

/// Pick-up, drag and release over a [`PuzzleSession`].
#[derive(Clone, Copy, Debug)]
pub struct InteractionController {
    snap_ratio: f32,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(SNAP_DISTANCE_RATIO)
    }
}

impl InteractionController {
    pub fn new(snap_ratio: f32) -> Self {
        Self { snap_ratio }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.snap_distance_ratio)
    }

    pub fn state(&self, session: &PuzzleSession) -> ControllerState {
        match session.selection() {
            Some(selection) => ControllerState::Dragging(selection.piece),
            None => ControllerState::Idle,
        }
    }

    pub fn handle<R: HitResolver + ?Sized>(
        &self,
        session: &mut PuzzleSession,
        resolver: &R,
        action: PointerAction,
        now_ms: f64,
    ) -> Vec<GameEvent> {
        match action {
            PointerAction::Down(at) => {
                self.pointer_down(session, resolver, at);
                Vec::new()
            }
            PointerAction::Move(at) => {
                self.pointer_move(session, at);
                Vec::new()
            }
            PointerAction::Up => self.pointer_up(session, now_ms),
        }
    }

    /// Picks the topmost piece under `at`, raises it and starts dragging.
    /// A miss leaves the controller idle.
    pub fn pointer_down<R: HitResolver + ?Sized>(
        &self,
        session: &mut PuzzleSession,
        resolver: &R,
        at: Point,
    ) -> Option<PieceId> {
        session.set_selection(None);
        let id = resolver.resolve(session.pieces(), session.identity_index(), at)?;
        session.bring_to_front(id);
        let piece = session.piece_mut(id)?;
        piece.correct = false;
        let offset = at - piece.position;
        session.set_selection(Some(Selection { piece: id, offset }));
        tracing::trace!(piece = id.0, x = at.x, y = at.y, "piece picked up");
        Some(id)
    }

    pub fn pointer_move(&self, session: &mut PuzzleSession, at: Point) -> bool {
        let Some(selection) = session.selection() else {
            return false;
        };
        match session.piece_mut(selection.piece) {
            Some(piece) => {
                piece.position = at - selection.offset;
                true
            }
            None => false,
        }
    }

    /// Drops the held piece, snapping it home when close enough, then checks
    /// for completion. Always returns to idle.
    pub fn pointer_up(&self, session: &mut PuzzleSession, now_ms: f64) -> Vec<GameEvent> {
        let Some(selection) = session.selection() else {
            return Vec::new();
        };
        session.set_selection(None);
        let mut events = Vec::new();
        if let Some(piece) = session.piece_mut(selection.piece) {
            if piece.is_within_snap(self.snap_ratio) {
                events.push(piece.snap_home());
                tracing::debug!(piece = selection.piece.0, "piece snapped home");
            }
        }
        events.extend(session.check_completion(now_ms));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Rect;
    use crate::grid::Difficulty;
    use crate::hit::GeometricResolver;
    use crate::rng::GridRng;

    #[test]
    fn drag_follows_grab_offset() {
        let mut session = PuzzleSession::new(
            Difficulty::Easy,
            Rect::new(0.0, 0.0, 300.0, 300.0),
            GridRng::new(5),
        )
        .unwrap();
        let controller = InteractionController::default();
        let picked = controller.pointer_down(&mut session, &GeometricResolver, Point::new(10.0, 20.0));
        assert_eq!(picked, Some(PieceId(0)));
        assert_eq!(controller.state(&session), ControllerState::Dragging(PieceId(0)));
        assert!(controller.pointer_move(&mut session, Point::new(510.0, 420.0)));
        let piece = session.piece(PieceId(0)).unwrap();
        assert_eq!(piece.position, Point::new(500.0, 400.0));
        assert!(!piece.correct);
        let events = controller.pointer_up(&mut session, 0.0);
        assert!(events.is_empty());
        assert_eq!(controller.state(&session), ControllerState::Idle);
    }
}
