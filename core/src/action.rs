use crate::geom::Point;
use crate::piece::PieceId;

/// Location-only input shape the controller consumes. Mouse and touch
/// events are both normalized into this before dispatch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerAction {
    Down(Point),
    Move(Point),
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Maps a touch event to a pointer action using only its first contact.
///
/// Start and move without any contact point are dropped. End and cancel
/// never carry a usable point and always release.
pub fn normalize_touch(phase: TouchPhase, first_contact: Option<Point>) -> Option<PointerAction> {
    match phase {
        TouchPhase::Start => first_contact.map(PointerAction::Down),
        TouchPhase::Move => first_contact.map(PointerAction::Move),
        TouchPhase::End | TouchPhase::Cancel => Some(PointerAction::Up),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    PieceSnapped(PieceId),
    PuzzleSolved { elapsed_ms: f64 },
}
