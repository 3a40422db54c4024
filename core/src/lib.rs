pub mod action;
pub mod config;
pub mod controller;
pub mod edge;
pub mod error;
pub mod geom;
pub mod grid;
pub mod hit;
pub mod melody;
pub mod piece;
pub mod render;
pub mod rng;
pub mod scores;
pub mod session;
pub mod surface;

pub use action::{normalize_touch, GameEvent, PointerAction, TouchPhase};
pub use config::GameConfig;
pub use controller::{ControllerState, InteractionController};
pub use edge::{EdgeSet, EdgeTab, Side, TabMetrics};
pub use error::{PuzzleError, Result};
pub use geom::{Point, Rect};
pub use grid::{generate_pieces, scatter_pieces, BoardRect, Difficulty, PuzzleConfig};
pub use hit::{GeometricResolver, HitResolver, HitStrategy, IdentityIndex, MaskResolver};
pub use piece::{IdentityColor, Outline, PathCommand, Piece, PieceId};
pub use render::{format_elapsed, FrameSource, RenderPipeline};
pub use rng::GridRng;
pub use scores::{Leaderboard, ScoreEntry, ScoreSubmission};
pub use session::{PuzzleSession, Selection};
pub use surface::{MaskSampler, Paint, RasterImage, RasterSurface, SourceImage, Surface};
