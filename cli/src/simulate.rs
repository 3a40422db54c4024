use camjigsaw_core::{
    format_elapsed, BoardRect, FrameSource, GameConfig, GameEvent, GeometricResolver, GridRng,
    HitResolver, HitStrategy, InteractionController, MaskResolver, Piece, PieceId, Point,
    PointerAction, PuzzleSession, RasterImage, RasterSurface, RenderPipeline,
};

const MOVE_INTERVAL_MS: f64 = 1000.0;
const PROBES_PER_AXIS: u32 = 9;
const FRAME_FILL: [u8; 4] = [90, 120, 200, 255];

pub struct SimulationParams {
    pub config: GameConfig,
    pub seed: u32,
    pub surface_width: u32,
    pub surface_height: u32,
    pub frame_width: u32,
    pub frame_height: u32,
}

#[derive(Debug, Default)]
pub struct SimulationReport {
    pub moves: usize,
    pub snaps: usize,
    pub solved_after_ms: Option<f64>,
}

impl SimulationReport {
    pub fn clock(&self) -> Option<String> {
        self.solved_after_ms.map(format_elapsed)
    }
}

/// Solves a scattered board by dragging one piece per step, rendering the
/// identity mask between steps the same way the browser does.
pub fn run(params: &SimulationParams) -> Result<SimulationReport, Box<dyn std::error::Error>> {
    let config = &params.config;
    let surface_width = params.surface_width as f32;
    let surface_height = params.surface_height as f32;
    let board = BoardRect::fit(
        surface_width,
        surface_height,
        params.frame_width as f32,
        params.frame_height as f32,
        config.board_scale,
    )?;
    let mut session = PuzzleSession::new(config.difficulty, board, GridRng::new(params.seed))?;
    let mut now = 0.0;
    session.restart(now, surface_width, surface_height);

    let controller = InteractionController::from_config(config);
    let pipeline = RenderPipeline::from_config(config);
    let frame = RasterImage::filled(params.frame_width, params.frame_height, FRAME_FILL);
    let source = FrameSource {
        image: &frame,
        width: params.frame_width as f32,
        height: params.frame_height as f32,
    };
    let mut visible = RasterSurface::new(params.surface_width, params.surface_height);
    let mut mask = RasterSurface::new(params.surface_width, params.surface_height);

    let mut report = SimulationReport::default();
    let max_moves = session.pieces().len() * 4;
    let mut prefer = None;
    while !session.is_solved() && report.moves < max_moves {
        let preferred = prefer.take();
        let grab = match config.hit_strategy {
            HitStrategy::Mask => {
                pipeline.frame(&session, &mut visible, Some(&mut mask), source, now);
                find_grab(&session, &MaskResolver::new(&mask), preferred)
            }
            HitStrategy::Geometric => {
                pipeline.frame::<_, RasterSurface>(&session, &mut visible, None, source, now);
                find_grab(&session, &GeometricResolver, preferred)
            }
        };
        let (at, target) = match grab {
            Some(Grab::Place(id, at)) => {
                let Some(piece) = session.piece(id) else {
                    break;
                };
                (at, at + (piece.home() - piece.position))
            }
            Some(Grab::Uncover { cover, buried, at }) => {
                let (Some(piece), Some(hidden)) = (session.piece(cover), session.piece(buried)) else {
                    break;
                };
                tracing::debug!(piece = cover.0, buried = buried.0, "lifting a piece off a hidden one");
                let parking = farthest_corner(piece, hidden.position, surface_width, surface_height);
                prefer = Some(buried);
                (at, at + (parking - piece.position))
            }
            None => {
                tracing::warn!(moves = report.moves, "no loose piece left to grab");
                break;
            }
        };

        let mut events = Vec::new();
        for action in [
            PointerAction::Down(at),
            PointerAction::Move(target),
            PointerAction::Up,
        ] {
            match config.hit_strategy {
                HitStrategy::Mask => events.extend(controller.handle(
                    &mut session,
                    &MaskResolver::new(&mask),
                    action,
                    now,
                )),
                HitStrategy::Geometric => {
                    events.extend(controller.handle(&mut session, &GeometricResolver, action, now))
                }
            }
        }
        report.moves += 1;
        for event in events {
            match event {
                GameEvent::PieceSnapped(id) => {
                    report.snaps += 1;
                    tracing::debug!(piece = id.0, "snapped");
                }
                GameEvent::PuzzleSolved { elapsed_ms } => report.solved_after_ms = Some(elapsed_ms),
            }
        }
        now += MOVE_INTERVAL_MS;
    }
    Ok(report)
}

enum Grab {
    /// A loose piece and a point that picks it.
    Place(PieceId, Point),
    /// `cover` hides every probe point of the loose piece `buried`.
    Uncover {
        cover: PieceId,
        buried: PieceId,
        at: Point,
    },
}

/// Topmost loose piece with a probe point that resolves back to itself,
/// trying `preferred` first. When every loose piece is buried, names the
/// piece on top of the topmost one.
fn find_grab<R: HitResolver + ?Sized>(
    session: &PuzzleSession,
    resolver: &R,
    preferred: Option<PieceId>,
) -> Option<Grab> {
    let pieces = session.pieces();
    let index = session.identity_index();
    let reach = |piece: &Piece| {
        probe_points(piece)
            .find(|at| resolver.resolve(pieces, index, *at) == Some(piece.id))
            .map(|at| Grab::Place(piece.id, at))
    };

    if let Some(grab) = preferred
        .and_then(|id| session.piece(id))
        .filter(|piece| !piece.correct)
        .and_then(|piece| reach(piece))
    {
        return Some(grab);
    }

    let mut loose = pieces.iter().rev().filter(|piece| !piece.correct).peekable();
    let buried = *loose.peek()?;
    loose.find_map(|piece| reach(piece)).or_else(|| {
        probe_points(buried).find_map(|at| {
            resolver
                .resolve(pieces, index, at)
                .filter(|id| *id != buried.id)
                .map(|cover| Grab::Uncover {
                    cover,
                    buried: buried.id,
                    at,
                })
        })
    })
}

fn farthest_corner(piece: &Piece, away_from: Point, surface_width: f32, surface_height: f32) -> Point {
    let max_x = (surface_width - piece.width()).max(0.0);
    let max_y = (surface_height - piece.height()).max(0.0);
    [
        Point::new(0.0, 0.0),
        Point::new(max_x, 0.0),
        Point::new(0.0, max_y),
        Point::new(max_x, max_y),
    ]
    .into_iter()
    .fold(Point::new(0.0, 0.0), |best, corner| {
        if corner.distance(away_from) > best.distance(away_from) {
            corner
        } else {
            best
        }
    })
}

fn probe_points(piece: &Piece) -> impl Iterator<Item = Point> + '_ {
    let step_x = piece.width() / (PROBES_PER_AXIS + 1) as f32;
    let step_y = piece.height() / (PROBES_PER_AXIS + 1) as f32;
    (1..=PROBES_PER_AXIS).flat_map(move |row| {
        (1..=PROBES_PER_AXIS).map(move |col| {
            piece.position + Point::new(step_x * col as f32, step_y * row as f32)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use camjigsaw_core::Difficulty;

    fn params(strategy: HitStrategy) -> SimulationParams {
        SimulationParams {
            config: GameConfig {
                hit_strategy: strategy,
                difficulty: Difficulty::Easy,
                ..GameConfig::default()
            },
            seed: 7,
            surface_width: 320,
            surface_height: 240,
            frame_width: 64,
            frame_height: 48,
        }
    }

    #[test]
    fn mask_strategy_solves_easy_board() {
        let report = run(&params(HitStrategy::Mask)).unwrap();
        assert!(report.solved_after_ms.is_some());
        assert!(report.snaps >= 9);
        assert!(report.clock().is_some());
    }

    #[test]
    fn geometric_strategy_solves_easy_board() {
        let report = run(&params(HitStrategy::Geometric)).unwrap();
        assert!(report.solved_after_ms.is_some());
        assert!(report.snaps >= 9);
        assert!(report.moves >= report.snaps);
    }
}
