mod logging;
mod simulate;

use std::fs;
use std::path::PathBuf;

use camjigsaw_core::{
    generate_pieces, Difficulty, EdgeTab, GameConfig, GridRng, HitStrategy, Leaderboard, Piece,
    PuzzleConfig, Rect, ScoreSubmission, TabMetrics,
};
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use rand::Rng;

use crate::logging::init_logging;
use crate::simulate::SimulationParams;

#[derive(Parser)]
#[command(
    name = "camjigsaw-cli",
    version,
    about = "Inspect, export and auto-solve camjigsaw boards"
)]
struct Cli {
    /// TOML file with game settings; missing keys keep their defaults.
    #[arg(long, global = true, env = "CAMJIGSAW_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the edge table of a generated grid.
    Generate {
        #[command(flatten)]
        grid: GridArgs,
    },
    /// Write the piece outlines as an SVG, filled with identity colors.
    Svg {
        #[command(flatten)]
        grid: GridArgs,
        /// Output file; stdout when omitted.
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Scatter a board and solve it through the pointer controller.
    Simulate {
        #[arg(long)]
        difficulty: Option<Difficulty>,
        #[arg(long)]
        strategy: Option<HitStrategy>,
        #[arg(long)]
        seed: Option<String>,
        #[arg(long, default_value_t = 1024)]
        width: u32,
        #[arg(long, default_value_t = 768)]
        height: u32,
        #[arg(long, default_value_t = 640)]
        frame_width: u32,
        #[arg(long, default_value_t = 480)]
        frame_height: u32,
    },
    Scores {
        #[command(subcommand)]
        command: ScoreCommand,
    },
}

#[derive(Subcommand)]
enum ScoreCommand {
    /// Print a leaderboard JSON document, one ranked table per tier.
    Show { file: PathBuf },
    /// Print the submission URL for a finished run.
    Url {
        #[arg(long, env = "CAMJIGSAW_BASE_URL", default_value = "http://localhost:8080/")]
        base: String,
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        time_ms: u64,
        #[arg(long, default_value_t = Difficulty::Easy)]
        difficulty: Difficulty,
    },
}

#[derive(Args)]
struct GridArgs {
    #[arg(long, conflicts_with_all = ["rows", "cols"])]
    difficulty: Option<Difficulty>,
    #[arg(long, requires = "cols")]
    rows: Option<u32>,
    #[arg(long, requires = "rows")]
    cols: Option<u32>,
    #[arg(long)]
    seed: Option<String>,
    /// Board width in pixels.
    #[arg(long, default_value_t = 600.0)]
    width: f32,
    /// Board height in pixels.
    #[arg(long, default_value_t = 600.0)]
    height: f32,
}

impl GridArgs {
    fn puzzle_config(&self, fallback: Difficulty) -> camjigsaw_core::Result<PuzzleConfig> {
        let board = Rect::new(0.0, 0.0, self.width, self.height);
        match (self.rows, self.cols) {
            (Some(rows), Some(cols)) => PuzzleConfig::new(rows, cols, board),
            _ => PuzzleConfig::for_difficulty(self.difficulty.unwrap_or(fallback), board),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let flags_given = cli.verbosity.is_present();
    init_logging(cli.verbosity.tracing_level_filter(), flags_given);
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Generate { grid } => {
            let seed = resolve_seed(grid.seed.as_deref())?;
            let puzzle = grid.puzzle_config(config.difficulty)?;
            let pieces = generate_pieces(&puzzle, &mut GridRng::new(seed));
            println!(
                "seed 0x{seed:08x}, {} x {} grid, {} pieces",
                puzzle.rows,
                puzzle.cols,
                pieces.len()
            );
            println!("{:>5} {:>4} {:>4} {:>7} {:>7} {:>7} {:>7} {:>5}  color", "id", "row", "col", "top", "right", "bottom", "left", "flat");
            for piece in &pieces {
                let edges = piece.edges();
                println!(
                    "{:>5} {:>4} {:>4} {:>7} {:>7} {:>7} {:>7} {:>5}  {}",
                    piece.id.0,
                    piece.row,
                    piece.col,
                    edge_label(edges.top),
                    edge_label(edges.right),
                    edge_label(edges.bottom),
                    edge_label(edges.left),
                    edges.flat_count(),
                    piece.identity().to_css()
                );
            }
        }
        Commands::Svg { grid, out } => {
            let seed = resolve_seed(grid.seed.as_deref())?;
            let puzzle = grid.puzzle_config(config.difficulty)?;
            let pieces = generate_pieces(&puzzle, &mut GridRng::new(seed));
            let svg = render_svg(&puzzle, &pieces, config.stroke_width);
            match out {
                Some(path) => {
                    fs::write(&path, svg)?;
                    tracing::info!(path = %path.display(), pieces = pieces.len(), "wrote outlines");
                }
                None => print!("{svg}"),
            }
        }
        Commands::Simulate {
            difficulty,
            strategy,
            seed,
            width,
            height,
            frame_width,
            frame_height,
        } => {
            let seed = resolve_seed(seed.as_deref())?;
            let mut config = config;
            if let Some(difficulty) = difficulty {
                config.difficulty = difficulty;
            }
            if let Some(strategy) = strategy {
                config.hit_strategy = strategy;
            }
            let params = SimulationParams {
                config,
                seed,
                surface_width: width,
                surface_height: height,
                frame_width,
                frame_height,
            };
            let report = simulate::run(&params)?;
            println!(
                "{} {} via {} hits, seed 0x{seed:08x}",
                params.config.difficulty.label(),
                params.config.difficulty.name(),
                params.config.hit_strategy.name()
            );
            println!("moves: {}, snaps: {}", report.moves, report.snaps);
            match report.clock() {
                Some(clock) => println!("solved in {clock}"),
                None => println!("not solved"),
            }
        }
        Commands::Scores { command } => match command {
            ScoreCommand::Show { file } => {
                let raw = fs::read_to_string(&file)?;
                let board = Leaderboard::from_json(&raw)?;
                for difficulty in Difficulty::ALL {
                    println!("{}", difficulty.label());
                    let rows = board.rows(difficulty);
                    if rows.is_empty() {
                        println!("  (no entries)");
                    }
                    for row in rows {
                        println!("  {row}");
                    }
                }
            }
            ScoreCommand::Url {
                base,
                endpoint,
                name,
                time_ms,
                difficulty,
            } => {
                let endpoint = endpoint.unwrap_or(config.score_endpoint);
                let submission = ScoreSubmission::new(&name, time_ms as f64, difficulty)?;
                println!("{}", submission.request_url(&base, &endpoint)?);
            }
        },
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let raw = fs::read_to_string(path)?;
    let config: GameConfig = toml::from_str(&raw)?;
    tracing::debug!(path = %path.display(), "loaded settings");
    Ok(config.validated())
}

fn resolve_seed(raw: Option<&str>) -> Result<u32, Box<dyn std::error::Error>> {
    match raw {
        Some(raw) => parse_seed_arg(raw),
        None => Ok(rand::rng().random::<u32>()),
    }
}

fn parse_seed_arg(raw: &str) -> Result<u32, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    let value = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)?
    } else {
        trimmed.parse::<u32>()?
    };
    Ok(value)
}

fn edge_label(edge: Option<EdgeTab>) -> String {
    match edge {
        Some(edge) => format!("{:+.3}", edge.value()),
        None => "flat".to_string(),
    }
}

fn render_svg(puzzle: &PuzzleConfig, pieces: &[Piece], stroke_width: f32) -> String {
    let (piece_width, piece_height) = puzzle.piece_size();
    let margin = TabMetrics::for_piece(piece_width, piece_height).height;
    let view = puzzle.board.inflate(margin);
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{:.3} {:.3} {:.3} {:.3}\">\n",
        view.x, view.y, view.width, view.height
    );
    for piece in pieces {
        svg.push_str(&format!(
            "  <path id=\"piece-{}\" d=\"{}\" fill=\"{}\" stroke=\"black\" stroke-width=\"{}\"/>\n",
            piece.id.0,
            piece.compute_outline().to_svg_path(),
            piece.identity().to_css(),
            stroke_width
        ));
    }
    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_accepts_hex_and_decimal() {
        assert_eq!(parse_seed_arg("0x1F").unwrap(), 31);
        assert_eq!(parse_seed_arg(" 42 ").unwrap(), 42);
        assert!(parse_seed_arg("forty").is_err());
    }

    #[test]
    fn svg_has_one_path_per_piece() {
        let puzzle = PuzzleConfig::for_difficulty(Difficulty::Easy, Rect::new(0.0, 0.0, 300.0, 300.0))
            .unwrap();
        let pieces = generate_pieces(&puzzle, &mut GridRng::new(3));
        let svg = render_svg(&puzzle, &pieces, 1.0);
        assert_eq!(svg.matches("<path").count(), 9);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(&pieces[4].identity().to_css()));
    }

    #[test]
    fn rows_and_cols_override_difficulty() {
        let cli = Cli::try_parse_from(["camjigsaw-cli", "generate", "--rows", "2", "--cols", "6"])
            .unwrap();
        let Commands::Generate { grid } = cli.command else {
            panic!("expected generate");
        };
        let puzzle = grid.puzzle_config(Difficulty::Hard).unwrap();
        assert_eq!((puzzle.rows, puzzle.cols), (2, 6));
    }

    #[test]
    fn edge_labels() {
        assert_eq!(edge_label(None), "flat");
        assert_eq!(edge_label(Some(EdgeTab::new(-0.5).unwrap())), "-0.500");
    }
}
