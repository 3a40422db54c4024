use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::Difficulty;
use crate::hit::HitStrategy;
use crate::piece::SNAP_DISTANCE_RATIO;

pub const DEFAULT_BOARD_SCALE: f32 = 0.6;
pub const DEFAULT_BACKDROP_ALPHA: f32 = 0.5;
pub const DEFAULT_POP_VOLUME: f32 = 0.1;
pub const DEFAULT_MELODY_DELAY_MS: u32 = 500;
pub const DEFAULT_SCORE_ENDPOINT: &str = "server.php";
pub const DEFAULT_STROKE_WIDTH: f32 = 1.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Share of the viewport the board may cover along its limiting axis.
    #[serde(default = "default_board_scale")]
    pub board_scale: f32,
    #[serde(default = "default_backdrop_alpha")]
    pub backdrop_alpha: f32,
    /// Snap threshold as a fraction of the piece width.
    #[serde(default = "default_snap_distance_ratio")]
    pub snap_distance_ratio: f32,
    #[serde(default)]
    pub hit_strategy: HitStrategy,
    #[serde(default = "default_pop_volume")]
    pub pop_volume: f32,
    #[serde(default = "default_melody_delay_ms")]
    pub melody_delay_ms: u32,
    #[serde(default = "default_score_endpoint")]
    pub score_endpoint: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
}

fn default_board_scale() -> f32 {
    DEFAULT_BOARD_SCALE
}

fn default_backdrop_alpha() -> f32 {
    DEFAULT_BACKDROP_ALPHA
}

fn default_snap_distance_ratio() -> f32 {
    SNAP_DISTANCE_RATIO
}

fn default_pop_volume() -> f32 {
    DEFAULT_POP_VOLUME
}

fn default_melody_delay_ms() -> u32 {
    DEFAULT_MELODY_DELAY_MS
}

fn default_score_endpoint() -> String {
    DEFAULT_SCORE_ENDPOINT.to_string()
}

fn default_stroke_width() -> f32 {
    DEFAULT_STROKE_WIDTH
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_scale: DEFAULT_BOARD_SCALE,
            backdrop_alpha: DEFAULT_BACKDROP_ALPHA,
            snap_distance_ratio: SNAP_DISTANCE_RATIO,
            hit_strategy: HitStrategy::default(),
            pop_volume: DEFAULT_POP_VOLUME,
            melody_delay_ms: DEFAULT_MELODY_DELAY_MS,
            score_endpoint: DEFAULT_SCORE_ENDPOINT.to_string(),
            difficulty: Difficulty::default(),
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

impl GameConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(raw)?;
        Ok(config.validated())
    }

    /// Clamps every numeric field into its usable range; non-finite values
    /// fall back to the default.
    pub fn validated(mut self) -> Self {
        self.board_scale = clamp_or(self.board_scale, 0.05, 1.0, DEFAULT_BOARD_SCALE);
        self.backdrop_alpha = clamp_or(self.backdrop_alpha, 0.0, 1.0, DEFAULT_BACKDROP_ALPHA);
        self.snap_distance_ratio =
            clamp_or(self.snap_distance_ratio, 0.01, 1.0, SNAP_DISTANCE_RATIO);
        self.pop_volume = clamp_or(self.pop_volume, 0.0, 1.0, DEFAULT_POP_VOLUME);
        self.melody_delay_ms = self.melody_delay_ms.min(10_000);
        self.stroke_width = clamp_or(self.stroke_width, 0.0, 16.0, DEFAULT_STROKE_WIDTH);
        if self.score_endpoint.trim().is_empty() {
            self.score_endpoint = DEFAULT_SCORE_ENDPOINT.to_string();
        }
        self
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = GameConfig::from_json(r#"{"difficulty":"hard"}"#).unwrap();
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.board_scale, DEFAULT_BOARD_SCALE);
        assert_eq!(config.hit_strategy, HitStrategy::Mask);
        assert_eq!(config.score_endpoint, "server.php");
    }

    #[test]
    fn validation_clamps_out_of_range_values() {
        let config = GameConfig {
            board_scale: 4.0,
            pop_volume: -1.0,
            snap_distance_ratio: f32::NAN,
            score_endpoint: "  ".to_string(),
            ..GameConfig::default()
        }
        .validated();
        assert_eq!(config.board_scale, 1.0);
        assert_eq!(config.pop_volume, 0.0);
        assert_eq!(config.snap_distance_ratio, SNAP_DISTANCE_RATIO);
        assert_eq!(config.score_endpoint, DEFAULT_SCORE_ENDPOINT);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(GameConfig::from_json("{not json").is_err());
    }
}
