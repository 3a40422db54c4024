//! Leaderboard payloads for the score service.

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::error::{PuzzleError, Result};
use crate::grid::Difficulty;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScoreSubmission {
    pub name: String,
    /// Solve time in milliseconds.
    pub time: u64,
    pub difficulty: Difficulty,
}

impl ScoreSubmission {
    pub fn new(name: &str, elapsed_ms: f64, difficulty: Difficulty) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PuzzleError::EmptyPlayerName);
        }
        Ok(Self {
            name: name.to_string(),
            time: elapsed_ms.max(0.0).round() as u64,
            difficulty,
        })
    }

    /// `<endpoint>?info=<json>` resolved against the page location.
    pub fn request_url(&self, base: &str, endpoint: &str) -> Result<Url> {
        let info = serde_json::to_string(self)?;
        let mut url = endpoint_url(base, endpoint)?;
        url.query_pairs_mut().append_pair("info", &info);
        Ok(url)
    }
}

pub fn endpoint_url(base: &str, endpoint: &str) -> Result<Url> {
    Ok(Url::parse(base)?.join(endpoint)?)
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ScoreEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Time", deserialize_with = "deserialize_time")]
    pub time_ms: u64,
}

impl ScoreEntry {
    pub fn seconds(&self) -> u64 {
        self.time_ms / 1000
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimeValue {
    Number(f64),
    Text(String),
}

fn deserialize_time<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = match TimeValue::deserialize(deserializer)? {
        TimeValue::Number(value) => value,
        TimeValue::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(serde::de::Error::custom)?,
    };
    Ok(millis.max(0.0) as u64)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Leaderboard {
    pub easy: Vec<ScoreEntry>,
    pub medium: Vec<ScoreEntry>,
    pub hard: Vec<ScoreEntry>,
    pub insane: Vec<ScoreEntry>,
}

impl Leaderboard {
    /// Parses the service response; every tier comes back fastest first.
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut board: Leaderboard = serde_json::from_str(raw)?;
        for difficulty in Difficulty::ALL {
            board.tier_mut(difficulty).sort_by_key(|entry| entry.time_ms);
        }
        Ok(board)
    }

    pub fn tier(&self, difficulty: Difficulty) -> &[ScoreEntry] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
            Difficulty::Insane => &self.insane,
        }
    }

    fn tier_mut(&mut self, difficulty: Difficulty) -> &mut Vec<ScoreEntry> {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
            Difficulty::Insane => &mut self.insane,
        }
    }

    /// `rank. name seconds` lines for one tier.
    pub fn rows(&self, difficulty: Difficulty) -> Vec<String> {
        self.tier(difficulty)
            .iter()
            .enumerate()
            .map(|(rank, entry)| format!("{}. {} {}", rank + 1, entry.name, entry.seconds()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(
            ScoreSubmission::new("   ", 10.0, Difficulty::Easy),
            Err(PuzzleError::EmptyPlayerName)
        ));
    }

    #[test]
    fn request_carries_json_info() {
        let submission = ScoreSubmission::new("Ada", 12_345.4, Difficulty::Hard).unwrap();
        let url = submission
            .request_url("https://example.test/game/index.html", "server.php")
            .unwrap();
        assert_eq!(url.path(), "/game/server.php");
        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "info");
        let info: serde_json::Value = serde_json::from_str(&value).unwrap();
        assert_eq!(
            info,
            serde_json::json!({"name": "Ada", "time": 12345, "difficulty": "hard"})
        );
    }

    #[test]
    fn leaderboard_sorts_and_accepts_string_times() {
        let raw = r#"{
            "easy": [{"Name": "b", "Time": "9000"}, {"Name": "a", "Time": 4200}],
            "insane": [{"Name": "c", "Time": 61000}]
        }"#;
        let board = Leaderboard::from_json(raw).unwrap();
        assert_eq!(board.rows(Difficulty::Easy), vec!["1. a 4", "2. b 9"]);
        assert!(board.tier(Difficulty::Medium).is_empty());
        assert_eq!(board.rows(Difficulty::Insane), vec!["1. c 61"]);
    }
}
