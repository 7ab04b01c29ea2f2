//! High score persistence
//!
//! Stored as JSON in the platform data directory
//! (e.g. ~/.local/share/quadtris/leaderboard.json).

use crate::game::FinalResult;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Entries kept on the board
pub const MAX_ENTRIES: usize = 10;

/// Longest accepted player name
pub const MAX_NAME_LEN: usize = 3;

const DEFAULT_NAME: &str = "AAA";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub player_name: String,
    pub score: u64,
    pub level: u32,
    pub lines_cleared: u32,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

/// Trim, uppercase and cap a name at three characters, falling back to `AAA`
pub fn normalize_name(raw: &str) -> String {
    let name: String = raw
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(MAX_NAME_LEN)
        .collect();
    if name.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        name
    }
}

impl Leaderboard {
    /// Where the leaderboard lives by default
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "quadtris", "quadtris")
            .map(|dirs| dirs.data_dir().join("leaderboard.json"))
    }

    /// Read the board from `path`. A missing file is an empty board.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut board: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        board.rank();
        Ok(board)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Best entries first, at most ten
    pub fn top(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Whether a score would earn a place on the board
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries
            .last()
            .is_none_or(|lowest| score > lowest.score)
    }

    /// Record a finished game. Returns the entry's zero-based rank, or
    /// `None` if it did not make the cut.
    pub fn submit(&mut self, result: FinalResult, name: &str, date: DateTime<Utc>) -> Option<usize> {
        let id = format!("{:016x}", rand::random::<u64>());
        self.entries.push(LeaderboardEntry {
            id: id.clone(),
            player_name: normalize_name(name),
            score: result.score,
            level: result.level,
            lines_cleared: result.lines_cleared,
            date,
        });
        self.rank();
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stable sort keeps earlier entries ahead on equal scores
    fn rank(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: u64) -> FinalResult {
        FinalResult {
            score,
            level: 1,
            lines_cleared: 2,
        }
    }

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("quadtris-test-{}-{:08x}", tag, rand::random::<u32>()))
            .join("leaderboard.json")
    }

    #[test]
    fn test_name_normalization() {
        assert_eq!(normalize_name("abcd"), "ABC");
        assert_eq!(normalize_name("  jo "), "JO");
        assert_eq!(normalize_name(""), "AAA");
        assert_eq!(normalize_name("   "), "AAA");
    }

    #[test]
    fn test_sorted_descending_and_capped() {
        let mut board = Leaderboard::default();
        let now = Utc::now();
        for score in [300, 1200, 100, 800, 50, 900, 400, 700, 200, 600, 500, 1000] {
            board.submit(result(score), "abc", now);
        }
        let scores: Vec<u64> = board.top().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![1200, 1000, 900, 800, 700, 600, 500, 400, 300, 200]);
    }

    #[test]
    fn test_qualifies() {
        let mut board = Leaderboard::default();
        assert!(board.qualifies(1));
        let now = Utc::now();
        for score in 1..=10 {
            board.submit(result(score * 100), "x", now);
        }
        assert!(!board.qualifies(100));
        assert!(!board.qualifies(50));
        assert!(board.qualifies(101));
    }

    #[test]
    fn test_submit_reports_rank() {
        let mut board = Leaderboard::default();
        let now = Utc::now();
        assert_eq!(board.submit(result(500), "a", now), Some(0));
        assert_eq!(board.submit(result(900), "b", now), Some(0));
        assert_eq!(board.submit(result(700), "c", now), Some(1));
        assert_eq!(board.top()[0].player_name, "B");
    }

    #[test]
    fn test_clear() {
        let mut board = Leaderboard::default();
        board.submit(result(10), "a", Utc::now());
        board.clear();
        assert!(board.is_empty());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let board = Leaderboard::load(&temp_path("missing")).expect("missing file loads");
        assert!(board.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("save");
        let mut board = Leaderboard::default();
        board.submit(result(1500), "zed", Utc::now());
        board.save(&path).expect("save");

        let loaded = Leaderboard::load(&path).expect("load");
        assert_eq!(loaded, board);
        assert_eq!(loaded.top()[0].player_name, "ZED");

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).expect("create temp dir");
        }
        fs::write(&path, "not json").expect("write");
        assert!(Leaderboard::load(&path).is_err());
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }
}
