//! End-of-session result shown on the game-over screen.

use crate::arbiter::GameOverReason;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct GameSummary {
    pub score: u64,
    pub total_notes: usize,
    pub hits: usize,
    pub misses: u32,
    pub max_combo: u32,
    /// Whole percent, 0 for an empty song.
    pub accuracy: u32,
    pub reason: GameOverReason,
    pub song_name: &'static str,
}

/// `round(100 * (total - misses) / total)`, or 0 when there are no notes.
pub fn accuracy(total_notes: usize, misses: u32) -> u32 {
    if total_notes == 0 {
        return 0;
    }
    let good = total_notes.saturating_sub(misses as usize) as f64;
    (100.0 * good / total_notes as f64).round() as u32
}

impl GameSummary {
    pub fn title(&self) -> &'static str {
        match self.reason {
            GameOverReason::Miss => "回憶模糊",
            GameOverReason::TimeUp => "時間到!",
            GameOverReason::Completed if self.accuracy > 90 => "Amazing Performance!",
            GameOverReason::Completed if self.accuracy > 75 => "Great Job!",
            GameOverReason::Completed if self.accuracy > 50 => "Nice Try!",
            GameOverReason::Completed => "Good Effort!",
        }
    }

    #[cfg(feature = "serde_json")]
    pub fn to_json(&self) -> Result<String, crate::error::GameError> {
        Ok(serde_json::to_string(self)?)
    }
}
