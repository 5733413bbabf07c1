//! Resolves the racing end conditions into one game-over reason.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum GameOverReason {
    Miss,
    Completed,
    TimeUp,
}

impl GameOverReason {
    pub fn as_str(self) -> &'static str {
        match self {
            GameOverReason::Miss => "miss",
            GameOverReason::Completed => "completed",
            GameOverReason::TimeUp => "timeUp",
        }
    }
}

/// Why the session wants to end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndCondition {
    /// Pressed the wrong direction for the note in the zone.
    WrongKey,
    /// A pending note scrolled past the zone.
    Unhandled,
    TimeExpired,
    SongCompleted,
}

impl EndCondition {
    pub fn reason(self) -> GameOverReason {
        match self {
            EndCondition::WrongKey | EndCondition::Unhandled => GameOverReason::Miss,
            EndCondition::TimeExpired => GameOverReason::TimeUp,
            EndCondition::SongCompleted => GameOverReason::Completed,
        }
    }
}

/// First writer wins: once a reason is set, later conditions are ignored
/// until [`GameOverArbiter::clear`].
#[derive(Clone, Debug, Default)]
pub struct GameOverArbiter {
    reason: Option<GameOverReason>,
}

impl GameOverArbiter {
    pub fn reason(&self) -> Option<GameOverReason> {
        self.reason
    }

    pub fn is_decided(&self) -> bool {
        self.reason.is_some()
    }

    /// Returns true only for the call that decided the outcome.
    pub fn record(&mut self, cond: EndCondition) -> bool {
        if self.reason.is_some() {
            log::debug!("ignoring {cond:?}: outcome already decided");
            return false;
        }
        self.reason = Some(cond.reason());
        true
    }

    /// Completion fires only for a non-empty song whose every note was played.
    pub fn check_completion(&mut self, notes_played: usize, total_notes: usize) -> bool {
        total_notes > 0 && notes_played >= total_notes && self.record(EndCondition::SongCompleted)
    }

    pub fn clear(&mut self) {
        self.reason = None;
    }
}
