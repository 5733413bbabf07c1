//! Notes and the track generator.

use crate::config::GameConfig;
use crate::songs::{Beat, Song};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Map a `KeyboardEvent.key` value; anything but the two arrow keys is ignored.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Left => "←",
            Direction::Right => "→",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteState {
    Pending,
    Hit,
    Missed,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Note {
    pub id: u32,
    /// Lane coordinate; only ever decreases.
    pub position: f64,
    pub kind: Direction,
    hit: bool,
    missed: bool,
}

impl Note {
    pub fn new(id: u32, position: f64, kind: Direction) -> Self {
        Self { id, position, kind, hit: false, missed: false }
    }

    pub fn state(&self) -> NoteState {
        match (self.hit, self.missed) {
            (true, _) => NoteState::Hit,
            (_, true) => NoteState::Missed,
            _ => NoteState::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.hit && !self.missed
    }

    pub fn is_hit(&self) -> bool {
        self.hit
    }

    pub fn is_missed(&self) -> bool {
        self.missed
    }

    /// Pending -> hit. Returns false (and changes nothing) for a resolved note.
    pub fn mark_hit(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.hit = true;
        true
    }

    /// Pending -> missed. Returns false (and changes nothing) for a resolved note.
    pub fn mark_missed(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.missed = true;
        true
    }

    /// Closed interval test against the hit zone.
    pub fn in_zone(&self, start: f64, end: f64) -> bool {
        self.position >= start && self.position <= end
    }
}

/// Notes for one playthrough, in creation (= id) order.
#[derive(Clone, Debug, Default)]
pub struct NoteTrack {
    pub notes: Vec<Note>,
    /// Non-rest symbols in the song; unaffected by later removals from `notes`.
    pub total: usize,
}

/// Lay out a song's pattern along the lane. Deterministic for a given song/config.
pub fn generate_track(song: &Song, cfg: &GameConfig) -> NoteTrack {
    let spacing = cfg.spacing(song.tempo);
    let mut cursor = cfg.spawn_offset;
    let mut next_id = 0u32;
    let mut notes = Vec::with_capacity(song.pattern.len());

    for beat in song.pattern {
        let kind = match beat {
            Beat::Left => Direction::Left,
            Beat::Right => Direction::Right,
            Beat::Rest => {
                cursor += spacing * cfg.rest_spacing_factor;
                continue;
            }
        };
        notes.push(Note::new(next_id, cursor, kind));
        next_id += 1;
        cursor += spacing;
    }

    let total = notes.len();
    NoteTrack { notes, total }
}
