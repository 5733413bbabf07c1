//! Hit detection and scoring.

use crate::notes::{Direction, Note};

pub const BASE_HIT_POINTS: u64 = 10;
pub const COMBO_BONUS: u64 = 5;

/// Session counters. `misses` and `notes_played` only grow within a session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Scoreboard {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub misses: u32,
    /// Hits plus misses.
    pub notes_played: usize,
}

impl Scoreboard {
    /// Points a hit is worth at the current combo.
    pub fn hit_value(&self) -> u64 {
        BASE_HIT_POINTS + COMBO_BONUS * self.combo as u64
    }

    fn record_hit(&mut self) -> u64 {
        let points = self.hit_value();
        self.score += points;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.notes_played += 1;
        points
    }

    fn record_miss(&mut self) {
        self.combo = 0;
        self.misses += 1;
        self.notes_played += 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Judgement {
    Hit { note_id: u32, points: u64 },
    /// Wrong direction for the note in the zone; ends the session.
    WrongKey { note_id: u32 },
    /// Nothing in the zone; only the combo is lost.
    Stray,
}

/// Earliest-created pending note inside `[zone_start, zone_end]`.
fn zone_candidate(notes: &mut [Note], zone_start: f64, zone_end: f64) -> Option<&mut Note> {
    notes
        .iter_mut()
        .filter(|n| n.is_pending() && n.in_zone(zone_start, zone_end))
        .min_by_key(|n| n.id)
}

/// Judge one key press against the notes currently on the lane.
pub fn press(
    notes: &mut [Note],
    dir: Direction,
    zone: (f64, f64),
    board: &mut Scoreboard,
) -> Judgement {
    let Some(note) = zone_candidate(notes, zone.0, zone.1) else {
        board.combo = 0;
        return Judgement::Stray;
    };

    if note.kind == dir {
        note.mark_hit();
        let points = board.record_hit();
        Judgement::Hit { note_id: note.id, points }
    } else {
        note.mark_missed();
        board.record_miss();
        Judgement::WrongKey { note_id: note.id }
    }
}

/// Mark the earliest pending note left of `miss_line` as missed, if any.
pub fn sweep(notes: &mut [Note], miss_line: f64, board: &mut Scoreboard) -> Option<u32> {
    let note = notes
        .iter_mut()
        .filter(|n| n.is_pending() && n.position < miss_line)
        .min_by_key(|n| n.id)?;
    note.mark_missed();
    board.record_miss();
    Some(note.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONE: (f64, f64) = (50.0, 150.0);

    fn lane(layout: &[(f64, Direction)]) -> Vec<Note> {
        layout.iter()
            .enumerate()
            .map(|(i, &(p, d))| Note::new(i as u32, p, d))
            .collect()
    }

    #[test]
    fn hit_scores_with_combo_before_increment() {
        let mut notes = lane(&[(100.0, Direction::Left)]);
        let mut board = Scoreboard { combo: 3, ..Scoreboard::default() };
        let j = press(&mut notes, Direction::Left, ZONE, &mut board);
        assert_eq!(j, Judgement::Hit { note_id: 0, points: 25 });
        assert_eq!(board.score, 25);
        assert_eq!(board.combo, 4);
        assert_eq!(board.max_combo, 4);
        assert_eq!(board.notes_played, 1);
        assert!(notes[0].is_hit());
    }

    #[test]
    fn stray_press_only_resets_combo() {
        let mut notes = lane(&[(400.0, Direction::Left)]);
        let mut board = Scoreboard { combo: 2, score: 25, ..Scoreboard::default() };
        assert_eq!(press(&mut notes, Direction::Left, ZONE, &mut board), Judgement::Stray);
        assert_eq!(board.combo, 0);
        assert_eq!(board.score, 25);
        assert_eq!(board.misses, 0);
        assert!(notes[0].is_pending());
    }

    #[test]
    fn wrong_key_marks_missed() {
        let mut notes = lane(&[(60.0, Direction::Right)]);
        let mut board = Scoreboard { combo: 5, ..Scoreboard::default() };
        let j = press(&mut notes, Direction::Left, ZONE, &mut board);
        assert_eq!(j, Judgement::WrongKey { note_id: 0 });
        assert!(notes[0].is_missed());
        assert_eq!(board.combo, 0);
        assert_eq!(board.misses, 1);
        assert_eq!(board.notes_played, 1);
    }

    #[test]
    fn overlapping_zone_prefers_lowest_id() {
        let mut notes = vec![
            Note::new(7, 140.0, Direction::Right),
            Note::new(3, 60.0, Direction::Left),
        ];
        let mut board = Scoreboard::default();
        let j = press(&mut notes, Direction::Left, ZONE, &mut board);
        assert_eq!(j, Judgement::Hit { note_id: 3, points: 10 });
    }

    #[test]
    fn resolved_notes_are_not_candidates() {
        let mut notes = lane(&[(100.0, Direction::Left), (120.0, Direction::Right)]);
        notes[0].mark_hit();
        let mut board = Scoreboard::default();
        let j = press(&mut notes, Direction::Right, ZONE, &mut board);
        assert_eq!(j, Judgement::Hit { note_id: 1, points: 10 });
    }

    #[test]
    fn sweep_takes_first_passed_note() {
        let mut notes = lane(&[(-2.0, Direction::Left), (-1.0, Direction::Right), (30.0, Direction::Left)]);
        let mut board = Scoreboard { combo: 4, ..Scoreboard::default() };
        assert_eq!(sweep(&mut notes, 0.0, &mut board), Some(0));
        assert!(notes[0].is_missed());
        assert!(notes[1].is_pending());
        assert_eq!(board.misses, 1);
        assert_eq!(board.combo, 0);
        assert_eq!(board.notes_played, 1);
    }

    #[test]
    fn sweep_ignores_notes_on_the_line() {
        let mut notes = lane(&[(0.0, Direction::Left)]);
        let mut board = Scoreboard::default();
        assert_eq!(sweep(&mut notes, 0.0, &mut board), None);
        assert_eq!(board, Scoreboard::default());
    }
}
