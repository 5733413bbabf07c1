//! Session state machine: owns the notes, counters, clock and outcome of one
//! playthrough. All mutation happens through [`Session::start`],
//! [`Session::tick`] and [`Session::press`]; each call runs to completion.

use crate::arbiter::{EndCondition, GameOverArbiter, GameOverReason};
use crate::clock::{ClockTick, GameClock, advance_notes};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::judge::{self, Judgement, Scoreboard};
use crate::notes::{Direction, Note, generate_track};
use crate::songs::Song;
use crate::summary::{GameSummary, accuracy};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    /// Waiting for the first start command.
    Initial,
    Playing,
    /// Terminal for the session; a restart rebuilds everything.
    GameOver,
}

/// What a single tick or key press changed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Step {
    pub judgement: Option<Judgement>,
    /// Note id the auto-miss sweep caught on this tick.
    pub auto_missed: Option<u32>,
    /// Set on the step that moved the session into `GameOver`.
    pub ended: Option<GameOverReason>,
}

/// Read-only per-frame view handed to renderers.
#[derive(Debug)]
pub struct FrameView<'a> {
    pub state: GameState,
    pub notes: &'a [Note],
    pub zone: (f64, f64),
    pub board: &'a Scoreboard,
    pub time_left: f64,
    pub time_ratio: f64,
    pub song_name: Option<&'static str>,
    pub total_notes: usize,
}

pub struct Session {
    cfg: GameConfig,
    state: GameState,
    song: Option<&'static Song>,
    notes: Vec<Note>,
    total_notes: usize,
    speed: f64,
    board: Scoreboard,
    clock: GameClock,
    arbiter: GameOverArbiter,
}

impl Session {
    pub fn new(cfg: GameConfig) -> Self {
        let clock = GameClock::new(cfg.duration_secs);
        Self {
            speed: cfg.base_speed,
            cfg,
            state: GameState::Initial,
            song: None,
            notes: Vec::new(),
            total_notes: 0,
            board: Scoreboard::default(),
            clock,
            arbiter: GameOverArbiter::default(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.cfg
    }

    /// Swap the tuning for the next session. Refused mid-play.
    pub fn set_config(&mut self, cfg: GameConfig) -> Result<(), GameError> {
        if self.state == GameState::Playing {
            return Err(GameError::AlreadyPlaying);
        }
        cfg.validate()?;
        self.cfg = cfg;
        Ok(())
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == GameState::Playing
    }

    pub fn song(&self) -> Option<&'static Song> {
        self.song
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn board(&self) -> &Scoreboard {
        &self.board
    }

    pub fn total_notes(&self) -> usize {
        self.total_notes
    }

    /// Scroll distance per tick for the current song.
    pub fn effective_speed(&self) -> f64 {
        self.speed
    }

    pub fn time_left(&self) -> f64 {
        self.clock.time_left()
    }

    pub fn reason(&self) -> Option<GameOverReason> {
        self.arbiter.reason()
    }

    /// Begin a fresh playthrough of `song`. Valid from `Initial` and `GameOver`.
    pub fn start(&mut self, song: &'static Song) -> Result<(), GameError> {
        if self.state == GameState::Playing {
            return Err(GameError::AlreadyPlaying);
        }
        self.cfg.check_tempo(song.tempo)?;
        let track = generate_track(song, &self.cfg);
        self.song = Some(song);
        self.notes = track.notes;
        self.total_notes = track.total;
        self.speed = self.cfg.effective_speed(song.tempo);
        self.board = Scoreboard::default();
        self.clock = GameClock::new(self.cfg.duration_secs);
        self.arbiter.clear();
        self.state = GameState::Playing;
        log::info!(
            "session start: '{}' ({} notes, tempo {})",
            song.name,
            self.total_notes,
            song.tempo
        );
        Ok(())
    }

    /// One fixed step: scroll, count down, then sweep for passed notes.
    /// A no-op unless playing, so a late-firing frame cannot mutate a finished game.
    pub fn tick(&mut self) -> Step {
        let mut step = Step::default();
        if !self.is_playing() {
            return step;
        }

        advance_notes(&mut self.notes, self.speed, self.cfg.position_floor);

        if self.clock.tick(self.cfg.tick_secs()) == ClockTick::Expired {
            step.ended = self.end(EndCondition::TimeExpired);
            return step;
        }

        if let Some(id) = judge::sweep(&mut self.notes, self.cfg.miss_line(), &mut self.board) {
            log::debug!("note {id} passed the zone unhandled");
            step.auto_missed = Some(id);
            step.ended = self.end(EndCondition::Unhandled);
        }
        step
    }

    /// Judge a key press. Ignored outside `Playing`.
    pub fn press(&mut self, dir: Direction) -> Step {
        let mut step = Step::default();
        if !self.is_playing() {
            return step;
        }

        let zone = (self.cfg.zone_start, self.cfg.zone_end);
        let judgement = judge::press(&mut self.notes, dir, zone, &mut self.board);
        step.judgement = Some(judgement);
        match judgement {
            Judgement::Hit { note_id, points } => {
                log::debug!("hit note {note_id} for {points}, combo {}", self.board.combo);
                if self
                    .arbiter
                    .check_completion(self.board.notes_played, self.total_notes)
                {
                    step.ended = self.finish();
                }
            }
            Judgement::WrongKey { note_id } => {
                log::debug!("wrong key {dir:?} on note {note_id}");
                step.ended = self.end(EndCondition::WrongKey);
            }
            Judgement::Stray => log::trace!("stray {dir:?} press"),
        }
        step
    }

    fn end(&mut self, cond: EndCondition) -> Option<GameOverReason> {
        self.arbiter.record(cond);
        self.finish()
    }

    fn finish(&mut self) -> Option<GameOverReason> {
        self.state = GameState::GameOver;
        let reason = self.arbiter.reason();
        log::info!(
            "game over ({}): score {}, misses {}",
            reason.map(|r| r.as_str()).unwrap_or("?"),
            self.board.score,
            self.board.misses
        );
        reason
    }

    /// Result for the game-over screen; `None` until the session has ended.
    pub fn summary(&self) -> Option<GameSummary> {
        if self.state != GameState::GameOver {
            return None;
        }
        let reason = self.arbiter.reason()?;
        Some(GameSummary {
            score: self.board.score,
            total_notes: self.total_notes,
            hits: self.total_notes.saturating_sub(self.board.misses as usize),
            misses: self.board.misses,
            max_combo: self.board.max_combo,
            accuracy: accuracy(self.total_notes, self.board.misses),
            reason,
            song_name: self.song.map(|s| s.name).unwrap_or("Unknown Song"),
        })
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            state: self.state,
            notes: &self.notes,
            zone: (self.cfg.zone_start, self.cfg.zone_end),
            board: &self.board,
            time_left: self.clock.time_left(),
            time_ratio: self.clock.remaining_ratio(),
            song_name: self.song.map(|s| s.name),
            total_notes: self.total_notes,
        }
    }

    /// Tear down the current playthrough and return to `Initial`.
    pub fn dispose(&mut self) {
        self.state = GameState::Initial;
        self.song = None;
        self.notes.clear();
        self.total_notes = 0;
        self.board = Scoreboard::default();
        self.clock = GameClock::new(self.cfg.duration_secs);
        self.arbiter.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::songs::Beat;

    static LRL: Song = Song {
        id: "lrl",
        name: "lrl",
        audio_src: "",
        pattern: &[Beat::Left, Beat::Right, Beat::Left],
        tempo: 1.0,
    };

    fn ticks_until_in_zone(s: &mut Session, id: u32) {
        while !s.notes().iter().any(|n| n.id == id && n.in_zone(50.0, 150.0)) {
            assert!(s.tick().ended.is_none());
        }
    }

    #[test]
    fn start_resets_and_builds_track() {
        let mut s = Session::new(GameConfig::default());
        assert_eq!(s.state(), GameState::Initial);
        assert!(s.summary().is_none());
        s.start(&LRL).unwrap();
        assert!(s.is_playing());
        assert_eq!(s.total_notes(), 3);
        assert_eq!(s.notes().len(), 3);
        assert!((s.effective_speed() - 5.0).abs() < 1e-9);
        assert!(matches!(s.start(&LRL), Err(GameError::AlreadyPlaying)));
    }

    #[test]
    fn positions_never_increase() {
        let mut s = Session::new(GameConfig::default());
        s.start(&LRL).unwrap();
        let mut prev: Vec<f64> = s.notes().iter().map(|n| n.position).collect();
        for _ in 0..100 {
            s.tick();
            for (n, p) in s.notes().iter().zip(&prev) {
                assert!(n.position <= *p);
            }
            prev = s.notes().iter().map(|n| n.position).collect();
        }
    }

    #[test]
    fn perfect_run_completes() {
        let mut s = Session::new(GameConfig::default());
        s.start(&LRL).unwrap();
        for (id, dir) in [(0, Direction::Left), (1, Direction::Right)] {
            ticks_until_in_zone(&mut s, id);
            assert!(s.press(dir).ended.is_none());
        }
        ticks_until_in_zone(&mut s, 2);
        let step = s.press(Direction::Left);
        assert_eq!(step.ended, Some(GameOverReason::Completed));
        assert_eq!(s.board().score, 45);
        assert_eq!(s.board().combo, 3);
        let summary = s.summary().unwrap();
        assert_eq!(summary.accuracy, 100);
        assert_eq!(summary.title(), "Amazing Performance!");
    }

    #[test]
    fn finished_session_ignores_ticks_and_presses() {
        let mut s = Session::new(GameConfig::default());
        s.start(&LRL).unwrap();
        ticks_until_in_zone(&mut s, 0);
        assert_eq!(s.press(Direction::Right).ended, Some(GameOverReason::Miss));
        let frozen: Vec<f64> = s.notes().iter().map(|n| n.position).collect();
        let time = s.time_left();
        assert_eq!(s.tick(), Step::default());
        assert_eq!(s.press(Direction::Left), Step::default());
        let after: Vec<f64> = s.notes().iter().map(|n| n.position).collect();
        assert_eq!(frozen, after);
        assert_eq!(s.time_left(), time);
        assert_eq!(s.board().misses, 1);
    }

    #[test]
    fn config_locked_while_playing() {
        let mut s = Session::new(GameConfig::default());
        s.start(&LRL).unwrap();
        assert!(s.set_config(GameConfig::default()).is_err());
        s.dispose();
        assert_eq!(s.state(), GameState::Initial);
        assert!(s.notes().is_empty());
        let cfg = GameConfig { duration_secs: 10.0, ..GameConfig::default() };
        s.set_config(cfg).unwrap();
        s.start(&LRL).unwrap();
        assert!((s.time_left() - 10.0).abs() < 1e-9);
    }
}
