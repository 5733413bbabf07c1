// End-to-end playthroughs of the session state machine, driven tick by tick.

use swing_rhythm::judge::Judgement;
use swing_rhythm::session::Step;
use swing_rhythm::{Beat, Direction, GameConfig, GameOverReason, GameState, Session, Song};

static LRL: Song = Song {
    id: "lrl",
    name: "Left Right Left",
    audio_src: "/songs/lrl.mp3",
    pattern: &[Beat::Left, Beat::Right, Beat::Left],
    tempo: 1.0,
};

static SILENCE: Song = Song {
    id: "silence",
    name: "Silence",
    audio_src: "/songs/silence.mp3",
    pattern: &[Beat::Rest, Beat::Rest, Beat::Rest],
    tempo: 1.0,
};

static BLUR: Song = Song {
    id: "blur",
    name: "Blur",
    audio_src: "/songs/blur.mp3",
    pattern: &[Beat::Left],
    tempo: 50.0,
};

const MAX_TICKS: usize = 100_000;

fn started(cfg: GameConfig, song: &'static Song) -> Session {
    let mut s = Session::new(cfg);
    s.start(song).unwrap();
    s
}

/// Tick until the earliest pending note reaches the far edge of the zone.
fn tick_until_in_zone(s: &mut Session) -> Direction {
    let zone_end = s.config().zone_end;
    for _ in 0..MAX_TICKS {
        if let Some(n) = s.notes().iter().filter(|n| n.is_pending()).min_by_key(|n| n.id) {
            if n.position <= zone_end {
                return n.kind;
            }
        }
        s.tick();
        assert!(s.is_playing(), "session ended before a note reached the zone");
    }
    panic!("no note reached the zone");
}

fn tick_until_over(s: &mut Session) -> GameOverReason {
    for _ in 0..MAX_TICKS {
        if let Some(reason) = s.tick().ended {
            return reason;
        }
    }
    panic!("session never ended");
}

#[test]
fn perfect_run_completes_with_combo_bonus() {
    let mut s = started(GameConfig::default(), &LRL);
    let positions: Vec<f64> = s.notes().iter().map(|n| n.position).collect();
    assert_eq!(positions, vec![800.0, 1020.0, 1240.0]);

    let mut points = Vec::new();
    for _ in 0..3 {
        let dir = tick_until_in_zone(&mut s);
        match s.press(dir).judgement {
            Some(Judgement::Hit { points: p, .. }) => points.push(p),
            other => panic!("expected a hit, got {other:?}"),
        }
    }
    assert_eq!(points, vec![10, 15, 20]);
    assert_eq!(s.state(), GameState::GameOver);
    assert_eq!(s.reason(), Some(GameOverReason::Completed));

    let summary = s.summary().unwrap();
    assert_eq!(summary.score, 45);
    assert_eq!(summary.max_combo, 3);
    assert_eq!(summary.misses, 0);
    assert_eq!(summary.accuracy, 100);
    assert_eq!(summary.song_name, "Left Right Left");
}

#[test]
fn ignoring_the_lane_ends_on_the_first_passed_note() {
    let mut s = started(GameConfig::default(), &LRL);
    assert_eq!(tick_until_over(&mut s), GameOverReason::Miss);
    assert_eq!(s.board().misses, 1);
    assert_eq!(s.board().notes_played, 1);
    assert!(s.notes()[0].is_missed());
    assert!(s.notes()[1].is_pending());

    let frozen: Vec<f64> = s.notes().iter().map(|n| n.position).collect();
    for _ in 0..50 {
        assert_eq!(s.tick(), Step::default());
    }
    let after: Vec<f64> = s.notes().iter().map(|n| n.position).collect();
    assert_eq!(frozen, after);
}

#[test]
fn wrong_key_in_the_zone_is_a_miss() {
    let mut s = started(GameConfig::default(), &LRL);
    let dir = tick_until_in_zone(&mut s);
    assert_eq!(dir, Direction::Left);
    let step = s.press(Direction::Right);
    assert_eq!(step.judgement, Some(Judgement::WrongKey { note_id: 0 }));
    assert_eq!(step.ended, Some(GameOverReason::Miss));
    assert_eq!(s.board().misses, 1);

    // further input is ignored
    assert_eq!(s.press(Direction::Right).judgement, None);
    assert_eq!(s.board().misses, 1);
}

#[test]
fn stray_press_only_resets_combo() {
    let mut s = started(GameConfig::default(), &LRL);
    let dir = tick_until_in_zone(&mut s);
    s.press(dir);
    assert_eq!(s.board().combo, 1);
    assert_eq!(s.press(Direction::Left).judgement, Some(Judgement::Stray));
    assert_eq!(s.board().combo, 0);
    assert_eq!(s.board().misses, 0);
    assert!(s.is_playing());
}

#[test]
fn clock_runs_out_before_notes_arrive() {
    let cfg = GameConfig { duration_secs: 0.5, ..GameConfig::default() };
    let mut s = started(cfg, &LRL);
    assert_eq!(tick_until_over(&mut s), GameOverReason::TimeUp);
    assert_eq!(s.time_left(), 0.0);
    assert!(s.notes().iter().all(|n| n.is_pending()));

    let summary = s.summary().unwrap();
    assert_eq!(summary.title(), "時間到!");
    assert_eq!(summary.misses, 0);
}

#[test]
fn song_without_notes_only_ends_by_time() {
    let cfg = GameConfig { duration_secs: 1.0, ..GameConfig::default() };
    let mut s = started(cfg, &SILENCE);
    assert_eq!(s.total_notes(), 0);
    assert!(s.notes().is_empty());
    assert_eq!(tick_until_over(&mut s), GameOverReason::TimeUp);
    assert_eq!(s.summary().unwrap().accuracy, 0);
}

// The first note crosses the miss line on tick 161, the same tick the clock
// expires. The clock is checked first, so the time-up reason sticks.
#[test]
fn first_recorded_reason_wins_on_a_shared_tick() {
    let cfg = GameConfig { duration_secs: 160.5 * 0.016, ..GameConfig::default() };
    let mut s = started(cfg, &LRL);
    let mut ticks = 0;
    let reason = loop {
        ticks += 1;
        if let Some(r) = s.tick().ended {
            break r;
        }
        assert!(ticks < 1000);
    };
    assert_eq!(ticks, 161);
    assert_eq!(reason, GameOverReason::TimeUp);
    assert_eq!(s.board().misses, 0);
}

#[test]
fn restart_after_game_over_resets_everything() {
    let mut s = started(GameConfig::default(), &LRL);
    tick_until_over(&mut s);
    assert!(s.summary().is_some());

    s.start(&LRL).unwrap();
    assert!(s.is_playing());
    assert_eq!(s.reason(), None);
    assert_eq!(s.board().misses, 0);
    assert_eq!(s.time_left(), 60.0);
    assert_eq!(s.notes()[0].position, 800.0);
    assert!(s.summary().is_none());
}

#[test]
fn faster_tempo_scrolls_faster_and_packs_notes_tighter() {
    let song = swing_rhythm::songs::find("song4").unwrap();
    let mut s = started(GameConfig::default(), song);
    assert!((s.effective_speed() - 5.0 * song.tempo).abs() < 1e-9);
    let first = s.notes()[0].position;
    let gap = s.notes()[1].position - first;
    assert!(gap < 220.0);
    s.tick();
    assert!((first - s.notes()[0].position - s.effective_speed()).abs() < 1e-9);
}

// Every note has to pass through the zone and the sweep; a song too fast for
// that is refused instead of silently losing notes.
#[test]
fn song_too_fast_for_the_lane_is_refused() {
    let mut s = Session::new(GameConfig::default());
    assert!(matches!(s.start(&BLUR), Err(swing_rhythm::GameError::InvalidConfig(_))));
    assert_eq!(s.state(), GameState::Initial);
    assert!(s.notes().is_empty());
}

#[test]
fn notes_resolve_before_leaving_the_lane_at_the_fastest_allowed_speed() {
    let cfg = GameConfig { base_speed: 70.0, spawn_offset: 120.0, ..GameConfig::default() };
    cfg.validate().unwrap();
    let mut s = started(cfg, &LRL);
    assert_eq!(tick_until_over(&mut s), GameOverReason::Miss);
    assert_eq!(s.board().misses, 1);
    assert_eq!(s.board().notes_played, 1);
}
