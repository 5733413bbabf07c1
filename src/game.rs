//! Top-level controller.
//!
//! [`Game`] is the single owner of the [`Session`]. Ticks, key presses and
//! audio callbacks arrive as [`GameEvent`]s and are applied one at a time by
//! [`Game::dispatch`]; anything that must happen later (timers, starting or
//! stopping the frame loop) is handed back to the caller as an [`Effect`].

use std::collections::VecDeque;

use crate::config::GameConfig;
use crate::error::GameError;
use crate::notes::Direction;
use crate::session::{FrameView, GameState, Session, Step};
use crate::songs::{self, Song};
use crate::summary::GameSummary;

/// Music playback collaborator. Readiness and failures come back as
/// [`GameEvent::AudioReady`] / [`GameEvent::AudioFailed`].
pub trait AudioService {
    /// Load `song` and start it as soon as it can play through.
    fn play(&mut self, song: &'static Song) -> Result<(), GameError>;
    fn pause(&mut self);
    fn stop(&mut self);
}

/// Everything a renderer needs for one frame.
pub struct Scene<'a> {
    pub frame: FrameView<'a>,
    pub swing: Option<Direction>,
    pub notice: Option<&'a str>,
    pub summary: Option<GameSummary>,
}

pub trait Renderer {
    fn draw(&mut self, scene: &Scene<'_>) -> Result<(), GameError>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// Start (or restart) with the given song id, or a random song.
    Start(Option<String>),
    Tick,
    Press(Direction),
    AudioReady,
    AudioFailed(String),
    SwingReset(u32),
    DismissNotice(u32),
    /// Drop the session and return to the start screen.
    Dispose,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    StartTicking,
    StopTicking,
    /// Post `SwingReset(token)` after `ms`.
    ResetSwingAfter { ms: f64, token: u32 },
    /// Post `DismissNotice(token)` after `ms`.
    DismissNoticeAfter { ms: f64, token: u32 },
}

/// How long a notice stays on screen.
pub const NOTICE_MS: f64 = 4000.0;

/// FIFO of events raised while another event is being applied.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<GameEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: GameEvent) {
        self.pending.push_back(event);
    }

    pub fn pop(&mut self) -> Option<GameEvent> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

pub struct Game<A: AudioService> {
    session: Session,
    audio: A,
    roll: fn(usize) -> usize,
    swing: Option<Direction>,
    swing_token: u32,
    notice: Option<String>,
    notice_token: u32,
}

impl<A: AudioService> Game<A> {
    pub fn new(cfg: GameConfig, audio: A) -> Self {
        Self::with_roll(cfg, audio, songs::random_index)
    }

    /// Use `roll` instead of the random source when picking a song.
    pub fn with_roll(cfg: GameConfig, audio: A, roll: fn(usize) -> usize) -> Self {
        Self {
            session: Session::new(cfg),
            audio,
            roll,
            swing: None,
            swing_token: 0,
            notice: None,
            notice_token: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn swing(&self) -> Option<Direction> {
        self.swing
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn configure(&mut self, cfg: GameConfig) -> Result<(), GameError> {
        self.session.set_config(cfg)
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            frame: self.session.view(),
            swing: self.swing,
            notice: self.notice.as_deref(),
            summary: self.session.summary(),
        }
    }

    pub fn dispatch(&mut self, event: GameEvent) -> Result<Vec<Effect>, GameError> {
        let mut effects = Vec::new();
        match event {
            GameEvent::Start(id) => self.start(id.as_deref(), &mut effects)?,
            GameEvent::Tick => {
                let step = self.session.tick();
                self.after_step(step, &mut effects);
            }
            GameEvent::Press(dir) => {
                if !self.session.is_playing() {
                    return Ok(effects);
                }
                self.swing = Some(dir);
                self.swing_token = self.swing_token.wrapping_add(1);
                effects.push(Effect::ResetSwingAfter {
                    ms: self.session.config().swing_reset_ms,
                    token: self.swing_token,
                });
                let step = self.session.press(dir);
                self.after_step(step, &mut effects);
            }
            GameEvent::AudioReady => log::debug!("audio ready"),
            GameEvent::AudioFailed(reason) => {
                let song = self.session.song().map(|s| s.name).unwrap_or("?");
                let err = GameError::AudioRejected { song: song.to_string(), reason };
                log::warn!("{err}");
                self.raise_notice(format!("無法播放音樂：{song}"), &mut effects);
            }
            GameEvent::SwingReset(token) => {
                if token == self.swing_token {
                    self.swing = None;
                }
            }
            GameEvent::DismissNotice(token) => {
                if token == self.notice_token {
                    self.notice = None;
                }
            }
            GameEvent::Dispose => {
                self.audio.stop();
                self.session.dispose();
                self.swing = None;
                effects.push(Effect::StopTicking);
            }
        }
        Ok(effects)
    }

    /// Apply every queued event in order. A rejected event is logged and
    /// skipped; the rest still run.
    pub fn drain(&mut self, queue: &mut EventQueue) -> Vec<Effect> {
        let mut effects = Vec::new();
        while let Some(event) = queue.pop() {
            match self.dispatch(event) {
                Ok(fx) => effects.extend(fx),
                Err(err) => log::warn!("{err}"),
            }
        }
        effects
    }

    fn start(&mut self, id: Option<&str>, effects: &mut Vec<Effect>) -> Result<(), GameError> {
        if self.session.state() == GameState::Playing {
            return Err(GameError::AlreadyPlaying);
        }
        let song = match id {
            Some(id) => songs::find(id)?,
            None => songs::pick(self.roll),
        };
        self.session.start(song)?;
        self.swing = None;
        self.audio.stop();
        if let Err(err) = self.audio.play(song) {
            log::warn!("{err}");
            self.raise_notice(format!("無法加載音樂文件：{}", song.name), effects);
        }
        effects.push(Effect::StartTicking);
        Ok(())
    }

    fn after_step(&mut self, step: Step, effects: &mut Vec<Effect>) {
        if step.ended.is_some() {
            self.audio.pause();
            effects.push(Effect::StopTicking);
        }
    }

    fn raise_notice(&mut self, text: String, effects: &mut Vec<Effect>) {
        self.notice = Some(text);
        self.notice_token = self.notice_token.wrapping_add(1);
        effects.push(Effect::DismissNoticeAfter { ms: NOTICE_MS, token: self.notice_token });
    }
}
