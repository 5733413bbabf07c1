//! Browser shell: owns the single [`Game`] instance, wires DOM events into its
//! event queue and drives the fixed-step frame loop.
//!
//! Every callback (frame, key, timer, audio) only pushes a [`GameEvent`] and
//! then calls [`pump`]; the game itself is borrowed in exactly one place, so a
//! step always finishes before the next one starts.

mod audio;
mod render;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::clock::FixedStep;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::game::{Effect, EventQueue, Game, GameEvent, Renderer};
use crate::notes::Direction;
#[cfg(feature = "serde_json")]
use crate::summary::GameSummary;

use audio::HtmlAudio;
use render::CanvasRenderer;

struct App {
    game: Game<HtmlAudio>,
    renderer: CanvasRenderer,
    step: FixedStep,
    /// Bumped whenever ticking starts or stops; frames from an older loop are stale.
    loop_generation: u32,
    ticking: bool,
}

thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
    static EVENTS: RefCell<EventQueue> = RefCell::new(EventQueue::default());
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Create the canvas, overlays, audio element and listeners. Idempotent.
pub fn mount() -> Result<(), GameError> {
    if APP.with(|a| a.borrow().is_some()) {
        return Ok(());
    }
    let win = window().ok_or_else(|| GameError::Dom("no window".into()))?;
    let doc = win
        .document()
        .ok_or_else(|| GameError::Dom("no document".into()))?;

    let cfg = GameConfig::default();
    let step = FixedStep::new(cfg.tick_ms, cfg.max_ticks_per_frame);
    let app = App {
        game: Game::new(cfg, HtmlAudio::new()?),
        renderer: CanvasRenderer::mount(&doc)?,
        step,
        loop_generation: 0,
        ticking: false,
    };
    APP.with(|a| a.replace(Some(app)));

    // Arrow keys play; Enter starts when idle. Other keys are ignored.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            let key = evt.key();
            if let Some(dir) = Direction::from_key(&key) {
                evt.prevent_default();
                post(GameEvent::Press(dir));
            } else if key == "Enter" && !is_playing() {
                post(GameEvent::Start(None));
            }
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
            .map_err(GameError::dom)?;
        closure.forget();
    }

    render_now();
    log::info!("mounted");
    Ok(())
}

/// Queue an event and process everything pending.
pub fn post(event: GameEvent) {
    EVENTS.with(|q| q.borrow_mut().push(event));
    pump();
}

/// Apply queued events in order. A nested call (an event raised while the game
/// is borrowed) returns at once; the outer call drains what was queued.
fn pump() {
    if APP.with(|cell| cell.try_borrow_mut().is_err()) {
        return;
    }
    loop {
        let mut batch = EVENTS.with(|q| std::mem::take(&mut *q.borrow_mut()));
        if batch.is_empty() {
            break;
        }
        let effects = APP.with(|cell| {
            cell.borrow_mut()
                .as_mut()
                .map(|app| app.game.drain(&mut batch))
        });
        match effects {
            Some(fx) => apply_effects(fx),
            None => break,
        }
    }
    render_now();
}

fn apply_effects(effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::StartTicking => start_ticking(),
            Effect::StopTicking => stop_ticking(),
            Effect::ResetSwingAfter { ms, token } => after(ms, GameEvent::SwingReset(token)),
            Effect::DismissNoticeAfter { ms, token } => after(ms, GameEvent::DismissNotice(token)),
        }
    }
}

/// Fire-and-forget delayed event.
fn after(ms: f64, event: GameEvent) {
    let Some(win) = window() else { return };
    let cb = Closure::once_into_js(move || post(event));
    let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
        cb.unchecked_ref(),
        ms.round() as i32,
    );
}

fn render_now() {
    APP.with(|cell| {
        if let Ok(mut guard) = cell.try_borrow_mut() {
            if let Some(app) = guard.as_mut() {
                let scene = app.game.scene();
                if let Err(err) = app.renderer.draw(&scene) {
                    log::error!("render failed: {err}");
                }
            }
        }
    });
}

fn is_playing() -> bool {
    APP.with(|cell| {
        cell.try_borrow()
            .map(|g| g.as_ref().is_some_and(|a| a.game.session().is_playing()))
            .unwrap_or(false)
    })
}

fn start_ticking() {
    let generation = APP.with(|cell| {
        let mut guard = cell.borrow_mut();
        let app = guard.as_mut()?;
        app.loop_generation = app.loop_generation.wrapping_add(1);
        app.ticking = true;
        app.step.reset();
        Some(app.loop_generation)
    });
    if let Some(generation) = generation {
        start_frame_loop(generation);
    }
}

/// Stale frames already scheduled see the new generation and exit without ticking.
fn stop_ticking() {
    APP.with(|cell| {
        if let Some(app) = cell.borrow_mut().as_mut() {
            app.loop_generation = app.loop_generation.wrapping_add(1);
            app.ticking = false;
        }
    });
}

fn start_frame_loop(generation: u32) {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        if !on_frame(generation, ts) {
            // drop our own closure; nothing references this loop any more
            let _ = f.borrow_mut().take();
            return;
        }
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}

fn request_frame(f: &FrameCallback) {
    if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

/// Run the ticks owed for this frame. Returns whether the loop should continue.
fn on_frame(generation: u32, ts: f64) -> bool {
    let owed = APP.with(|cell| {
        let mut guard = cell.borrow_mut();
        let app = guard.as_mut()?;
        if !app.ticking || app.loop_generation != generation || !app.game.session().is_playing() {
            return None;
        }
        Some(app.step.advance(ts))
    });
    let Some(owed) = owed else { return false };
    EVENTS.with(|q| {
        let mut q = q.borrow_mut();
        for _ in 0..owed {
            q.push(GameEvent::Tick);
        }
    });
    pump();
    APP.with(|cell| {
        cell.borrow()
            .as_ref()
            .is_some_and(|a| a.ticking && a.loop_generation == generation)
    })
}

/// Replace the tuning used by the next session.
#[cfg(feature = "serde_json")]
pub fn configure(cfg: GameConfig) -> Result<(), GameError> {
    APP.with(|cell| {
        let mut guard = cell.borrow_mut();
        let app = guard
            .as_mut()
            .ok_or_else(|| GameError::Dom("game not mounted".into()))?;
        let step = FixedStep::new(cfg.tick_ms, cfg.max_ticks_per_frame);
        app.game.configure(cfg)?;
        app.step = step;
        Ok(())
    })
}

#[cfg(feature = "serde_json")]
pub fn last_summary() -> Option<GameSummary> {
    APP.with(|cell| cell.borrow().as_ref().and_then(|a| a.game.session().summary()))
}

/// Mount if needed and begin a session with `song_id`, or a random song.
pub fn start(song_id: Option<&str>) -> Result<(), GameError> {
    mount()?;
    if let Some(id) = song_id {
        crate::songs::find(id)?;
    }
    if is_playing() {
        return Err(GameError::AlreadyPlaying);
    }
    post(GameEvent::Start(song_id.map(str::to_string)));
    Ok(())
}
