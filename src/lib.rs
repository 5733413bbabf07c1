//! Swing Rhythm core crate.
//!
//! Notes scroll right-to-left through a hit zone; the player answers each
//! with the matching arrow key. The game logic (song catalog, note layout,
//! fixed-step clock, judging, game-over arbitration and the session state
//! machine) is plain Rust and runs natively under `cargo test`. The `web`
//! module is the browser shell exposed through `wasm-bindgen`.

use wasm_bindgen::prelude::*;

pub mod arbiter;
pub mod clock;
pub mod config;
pub mod error;
pub mod game;
pub mod judge;
mod logging;
pub mod notes;
pub mod session;
pub mod songs;
pub mod summary;
mod web;

pub use arbiter::GameOverReason;
pub use config::GameConfig;
pub use error::GameError;
pub use game::{AudioService, Effect, EventQueue, Game, GameEvent, Renderer, Scene};
pub use notes::{Direction, Note};
pub use session::{GameState, Session};
pub use songs::{Beat, Song};
pub use summary::GameSummary;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
}

// -----------------------------------------------------------------------------
// JS entrypoints
// -----------------------------------------------------------------------------

/// Show the start screen without starting a session.
#[wasm_bindgen]
pub fn mount_game() -> Result<(), JsValue> {
    Ok(web::mount()?)
}

/// Start (or restart after game over) with a random song.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    Ok(web::start(None)?)
}

/// Start with a specific catalog song (`"song1"`..`"song4"`).
#[wasm_bindgen]
pub fn start_song(song_id: &str) -> Result<(), JsValue> {
    Ok(web::start(Some(song_id))?)
}

/// Abandon the current session and return to the start screen.
#[wasm_bindgen]
pub fn stop_game() {
    web::post(GameEvent::Dispose);
}

/// Replace tuning constants for the next session from a partial JSON object.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn configure(json: &str) -> Result<(), JsValue> {
    let cfg = GameConfig::from_json(json)?;
    Ok(web::configure(cfg)?)
}

/// Result of the finished session as JSON, or `null` while none is available.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn last_result_json() -> Result<Option<String>, JsValue> {
    match web::last_summary() {
        Some(summary) => Ok(Some(summary.to_json()?)),
        None => Ok(None),
    }
}

/// Song ids and names, one `id:name` pair per entry.
#[wasm_bindgen]
pub fn song_list() -> Vec<String> {
    songs::catalog()
        .iter()
        .map(|s| format!("{}:{}", s.id, s.name))
        .collect()
}

#[cfg(target_arch = "wasm32")]
fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
