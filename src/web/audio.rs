//! `<audio>` element playback. Load/play failures are posted back as events and
//! never block the frame loop.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlAudioElement;

use crate::error::{GameError, js_message};
use crate::game::{AudioService, GameEvent};
use crate::songs::Song;

type JsCallback = Closure<dyn FnMut(JsValue)>;

pub struct HtmlAudio {
    el: HtmlAudioElement,
    /// Cleared by pause/stop so a late `canplaythrough` cannot restart music.
    armed: Rc<Cell<bool>>,
    _on_ready: JsCallback,
    _on_error: JsCallback,
}

impl HtmlAudio {
    pub fn new() -> Result<Self, GameError> {
        let el = HtmlAudioElement::new().map_err(GameError::dom)?;
        el.set_preload("auto");
        el.set_volume(1.0);
        let armed = Rc::new(Cell::new(false));

        let on_reject: Rc<JsCallback> = Rc::new(Closure::wrap(Box::new(|err: JsValue| {
            super::post(GameEvent::AudioFailed(js_message(&err)));
        }) as Box<dyn FnMut(JsValue)>));

        let on_ready = {
            let el = el.clone();
            let armed = armed.clone();
            Closure::wrap(Box::new(move |_evt: JsValue| {
                if !armed.get() {
                    return;
                }
                armed.set(false);
                match el.play() {
                    Ok(promise) => {
                        let _ = promise.catch(&on_reject);
                        super::post(GameEvent::AudioReady);
                    }
                    Err(err) => super::post(GameEvent::AudioFailed(js_message(&err))),
                }
            }) as Box<dyn FnMut(JsValue)>)
        };
        el.set_oncanplaythrough(Some(on_ready.as_ref().unchecked_ref()));

        let on_error = Closure::wrap(Box::new(|_evt: JsValue| {
            super::post(GameEvent::AudioFailed("audio file could not be loaded".into()));
        }) as Box<dyn FnMut(JsValue)>);
        el.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Ok(Self { el, armed, _on_ready: on_ready, _on_error: on_error })
    }
}

impl AudioService for HtmlAudio {
    fn play(&mut self, song: &'static Song) -> Result<(), GameError> {
        if song.audio_src.is_empty() {
            return Err(GameError::AudioUnavailable { song: song.name.to_string() });
        }
        self.el.pause().ok();
        self.el.set_current_time(0.0);
        self.el.set_src(song.audio_src);
        self.armed.set(true);
        self.el.load();
        log::debug!("loading {}", song.audio_src);
        Ok(())
    }

    fn pause(&mut self) {
        self.armed.set(false);
        self.el.pause().ok();
    }

    fn stop(&mut self) {
        self.armed.set(false);
        self.el.pause().ok();
        self.el.set_current_time(0.0);
    }
}
