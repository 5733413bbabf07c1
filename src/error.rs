//! Error type shared by the core and the browser shell.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum GameError {
    /// No playable source exists for the song.
    #[error("no audio source for song '{song}'")]
    AudioUnavailable { song: String },

    /// The browser refused to load or play the song.
    #[error("could not play '{song}': {reason}")]
    AudioRejected { song: String, reason: String },

    #[error("dom: {0}")]
    Dom(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown song id '{0}'")]
    UnknownSong(String),

    #[error("a session is already playing")]
    AlreadyPlaying,

    #[cfg(feature = "serde_json")]
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl GameError {
    /// Wrap a raw JS exception (or any thrown value) as a DOM error.
    pub fn dom(value: JsValue) -> Self {
        GameError::Dom(js_message(&value))
    }
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort readable text for a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_song() {
        let err = GameError::AudioRejected {
            song: "小星星".into(),
            reason: "NotAllowedError".into(),
        };
        assert_eq!(err.to_string(), "could not play '小星星': NotAllowedError");
        assert_eq!(
            GameError::UnknownSong("song9".into()).to_string(),
            "unknown song id 'song9'"
        );
    }
}
