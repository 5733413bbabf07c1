//! Built-in song catalog.
//!
//! A song is an ordered pattern of beats plus a tempo factor. Rests only push
//! the next note further down the lane; they never become notes.

use crate::error::GameError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Beat {
    Left,
    Right,
    Rest,
}

impl Beat {
    pub fn is_note(self) -> bool {
        !matches!(self, Beat::Rest)
    }
}

#[derive(Debug)]
pub struct Song {
    pub id: &'static str,
    pub name: &'static str,
    /// Asset path handed to the audio element.
    pub audio_src: &'static str,
    pub pattern: &'static [Beat],
    /// >1 packs notes closer together and scrolls them faster.
    pub tempo: f64,
}

impl Song {
    /// Number of notes the pattern produces (rests excluded).
    pub fn note_count(&self) -> usize {
        self.pattern.iter().filter(|b| b.is_note()).count()
    }
}

const L: Beat = Beat::Left;
const R: Beat = Beat::Right;
const S: Beat = Beat::Rest;

static BUTTERFLY: Song = Song {
    id: "song1",
    name: "蝴蝶",
    audio_src: "/songs/butterfly.mp3",
    pattern: &[L, S, R, S, L, L, S, R, R, S, L, S, R, L, R],
    tempo: 0.8,
};

static FIELD: Song = Song {
    id: "song2",
    name: "王老先生有塊地",
    audio_src: "/songs/field.mp3",
    pattern: &[L, R, L, S, R, L, R, S, L, R, L, R, L, S, R, L, R, R],
    tempo: 1.0,
};

static STAR: Song = Song {
    id: "song3",
    name: "小星星",
    audio_src: "/songs/star.mp3",
    pattern: &[
        L, R, L, R, L, L, R, R, L, R, L, R, S, L, R, L, R, L, L, R, R,
    ],
    tempo: 1.2,
};

static TIGERS: Song = Song {
    id: "song4",
    name: "兩隻老虎",
    audio_src: "/songs/tigers.mp3",
    pattern: &[
        L, R, L, R, S, L, R, L, R, S, L, L, R, R, S, L, R, L, R, L, R, S, L, R, L, R,
    ],
    tempo: 1.4,
};

static CATALOG: [&Song; 4] = [&BUTTERFLY, &FIELD, &STAR, &TIGERS];

pub fn catalog() -> &'static [&'static Song] {
    &CATALOG
}

pub fn find(id: &str) -> Result<&'static Song, GameError> {
    catalog()
        .iter()
        .copied()
        .find(|s| s.id == id)
        .ok_or_else(|| GameError::UnknownSong(id.to_string()))
}

/// Uniform choice from the catalog using `roll(len)` as the index source.
pub fn pick(roll: impl FnOnce(usize) -> usize) -> &'static Song {
    let songs = catalog();
    songs[roll(songs.len()) % songs.len()]
}

/// Random index in `0..len` (0 when `len == 0`).
pub fn random_index(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (entropy() as usize)
        .wrapping_mul(1664525)
        .wrapping_add(1013904223)
        % len
}

fn entropy() -> u64 {
    #[cfg(feature = "rng")]
    {
        let mut buf = [0u8; 8];
        if getrandom::getrandom(&mut buf).is_ok() {
            return u64::from_le_bytes(buf);
        }
    }
    clock_seed()
}

#[cfg(target_arch = "wasm32")]
fn clock_seed() -> u64 {
    crate::performance_now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64 ^ d.as_secs())
        .unwrap_or(0)
}
