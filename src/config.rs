//! Tunable gameplay constants.
//!
//! Lane coordinates are in canvas pixels along the scroll axis; notes start to
//! the right of the visible lane and move toward zero.

use crate::error::GameError;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Lane units a note moves per tick at tempo 1.0.
    pub base_speed: f64,
    /// Cursor advance between two notes at tempo 1.0.
    pub base_spacing: f64,
    /// Fraction of `base_spacing` a rest advances the cursor.
    pub rest_spacing_factor: f64,
    /// Cursor position of the first symbol.
    pub spawn_offset: f64,
    pub zone_start: f64,
    pub zone_end: f64,
    /// How far past `zone_start` a pending note may drift before it counts as missed.
    pub miss_margin: f64,
    /// Positions never go below this; notes at or under it leave the active set.
    pub position_floor: f64,
    pub tick_ms: f64,
    pub duration_secs: f64,
    pub swing_reset_ms: f64,
    /// Catch-up cap when a frame arrives late.
    pub max_ticks_per_frame: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            base_speed: 5.0,
            base_spacing: 220.0,
            rest_spacing_factor: 0.6,
            spawn_offset: 800.0,
            zone_start: 50.0,
            zone_end: 150.0,
            miss_margin: 50.0,
            position_floor: -100.0,
            tick_ms: 16.0,
            duration_secs: 60.0,
            swing_reset_ms: 200.0,
            max_ticks_per_frame: 5,
        }
    }
}

impl GameConfig {
    pub fn tick_secs(&self) -> f64 {
        self.tick_ms / 1000.0
    }

    /// Pending notes strictly left of this line are auto-missed.
    pub fn miss_line(&self) -> f64 {
        self.zone_start - self.miss_margin
    }

    pub fn effective_speed(&self, tempo: f64) -> f64 {
        self.base_speed * tempo
    }

    pub fn spacing(&self, tempo: f64) -> f64 {
        self.base_spacing / tempo
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let positive = [
            ("base_speed", self.base_speed),
            ("base_spacing", self.base_spacing),
            ("tick_ms", self.tick_ms),
            ("duration_secs", self.duration_secs),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(GameError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.rest_spacing_factor.is_nan() || self.rest_spacing_factor < 0.0 {
            return Err(GameError::InvalidConfig(
                "rest_spacing_factor must not be negative".into(),
            ));
        }
        if self.zone_start > self.zone_end {
            return Err(GameError::InvalidConfig(format!(
                "hit zone is inverted: [{}, {}]",
                self.zone_start, self.zone_end
            )));
        }
        if self.position_floor >= self.miss_line() {
            return Err(GameError::InvalidConfig(format!(
                "position_floor {} must lie below the miss line {}",
                self.position_floor,
                self.miss_line()
            )));
        }
        if self.max_ticks_per_frame == 0 {
            return Err(GameError::InvalidConfig(
                "max_ticks_per_frame must be at least 1".into(),
            ));
        }
        let fastest = crate::songs::catalog()
            .iter()
            .map(|s| s.tempo)
            .fold(0.0, f64::max);
        self.check_tempo(fastest)
    }

    /// A note must not move far enough in one tick to jump the hit zone or to
    /// pass from the miss line to the floor between two sweeps.
    pub fn check_tempo(&self, tempo: f64) -> Result<(), GameError> {
        if !(tempo.is_finite() && tempo > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "tempo must be positive, got {tempo}"
            )));
        }
        let step = self.effective_speed(tempo);
        let zone = self.zone_end - self.zone_start;
        if step > zone {
            return Err(GameError::InvalidConfig(format!(
                "speed {step} per tick at tempo {tempo} skips the {zone}-wide hit zone"
            )));
        }
        let margin = self.miss_line() - self.position_floor;
        if step >= margin {
            return Err(GameError::InvalidConfig(format!(
                "speed {step} per tick at tempo {tempo} drops notes past the miss line \
                 before they can be swept ({margin} to the floor)"
            )));
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON object; absent fields keep their defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let cfg: GameConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
