//! Tuning constants for the compositing engine.
//!
//! All half-lives and durations are in milliseconds except
//! `default_fade_in_time`, which follows the expression file unit (seconds).

use serde::{Deserialize, Serialize};

/// Engine tuning. Every field has an empirically chosen default; hosts may
/// deserialize overrides from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Distance below which an accumulator counts as having reached rest.
    pub epsilon: f32,
    /// Upper bound on the per-tick time step.
    pub max_dt_ms: f32,
    /// Time step assumed for the first tick after (re)initialisation.
    pub first_dt_ms: f32,

    pub mouth: MouthTuning,
    pub emotion: EmotionTuning,
    /// Half-life of the manual override channel.
    pub override_half_life_ms: f32,
    pub tracking: TrackingTuning,

    /// File name of the actions document, relative to the character directory.
    pub actions_file: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouthTuning {
    /// Minimum hold time of one mouth target.
    pub cadence_base_ms: f64,
    /// Random extra hold time, drawn uniformly from `[0, cadence_jitter_ms)`.
    pub cadence_jitter_ms: f64,
    /// The state's `mouth.speed` is divided by this to get the follow half-life.
    pub speed_divisor: f32,
    /// Half-life used to close the mouth after leaving a talking state.
    pub close_half_life_ms: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionTuning {
    /// Multiplier turning an expression's `FadeInTime` (s) into a half-life (ms).
    pub fade_scale: f32,
    pub min_half_life_ms: f32,
    /// Fade-in time used when a file omits `FadeInTime` or no expression is targeted.
    pub default_fade_in_time: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingTuning {
    pub blend_in_half_life_ms: f32,
    pub blend_out_half_life_ms: f32,
    pub follow_half_life_ms: f32,
    pub return_half_life_ms: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            epsilon: 0.001,
            max_dt_ms: 100.0,
            first_dt_ms: 16.0,
            mouth: MouthTuning::default(),
            emotion: EmotionTuning::default(),
            override_half_life_ms: 100.0,
            tracking: TrackingTuning::default(),
            actions_file: "actions.json".to_string(),
        }
    }
}

impl Default for MouthTuning {
    fn default() -> Self {
        Self {
            cadence_base_ms: 80.0,
            cadence_jitter_ms: 170.0,
            speed_divisor: 3.0,
            close_half_life_ms: 30.0,
        }
    }
}

impl Default for EmotionTuning {
    fn default() -> Self {
        Self {
            fade_scale: 300.0,
            min_half_life_ms: 80.0,
            default_fade_in_time: 0.5,
        }
    }
}

impl Default for TrackingTuning {
    fn default() -> Self {
        Self {
            blend_in_half_life_ms: 60.0,
            blend_out_half_life_ms: 120.0,
            follow_half_life_ms: 40.0,
            return_half_life_ms: 80.0,
        }
    }
}
