//! Ambient sway selected by the current [`Mode`].

use crate::data::{Mode, StateConfig};
use crate::params::ParamMap;
use crate::sampling::interpolate_keyframes;

#[derive(Debug, Default)]
pub struct StateChannel {
    /// Mode seen on the previous tick; `None` until the first tick.
    mode: Option<Mode>,
    start_time: f64,
}

impl StateChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the externally observed mode. Returns true (and restarts the
    /// state clock) when it differs from the previous tick.
    pub fn observe(&mut self, mode: Mode, now: f64) -> bool {
        if self.mode == Some(mode) {
            return false;
        }
        self.mode = Some(mode);
        self.start_time = now;
        true
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn compute(&self, cfg: Option<&StateConfig>, now: f64) -> ParamMap {
        match cfg {
            Some(cfg) => sample_state(cfg, now - self.start_time),
            None => ParamMap::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Sample a state `elapsed` ms after it was entered.
pub fn sample_state(cfg: &StateConfig, elapsed: f64) -> ParamMap {
    if let Some((keyframes, duration)) = cfg.timeline() {
        let progress = if cfg.r#loop {
            elapsed.rem_euclid(duration) / duration
        } else {
            (elapsed / duration).clamp(0.0, 1.0)
        };
        return interpolate_keyframes(keyframes, progress as f32);
    }
    cfg.params.clone().unwrap_or_default()
}
