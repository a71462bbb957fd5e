//! Pointer-follow overlay mixed over everything else by a blend scalar.

use crate::config::TrackingTuning;
use crate::interp::approach;
use crate::params::ParamMap;

/// `(id, x scale, y scale)`: each tracked id is `x * sx + y * sy`.
pub const TRACKING_MAP: &[(&str, f32, f32)] = &[
    ("ParamAngleX", 30.0, 0.0),
    ("ParamAngleY", 0.0, 30.0),
    ("ParamEyeBallX", 1.0, 0.0),
    ("ParamEyeBallY", 0.0, 1.0),
    ("ParamBodyAngleX", 10.0, 0.0),
];

/// Map a normalized pointer position to rig parameters.
pub fn tracked_params(x: f32, y: f32) -> ParamMap {
    TRACKING_MAP
        .iter()
        .map(|(id, sx, sy)| (id.to_string(), x * sx + y * sy))
        .collect()
}

#[derive(Debug, Default)]
pub struct TrackingOverlay {
    enabled: bool,
    target: [f32; 2],
    current: [f32; 2],
    blend: f32,
}

impl TrackingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.enabled = true;
    }

    pub fn stop(&mut self) {
        self.enabled = false;
    }

    /// Set the pointer target in normalized coordinates (nominally [-1, 1]).
    /// Non-finite coordinates are ignored.
    pub fn update(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.target = [x, y];
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn blend(&self) -> f32 {
        self.blend
    }

    pub fn position(&self) -> [f32; 2] {
        self.current
    }

    /// Advance blend and position; returns the tracked values (empty once
    /// fully disengaged).
    pub fn compute(&mut self, dt: f32, tuning: &TrackingTuning, epsilon: f32) -> ParamMap {
        let (goal, blend_half_life) = if self.enabled {
            (1.0, tuning.blend_in_half_life_ms)
        } else {
            (0.0, tuning.blend_out_half_life_ms)
        };
        self.blend = approach(self.blend, goal, blend_half_life, dt).clamp(0.0, 1.0);

        if self.blend < epsilon {
            self.blend = 0.0;
            self.current = [0.0, 0.0];
            return ParamMap::new();
        }

        let (target, follow_half_life) = if self.enabled {
            (self.target, tuning.follow_half_life_ms)
        } else {
            ([0.0, 0.0], tuning.return_half_life_ms)
        };
        self.current[0] = approach(self.current[0], target[0], follow_half_life, dt);
        self.current[1] = approach(self.current[1], target[1], follow_half_life, dt);
        tracked_params(self.current[0], self.current[1])
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
