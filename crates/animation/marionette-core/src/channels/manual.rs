//! Caller-driven absolute poses (e.g. eyes closed). Highest priority below
//! the tracking overlay; its output overwrites the merged base.

use crate::interp::approach;
use crate::params::ParamMap;

/// Rest values the channel returns to when cleared. Ids not listed rest at 0.
pub const REST_POSE: &[(&str, f32)] = &[
    ("ParamEyeLOpen", 1.0),
    ("ParamEyeROpen", 1.0),
    ("ParamEyeLSmile", 0.0),
    ("ParamEyeRSmile", 0.0),
    ("ParamBrowLY", 0.0),
    ("ParamBrowRY", 0.0),
    ("ParamMouthForm", 0.0),
];

#[inline]
pub fn rest_value(id: &str) -> f32 {
    REST_POSE
        .iter()
        .find_map(|(k, v)| (*k == id).then_some(*v))
        .unwrap_or(0.0)
}

#[derive(Debug, Default)]
pub struct ManualOverride {
    target: ParamMap,
    current: ParamMap,
    active: bool,
}

impl ManualOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, params: ParamMap) {
        self.target = params;
        self.active = true;
    }

    /// Deactivate; tracked ids ease back to their rest values.
    pub fn clear(&mut self) {
        self.active = false;
        self.target.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn tracked(&self) -> impl Iterator<Item = &str> {
        self.current.keys().map(String::as_str)
    }

    pub fn compute(&mut self, dt: f32, half_life: f32, epsilon: f32) -> ParamMap {
        if !self.active && self.current.is_empty() {
            return ParamMap::new();
        }

        for id in self.target.keys() {
            if !self.current.contains_key(id) {
                self.current.insert(id.clone(), rest_value(id));
            }
        }

        let mut out = ParamMap::with_capacity(self.current.len());
        let active = self.active;
        let target = &self.target;
        self.current.retain(|id, cur| {
            let rest = rest_value(id);
            let goal = if active {
                target.get(id).copied().unwrap_or(rest)
            } else {
                rest
            };
            *cur = approach(*cur, goal, half_life, dt);
            out.insert(id.clone(), *cur);
            active || (*cur - rest).abs() >= epsilon
        });
        out
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
