//! Character animation data: the actions document and expression definitions.
//!
//! Durations are milliseconds; keyframe stamps are normalized to `[0, 1]`.

use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::params::{BlendMode, ParamMap};

/// Externally driven discrete mode selecting the ambient state animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Idle,
    Thinking,
    Talking,
}

impl Mode {
    /// Key of this mode in the actions document `states` table.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Thinking => "thinking",
            Mode::Talking => "talking",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Mode::Idle),
            "thinking" => Ok(Mode::Thinking),
            "talking" => Ok(Mode::Talking),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

/// A sample of a subset of parameters at normalized progress `t`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub t: f32,
    #[serde(default)]
    pub params: ParamMap,
}

/// Procedural mouth flapping attached to a state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MouthConfig {
    /// Parameter id driven by the mouth channel.
    pub param: String,
    /// Follow speed; the follow half-life is `speed / speed_divisor` ms.
    pub speed: f32,
    pub min: f32,
    pub max: f32,
}

/// Ambient animation for one mode. Keyframes plus a positive duration take
/// precedence over static params; with neither the state contributes nothing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default)]
    pub r#loop: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyframes: Option<Vec<Keyframe>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<ParamMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouth: Option<MouthConfig>,
}

impl StateConfig {
    /// Keyframes and duration, when this state is keyframe driven.
    pub fn timeline(&self) -> Option<(&[Keyframe], f64)> {
        match (&self.keyframes, self.duration) {
            (Some(k), Some(d)) if !k.is_empty() && d > 0.0 => Some((k.as_slice(), d)),
            _ => None,
        }
    }
}

/// One-shot gesture; lives for `duration × repeat` ms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    pub duration: f64,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    pub keyframes: Vec<Keyframe>,
}

fn default_repeat() -> u32 {
    1
}

impl ActionConfig {
    #[inline]
    pub fn total_duration(&self) -> f64 {
        self.duration.max(0.0) * f64::from(self.repeat)
    }
}

/// Per-character state and action tables, immutable after loading.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionsDocument {
    #[serde(default)]
    pub states: HashMap<String, StateConfig>,
    #[serde(default)]
    pub actions: HashMap<String, ActionConfig>,
}

impl ActionsDocument {
    pub fn state(&self, mode: Mode) -> Option<&StateConfig> {
        self.states.get(mode.as_str())
    }

    pub fn action(&self, name: &str) -> Option<&ActionConfig> {
        self.actions.get(name)
    }

    /// Validate basic invariants (stamps in [0,1] and non-decreasing, finite values).
    pub fn validate_basic(&self) -> Result<(), String> {
        for (name, state) in &self.states {
            if let Some(keyframes) = &state.keyframes {
                validate_keyframes(keyframes).map_err(|e| format!("state '{name}': {e}"))?;
            }
            if let Some(params) = &state.params {
                validate_params(params).map_err(|e| format!("state '{name}': {e}"))?;
            }
            if let Some(mouth) = &state.mouth {
                if !(mouth.min.is_finite() && mouth.max.is_finite() && mouth.speed.is_finite()) {
                    return Err(format!("state '{name}': mouth values must be finite"));
                }
                if mouth.min > mouth.max {
                    return Err(format!("state '{name}': mouth.min must not exceed mouth.max"));
                }
                if !(mouth.max - mouth.min).is_finite() {
                    return Err(format!("state '{name}': mouth range is too wide"));
                }
            }
        }
        for (name, action) in &self.actions {
            if !action.duration.is_finite() {
                return Err(format!("action '{name}': duration must be finite"));
            }
            validate_keyframes(&action.keyframes).map_err(|e| format!("action '{name}': {e}"))?;
        }
        Ok(())
    }
}

fn validate_keyframes(keyframes: &[Keyframe]) -> Result<(), String> {
    let mut last = -f32::INFINITY;
    for k in keyframes {
        if !k.t.is_finite() || k.t < 0.0 || k.t > 1.0 {
            return Err("keyframe t must be in [0,1] and finite".into());
        }
        if k.t < last {
            return Err("keyframe t must be non-decreasing".into());
        }
        last = k.t;
        validate_params(&k.params)?;
    }
    Ok(())
}

fn validate_params(params: &ParamMap) -> Result<(), String> {
    match params.iter().find(|(_, v)| !v.is_finite()) {
        Some((id, _)) => Err(format!("value for '{id}' must be finite")),
        None => Ok(()),
    }
}

/// One parameter entry of an expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpressionParam {
    pub id: String,
    pub value: f32,
    pub blend: BlendMode,
}

/// A named facial expression overlay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpressionDefinition {
    pub name: String,
    /// Seconds, as declared by the expression file.
    pub fade_in_time: f32,
    pub params: Vec<ExpressionParam>,
}

impl ExpressionDefinition {
    pub fn param(&self, id: &str) -> Option<&ExpressionParam> {
        self.params.iter().find(|p| p.id == id)
    }
}
