//! Parameter maps, blend modes and the rig write contract.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered `parameter id → value` association. Insertion order is the rig
/// write order, which keeps frames reproducible.
pub type ParamMap = IndexMap<String, f32>;

/// How an overlay value combines with the already merged base.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendMode {
    /// `base + value`, base defaults to 0.
    #[default]
    Add,
    /// `base × value`, base defaults to 1.
    Multiply,
    /// `value`, base ignored.
    Overwrite,
}

impl BlendMode {
    /// Combine `value` into the optional current base value.
    #[inline]
    pub fn apply(self, base: Option<f32>, value: f32) -> f32 {
        match self {
            BlendMode::Add => base.unwrap_or(0.0) + value,
            BlendMode::Multiply => base.unwrap_or(1.0) * value,
            BlendMode::Overwrite => value,
        }
    }
}

/// Overlay contribution: value plus the rule used to merge it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Blended {
    pub value: f32,
    pub blend: BlendMode,
}

/// Sink for per-frame parameter writes.
///
/// Implementations must ignore ids they do not know and accept repeated
/// writes of unchanged values.
pub trait Rig {
    fn set_parameter(&mut self, id: &str, value: f32);
}

/// Recording rig: keeps the last value written per id.
impl Rig for ParamMap {
    fn set_parameter(&mut self, id: &str, value: f32) {
        match self.get_mut(id) {
            Some(slot) => *slot = value,
            None => {
                self.insert(id.to_string(), value);
            }
        }
    }
}

impl<R: Rig + ?Sized> Rig for &mut R {
    fn set_parameter(&mut self, id: &str, value: f32) {
        (**self).set_parameter(id, value)
    }
}

impl<R: Rig + ?Sized> Rig for Box<R> {
    fn set_parameter(&mut self, id: &str, value: f32) {
        (**self).set_parameter(id, value)
    }
}
