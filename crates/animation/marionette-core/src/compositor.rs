//! Merging of channel contributions into one frame.
//!
//! Order is fixed: state → mouth → action (later key wins), then emotion
//! overlays by blend mode, then manual overrides (overwrite), then the
//! tracking overlay as a linear mix weighted by its blend scalar.

use indexmap::IndexMap;
use log::debug;

use crate::interp::lerp;
use crate::params::{Blended, ParamMap, Rig};

/// Every channel's output for one tick.
#[derive(Debug, Default)]
pub struct Layers {
    pub state: ParamMap,
    pub mouth: Option<(String, f32)>,
    pub action: ParamMap,
    pub emotion: IndexMap<String, Blended>,
    pub overrides: ParamMap,
    pub tracking: ParamMap,
    pub tracking_blend: f32,
}

/// Combine all layers; non-finite results are dropped.
pub fn compose(layers: Layers) -> ParamMap {
    let Layers {
        state,
        mouth,
        action,
        emotion,
        overrides,
        tracking,
        tracking_blend,
    } = layers;

    let mut merged = state;
    if let Some((id, value)) = mouth {
        merged.insert(id, value);
    }
    merged.extend(action);
    apply_emotion(&mut merged, &emotion);
    apply_overrides(&mut merged, overrides);
    apply_tracking(&mut merged, &tracking, tracking_blend);

    merged.retain(|id, v| {
        if v.is_finite() {
            true
        } else {
            debug!("dropping non-finite value for {id}");
            false
        }
    });
    merged
}

/// Apply expression overlays using each entry's blend mode.
pub fn apply_emotion(merged: &mut ParamMap, emotion: &IndexMap<String, Blended>) {
    for (id, b) in emotion {
        let value = b.blend.apply(merged.get(id).copied(), b.value);
        merged.insert(id.clone(), value);
    }
}

/// Absolute poses replace whatever is underneath.
pub fn apply_overrides(merged: &mut ParamMap, overrides: ParamMap) {
    merged.extend(overrides);
}

/// Mix tracked values over the base: `lerp(base or 0, tracked, blend)`.
/// A zero blend leaves the base untouched.
pub fn apply_tracking(merged: &mut ParamMap, tracking: &ParamMap, blend: f32) {
    if blend <= 0.0 {
        return;
    }
    for (id, tracked) in tracking {
        let base = merged.get(id).copied().unwrap_or(0.0);
        merged.insert(id.clone(), lerp(base, *tracked, blend));
    }
}

/// Write a frame to the rig.
pub fn commit<R: Rig + ?Sized>(frame: &ParamMap, rig: &mut R) {
    for (id, value) in frame {
        rig.set_parameter(id, *value);
    }
}
