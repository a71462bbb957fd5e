//! Keyframe sampling.
//!
//! Model:
//! - Keyframes are ordered by normalized stamp `t` in [0,1].
//! - Progress outside `[first.t, last.t]` holds the boundary keyframes.
//! - Within a segment the local fraction is eased with smoothstep, then every
//!   id present in either bracketing keyframe is lerped; an id missing on one
//!   side reads as 0 there.

use crate::data::Keyframe;
use crate::interp::{lerp, smoothstep};
use crate::params::ParamMap;

/// Find the segment `[i, i+1]` containing `p` and the local fraction within it.
/// `p` must already be clamped to the keyframe span; `keyframes.len() >= 2`.
fn find_segment(keyframes: &[Keyframe], p: f32) -> (usize, usize, f32) {
    let n = keyframes.len();
    for i in 0..(n - 1) {
        let t0 = keyframes[i].t;
        let t1 = keyframes[i + 1].t;
        if p >= t0 && p <= t1 {
            let span = t1 - t0;
            let local = if span > 0.0 { (p - t0) / span } else { 0.0 };
            return (i, i + 1, local.clamp(0.0, 1.0));
        }
    }
    (n - 2, n - 1, 1.0)
}

/// Sample `keyframes` at normalized `progress`.
pub fn interpolate_keyframes(keyframes: &[Keyframe], progress: f32) -> ParamMap {
    let (first, last) = match (keyframes.first(), keyframes.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return ParamMap::new(),
    };
    if keyframes.len() == 1 {
        return first.params.clone();
    }

    let p = if progress.is_finite() { progress } else { 0.0 };
    let p = p.clamp(0.0, 1.0).max(first.t).min(last.t.max(first.t));
    let (i0, i1, local) = find_segment(keyframes, p);
    let left = &keyframes[i0].params;
    let right = &keyframes[i1].params;
    let eased = smoothstep(local);

    let mut out = ParamMap::with_capacity(left.len().max(right.len()));
    for (id, a) in left {
        let b = right.get(id).copied().unwrap_or(0.0);
        out.insert(id.clone(), lerp(*a, b, eased));
    }
    for (id, b) in right {
        if !left.contains_key(id) {
            out.insert(id.clone(), lerp(0.0, *b, eased));
        }
    }
    out
}
