//! Scalar helpers shared by every channel.

use std::f32::consts::LN_2;

/// Linear interpolation with `t` clamped to `[0, 1]`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Fraction of the remaining gap to close during `dt` so that `half_life`
/// of elapsed time always closes exactly half of it, whatever the frame rate.
///
/// A non-positive half-life snaps (returns 1).
#[inline]
pub fn smooth_factor(half_life: f32, dt: f32) -> f32 {
    if half_life <= 0.0 {
        return 1.0;
    }
    1.0 - (-LN_2 / half_life * dt).exp()
}

/// Hermite easing `3t² − 2t³` on a clamped `t`.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// One exponential smoothing step of `current` toward `target`.
#[inline]
pub fn approach(current: f32, target: f32, half_life: f32, dt: f32) -> f32 {
    lerp(current, target, smooth_factor(half_life, dt))
}
