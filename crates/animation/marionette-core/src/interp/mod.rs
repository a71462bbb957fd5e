//! Interpolation and smoothing primitives.
//!
//! Pure functions only: clamped lerp, frame-rate independent exponential
//! approach, smoothstep easing, and keyframe sampling (in `sampling`).

pub mod functions;

pub use functions::{approach, lerp, smooth_factor, smoothstep};
