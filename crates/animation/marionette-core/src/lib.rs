//! Marionette Core (rig-agnostic)
//!
//! Composites several independently evolving animation channels into one
//! parameter frame per rendered frame for a 2D parametric avatar:
//! ambient state sway with a mouth sub-channel, a FIFO gesture queue,
//! expression overlays with per-parameter blend modes, manual pose overrides,
//! and a pointer-tracking overlay. All smoothing is half-life based and
//! therefore frame-rate independent.
//!
//! The host owns the render loop and calls [`Controller::tick`] each frame;
//! results are written to a [`Rig`].

pub mod assets;
pub mod channels;
pub mod compositor;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod interp;
pub mod params;
pub mod sampling;

// Re-exports for hosts
pub use assets::{AssetSource, CharacterAssets, FsAssetSource, MemoryAssetSource};
pub use channels::EmotionCategory;
pub use config::Config;
pub use controller::Controller;
pub use data::{
    ActionConfig, ActionsDocument, ExpressionDefinition, ExpressionParam, Keyframe, Mode,
    MouthConfig, StateConfig,
};
pub use error::AssetError;
pub use interp::{lerp, smooth_factor};
pub use params::{BlendMode, Blended, ParamMap, Rig};
pub use sampling::interpolate_keyframes;
