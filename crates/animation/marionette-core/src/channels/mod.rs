//! Independent parameter sources recomputed once per tick.
//!
//! Each channel owns its timers and accumulators and produces its own
//! contribution; merging happens in `compositor`.

pub mod action;
pub mod emotion;
pub mod manual;
pub mod mouth;
pub mod state;
pub mod tracking;

pub use action::ActionQueue;
pub use emotion::{EmotionCategory, EmotionChannel};
pub use manual::ManualOverride;
pub use mouth::MouthChannel;
pub use state::StateChannel;
pub use tracking::TrackingOverlay;
