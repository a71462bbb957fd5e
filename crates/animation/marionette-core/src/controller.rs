//! Controller: owns every channel for one character and composes a frame
//! per host tick.
//!
//! Lifecycle:
//! - `init` / `init_with_assets` attach a rig and character data,
//! - the host calls `tick(now_ms)` once per rendered frame,
//! - `destroy` detaches the rig and clears all channel state.
//!
//! Until assets are loaded, `tick` is a no-op returning an empty frame.

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assets::{AssetSource, CharacterAssets};
use crate::channels::{
    ActionQueue, EmotionCategory, EmotionChannel, ManualOverride, MouthChannel, StateChannel,
    TrackingOverlay,
};
use crate::compositor::{self, Layers};
use crate::config::Config;
use crate::data::Mode;
use crate::error::AssetError;
use crate::params::{ParamMap, Rig};

#[derive(Debug)]
pub struct Controller<R: Rig> {
    cfg: Config,
    rig: Option<R>,
    assets: Option<CharacterAssets>,

    /// Externally set mode; the state channel picks up changes on tick.
    mode: Mode,
    last_tick: Option<f64>,

    // Channels
    state: StateChannel,
    mouth: MouthChannel,
    actions: ActionQueue,
    emotion: EmotionChannel,
    overrides: ManualOverride,
    tracking: TrackingOverlay,

    rng: StdRng,
    seed: Option<u64>,

    // Per-tick output
    frame: ParamMap,
}

impl<R: Rig> Controller<R> {
    /// Create an inert controller with an entropy-seeded random source.
    pub fn new(cfg: Config) -> Self {
        Self::build(cfg, StdRng::from_entropy(), None)
    }

    /// Create an inert controller whose random choices (mouth cadence,
    /// equivalent expressions) replay identically for a given seed.
    pub fn with_seed(cfg: Config, seed: u64) -> Self {
        Self::build(cfg, StdRng::seed_from_u64(seed), Some(seed))
    }

    fn build(cfg: Config, rng: StdRng, seed: Option<u64>) -> Self {
        Self {
            cfg,
            rig: None,
            assets: None,
            mode: Mode::default(),
            last_tick: None,
            state: StateChannel::new(),
            mouth: MouthChannel::new(),
            actions: ActionQueue::new(),
            emotion: EmotionChannel::new(),
            overrides: ManualOverride::new(),
            tracking: TrackingOverlay::new(),
            rng,
            seed,
            frame: ParamMap::new(),
        }
    }

    /// Attach `rig` and load the character whose model manifest is at
    /// `model_path`. Any previous character is torn down first.
    ///
    /// On failure the error is logged and returned, and the controller stays
    /// inert (ticks do nothing) until a later successful `init`.
    pub fn init(
        &mut self,
        rig: R,
        source: &dyn AssetSource,
        model_path: &str,
    ) -> Result<(), AssetError> {
        self.destroy();
        self.rig = Some(rig);
        match CharacterAssets::load(source, model_path, &self.cfg) {
            Ok(assets) => {
                self.assets = Some(assets);
                info!("controller initialized for {model_path}");
                Ok(())
            }
            Err(e) => {
                error!("controller initialization failed for {model_path}: {e}");
                Err(e)
            }
        }
    }

    /// Attach `rig` with already loaded character data.
    pub fn init_with_assets(&mut self, rig: R, assets: CharacterAssets) {
        self.destroy();
        self.rig = Some(rig);
        self.assets = Some(assets);
        info!("controller initialized");
    }

    /// Detach the rig and reset every channel, timer and accumulator.
    /// A seeded controller also rewinds its random source.
    pub fn destroy(&mut self) -> Option<R> {
        let rig = self.rig.take();
        if self.assets.take().is_some() {
            info!("controller destroyed");
        }
        self.mode = Mode::default();
        self.last_tick = None;
        self.state.reset();
        self.mouth.reset();
        self.actions.reset();
        self.emotion.reset();
        self.overrides.reset();
        self.tracking.reset();
        self.frame.clear();
        if let Some(seed) = self.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        rig
    }

    pub fn is_loaded(&self) -> bool {
        self.assets.is_some()
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn rig(&self) -> Option<&R> {
        self.rig.as_ref()
    }

    pub fn rig_mut(&mut self) -> Option<&mut R> {
        self.rig.as_mut()
    }

    /// Advance all channels to `now` (ms, the host's frame clock), write the
    /// merged parameters to the rig and return them.
    ///
    /// A non-finite `now` is skipped: nothing advances and the previous frame
    /// is returned without being written again.
    pub fn tick(&mut self, now: f64) -> &ParamMap {
        if !now.is_finite() {
            warn!("ignoring tick with non-finite timestamp {now}");
            return &self.frame;
        }
        self.frame.clear();
        let Some(assets) = self.assets.as_ref() else {
            return &self.frame;
        };

        let dt = match self.last_tick {
            Some(prev) => ((now - prev) as f32).clamp(0.0, self.cfg.max_dt_ms),
            None => self.cfg.first_dt_ms,
        };
        self.last_tick = Some(now);

        // Leaving talking does not touch the mouth; it closes on its own.
        if self.state.observe(self.mode, now) {
            info!("state -> {}", self.mode);
        }

        let doc = &assets.actions;
        let state_cfg = doc.state(self.mode);
        let eps = self.cfg.epsilon;
        let layers = Layers {
            state: self.state.compute(state_cfg, now),
            mouth: self.mouth.compute(
                state_cfg.and_then(|s| s.mouth.as_ref()),
                now,
                dt,
                &self.cfg.mouth,
                eps,
                &mut self.rng,
            ),
            action: self.actions.compute(doc, now),
            emotion: self
                .emotion
                .compute(&assets.expressions, dt, &self.cfg.emotion, eps),
            overrides: self
                .overrides
                .compute(dt, self.cfg.override_half_life_ms, eps),
            tracking: self.tracking.compute(dt, &self.cfg.tracking, eps),
            tracking_blend: self.tracking.blend(),
        };

        self.frame = compositor::compose(layers);
        if let Some(rig) = self.rig.as_mut() {
            compositor::commit(&self.frame, rig);
        }
        &self.frame
    }

    /// Frame produced by the most recent tick.
    pub fn frame(&self) -> &ParamMap {
        &self.frame
    }

    // ----- mode -----

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    // ----- actions -----

    /// Queue a gesture behind any already queued or playing one.
    pub fn trigger_action(&mut self, name: &str) {
        info!("trigger action: {name}");
        self.actions.push(name);
    }

    /// Cancel the playing gesture and queue, then play `name` next.
    pub fn interrupt_action(&mut self, name: &str) {
        info!("interrupt with action: {name}");
        self.actions.interrupt(name);
    }

    pub fn active_action(&self) -> Option<&str> {
        self.actions.active()
    }

    pub fn queued_actions(&self) -> impl Iterator<Item = &str> {
        self.actions.queued()
    }

    // ----- emotion -----

    /// Switch to an expression for `category`. Returns false (and keeps the
    /// current expression) when the resolved expression is not loaded.
    pub fn set_emotion(&mut self, category: EmotionCategory) -> bool {
        let name = category.resolve(&mut self.rng);
        let loaded = self
            .assets
            .as_ref()
            .is_some_and(|a| a.expressions.contains_key(name));
        if !loaded {
            warn!(
                "emotion expression not loaded: {name} (available: {:?})",
                self.available_expressions()
            );
            return false;
        }
        info!("set emotion: {category:?} -> {name}");
        self.emotion.set_target(Some(name.to_string()));
        true
    }

    /// Fade the current expression back to rest.
    pub fn clear_emotion(&mut self) {
        self.emotion.set_target(None);
    }

    pub fn current_emotion(&self) -> Option<&str> {
        self.emotion.target()
    }

    pub fn available_expressions(&self) -> Vec<&str> {
        self.assets
            .as_ref()
            .map(|a| a.expression_names().collect())
            .unwrap_or_default()
    }

    // ----- manual override -----

    /// Hold the given parameters as an absolute pose, eased in.
    /// Non-finite values are ignored.
    pub fn set_expression<I, K>(&mut self, params: I)
    where
        I: IntoIterator<Item = (K, f32)>,
        K: Into<String>,
    {
        let params: ParamMap = params
            .into_iter()
            .filter(|(_, v)| v.is_finite())
            .map(|(k, v)| (k.into(), v))
            .collect();
        self.overrides.set(params);
    }

    /// Release the pose; parameters ease back to their rest values.
    pub fn clear_expression(&mut self) {
        self.overrides.clear();
    }

    // ----- tracking -----

    pub fn start_tracking(&mut self) {
        self.tracking.start();
    }

    pub fn stop_tracking(&mut self) {
        self.tracking.stop();
    }

    pub fn update_tracking(&mut self, x: f32, y: f32) {
        self.tracking.update(x, y);
    }

    pub fn tracking_blend(&self) -> f32 {
        self.tracking.blend()
    }
}

impl<R: Rig> Default for Controller<R> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
