//! Expression overlays loaded from per-character expression files.

use std::str::FromStr;

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::EmotionTuning;
use crate::data::ExpressionDefinition;
use crate::interp::approach;
use crate::params::{BlendMode, Blended, ParamMap};

/// Coarse emotion chosen by the behaviour controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionCategory {
    Normal,
    Positive,
    Negative,
    Surprise,
}

impl EmotionCategory {
    /// Concrete expression names this category may resolve to.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            EmotionCategory::Normal => &["normal"],
            EmotionCategory::Positive => &["happy", "enjoy"],
            EmotionCategory::Negative => &["sad"],
            EmotionCategory::Surprise => &["surprise"],
        }
    }

    /// Pick one candidate uniformly.
    pub fn resolve<G: Rng>(self, rng: &mut G) -> &'static str {
        self.candidates().choose(rng).copied().unwrap_or("normal")
    }
}

impl FromStr for EmotionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(EmotionCategory::Normal),
            "positive" => Ok(EmotionCategory::Positive),
            "negative" => Ok(EmotionCategory::Negative),
            "surprise" => Ok(EmotionCategory::Surprise),
            other => Err(format!("unknown emotion category '{other}'")),
        }
    }
}

/// Smoothly cross-fades between expressions. Parameters leaving the target
/// fade to 0 with `Add` semantics and are forgotten once near zero.
#[derive(Debug, Default)]
pub struct EmotionChannel {
    target: Option<String>,
    current: ParamMap,
}

impl EmotionChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_target(&mut self, name: Option<String>) {
        self.target = name;
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Ids still carrying a non-rest accumulator.
    pub fn tracked(&self) -> impl Iterator<Item = &str> {
        self.current.keys().map(String::as_str)
    }

    pub fn compute(
        &mut self,
        defs: &IndexMap<String, ExpressionDefinition>,
        dt: f32,
        tuning: &EmotionTuning,
        epsilon: f32,
    ) -> IndexMap<String, Blended> {
        let def = self.target.as_deref().and_then(|name| defs.get(name));
        let fade = def.map_or(tuning.default_fade_in_time, |d| d.fade_in_time);
        let half_life = (fade * tuning.fade_scale).max(tuning.min_half_life_ms);

        let mut out = IndexMap::with_capacity(self.current.len());
        if let Some(def) = def {
            for p in &def.params {
                let cur = self.current.get(&p.id).copied().unwrap_or(0.0);
                let next = approach(cur, p.value, half_life, dt);
                self.current.insert(p.id.clone(), next);
                out.insert(
                    p.id.clone(),
                    Blended {
                        value: next,
                        blend: p.blend,
                    },
                );
            }
        }

        self.current.retain(|id, cur| {
            if def.is_some_and(|d| d.param(id).is_some()) {
                return true;
            }
            *cur = approach(*cur, 0.0, half_life, dt);
            if cur.abs() < epsilon {
                return false;
            }
            out.insert(
                id.clone(),
                Blended {
                    value: *cur,
                    blend: BlendMode::Add,
                },
            );
            true
        });
        out
    }

    pub fn reset(&mut self) {
        self.target = None;
        self.current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ExpressionParam;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn defs() -> IndexMap<String, ExpressionDefinition> {
        let def = |name: &str, fade: f32, params: &[(&str, f32, BlendMode)]| ExpressionDefinition {
            name: name.into(),
            fade_in_time: fade,
            params: params
                .iter()
                .map(|(id, value, blend)| ExpressionParam {
                    id: id.to_string(),
                    value: *value,
                    blend: *blend,
                })
                .collect(),
        };
        [
            def("happy", 0.5, &[("ParamEyeLSmile", 1.0, BlendMode::Add), ("ParamMouthForm", 1.0, BlendMode::Overwrite)]),
            def("sad", 0.1, &[("ParamBrowLY", -0.5, BlendMode::Add)]),
        ]
        .into_iter()
        .map(|d| (d.name.clone(), d))
        .collect()
    }

    #[test]
    fn converges_to_target_values() {
        let defs = defs();
        let mut ch = EmotionChannel::new();
        ch.set_target(Some("happy".into()));
        let mut out = IndexMap::new();
        for _ in 0..200 {
            out = ch.compute(&defs, 16.0, &EmotionTuning::default(), 0.001);
        }
        assert!((out["ParamEyeLSmile"].value - 1.0).abs() < 1e-4);
        assert_eq!(out["ParamMouthForm"].blend, BlendMode::Overwrite);
    }

    #[test]
    fn first_step_uses_fade_derived_half_life() {
        let defs = defs();
        let mut ch = EmotionChannel::new();
        ch.set_target(Some("happy".into()));
        // fade 0.5 s -> 150 ms half-life
        let out = ch.compute(&defs, 150.0, &EmotionTuning::default(), 0.001);
        assert!((out["ParamEyeLSmile"].value - 0.5).abs() < 1e-5);

        // fade 0.1 s -> 30 ms, floored at 80 ms
        let mut ch = EmotionChannel::new();
        ch.set_target(Some("sad".into()));
        let out = ch.compute(&defs, 80.0, &EmotionTuning::default(), 0.001);
        assert!((out["ParamBrowLY"].value + 0.25).abs() < 1e-5);
    }

    #[test]
    fn switching_fades_out_old_ids_then_forgets_them() {
        let defs = defs();
        let mut ch = EmotionChannel::new();
        ch.set_target(Some("happy".into()));
        for _ in 0..100 {
            ch.compute(&defs, 16.0, &EmotionTuning::default(), 0.001);
        }
        ch.set_target(Some("sad".into()));
        let out = ch.compute(&defs, 16.0, &EmotionTuning::default(), 0.001);
        assert_eq!(out["ParamMouthForm"].blend, BlendMode::Add);
        assert!(out["ParamMouthForm"].value > 0.0);
        for _ in 0..300 {
            ch.compute(&defs, 16.0, &EmotionTuning::default(), 0.001);
        }
        let ids: Vec<&str> = ch.tracked().collect();
        assert_eq!(ids, ["ParamBrowLY"]);
    }

    #[test]
    fn clearing_returns_everything_to_rest() {
        let defs = defs();
        let mut ch = EmotionChannel::new();
        ch.set_target(Some("sad".into()));
        for _ in 0..50 {
            ch.compute(&defs, 16.0, &EmotionTuning::default(), 0.001);
        }
        ch.set_target(None);
        for _ in 0..300 {
            ch.compute(&defs, 16.0, &EmotionTuning::default(), 0.001);
        }
        assert_eq!(ch.tracked().count(), 0);
        assert!(ch.compute(&defs, 16.0, &EmotionTuning::default(), 0.001).is_empty());
    }

    #[test]
    fn positive_resolves_within_equivalent_set() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..32 {
            let name = EmotionCategory::Positive.resolve(&mut rng);
            assert!(name == "happy" || name == "enjoy");
        }
        assert_eq!(EmotionCategory::Negative.resolve(&mut rng), "sad");
        assert_eq!("surprise".parse::<EmotionCategory>().unwrap(), EmotionCategory::Surprise);
        assert!("angry".parse::<EmotionCategory>().is_err());
    }
}
