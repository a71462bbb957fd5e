//! FIFO queue of one-shot gestures; at most one plays at a time.

use std::collections::VecDeque;

use log::{info, warn};

use crate::data::{ActionConfig, ActionsDocument};
use crate::params::ParamMap;
use crate::sampling::interpolate_keyframes;

#[derive(Clone, Debug)]
struct ActiveAction {
    name: String,
    config: ActionConfig,
    start_time: f64,
}

#[derive(Debug, Default)]
pub struct ActionQueue {
    queue: VecDeque<String>,
    active: Option<ActiveAction>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a gesture; it plays after everything already queued.
    pub fn push(&mut self, name: impl Into<String>) {
        self.queue.push_back(name.into());
    }

    /// Drop the queue and the playing gesture, then queue `name` alone.
    pub fn interrupt(&mut self, name: impl Into<String>) {
        self.queue.clear();
        self.active = None;
        self.queue.push_back(name.into());
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.name.as_str())
    }

    pub fn queued(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.queue.is_empty()
    }

    pub fn compute(&mut self, doc: &ActionsDocument, now: f64) -> ParamMap {
        if self.active.is_none() {
            if let Some(name) = self.queue.pop_front() {
                match doc.action(&name) {
                    Some(cfg) => {
                        info!("starting action: {name}");
                        self.active = Some(ActiveAction {
                            name,
                            config: cfg.clone(),
                            start_time: now,
                        });
                    }
                    None => warn!("action not found: {name}"),
                }
            }
        }

        let Some(active) = &self.active else {
            return ParamMap::new();
        };

        let elapsed = now - active.start_time;
        let cfg = &active.config;
        if elapsed >= cfg.total_duration() {
            // Hold the settled pose for one frame instead of snapping to rest.
            let settled = cfg
                .keyframes
                .last()
                .map(|k| k.params.clone())
                .unwrap_or_default();
            info!("action completed: {}", active.name);
            self.active = None;
            return settled;
        }

        let progress = elapsed.max(0.0).rem_euclid(cfg.duration) / cfg.duration;
        interpolate_keyframes(&cfg.keyframes, progress as f32)
    }

    pub fn reset(&mut self) {
        self.queue.clear();
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Keyframe;

    fn doc() -> ActionsDocument {
        let kf = |t: f32, id: &str, v: f32| Keyframe {
            t,
            params: [(id.to_string(), v)].into_iter().collect(),
        };
        let mut doc = ActionsDocument::default();
        doc.actions.insert(
            "nod".into(),
            ActionConfig {
                duration: 400.0,
                repeat: 2,
                keyframes: vec![kf(0.0, "ParamAngleY", 0.0), kf(0.5, "ParamAngleY", -10.0), kf(1.0, "ParamAngleY", 2.0)],
            },
        );
        doc.actions.insert(
            "blink".into(),
            ActionConfig {
                duration: 0.0,
                repeat: 1,
                keyframes: vec![kf(1.0, "ParamEyeLOpen", 0.5)],
            },
        );
        doc
    }

    #[test]
    fn plays_repeats_then_settles_on_last_frame() {
        let doc = doc();
        let mut q = ActionQueue::new();
        q.push("nod");
        assert!(q.compute(&doc, 1000.0)["ParamAngleY"].abs() < 1e-6);
        assert_eq!(q.active(), Some("nod"));
        // second repetition, mid-way
        assert!((q.compute(&doc, 1600.0)["ParamAngleY"] + 10.0).abs() < 1e-4);
        let settled = q.compute(&doc, 1800.0);
        assert_eq!(settled["ParamAngleY"], 2.0);
        assert!(q.active().is_none());
        assert!(q.compute(&doc, 1816.0).is_empty());
    }

    #[test]
    fn unknown_names_are_dropped_and_queue_continues() {
        let doc = doc();
        let mut q = ActionQueue::new();
        q.push("dance");
        q.push("nod");
        assert!(q.compute(&doc, 0.0).is_empty());
        assert_eq!(q.queued().collect::<Vec<_>>(), ["nod"]);
        q.compute(&doc, 16.0);
        assert_eq!(q.active(), Some("nod"));
    }

    #[test]
    fn zero_length_action_completes_immediately() {
        let doc = doc();
        let mut q = ActionQueue::new();
        q.push("blink");
        let out = q.compute(&doc, 5.0);
        assert_eq!(out["ParamEyeLOpen"], 0.5);
        assert!(q.is_idle());
    }

    #[test]
    fn interrupt_replaces_queue_and_active() {
        let doc = doc();
        let mut q = ActionQueue::new();
        q.push("nod");
        q.compute(&doc, 0.0);
        q.push("nod");
        q.interrupt("blink");
        assert!(q.active().is_none());
        assert_eq!(q.queued().collect::<Vec<_>>(), ["blink"]);
    }
}
