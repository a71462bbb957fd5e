//! Speech-like mouth flapping, active while the current state defines a
//! mouth spec.

use log::debug;
use rand::Rng;

use crate::config::MouthTuning;
use crate::data::MouthConfig;
use crate::interp::approach;

#[derive(Debug, Default)]
pub struct MouthChannel {
    target: f32,
    current: f32,
    next_change: f64,
    /// Parameter driven while talking; kept until the mouth has closed.
    last_param: Option<String>,
}

impl MouthChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the mouth by `dt` ms. `spec` is the active state's mouth spec.
    ///
    /// Started from rest, the value stays within `[min, max]`; resumed while
    /// still closing, it rises back into the range. Once inactive the
    /// last driven parameter closes toward 0; the frame that crosses the
    /// tolerance emits an exact 0, and later frames emit nothing.
    pub fn compute<G: Rng>(
        &mut self,
        spec: Option<&MouthConfig>,
        now: f64,
        dt: f32,
        tuning: &MouthTuning,
        epsilon: f32,
        rng: &mut G,
    ) -> Option<(String, f32)> {
        let Some(spec) = spec else {
            return self.close(dt, tuning, epsilon);
        };

        let lo = spec.min.min(spec.max);
        let hi = spec.max.max(spec.min);
        if self.last_param.as_deref() != Some(spec.param.as_str()) {
            // Fresh start opens at the bottom of the range; a mouth still
            // closing from earlier speech keeps its value and converges.
            self.current = lo;
            self.last_param = Some(spec.param.clone());
        }
        if now >= self.next_change {
            self.target = if (hi - lo).is_finite() {
                rng.gen_range(lo..=hi)
            } else {
                lo
            };
            self.next_change =
                now + tuning.cadence_base_ms + rng.gen::<f64>() * tuning.cadence_jitter_ms;
        }
        let half_life = spec.speed / tuning.speed_divisor;
        let in_range = (lo..=hi).contains(&self.current);
        self.current = approach(self.current, self.target, half_life, dt);
        if in_range {
            self.current = self.current.clamp(lo, hi);
        }
        Some((spec.param.clone(), self.current))
    }

    fn close(&mut self, dt: f32, tuning: &MouthTuning, epsilon: f32) -> Option<(String, f32)> {
        let param = self.last_param.as_ref()?;
        self.current = approach(self.current, 0.0, tuning.close_half_life_ms, dt);
        if self.current.abs() < epsilon {
            self.current = 0.0;
            self.target = 0.0;
            debug!("mouth closed: {param}");
            return self.last_param.take().map(|p| (p, 0.0));
        }
        Some((param.clone(), self.current))
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    /// Parameter still owned by the mouth channel, if any.
    pub fn driven_param(&self) -> Option<&str> {
        self.last_param.as_deref()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spec() -> MouthConfig {
        MouthConfig {
            param: "ParamMouthOpenY".into(),
            speed: 120.0,
            min: 0.1,
            max: 0.8,
        }
    }

    #[test]
    fn talking_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut mouth = MouthChannel::new();
        let tuning = MouthTuning::default();
        let spec = spec();
        let mut now = 0.0;
        for _ in 0..1000 {
            now += 16.0;
            let (id, v) = mouth
                .compute(Some(&spec), now, 16.0, &tuning, 0.001, &mut rng)
                .unwrap();
            assert_eq!(id, "ParamMouthOpenY");
            assert!((0.1..=0.8).contains(&v), "mouth value {v} out of range");
        }
    }

    #[test]
    fn closes_once_then_goes_quiet() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut mouth = MouthChannel::new();
        let tuning = MouthTuning::default();
        let spec = spec();
        for i in 1..=30 {
            mouth.compute(Some(&spec), f64::from(i) * 16.0, 16.0, &tuning, 0.001, &mut rng);
        }
        assert!(mouth.current() > 0.0);

        let mut closed_at = None;
        for i in 0..200 {
            match mouth.compute(None, 1000.0 + f64::from(i) * 16.0, 16.0, &tuning, 0.001, &mut rng) {
                Some((_, v)) if v == 0.0 => {
                    closed_at = Some(i);
                    break;
                }
                Some((_, v)) => assert!(v > 0.0),
                None => panic!("mouth went quiet without emitting a final zero"),
            }
        }
        assert!(closed_at.is_some(), "mouth never closed");
        assert!(mouth.driven_param().is_none());
        assert!(mouth
            .compute(None, 9000.0, 16.0, &tuning, 0.001, &mut rng)
            .is_none());
    }

    #[test]
    fn resuming_while_closing_rises_without_a_jump() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut mouth = MouthChannel::new();
        let tuning = MouthTuning::default();
        // 400 ms follow half-life keeps one step well below the range floor
        let spec = MouthConfig {
            speed: 1200.0,
            ..spec()
        };
        for i in 1..=30 {
            mouth.compute(Some(&spec), f64::from(i) * 16.0, 16.0, &tuning, 0.001, &mut rng);
        }
        let mut now = 480.0;
        while mouth.current() >= 0.05 {
            now += 16.0;
            mouth.compute(None, now, 16.0, &tuning, 0.001, &mut rng);
        }
        let closing = mouth.current();
        assert!(closing > 0.0 && mouth.driven_param().is_some());

        let (_, v) = mouth
            .compute(Some(&spec), now + 16.0, 16.0, &tuning, 0.001, &mut rng)
            .unwrap();
        assert!(v > closing && v < 0.1, "resumed at {v}");
        for i in 2..200 {
            let (_, v) = mouth
                .compute(Some(&spec), now + f64::from(i) * 16.0, 16.0, &tuning, 0.001, &mut rng)
                .unwrap();
            assert!(v <= 0.8);
        }
        assert!(mouth.current() > 0.09);
    }

    #[test]
    fn overflowing_range_does_not_panic() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut mouth = MouthChannel::new();
        let spec = MouthConfig {
            min: -3e38,
            max: 3e38,
            ..spec()
        };
        let (_, v) = mouth
            .compute(Some(&spec), 16.0, 16.0, &MouthTuning::default(), 0.001, &mut rng)
            .unwrap();
        assert_eq!(v, -3e38);
    }

    #[test]
    fn idle_mouth_emits_nothing() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut mouth = MouthChannel::new();
        assert!(mouth
            .compute(None, 16.0, 16.0, &MouthTuning::default(), 0.001, &mut rng)
            .is_none());
    }
}
