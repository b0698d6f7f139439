use std::time::{Duration, Instant};

use super::debounce::DebounceState;
use super::metric::chord_distance;
use crate::config::PoseConfig;

/// A configured target pose
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePose {
    pub vector: Vec<f64>,
    /// Max acceptable distance (exclusive)
    pub threshold: f64,
    /// Continuous match required before firing
    pub timeout: Duration,
}

impl ReferencePose {
    pub fn new(vector: Vec<f64>, threshold: f64, timeout: Duration) -> Self {
        Self { vector, threshold, timeout }
    }

    /// Pairs `match_vectors`, `thresholds`, `timeouts` by index.
    /// Lengths are expected to be validated already.
    pub fn from_config(config: &PoseConfig) -> Vec<Self> {
        config
            .match_vectors
            .iter()
            .zip(&config.thresholds)
            .zip(&config.timeouts)
            .map(|((vector, &threshold), &timeout_ms)| {
                Self::new(vector.clone(), threshold, Duration::from_millis(timeout_ms))
            })
            .collect()
    }
}

/// A fired match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub pose_index: usize,
    pub distance: f64,
}

/// Compares the live pose vector against every reference pose and runs the
/// debounce state machine for each one.
#[derive(Debug, Clone)]
pub struct MatchEvaluator {
    poses: Vec<ReferencePose>,
    states: Vec<DebounceState>,
    /// Distance per pose from the last evaluation, `None` if skipped
    distances: Vec<Option<f64>>,
}

impl MatchEvaluator {
    pub fn new(poses: Vec<ReferencePose>) -> Self {
        let n = poses.len();
        Self {
            poses,
            states: vec![DebounceState::Idle; n],
            distances: vec![None; n],
        }
    }

    pub fn from_config(config: &PoseConfig) -> Self {
        Self::new(ReferencePose::from_config(config))
    }

    /// One evaluation pass at time `now`, in pose index order.
    ///
    /// A pose whose vector length differs from `live` is skipped and keeps its
    /// debounce state.
    pub fn evaluate(&mut self, live: &[f64], now: Instant) -> Vec<Match> {
        let mut fired = Vec::new();

        for (i, pose) in self.poses.iter().enumerate() {
            if live.len() != pose.vector.len() {
                self.distances[i] = None;
                continue;
            }

            let distance = chord_distance(live, &pose.vector);
            self.distances[i] = Some(distance);

            let below = distance < pose.threshold;
            if self.states[i].step(below, pose.timeout, now) {
                fired.push(Match { pose_index: i, distance });
            }
        }

        fired
    }

    pub fn distances(&self) -> &[Option<f64>] {
        &self.distances
    }

    pub fn states(&self) -> &[DebounceState] {
        &self.states
    }

    pub fn poses(&self) -> &[ReferencePose] {
        &self.poses
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn single(vector: &[f64], threshold: f64, timeout_ms: u64) -> MatchEvaluator {
        MatchEvaluator::new(vec![ReferencePose::new(vector.to_vec(), threshold, ms(timeout_ms))])
    }

    #[test]
    fn test_from_config_pairs_by_index() {
        let config = PoseConfig {
            match_vectors: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            thresholds: vec![0.1, 0.2],
            timeouts: vec![0, 300],
            ..PoseConfig::default()
        };
        let poses = ReferencePose::from_config(&config);
        assert_eq!(poses.len(), 2);
        assert_eq!(poses[1].vector, vec![0.0, 1.0]);
        assert_eq!(poses[1].threshold, 0.2);
        assert_eq!(poses[1].timeout, ms(300));
    }

    #[test]
    fn test_zero_timeout_fires_on_first_tick() {
        let mut ev = single(&[1.0, 0.0], 0.1, 0);
        let fired = ev.evaluate(&[2.0, 0.0], Instant::now());
        assert_eq!(fired, vec![Match { pose_index: 0, distance: 0.0 }]);
    }

    #[test]
    fn test_length_mismatch_skips_and_keeps_state() {
        let t0 = Instant::now();
        let mut ev = single(&[1.0, 0.0, 0.0, 1.0], 0.1, 50);
        ev.evaluate(&[1.0, 0.0, 0.0, 1.0], t0);
        assert!(ev.states()[0].is_pending());

        // Joint dropped out of the vector: skip, streak untouched
        assert!(ev.evaluate(&[1.0, 0.0], t0 + ms(20)).is_empty());
        assert_eq!(ev.distances()[0], None);
        assert_eq!(ev.states()[0], DebounceState::Pending { since: t0 });

        let fired = ev.evaluate(&[1.0, 0.0, 0.0, 1.0], t0 + ms(60));
        assert_eq!(fired.len(), 1);
    }

    #[test]
    fn test_no_fire_before_timeout() {
        let t0 = Instant::now();
        let mut ev = single(&[1.0, 0.0], 0.1, 100);
        for step in 0..=6 {
            assert!(ev.evaluate(&[1.0, 0.0], t0 + ms(step * 16)).is_empty());
        }
        assert_eq!(ev.evaluate(&[1.0, 0.0], t0 + ms(112)).len(), 1);
    }

    #[test]
    fn test_rising_distance_resets_streak() {
        let t0 = Instant::now();
        let mut ev = single(&[1.0, 0.0], 0.1, 50);
        ev.evaluate(&[1.0, 0.0], t0);
        // orthogonal: distance sqrt(2), well above threshold
        ev.evaluate(&[0.0, 1.0], t0 + ms(30));
        assert_eq!(ev.states()[0], DebounceState::Idle);

        assert!(ev.evaluate(&[1.0, 0.0], t0 + ms(60)).is_empty());
        assert!(ev.evaluate(&[1.0, 0.0], t0 + ms(100)).is_empty());
        assert_eq!(ev.evaluate(&[1.0, 0.0], t0 + ms(111)).len(), 1);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut ev = single(&[1.0, 0.0], 2f64.sqrt(), 0);
        // distance == threshold does not count as a match
        assert!(ev.evaluate(&[0.0, 1.0], Instant::now()).is_empty());
    }

    #[test]
    fn test_fires_once_per_streak() {
        let t0 = Instant::now();
        let mut ev = single(&[1.0, 0.0], 0.1, 50);
        let mut total = 0;
        for step in 0..20 {
            total += ev.evaluate(&[1.0, 0.0], t0 + ms(step * 10)).len();
        }
        // fires at 60ms; the next streak starts at 70ms and fires at 130ms;
        // the one from 140ms has not run long enough by 190ms
        assert_eq!(total, 2);
    }

    #[test]
    fn test_multiple_poses_fire_same_tick() {
        let mut ev = MatchEvaluator::new(vec![
            ReferencePose::new(vec![1.0, 1.0], 0.5, Duration::ZERO),
            ReferencePose::new(vec![0.0, -1.0], 0.5, Duration::ZERO),
            ReferencePose::new(vec![1.0, 0.9], 0.5, Duration::ZERO),
        ]);
        let fired = ev.evaluate(&[1.0, 1.0], Instant::now());
        let indices: Vec<usize> = fired.iter().map(|m| m.pose_index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_example_scenario() {
        // joints [A, B], 2D, reference [1,0,0,1], threshold 0.1, timeout 50ms
        let t0 = Instant::now();
        let mut ev = single(&[1.0, 0.0, 0.0, 1.0], 0.1, 50);
        let live = [1.0, 0.0, 0.0, 1.0];

        let mut fired = Vec::new();
        for step in 0..8 {
            let now = t0 + ms(step * 16);
            let out = ev.evaluate(&live, now);
            assert_eq!(ev.distances()[0], Some(0.0));
            if step * 16 <= 50 {
                assert!(out.is_empty(), "fired early at {}ms", step * 16);
            }
            fired.extend(out);
        }

        // fires at 64ms; the streak restarted at 80ms is still pending at 112ms
        assert_eq!(fired, vec![Match { pose_index: 0, distance: 0.0 }]);
        assert!(ev.states()[0].is_pending());
    }
}
