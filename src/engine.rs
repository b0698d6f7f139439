use std::time::Instant;

use crate::config::Config;
use crate::joint::{JointBuffer, JointLayout, Position};
use crate::matcher::{Match, MatchEvaluator, PoseVectorBuilder, SpatialGate};

const LEFT_HAND: &str = "HandLeft";
const RIGHT_HAND: &str = "HandRight";

/// Answer to the debug query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugInfo {
    /// Position of the gate's reference joint
    pub center: Option<Position>,
    /// |HandLeft.x - HandRight.x|
    pub hands_distance: Option<f64>,
}

/// Result of one evaluation tick
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Subject outside the capture volume, nothing evaluated
    Gated,
    Evaluated(Vec<Match>),
}

impl Tick {
    pub fn matches(&self) -> &[Match] {
        match self {
            Tick::Gated => &[],
            Tick::Evaluated(matches) => matches,
        }
    }
}

/// Joint buffer plus matching state. Single owner, no internal locking.
pub struct PoseMatcher {
    buffer: JointBuffer,
    builder: PoseVectorBuilder,
    gate: SpatialGate,
    evaluator: MatchEvaluator,
    fallback_z: f64,
    verbose: bool,
    live: Vec<f64>,
}

impl PoseMatcher {
    /// Expects a config that already passed [`Config::validate`].
    pub fn from_config(config: &Config) -> Self {
        let layout = JointLayout::new(config.pose.joints.as_slice());
        Self {
            buffer: JointBuffer::new(layout),
            builder: PoseVectorBuilder::new(config.pose.dimensions, config.pose.normalize),
            gate: SpatialGate::from_config(&config.gate),
            evaluator: MatchEvaluator::from_config(&config.pose),
            fallback_z: config.fallback_z(),
            verbose: config.verbose,
            live: Vec::new(),
        }
    }

    /// Store a joint sample. Returns false for untracked joints.
    pub fn handle_sample(&mut self, name: &str, x: f64, y: f64, z: Option<f64>) -> bool {
        let position = Position::new(x, y, z.unwrap_or(self.fallback_z));
        self.buffer.update(name, position)
    }

    /// Run one matching pass at `now`.
    pub fn tick(&mut self, now: Instant) -> Tick {
        let valid = self.gate.is_valid(&self.buffer);
        if !valid {
            if self.verbose {
                log::info!("{}", self.diagnostics(false));
            }
            return Tick::Gated;
        }

        self.builder.build_into(&self.buffer, &mut self.live);
        let matches = self.evaluator.evaluate(&self.live, now);

        if self.verbose {
            log::info!("{}", self.diagnostics(true));
        } else {
            log::debug!(
                "vector len {}, distances: {:?}",
                self.live.len(),
                self.evaluator.distances()
            );
        }
        for m in &matches {
            log::info!("match pose {} with score: {}", m.pose_index, m.distance);
        }

        Tick::Evaluated(matches)
    }

    /// Per-tick verbose line: gate state, raw joint positions, and for an
    /// evaluated tick the live vector and distances.
    fn diagnostics(&self, valid: bool) -> String {
        let gate = if !self.gate.is_enabled() {
            "off"
        } else if valid {
            "valid"
        } else {
            "invalid"
        };
        let positions: Vec<String> = self
            .buffer
            .reported_positions()
            .iter()
            .map(|(name, p)| format!("{}=({}, {}, {})", name, p.x, p.y, p.z))
            .collect();
        let mut line = format!("gate {} | joints [{}]", gate, positions.join(", "));
        if valid {
            line.push_str(&format!(
                " | vector {:?} | distances {:?}",
                self.live,
                self.evaluator.distances()
            ));
        }
        line
    }

    /// The flattened pose as it stands now
    pub fn current_pose(&self) -> Vec<f64> {
        self.builder.build(&self.buffer)
    }

    pub fn debug_info(&self) -> DebugInfo {
        let center = self.buffer.get(self.gate.reference_joint());
        let hands_distance = match (self.buffer.get(LEFT_HAND), self.buffer.get(RIGHT_HAND)) {
            (Some(l), Some(r)) => Some((l.x - r.x).abs()),
            _ => None,
        };
        DebugInfo { center, hands_distance }
    }

    pub fn buffer(&self) -> &JointBuffer {
        &self.buffer
    }

    pub fn evaluator(&self) -> &MatchEvaluator {
        &self.evaluator
    }
}
