use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::joint::default_joint_names;

/// Startup configuration errors. Any of these is fatal.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("thresholds has {thresholds} entries but match_vectors has {vectors}")]
    ThresholdCount { thresholds: usize, vectors: usize },

    #[error("timeouts has {timeouts} entries but match_vectors has {vectors}")]
    TimeoutCount { timeouts: usize, vectors: usize },

    #[error("dimensions must be 2 or 3, got {0}")]
    Dimensions(usize),

    #[error("joint list is empty")]
    NoJoints,

    #[error("joint {0} is listed more than once")]
    DuplicateJoint(String),

    #[error("interval_ms must be a positive, finite period of at least 1ns, got {0}")]
    Interval(f64),

    #[error("gate reference joint {0} is not a tracked joint")]
    UnknownReferenceJoint(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveMode {
    /// Evaluate on a fixed wall-clock interval
    Periodic,
    /// Evaluate right after every joint sample
    Synchronous,
}

/// How to fill z when a sample only carries x, y
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingZ {
    Zero,
    /// Use `gate.z_reference`
    Reference,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_mode")]
    pub mode: DriveMode,
    /// Evaluation period in periodic mode (ms)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: f64,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub osc: OscConfig,
    #[serde(default)]
    pub pose: PoseConfig,
    #[serde(default)]
    pub gate: GateConfig,
}

fn default_mode() -> DriveMode { DriveMode::Periodic }
fn default_interval_ms() -> f64 { 16.666 }

#[derive(Debug, Clone, Deserialize)]
pub struct OscConfig {
    /// Where joint samples and queries arrive
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Where match events and query replies go
    #[serde(default = "default_target_addr")]
    pub target_addr: String,
}

fn default_listen_addr() -> String { "0.0.0.0:12345".to_string() }
fn default_target_addr() -> String { "127.0.0.1:12346".to_string() }

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            target_addr: default_target_addr(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoseConfig {
    /// Tracked joints, in pose vector order
    #[serde(default = "default_joint_names")]
    pub joints: Vec<String>,
    /// Components per joint in the pose vector (2 or 3)
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    /// Project each joint's (x, y) onto the unit circle, z untouched
    #[serde(default)]
    pub normalize: bool,
    #[serde(default = "default_missing_z")]
    pub missing_z: MissingZ,
    #[serde(default)]
    pub match_vectors: Vec<Vec<f64>>,
    /// Max distance per reference pose
    #[serde(default)]
    pub thresholds: Vec<f64>,
    /// Minimum continuous-match duration per reference pose (ms)
    #[serde(default)]
    pub timeouts: Vec<u64>,
}

fn default_dimensions() -> usize { 2 }
fn default_missing_z() -> MissingZ { MissingZ::Zero }

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            joints: default_joint_names(),
            dimensions: default_dimensions(),
            normalize: false,
            missing_z: default_missing_z(),
            match_vectors: Vec::new(),
            thresholds: Vec::new(),
            timeouts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Enables the capture volume check
    #[serde(default)]
    pub delta_validation: bool,
    /// Joint standing in for the body center
    #[serde(default = "default_reference_joint")]
    pub reference_joint: String,
    /// Expected depth of the subject
    #[serde(default = "default_z_reference")]
    pub z_reference: f64,
    /// Allowed |z - z_reference|
    #[serde(default = "default_z_delta")]
    pub z_delta: f64,
    /// Allowed |x|
    #[serde(default = "default_x_delta")]
    pub x_delta: f64,
}

fn default_reference_joint() -> String { "SpineBase".to_string() }
fn default_z_reference() -> f64 { 2.0 }
fn default_z_delta() -> f64 { 0.5 }
fn default_x_delta() -> f64 { 0.5 }

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            delta_validation: false,
            reference_joint: default_reference_joint(),
            z_reference: default_z_reference(),
            z_delta: default_z_delta(),
            x_delta: default_x_delta(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            interval_ms: default_interval_ms(),
            verbose: false,
            osc: OscConfig::default(),
            pose: PoseConfig::default(),
            gate: GateConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Missing file falls back to defaults, a broken one is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let pose = &self.pose;
        let vectors = pose.match_vectors.len();
        if pose.thresholds.len() != vectors {
            return Err(ConfigError::ThresholdCount { thresholds: pose.thresholds.len(), vectors });
        }
        if pose.timeouts.len() != vectors {
            return Err(ConfigError::TimeoutCount { timeouts: pose.timeouts.len(), vectors });
        }
        if !(2..=3).contains(&pose.dimensions) {
            return Err(ConfigError::Dimensions(pose.dimensions));
        }
        if pose.joints.is_empty() {
            return Err(ConfigError::NoJoints);
        }
        let mut seen = HashSet::new();
        for name in &pose.joints {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateJoint(name.clone()));
            }
        }
        if self.period().is_none() {
            return Err(ConfigError::Interval(self.interval_ms));
        }
        if self.gate.delta_validation && !seen.contains(self.gate.reference_joint.as_str()) {
            return Err(ConfigError::UnknownReferenceJoint(self.gate.reference_joint.clone()));
        }
        Ok(())
    }

    /// Periodic evaluation interval. `None` for NaN, negative, infinite or
    /// sub-nanosecond values.
    pub fn period(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.interval_ms / 1000.0)
            .ok()
            .filter(|d| !d.is_zero())
    }

    /// Depth assigned to samples that only carry x, y
    pub fn fallback_z(&self) -> f64 {
        match self.pose.missing_z {
            MissingZ::Zero => 0.0,
            MissingZ::Reference => self.gate.z_reference,
        }
    }
}
