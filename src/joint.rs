use std::collections::HashMap;

/// Kinect v2 joint set, in default tracking order
pub const KINECT_JOINTS: [&str; 25] = [
    "Head",
    "Neck",
    "SpineShoulder",
    "SpineMid",
    "SpineBase",
    "ShoulderRight",
    "ElbowRight",
    "WristRight",
    "HandRight",
    "HandTipRight",
    "ThumbRight",
    "ShoulderLeft",
    "ElbowLeft",
    "WristLeft",
    "HandLeft",
    "HandTipLeft",
    "ThumbLeft",
    "HipRight",
    "KneeRight",
    "AnkleRight",
    "FootRight",
    "HipLeft",
    "KneeLeft",
    "AnkleLeft",
    "FootLeft",
];

pub fn default_joint_names() -> Vec<String> {
    KINECT_JOINTS.iter().map(|s| s.to_string()).collect()
}

/// Joint position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Joint name → slot in the configured order.
#[derive(Debug, Clone)]
pub struct JointLayout {
    names: Vec<String>,
    slots: HashMap<String, usize>,
}

impl JointLayout {
    /// Later duplicates are shadowed; config validation rejects them anyway.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
        let mut slots = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            slots.entry(name.clone()).or_insert(i);
        }
        Self { names, slots }
    }

    pub fn slot(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    pub fn name(&self, slot: usize) -> Option<&str> {
        self.names.get(slot).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Last known position of every tracked joint.
///
/// Slots are created up front for exactly the configured joints and are never
/// removed. A slot stays `None` until its first sample arrives.
#[derive(Debug, Clone)]
pub struct JointBuffer {
    layout: JointLayout,
    positions: Vec<Option<Position>>,
}

impl JointBuffer {
    pub fn new(layout: JointLayout) -> Self {
        let positions = vec![None; layout.len()];
        Self { layout, positions }
    }

    /// Replace a joint's position. Untracked names are dropped silently.
    /// Returns whether the sample was stored.
    pub fn update(&mut self, name: &str, position: Position) -> bool {
        match self.layout.slot(name) {
            Some(slot) => {
                self.positions[slot] = Some(position);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<Position> {
        self.layout.slot(name).and_then(|slot| self.positions[slot])
    }

    /// Positions in configured order
    pub fn iter(&self) -> impl Iterator<Item = Option<&Position>> {
        self.positions.iter().map(Option::as_ref)
    }

    pub fn layout(&self) -> &JointLayout {
        &self.layout
    }

    /// Named positions of the joints that have reported, in configured order
    pub fn reported_positions(&self) -> Vec<(&str, Position)> {
        self.positions
            .iter()
            .enumerate()
            .filter_map(|(slot, p)| Some((self.layout.name(slot)?, (*p)?)))
            .collect()
    }

    /// Number of joints that have reported at least once
    pub fn reported(&self) -> usize {
        self.positions.iter().filter(|p| p.is_some()).count()
    }
}
