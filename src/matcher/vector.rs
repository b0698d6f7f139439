use crate::joint::{JointBuffer, Position};

/// Flattens a [`JointBuffer`] into a pose vector.
///
/// Joints are visited in configured order and contribute `x, y` (2D) or
/// `x, y, z` (3D). Joints without a position are skipped, not zero-filled,
/// so the vector only reaches full length once every joint has reported.
#[derive(Debug, Clone, Copy)]
pub struct PoseVectorBuilder {
    dimensions: usize,
    normalize: bool,
}

impl PoseVectorBuilder {
    pub fn new(dimensions: usize, normalize: bool) -> Self {
        Self { dimensions, normalize }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn build(&self, buffer: &JointBuffer) -> Vec<f64> {
        let mut out = Vec::with_capacity(buffer.layout().len() * self.dimensions);
        self.build_into(buffer, &mut out);
        out
    }

    /// Same as [`build`](Self::build) but reuses `out`.
    pub fn build_into(&self, buffer: &JointBuffer, out: &mut Vec<f64>) {
        out.clear();
        for position in buffer.iter().flatten() {
            let (x, y) = if self.normalize {
                unit_circle(position)
            } else {
                (position.x, position.y)
            };
            out.push(x);
            out.push(y);
            if self.dimensions == 3 {
                out.push(position.z);
            }
        }
    }
}

/// (x, y) / |(x, y)|; a zero pair is returned as is
fn unit_circle(p: &Position) -> (f64, f64) {
    let norm = (p.x * p.x + p.y * p.y).sqrt();
    if norm == 0.0 {
        (p.x, p.y)
    } else {
        (p.x / norm, p.y / norm)
    }
}
