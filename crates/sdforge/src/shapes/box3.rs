use crate::error::SdfError;
use crate::node::{to_params, Inputs, Params, SdfNode};
use sdforge_math::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box at `center` with `half_extents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Box3 {
    /// Center point.
    pub center: Vec3,
    /// Half-size along each axis.
    pub half_extents: Vec3,
}

impl Box3 {
    /// Registry key.
    pub const KEY: &'static str = "box";

    /// Create a box.
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }
}

impl SdfNode for Box3 {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn distance(&self, p: &Vec3, _inputs: &Inputs<'_>) -> f64 {
        let q = (p - self.center).abs() - self.half_extents;
        // Exterior distance plus (non-positive) interior distance.
        q.sup(&Vec3::zeros()).norm() + q.max().min(0.0)
    }

    fn params(&self) -> Result<Params, SdfError> {
        to_params(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SdfGraph;

    fn unit_box() -> (SdfGraph, crate::graph::NodeId) {
        let mut graph = SdfGraph::new();
        let id = graph.insert(Box3::new(Vec3::zeros(), Vec3::repeat(1.0)));
        (graph, id)
    }

    #[test]
    fn test_box_inside() {
        let (graph, b) = unit_box();
        assert!((graph.distance(b, &Vec3::zeros()) + 1.0).abs() < 1e-12);
        assert!((graph.distance(b, &Vec3::new(0.5, 0.0, 0.0)) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_box_face_and_corner() {
        let (graph, b) = unit_box();
        assert!(graph.distance(b, &Vec3::new(1.0, 0.0, 0.0)).abs() < 1e-12);
        assert!((graph.distance(b, &Vec3::new(3.0, 0.0, 0.0)) - 2.0).abs() < 1e-12);
        let corner = graph.distance(b, &Vec3::new(2.0, 2.0, 2.0));
        assert!((corner - 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_box_offset_center() {
        let mut graph = SdfGraph::new();
        let b = graph.insert(Box3::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0)));
        assert!((graph.distance(b, &Vec3::new(10.0, 0.0, 0.0)) - 6.0).abs() < 1e-12);
        assert!(graph.distance(b, &Vec3::new(3.0, 2.0, 0.0)).abs() < 1e-12);
    }
}
