use crate::error::SdfError;
use crate::node::{to_params, Inputs, Params, SdfNode};
use sdforge_math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Capped cylinder along the Y axis, centered at `center`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    /// Center point (halfway between the caps).
    pub center: Vec3,
    /// Radius.
    pub radius: f64,
    /// Full height along Y.
    pub height: f64,
}

impl Cylinder {
    /// Registry key.
    pub const KEY: &'static str = "cylinder";

    /// Create a cylinder.
    pub fn new(center: Vec3, radius: f64, height: f64) -> Self {
        Self {
            center,
            radius,
            height,
        }
    }
}

impl SdfNode for Cylinder {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn distance(&self, p: &Vec3, _inputs: &Inputs<'_>) -> f64 {
        let local = p - self.center;
        let d = Vec2::new(
            local.xz().norm() - self.radius,
            local.y.abs() - self.height * 0.5,
        );
        d.x.max(d.y).min(0.0) + d.sup(&Vec2::zeros()).norm()
    }

    fn params(&self) -> Result<Params, SdfError> {
        to_params(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SdfGraph;

    #[test]
    fn test_cylinder_axis_and_caps() {
        let mut graph = SdfGraph::new();
        let c = graph.insert(Cylinder::new(Vec3::zeros(), 1.0, 4.0));
        assert!((graph.distance(c, &Vec3::zeros()) + 1.0).abs() < 1e-12);
        // Side wall.
        assert!(graph.distance(c, &Vec3::new(0.0, 1.0, 1.0)).abs() < 1e-12);
        // Above the top cap.
        assert!((graph.distance(c, &Vec3::new(0.0, 5.0, 0.0)) - 3.0).abs() < 1e-12);
        // Diagonal from the rim.
        let rim = graph.distance(c, &Vec3::new(4.0, 6.0, 0.0));
        assert!((rim - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_cylinder_is_rotationally_symmetric() {
        let mut graph = SdfGraph::new();
        let c = graph.insert(Cylinder::new(Vec3::new(1.0, 1.0, 1.0), 2.0, 2.0));
        let a = graph.distance(c, &Vec3::new(4.0, 1.5, 1.0));
        let b = graph.distance(c, &Vec3::new(1.0, 1.5, 4.0));
        assert!((a - b).abs() < 1e-12);
    }
}
