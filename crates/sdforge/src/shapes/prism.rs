use crate::error::SdfError;
use crate::node::{to_params, Inputs, Params, SdfNode};
use sdforge_math::Vec3;
use serde::{Deserialize, Serialize};

/// cos(30°), the slope of the slanted triangle edges.
const COS_30: f64 = 0.866_025_403_784_438_6;

/// Triangular prism: an equilateral triangle in the XZ plane extruded along Y.
///
/// The triangle points towards +Z; each of its edges lies `size / 2` from
/// the prism axis. The result is a distance bound rather than an exact
/// Euclidean distance off the edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prism {
    /// Center point on the prism axis.
    pub center: Vec3,
    /// Twice the inradius of the triangular cross-section.
    pub size: f64,
    /// Full height along Y.
    pub height: f64,
}

impl Prism {
    /// Registry key.
    pub const KEY: &'static str = "prism";

    /// Create a prism.
    pub fn new(center: Vec3, size: f64, height: f64) -> Self {
        Self {
            center,
            size,
            height,
        }
    }
}

impl SdfNode for Prism {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn distance(&self, p: &Vec3, _inputs: &Inputs<'_>) -> f64 {
        let local = p - self.center;
        let q = local.abs();
        let cap = q.y - self.height * 0.5;
        let side = (q.x * COS_30 + local.z * 0.5).max(-local.z) - self.size * 0.5;
        cap.max(side)
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
    fn test_prism_inside_and_outside() {
        let mut graph = SdfGraph::new();
        let p = graph.insert(Prism::new(Vec3::zeros(), 2.0, 2.0));
        assert!((graph.distance(p, &Vec3::zeros()) + 1.0).abs() < 1e-12);
        assert!(graph.distance(p, &Vec3::new(5.0, 0.0, 0.0)) > 0.0);
        // Flat back face at z = -size / 2.
        assert!(graph.distance(p, &Vec3::new(0.0, 0.0, -1.0)).abs() < 1e-12);
        // Top cap.
        assert!((graph.distance(p, &Vec3::new(0.0, 3.0, 0.0)) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_prism_symmetric_in_x_and_y() {
        let mut graph = SdfGraph::new();
        let p = graph.insert(Prism::new(Vec3::zeros(), 1.0, 2.0));
        let a = graph.distance(p, &Vec3::new(0.3, 0.4, 0.1));
        let b = graph.distance(p, &Vec3::new(-0.3, -0.4, 0.1));
        assert!((a - b).abs() < 1e-12);
    }
}
