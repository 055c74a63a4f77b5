//! Smooth (blended) variants of the boolean combinators.
//!
//! Within `radius` of the seam the two surfaces are joined by a polynomial
//! fillet; farther away each node agrees exactly with its sharp
//! counterpart in [`crate::ops`].

use crate::error::SdfError;
use crate::node::{to_params, Inputs, Params, SdfNode};
use sdforge_math::Vec3;
use serde::{Deserialize, Serialize};

/// Smallest blend radius; zero would divide by zero.
const MIN_BLEND: f64 = 1e-10;

/// Polynomial smooth minimum.
pub fn smooth_min(a: f64, b: f64, k: f64) -> f64 {
    let k = k.max(MIN_BLEND);
    let h = (k - (a - b).abs()).max(0.0) / k;
    a.min(b) - h * h * k * 0.25
}

/// Polynomial smooth maximum.
pub fn smooth_max(a: f64, b: f64, k: f64) -> f64 {
    let k = k.max(MIN_BLEND);
    let h = (k - (a - b).abs()).max(0.0) / k;
    a.max(b) + h * h * k * 0.25
}

/// Union with a rounded seam of width `radius`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothUnion {
    /// Blend radius.
    pub radius: f64,
}

impl SmoothUnion {
    /// Registry key.
    pub const KEY: &'static str = "smooth_union";

    /// Create a smooth union.
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl SdfNode for SmoothUnion {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn arity(&self) -> usize {
        2
    }

    fn distance(&self, p: &Vec3, inputs: &Inputs<'_>) -> f64 {
        smooth_min(inputs.distance(0, p), inputs.distance(1, p), self.radius)
    }

    fn params(&self) -> Result<Params, SdfError> {
        to_params(self)
    }
}

/// Intersection with a rounded seam of width `radius`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothIntersection {
    /// Blend radius.
    pub radius: f64,
}

impl SmoothIntersection {
    /// Registry key.
    pub const KEY: &'static str = "smooth_intersect";

    /// Create a smooth intersection.
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl SdfNode for SmoothIntersection {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn arity(&self) -> usize {
        2
    }

    fn distance(&self, p: &Vec3, inputs: &Inputs<'_>) -> f64 {
        smooth_max(inputs.distance(0, p), inputs.distance(1, p), self.radius)
    }

    fn params(&self) -> Result<Params, SdfError> {
        to_params(self)
    }
}

/// Difference with a rounded seam of width `radius`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothDifference {
    /// Blend radius.
    pub radius: f64,
}

impl SmoothDifference {
    /// Registry key.
    pub const KEY: &'static str = "smooth_dif";

    /// Create a smooth difference.
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl SdfNode for SmoothDifference {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn arity(&self) -> usize {
        2
    }

    fn distance(&self, p: &Vec3, inputs: &Inputs<'_>) -> f64 {
        smooth_max(inputs.distance(0, p), -inputs.distance(1, p), self.radius)
    }

    fn params(&self) -> Result<Params, SdfError> {
        to_params(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeId, SdfGraph};
    use crate::node::EMPTY_DISTANCE;
    use crate::shapes::Sphere;
    use approx::assert_relative_eq;

    fn two_spheres(graph: &mut SdfGraph) -> (NodeId, NodeId) {
        let a = graph.insert(Sphere::new(Vec3::new(-1.0, 0.0, 0.0), 1.5));
        let b = graph.insert(Sphere::new(Vec3::new(1.0, 0.0, 0.0), 1.5));
        (a, b)
    }

    #[test]
    fn test_smooth_min_matches_min_outside_band() {
        assert_eq!(smooth_min(1.0, 3.0, 0.5), 1.0);
        assert_eq!(smooth_max(1.0, 3.0, 0.5), 3.0);
        assert_relative_eq!(smooth_min(1.0, 1.0, 0.4), 0.9);
        assert_relative_eq!(smooth_max(1.0, 1.0, 0.4), 1.1);
    }

    #[test]
    fn test_smooth_union_fills_the_seam() {
        let mut graph = SdfGraph::new();
        let (a, b) = two_spheres(&mut graph);
        let sharp = graph.union(a, b).unwrap();
        let (a2, b2) = two_spheres(&mut graph);
        let smooth = graph.build(SmoothUnion::new(0.5), &[a2, b2]).unwrap();

        // On the seam plane both children are equidistant.
        let seam = Vec3::new(0.0, 1.3, 0.0);
        assert!(graph.distance(smooth, &seam) < graph.distance(sharp, &seam));

        // Far from the seam the blend has no effect.
        let far = Vec3::new(-4.0, 0.0, 0.0);
        assert_eq!(graph.distance(smooth, &far), graph.distance(sharp, &far));
    }

    #[test]
    fn test_smooth_intersection_and_difference_bound_the_sharp_ones() {
        let mut graph = SdfGraph::new();
        let (a, b) = two_spheres(&mut graph);
        let si = graph.build(SmoothIntersection::new(0.3), &[a, b]).unwrap();
        let (a2, b2) = two_spheres(&mut graph);
        let sd = graph.build(SmoothDifference::new(0.3), &[a2, b2]).unwrap();

        for x in [-2.0, -0.5, 0.0, 0.5, 2.0] {
            let p = Vec3::new(x, 0.2, 0.0);
            let da = graph.distance(a, &p);
            let db = graph.distance(b, &p);
            assert!(graph.distance(si, &p) >= da.max(db));
            assert!(graph.distance(sd, &p) >= da.max(-db));
        }
    }

    #[test]
    fn test_smooth_union_with_unset_slot_is_identity() {
        let mut graph = SdfGraph::new();
        let s = graph.insert(Sphere::new(Vec3::zeros(), 1.0));
        let u = graph.build(SmoothUnion::new(0.5), &[s]).unwrap();
        let p = Vec3::new(0.3, 0.1, 0.0);
        assert_eq!(graph.distance(u, &p), graph.distance(s, &p));

        let i = graph.insert(SmoothIntersection::new(0.5));
        assert_eq!(graph.distance(i, &p), EMPTY_DISTANCE);
    }
}
