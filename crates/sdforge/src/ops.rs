//! Boolean combinators.
//!
//! Pure functions of their children's distances (negative inside,
//! positive outside):
//!
//! | node | key | formula |
//! |---|---|---|
//! | [`Union`] | `union` | `min(a, b)` |
//! | [`Intersection`] | `intersect` | `max(a, b)` |
//! | [`Difference`] | `dif` | `max(a, -b)` |
//! | [`Invert`] | `invert` | `-a` |

use crate::error::SdfError;
use crate::graph::{NodeId, SdfGraph};
use crate::node::{Inputs, SdfNode};
use sdforge_math::Vec3;

/// Boolean union: inside if inside either child.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Union;

impl Union {
    /// Registry key.
    pub const KEY: &'static str = "union";
}

impl SdfNode for Union {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn arity(&self) -> usize {
        2
    }

    fn distance(&self, p: &Vec3, inputs: &Inputs<'_>) -> f64 {
        inputs.distance(0, p).min(inputs.distance(1, p))
    }
}

/// Boolean intersection: inside only if inside both children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intersection;

impl Intersection {
    /// Registry key.
    pub const KEY: &'static str = "intersect";
}

impl SdfNode for Intersection {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn arity(&self) -> usize {
        2
    }

    fn distance(&self, p: &Vec3, inputs: &Inputs<'_>) -> f64 {
        inputs.distance(0, p).max(inputs.distance(1, p))
    }
}

/// Boolean difference: the first child with the second carved away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Difference;

impl Difference {
    /// Registry key.
    pub const KEY: &'static str = "dif";
}

impl SdfNode for Difference {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn arity(&self) -> usize {
        2
    }

    fn distance(&self, p: &Vec3, inputs: &Inputs<'_>) -> f64 {
        inputs.distance(0, p).max(-inputs.distance(1, p))
    }
}

/// Complement: swaps inside and outside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Invert;

impl Invert {
    /// Registry key.
    pub const KEY: &'static str = "invert";
}

impl SdfNode for Invert {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn arity(&self) -> usize {
        1
    }

    fn distance(&self, p: &Vec3, inputs: &Inputs<'_>) -> f64 {
        -inputs.distance(0, p)
    }
}

impl SdfGraph {
    /// Build `Union(a, b)`.
    pub fn union(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, SdfError> {
        self.build(Union, &[a, b])
    }

    /// Build `Intersection(a, b)`.
    pub fn intersection(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, SdfError> {
        self.build(Intersection, &[a, b])
    }

    /// Build `Difference(a, b)` (a minus b).
    pub fn difference(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, SdfError> {
        self.build(Difference, &[a, b])
    }

    /// Build `Invert(a)`.
    pub fn invert(&mut self, a: NodeId) -> Result<NodeId, SdfError> {
        self.build(Invert, &[a])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::EMPTY_DISTANCE;
    use crate::shapes::{Box3, Cylinder, Ellipsoid, Sphere};

    fn sample_points() -> Vec<Vec3> {
        let mut points = Vec::new();
        for x in [-3.0, -1.0, -0.25, 0.0, 0.5, 2.0, 10.0] {
            for y in [-2.0, 0.0, 0.75] {
                for z in [-1.5, 0.0, 1.0] {
                    points.push(Vec3::new(x, y, z));
                }
            }
        }
        points
    }

    /// A pair of overlapping shapes plus a nested subtree.
    fn operands(graph: &mut SdfGraph) -> (NodeId, NodeId) {
        let a = graph.insert(Sphere::new(Vec3::new(0.5, 0.0, 0.0), 1.5));
        let b1 = graph.insert(Box3::new(Vec3::new(-0.5, 0.0, 0.0), Vec3::new(1.0, 0.5, 2.0)));
        let b2 = graph.insert(Cylinder::new(Vec3::zeros(), 0.5, 3.0));
        let b = graph.union(b1, b2).unwrap();
        (a, b)
    }

    #[test]
    fn test_union_is_min() {
        let mut graph = SdfGraph::new();
        let (a, b) = operands(&mut graph);
        let u = graph.union(a, b).unwrap();
        for p in sample_points() {
            let expected = graph.distance(a, &p).min(graph.distance(b, &p));
            assert_eq!(graph.distance(u, &p), expected);
        }
    }

    #[test]
    fn test_intersection_is_max() {
        let mut graph = SdfGraph::new();
        let (a, b) = operands(&mut graph);
        let i = graph.intersection(a, b).unwrap();
        for p in sample_points() {
            let expected = graph.distance(a, &p).max(graph.distance(b, &p));
            assert_eq!(graph.distance(i, &p), expected);
        }
    }

    #[test]
    fn test_difference_is_max_of_negated_b() {
        let mut graph = SdfGraph::new();
        let (a, b) = operands(&mut graph);
        let d = graph.difference(a, b).unwrap();
        for p in sample_points() {
            let expected = graph.distance(a, &p).max(-graph.distance(b, &p));
            assert_eq!(graph.distance(d, &p), expected);
        }
    }

    #[test]
    fn test_double_invert_cancels() {
        let mut graph = SdfGraph::new();
        let e = graph.insert(Ellipsoid::new(Vec3::zeros(), Vec3::new(1.0, 2.0, 0.5)));
        let once = graph.invert(e).unwrap();
        let twice = graph.invert(once).unwrap();
        for p in sample_points() {
            assert_eq!(graph.distance(once, &p), -graph.distance(e, &p));
            assert_eq!(graph.distance(twice, &p), graph.distance(e, &p));
        }
    }

    #[test]
    fn test_union_of_sphere_and_box() {
        let mut graph = SdfGraph::new();
        let sphere = graph.insert(Sphere::new(Vec3::zeros(), 1.0));
        let cube = graph.insert(Box3::new(Vec3::new(3.0, 0.0, 0.0), Vec3::repeat(1.0)));
        let root = graph.union(sphere, cube).unwrap();

        assert_eq!(graph.distance(root, &Vec3::zeros()), -1.0);
        let far = Vec3::new(10.0, 0.0, 0.0);
        assert_eq!(graph.distance(root, &far), graph.distance(cube, &far));
        assert_eq!(graph.distance(root, &far), 6.0);
    }

    #[test]
    fn test_unset_slots_follow_sentinel_policy() {
        let mut graph = SdfGraph::new();
        let s = graph.insert(Sphere::new(Vec3::zeros(), 1.0));
        let p = Vec3::new(0.25, 0.0, 0.0);
        let expected = graph.distance(s, &p);

        // Identity under union and as the subtracted operand.
        let u = graph.build(Union, &[s]).unwrap();
        assert_eq!(graph.distance(u, &p), expected);
        graph.remove_tree(u).unwrap();

        let s = graph.insert(Sphere::new(Vec3::zeros(), 1.0));
        let d = graph.build(Difference, &[s]).unwrap();
        assert_eq!(graph.distance(d, &p), expected);

        // Dominates intersection and an unset minuend.
        let i = graph.insert(Intersection);
        let s2 = graph.insert(Sphere::new(Vec3::zeros(), 1.0));
        graph.set_slot(i, 0, Some(s2)).unwrap();
        assert_eq!(graph.distance(i, &p), EMPTY_DISTANCE);
        graph.set_slot(d, 0, None).unwrap();
        assert_eq!(graph.distance(d, &p), EMPTY_DISTANCE);

        let inv = graph.insert(Invert);
        assert_eq!(graph.distance(inv, &p), -EMPTY_DISTANCE);
    }
}
