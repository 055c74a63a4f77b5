//! Unary nodes that move, scale or rotate their child.
//!
//! Each one maps the query point into the child's frame and evaluates the
//! child there; scaling also rescales the result so it stays a distance.

use crate::error::SdfError;
use crate::node::{to_params, Inputs, Params, SdfNode, EMPTY_DISTANCE};
use nalgebra::Rotation3;
use sdforge_math::Vec3;
use serde::{Deserialize, Serialize};

/// Translation by `offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translate {
    /// Translation offset.
    pub offset: Vec3,
}

impl Translate {
    /// Registry key.
    pub const KEY: &'static str = "translate";

    /// Create a translation.
    pub fn new(offset: Vec3) -> Self {
        Self { offset }
    }
}

impl SdfNode for Translate {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn arity(&self) -> usize {
        1
    }

    fn distance(&self, p: &Vec3, inputs: &Inputs<'_>) -> f64 {
        inputs.distance(0, &(p - self.offset))
    }

    fn params(&self) -> Result<Params, SdfError> {
        to_params(self)
    }
}

/// Uniform scale about the origin.
///
/// Only uniform scaling keeps the field a true distance; the factor is
/// always positive and finite, also when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScaleParams")]
pub struct Scale {
    factor: f64,
}

#[derive(Deserialize)]
struct ScaleParams {
    factor: f64,
}

impl TryFrom<ScaleParams> for Scale {
    type Error = SdfError;

    fn try_from(params: ScaleParams) -> Result<Self, Self::Error> {
        Self::new(params.factor)
    }
}

impl Scale {
    /// Registry key.
    pub const KEY: &'static str = "scale";

    /// Create a scale node.
    pub fn new(factor: f64) -> Result<Self, SdfError> {
        if factor > 0.0 && factor.is_finite() {
            Ok(Self { factor })
        } else {
            Err(SdfError::malformed(format!(
                "scale factor must be positive, got {factor}"
            )))
        }
    }

    /// Scale factor.
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl SdfNode for Scale {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn arity(&self) -> usize {
        1
    }

    fn distance(&self, p: &Vec3, inputs: &Inputs<'_>) -> f64 {
        let d = inputs.distance(0, &(p / self.factor));
        if d.abs() == EMPTY_DISTANCE {
            d
        } else {
            d * self.factor
        }
    }

    fn params(&self) -> Result<Params, SdfError> {
        to_params(self)
    }
}

/// Rotation about the origin by Euler angles in degrees, applied about X,
/// then Y, then Z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rotate {
    /// Rotation angles in degrees.
    pub angles: Vec3,
}

impl Rotate {
    /// Registry key.
    pub const KEY: &'static str = "rotate";

    /// Create a rotation.
    pub fn new(angles: Vec3) -> Self {
        Self { angles }
    }

    fn rotation(&self) -> Rotation3<f64> {
        let radians = self.angles.map(f64::to_radians);
        Rotation3::from_euler_angles(radians.x, radians.y, radians.z)
    }
}

impl SdfNode for Rotate {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn arity(&self) -> usize {
        1
    }

    fn distance(&self, p: &Vec3, inputs: &Inputs<'_>) -> f64 {
        inputs.distance(0, &self.rotation().inverse_transform_vector(p))
    }

    fn params(&self) -> Result<Params, SdfError> {
        to_params(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SdfGraph;
    use crate::ops::Invert;
    use crate::shapes::{Box3, Cylinder, Sphere};
    use approx::assert_relative_eq;

    fn probes() -> Vec<Vec3> {
        vec![
            Vec3::zeros(),
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-2.5, 0.5, 0.0),
            Vec3::new(4.0, -1.0, 2.0),
        ]
    }

    #[test]
    fn test_translate_matches_moved_primitive() {
        let mut graph = SdfGraph::new();
        let offset = Vec3::new(1.0, -2.0, 0.5);
        let at_origin = graph.insert(Box3::new(Vec3::zeros(), Vec3::new(1.0, 0.5, 2.0)));
        let moved = graph.build(Translate::new(offset), &[at_origin]).unwrap();
        let placed = graph.insert(Box3::new(offset, Vec3::new(1.0, 0.5, 2.0)));
        for p in probes() {
            assert_relative_eq!(graph.distance(moved, &p), graph.distance(placed, &p));
        }
    }

    #[test]
    fn test_scale_matches_bigger_sphere() {
        let mut graph = SdfGraph::new();
        let unit = graph.insert(Sphere::new(Vec3::new(1.0, 0.0, 0.0), 1.0));
        let scaled = graph.build(Scale::new(3.0).unwrap(), &[unit]).unwrap();
        let big = graph.insert(Sphere::new(Vec3::new(3.0, 0.0, 0.0), 3.0));
        for p in probes() {
            assert_relative_eq!(
                graph.distance(scaled, &p),
                graph.distance(big, &p),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_scale_rejects_non_positive_factor() {
        assert!(matches!(Scale::new(0.0), Err(SdfError::MalformedRecord(_))));
        assert!(matches!(Scale::new(-1.0), Err(SdfError::MalformedRecord(_))));
        assert!(Scale::new(f64::NAN).is_err());
    }

    #[test]
    fn test_scale_keeps_unset_child_empty() {
        let mut graph = SdfGraph::new();
        let grow = graph.insert(Scale::new(2.0).unwrap());
        let shrink = graph.insert(Scale::new(0.5).unwrap());
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(graph.distance(grow, &p), EMPTY_DISTANCE);
        assert_eq!(graph.distance(shrink, &p), EMPTY_DISTANCE);

        let hole = graph.insert(Invert);
        let scaled = graph.build(Scale::new(3.0).unwrap(), &[hole]).unwrap();
        assert_eq!(graph.distance(scaled, &p), -EMPTY_DISTANCE);
    }

    #[test]
    fn test_scale_factor_is_validated_on_deserialize() {
        let scale: Scale = serde_json::from_value(serde_json::json!({ "factor": 2.5 })).unwrap();
        assert_eq!(scale.factor(), 2.5);
        assert!(serde_json::from_value::<Scale>(serde_json::json!({ "factor": 0.0 })).is_err());
        assert!(serde_json::from_value::<Scale>(serde_json::json!({ "factor": -1.0 })).is_err());
    }

    #[test]
    fn test_rotate_quarter_turn_about_z_swaps_box_extents() {
        let mut graph = SdfGraph::new();
        let wide = graph.insert(Box3::new(Vec3::zeros(), Vec3::new(2.0, 1.0, 1.0)));
        let turned = graph
            .build(Rotate::new(Vec3::new(0.0, 0.0, 90.0)), &[wide])
            .unwrap();
        let tall = graph.insert(Box3::new(Vec3::zeros(), Vec3::new(1.0, 2.0, 1.0)));
        for p in probes() {
            assert_relative_eq!(
                graph.distance(turned, &p),
                graph.distance(tall, &p),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_rotate_lays_cylinder_along_x() {
        let mut graph = SdfGraph::new();
        let upright = graph.insert(Cylinder::new(Vec3::zeros(), 0.5, 4.0));
        let lying = graph
            .build(Rotate::new(Vec3::new(0.0, 0.0, 90.0)), &[upright])
            .unwrap();
        // The axis now runs along X: the end cap sits at x = ±2.
        assert_relative_eq!(
            graph.distance(lying, &Vec3::new(3.0, 0.0, 0.0)),
            1.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            graph.distance(lying, &Vec3::new(0.0, 3.0, 0.0)),
            2.5,
            epsilon = 1e-9
        );
    }
}
