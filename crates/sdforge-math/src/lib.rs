#![warn(missing_docs)]

//! Math types for the sdforge SDF scene graph.
//!
//! Thin aliases over nalgebra plus the tolerance used when comparing
//! sampled distances, and the [`grid`] conversions between continuous
//! points and the integer cells of a host voxel world.

use nalgebra::{Vector2, Vector3};

pub mod grid;

/// A vector (or query point) in 3D space.
pub type Vec3 = Vector3<f64>;

/// A vector in 2D space, used by primitives that reduce to a planar profile.
pub type Vec2 = Vector2<f64>;

/// Default epsilon for coordinate equality.
pub const EPSILON: f64 = 1e-10;

/// Tolerance for comparing points and sampled distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Absolute tolerance on each coordinate or distance value.
    pub linear: f64,
}

impl Tolerance {
    /// Default tolerance ([`EPSILON`]).
    pub const DEFAULT: Self = Self { linear: EPSILON };

    /// Create a tolerance with a custom linear bound.
    pub const fn new(linear: f64) -> Self {
        Self { linear }
    }

    /// Check if two points agree on every axis within tolerance.
    pub fn points_equal(&self, a: &Vec3, b: &Vec3) -> bool {
        (a - b).iter().all(|d| d.abs() < self.linear)
    }

    /// Check if two scalars (e.g. distances) are effectively equal.
    pub fn values_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_equal_per_axis() {
        let tol = Tolerance::DEFAULT;
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(1.0 + 1e-12, 2.0, 3.0);
        assert!(tol.points_equal(&a, &b));
        let c = Vec3::new(1.0, 2.0 + 1e-6, 3.0);
        assert!(!tol.points_equal(&a, &c));
    }

    #[test]
    fn test_values_equal_custom_bound() {
        let tol = Tolerance::new(1e-3);
        assert!(tol.values_equal(0.5, 0.5004));
        assert!(!tol.values_equal(0.5, 0.502));
    }
}
