use crate::error::SdfError;
use crate::node::{to_params, Inputs, Params, SdfNode};
use sdforge_math::Vec3;
use serde::{Deserialize, Serialize};

/// Smallest radius used in the division; keeps degenerate axes finite.
const MIN_RADIUS: f64 = 1e-10;

/// Ellipsoid at `center` with semi-axes `radii`.
///
/// Uses the `k0 * (k0 - 1) / k1` approximation: exact on the surface and
/// along the axes, a close bound elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Center point.
    pub center: Vec3,
    /// Semi-axis lengths along X, Y and Z.
    pub radii: Vec3,
}

impl Ellipsoid {
    /// Registry key.
    pub const KEY: &'static str = "ellipsoid";

    /// Create an ellipsoid.
    pub fn new(center: Vec3, radii: Vec3) -> Self {
        Self { center, radii }
    }
}

impl SdfNode for Ellipsoid {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn distance(&self, p: &Vec3, _inputs: &Inputs<'_>) -> f64 {
        let local = p - self.center;
        let radii = self.radii.map(|r| r.max(MIN_RADIUS));
        let k0 = local.component_div(&radii).norm();
        let k1 = local.component_div(&radii.component_mul(&radii)).norm();
        if k1 < MIN_RADIUS {
            // At the center: deepest point, one smallest semi-axis inside.
            return -radii.min();
        }
        k0 * (k0 - 1.0) / k1
    }

    fn params(&self) -> Result<Params, SdfError> {
        to_params(self)
    }
}
