use crate::error::SdfError;
use crate::node::{to_params, Inputs, Params, SdfNode};
use sdforge_math::Vec3;
use serde::{Deserialize, Serialize};

/// Sphere at `center` with given `radius`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Center point.
    pub center: Vec3,
    /// Radius.
    pub radius: f64,
}

impl Sphere {
    /// Registry key.
    pub const KEY: &'static str = "sphere";

    /// Create a sphere.
    pub fn new(center: Vec3, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl SdfNode for Sphere {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn distance(&self, p: &Vec3, _inputs: &Inputs<'_>) -> f64 {
        (p - self.center).norm() - self.radius
    }

    fn params(&self) -> Result<Params, SdfError> {
        to_params(self)
    }
}
