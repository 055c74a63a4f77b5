//! Primitive nodes: leaves computing an analytic distance from their own
//! shape parameters.
//!
//! Every primitive has arity 0 and is positioned by a `center`; the
//! formulas below are evaluated in the primitive's local frame
//! (`p - center`).

mod box3;
mod cylinder;
mod ellipsoid;
mod empty;
mod prism;
mod sphere;

pub use box3::Box3;
pub use cylinder::Cylinder;
pub use ellipsoid::Ellipsoid;
pub use empty::Empty;
pub use prism::Prism;
pub use sphere::Sphere;
