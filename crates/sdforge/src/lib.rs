#![warn(missing_docs)]

//! Composable signed-distance-field scene graph.
//!
//! An [`SdfGraph`] holds primitive shapes ([`shapes`]) combined by boolean
//! operators ([`ops`]), smooth blends ([`smooth`]) and transforms
//! ([`transforms`]). Any node can be sampled for the signed distance from a
//! point to its surface: negative inside, positive outside. Edits propagate
//! change events up to the root, and whole trees are (de)serialized through
//! a key-dispatched [`Registry`].
//!
//! # Example
//!
//! ```
//! use sdforge::shapes::{Box3, Sphere};
//! use sdforge::{Registry, SdfGraph, Vec3};
//!
//! let mut graph = SdfGraph::new();
//! let ball = graph.insert(Sphere::new(Vec3::zeros(), 1.0));
//! let cube = graph.insert(Box3::new(Vec3::new(3.0, 0.0, 0.0), Vec3::repeat(1.0)));
//! let scene = graph.union(ball, cube)?;
//! assert_eq!(graph.distance(scene, &Vec3::zeros()), -1.0);
//!
//! let registry = Registry::with_builtins();
//! let record = registry.encode(&graph, scene)?;
//! let copy = registry.decode(&mut graph, &record)?;
//! assert_eq!(graph.distance(copy, &Vec3::new(10.0, 0.0, 0.0)), 6.0);
//! # Ok::<(), sdforge::SdfError>(())
//! ```

pub use sdforge_math;

pub mod document;
pub mod error;
pub mod graph;
pub mod node;
pub mod ops;
pub mod registry;
pub mod shapes;
pub mod smooth;
pub mod transforms;

pub use document::SceneDocument;
pub use error::SdfError;
pub use graph::{Listener, NodeId, SdfGraph, TreeDisplay};
pub use node::{Inputs, Params, SdfNode, EMPTY_DISTANCE};
pub use registry::{register_all, NodeCodec, Registry};
pub use sdforge_math::Vec3;
