use crate::node::{Inputs, SdfNode, EMPTY_DISTANCE};
use sdforge_math::Vec3;

/// The "nothing here" node.
///
/// Fills unset slots. Its distance is [`EMPTY_DISTANCE`] everywhere, so it
/// vanishes under union and dominates under intersection; a combinator
/// whose result is dominated by it is incompletely configured rather than
/// a meaningful shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Empty;

impl Empty {
    /// Registry key.
    pub const KEY: &'static str = "empty";
}

impl SdfNode for Empty {
    fn type_key(&self) -> &'static str {
        Self::KEY
    }

    fn distance(&self, _p: &Vec3, _inputs: &Inputs<'_>) -> f64 {
        EMPTY_DISTANCE
    }
}
