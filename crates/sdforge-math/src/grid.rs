//! Conversions between continuous points and integer grid cells.
//!
//! A host voxel world addresses space by unit cells ("blocks"). Cell
//! `(x, y, z)` spans `[x, x + 1) × [y, y + 1) × [z, z + 1)`.

use crate::Vec3;
use nalgebra::Vector3;

/// Integer coordinates of a unit grid cell.
pub type BlockPos = Vector3<i32>;

/// Offsets from a cell center to its eight corners.
pub const BLOCK_CORNER_OFFSETS: [[f64; 3]; 8] = [
    [0.5, 0.5, 0.5],
    [0.5, -0.5, 0.5],
    [-0.5, -0.5, 0.5],
    [-0.5, 0.5, 0.5],
    [0.5, 0.5, -0.5],
    [0.5, -0.5, -0.5],
    [-0.5, -0.5, -0.5],
    [-0.5, 0.5, -0.5],
];

/// Index of the cell containing coordinate `d` along one axis.
pub fn to_block_coord(d: f64) -> i32 {
    d.floor() as i32
}

/// The cell containing `p`.
pub fn to_block_pos(p: &Vec3) -> BlockPos {
    p.map(to_block_coord)
}

/// Snap `p` to the minimum corner of its cell.
pub fn block_aligned(p: &Vec3) -> Vec3 {
    p.map(f64::floor)
}

/// Round every axis away from zero.
///
/// Used to grow a bounding extent so that it never under-covers the cells it
/// touches.
pub fn conservative(p: &Vec3) -> Vec3 {
    p.map(|d| if d < 0.0 { d.floor() } else { d.ceil() })
}

/// Center point of a cell.
pub fn block_center(pos: &BlockPos) -> Vec3 {
    pos.map(|c| f64::from(c) + 0.5)
}

/// The eight corner points of a cell.
pub fn block_corners(pos: &BlockPos) -> [Vec3; 8] {
    let center = block_center(pos);
    BLOCK_CORNER_OFFSETS.map(|[x, y, z]| center + Vec3::new(x, y, z))
}
