pub mod vector;

use crate::spatial::math::vector::V3c;

pub(crate) const AXIS_X: usize = 0;
pub(crate) const AXIS_Y: usize = 1;
pub(crate) const AXIS_Z: usize = 2;

/// Maps 3 dimensional space limited by `size` to 1 dimension
/// The first index is the most significant one: `i * size² + j * size + k`
/// This mapping function supposes that the coordinates are bound inside
/// a cube, each dimension `size` long.
/// * `i` - x coordinate of position
/// * `j` - y coordinate of position
/// * `k` - z coordinate of position
/// * `size` - Range of the given coordinate space
pub(crate) fn flat_projection(i: usize, j: usize, k: usize, size: usize) -> usize {
    (i * size * size) + (j * size) + k
}

/// Inverse of [flat_projection]
pub(crate) fn matrix_index_for(flat_index: usize, size: usize) -> V3c<usize> {
    V3c::new(
        flat_index / (size * size),
        (flat_index / size) % size,
        flat_index % size,
    )
}

/// The direction of the step to take on each axis when the ray crosses a cell boundary
/// Zero components step in the positive direction, but those axes are never stepped on
pub(crate) fn step_signs(direction: &V3c<f32>) -> V3c<i32> {
    direction.map(|d| if d >= 0. { 1 } else { -1 })
}

/// Reciprocal of each direction component, so boundary distances can be multiplied instead of divided
/// Zero components ( of either sign ) map to positive infinity
pub(crate) fn reciprocal_direction(direction: &V3c<f32>) -> V3c<f32> {
    direction.map(|d| if 0. == d { f32::INFINITY } else { 1. / d })
}

/// Provides the index of the cell containing the given offset on one axis
/// An offset exactly on a cell boundary belongs to the cell the ray is moving into;
/// for rays not moving on the axis, it belongs to the cell on the positive side.
/// The result is clamped into the valid `0..res` range
/// * `offset` - Distance from the origin of the grid level on the axis
/// * `recip_cell_width` - 1 / width of one cell in the grid level
/// * `direction` - The component of the ray direction on the axis
/// * `res` - Number of cells on the axis
pub(crate) fn cell_index_along(offset: f32, recip_cell_width: f32, direction: f32, res: u32) -> i32 {
    let scaled = offset * recip_cell_width;
    let index = if direction < 0. {
        scaled.ceil() as i32 - 1
    } else {
        scaled.floor() as i32
    };
    index.clamp(0, res as i32 - 1)
}

/// Selects the axis whose cell boundary the ray reaches first
/// Ties are resolved towards the later comparison: Y over X, and Z over both
pub(crate) fn next_axis(boundary_distances: &V3c<f32>) -> usize {
    if boundary_distances.x < boundary_distances.y {
        if boundary_distances.x < boundary_distances.z {
            AXIS_X
        } else {
            AXIS_Z
        }
    } else if boundary_distances.y < boundary_distances.z {
        AXIS_Y
    } else {
        AXIS_Z
    }
}

/// True if the given cell index points inside a grid level of `res` cells in each dimension
pub(crate) fn cell_in_range(cell: &V3c<i32>, res: u32) -> bool {
    let res = res as i32;
    (0..res).contains(&cell.x) && (0..res).contains(&cell.y) && (0..res).contains(&cell.z)
}
