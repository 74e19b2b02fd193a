pub mod math;
pub mod raytracing;

pub use crate::spatial::math::vector::V3c;

/// Axis aligned cube, described by its minimum corner and the length of its edges
#[derive(Default, Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Cube {
    pub min_position: V3c<f32>,
    pub size: f32,
}

impl Cube {
    pub fn new(min_position: V3c<f32>, size: f32) -> Self {
        Self { min_position, size }
    }

    pub fn max_position(&self) -> V3c<f32> {
        self.min_position + V3c::unit(self.size)
    }

    pub fn midpoint(&self) -> V3c<f32> {
        self.min_position + V3c::unit(self.size / 2.)
    }

    /// Bounds of the cell at the given index, should the cube be divided into `res` cells on each axis
    pub fn cell_bounds(&self, cell: &V3c<u32>, res: u32) -> Cube {
        let cell_size = self.size / res as f32;
        Cube {
            min_position: self.min_position + V3c::<f32>::from(*cell) * cell_size,
            size: cell_size,
        }
    }

    /// True if the given point is inside the cube, with coordinates in inclusive, exclusive range
    pub fn contains_point(&self, point: &V3c<f32>) -> bool {
        let max_position = self.max_position();
        (point.x >= self.min_position.x && point.x < max_position.x)
            && (point.y >= self.min_position.y && point.y < max_position.y)
            && (point.z >= self.min_position.z && point.z < max_position.z)
    }
}
