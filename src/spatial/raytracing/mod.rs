use crate::spatial::{math::vector::V3c, Cube};


/// A half line starting at `origin`, pointing to `direction`
/// The direction does not need to be normalized; distances along the ray are
/// measured in units of the direction vector, i.e. point = origin + t * direction
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Ray {
    pub origin: V3c<f32>,
    pub direction: V3c<f32>,
}

impl Ray {
    pub fn new(origin: V3c<f32>, direction: V3c<f32>) -> Self {
        Self { origin, direction }
    }

    /// A ray can be traced if it has a finite origin and a finite, non-zero direction
    pub fn is_valid(&self) -> bool {
        self.origin.is_finite() && self.direction.is_finite() && !self.direction.is_zero()
    }

    pub fn point_at(&self, t: f32) -> V3c<f32> {
        self.origin + self.direction * t
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CubeRayIntersection {
    /// Ray parameter where the ray enters the cube; negative if the origin is inside
    pub entry_distance: f32,
    /// Ray parameter where the ray leaves the cube
    pub exit_distance: f32,
}

impl Cube {
    /// Tells the intersection with the cube of the given ray.
    /// Returns the ray parameter range overlapping the cube, should there be any in front of the origin.
    /// Axes where the ray doesn't move only constrain the ray by its origin,
    /// which must be inside the half open [min, max) range of the cube on that axis.
    /// https://gamedev.stackexchange.com/questions/18436/most-efficient-aabb-vs-ray-collision-algorithms
    pub fn intersect_ray(&self, ray: &Ray) -> Option<CubeRayIntersection> {
        debug_assert!(ray.is_valid());
        let max_position = self.max_position();
        let mut tmin = f32::NEG_INFINITY;
        let mut tmax = f32::INFINITY;
        for axis in 0..3 {
            if 0. == ray.direction[axis] {
                if ray.origin[axis] < self.min_position[axis] || ray.origin[axis] >= max_position[axis] {
                    return None;
                }
                continue;
            }
            let t1 = (self.min_position[axis] - ray.origin[axis]) / ray.direction[axis];
            let t2 = (max_position[axis] - ray.origin[axis]) / ray.direction[axis];
            tmin = tmin.max(t1.min(t2));
            tmax = tmax.min(t1.max(t2));
        }

        if tmax <= 0. || tmin >= tmax {
            // ray is intersecting the cube, but it is behind it
            // OR ray doesn't intersect cube
            // OR only touches its edges
            return None;
        }

        Some(CubeRayIntersection {
            entry_distance: tmin,
            exit_distance: tmax,
        })
    }
}
