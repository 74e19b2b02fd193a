pub mod traversal;

pub use crate::grid::raytracing::traversal::GridTraversal;
pub use crate::spatial::raytracing::Ray;

use crate::grid::types::{CellHit, Grid, GridError};

/// Receives the occupied cells crossed by a ray, in increasing distance order
pub trait CellVisitor {
    /// Called once for every occupied cell. `max_distance` can be shortened,
    /// e.g. after an object inside the cell was hit, which ends the traversal
    /// once the ray moves past it
    fn visit(&mut self, ray: &Ray, hit: &CellHit, max_distance: &mut f32);
}

impl<F> CellVisitor for F
where
    F: FnMut(&CellHit, &mut f32),
{
    fn visit(&mut self, _ray: &Ray, hit: &CellHit, max_distance: &mut f32) {
        self(hit, max_distance)
    }
}

impl Grid {
    /// Provides every occupied cell the given ray crosses, ordered by the distance the ray enters them
    pub fn trace(&self, ray: &Ray) -> Result<Vec<CellHit>, GridError> {
        Ok(self.traverse(ray)?.collect())
    }

    /// Creates a lazy iteration over the occupied cells the given ray crosses
    pub fn traverse(&self, ray: &Ray) -> Result<GridTraversal<'_>, GridError> {
        GridTraversal::new(self, ray)
    }

    /// Calls the visitor for every occupied cell the ray crosses up until `max_distance`
    pub fn trace_with<V: CellVisitor>(
        &self,
        ray: &Ray,
        max_distance: f32,
        visitor: &mut V,
    ) -> Result<(), GridError> {
        let mut traversal = self.traverse(ray)?.with_max_distance(max_distance);
        let mut max_distance = max_distance;
        while let Some(hit) = traversal.next() {
            visitor.visit(ray, &hit, &mut max_distance);
            traversal.limit_distance(max_distance);
        }
        Ok(())
    }
}
