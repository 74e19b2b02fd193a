use crate::{
    grid::types::{CellHit, CellState, Grid, GridError},
    spatial::{
        math::{
            cell_in_range, cell_index_along, flat_projection, next_axis, reciprocal_direction,
            step_signs,
        },
        raytracing::Ray,
        V3c,
    },
};
use log::trace;
use std::iter::FusedIterator;

/// Position of the traversal inside an ancestor level, saved when descending into one of its cells
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(crate) struct StackFrame {
    pub(crate) node: u32,
    pub(crate) cell: V3c<i32>,
    pub(crate) cell_width: f32,
    /// Minimum corner of the node the frame belongs to
    pub(crate) node_origin: V3c<f32>,
}

/// Stack of ancestor frames with a capacity fixed at creation
/// The capacity is the nesting depth of the grid, validated when the grid was built
#[derive(Debug)]
pub(crate) struct NodeStack<T> {
    data: Vec<T>,
    capacity: usize,
}

impl<T> NodeStack<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn push(&mut self, frame: T) {
        debug_assert!(
            self.data.len() < self.capacity,
            "Traversal stack overflow: grid nesting depth is larger than {}",
            self.capacity
        );
        self.data.push(frame);
    }

    pub(crate) fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TraversalState {
    /// Walk down through interior cells until a leaf is reached, report it if occupied
    Descend,
    /// Move to the adjacent cell along the axis whose boundary is the closest
    Step,
    /// Climb up to the parent levels while the current cell is outside of its node
    Ascend,
    Finished,
}

/// Lazy, single use iteration over the occupied cells a ray crosses, in increasing distance order
/// Built by [Grid::traverse]
#[derive(Debug)]
pub struct GridTraversal<'a> {
    grid: &'a Grid,
    ray: Ray,
    recip_direction: V3c<f32>,
    step_sign: V3c<i32>,
    stack: NodeStack<StackFrame>,
    state: TraversalState,

    // Current position in the tree
    node: u32,
    cell: V3c<i32>,
    cell_width: f32,
    node_origin: V3c<f32>,

    /// Ray parameter where the ray entered the current cell
    t: f32,
    /// Distance from `t` to the next cell boundary on each axis
    boundary_distances: V3c<f32>,
    /// Distance needed to cross a whole cell of the current level on each axis
    cell_crossing_distances: V3c<f32>,
    /// Axis of the most recent step, to be repeated on the parent level after an ascend
    last_step_axis: usize,
    /// The boundary distances need to be re-calculated because the level changed
    level_changed: bool,
    max_distance: f32,
}

impl<'a> GridTraversal<'a> {
    pub(crate) fn new(grid: &'a Grid, ray: &Ray) -> Result<Self, GridError> {
        if !ray.is_valid() {
            return Err(GridError::DegenerateRay);
        }

        let mut traversal = Self {
            grid,
            ray: *ray,
            recip_direction: reciprocal_direction(&ray.direction),
            step_sign: step_signs(&ray.direction),
            stack: NodeStack::with_capacity(grid.max_depth),
            state: TraversalState::Finished,
            node: Grid::ROOT_NODE_KEY,
            cell: V3c::unit(0),
            cell_width: grid.cell_widths[0],
            node_origin: grid.config.root_origin,
            t: 0.,
            boundary_distances: V3c::unit(f32::INFINITY),
            cell_crossing_distances: V3c::unit(f32::INFINITY),
            last_step_axis: 0,
            level_changed: true,
            max_distance: f32::INFINITY,
        };

        // Rays starting outside the root volume start from where they enter it
        if let Some(root_hit) = grid.bounds().intersect_ray(ray) {
            traversal.t = root_hit.entry_distance.max(0.);
            traversal.cell = traversal.locate_cell();
            traversal.state = TraversalState::Descend;
        } else {
            trace!("Ray {ray:?} misses the root volume");
        }
        Ok(traversal)
    }

    /// Limits the traversal to the given ray parameter
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.limit_distance(max_distance);
        self
    }

    /// Shortens the range of the traversal; cells starting beyond `max_distance` are not visited
    /// The range can't be extended once set
    pub fn limit_distance(&mut self, max_distance: f32) {
        self.max_distance = self.max_distance.min(max_distance);
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    fn level(&self) -> usize {
        self.stack.len()
    }

    /// Index of the cell of the current node containing the ray at the current distance
    fn locate_cell(&self) -> V3c<i32> {
        let offset = self.ray.point_at(self.t) - self.node_origin;
        let recip_cell_width = self.grid.recip_cell_widths[self.level()];
        let res = self.grid.config.res;
        V3c::new(
            cell_index_along(offset.x, recip_cell_width, self.ray.direction.x, res),
            cell_index_along(offset.y, recip_cell_width, self.ray.direction.y, res),
            cell_index_along(offset.z, recip_cell_width, self.ray.direction.z, res),
        )
    }

    /// Calculates the distance to the boundaries of the current cell from its geometry
    /// Axes where the ray doesn't move never reach their boundary
    fn seed_boundary_distances(&mut self) {
        for axis in 0..3 {
            if 0. == self.ray.direction[axis] {
                self.boundary_distances[axis] = f32::INFINITY;
                self.cell_crossing_distances[axis] = f32::INFINITY;
                continue;
            }
            let far_side = self.cell[axis] + (0 < self.step_sign[axis]) as i32;
            let boundary = self.node_origin[axis] + far_side as f32 * self.cell_width;
            let boundary_t = (boundary - self.ray.origin[axis]) * self.recip_direction[axis];
            self.boundary_distances[axis] = (boundary_t - self.t).max(0.);
            self.cell_crossing_distances[axis] =
                self.cell_width * self.recip_direction[axis].abs();
        }
        self.level_changed = false;
    }

    fn current_cell_state(&self) -> CellState {
        let res = self.grid.config.res as usize;
        debug_assert!(cell_in_range(&self.cell, self.grid.config.res));
        self.grid.nodes[self.node as usize].cells[flat_projection(
            self.cell.x as usize,
            self.cell.y as usize,
            self.cell.z as usize,
            res,
        )]
    }

    /// Walks down the interior cells containing the ray at the current distance,
    /// returns with the hit in case the reached leaf is occupied
    fn descend(&mut self) -> Option<CellHit> {
        if self.t >= self.max_distance {
            self.state = TraversalState::Finished;
            return None;
        }

        let leaf = loop {
            match self.current_cell_state() {
                CellState::Interior(child) => {
                    self.stack.push(StackFrame {
                        node: self.node,
                        cell: self.cell,
                        cell_width: self.cell_width,
                        node_origin: self.node_origin,
                    });
                    self.node_origin += V3c::<f32>::from(self.cell) * self.cell_width;
                    self.cell_width = self.grid.cell_widths[self.level()];
                    self.node = child;
                    self.cell = self.locate_cell();
                    self.level_changed = true;
                    trace!(
                        "Descended to node {} cell {:?} at t = {}",
                        self.node,
                        self.cell,
                        self.t
                    );
                }
                leaf => break leaf,
            }
        };

        if self.level_changed {
            self.seed_boundary_distances();
        }

        self.state = TraversalState::Step;
        let exit_axis = next_axis(&self.boundary_distances);
        let t_exit = (self.t + self.boundary_distances[exit_axis]).min(self.max_distance);
        if CellState::Occupied == leaf && self.t < t_exit {
            Some(CellHit {
                node: self.node,
                cell: V3c::<u32>::from(self.cell),
                level: self.level() as u32,
                t_enter: self.t,
                t_exit,
                cell_min: self.node_origin + V3c::<f32>::from(self.cell) * self.cell_width,
                cell_width: self.cell_width,
            })
        } else {
            // Empty cells, and cells only touched at an edge or corner are not reported
            None
        }
    }

    /// Advances to the adjacent cell through the closest boundary
    fn step(&mut self) {
        let axis = next_axis(&self.boundary_distances);
        let distance = self.boundary_distances[axis];
        self.t += distance;
        for other_axis in [(axis + 1) % 3, (axis + 2) % 3] {
            self.boundary_distances[other_axis] -= distance;
        }
        self.boundary_distances[axis] = self.cell_crossing_distances[axis];
        self.cell[axis] += self.step_sign[axis];
        self.last_step_axis = axis;

        self.state = if self.t >= self.max_distance {
            TraversalState::Finished
        } else if cell_in_range(&self.cell, self.grid.config.res) {
            TraversalState::Descend
        } else {
            TraversalState::Ascend
        };
    }

    /// Pops ancestor levels until the current cell is back inside its node
    /// Each popped level repeats the step that left the child node
    fn ascend(&mut self) {
        let axis = self.last_step_axis;
        while !cell_in_range(&self.cell, self.grid.config.res) {
            let Some(frame) = self.stack.pop() else {
                trace!("Ray left the root volume at t = {}", self.t);
                self.state = TraversalState::Finished;
                return;
            };
            self.node = frame.node;
            self.cell = frame.cell;
            self.cell_width = frame.cell_width;
            self.node_origin = frame.node_origin;
            self.cell[axis] += self.step_sign[axis];
            trace!(
                "Ascended to node {} cell {:?} at t = {}",
                self.node,
                self.cell,
                self.t
            );
        }
        self.level_changed = true;
        self.state = TraversalState::Descend;
    }
}

impl Iterator for GridTraversal<'_> {
    type Item = CellHit;

    fn next(&mut self) -> Option<CellHit> {
        loop {
            match self.state {
                TraversalState::Descend => {
                    if let Some(hit) = self.descend() {
                        return Some(hit);
                    }
                }
                TraversalState::Step => self.step(),
                TraversalState::Ascend => self.ascend(),
                TraversalState::Finished => return None,
            }
        }
    }
}

impl FusedIterator for GridTraversal<'_> {}
