use crate::grid::types::{CellState, GridError, GridNode};
use crate::spatial::math::{flat_projection, matrix_index_for};
use crate::spatial::V3c;

impl GridNode {
    /// Creates a node with `res`³ empty cells
    pub fn new(res: u32) -> Self {
        let res_usize = res as usize;
        Self {
            res,
            cells: vec![CellState::Empty; res_usize * res_usize * res_usize],
        }
    }

    pub fn res(&self) -> u32 {
        self.res
    }

    /// The classification of every cell, in `i * res² + j * res + k` order
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    fn flat_index(&self, i: u32, j: u32, k: u32) -> Option<usize> {
        if i < self.res && j < self.res && k < self.res {
            Some(flat_projection(
                i as usize,
                j as usize,
                k as usize,
                self.res as usize,
            ))
        } else {
            None
        }
    }

    /// Provides the state of the cell at the given index, or None if the index is out of bounds
    pub fn cell_state(&self, i: u32, j: u32, k: u32) -> Option<CellState> {
        self.flat_index(i, j, k).map(|index| self.cells[index])
    }

    /// Updates the state of the cell at the given index
    /// The caller is responsible for not creating cycles through interior links
    pub fn set_cell_state(
        &mut self,
        i: u32,
        j: u32,
        k: u32,
        state: CellState,
    ) -> Result<(), GridError> {
        let index = self
            .flat_index(i, j, k)
            .ok_or(GridError::CellOutOfBounds {
                i,
                j,
                k,
                res: self.res,
            })?;
        self.cells[index] = state;
        Ok(())
    }

    /// Sets every cell of the node to the given state
    pub fn fill(&mut self, state: CellState) {
        self.cells.fill(state);
    }

    /// Iterates over the interior cells: (cell index, child node index)
    pub fn children(&self) -> impl Iterator<Item = (V3c<u32>, u32)> + '_ {
        let res = self.res as usize;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(flat_index, state)| match state {
                CellState::Interior(child) => {
                    let cell = matrix_index_for(flat_index, res);
                    Some((V3c::new(cell.x as u32, cell.y as u32, cell.z as u32), *child))
                }
                _ => None,
            })
    }

    /// Number of leaf cells marked as occupied
    pub fn occupied_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|state| matches!(state, CellState::Occupied))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|state| matches!(state, CellState::Empty))
    }
}
