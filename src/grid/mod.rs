pub mod node;
pub mod raytracing;
pub mod types;


pub use crate::grid::types::{
    CellHit, CellState, Grid, GridBuilder, GridConfig, GridError, GridNode,
};
pub use crate::spatial::{raytracing::Ray, Cube, V3c};

use log::debug;

/// Number of interior links a traversal can descend through, unless configured otherwise
pub const DEFAULT_MAX_DEPTH: usize = 64;

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            res: 4,
            root_origin: V3c::unit(0.),
            root_cell_width: 0.25,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl GridConfig {
    /// Configuration for a root volume with the given minimum corner and edge length
    pub fn from_bounds(min_position: V3c<f32>, size: f32, res: u32) -> Self {
        Self {
            res,
            root_origin: min_position,
            root_cell_width: size / res as f32,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Bounds of the root volume
    pub fn root_bounds(&self) -> Cube {
        Cube::new(self.root_origin, self.root_cell_width * self.res as f32)
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.res < 2 {
            return Err(GridError::InvalidResolution(self.res));
        }
        if !(self.root_cell_width.is_finite() && 0. < self.root_cell_width) {
            return Err(GridError::InvalidCellWidth(self.root_cell_width));
        }
        if !self.root_origin.is_finite() {
            return Err(GridError::InvalidOrigin);
        }
        if 0 == self.max_depth {
            return Err(GridError::InvalidMaxDepth);
        }
        Ok(())
    }
}

///####################################################################################
/// GridBuilder
///####################################################################################
impl GridBuilder {
    pub const ROOT_NODE_KEY: u32 = 0;

    /// Creates a builder with an empty root node
    pub fn new(config: GridConfig) -> Result<Self, GridError> {
        config.validate().inspect_err(|error| {
            debug!("Rejecting grid configuration {config:?}: {error}");
        })?;
        Ok(Self {
            nodes: vec![GridNode::new(config.res)],
            config,
        })
    }

    /// Creates a builder from an already populated node arena; node 0 is taken as the root
    pub fn from_nodes(config: GridConfig, nodes: Vec<GridNode>) -> Result<Self, GridError> {
        config.validate()?;
        Ok(Self { config, nodes })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Appends an empty node, returns with its index
    pub fn add_node(&mut self) -> u32 {
        self.nodes.push(GridNode::new(self.config.res));
        (self.nodes.len() - 1) as u32
    }

    pub fn node(&self, node: u32) -> Option<&GridNode> {
        self.nodes.get(node as usize)
    }

    pub fn node_mut(&mut self, node: u32) -> Result<&mut GridNode, GridError> {
        self.nodes
            .get_mut(node as usize)
            .ok_or(GridError::NodeOutOfBounds(node))
    }

    /// Classifies the cell (i, j, k) of the given node
    pub fn set_cell_state(
        &mut self,
        node: u32,
        i: u32,
        j: u32,
        k: u32,
        state: CellState,
    ) -> Result<(), GridError> {
        self.node_mut(node)?.set_cell_state(i, j, k, state)
    }

    /// Validates the node arena and freezes it into a traceable grid
    pub fn build(self) -> Result<Grid, GridError> {
        self.config.validate()?;
        if self.nodes.is_empty() {
            return Err(GridError::EmptyGrid);
        }
        for (node_index, node) in self.nodes.iter().enumerate() {
            if node.res != self.config.res {
                return Err(GridError::ResolutionMismatch {
                    node: node_index as u32,
                    expected: self.config.res,
                    found: node.res,
                });
            }
            for (_, child) in node.children() {
                if child as usize >= self.nodes.len() {
                    return Err(GridError::DanglingLink {
                        node: node_index as u32,
                        child,
                    });
                }
                if Self::ROOT_NODE_KEY == child {
                    return Err(GridError::RootLink {
                        node: node_index as u32,
                    });
                }
            }
        }

        let max_depth = Self::nesting_depth(&self.nodes)?;
        if max_depth > self.config.max_depth {
            return Err(GridError::DepthExceeded {
                depth: max_depth,
                capacity: self.config.max_depth,
            });
        }

        let (cell_widths, recip_cell_widths) =
            Self::level_cell_widths(&self.config, max_depth);
        debug!(
            "Built grid of {} nodes, resolution {}, depth {}",
            self.nodes.len(),
            self.config.res,
            max_depth
        );
        Ok(Grid {
            config: self.config,
            nodes: self.nodes,
            max_depth,
            cell_widths,
            recip_cell_widths,
        })
    }

    /// Cell widths and their reciprocals for every level up to `max_depth`, computed in double precision
    fn level_cell_widths(config: &GridConfig, max_depth: usize) -> (Vec<f32>, Vec<f32>) {
        let recip_res = 1. / config.res as f64;
        let mut cell_width = config.root_cell_width as f64;
        let mut cell_widths = Vec::with_capacity(max_depth + 1);
        let mut recip_cell_widths = Vec::with_capacity(max_depth + 1);
        for _ in 0..=max_depth {
            cell_widths.push(cell_width as f32);
            recip_cell_widths.push((1. / cell_width) as f32);
            cell_width *= recip_res;
        }
        (cell_widths, recip_cell_widths)
    }

    /// Deepest level reachable from the root through interior links
    /// Fails if the interior links of any node form a cycle
    fn nesting_depth(nodes: &[GridNode]) -> Result<usize, GridError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Visit {
            New,
            InProgress,
            Done(usize),
        }

        // Depth of the subtree below each node, calculated iteratively so deep grids can't overflow the call stack
        let mut visits = vec![Visit::New; nodes.len()];
        for start_node in 0..nodes.len() {
            if Visit::New != visits[start_node] {
                continue;
            }
            visits[start_node] = Visit::InProgress;
            let mut node_stack = vec![start_node];
            while let Some(node) = node_stack.last().copied() {
                let next_unfinished = nodes[node]
                    .children()
                    .map(|(_, child)| child as usize)
                    .find(|child| !matches!(visits[*child], Visit::Done(_)));

                match next_unfinished {
                    Some(child) if Visit::InProgress == visits[child] => {
                        return Err(GridError::CyclicLink { node: child as u32 });
                    }
                    Some(child) => {
                        visits[child] = Visit::InProgress;
                        node_stack.push(child);
                    }
                    None => {
                        let subtree_depth = nodes[node]
                            .children()
                            .map(|(_, child)| match visits[child as usize] {
                                Visit::Done(depth) => depth + 1,
                                _ => 0,
                            })
                            .max()
                            .unwrap_or(0);
                        visits[node] = Visit::Done(subtree_depth);
                        node_stack.pop();
                    }
                }
            }
        }

        match visits[Self::ROOT_NODE_KEY as usize] {
            Visit::Done(depth) => Ok(depth),
            _ => Ok(0),
        }
    }
}

///####################################################################################
/// Grid
///####################################################################################
impl Grid {
    pub const ROOT_NODE_KEY: u32 = GridBuilder::ROOT_NODE_KEY;

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn res(&self) -> u32 {
        self.config.res
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, node: u32) -> Option<&GridNode> {
        self.nodes.get(node as usize)
    }

    /// Provides the state of the given cell, or None if the node or the cell index is out of bounds
    pub fn cell_state(&self, node: u32, i: u32, j: u32, k: u32) -> Option<CellState> {
        self.node(node).and_then(|node| node.cell_state(i, j, k))
    }

    /// Deepest level reachable through interior links, the root being level 0
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Width of one cell at the given level, or None if no node is that deep
    pub fn cell_width_at(&self, level: usize) -> Option<f32> {
        self.cell_widths.get(level).copied()
    }

    /// Bounds of the root volume
    pub fn bounds(&self) -> Cube {
        self.config.root_bounds()
    }

    /// Converts the grid back into a builder, so it can be modified
    pub fn into_builder(self) -> GridBuilder {
        GridBuilder {
            config: self.config,
            nodes: self.nodes,
        }
    }
}
