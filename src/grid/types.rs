use crate::spatial::{Cube, V3c};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Classification of one cell inside a [GridNode]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum CellState {
    /// Nothing is reachable through the cell, rays skip it
    #[default]
    Empty,
    /// Leaf cell containing at least one object, rays report it
    Occupied,
    /// The cell is subdivided into the node at the given index of the owning grid
    Interior(u32),
}

/// One level of the hierarchy: `res`³ cells, stored flat in `i * res² + j * res + k` order
/// Child nodes are not owned by their parent, they are addressed by index into the grid
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct GridNode {
    pub(crate) res: u32,
    pub(crate) cells: Vec<CellState>,
}

/// Grid-wide configuration, fixed for the lifetime of the grid
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct GridConfig {
    /// Number of cells per axis in every node
    pub res: u32,
    /// Minimum corner of the root volume
    pub root_origin: V3c<f32>,
    /// Width of a cell in the root node; the root volume is `root_cell_width * res` wide
    pub root_cell_width: f32,
    /// Maximum number of interior links the traversal stack has room for
    pub max_depth: usize,
}

/// error types during creation of the grid or at the start of a trace
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("grid resolution must be at least 2, got {0}")]
    InvalidResolution(u32),
    #[error("root cell width must be positive and finite, got {0}")]
    InvalidCellWidth(f32),
    #[error("root origin must be finite")]
    InvalidOrigin,
    #[error("maximum depth must be at least 1")]
    InvalidMaxDepth,
    #[error("grid has no nodes")]
    EmptyGrid,
    #[error("node {node} has resolution {found}, grid resolution is {expected}")]
    ResolutionMismatch { node: u32, expected: u32, found: u32 },
    #[error("node {node} links to non-existent node {child}")]
    DanglingLink { node: u32, child: u32 },
    #[error("node {node} links back to the root node")]
    RootLink { node: u32 },
    #[error("interior links form a cycle through node {node}")]
    CyclicLink { node: u32 },
    #[error("grid nesting depth {depth} exceeds traversal stack capacity {capacity}")]
    DepthExceeded { depth: usize, capacity: usize },
    #[error("cell ({i}, {j}, {k}) is out of bounds for resolution {res}")]
    CellOutOfBounds { i: u32, j: u32, k: u32, res: u32 },
    #[error("node {0} does not exist")]
    NodeOutOfBounds(u32),
    #[error("ray direction must be finite and non-zero, ray origin must be finite")]
    DegenerateRay,
}

/// An occupied leaf cell crossed by a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellHit {
    /// Index of the node containing the cell
    pub node: u32,
    /// Index of the cell inside the node
    pub cell: V3c<u32>,
    /// Depth of the node, the root is at level 0
    pub level: u32,
    /// Ray parameter where the ray enters the cell
    pub t_enter: f32,
    /// Ray parameter where the ray leaves the cell
    pub t_exit: f32,
    /// Minimum corner of the cell
    pub cell_min: V3c<f32>,
    /// Edge length of the cell
    pub cell_width: f32,
}

impl CellHit {
    pub fn bounds(&self) -> Cube {
        Cube::new(self.cell_min, self.cell_width)
    }
}

/// Mutable stage of a grid: nodes can be added and classified, but not traced
#[derive(Debug, Clone)]
pub struct GridBuilder {
    pub(crate) config: GridConfig,
    pub(crate) nodes: Vec<GridNode>,
}

/// Immutable multi-level uniform grid. Node 0 is the root
/// Safe to trace from many threads at once, every trace owns its stack
#[derive(Debug, Clone)]
pub struct Grid {
    pub(crate) config: GridConfig,
    pub(crate) nodes: Vec<GridNode>,
    /// Deepest level reachable through interior links; 0 for a single node grid
    pub(crate) max_depth: usize,
    /// Cell width at each level
    pub(crate) cell_widths: Vec<f32>,
    /// 1 / cell width at each level
    pub(crate) recip_cell_widths: Vec<f32>,
}
