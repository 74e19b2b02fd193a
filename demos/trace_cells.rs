use log::info;
use mlgrid_rs::grid::{CellHit, CellState, GridBuilder, GridConfig, Ray, V3c};

fn main() {
    // Set RUST_LOG=trace to follow the traversal level by level
    env_logger::init();

    // The root volume is the cube between (0, 0, 0) and (1, 1, 1), split into 4 cells on each axis
    let config = GridConfig::from_bounds(V3c::unit(0.), 1., 4);
    let mut builder = GridBuilder::new(config).ok().unwrap();

    // Cells can be refined by linking them to a new node of the same resolution
    let refined = builder.add_node();
    builder
        .set_cell_state(0, 1, 0, 0, CellState::Interior(refined))
        .ok()
        .unwrap();

    // Leaves are either empty or occupied; only occupied cells are reported by a trace
    builder
        .node_mut(GridBuilder::ROOT_NODE_KEY)
        .ok()
        .unwrap()
        .set_cell_state(3, 0, 0, CellState::Occupied)
        .ok()
        .unwrap();
    for i in 0..4 {
        builder
            .set_cell_state(refined, i, 2, 0, CellState::Occupied)
            .ok()
            .unwrap();
    }

    // Validation happens once, the built grid can be traced from any number of threads
    let grid = builder.build().ok().unwrap();
    info!(
        "Grid of {} nodes, {} levels deep",
        grid.node_count(),
        grid.max_depth()
    );

    let ray = Ray::new(V3c::new(-1., 9. / 64., 0.01), V3c::new(1., 0., 0.));
    for hit in grid.trace(&ray).ok().unwrap() {
        println!(
            "node {} cell ({}, {}, {}) at level {}: t in [{}, {}]",
            hit.node, hit.cell.x, hit.cell.y, hit.cell.z, hit.level, hit.t_enter, hit.t_exit
        );
    }

    // A visitor may shorten the ray, e.g. after hitting an object inside the cell
    let mut first_hit = None;
    let mut stop_at_first = |hit: &CellHit, max_distance: &mut f32| {
        first_hit = Some(*hit);
        *max_distance = hit.t_exit;
    };
    grid.trace_with(&ray, f32::INFINITY, &mut stop_at_first)
        .ok()
        .unwrap();
    println!("first occupied cell: {first_hit:?}");
}
