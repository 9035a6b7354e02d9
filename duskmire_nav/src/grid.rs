// Dense 2D navigation grid baked from static obstacle volumes.
//
// The grid is stored as a flat `Vec<Node>` indexed by
// `x + z * cells_x`, giving O(1) access and deterministic iteration.
// Dimensions are fixed at construction: `cells_per_axis =
// floor(extent / (2 * cell_radius))`. After the bake the only mutation
// is per-node walkability (the agents' cell-lock mechanism); positions
// and the permanent obstruction flags never change.
//
// The bake tests every candidate cell center against every obstacle
// volume (sphere-vs-box at cell radius). That is O(cells * obstacles),
// which is fine once per level load; rayon spreads it across rows.
//
// Out-of-bounds world queries clamp to the nearest edge cell rather
// than failing — a target standing just outside the playable bounds
// still resolves to a sane goal cell.
//
// See also: `obstacle.rs` for the volume test, `pathfinding.rs` for the
// search that walks this grid, `sim.rs` which owns the grid and rebuilds
// it from the obstacle list after deserialization.
//
// **Critical constraint: determinism.** Node order is row-major by
// construction, neighbor enumeration order is fixed, and the parallel
// bake writes each node exactly once — identical inputs bake identical
// grids.

use crate::config::GridParams;
use crate::obstacle::ObstacleVolume;
use crate::types::{CellCoord, NodeIndex, WorldVec3};
use log::debug;
use rayon::prelude::*;
use smallvec::SmallVec;

/// A single grid cell. Carries no search state — costs and parent links
/// live in `PathEngine` scratch, keyed by `NodeIndex`.
#[derive(Clone, Debug)]
pub struct Node {
    pub cell: CellCoord,
    /// Cell center embedded in the navigation plane (y = grid plane).
    pub world: WorldVec3,
    /// Whether the search may route through this cell right now.
    pub walkable: bool,
    /// Set once at bake time for cells overlapping static geometry.
    /// Never cleared; `walkable` can never be raised while this is set.
    pub obstructed: bool,
}

/// Moore-neighborhood offsets in fixed row-major order (self omitted).
/// The order is part of the search's determinism contract.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// The baked navigation grid.
///
/// The `Default` impl creates a zero-sized empty grid; it exists so
/// `NavState` can `#[serde(skip)]` the grid and rebuild the real one
/// from the obstacle list after deserialization.
#[derive(Default)]
pub struct NavGrid {
    /// Flat storage: index = x + z * cells_x.
    nodes: Vec<Node>,
    cells_x: u32,
    cells_z: u32,
    cell_radius: f32,
    /// World position of the minimum-x/minimum-z corner of cell (0, 0)'s
    /// footprint. Derived from the params center and extents.
    origin_x: f32,
    origin_z: f32,
    plane_y: f32,
}

impl NavGrid {
    /// Bake a grid from static obstacle volumes.
    ///
    /// Assumes a validated `GridParams` (see `NavConfig::validate`);
    /// a zero cell radius or sub-cell extent here is a caller bug.
    pub fn bake(params: &GridParams, obstacles: &[ObstacleVolume]) -> Self {
        let cell_size = params.cell_radius * 2.0;
        let cells_x = (params.extent_x / cell_size).floor() as u32;
        let cells_z = (params.extent_z / cell_size).floor() as u32;
        let origin_x = params.center.x - params.extent_x / 2.0;
        let origin_z = params.center.z - params.extent_z / 2.0;
        let plane_y = params.center.y;
        let cell_radius = params.cell_radius;

        let total = (cells_x as usize) * (cells_z as usize);
        let mut nodes = Vec::with_capacity(total);
        (0..total)
            .into_par_iter()
            .map(|i| {
                let x = (i as u32) % cells_x;
                let z = (i as u32) / cells_x;
                let world = WorldVec3::new(
                    origin_x + cell_size * x as f32 + cell_radius,
                    plane_y,
                    origin_z + cell_size * z as f32 + cell_radius,
                );
                let blocked = obstacles
                    .iter()
                    .any(|volume| volume.overlaps_sphere(world, cell_radius));
                Node {
                    cell: CellCoord::new(x as i32, z as i32),
                    world,
                    walkable: !blocked,
                    obstructed: blocked,
                }
            })
            .collect_into_vec(&mut nodes);

        let blocked = nodes.iter().filter(|n| n.obstructed).count();
        debug!(
            "baked nav grid {cells_x}x{cells_z} ({total} cells, {blocked} obstructed, {} obstacles)",
            obstacles.len()
        );

        Self {
            nodes,
            cells_x,
            cells_z,
            cell_radius,
            origin_x,
            origin_z,
            plane_y,
        }
    }

    pub fn cells_x(&self) -> u32 {
        self.cells_x
    }

    pub fn cells_z(&self) -> u32 {
        self.cells_z
    }

    pub fn cell_count(&self) -> usize {
        self.nodes.len()
    }

    /// Y of the navigation plane all node centers sit on.
    pub fn plane_y(&self) -> f32 {
        self.plane_y
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.0 as usize]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Flat index of a cell coordinate, if it is inside the grid.
    pub fn index_at(&self, cell: CellCoord) -> Option<NodeIndex> {
        if cell.x >= 0
            && cell.z >= 0
            && (cell.x as u32) < self.cells_x
            && (cell.z as u32) < self.cells_z
        {
            Some(NodeIndex(cell.x as u32 + cell.z as u32 * self.cells_x))
        } else {
            None
        }
    }

    /// Resolve a world position to the node whose center is nearest.
    ///
    /// The position is normalized onto the covered width of each axis,
    /// clamped to [0, 1] — off-grid positions silently map to the
    /// nearest edge cell — and scaled to a cell index. Feeding a node's
    /// own world position back in returns that same node.
    pub fn world_to_node(&self, pos: WorldVec3) -> NodeIndex {
        let x = self.axis_cell(pos.x - self.origin_x, self.cells_x);
        let z = self.axis_cell(pos.z - self.origin_z, self.cells_z);
        NodeIndex(x + z * self.cells_x)
    }

    fn axis_cell(&self, offset: f32, cells: u32) -> u32 {
        let covered = cells as f32 * self.cell_radius * 2.0;
        let t = (offset / covered).clamp(0.0, 1.0);
        ((t * cells as f32) as u32).min(cells - 1)
    }

    /// The up-to-8 in-bounds Moore neighbors of a node, in the fixed
    /// enumeration order of `NEIGHBOR_OFFSETS`.
    pub fn neighbors(&self, index: NodeIndex) -> SmallVec<[NodeIndex; 8]> {
        let cell = self.nodes[index.0 as usize].cell;
        let mut out = SmallVec::new();
        for (dx, dz) in NEIGHBOR_OFFSETS {
            if let Some(neighbor) = self.index_at(CellCoord::new(cell.x + dx, cell.z + dz)) {
                out.push(neighbor);
            }
        }
        out
    }

    /// Set a node's dynamic walkability. Raising `walkable` on a
    /// permanently obstructed node is silently refused — release
    /// operations can never reopen static geometry.
    pub fn set_walkable(&mut self, index: NodeIndex, walkable: bool) {
        let node = &mut self.nodes[index.0 as usize];
        node.walkable = walkable && !node.obstructed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(extent: f32, cell_radius: f32) -> GridParams {
        GridParams {
            center: WorldVec3::new(0.0, 0.0, 0.0),
            extent_x: extent,
            extent_z: extent,
            cell_radius,
        }
    }

    #[test]
    fn cell_counts_follow_floor_rule() {
        let grid = NavGrid::bake(&params(10.0, 1.0), &[]);
        assert_eq!(grid.cells_x(), 5);
        assert_eq!(grid.cells_z(), 5);
        assert_eq!(grid.cell_count(), 25);

        // Leftover extent that doesn't fit a whole cell is dropped.
        let grid = NavGrid::bake(&params(10.9, 1.0), &[]);
        assert_eq!(grid.cells_x(), 5);
    }

    #[test]
    fn node_positions_lie_inside_world_extent() {
        let p = GridParams {
            center: WorldVec3::new(7.0, 2.0, -3.0),
            extent_x: 9.0,
            extent_z: 5.0,
            cell_radius: 1.0,
        };
        let grid = NavGrid::bake(&p, &[]);
        for node in grid.nodes() {
            assert!(node.world.x >= p.center.x - p.extent_x / 2.0);
            assert!(node.world.x <= p.center.x + p.extent_x / 2.0);
            assert!(node.world.z >= p.center.z - p.extent_z / 2.0);
            assert!(node.world.z <= p.center.z + p.extent_z / 2.0);
            assert_eq!(node.world.y, 2.0);
        }
    }

    #[test]
    fn world_to_node_is_idempotent_on_node_centers() {
        // Extents chosen so floor() drops a remainder on both axes.
        let p = GridParams {
            center: WorldVec3::new(-2.0, 0.0, 5.0),
            extent_x: 11.7,
            extent_z: 8.3,
            cell_radius: 1.0,
        };
        let grid = NavGrid::bake(&p, &[]);
        for (i, node) in grid.nodes().iter().enumerate() {
            assert_eq!(grid.world_to_node(node.world), NodeIndex(i as u32));
        }
    }

    #[test]
    fn off_grid_positions_clamp_to_edge_cells() {
        let grid = NavGrid::bake(&params(10.0, 1.0), &[]);
        let far = grid.world_to_node(WorldVec3::new(1000.0, 0.0, -1000.0));
        assert_eq!(grid.node(far).cell, CellCoord::new(4, 0));
        let near = grid.world_to_node(WorldVec3::new(-1000.0, 0.0, 1000.0));
        assert_eq!(grid.node(near).cell, CellCoord::new(0, 4));
    }

    #[test]
    fn neighbor_counts_at_corner_edge_and_center() {
        let grid = NavGrid::bake(&params(10.0, 1.0), &[]);
        let corner = grid.index_at(CellCoord::new(0, 0)).unwrap();
        assert_eq!(grid.neighbors(corner).len(), 3);
        let edge = grid.index_at(CellCoord::new(2, 0)).unwrap();
        assert_eq!(grid.neighbors(edge).len(), 5);
        let center = grid.index_at(CellCoord::new(2, 2)).unwrap();
        assert_eq!(grid.neighbors(center).len(), 8);
    }

    #[test]
    fn neighbor_order_is_stable() {
        let grid = NavGrid::bake(&params(10.0, 1.0), &[]);
        let center = grid.index_at(CellCoord::new(2, 2)).unwrap();
        let cells: Vec<CellCoord> = grid
            .neighbors(center)
            .iter()
            .map(|&i| grid.node(i).cell)
            .collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(1, 1),
                CellCoord::new(2, 1),
                CellCoord::new(3, 1),
                CellCoord::new(1, 2),
                CellCoord::new(3, 2),
                CellCoord::new(1, 3),
                CellCoord::new(2, 3),
                CellCoord::new(3, 3),
            ]
        );
    }

    #[test]
    fn bake_marks_obstructed_cells() {
        // Unit-ish box over the middle of a 5x5 grid.
        let obstacle = ObstacleVolume::new(
            WorldVec3::new(0.0, 0.0, 0.0),
            WorldVec3::new(0.4, 1.0, 0.4),
        );
        let grid = NavGrid::bake(&params(10.0, 1.0), &[obstacle]);
        let center = grid.index_at(CellCoord::new(2, 2)).unwrap();
        assert!(grid.node(center).obstructed);
        assert!(!grid.node(center).walkable);
        // A corner stays clear.
        let corner = grid.index_at(CellCoord::new(0, 0)).unwrap();
        assert!(grid.node(corner).walkable);
        assert!(!grid.node(corner).obstructed);
    }

    #[test]
    fn obstructed_nodes_never_become_walkable() {
        let obstacle = ObstacleVolume::new(
            WorldVec3::new(0.0, 0.0, 0.0),
            WorldVec3::new(0.4, 1.0, 0.4),
        );
        let mut grid = NavGrid::bake(&params(10.0, 1.0), &[obstacle]);
        let center = grid.index_at(CellCoord::new(2, 2)).unwrap();

        // A release aimed at an obstructed cell is refused.
        grid.set_walkable(center, true);
        assert!(!grid.node(center).walkable);

        // Lock/release cycles on a clear cell behave normally.
        let clear = grid.index_at(CellCoord::new(1, 1)).unwrap();
        grid.set_walkable(clear, false);
        assert!(!grid.node(clear).walkable);
        grid.set_walkable(clear, true);
        assert!(grid.node(clear).walkable);
    }
}
