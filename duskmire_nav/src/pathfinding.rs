// A* search over the navigation grid.
//
// One `PathEngine` is created per grid and reused for every search: the
// open set (bounded heap) and all per-node scratch are sized to the cell
// count once and cleared by generation bump between calls, so the
// per-tick hot path never allocates.
//
// Costs are integer octile weights — orthogonal step 10, diagonal step
// 14 — for both the step cost and the heuristic, keeping the hot loop
// free of floating point and the heuristic admissible. Ties in f-cost
// rank by lower h-cost.
//
// "No path" is a result, not an error: an exhausted search leaves the
// output buffer empty and returns `SearchOutcome::Exhausted`. A goal
// standing on a blocked cell simply exhausts (blocked cells are never
// expanded), which also covers goals fully enclosed by obstacles.
//
// Note on diagonals: a diagonal step is charged 14 even when both
// orthogonally adjacent cells bracketing it are blocked — agents slip
// through diagonal gaps between solid cells. Intentionally preserved;
// the scenario tests pin this behavior down.
//
// See also: `heap.rs` for the open set, `grid.rs` for neighbor
// enumeration order (the other half of determinism), `sim.rs` for the
// per-tick controller that calls this every tick per agent.
//
// **Critical constraint: determinism.** Identical grid walkability and
// identical endpoints produce the identical path: stable neighbor order,
// f-then-h keys, and a deterministic heap leave no tie unbroken.

use crate::grid::NavGrid;
use crate::heap::BoundedMinHeap;
use crate::types::{NodeIndex, WorldVec3};
use log::trace;

/// Cost of a horizontal or vertical step between adjacent cells.
pub const ORTHOGONAL_STEP_COST: u32 = 10;
/// Cost of a diagonal step (10 * sqrt(2), rounded).
pub const DIAGONAL_STEP_COST: u32 = 14;

/// Terminal state of a search invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The goal node was reached; the output buffer holds the path from
    /// start (index 0) to goal.
    Found,
    /// The open set ran dry before reaching the goal; the output buffer
    /// is empty. Not an error — "no path this tick" is a valid answer.
    Exhausted,
}

/// Open-set ordering key. Derived `Ord` is lexicographic: lower f-cost
/// ranks first, equal f-cost falls through to lower h-cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SearchKey {
    f: u32,
    h: u32,
}

/// Sentinel parent for the start node.
const NO_PARENT: u32 = u32::MAX;

/// Reusable A* engine. Scratch is keyed by `NodeIndex` into flat arrays;
/// nodes themselves carry no search state.
///
/// The `Default` impl is a zero-capacity placeholder for the
/// skip-and-rebuild serialization cycle; `NavState` replaces it with a
/// properly sized engine when the grid is rebuilt.
pub struct PathEngine {
    open: BoundedMinHeap<SearchKey>,
    /// Best known cost from start. Valid only for nodes touched this
    /// generation (tracked implicitly: read only for open or popped nodes).
    g: Vec<u32>,
    /// Back-pointer for path reconstruction, as an arena index.
    parent: Vec<u32>,
    /// Generation stamp marking nodes finalized this search.
    closed: Vec<u32>,
    generation: u32,
}

impl Default for PathEngine {
    fn default() -> Self {
        Self {
            open: BoundedMinHeap::with_capacity(0),
            g: Vec::new(),
            parent: Vec::new(),
            closed: Vec::new(),
            generation: 0,
        }
    }
}

impl PathEngine {
    /// Create an engine sized to the given grid. The engine must only be
    /// used with grids of the same cell count.
    pub fn new(grid: &NavGrid) -> Self {
        let cells = grid.cell_count();
        Self {
            open: BoundedMinHeap::with_capacity(cells),
            g: vec![0; cells],
            parent: vec![NO_PARENT; cells],
            closed: vec![0; cells],
            generation: 0,
        }
    }

    /// Search for a path between two world positions.
    ///
    /// Both endpoints resolve through `world_to_node` (off-grid positions
    /// clamp). On `Found`, `out` holds the node sequence from start
    /// (inclusive) to goal; step count is `out.len() - 1`, so start ==
    /// goal yields a single node and zero steps. On `Exhausted`, `out`
    /// is empty.
    pub fn find_path(
        &mut self,
        grid: &NavGrid,
        start_world: WorldVec3,
        goal_world: WorldVec3,
        out: &mut Vec<NodeIndex>,
    ) -> SearchOutcome {
        debug_assert_eq!(grid.cell_count(), self.g.len(), "engine sized for a different grid");
        out.clear();

        let start = grid.world_to_node(start_world);
        let goal = grid.world_to_node(goal_world);
        let goal_cell = grid.node(goal).cell;

        self.generation += 1;
        self.open.clear();

        self.g[start.0 as usize] = 0;
        self.parent[start.0 as usize] = NO_PARENT;
        let h_start = grid.node(start).cell.octile_cost(goal_cell);
        self.open.push(start.0, SearchKey { f: h_start, h: h_start });

        let mut expanded = 0usize;
        while let Some((current, _)) = self.open.pop_min() {
            expanded += 1;
            self.closed[current as usize] = self.generation;

            if current == goal.0 {
                self.reconstruct(goal, out);
                trace!(
                    "path found: {} steps, cost {}, {expanded} nodes expanded",
                    out.len() - 1,
                    self.g[current as usize]
                );
                return SearchOutcome::Found;
            }

            let current_cell = grid.node(NodeIndex(current)).cell;
            let current_g = self.g[current as usize];

            for neighbor in grid.neighbors(NodeIndex(current)) {
                let ni = neighbor.0 as usize;
                let node = grid.node(neighbor);
                if !node.walkable || self.closed[ni] == self.generation {
                    continue;
                }

                let diagonal =
                    node.cell.x != current_cell.x && node.cell.z != current_cell.z;
                let step = if diagonal {
                    DIAGONAL_STEP_COST
                } else {
                    ORTHOGONAL_STEP_COST
                };
                let tentative = current_g + step;

                let in_open = self.open.contains(neighbor.0);
                if !in_open || tentative < self.g[ni] {
                    self.g[ni] = tentative;
                    self.parent[ni] = current;
                    let h = node.cell.octile_cost(goal_cell);
                    let key = SearchKey { f: tentative + h, h };
                    if in_open {
                        self.open.update(neighbor.0, key);
                    } else {
                        self.open.push(neighbor.0, key);
                    }
                }
            }
        }

        trace!("path exhausted after {expanded} nodes, goal {goal_cell} unreachable");
        SearchOutcome::Exhausted
    }

    /// Total step cost of the path found by the last successful search.
    /// Only meaningful immediately after `find_path` returned `Found`.
    pub fn last_path_cost(&self, goal: NodeIndex) -> u32 {
        self.g[goal.0 as usize]
    }

    /// Walk parent links from the goal back to the start, then reverse
    /// into the output buffer.
    fn reconstruct(&self, goal: NodeIndex, out: &mut Vec<NodeIndex>) {
        let mut current = goal.0;
        loop {
            out.push(NodeIndex(current));
            match self.parent[current as usize] {
                NO_PARENT => break,
                prev => current = prev,
            }
        }
        out.reverse();
    }
}
