// Scenario helpers for the end-to-end pursuit tests.
//
// `ScenarioMap::parse` turns an ASCII sketch into grid parameters plus
// obstacle volumes: '.' is open floor, '#' is a pillar sized to
// obstruct exactly one cell. Row k of the sketch is grid row z = k,
// column i is x = i; each cell is one world unit across.
//
// `brute_force_cost` is an intentionally naive exhaustive relaxation
// over the baked grid's walkability — the reference that the A*
// engine's results are compared against on small maps. It uses the
// same neighbor rule as the engine (diagonal corner cutting allowed),
// so costs are directly comparable.

use duskmire_nav::config::{GridParams, NavConfig};
use duskmire_nav::grid::NavGrid;
use duskmire_nav::obstacle::ObstacleVolume;
use duskmire_nav::sim::NavState;
use duskmire_nav::types::{NodeIndex, WorldVec3};

/// An ASCII-sketched test level.
pub struct ScenarioMap {
    pub width: u32,
    pub height: u32,
    pub obstacles: Vec<ObstacleVolume>,
}

impl ScenarioMap {
    pub fn parse(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let mut obstacles = Vec::new();
        for (z, row) in rows.iter().enumerate() {
            assert_eq!(row.len() as u32, width, "ragged scenario map");
            for (x, ch) in row.chars().enumerate() {
                match ch {
                    '#' => obstacles.push(ObstacleVolume::new(
                        WorldVec3::new(x as f32 + 0.5, 0.0, z as f32 + 0.5),
                        WorldVec3::new(0.3, 1.0, 0.3),
                    )),
                    '.' => {}
                    other => panic!("unknown map glyph {other:?}"),
                }
            }
        }
        Self {
            width,
            height,
            obstacles,
        }
    }

    pub fn grid_params(&self) -> GridParams {
        GridParams {
            center: WorldVec3::new(self.width as f32 / 2.0, 0.0, self.height as f32 / 2.0),
            extent_x: self.width as f32,
            extent_z: self.height as f32,
            cell_radius: 0.5,
        }
    }

    /// Bake a standalone grid for engine-level tests.
    pub fn grid(&self) -> NavGrid {
        NavGrid::bake(&self.grid_params(), &self.obstacles)
    }

    /// Build a full `NavState` over this map with the default profiles.
    pub fn state(&self) -> NavState {
        let mut config = NavConfig::default();
        config.grid = self.grid_params();
        config.validate().expect("scenario config invalid");
        NavState::new(config, self.obstacles.clone())
    }

    /// World-space center of cell (x, z).
    pub fn cell_center(&self, x: i32, z: i32) -> WorldVec3 {
        WorldVec3::new(x as f32 + 0.5, 0.0, z as f32 + 0.5)
    }
}

/// Cheapest walkable route cost between two nodes, by exhaustive
/// relaxation until fixpoint. `None` if the goal is unreachable.
pub fn brute_force_cost(grid: &NavGrid, start: NodeIndex, goal: NodeIndex) -> Option<u32> {
    const UNREACHED: u32 = u32::MAX;
    let mut dist = vec![UNREACHED; grid.cell_count()];
    dist[start.0 as usize] = 0;

    let mut changed = true;
    while changed {
        changed = false;
        for i in 0..grid.cell_count() {
            let here = dist[i];
            if here == UNREACHED {
                continue;
            }
            let cell = grid.node(NodeIndex(i as u32)).cell;
            for neighbor in grid.neighbors(NodeIndex(i as u32)) {
                let node = grid.node(neighbor);
                if !node.walkable {
                    continue;
                }
                let step = if node.cell.x != cell.x && node.cell.z != cell.z {
                    14
                } else {
                    10
                };
                let ni = neighbor.0 as usize;
                if here + step < dist[ni] {
                    dist[ni] = here + step;
                    changed = true;
                }
            }
        }
    }

    (dist[goal.0 as usize] != UNREACHED).then_some(dist[goal.0 as usize])
}
