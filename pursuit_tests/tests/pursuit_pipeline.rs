// End-to-end scenarios for the pursuit navigation pipeline.
//
// Each test bakes a grid from an ASCII sketch, then exercises the full
// path: obstacle bake -> search -> controller -> locks -> steering.
// Search results are checked against `brute_force_cost`, an exhaustive
// reference over the same walkability, so optimality claims are
// verified rather than assumed.

use duskmire_nav::command::{NavAction, NavCommand};
use duskmire_nav::event::NavEventKind;
use duskmire_nav::pathfinding::{PathEngine, SearchOutcome};
use duskmire_nav::sim::NavState;
use duskmire_nav::types::{AgentId, AgentKind, AgentState, CellCoord, NodeIndex, WorldVec3};
use pursuit_tests::{brute_force_cost, ScenarioMap};

fn spawn_at(tick: u64, map: &ScenarioMap, x: i32, z: i32) -> NavCommand {
    NavCommand {
        tick,
        action: NavAction::SpawnAgent {
            kind: AgentKind::Shade,
            position: map.cell_center(x, z),
            heading: 0.0,
        },
    }
}

// ---------------------------------------------------------------------------
// Search-level scenarios
// ---------------------------------------------------------------------------

#[test]
fn five_by_five_center_obstacle_detours_at_minimal_cost() {
    let map = ScenarioMap::parse(&[
        ".....", //
        ".....", //
        "..#..", //
        ".....", //
        ".....", //
    ]);
    let grid = map.grid();
    let mut engine = PathEngine::new(&grid);
    let mut path = Vec::new();

    let outcome = engine.find_path(&grid, map.cell_center(0, 0), map.cell_center(4, 4), &mut path);
    assert_eq!(outcome, SearchOutcome::Found);

    let cells: Vec<CellCoord> = path.iter().map(|&i| grid.node(i).cell).collect();
    assert!(!cells.contains(&CellCoord::new(2, 2)));

    // The pillar footprint blocks only (2, 2), so the pure-diagonal
    // 4-step / cost-56 run is impossible; the next-best route swaps one
    // diagonal for a two-move dodge: 5 steps, cost 62.
    assert_eq!(path.len(), 6);
    let goal = grid.index_at(CellCoord::new(4, 4)).unwrap();
    assert_eq!(engine.last_path_cost(goal), 62);
    assert_eq!(brute_force_cost(&grid, path[0], goal), Some(62));
}

#[test]
fn search_cost_matches_brute_force_on_small_maps() {
    let maps = [
        ScenarioMap::parse(&[
            "......", //
            "......", //
            "..##..", //
            "..#...", //
            "......", //
            "......", //
        ]),
        ScenarioMap::parse(&[
            "#.....", //
            ".#....", //
            "..#...", //
            "...#..", //
            "....#.", //
            "......", //
        ]),
        ScenarioMap::parse(&[
            "......", //
            ".####.", //
            ".#..#.", //
            ".#.##.", //
            ".#....", //
            "......", //
        ]),
    ];

    for map in &maps {
        let grid = map.grid();
        let mut engine = PathEngine::new(&grid);
        let mut path = Vec::new();

        let walkable: Vec<NodeIndex> = (0..grid.cell_count() as u32)
            .map(NodeIndex)
            .filter(|&i| grid.node(i).walkable)
            .collect();

        for &start in &walkable {
            for &goal in &walkable {
                let outcome = engine.find_path(
                    &grid,
                    grid.node(start).world,
                    grid.node(goal).world,
                    &mut path,
                );
                let reference = brute_force_cost(&grid, start, goal);
                match outcome {
                    SearchOutcome::Found => {
                        assert_eq!(
                            Some(engine.last_path_cost(goal)),
                            reference,
                            "suboptimal path {start} -> {goal}"
                        );
                        // Consecutive waypoints are always Moore neighbors.
                        for pair in path.windows(2) {
                            let a = grid.node(pair[0]).cell;
                            let b = grid.node(pair[1]).cell;
                            assert!(
                                (a.x - b.x).abs() <= 1 && (a.z - b.z).abs() <= 1 && a != b,
                                "non-adjacent step {a} -> {b}"
                            );
                        }
                    }
                    SearchOutcome::Exhausted => {
                        assert_eq!(reference, None, "engine missed a route {start} -> {goal}");
                    }
                }
            }
        }
    }
}

#[test]
fn diagonal_gap_between_blocked_cells_is_cut() {
    // Both cells bracketing the (0,0)->(1,1) diagonal are blocked, yet
    // the diagonal is still taken at cost 14. This mirrors the shipped
    // behavior: corner cutting through a diagonal gap is allowed, and
    // the brute-force reference uses the same rule.
    let map = ScenarioMap::parse(&[
        ".#.", //
        "#..", //
        "...", //
    ]);
    let grid = map.grid();
    let mut engine = PathEngine::new(&grid);
    let mut path = Vec::new();

    let outcome = engine.find_path(&grid, map.cell_center(0, 0), map.cell_center(2, 2), &mut path);
    assert_eq!(outcome, SearchOutcome::Found);

    let cells: Vec<CellCoord> = path.iter().map(|&i| grid.node(i).cell).collect();
    assert_eq!(
        cells,
        vec![
            CellCoord::new(0, 0),
            CellCoord::new(1, 1),
            CellCoord::new(2, 2)
        ]
    );
    let goal = grid.index_at(CellCoord::new(2, 2)).unwrap();
    assert_eq!(engine.last_path_cost(goal), 28);
    assert_eq!(brute_force_cost(&grid, path[0], goal), Some(28));
}

#[test]
fn enclosed_goal_yields_empty_path() {
    let map = ScenarioMap::parse(&[
        ".....", //
        ".###.", //
        ".#.#.", //
        ".###.", //
        ".....", //
    ]);
    let grid = map.grid();
    let mut engine = PathEngine::new(&grid);
    let mut path = Vec::new();

    let outcome = engine.find_path(&grid, map.cell_center(0, 0), map.cell_center(2, 2), &mut path);
    assert_eq!(outcome, SearchOutcome::Exhausted);
    assert!(path.is_empty());

    let goal = grid.index_at(CellCoord::new(2, 2)).unwrap();
    let start = grid.index_at(CellCoord::new(0, 0)).unwrap();
    assert_eq!(brute_force_cost(&grid, start, goal), None);
}

// ---------------------------------------------------------------------------
// Full-controller scenarios
// ---------------------------------------------------------------------------

/// Single-width corridor: every route from the rear agent crosses the
/// front agent's locked perimeter, so the rear agent is walled in for
/// the whole pursuit. Lock state is shared and tick-ordered by agent
/// id — this wall is the documented order-dependent behavior.
#[test]
fn rear_agent_in_single_corridor_is_walled_by_leaders_locks() {
    let map = ScenarioMap::parse(&[
        "############", //
        "#..........#", //
        "############", //
    ]);
    let mut sim = map.state();
    let target = map.cell_center(10, 1);

    // Leader (id 0) spawns ahead of the rear agent (id 1).
    let result = sim.step(
        target,
        &[spawn_at(0, &map, 2, 1), spawn_at(0, &map, 1, 1)],
    );
    let leader = AgentId(0);
    let rear = AgentId(1);

    // The leader's fresh perimeter seals the corridor before the rear
    // agent searches in the same tick.
    assert!(result.events.iter().any(|e| matches!(
        e.kind,
        NavEventKind::PathUnreachable { agent_id } if agent_id == rear
    )));

    let rear_start = sim.agents[&rear].position;
    for _ in 0..200 {
        sim.step(target, &[]);
    }

    assert_eq!(sim.agents[&leader].state, AgentState::Engaging);
    // The rear agent never found a tick with an open route.
    assert_eq!(sim.agents[&rear].position, rear_start);
    assert!(sim.agents[&rear].path_was_unreachable);
}

/// Four-wide corridor: the rear agent routes around the leader's
/// perimeter and both close in on the target.
#[test]
fn rear_agent_detours_around_leader_in_wide_corridor() {
    let map = ScenarioMap::parse(&[
        "############", //
        "#..........#", //
        "#..........#", //
        "#..........#", //
        "#..........#", //
        "############", //
    ]);
    let mut sim = map.state();
    let target = map.cell_center(10, 2);

    sim.step(
        target,
        &[spawn_at(0, &map, 2, 2), spawn_at(0, &map, 1, 2)],
    );
    for _ in 0..400 {
        sim.step(target, &[]);
    }

    assert_eq!(sim.agents[&AgentId(0)].state, AgentState::Engaging);
    assert_eq!(sim.agents[&AgentId(1)].state, AgentState::Engaging);
}

#[test]
fn walls_stay_obstructed_after_lock_sweeps_and_despawn() {
    let map = ScenarioMap::parse(&[
        "############", //
        "#..........#", //
        "############", //
    ]);
    let mut sim = map.state();
    let target = map.cell_center(10, 1);

    sim.step(target, &[spawn_at(0, &map, 1, 1)]);
    // The agent's perimeter sweeps along the wall cells the whole way,
    // locking and releasing them tick after tick.
    for _ in 0..200 {
        sim.step(target, &[]);
    }
    sim.step(
        target,
        &[NavCommand {
            tick: sim.tick(),
            action: NavAction::DespawnAgent {
                agent_id: AgentId(0),
            },
        }],
    );

    for node in sim.grid().nodes() {
        if node.obstructed {
            assert!(!node.walkable, "release reopened wall cell {}", node.cell);
        }
    }
}

#[test]
fn pursuit_scenario_is_deterministic_across_runs() {
    let run = || {
        let map = ScenarioMap::parse(&[
            "############", //
            "#..........#", //
            "#..........#", //
            "#..........#", //
            "#..........#", //
            "############", //
        ]);
        let mut sim = map.state();
        let target_of = |tick: u32| {
            // The target strafes up and down the far end of the room.
            let z = 1.5 + (tick / 40 % 4) as f32;
            WorldVec3::new(10.5, 0.0, z)
        };
        sim.step(
            target_of(0),
            &[spawn_at(0, &map, 2, 2), spawn_at(0, &map, 1, 3)],
        );
        for tick in 1..300u32 {
            sim.step(target_of(tick), &[]);
        }
        sim.to_json().unwrap()
    };

    assert_eq!(run(), run());
}

#[test]
fn snapshot_mid_pursuit_continues_identically() {
    let map = ScenarioMap::parse(&[
        "############", //
        "#..........#", //
        "#..........#", //
        "#..........#", //
        "#..........#", //
        "############", //
    ]);
    let mut sim = map.state();
    let target = map.cell_center(10, 3);
    sim.step(
        target,
        &[spawn_at(0, &map, 2, 2), spawn_at(0, &map, 1, 2)],
    );
    for _ in 0..60 {
        sim.step(target, &[]);
    }

    let mut restored = NavState::from_json(&sim.to_json().unwrap()).unwrap();
    for _ in 0..60 {
        sim.step(target, &[]);
        restored.step(target, &[]);
    }

    let a: serde_json::Value = serde_json::from_str(&sim.to_json().unwrap()).unwrap();
    let b: serde_json::Value = serde_json::from_str(&restored.to_json().unwrap()).unwrap();
    assert_eq!(a, b);
}
