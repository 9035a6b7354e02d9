// duskmire_nav — pure Rust pursuit-navigation library.
//
// This crate contains the navigation core for Duskmire: the baked grid,
// the A* search, and the per-tick pursuit controller that steers agents
// toward a moving target. It has zero engine dependencies and can be
// tested, benchmarked, and run headless; rendering, audio, animation,
// and encounter scripting live on the other side of the command/event
// boundary.
//
// Module overview:
// - `sim.rs`:         Top-level NavState, tick loop, command/event processing,
//                     cell-lock bookkeeping, snapshot save/load.
// - `grid.rs`:        Dense 2D node grid baked from obstacle volumes;
//                     world<->cell mapping and neighbor enumeration.
// - `pathfinding.rs`: Reusable A* engine with integer octile costs.
// - `heap.rs`:        Bounded indexed binary min-heap (the open set).
// - `agent.rs`:       Agent state + heading/steering math.
// - `obstacle.rs`:    Axis-aligned obstacle volumes and the bake-time
//                     sphere-vs-box test.
// - `command.rs`:     NavCommand / NavAction — all external mutations.
// - `event.rs`:       NavEvent — narrative output per tick.
// - `config.rs`:      NavConfig + per-kind AgentProfile table — all
//                     tunable parameters.
// - `types.rs`:       WorldVec3, CellCoord, NodeIndex, agent ids/states.
//
// The game layer feeds `NavState::step` the target's position once per
// tick and consumes the returned events plus the agents' transforms.
// Per-agent paths are transient scratch: each tick's search overwrites
// the last, and only the cell-lock bookkeeping persists between ticks.
//
// **Critical constraint: determinism.** The simulation is a pure
// function: `(state, target, commands) -> (new_state, events)`. No
// `HashMap`, no system time, no OS entropy; `BTreeMap` for ordered
// collections, fixed agent processing order, integer costs in the
// search. Rayon is used only inside the one-shot grid bake, where every
// cell is computed independently.

pub mod agent;
pub mod command;
pub mod config;
pub mod event;
pub mod grid;
pub mod heap;
pub mod obstacle;
pub mod pathfinding;
pub mod sim;
pub mod types;
