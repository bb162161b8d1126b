// formica_sim: pure Rust two-colony ant war simulation.
//
// This crate holds all simulation logic: the pheromone field, the food
// world, the per-ant state machine, colony reproduction, and the fixed-tick
// engine that pits two colonies against each other. It has no rendering or
// input dependencies and runs headless.
//
// Module overview:
// - `sim.rs`:       Top-level SimState, tick ordering, pause/speed, win check.
// - `clock.rs`:     TickAccumulator, fixed-timestep driver for real-time loops.
// - `colony.rs`:    Colony roster, food ledger, queen egg-laying, brood pipeline.
// - `ant.rs`:       Ant agent and its behavior state machine (sense, steer, fight).
// - `food.rs`:      FoodWorld, food patches plus pheromone passthroughs.
// - `pheromone.rs`: PheromoneField, capped multi-channel grids with decay.
// - `event.rs`:     Narrative SimEvents emitted each tick.
// - `config.rs`:    GameConfig, every tunable, JSON-loadable and validated.
// - `error.rs`:     ConfigError.
// - `types.rs`:     Vec2, ids, Caste, AntState, Control, PheromoneChannel.
// - `prng`:         Re-exported from `formica_prng`, xoshiro256++ PRNG.
//
// Tunnels, rendering, camera and the hero agent's input mapping live outside
// this crate. They drive it through `SimState::step()` and the ordinary
// public mutators on `Ant`, `Colony` and `FoodWorld`.
//
// **Critical constraint: determinism.** A match is a pure function of
// `(seed, config, external mutations)`. All randomness comes from the seeded
// `GameRng`. No `HashMap`, no system time, no OS entropy inside the sim.

pub mod ant;
pub mod clock;
pub mod colony;
pub mod config;
pub mod error;
pub mod event;
pub mod food;
pub mod pheromone;
pub use formica_prng as prng;
pub mod sim;
pub mod types;
