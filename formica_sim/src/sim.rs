// Core simulation state and tick loop.
//
// `SimState` is the single source of truth for a match. It owns the food
// world (patches plus pheromone field), both colonies, the PRNG and the game
// config. The sim is a pure function of `(seed, config, external mutations)`.
//
// ## Tick ordering
//
// `step()` runs exactly one tick, in a fixed order that everything else
// depends on:
//
//   1. World update: pheromone decay, food respawn rolls (`food.rs`).
//   2. Colony A update with colony B as the enemy (`colony.rs`).
//   3. Colony B update with colony A as the enemy.
//   4. Queen check, A then B: a queen that was alive at the previous check
//      and is now dead ends the match with the opposing colony as winner.
//      If both queens fall on the same tick, A is checked first, so B wins.
//   5. `tick += 1`.
//
// Colony A acts on a world that B hasn't touched yet this tick and B reacts
// to A's moves. That asymmetry is part of the rules, not an accident.
//
// ## Run state
//
// `{running, paused} × {in progress, game over}`. `step()` is a no-op while
// paused or after game over, apart from returning any queued notifications.
// The speed level selects a multiplier from `config.speed_multipliers` that
// only the `TickAccumulator` consumes: faster means more ticks per frame,
// never different ticks.
//
// See also: `colony.rs`, `ant.rs`, `food.rs`, `clock.rs` for the real-time
// driver, `event.rs` for the narrative output.
//
// **Critical constraint: determinism.** The sim runs single-threaded (the
// pheromone decay fans out per channel but is order-independent). All
// randomness comes from `self.rng`. No `HashMap`, no system time.

use crate::clock::TickAccumulator;
use crate::colony::{Colony, ColonyStats};
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::food::FoodWorld;
use crate::prng::GameRng;
use crate::types::{AntId, CHANNEL_COUNT, ColonyId, Victory};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Match outcome from colony A's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    InProgress,
    Won,
    Lost,
}

/// The result of a single `step()` call.
#[derive(Clone, Debug, Default)]
pub struct StepResult {
    /// Narrative events emitted during this step, for the UI / event log.
    pub events: Vec<SimEvent>,
}

/// Serializable whole-match summary for HUDs and the headless runner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimStats {
    pub tick: u64,
    pub paused: bool,
    pub speed_multiplier: u32,
    pub victory: Victory,
    pub colonies: [ColonyStats; 2],
    /// Food left in all patches.
    pub world_food: f32,
    /// Sum of every cell, per pheromone channel.
    pub pheromone_totals: [f32; CHANNEL_COUNT],
}

#[derive(Clone, Debug)]
pub struct SimState {
    /// Ticks completed so far.
    pub tick: u64,
    pub config: GameConfig,
    pub world: FoodWorld,
    pub rng: GameRng,
    colonies: [Colony; 2],
    speed_level: usize,
    paused: bool,
    victory: Victory,
    queen_alive_last: [bool; 2],
    /// Notifications raised outside `step()` (pause, speed), handed out by
    /// the next `step()`.
    pending: Vec<SimEvent>,
}

impl SimState {
    /// Create a new simulation with default config and the given seed.
    pub fn new(seed: u64) -> Result<Self, ConfigError> {
        Self::with_config(seed, GameConfig::default())
    }

    /// Create a new simulation with the given seed and config. The config is
    /// validated first; the world and both colonies are generated from the
    /// seeded PRNG.
    pub fn with_config(seed: u64, config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = GameRng::new(seed);
        let world = FoodWorld::generate(&config, &mut rng);
        let colonies = [
            Colony::new(ColonyId::A, &config, &mut rng)?,
            Colony::new(ColonyId::B, &config, &mut rng)?,
        ];
        let queen_alive_last = [colonies[0].queen_alive(), colonies[1].queen_alive()];
        info!(
            seed,
            patches = world.patches().len(),
            ants_a = colonies[0].ants().len(),
            ants_b = colonies[1].ants().len(),
            "match created"
        );
        Ok(Self {
            tick: 0,
            config,
            world,
            rng,
            colonies,
            speed_level: 0,
            paused: false,
            victory: Victory::None,
            queen_alive_last,
            pending: Vec::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Tick loop
    // -----------------------------------------------------------------------

    /// Advance one tick. See the module header for the phase order.
    pub fn step(&mut self) -> StepResult {
        let mut events = std::mem::take(&mut self.pending);
        if self.paused || self.is_game_over() {
            return StepResult { events };
        }

        let mut log = EventLog::new(self.tick);
        self.world.update(&mut self.rng);

        let [a, b] = &mut self.colonies;
        a.update(b, &mut self.world, &self.config, &mut self.rng, &mut log);
        b.update(a, &mut self.world, &self.config, &mut self.rng, &mut log);

        self.check_queens(&mut log);
        self.tick += 1;

        events.extend(log.into_events());
        StepResult { events }
    }

    fn check_queens(&mut self, log: &mut EventLog) {
        for colony in ColonyId::ALL {
            let idx = colony.index();
            let alive = self.colonies[idx].queen_alive();
            if self.queen_alive_last[idx] && !alive {
                log.push(SimEventKind::QueenDied { colony });
                if self.victory == Victory::None {
                    self.victory = Victory::won_by(colony.opponent());
                    info!(tick = self.tick, winner = %colony.opponent(), "queen died, match over");
                    log.push(SimEventKind::GameOver {
                        victory: self.victory,
                    });
                }
            }
            self.queen_alive_last[idx] = alive;
        }
    }

    /// Feed one frame of real time through `acc` and run the ticks it
    /// releases at the current speed. Paused or finished matches run nothing
    /// and discard the partial tick.
    pub fn run_frame(&mut self, acc: &mut TickAccumulator, elapsed: Duration) -> Vec<SimEvent> {
        self.run_frame_until(acc, elapsed, u64::MAX)
    }

    /// `run_frame`, but never advancing past tick `stop_at`. Released ticks
    /// beyond it are discarded.
    pub fn run_frame_until(
        &mut self,
        acc: &mut TickAccumulator,
        elapsed: Duration,
        stop_at: u64,
    ) -> Vec<SimEvent> {
        if self.paused || self.is_game_over() {
            acc.reset();
            return self.step().events;
        }
        let ticks = acc.advance(elapsed, self.speed_multiplier());
        let mut events = std::mem::take(&mut self.pending);
        for _ in 0..ticks {
            if self.tick >= stop_at {
                break;
            }
            events.extend(self.step().events);
            if self.is_game_over() {
                break;
            }
        }
        events
    }

    // -----------------------------------------------------------------------
    // Run state
    // -----------------------------------------------------------------------

    pub fn is_game_over(&self) -> bool {
        self.victory != Victory::None
    }

    pub fn victory(&self) -> Victory {
        self.victory
    }

    /// WON / LOST / in progress, from colony A's side.
    pub fn player_result(&self) -> MatchResult {
        match self.victory.winner() {
            None => MatchResult::InProgress,
            Some(ColonyId::A) => MatchResult::Won,
            Some(ColonyId::B) => MatchResult::Lost,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        debug!(paused, "pause changed");
        self.notify(SimEventKind::PauseChanged { paused });
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    /// Select a speed level. `false` (and no change) for an index outside
    /// `config.speed_multipliers`.
    pub fn set_speed_level(&mut self, level: usize) -> bool {
        let Some(&multiplier) = self.config.speed_multipliers.get(level) else {
            return false;
        };
        if self.speed_level != level {
            self.speed_level = level;
            debug!(level, multiplier, "speed changed");
            self.notify(SimEventKind::SpeedChanged { multiplier });
        }
        true
    }

    pub fn speed_level(&self) -> usize {
        self.speed_level
    }

    /// Ticks per base tick duration at the current level.
    pub fn speed_multiplier(&self) -> u32 {
        self.config
            .speed_multipliers
            .get(self.speed_level)
            .copied()
            .unwrap_or(1)
    }

    fn notify(&mut self, kind: SimEventKind) {
        self.pending.push(SimEvent {
            tick: self.tick,
            kind,
        });
    }

    // -----------------------------------------------------------------------
    // Colonies and external control
    // -----------------------------------------------------------------------

    pub fn colony(&self, id: ColonyId) -> &Colony {
        &self.colonies[id.index()]
    }

    pub fn colony_mut(&mut self, id: ColonyId) -> &mut Colony {
        &mut self.colonies[id.index()]
    }

    /// Tag one ant of `colony` for external control. See
    /// `Colony::set_externally_driven`.
    pub fn set_externally_driven(&mut self, colony: ColonyId, id: AntId) -> bool {
        self.colony_mut(colony).set_externally_driven(id)
    }

    /// Steer an externally-driven ant one step along `angle`. `false` if the
    /// ant doesn't exist, is dead, isn't tagged, or `angle` isn't finite.
    pub fn drive_ant(&mut self, colony: ColonyId, id: AntId, angle: f32) -> bool {
        let Self {
            colonies,
            world,
            rng,
            config,
            ..
        } = self;
        match colonies[colony.index()].ant_mut(id) {
            Some(ant) if ant.is_alive() && ant.is_externally_driven() => {
                ant.drive(angle, world, &config.ants, rng)
            }
            _ => false,
        }
    }

    pub fn stats(&self) -> SimStats {
        let field = self.world.field();
        SimStats {
            tick: self.tick,
            paused: self.paused,
            speed_multiplier: self.speed_multiplier(),
            victory: self.victory,
            colonies: [self.colonies[0].stats(), self.colonies[1].stats()],
            world_food: self.world.total_food(),
            pheromone_totals: std::array::from_fn(|ch| field.channel_total(ch)),
        }
    }
}
