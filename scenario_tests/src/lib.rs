// Test-only match harness for whole-simulation scenario tests.
//
// Wraps a real `SimState` and adds the setup and bookkeeping the scenarios
// share: a bare config (no starting ants, no random patches, no respawns) so
// each test places exactly the ants and food it needs, an event journal
// accumulated across steps, and invariant checks run after every tick.
//
// Everything goes through the same public API a frontend uses. The only
// test-specific code is the setup shortcuts and the assertions.
//
// See also: `tests/` for the scenarios.

use formica_sim::config::GameConfig;
use formica_sim::event::{SimEvent, SimEventKind};
use formica_sim::sim::SimState;
use formica_sim::types::{AntId, Caste, ColonyId, PheromoneChannel, PheromoneKind, Vec2};

/// A config with empty colonies (queens only), no generated food, no
/// respawns and no egg-laying. Scenarios opt back into what they need.
pub fn bare_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.colony.initial_workers = 0;
    config.colony.initial_soldiers = 0;
    config.colony.initial_food = 0.0;
    config.colony.lay_food_threshold = 1.0e9;
    config.food.patch_count = 0;
    config.food.respawn_chance = 0.0;
    config
}

pub struct Scenario {
    pub sim: SimState,
    /// Every event returned by `step()` so far.
    pub journal: Vec<SimEvent>,
}

impl Scenario {
    pub fn new(seed: u64, config: GameConfig) -> Self {
        let sim = SimState::with_config(seed, config).expect("scenario config must be valid");
        Self {
            sim,
            journal: Vec::new(),
        }
    }

    pub fn bare(seed: u64) -> Self {
        Self::new(seed, bare_config())
    }

    /// Place an adult of `caste` for `colony` at `pos`, facing +x.
    pub fn spawn(&mut self, colony: ColonyId, caste: Caste, pos: Vec2) -> AntId {
        let config = self.sim.config.clone();
        self.sim
            .colony_mut(colony)
            .spawn(caste, pos, 0.0, &config)
            .expect("roster has room")
    }

    /// One tick, journaling events and checking invariants.
    pub fn step(&mut self) -> Vec<SimEvent> {
        let events = self.sim.step().events;
        self.journal.extend(events.iter().cloned());
        assert_invariants(&self.sim);
        events
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Step until `done` holds or `max_ticks` pass. Returns whether `done`
    /// was reached.
    pub fn run_until(&mut self, max_ticks: u64, mut done: impl FnMut(&SimState) -> bool) -> bool {
        for _ in 0..max_ticks {
            if done(&self.sim) {
                return true;
            }
            self.step();
        }
        done(&self.sim)
    }

    /// Number of journaled events matching `pred`.
    pub fn count(&self, pred: impl Fn(&SimEventKind) -> bool) -> usize {
        self.journal.iter().filter(|e| pred(&e.kind)).count()
    }

    /// Whole-state fingerprint for determinism comparisons.
    pub fn fingerprint(&self) -> String {
        let ants: Vec<_> = ColonyId::ALL
            .iter()
            .map(|&c| self.sim.colony(c).ants().to_vec())
            .collect();
        serde_json::to_string(&(self.sim.stats(), ants, self.sim.world.patches()))
            .expect("state serializes")
    }
}

/// Properties that must hold after every tick of every match.
pub fn assert_invariants(sim: &SimState) {
    let config = &sim.config;
    let (w, h) = (config.world.width, config.world.height);

    for colony in ColonyId::ALL {
        let c = sim.colony(colony);
        assert!(c.food() >= 0.0 && c.food() <= config.colony.food_cap);
        assert!(
            c.ants().len() <= config.colony.roster_cap,
            "{colony} roster over cap"
        );
        for ant in c.ants() {
            let p = ant.position;
            assert!(
                p.x > 0.0 && p.x < w && p.y > 0.0 && p.y < h,
                "{} of {colony} escaped the world at {p}",
                ant.id
            );
            assert!(ant.health() >= 0.0);
            assert!(ant.carrying() >= 0.0);
        }
    }

    for patch in sim.world.patches() {
        assert!(patch.amount >= 0.0);
    }

    let field = sim.world.field();
    for colony in ColonyId::ALL {
        for kind in PheromoneKind::ALL {
            let channel = PheromoneChannel::new(colony, kind).index();
            if let Some(cells) = field.channel_cells(channel) {
                assert!(cells.iter().all(|v| *v >= 0.0 && *v <= field.cap()));
            }
        }
    }
}
