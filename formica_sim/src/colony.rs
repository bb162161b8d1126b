// Colony: roster, food ledger, queen and brood pipeline.
//
// A `Colony` owns its adult ants (queen included, always spawned first as
// `AntId(0)`), a capped food ledger, and three FIFO brood queues. Ids are
// assigned sequentially per colony and never reused, so an `AntId` is only
// meaningful together with its `ColonyId`.
//
// ## Update order (`Colony::update`)
//
// 1. Every ant ticks in roster order against the opposing colony's roster.
// 2. Dead ants (own roster) are pruned. Enemies this colony killed are
//    pruned in their own colony's next update; until then they sit in the
//    enemy roster flagged dead and are ignored by every lookup.
// 3. Brood advances: pupae, then larvae, then eggs, so an item moves at most
//    one stage per tick. A stage completes when its age reaches the caste's
//    threshold in `BroodTicks`. A pupa that would hatch into a full roster
//    waits in the queue.
// 4. Egg-laying: while the queen lives, a timer counts up; once it reaches
//    `lay_interval_ticks`, food is at least `lay_food_threshold`, and
//    `roster + brood < roster_cap`, one egg is queued (soldier with
//    `soldier_chance`, worker otherwise), `egg_cost` is debited and the timer
//    resets. Laying after the brood pass means a fresh egg ends its first
//    tick at age 0.
//
// Counting brood against the cap keeps hatching from overshooting it.
//
// See also: `ant.rs` for the per-ant state machine, `sim.rs` which calls
// `update()` for A then B each tick, `config.rs` for `ColonyParams`.
//
// **Critical constraint: determinism.** Spawn offsets and caste rolls draw
// from the sim `GameRng` in the fixed order above.

use crate::ant::{Ant, TickContext};
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::event::{EventLog, SimEventKind};
use crate::food::FoodWorld;
use crate::prng::GameRng;
use crate::types::{AntId, Caste, ColonyId, Control, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;
use tracing::debug;

// ---------------------------------------------------------------------------
// Food ledger
// ---------------------------------------------------------------------------

/// A colony's stored food. Never negative, never above `cap`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodStore {
    amount: f32,
    cap: f32,
}

impl FoodStore {
    pub fn new(initial: f32, cap: f32) -> Self {
        let cap = cap.max(0.0);
        Self {
            amount: initial.clamp(0.0, cap),
            cap,
        }
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn cap(&self) -> f32 {
        self.cap
    }

    /// Add food, saturating at the cap. Non-positive or non-finite amounts
    /// are ignored.
    pub fn credit(&mut self, amount: f32) {
        if amount > 0.0 && amount.is_finite() {
            self.amount = (self.amount + amount).min(self.cap);
        }
    }

    /// Remove `amount` if that much is stored. Returns `false` and leaves
    /// the ledger untouched otherwise.
    pub fn debit(&mut self, amount: f32) -> bool {
        if !(amount >= 0.0) || amount > self.amount {
            return false;
        }
        self.amount -= amount;
        true
    }
}

// ---------------------------------------------------------------------------
// Brood
// ---------------------------------------------------------------------------

/// A developing ant. `age` counts ticks spent in the current stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroodItem {
    pub caste: Caste,
    pub age: u32,
}

/// Which brood queue an item sits in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BroodStage {
    Egg,
    Larva,
    Pupa,
}

// ---------------------------------------------------------------------------
// Stats projection
// ---------------------------------------------------------------------------

/// Read-only snapshot of a colony for HUDs and the headless runner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColonyStats {
    pub colony: ColonyId,
    pub food: f32,
    pub queen_alive: bool,
    /// Zero once the queen is dead.
    pub queen_health: f32,
    pub workers: usize,
    pub soldiers: usize,
    pub eggs: usize,
    pub larvae: usize,
    pub pupae: usize,
    /// Food currently carried by this colony's ants.
    pub carried_food: f32,
    /// Total kills by living members.
    pub kills: u32,
}

// ---------------------------------------------------------------------------
// Colony
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Colony {
    pub id: ColonyId,
    pub nest: Vec2,
    food: FoodStore,
    ants: Vec<Ant>,
    queen_id: AntId,
    next_id: u32,
    eggs: VecDeque<BroodItem>,
    larvae: VecDeque<BroodItem>,
    pupae: VecDeque<BroodItem>,
    lay_timer: u32,
}

impl Colony {
    /// Found a colony at its configured nest: a queen on the nest center plus
    /// the initial workers and soldiers scattered within `spawn_radius`.
    pub fn new(id: ColonyId, config: &GameConfig, rng: &mut GameRng) -> Result<Self, ConfigError> {
        for caste in Caste::ALL {
            config
                .caste(caste)
                .ok_or(ConfigError::MissingCaste(caste))?;
        }
        let params = &config.colony;
        let nest = config.world.nests[id.index()];

        let mut colony = Self {
            id,
            nest,
            food: FoodStore::new(params.initial_food, params.food_cap),
            ants: Vec::new(),
            queen_id: AntId(0),
            next_id: 0,
            eggs: VecDeque::new(),
            larvae: VecDeque::new(),
            pupae: VecDeque::new(),
            lay_timer: 0,
        };

        let queen_angle = rng.angle();
        colony.queen_id = colony
            .push_ant(Caste::Queen, nest, queen_angle, config)
            .ok_or(ConfigError::MissingCaste(Caste::Queen))?;

        let initial = std::iter::repeat_n(Caste::Worker, params.initial_workers as usize)
            .chain(std::iter::repeat_n(Caste::Soldier, params.initial_soldiers as usize));
        for caste in initial {
            if colony.ants.len() >= params.roster_cap {
                break;
            }
            let pos = spawn_point(nest, config, rng);
            let angle = rng.angle();
            colony.push_ant(caste, pos, angle, config);
        }

        debug!(colony = %id, ants = colony.ants.len(), "colony founded");
        Ok(colony)
    }

    // -----------------------------------------------------------------------
    // Per-tick update
    // -----------------------------------------------------------------------

    /// Run one colony phase against `enemy`. See the module header for the
    /// ordering.
    pub fn update(
        &mut self,
        enemy: &mut Colony,
        world: &mut FoodWorld,
        config: &GameConfig,
        rng: &mut GameRng,
        events: &mut EventLog,
    ) {
        {
            let mut ctx = TickContext {
                world,
                enemies: &mut enemy.ants,
                nest: self.nest,
                food: &mut self.food,
                config,
                rng: &mut *rng,
                events: &mut *events,
            };
            for ant in &mut self.ants {
                ant.tick(&mut ctx);
            }
        }

        self.prune_dead();
        self.advance_brood(config, rng, events);
        self.try_lay_egg(config, rng, events);
    }

    fn prune_dead(&mut self) {
        let dead: SmallVec<[(AntId, Caste); 8]> = self
            .ants
            .iter()
            .filter(|a| a.is_dead())
            .map(|a| (a.id, a.caste))
            .collect();
        if dead.is_empty() {
            return;
        }
        for (ant, caste) in &dead {
            debug!(colony = %self.id, %ant, ?caste, "removing dead ant");
        }
        self.ants.retain(Ant::is_alive);
    }

    fn advance_brood(&mut self, config: &GameConfig, rng: &mut GameRng, events: &mut EventLog) {
        // Pupae hatch into adults, space permitting.
        let pupae = std::mem::take(&mut self.pupae);
        for mut item in pupae {
            item.age = item.age.saturating_add(1);
            let ready = config
                .caste(item.caste)
                .is_some_and(|s| item.age >= s.brood.pupa);
            let room = self.ants.len() < config.colony.roster_cap;
            let hatched = if ready && room {
                let pos = spawn_point(self.nest, config, rng);
                let angle = rng.angle();
                self.push_ant(item.caste, pos, angle, config)
            } else {
                None
            };
            if let Some(ant) = hatched {
                debug!(colony = %self.id, %ant, caste = ?item.caste, "ant hatched");
                events.push(SimEventKind::AntHatched {
                    colony: self.id,
                    ant,
                    caste: item.caste,
                });
            } else {
                self.pupae.push_back(item);
            }
        }

        let larvae = std::mem::take(&mut self.larvae);
        for mut item in larvae {
            item.age = item.age.saturating_add(1);
            let ready = config
                .caste(item.caste)
                .is_some_and(|s| item.age >= s.brood.larva);
            if ready {
                self.pupae.push_back(BroodItem {
                    caste: item.caste,
                    age: 0,
                });
            } else {
                self.larvae.push_back(item);
            }
        }

        let eggs = std::mem::take(&mut self.eggs);
        for mut item in eggs {
            item.age = item.age.saturating_add(1);
            let ready = config
                .caste(item.caste)
                .is_some_and(|s| item.age >= s.brood.egg);
            if ready {
                self.larvae.push_back(BroodItem {
                    caste: item.caste,
                    age: 0,
                });
            } else {
                self.eggs.push_back(item);
            }
        }
    }

    fn try_lay_egg(&mut self, config: &GameConfig, rng: &mut GameRng, events: &mut EventLog) {
        if !self.queen_alive() {
            return;
        }
        let params = &config.colony;
        self.lay_timer = self.lay_timer.saturating_add(1);

        if self.lay_timer < params.lay_interval_ticks
            || self.food.amount() < params.lay_food_threshold
            || self.ants.len() + self.brood_count() >= params.roster_cap
        {
            return;
        }
        if !self.food.debit(params.egg_cost) {
            return;
        }

        let caste = if rng.random_bool(params.soldier_chance) {
            Caste::Soldier
        } else {
            Caste::Worker
        };
        self.eggs.push_back(BroodItem { caste, age: 0 });
        self.lay_timer = 0;
        debug!(colony = %self.id, ?caste, food = self.food.amount(), "egg laid");
        events.push(SimEventKind::EggLaid {
            colony: self.id,
            caste,
        });
    }

    /// Append a new adult to the roster and return its id. Ignores the cap.
    /// `None` only if the caste has no stats entry.
    fn push_ant(
        &mut self,
        caste: Caste,
        position: Vec2,
        angle: f32,
        config: &GameConfig,
    ) -> Option<AntId> {
        let stats = config.caste(caste)?;
        let id = AntId(self.next_id);
        self.next_id += 1;
        self.ants
            .push(Ant::new(id, caste, self.id, position, angle, stats, &config.ants));
        Some(id)
    }

    // -----------------------------------------------------------------------
    // External mutators
    // -----------------------------------------------------------------------

    /// Add an adult directly (scenario setup, debug tools). Returns `None`
    /// when the roster is full.
    pub fn spawn(
        &mut self,
        caste: Caste,
        position: Vec2,
        angle: f32,
        config: &GameConfig,
    ) -> Option<AntId> {
        if self.ants.len() >= config.colony.roster_cap {
            return None;
        }
        self.push_ant(caste, position, angle, config)
    }

    /// Credit food to the ledger (capped).
    pub fn credit_food(&mut self, amount: f32) {
        self.food.credit(amount);
    }

    /// Debit food. `false` with no change if there isn't enough.
    pub fn debit_food(&mut self, amount: f32) -> bool {
        self.food.debit(amount)
    }

    /// Hand one living non-queen ant to an outside controller, clearing any
    /// previous tag in this colony. `false` if `id` isn't eligible.
    pub fn set_externally_driven(&mut self, id: AntId) -> bool {
        let eligible = self
            .ants
            .iter()
            .any(|a| a.id == id && a.is_alive() && a.caste != Caste::Queen);
        if !eligible {
            return false;
        }
        for ant in &mut self.ants {
            let control = if ant.id == id {
                Control::ExternallyDriven
            } else {
                Control::AiControlled
            };
            ant.set_control(control);
        }
        true
    }

    /// Return every ant to AI control.
    pub fn clear_externally_driven(&mut self) {
        for ant in &mut self.ants {
            ant.set_control(Control::AiControlled);
        }
    }

    /// The ant currently under external control, if it's still alive.
    pub fn externally_driven(&self) -> Option<AntId> {
        self.ants
            .iter()
            .find(|a| a.is_externally_driven() && a.is_alive())
            .map(|a| a.id)
    }

    // -----------------------------------------------------------------------
    // Read-only projections
    // -----------------------------------------------------------------------

    pub fn food(&self) -> f32 {
        self.food.amount()
    }

    pub fn queen_id(&self) -> AntId {
        self.queen_id
    }

    pub fn queen_alive(&self) -> bool {
        self.ant(self.queen_id).is_some_and(Ant::is_alive)
    }

    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn ant(&self, id: AntId) -> Option<&Ant> {
        self.ants.iter().find(|a| a.id == id)
    }

    pub fn ant_mut(&mut self, id: AntId) -> Option<&mut Ant> {
        self.ants.iter_mut().find(|a| a.id == id)
    }

    pub fn brood(&self, stage: BroodStage) -> &VecDeque<BroodItem> {
        match stage {
            BroodStage::Egg => &self.eggs,
            BroodStage::Larva => &self.larvae,
            BroodStage::Pupa => &self.pupae,
        }
    }

    pub fn brood_count(&self) -> usize {
        self.eggs.len() + self.larvae.len() + self.pupae.len()
    }

    pub fn lay_timer(&self) -> u32 {
        self.lay_timer
    }

    pub fn stats(&self) -> ColonyStats {
        let living = || self.ants.iter().filter(|a| a.is_alive());
        ColonyStats {
            colony: self.id,
            food: self.food.amount(),
            queen_alive: self.queen_alive(),
            queen_health: self
                .ant(self.queen_id)
                .filter(|q| q.is_alive())
                .map_or(0.0, Ant::health),
            workers: living().filter(|a| a.caste == Caste::Worker).count(),
            soldiers: living().filter(|a| a.caste == Caste::Soldier).count(),
            eggs: self.eggs.len(),
            larvae: self.larvae.len(),
            pupae: self.pupae.len(),
            carried_food: living().map(Ant::carrying).sum(),
            kills: living().map(|a| a.kills).sum(),
        }
    }
}

/// Random point within `spawn_radius` of the nest, kept inside the world.
fn spawn_point(nest: Vec2, config: &GameConfig, rng: &mut GameRng) -> Vec2 {
    let angle = rng.angle();
    let dist = rng.range_f32(0.0, config.colony.spawn_radius);
    nest.offset(angle, dist)
        .clamp_inside(config.world.width, config.world.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AntState;

    fn bare_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.colony.initial_workers = 0;
        config.colony.initial_soldiers = 0;
        config
    }

    struct Pair {
        a: Colony,
        b: Colony,
        world: FoodWorld,
        rng: GameRng,
        config: GameConfig,
        tick: u64,
        events: Vec<crate::event::SimEvent>,
    }

    impl Pair {
        fn new(config: GameConfig) -> Self {
            let mut rng = GameRng::new(5);
            let a = Colony::new(ColonyId::A, &config, &mut rng).unwrap();
            let b = Colony::new(ColonyId::B, &config, &mut rng).unwrap();
            Self {
                a,
                b,
                world: FoodWorld::empty(&config),
                rng,
                config,
                tick: 0,
                events: Vec::new(),
            }
        }

        /// Update colony A only.
        fn step_a(&mut self) {
            let mut log = EventLog::new(self.tick);
            self.a
                .update(&mut self.b, &mut self.world, &self.config, &mut self.rng, &mut log);
            self.events.extend(log.into_events());
            self.tick += 1;
        }
    }

    #[test]
    fn founding_places_queen_on_nest() {
        let config = GameConfig::default();
        let colony = Colony::new(ColonyId::B, &config, &mut GameRng::new(1)).unwrap();
        let queen = colony.ant(colony.queen_id()).unwrap();
        assert_eq!(queen.caste, Caste::Queen);
        assert_eq!(queen.position, config.world.nests[1]);
        let stats = colony.stats();
        assert_eq!(stats.workers, config.colony.initial_workers as usize);
        assert_eq!(stats.soldiers, config.colony.initial_soldiers as usize);
        assert!(stats.queen_alive);
        for ant in colony.ants() {
            assert!(ant.position.distance(colony.nest) <= config.colony.spawn_radius + 1e-4);
        }
    }

    #[test]
    fn missing_caste_is_a_config_error() {
        let mut config = GameConfig::default();
        config.castes.remove(&Caste::Soldier);
        let err = Colony::new(ColonyId::A, &config, &mut GameRng::new(1)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCaste(Caste::Soldier)));
    }

    #[test]
    fn one_egg_after_exactly_one_interval() {
        let mut config = bare_config();
        config.colony.initial_food = 100.0;
        config.colony.lay_food_threshold = 50.0;
        config.colony.lay_interval_ticks = 30;
        config.colony.egg_cost = 5.0;
        let mut pair = Pair::new(config);

        for _ in 0..29 {
            pair.step_a();
        }
        assert_eq!(pair.a.brood(BroodStage::Egg).len(), 0);
        pair.step_a();
        assert_eq!(pair.a.brood(BroodStage::Egg).len(), 1);
        assert_eq!(pair.a.food(), 95.0);
        assert_eq!(pair.a.brood(BroodStage::Egg)[0].age, 0);
        assert_eq!(pair.a.lay_timer(), 0);
        let laid = pair
            .events
            .iter()
            .filter(|e| matches!(e.kind, SimEventKind::EggLaid { .. }))
            .count();
        assert_eq!(laid, 1);
    }

    #[test]
    fn no_eggs_below_food_threshold() {
        let mut config = bare_config();
        config.colony.initial_food = 49.0;
        config.colony.lay_food_threshold = 50.0;
        config.colony.lay_interval_ticks = 5;
        let mut pair = Pair::new(config);
        for _ in 0..50 {
            pair.step_a();
        }
        assert_eq!(pair.a.brood_count(), 0);
        assert_eq!(pair.a.food(), 49.0);
    }

    #[test]
    fn brood_promotes_at_threshold_not_before() {
        let mut config = bare_config();
        config.colony.initial_food = 0.0;
        let egg_ticks = config.castes[&Caste::Worker].brood.egg;
        let mut pair = Pair::new(config);
        pair.a.eggs.push_back(BroodItem {
            caste: Caste::Worker,
            age: 0,
        });

        for _ in 0..egg_ticks - 1 {
            pair.step_a();
        }
        assert_eq!(pair.a.brood(BroodStage::Egg).len(), 1);
        assert_eq!(pair.a.brood(BroodStage::Egg)[0].age, egg_ticks - 1);
        assert!(pair.a.brood(BroodStage::Larva).is_empty());

        pair.step_a();
        assert!(pair.a.brood(BroodStage::Egg).is_empty());
        assert_eq!(pair.a.brood(BroodStage::Larva).len(), 1);
        assert_eq!(pair.a.brood(BroodStage::Larva)[0].age, 0);
    }

    #[test]
    fn pupa_hatches_into_adult_near_nest() {
        let mut config = bare_config();
        config.colony.initial_food = 0.0;
        let pupa_ticks = config.castes[&Caste::Soldier].brood.pupa;
        let mut pair = Pair::new(config);
        pair.a.pupae.push_back(BroodItem {
            caste: Caste::Soldier,
            age: pupa_ticks - 1,
        });
        pair.step_a();
        assert!(pair.a.brood(BroodStage::Pupa).is_empty());
        assert_eq!(pair.a.stats().soldiers, 1);
        let soldier = pair.a.ants().iter().find(|a| a.caste == Caste::Soldier).unwrap();
        assert_eq!(soldier.state, AntState::Guarding);
        assert!(pair.events.iter().any(|e| matches!(
            e.kind,
            SimEventKind::AntHatched { caste: Caste::Soldier, .. }
        )));
    }

    #[test]
    fn item_moves_one_stage_per_tick() {
        let mut config = bare_config();
        config.colony.initial_food = 0.0;
        for stats in config.castes.values_mut() {
            stats.brood = crate::config::BroodTicks {
                egg: 1,
                larva: 1,
                pupa: 1,
            };
        }
        let mut pair = Pair::new(config);
        pair.a.eggs.push_back(BroodItem {
            caste: Caste::Worker,
            age: 0,
        });
        pair.step_a();
        assert_eq!(pair.a.brood(BroodStage::Larva).len(), 1);
        pair.step_a();
        assert_eq!(pair.a.brood(BroodStage::Pupa).len(), 1);
        pair.step_a();
        assert_eq!(pair.a.brood_count(), 0);
        assert_eq!(pair.a.stats().workers, 1);
    }

    #[test]
    fn roster_cap_counts_brood_and_blocks_hatching() {
        let mut config = bare_config();
        config.colony.roster_cap = 3;
        config.colony.initial_workers = 2;
        config.colony.initial_food = 400.0;
        config.colony.lay_interval_ticks = 1;
        let mut pair = Pair::new(config);
        assert_eq!(pair.a.ants().len(), 3);

        for _ in 0..20 {
            pair.step_a();
        }
        assert_eq!(pair.a.brood_count(), 0, "full roster must not lay");
        assert_eq!(pair.a.food(), 400.0);

        // A pupa that can't fit waits.
        pair.a.pupae.push_back(BroodItem {
            caste: Caste::Worker,
            age: 10_000,
        });
        pair.step_a();
        assert_eq!(pair.a.brood(BroodStage::Pupa).len(), 1);
        assert!(pair.a.ants().len() <= 3);
    }

    #[test]
    fn dead_queen_stops_laying_and_dead_ants_are_pruned() {
        let mut config = bare_config();
        config.colony.initial_food = 400.0;
        config.colony.lay_interval_ticks = 1;
        config.colony.initial_workers = 1;
        let mut pair = Pair::new(config);
        let queen = pair.a.queen_id();
        pair.a.ant_mut(queen).unwrap().kill();
        assert!(!pair.a.queen_alive());
        pair.step_a();
        assert!(pair.a.ant(queen).is_none());
        assert_eq!(pair.a.ants().len(), 1);
        for _ in 0..5 {
            pair.step_a();
        }
        assert_eq!(pair.a.brood_count(), 0);
    }

    #[test]
    fn food_store_credit_caps_and_debit_refuses_overdraw() {
        let mut store = FoodStore::new(10.0, 20.0);
        store.credit(15.0);
        assert_eq!(store.amount(), 20.0);
        store.credit(-4.0);
        assert_eq!(store.amount(), 20.0);
        assert!(store.debit(5.0));
        assert_eq!(store.amount(), 15.0);
        assert!(!store.debit(16.0));
        assert_eq!(store.amount(), 15.0);
        assert_eq!(FoodStore::new(50.0, 20.0).amount(), 20.0);
    }

    #[test]
    fn external_tag_moves_between_ants() {
        let mut config = bare_config();
        config.colony.initial_workers = 2;
        let mut colony = Colony::new(ColonyId::A, &config, &mut GameRng::new(2)).unwrap();
        let ids: Vec<AntId> = colony
            .ants()
            .iter()
            .filter(|a| a.caste == Caste::Worker)
            .map(|a| a.id)
            .collect();

        assert!(!colony.set_externally_driven(colony.queen_id()));
        assert!(!colony.set_externally_driven(AntId(999)));
        assert!(colony.set_externally_driven(ids[0]));
        assert_eq!(colony.externally_driven(), Some(ids[0]));
        assert!(colony.set_externally_driven(ids[1]));
        assert_eq!(colony.externally_driven(), Some(ids[1]));
        let tagged = colony
            .ants()
            .iter()
            .filter(|a| a.is_externally_driven())
            .count();
        assert_eq!(tagged, 1);
        colony.clear_externally_driven();
        assert_eq!(colony.externally_driven(), None);
    }

    #[test]
    fn spawn_respects_roster_cap() {
        let mut config = bare_config();
        config.colony.roster_cap = 2;
        let mut colony = Colony::new(ColonyId::A, &config, &mut GameRng::new(2)).unwrap();
        let pos = colony.nest;
        assert!(colony.spawn(Caste::Worker, pos, 0.0, &config).is_some());
        assert!(colony.spawn(Caste::Worker, pos, 0.0, &config).is_none());
    }
}
