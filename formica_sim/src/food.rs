// The shared environment: food patches plus the pheromone field.
//
// `FoodWorld` owns the `PheromoneField` and the food-patch registry, and is
// the only path agents use for pheromone I/O (`deposit_pheromone` /
// `read_pheromone`). Both colonies' ants write into it during their update
// phases; the engine's fixed ordering is what keeps those writes consistent.
//
// Patches are placed once at world creation. Each placement draws random
// positions until one is at least `min_nest_distance` from both nests, up to
// `placement_attempts` tries; a patch that can't be placed is skipped with a
// warning. Patches never move. When a patch is emptied it stays in the
// registry, and every `update()` gives it a small fixed chance to regrow a
// random fraction of its original amount. That keeps the foraging loop
// alive for arbitrarily long matches without a scripted spawner.
//
// See also: `pheromone.rs` for the field itself, `ant.rs` for the sensing
// and pickup logic that calls into this module, `sim.rs` which calls
// `update()` first in every tick.
//
// **Critical constraint: determinism.** Patch placement and respawn rolls
// draw from the sim's `GameRng` in registry order.

use crate::config::{FoodParams, GameConfig};
use crate::pheromone::PheromoneField;
use crate::prng::GameRng;
use crate::types::{PheromoneChannel, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A food source. Amount never goes negative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodPatch {
    pub position: Vec2,
    pub amount: f32,
}

impl FoodPatch {
    pub fn is_depleted(&self) -> bool {
        self.amount <= 0.0
    }
}

/// Food registry plus pheromone field.
#[derive(Clone, Debug)]
pub struct FoodWorld {
    width: f32,
    height: f32,
    field: PheromoneField,
    patches: Vec<FoodPatch>,
    params: FoodParams,
}

impl FoodWorld {
    /// Generate a world from config, placing patches away from both nests.
    pub fn generate(config: &GameConfig, rng: &mut GameRng) -> Self {
        let mut world = Self::empty(config);
        let nests = config.world.nests;
        let min_dist_sq = world.params.min_nest_distance * world.params.min_nest_distance;

        for patch_idx in 0..world.params.patch_count {
            let mut placed = None;
            for _ in 0..world.params.placement_attempts {
                let candidate = Vec2::new(
                    rng.range_f32(0.0, world.width),
                    rng.range_f32(0.0, world.height),
                );
                if nests
                    .iter()
                    .all(|nest| nest.distance_squared(candidate) >= min_dist_sq)
                {
                    placed = Some(candidate);
                    break;
                }
            }
            match placed {
                Some(position) => world.patches.push(FoodPatch {
                    position,
                    amount: world.params.initial_amount,
                }),
                None => warn!(
                    patch = patch_idx,
                    attempts = world.params.placement_attempts,
                    "no position far enough from both nests; skipping food patch"
                ),
            }
        }
        debug!(patches = world.patches.len(), "food world generated");
        world
    }

    /// A world with an empty field and no patches.
    pub fn empty(config: &GameConfig) -> Self {
        Self {
            width: config.world.width,
            height: config.world.height,
            field: PheromoneField::from_config(config),
            patches: Vec::new(),
            params: config.food.clone(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Whether `pos` lies inside `[0, width) × [0, height)`.
    pub fn in_bounds(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x < self.width && pos.y < self.height
    }

    pub fn field(&self) -> &PheromoneField {
        &self.field
    }

    pub fn patches(&self) -> &[FoodPatch] {
        &self.patches
    }

    /// Register an extra patch. Negative amounts are stored as 0.
    pub fn add_patch(&mut self, position: Vec2, amount: f32) -> usize {
        self.patches.push(FoodPatch {
            position,
            amount: amount.max(0.0),
        });
        self.patches.len() - 1
    }

    pub fn deposit_pheromone(&mut self, pos: Vec2, channel: PheromoneChannel, strength: f32) {
        self.field.deposit_on(pos, channel, strength);
    }

    pub fn read_pheromone(&self, pos: Vec2, channel: PheromoneChannel) -> f32 {
        self.field.read_on(pos, channel)
    }

    /// Index of the closest patch with food left within `range` of `pos`.
    pub fn nearest_patch_with_food(&self, pos: Vec2, range: f32) -> Option<usize> {
        let range_sq = range * range;
        self.patches
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_depleted())
            .map(|(i, p)| (i, p.position.distance_squared(pos)))
            .filter(|&(_, d)| d <= range_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Remove up to `capacity` food from a patch and return what was taken.
    /// Returns 0 for unknown or depleted patches.
    pub fn take_food(&mut self, patch: usize, capacity: f32) -> f32 {
        let Some(p) = self.patches.get_mut(patch) else {
            return 0.0;
        };
        let taken = capacity.max(0.0).min(p.amount);
        p.amount = (p.amount - taken).max(0.0);
        taken
    }

    /// Per-tick environment update: decay the field, then roll respawns for
    /// depleted patches.
    pub fn update(&mut self, rng: &mut GameRng) {
        self.field.decay();

        let (lo, hi) = self.params.respawn_fraction;
        for patch in self.patches.iter_mut().filter(|p| p.is_depleted()) {
            if rng.random_bool(self.params.respawn_chance) {
                let fraction = if lo < hi { rng.range_f32(lo, hi) } else { lo };
                patch.amount = self.params.initial_amount * fraction;
                debug!(at = %patch.position, amount = patch.amount, "food patch regrew");
            }
        }
    }

    /// Total food remaining in all patches.
    pub fn total_food(&self) -> f32 {
        self.patches.iter().map(|p| p.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColonyId, PheromoneKind};

    #[test]
    fn patches_keep_their_distance_from_nests() {
        let config = GameConfig::default();
        let mut rng = GameRng::new(42);
        let world = FoodWorld::generate(&config, &mut rng);
        assert!(!world.patches().is_empty());
        for patch in world.patches() {
            assert!(world.in_bounds(patch.position));
            for nest in config.world.nests {
                assert!(nest.distance(patch.position) >= config.food.min_nest_distance);
            }
        }
    }

    #[test]
    fn impossible_placement_skips_patches() {
        let mut config = GameConfig::default();
        config.food.min_nest_distance = 10_000.0;
        config.food.placement_attempts = 5;
        let mut rng = GameRng::new(1);
        let world = FoodWorld::generate(&config, &mut rng);
        assert!(world.patches().is_empty());
    }

    #[test]
    fn generation_is_deterministic() {
        let config = GameConfig::default();
        let a = FoodWorld::generate(&config, &mut GameRng::new(9));
        let b = FoodWorld::generate(&config, &mut GameRng::new(9));
        assert_eq!(a.patches(), b.patches());
    }

    #[test]
    fn thirty_pickups_empty_a_thirty_unit_patch() {
        let config = GameConfig::default();
        let mut world = FoodWorld::empty(&config);
        let idx = world.add_patch(Vec2::new(100.0, 20.0), 30.0);
        for _ in 0..30 {
            assert_eq!(world.take_food(idx, 1.0), 1.0);
        }
        assert_eq!(world.patches()[idx].amount, 0.0);
        // Further pickups take nothing and never go negative.
        assert_eq!(world.take_food(idx, 1.0), 0.0);
        assert_eq!(world.patches()[idx].amount, 0.0);
    }

    #[test]
    fn partial_pickup_takes_only_what_is_left() {
        let config = GameConfig::default();
        let mut world = FoodWorld::empty(&config);
        let idx = world.add_patch(Vec2::new(50.0, 50.0), 0.4);
        assert!((world.take_food(idx, 1.0) - 0.4).abs() < 1e-6);
        assert!(world.patches()[idx].is_depleted());
        assert_eq!(world.take_food(99, 1.0), 0.0);
    }

    #[test]
    fn nearest_patch_ignores_depleted_and_distant() {
        let config = GameConfig::default();
        let mut world = FoodWorld::empty(&config);
        let near_empty = world.add_patch(Vec2::new(10.0, 10.0), 0.0);
        let far = world.add_patch(Vec2::new(13.0, 10.0), 5.0);
        let _out_of_range = world.add_patch(Vec2::new(40.0, 40.0), 5.0);
        let found = world.nearest_patch_with_food(Vec2::new(10.5, 10.0), 3.0);
        assert_ne!(found, Some(near_empty));
        assert_eq!(found, Some(far));
        assert_eq!(world.nearest_patch_with_food(Vec2::new(70.0, 70.0), 3.0), None);
    }

    #[test]
    fn depleted_patches_eventually_respawn() {
        let mut config = GameConfig::default();
        config.food.respawn_chance = 0.5;
        let mut world = FoodWorld::empty(&config);
        let idx = world.add_patch(Vec2::new(100.0, 100.0), 0.0);
        let mut rng = GameRng::new(3);
        for _ in 0..64 {
            world.update(&mut rng);
            if !world.patches()[idx].is_depleted() {
                break;
            }
        }
        let amount = world.patches()[idx].amount;
        let (lo, hi) = config.food.respawn_fraction;
        assert!(amount >= config.food.initial_amount * lo);
        assert!(amount < config.food.initial_amount * hi + 1e-4);
    }

    #[test]
    fn stocked_patches_never_respawn() {
        let mut config = GameConfig::default();
        config.food.respawn_chance = 1.0;
        let mut world = FoodWorld::empty(&config);
        let idx = world.add_patch(Vec2::new(100.0, 100.0), 2.0);
        let mut rng = GameRng::new(3);
        world.update(&mut rng);
        assert_eq!(world.patches()[idx].amount, 2.0);
    }

    #[test]
    fn update_decays_pheromones() {
        let config = GameConfig::default();
        let mut world = FoodWorld::empty(&config);
        let channel = PheromoneChannel::new(ColonyId::A, PheromoneKind::Trail);
        let pos = Vec2::new(5.0, 5.0);
        world.deposit_pheromone(pos, channel, 100.0);
        world.update(&mut GameRng::new(0));
        assert!(world.read_pheromone(pos, channel) < 100.0);
    }
}
