// Data-driven game configuration.
//
// Every tunable number in the simulation lives in `GameConfig`: world and
// nest layout, pheromone decay profiles, food patch generation, ant sensing
// and movement, the caste stat table, colony reproduction, and the engine's
// tick timing. The sim never hard-codes balance values; it reads them from
// here.
//
// Parameters are grouped into nested structs (`WorldParams`,
// `PheromoneParams`, `FoodParams`, `AntParams`, `ColonyParams`) plus a
// `castes` table keyed by `Caste`, so each caste's health, damage, speed,
// bite cooldown and brood development times are pure data.
//
// Configs load from JSON (`from_json`, `from_json_file`). Every group is
// `#[serde(default)]`, so a file only needs the fields it overrides.
// `validate()` runs at sim construction and rejects configs that would break
// an invariant at runtime (missing castes, decay profiles that never clear,
// probabilities outside [0, 1]).
//
// See also: `sim.rs` which owns the `GameConfig`, `error.rs` for
// `ConfigError`, `types.rs` for `Caste` and `PheromoneKind`.
//
// **Critical constraint: determinism.** Config values feed directly into
// simulation logic. Same seed + same config = same match.

use crate::error::ConfigError;
use crate::types::{Caste, PheromoneKind, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Parameter groups
// ---------------------------------------------------------------------------

/// World dimensions and nest placement.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldParams {
    /// World width in world units.
    pub width: f32,
    /// World height in world units.
    pub height: f32,
    /// Side length of one pheromone cell in world units.
    pub cell_size: f32,
    /// Nest centers, indexed by `ColonyId::index()`.
    pub nests: [Vec2; 2],
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 150.0,
            cell_size: 1.0,
            nests: [Vec2::new(30.0, 75.0), Vec2::new(170.0, 75.0)],
        }
    }
}

/// Per-tick decay of one pheromone kind: `value = value * rate - drain`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecayProfile {
    /// Multiplicative retention per tick, in (0, 1].
    pub rate: f32,
    /// Constant subtracted after the multiply. Clears near-zero residue.
    pub drain: f32,
}

/// Pheromone field limits and the two decay profiles.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PheromoneParams {
    /// Maximum value any cell can hold.
    pub cap: f32,
    /// Values below this after decay snap to zero.
    pub epsilon: f32,
    /// Food trails: long-lived highways.
    pub trail: DecayProfile,
    /// Alarm signals: must fade fast so combat state doesn't linger.
    pub alarm: DecayProfile,
}

impl PheromoneParams {
    pub fn profile(&self, kind: PheromoneKind) -> DecayProfile {
        match kind {
            PheromoneKind::Trail => self.trail,
            PheromoneKind::Alarm => self.alarm,
        }
    }
}

impl Default for PheromoneParams {
    fn default() -> Self {
        Self {
            cap: 1000.0,
            epsilon: 0.01,
            trail: DecayProfile {
                rate: 0.998,
                drain: 0.001,
            },
            alarm: DecayProfile {
                rate: 0.99,
                drain: 0.05,
            },
        }
    }
}

/// Food patch generation and respawn.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodParams {
    /// Number of patches placed at world creation.
    pub patch_count: u32,
    /// Food units in a freshly placed patch.
    pub initial_amount: f32,
    /// Minimum distance between any patch and either nest.
    pub min_nest_distance: f32,
    /// Random positions tried per patch before giving up on it.
    pub placement_attempts: u32,
    /// Per-tick chance that a depleted patch regrows.
    pub respawn_chance: f64,
    /// Regrown amount as a fraction of `initial_amount`, drawn from
    /// `[min, max)`.
    pub respawn_fraction: (f32, f32),
    /// An ant this close to a patch center can pick food up.
    pub pickup_range: f32,
}

impl Default for FoodParams {
    fn default() -> Self {
        Self {
            patch_count: 12,
            initial_amount: 30.0,
            min_nest_distance: 40.0,
            placement_attempts: 64,
            respawn_chance: 0.002,
            respawn_fraction: (0.3, 1.0),
            pickup_range: 2.0,
        }
    }
}

/// Sensing, steering, combat ranges and trail laying shared by all castes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AntParams {
    /// Distance from the ant to each of its three pheromone probes.
    pub sensor_distance: f32,
    /// Angular offset (radians) of the left/right probes from the heading.
    pub sensor_angle: f32,
    /// Turn (radians) applied when steering toward the strongest probe.
    pub steer_turn: f32,
    /// Chance per tick of ignoring a sensed gradient and random-walking.
    pub wander_probability: f64,
    /// Half-width (radians) of a random-walk turn.
    pub wander_turn: f32,
    /// A living enemy closer than this triggers FIGHTING.
    pub detection_radius: f32,
    /// Maximum distance at which a bite lands.
    pub bite_range: f32,
    /// Distance from the nest center that counts as "home".
    pub nest_radius: f32,
    /// Food units an ant can carry.
    pub carry_capacity: f32,
    /// Trail pheromone laid per deposit while carrying.
    pub trail_strength: f32,
    /// Ticks between trail deposits while carrying.
    pub trail_deposit_interval_ticks: u32,
    /// Alarm pheromone laid per fighting tick.
    pub alarm_strength: f32,
    /// Random jitter (radians) added to the ~180° turn after pickup/drop-off.
    pub flip_jitter: f32,
    /// Random jitter (radians) added after a wall reflection.
    pub boundary_jitter: f32,
    /// Guards farther than this from the nest walk back.
    pub guard_radius: f32,
    /// Guard patrol speed as a fraction of caste speed.
    pub guard_speed_factor: f32,
    /// Ticks the "recently hit" visual flag stays raised after damage.
    pub recent_hit_ticks: u32,
    /// Movement speed for externally-driven ants.
    pub external_speed: f32,
    /// Natural lifespan for workers and soldiers. `None` disables aging
    /// deaths. Queens never die of age.
    pub max_age_ticks: Option<u64>,
}

impl Default for AntParams {
    fn default() -> Self {
        Self {
            sensor_distance: 4.0,
            sensor_angle: 0.5,
            steer_turn: 0.3,
            wander_probability: 0.1,
            wander_turn: 0.35,
            detection_radius: 6.0,
            bite_range: 1.2,
            nest_radius: 5.0,
            carry_capacity: 1.0,
            trail_strength: 20.0,
            trail_deposit_interval_ticks: 2,
            alarm_strength: 30.0,
            flip_jitter: 0.4,
            boundary_jitter: 0.2,
            guard_radius: 12.0,
            guard_speed_factor: 0.4,
            recent_hit_ticks: 5,
            external_speed: 1.2,
            max_age_ticks: None,
        }
    }
}

/// Ticks spent in each brood stage before moving on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroodTicks {
    pub egg: u32,
    pub larva: u32,
    pub pupa: u32,
}

/// Data-driven stats for one caste.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CasteStats {
    /// Starting and maximum health.
    pub max_health: f32,
    /// Health removed per bite.
    pub damage: f32,
    /// World units moved per tick.
    pub speed: f32,
    /// Ticks between bites.
    pub attack_cooldown_ticks: u32,
    /// Whether this caste picks up food and follows trail pheromone. Castes
    /// that don't forage follow their colony's alarm channel instead.
    pub forages: bool,
    /// Brood development times for ants destined to this caste.
    pub brood: BroodTicks,
}

/// Queen egg-laying, food ledger and starting roster.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyParams {
    pub initial_food: f32,
    /// Food ledger ceiling.
    pub food_cap: f32,
    /// Ticks the queen needs between eggs.
    pub lay_interval_ticks: u32,
    /// Minimum stored food for the queen to lay.
    pub lay_food_threshold: f32,
    /// Food debited per egg.
    pub egg_cost: f32,
    /// Maximum adults plus brood in flight.
    pub roster_cap: usize,
    /// Chance a new egg is destined to be a soldier; otherwise a worker.
    pub soldier_chance: f64,
    pub initial_workers: u32,
    pub initial_soldiers: u32,
    /// New adults appear within this distance of the nest center.
    pub spawn_radius: f32,
}

impl Default for ColonyParams {
    fn default() -> Self {
        Self {
            initial_food: 60.0,
            food_cap: 500.0,
            lay_interval_ticks: 30,
            lay_food_threshold: 50.0,
            egg_cost: 5.0,
            roster_cap: 120,
            soldier_chance: 0.2,
            initial_workers: 20,
            initial_soldiers: 5,
            spawn_radius: 3.0,
        }
    }
}

/// The default caste table: soldiers hit harder and take more punishment,
/// workers are faster and forage, the queen is a stationary damage sponge.
pub fn default_castes() -> BTreeMap<Caste, CasteStats> {
    let mut castes = BTreeMap::new();
    castes.insert(
        Caste::Worker,
        CasteStats {
            max_health: 5.0,
            damage: 1.0,
            speed: 0.8,
            attack_cooldown_ticks: 3,
            forages: true,
            brood: BroodTicks {
                egg: 40,
                larva: 60,
                pupa: 80,
            },
        },
    );
    castes.insert(
        Caste::Soldier,
        CasteStats {
            max_health: 12.0,
            damage: 3.0,
            speed: 0.7,
            attack_cooldown_ticks: 2,
            forages: false,
            brood: BroodTicks {
                egg: 60,
                larva: 80,
                pupa: 100,
            },
        },
    );
    castes.insert(
        Caste::Queen,
        CasteStats {
            max_health: 50.0,
            damage: 0.0,
            speed: 0.0,
            attack_cooldown_ticks: 0,
            forages: false,
            brood: BroodTicks {
                egg: 80,
                larva: 120,
                pupa: 160,
            },
        },
    );
    castes
}

// ---------------------------------------------------------------------------
// Top-level game config
// ---------------------------------------------------------------------------

/// Top-level game configuration. Loaded once, never mutated by the sim.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Real-world milliseconds per tick at speed multiplier 1.
    pub tick_duration_ms: u32,

    /// Maximum ticks a `TickAccumulator` releases for a single frame.
    pub max_catchup_ticks: u32,

    /// Discrete speed levels; the engine's speed index selects one.
    pub speed_multipliers: Vec<u32>,

    pub world: WorldParams,
    pub pheromones: PheromoneParams,
    pub food: FoodParams,
    pub ants: AntParams,
    pub colony: ColonyParams,

    /// Per-caste stats. Must contain every `Caste`.
    pub castes: BTreeMap<Caste, CasteStats>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_duration_ms: 50,
            max_catchup_ticks: 8,
            speed_multipliers: vec![1, 2, 4, 8],
            world: WorldParams::default(),
            pheromones: PheromoneParams::default(),
            food: FoodParams::default(),
            ants: AntParams::default(),
            colony: ColonyParams::default(),
            castes: default_castes(),
        }
    }
}

impl GameConfig {
    /// Parse a config from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Stats for a caste. `None` only for a config that failed validation.
    pub fn caste(&self, caste: Caste) -> Option<&CasteStats> {
        self.castes.get(&caste)
    }

    /// Check every invariant the sim relies on at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_duration_ms == 0 {
            return Err(ConfigError::NonPositive {
                field: "tick_duration_ms",
            });
        }
        if self.speed_multipliers.is_empty() || self.speed_multipliers.contains(&0) {
            return Err(ConfigError::InvalidSpeedTable);
        }

        let w = &self.world;
        positive("world.width", w.width)?;
        positive("world.height", w.height)?;
        positive("world.cell_size", w.cell_size)?;
        for (colony, nest) in w.nests.iter().enumerate() {
            let inside = nest.x >= 0.0 && nest.y >= 0.0 && nest.x < w.width && nest.y < w.height;
            if !inside {
                return Err(ConfigError::NestOutOfBounds {
                    colony,
                    x: nest.x,
                    y: nest.y,
                });
            }
        }

        positive("pheromones.cap", self.pheromones.cap)?;
        if !(self.pheromones.epsilon >= 0.0) {
            return Err(ConfigError::NonPositive {
                field: "pheromones.epsilon",
            });
        }
        check_profile("trail", self.pheromones.trail)?;
        check_profile("alarm", self.pheromones.alarm)?;

        probability("food.respawn_chance", self.food.respawn_chance)?;
        let (lo, hi) = self.food.respawn_fraction;
        probability("food.respawn_fraction.0", lo as f64)?;
        probability("food.respawn_fraction.1", hi as f64)?;
        positive("food.initial_amount", self.food.initial_amount)?;
        positive("food.pickup_range", self.food.pickup_range)?;

        probability("ants.wander_probability", self.ants.wander_probability)?;
        positive("ants.carry_capacity", self.ants.carry_capacity)?;
        positive("ants.nest_radius", self.ants.nest_radius)?;
        positive("ants.bite_range", self.ants.bite_range)?;
        if self.ants.trail_deposit_interval_ticks == 0 {
            return Err(ConfigError::NonPositive {
                field: "ants.trail_deposit_interval_ticks",
            });
        }

        probability("colony.soldier_chance", self.colony.soldier_chance)?;
        positive("colony.food_cap", self.colony.food_cap)?;
        if self.colony.roster_cap == 0 {
            return Err(ConfigError::NonPositive {
                field: "colony.roster_cap",
            });
        }

        for caste in Caste::ALL {
            let stats = self.caste(caste).ok_or(ConfigError::MissingCaste(caste))?;
            if !(stats.max_health > 0.0) {
                return Err(ConfigError::InvalidCaste {
                    caste,
                    reason: "max_health must be positive",
                });
            }
            if !(stats.damage >= 0.0) || !(stats.speed >= 0.0) {
                return Err(ConfigError::InvalidCaste {
                    caste,
                    reason: "damage and speed must be non-negative",
                });
            }
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field })
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { field, value })
    }
}

fn check_profile(channel: &'static str, profile: DecayProfile) -> Result<(), ConfigError> {
    if !(profile.rate > 0.0 && profile.rate <= 1.0) {
        return Err(ConfigError::InvalidChannel {
            channel,
            reason: "rate must be in (0, 1]",
        });
    }
    if !(profile.drain >= 0.0) {
        return Err(ConfigError::InvalidChannel {
            channel,
            reason: "drain must be non-negative",
        });
    }
    if profile.rate == 1.0 && profile.drain == 0.0 {
        return Err(ConfigError::InvalidChannel {
            channel,
            reason: "rate 1.0 with zero drain never decays",
        });
    }
    Ok(())
}
