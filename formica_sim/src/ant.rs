// The ant agent and its behavior state machine.
//
// Every adult in a colony roster is an `Ant`. Caste is a plain tag; the
// numbers that differ between castes (health, damage, speed, bite cooldown,
// whether it forages) come from the caste table in `GameConfig`.
//
// ## Per-tick flow (`Ant::tick`)
//
// 1. Housekeeping for every living ant: age, bite cooldown, trail cooldown
//    and hit-flash countdowns tick down. With `max_age_ticks` configured, a
//    worker or soldier past its lifespan dies here.
// 2. Queens stop here. They are stationary; `colony.rs` handles laying.
// 3. Externally-driven ants stop here too. An outside controller moves them
//    through the same public mutators the AI uses, and they stay ordinary
//    colony members for detection, combat and aging.
// 4. The state machine, in priority order:
//    - Enemy detection: a living enemy within `detection_radius` forces
//      FIGHTING (the current target is kept while still valid, otherwise the
//      nearest enemy is chosen). Losing every enemy drops a fighter back to
//      CARRYING or WANDERING.
//    - FIGHTING: face the target, lay alarm pheromone, bite when in range and
//      off cooldown, otherwise close in. A bite that takes health to zero
//      marks the victim dead on that same tick.
//    - WANDERING / FOLLOWING: pick up food if standing on a stocked patch
//      (foraging castes only), else the three-probe pheromone steer.
//    - CARRYING: head home laying trail, credit the colony on arrival.
//    - GUARDING: slow patrol inside `guard_radius`, walk back if pushed out.
//
// ## Movement
//
// `advance()` integrates `position += (cos, sin) * speed` with reflective
// walls: a step that would leave the world mirrors the crossing component of
// the heading, adds `boundary_jitter` so ants don't ping-pong on one line,
// and the result is clamped strictly inside the bounds.
//
// The enemy roster arrives as `&mut [Ant]` through `TickContext`. A target
// that died earlier in the same tick is still in that slice (pruning happens
// after its own colony's pass), so every lookup checks `is_dead()`.
//
// See also: `colony.rs` which owns rosters and runs `tick()` in roster order,
// `food.rs` for pickup and pheromone I/O, `config.rs` for `AntParams` and
// `CasteStats`.
//
// **Critical constraint: determinism.** All random turns draw from the sim
// `GameRng`, in roster order.

use crate::colony::FoodStore;
use crate::config::{AntParams, CasteStats, GameConfig};
use crate::event::{EventLog, SimEventKind};
use crate::food::FoodWorld;
use crate::prng::GameRng;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Everything an ant may read or write during its tick, passed explicitly.
pub struct TickContext<'a> {
    pub world: &'a mut FoodWorld,
    /// The opposing colony's roster, in its roster order.
    pub enemies: &'a mut [Ant],
    /// Own nest center.
    pub nest: Vec2,
    /// Own colony's food ledger.
    pub food: &'a mut FoodStore,
    pub config: &'a GameConfig,
    pub rng: &'a mut GameRng,
    pub events: &'a mut EventLog,
}

/// An adult ant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ant {
    pub id: AntId,
    pub caste: Caste,
    pub colony: ColonyId,
    pub position: Vec2,
    /// Heading in radians.
    pub angle: f32,
    pub state: AntState,
    /// Enemies this ant has killed.
    pub kills: u32,
    /// Ticks lived.
    pub age: u64,
    health: f32,
    max_health: f32,
    carrying: f32,
    dead: bool,
    control: Control,
    target: Option<AntId>,
    attack_cooldown: u32,
    trail_cooldown: u32,
    hit_flash: u32,
    hit_flash_ticks: u32,
}

impl Ant {
    /// A fresh adult at full health. Soldiers and queens start GUARDING,
    /// everyone else WANDERING.
    pub fn new(
        id: AntId,
        caste: Caste,
        colony: ColonyId,
        position: Vec2,
        angle: f32,
        stats: &CasteStats,
        params: &AntParams,
    ) -> Self {
        let state = match caste {
            Caste::Worker => AntState::Wandering,
            Caste::Soldier | Caste::Queen => AntState::Guarding,
        };
        Self {
            id,
            caste,
            colony,
            position,
            angle: normalize_angle(angle),
            state,
            kills: 0,
            age: 0,
            health: stats.max_health,
            max_health: stats.max_health,
            carrying: 0.0,
            dead: false,
            control: Control::AiControlled,
            target: None,
            attack_cooldown: 0,
            trail_cooldown: 0,
            hit_flash: 0,
            hit_flash_ticks: params.recent_hit_ticks,
        }
    }

    // -----------------------------------------------------------------------
    // Read-only projections
    // -----------------------------------------------------------------------

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn carrying(&self) -> f32 {
        self.carrying
    }

    pub fn is_externally_driven(&self) -> bool {
        self.control == Control::ExternallyDriven
    }

    /// Current combat target in the enemy roster.
    pub fn target(&self) -> Option<AntId> {
        self.target
    }

    /// Whether the ant took damage within the last `recent_hit_ticks`.
    pub fn recently_hit(&self) -> bool {
        self.hit_flash > 0
    }

    // -----------------------------------------------------------------------
    // Mutators shared by the AI and external controllers
    // -----------------------------------------------------------------------

    /// Non-finite positions are ignored.
    pub fn set_position(&mut self, position: Vec2) {
        if position.is_finite() {
            self.position = position;
        }
    }

    /// Non-finite headings are ignored.
    pub fn set_angle(&mut self, angle: f32) {
        if angle.is_finite() {
            self.angle = normalize_angle(angle);
        }
    }

    pub fn set_state(&mut self, state: AntState) {
        self.state = state;
    }

    /// Set the carried food. Negative or non-finite amounts clear it.
    pub fn set_carrying(&mut self, amount: f32) {
        self.carrying = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
    }

    pub(crate) fn set_control(&mut self, control: Control) {
        self.control = control;
    }

    /// Remove health. Returns `true` if this call killed the ant; the dead
    /// flag is set immediately. Damage to an already dead ant is ignored.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.dead || !(amount > 0.0) {
            return false;
        }
        self.health -= amount;
        self.hit_flash = self.hit_flash_ticks;
        if self.health <= 0.0 {
            self.health = 0.0;
            self.dead = true;
            self.target = None;
            return true;
        }
        false
    }

    /// Kill outright (lifespan, scripted removal).
    pub fn kill(&mut self) {
        self.health = 0.0;
        self.dead = true;
        self.target = None;
    }

    /// Steer an externally-driven ant: set the heading, then move at
    /// `external_speed` with the same wall reflection the AI uses. A
    /// non-finite heading is refused and the ant stays put.
    pub fn drive(
        &mut self,
        angle: f32,
        world: &FoodWorld,
        params: &AntParams,
        rng: &mut GameRng,
    ) -> bool {
        if !angle.is_finite() {
            return false;
        }
        self.set_angle(angle);
        self.advance(params.external_speed, world, params.boundary_jitter, rng);
        true
    }

    // -----------------------------------------------------------------------
    // Per-tick update
    // -----------------------------------------------------------------------

    /// Run one tick for this ant. Never panics; dead ants are skipped.
    pub fn tick(&mut self, ctx: &mut TickContext<'_>) {
        if self.dead {
            return;
        }

        self.age += 1;
        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);
        self.trail_cooldown = self.trail_cooldown.saturating_sub(1);
        self.hit_flash = self.hit_flash.saturating_sub(1);

        if let Some(max_age) = ctx.config.ants.max_age_ticks {
            if self.caste != Caste::Queen && self.age > max_age {
                self.kill();
                ctx.events.push(SimEventKind::AntDiedOfAge {
                    colony: self.colony,
                    ant: self.id,
                    caste: self.caste,
                });
                return;
            }
        }

        if self.caste == Caste::Queen || self.control == Control::ExternallyDriven {
            return;
        }

        let Some(&stats) = ctx.config.caste(self.caste) else {
            return;
        };

        if let Some(idx) = self.find_enemy(ctx.enemies, ctx.config.ants.detection_radius) {
            self.state = AntState::Fighting;
            self.target = Some(ctx.enemies[idx].id);
            self.fight(idx, &stats, ctx);
            return;
        }
        if self.state == AntState::Fighting {
            self.stop_fighting();
        }

        match self.state {
            AntState::Wandering | AntState::Following => self.forage(&stats, ctx),
            AntState::Carrying => self.carry_home(&stats, ctx),
            AntState::Guarding => self.guard(&stats, ctx),
            // Unreachable after `stop_fighting`, kept for exhaustiveness.
            AntState::Fighting => {}
        }
    }

    /// Index of the enemy to fight: the current target if it's still alive
    /// and in range, otherwise the nearest living enemy in range.
    fn find_enemy(&self, enemies: &[Ant], radius: f32) -> Option<usize> {
        let radius_sq = radius * radius;
        let in_range =
            |e: &Ant| e.is_alive() && e.position.distance_squared(self.position) <= radius_sq;

        if let Some(target) = self.target {
            if let Some(idx) = enemies.iter().position(|e| e.id == target && in_range(e)) {
                return Some(idx);
            }
        }
        enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| in_range(e))
            .min_by(|a, b| {
                let da = a.1.position.distance_squared(self.position);
                let db = b.1.position.distance_squared(self.position);
                da.total_cmp(&db)
            })
            .map(|(idx, _)| idx)
    }

    fn stop_fighting(&mut self) {
        self.target = None;
        self.state = if self.carrying > 0.0 {
            AntState::Carrying
        } else {
            AntState::Wandering
        };
    }

    fn fight(&mut self, idx: usize, stats: &CasteStats, ctx: &mut TickContext<'_>) {
        let params = &ctx.config.ants;
        let target_pos = ctx.enemies[idx].position;
        let distance = self.position.distance(target_pos);
        if distance > 0.0 {
            self.angle = self.position.heading_to(target_pos);
        }

        let alarm = PheromoneChannel::new(self.colony, PheromoneKind::Alarm);
        ctx.world
            .deposit_pheromone(self.position, alarm, params.alarm_strength);

        if distance <= params.bite_range {
            if self.attack_cooldown == 0 && stats.damage > 0.0 {
                let victim = &mut ctx.enemies[idx];
                let killed = victim.take_damage(stats.damage);
                self.attack_cooldown = stats.attack_cooldown_ticks;
                if killed {
                    self.kills += 1;
                    ctx.events.push(SimEventKind::AntKilled {
                        colony: victim.colony,
                        ant: victim.id,
                        caste: victim.caste,
                        killer: self.id,
                    });
                    self.stop_fighting();
                }
            }
        } else {
            // Close in without overshooting into the target.
            let step = stats.speed.min(distance - params.bite_range * 0.5).max(0.0);
            self.advance(step, ctx.world, params.boundary_jitter, ctx.rng);
        }
    }

    fn forage(&mut self, stats: &CasteStats, ctx: &mut TickContext<'_>) {
        let params = &ctx.config.ants;

        if stats.forages {
            let range = ctx.config.food.pickup_range;
            if let Some(patch) = ctx.world.nearest_patch_with_food(self.position, range) {
                let taken = ctx.world.take_food(patch, params.carry_capacity);
                if taken > 0.0 {
                    self.carrying = taken;
                    self.turn_around(params.flip_jitter, ctx.rng);
                    self.state = AntState::Carrying;
                    self.trail_cooldown = 0;
                    return;
                }
            }
        }

        let kind = if stats.forages {
            PheromoneKind::Trail
        } else {
            PheromoneKind::Alarm
        };
        self.steer(PheromoneChannel::new(self.colony, kind), params, ctx.world, ctx.rng);
        self.advance(stats.speed, ctx.world, params.boundary_jitter, ctx.rng);
    }

    /// Three-probe gradient steer. Sets WANDERING when nothing is sensed,
    /// FOLLOWING otherwise.
    fn steer(
        &mut self,
        channel: PheromoneChannel,
        params: &AntParams,
        world: &FoodWorld,
        rng: &mut GameRng,
    ) {
        let probe = |angle: f32| {
            world.read_pheromone(self.position.offset(angle, params.sensor_distance), channel)
        };
        let forward = probe(self.angle);
        let left = probe(self.angle - params.sensor_angle);
        let right = probe(self.angle + params.sensor_angle);

        if forward <= 0.0 && left <= 0.0 && right <= 0.0 {
            self.state = AntState::Wandering;
            self.angle = normalize_angle(self.angle + rng.jitter(params.wander_turn));
            return;
        }

        self.state = AntState::Following;
        if rng.random_bool(1.0 - params.wander_probability) {
            if forward >= left && forward >= right {
                // Already facing the strongest reading.
            } else if left > right {
                self.angle -= params.steer_turn;
            } else {
                self.angle += params.steer_turn;
            }
        } else {
            self.angle += rng.jitter(params.wander_turn);
        }
        self.angle = normalize_angle(self.angle);
    }

    fn carry_home(&mut self, stats: &CasteStats, ctx: &mut TickContext<'_>) {
        let params = &ctx.config.ants;

        if self.trail_cooldown == 0 {
            let trail = PheromoneChannel::new(self.colony, PheromoneKind::Trail);
            ctx.world
                .deposit_pheromone(self.position, trail, params.trail_strength);
            self.trail_cooldown = params.trail_deposit_interval_ticks;
        }

        if self.position.distance(ctx.nest) > params.nest_radius {
            self.angle = normalize_angle(
                self.position.heading_to(ctx.nest) + ctx.rng.jitter(params.wander_turn * 0.25),
            );
            self.advance(stats.speed, ctx.world, params.boundary_jitter, ctx.rng);
        }

        if self.position.distance(ctx.nest) <= params.nest_radius {
            let amount = self.carrying;
            ctx.food.credit(amount);
            self.carrying = 0.0;
            self.turn_around(params.flip_jitter, ctx.rng);
            self.state = AntState::Wandering;
            ctx.events.push(SimEventKind::FoodDelivered {
                colony: self.colony,
                ant: self.id,
                amount,
            });
        }
    }

    fn guard(&mut self, stats: &CasteStats, ctx: &mut TickContext<'_>) {
        let params = &ctx.config.ants;
        if self.position.distance(ctx.nest) > params.guard_radius {
            self.angle = self.position.heading_to(ctx.nest);
            self.advance(stats.speed, ctx.world, params.boundary_jitter, ctx.rng);
        } else {
            self.angle = normalize_angle(self.angle + ctx.rng.jitter(params.wander_turn));
            self.advance(
                stats.speed * params.guard_speed_factor,
                ctx.world,
                params.boundary_jitter,
                ctx.rng,
            );
        }
    }

    /// Face roughly the opposite way.
    fn turn_around(&mut self, jitter: f32, rng: &mut GameRng) {
        self.angle = normalize_angle(self.angle + PI + rng.jitter(jitter));
    }

    /// Move `speed` units along the heading with reflective walls.
    pub fn advance(&mut self, speed: f32, world: &FoodWorld, jitter: f32, rng: &mut GameRng) {
        if speed.is_nan() || speed <= 0.0 {
            return;
        }
        let (width, height) = (world.width(), world.height());
        let mut next = self.position.offset(self.angle, speed);
        let hit_x = next.x < 0.0 || next.x >= width;
        let hit_y = next.y < 0.0 || next.y >= height;

        if hit_x || hit_y {
            let mut angle = self.angle;
            if hit_x {
                angle = PI - angle + rng.jitter(jitter);
            }
            if hit_y {
                angle = -angle + rng.jitter(jitter);
            }
            // Jitter must not undo the mirror: the crossed component points
            // back into the world.
            let (mut dy, mut dx) = angle.sin_cos();
            if hit_x {
                dx = if next.x < 0.0 { dx.abs() } else { -dx.abs() };
            }
            if hit_y {
                dy = if next.y < 0.0 { dy.abs() } else { -dy.abs() };
            }
            self.angle = normalize_angle(dy.atan2(dx));
            next = self.position.offset(self.angle, speed);
        }

        self.position = next.clamp_inside(width, height);
    }
}
