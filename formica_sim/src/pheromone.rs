// Multi-channel pheromone field.
//
// A `PheromoneField` is N independent scalar grids laid over the world, one
// per channel. The sim allocates four: a trail and an alarm channel for each
// colony (see `PheromoneChannel::index()` in `types.rs`). Each grid is a flat
// row-major `Vec<f32>` indexed by `cx + cy * width`, where `(cx, cy)` is the
// cell containing a world position at `cell_size` units per cell.
//
// Reads outside the grid (or on an unknown channel) return 0; writes outside
// are silent no-ops. Nothing here can fail, so agent code can probe freely
// past the world edge.
//
// Once per tick `decay()` applies each channel's `DecayProfile` to every
// non-zero cell: `value = value * rate - drain`, snapping to 0 below
// `epsilon`. The drain term is what makes long-abandoned trails actually
// reach zero instead of lingering as denormal noise. Channels decay in
// parallel via rayon. They share no data, so the result is bit-identical to
// a sequential pass.
//
// See also: `food.rs` which owns the field and exposes it to agents,
// `config.rs` for `PheromoneParams` / `DecayProfile`.
//
// **Critical constraint: determinism.** Every cell stays in `[0, cap]`.
// Deposits clamp at the cap, decay never raises a value.

use crate::config::{DecayProfile, GameConfig};
use crate::types::{ColonyId, PheromoneChannel, PheromoneKind, Vec2};
use rayon::prelude::*;

/// One channel's grid and its decay profile.
#[derive(Clone, Debug)]
struct ChannelGrid {
    profile: DecayProfile,
    cells: Vec<f32>,
}

impl ChannelGrid {
    fn decay(&mut self, epsilon: f32) {
        let DecayProfile { rate, drain } = self.profile;
        for value in self.cells.iter_mut().filter(|v| **v > 0.0) {
            let next = *value * rate - drain;
            *value = if next < epsilon { 0.0 } else { next };
        }
    }
}

/// Capped concentration grids with per-channel decay.
#[derive(Clone, Debug)]
pub struct PheromoneField {
    /// Grid width in cells.
    width: usize,
    /// Grid height in cells.
    height: usize,
    cell_size: f32,
    cap: f32,
    epsilon: f32,
    channels: Vec<ChannelGrid>,
}

impl PheromoneField {
    /// Create an all-zero field covering `world_width × world_height` world
    /// units, with one channel per entry of `profiles`.
    pub fn new(
        world_width: f32,
        world_height: f32,
        cell_size: f32,
        profiles: &[DecayProfile],
        cap: f32,
        epsilon: f32,
    ) -> Self {
        let width = (world_width / cell_size).ceil().max(1.0) as usize;
        let height = (world_height / cell_size).ceil().max(1.0) as usize;
        let channels = profiles
            .iter()
            .map(|&profile| ChannelGrid {
                profile,
                cells: vec![0.0; width * height],
            })
            .collect();
        Self {
            width,
            height,
            cell_size,
            cap,
            epsilon,
            channels,
        }
    }

    /// Build the sim's standard four-channel field from config, laid out in
    /// `PheromoneChannel::index()` order.
    pub fn from_config(config: &GameConfig) -> Self {
        let mut profiles = Vec::with_capacity(crate::types::CHANNEL_COUNT);
        for _colony in ColonyId::ALL {
            for kind in PheromoneKind::ALL {
                profiles.push(config.pheromones.profile(kind));
            }
        }
        Self::new(
            config.world.width,
            config.world.height,
            config.world.cell_size,
            &profiles,
            config.pheromones.cap,
            config.pheromones.epsilon,
        )
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn cap(&self) -> f32 {
        self.cap
    }

    /// Flat cell index for a world position, or `None` outside the grid.
    fn cell_index(&self, pos: Vec2) -> Option<usize> {
        if !(pos.x >= 0.0 && pos.y >= 0.0) || !pos.x.is_finite() || !pos.y.is_finite() {
            return None;
        }
        let cx = (pos.x / self.cell_size) as usize;
        let cy = (pos.y / self.cell_size) as usize;
        if cx < self.width && cy < self.height {
            Some(cx + cy * self.width)
        } else {
            None
        }
    }

    /// Add `strength` to the cell under `pos`, clamping at the cap.
    /// Out-of-bounds positions, unknown channels and negative or non-finite
    /// strengths are ignored.
    pub fn deposit(&mut self, pos: Vec2, channel: usize, strength: f32) {
        if !(strength > 0.0) || !strength.is_finite() {
            return;
        }
        let Some(idx) = self.cell_index(pos) else {
            return;
        };
        let cap = self.cap;
        if let Some(grid) = self.channels.get_mut(channel) {
            let cell = &mut grid.cells[idx];
            *cell = (*cell + strength).min(cap);
        }
    }

    /// Concentration at `pos`. Zero outside the grid or for unknown channels.
    pub fn read(&self, pos: Vec2, channel: usize) -> f32 {
        match (self.cell_index(pos), self.channels.get(channel)) {
            (Some(idx), Some(grid)) => grid.cells[idx],
            _ => 0.0,
        }
    }

    /// Typed convenience over `deposit`.
    pub fn deposit_on(&mut self, pos: Vec2, channel: PheromoneChannel, strength: f32) {
        self.deposit(pos, channel.index(), strength);
    }

    /// Typed convenience over `read`.
    pub fn read_on(&self, pos: Vec2, channel: PheromoneChannel) -> f32 {
        self.read(pos, channel.index())
    }

    /// Age every channel by one tick.
    pub fn decay(&mut self) {
        let epsilon = self.epsilon;
        self.channels
            .par_iter_mut()
            .for_each(|grid| grid.decay(epsilon));
    }

    /// Sum of all cells in a channel. Zero for unknown channels.
    pub fn channel_total(&self, channel: usize) -> f32 {
        self.channels
            .get(channel)
            .map_or(0.0, |grid| grid.cells.iter().sum())
    }

    /// Number of non-zero cells in a channel.
    pub fn nonzero_cells(&self, channel: usize) -> usize {
        self.channels
            .get(channel)
            .map_or(0, |grid| grid.cells.iter().filter(|v| **v > 0.0).count())
    }

    /// Raw row-major cells of a channel, for heatmap/minimap consumers.
    pub fn channel_cells(&self, channel: usize) -> Option<&[f32]> {
        self.channels.get(channel).map(|grid| grid.cells.as_slice())
    }
}
