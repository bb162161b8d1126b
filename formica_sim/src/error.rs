// Error types for simulation construction and config loading.
//
// The tick loop itself is infallible: out-of-range reads return zero,
// failed mutations return `false`. Errors exist only for the startup path,
// where a bad config must stop the program before the first tick.

use crate::types::Caste;

/// A `GameConfig` that cannot produce a valid simulation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The caste table has no entry for a caste the sim needs.
    #[error("caste table has no entry for {0:?}")]
    MissingCaste(Caste),

    /// A caste entry has nonsensical stats.
    #[error("invalid stats for {caste:?}: {reason}")]
    InvalidCaste {
        caste: Caste,
        reason: &'static str,
    },

    /// A pheromone decay profile would grow values or never clear them.
    #[error("invalid pheromone profile `{channel}`: {reason}")]
    InvalidChannel {
        channel: &'static str,
        reason: &'static str,
    },

    /// A probability-valued field is outside [0, 1].
    #[error("`{field}` must be a probability in [0, 1], got {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },

    /// A field that must be strictly positive is zero or negative.
    #[error("`{field}` must be positive")]
    NonPositive { field: &'static str },

    /// The speed multiplier table is empty or contains a zero.
    #[error("speed multiplier table must be non-empty with all entries >= 1")]
    InvalidSpeedTable,

    /// A nest position lies outside the world.
    #[error("nest for colony index {colony} at ({x}, {y}) is outside the world")]
    NestOutOfBounds { colony: usize, x: f32, y: f32 },

    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// A config file was not valid JSON for `GameConfig`.
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}
