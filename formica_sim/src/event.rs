// Narrative events emitted by the simulation.
//
// Each `SimState::step()` returns the `SimEvent`s produced during that tick:
// hatches, eggs, kills, deliveries, the queen deaths that end the match.
// They are output only. The sim never reads them back, and dropping them
// changes nothing. HUDs, event logs and the headless runner consume them.
//
// Events are pushed in the order they happen inside the tick, which follows
// the engine's fixed phase order (world → colony A → colony B → win check).
//
// See also: `sim.rs` for `StepResult`, `ant.rs` and `colony.rs` which emit
// most events.

use crate::types::{AntId, Caste, ColonyId, Victory};
use serde::{Deserialize, Serialize};

/// A narrative event, stamped with the tick it happened on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub tick: u64,
    pub kind: SimEventKind,
}

/// Things worth telling the player about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SimEventKind {
    /// The queen laid an egg destined to become `caste`.
    EggLaid { colony: ColonyId, caste: Caste },
    /// A pupa became an adult.
    AntHatched {
        colony: ColonyId,
        ant: AntId,
        caste: Caste,
    },
    /// An ant's health reached zero from a bite.
    AntKilled {
        colony: ColonyId,
        ant: AntId,
        caste: Caste,
        killer: AntId,
    },
    /// An ant outlived the configured lifespan.
    AntDiedOfAge {
        colony: ColonyId,
        ant: AntId,
        caste: Caste,
    },
    /// A carrier credited food to its colony.
    FoodDelivered {
        colony: ColonyId,
        ant: AntId,
        amount: f32,
    },
    /// A colony lost its queen.
    QueenDied { colony: ColonyId },
    /// The match is decided.
    GameOver { victory: Victory },
    /// The speed level changed.
    SpeedChanged { multiplier: u32 },
    /// Pause toggled.
    PauseChanged { paused: bool },
}

/// Append-only event sink handed down through one tick.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    tick: u64,
    events: Vec<SimEvent>,
}

impl EventLog {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, kind: SimEventKind) {
        self.events.push(SimEvent {
            tick: self.tick,
            kind,
        });
    }

    pub fn into_events(self) -> Vec<SimEvent> {
        self.events
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_stamps_its_tick() {
        let mut log = EventLog::new(17);
        log.push(SimEventKind::QueenDied {
            colony: ColonyId::B,
        });
        log.push(SimEventKind::GameOver {
            victory: Victory::ColonyA,
        });
        let events = log.into_events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.tick == 17));
    }

    #[test]
    fn events_serialize_for_external_consumers() {
        let event = SimEvent {
            tick: 3,
            kind: SimEventKind::AntHatched {
                colony: ColonyId::A,
                ant: AntId(12),
                caste: Caste::Soldier,
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        let restored: SimEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, restored);
    }
}
