// Queen egg-laying and brood development over whole ticks.

use formica_sim::colony::BroodStage;
use formica_sim::event::SimEventKind;
use formica_sim::types::{Caste, ColonyId};
use scenario_tests::{Scenario, bare_config};

fn laying_config() -> formica_sim::config::GameConfig {
    let mut config = bare_config();
    config.colony.initial_food = 100.0;
    config.colony.lay_food_threshold = 50.0;
    config.colony.lay_interval_ticks = 30;
    config.colony.egg_cost = 5.0;
    config
}

fn eggs_laid(s: &Scenario, colony: ColonyId) -> usize {
    s.count(|k| matches!(k, SimEventKind::EggLaid { colony: c, .. } if *c == colony))
}

#[test]
fn exactly_one_egg_per_interval() {
    let mut s = Scenario::new(1, laying_config());
    s.run(29);
    assert_eq!(eggs_laid(&s, ColonyId::A), 0);
    s.run(1);
    assert_eq!(eggs_laid(&s, ColonyId::A), 1);
    assert_eq!(s.sim.colony(ColonyId::A).food(), 95.0);
    assert_eq!(s.sim.colony(ColonyId::A).brood(BroodStage::Egg).len(), 1);

    s.run(30);
    assert_eq!(eggs_laid(&s, ColonyId::A), 2);
    assert_eq!(s.sim.colony(ColonyId::A).food(), 90.0);
}

#[test]
fn both_queens_lay_in_lockstep() {
    let mut s = Scenario::new(1, laying_config());
    s.run(90);
    assert_eq!(eggs_laid(&s, ColonyId::A), 3);
    assert_eq!(eggs_laid(&s, ColonyId::B), 3);
}

#[test]
fn laying_stops_below_the_food_threshold() {
    let mut s = Scenario::new(1, laying_config());
    // 100, 95, ..., 50 each pass the threshold: eleven eggs, then 45 left.
    s.run(30 * 15);
    assert_eq!(eggs_laid(&s, ColonyId::A), 11);
    assert_eq!(s.sim.colony(ColonyId::A).food(), 45.0);
}

#[test]
fn eggs_grow_into_adults() {
    let mut config = laying_config();
    config.colony.soldier_chance = 0.0;
    // Enough for a single egg.
    config.colony.initial_food = 50.0;
    let brood = config.castes[&Caste::Worker].brood;
    let mut s = Scenario::new(6, config);

    s.run(30);
    let hatch_after = u64::from(brood.egg + brood.larva + brood.pupa);
    s.run(hatch_after - 1);
    assert_eq!(s.sim.colony(ColonyId::A).stats().workers, 0);
    assert_eq!(s.sim.colony(ColonyId::A).brood(BroodStage::Pupa).len(), 1);
    s.run(1);
    assert_eq!(s.sim.colony(ColonyId::A).stats().workers, 1);
    assert_eq!(
        s.count(|k| matches!(k, SimEventKind::AntHatched { colony: ColonyId::A, .. })),
        1
    );
}

#[test]
fn roster_never_exceeds_cap_under_pressure() {
    let mut config = bare_config();
    config.colony.roster_cap = 12;
    config.colony.initial_workers = 6;
    config.colony.initial_food = 500.0;
    config.colony.lay_food_threshold = 0.0;
    config.colony.egg_cost = 1.0;
    config.colony.lay_interval_ticks = 1;
    for stats in config.castes.values_mut() {
        stats.brood.egg = 3;
        stats.brood.larva = 3;
        stats.brood.pupa = 3;
    }
    let mut s = Scenario::new(9, config);
    // `assert_invariants` checks the roster every tick.
    s.run(150);
    let colony = s.sim.colony(ColonyId::A);
    assert!(colony.ants().len() + colony.brood_count() <= 12);
    assert_eq!(colony.ants().len(), 12);
}
