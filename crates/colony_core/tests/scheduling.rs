//! End-to-end scheduling behaviour through the colony runner.

use colony_core::budget::Budget;
use colony_core::catalog::ModuleKind;
use colony_core::census::{Member, RoleCensus};
use colony_core::colony::Colony;
use colony_core::config::{ColonyConfig, Directive, SchedulerConfig};
use colony_core::demand::{consumption_mode, Demand, ZoneConditions};
use colony_core::scheduler::ZoneOutcome;
use colony_core::sizer::{decide, SizingDecision};
use colony_core::units::{BuilderTask, ClaimIntent, CombatStyle, Role, UnitId};
use colony_core::world::{StructureKind, World, ZoneName};
use colony_test_utils::determinism::ColonyRun;
use colony_test_utils::fixtures::{
    bootstrap_world, home, home_config, spawn_unit, world_of, ZoneBuilder,
};
use colony_test_utils::proptest::prelude::*;
use colony_test_utils::strategies::{
    arb_census_sizes, arb_economy_role, arb_home_zone, arb_ownership, arb_zone_conditions,
};

fn members(sizes: &[u32], first_id: UnitId) -> Vec<Member> {
    sizes
        .iter()
        .zip(first_id..)
        .map(|(&size, id)| Member {
            id,
            size,
            ticks_to_live: 1000,
        })
        .collect()
}

fn arb_intent() -> impl Strategy<Value = ClaimIntent> {
    prop_oneof![
        Just(ClaimIntent::Claim),
        Just(ClaimIntent::Reserve),
        Just(ClaimIntent::Attack),
    ]
}

const ECONOMY: [(Role, ModuleKind); 4] = [
    (Role::Harvester, ModuleKind::Labor),
    (Role::Transporter, ModuleKind::Carry),
    (Role::Builder(BuilderTask::Upgrader), ModuleKind::Labor),
    (Role::Builder(BuilderTask::WallBuilder), ModuleKind::Labor),
];

fn counted_total(world: &World, zone: &ZoneName, role: Role, primary: ModuleKind) -> u32 {
    world
        .query_units(zone, |u| u.is_counted() && u.role == role)
        .map(|u| u.size(primary))
        .sum()
}

#[test]
fn test_bootstrap_zone_demand() {
    let world = bootstrap_world();
    let zone = world.zone(&home()).unwrap();
    let demand = Demand::compute(
        &ZoneConditions::observe(zone, false),
        &SchedulerConfig::default(),
    );
    assert_eq!(demand.harvester, 7);
    assert_eq!(demand.transporter, 8);
    assert_eq!(demand.upgrader, 8);
    assert_eq!(demand.wall_builder, 6);
}

#[test]
fn test_wall_builder_outranks_transporter() {
    let mut world = bootstrap_world();
    let mut colony = Colony::new(home_config());
    let report = colony.run_cycle(&mut world, 0);

    assert_eq!(report.produced(), 1);
    let (role, _, _) = report.outcome(&home()).unwrap().produced().unwrap();
    assert_eq!(role, Role::Builder(BuilderTask::WallBuilder));
}

#[test]
fn test_consolidation_replaces_small_unit() {
    let census = RoleCensus {
        members: vec![Member {
            id: 7,
            size: 4,
            ticks_to_live: 900,
        }],
        decommissioned: Vec::new(),
    };
    assert_eq!(
        decide(Role::Transporter, 10, 10, &census),
        SizingDecision::Spawn {
            size: 10,
            supersedes: vec![7]
        }
    );
}

fn mode_at(world: &mut World, colony: &mut Colony, cycle: u64, stored: u64) -> bool {
    world.zone_mut(&home()).unwrap().stored_total = stored;
    world.note_delivery(&home());
    colony.run_cycle(world, cycle);
    colony.memory().zones[&home()].consumption_mode
}

#[test]
fn test_consumption_mode_hysteresis_across_cycles() {
    let mut world = world_of([ZoneBuilder::claimed("W1N1", 10)
        .energy_node(10, 10)
        .storage(950_001)
        .build()]);
    let mut colony = Colony::new(home_config());

    assert!(mode_at(&mut world, &mut colony, 0, 950_001));
    assert!(mode_at(&mut world, &mut colony, 1, 920_000));
    assert!(mode_at(&mut world, &mut colony, 2, 900_000));
    assert!(!mode_at(&mut world, &mut colony, 3, 899_999));
    assert!(!mode_at(&mut world, &mut colony, 4, 920_000));
}

#[test]
fn test_consumption_mode_needs_storage() {
    let config = SchedulerConfig::default();
    assert!(!consumption_mode(true, 2_000_000, false, &config));
}

#[test]
fn test_mercenary_reinforces_weaker_side() {
    let mut world = world_of([ZoneBuilder::claimed("W1N1", 20)
        .energy_node(10, 10)
        .hostile(&[(ModuleKind::Ranged, 30), (ModuleKind::Mobility, 10)])
        .build()]);
    // Wartime transporter demand is already met.
    spawn_unit(
        &mut world,
        Role::Transporter,
        &home(),
        &[(ModuleKind::Carry, 14), (ModuleKind::Mobility, 7)],
    );
    // Melee power 6 * 1.5 = 9, ranged power 15.
    spawn_unit(
        &mut world,
        Role::Mercenary(CombatStyle::Melee),
        &home(),
        &[(ModuleKind::Melee, 6), (ModuleKind::Mobility, 6)],
    );
    spawn_unit(
        &mut world,
        Role::Mercenary(CombatStyle::Ranged),
        &home(),
        &[(ModuleKind::Ranged, 15), (ModuleKind::Mobility, 15)],
    );

    let mut colony = Colony::new(home_config());
    let report = colony.run_cycle(&mut world, 0);
    let outcome = report.outcome(&home()).unwrap();
    assert!(matches!(outcome, ZoneOutcome::Evaluated { wartime: true, .. }));
    let (role, _, _) = outcome.produced().unwrap();
    assert_eq!(role, Role::Mercenary(CombatStyle::Melee));
}

#[test]
fn test_unexplored_claim_target_gets_one_colonist() {
    let world = world_of([ZoneBuilder::claimed("W1N1", 20).build()]);
    let config = ColonyConfig {
        directives: vec![Directive::new("W1N2", true)],
        ..ColonyConfig::default()
    };
    let mut run = ColonyRun::new(world, config);
    run.run(60);

    let target = ZoneName::new("W1N2");
    let colonists: Vec<_> = run
        .world
        .query_units(&target, |u| u.is_counted())
        .collect();
    assert_eq!(colonists.len(), 1);
    let colonist = colonists[0];
    assert_eq!(
        colonist.role,
        Role::Builder(BuilderTask::Colonist { claim: true })
    );
    assert_eq!(colonist.body.count(ModuleKind::Claim), 1);
    assert_eq!(colonist.claim_intent, Some(ClaimIntent::Claim));
    assert_eq!(colonist.home, home());
}

#[test]
fn test_misconfigured_directive_does_not_block_others() {
    let mut world = world_of([
        ZoneBuilder::claimed("W1N1", 10)
            .energy_node(10, 10)
            .construction(StructureKind::Road)
            .build(),
        ZoneBuilder::new("W2N1").energy_node(20, 20).build(),
    ]);
    let mut colony = Colony::new(ColonyConfig {
        directives: vec![Directive::new("W2N1", true), Directive::new("W1N1", true)],
        ..ColonyConfig::default()
    });
    let report = colony.run_cycle(&mut world, 0);

    assert!(matches!(
        report.outcome(&ZoneName::new("W2N1")),
        Some(ZoneOutcome::Skipped { .. })
    ));
    assert!(report.outcome(&home()).unwrap().produced().is_some());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// No role ever runs more than one affordable unit past its ideal.
    #[test]
    fn prop_no_runaway_production(zone in arb_home_zone()) {
        let config = SchedulerConfig::default();
        let demand = Demand::compute(&ZoneConditions::observe(&zone, false), &config);
        let budget = Budget::for_group(&zone, &config);
        let mut run = ColonyRun::new(world_of([zone]), home_config());

        for _ in 0..80 {
            run.step();
            for (role, primary) in ECONOMY {
                let total = counted_total(&run.world, &home(), role, primary);
                let bound = demand.ideal(role) + budget.max_affordable(role);
                prop_assert!(
                    total <= bound,
                    "{:?}: {} exceeds {} at cycle {}", role, total, bound, run.cycle
                );
            }
        }
    }

    /// Sizing decisions stay within the role's ideal plus one unit, and
    /// only touch units the census knows about.
    #[test]
    fn prop_sizer_decisions_are_bounded(
        role in arb_economy_role(),
        active in arb_census_sizes(6),
        walking in arb_census_sizes(3),
        ideal in 0u32..40,
        affordable in 0u32..20,
    ) {
        let census = RoleCensus {
            members: members(&active, 1),
            decommissioned: members(&walking, 100),
        };
        let current = census.total();
        match decide(role, ideal, affordable, &census) {
            SizingDecision::Spawn { size, supersedes } => {
                prop_assert!(current < ideal);
                prop_assert!(size >= 1 && size <= affordable);
                prop_assert!(current + size <= ideal + affordable);
                for id in supersedes {
                    prop_assert!(census.members.iter().any(|m| m.id == id));
                }
            }
            SizingDecision::Reinstate(id) => {
                let unit = census.decommissioned.iter().find(|m| m.id == id);
                prop_assert!(unit.is_some_and(|m| current + m.size <= ideal));
            }
            SizingDecision::Decommission(id) => {
                prop_assert!(current > ideal);
                prop_assert!(census.members.iter().any(|m| m.id == id));
            }
            SizingDecision::Unaffordable => prop_assert!(current < ideal && affordable == 0),
            SizingDecision::Hold => prop_assert_eq!(current, ideal),
        }
    }

    /// Demand follows node counts and drops builders without construction.
    #[test]
    fn prop_demand_rules(conditions in arb_zone_conditions()) {
        let config = SchedulerConfig::default();
        let demand = Demand::compute(&conditions, &config);
        prop_assert_eq!(
            demand.harvester,
            conditions.energy_nodes * config.energy_node_labor
                + conditions.mineral_nodes * config.mineral_node_labor
        );
        if !conditions.claimed {
            prop_assert_eq!(demand.upgrader, 0);
            prop_assert_eq!(demand.wall_builder, 0);
        } else if !conditions.construction_pending {
            prop_assert_eq!(demand.wall_builder, 0);
            let consumption = if conditions.consumption_mode { 14 } else { 0 };
            prop_assert_eq!(demand.upgrader, 1 + consumption);
        }

        let peace = Demand::compute(&ZoneConditions { wartime: false, ..conditions }, &config);
        prop_assert!(demand.transporter >= peace.transporter);
    }

    /// Claim units attack foreign controllers, leave the colony's own
    /// alone, and only claim with capacity to spare.
    #[test]
    fn prop_claim_arrival(
        intent in arb_intent(),
        ownership in arb_ownership(),
        capacity in 0u32..3,
    ) {
        let resolved = intent.resolve_on_arrival(&ownership, capacity);
        if ownership.is_hostile() {
            prop_assert_eq!(resolved, Some(ClaimIntent::Attack));
        } else if ownership.is_owned_by_colony() {
            prop_assert_eq!(resolved, None);
        } else if resolved == Some(ClaimIntent::Claim) {
            prop_assert!(intent == ClaimIntent::Claim && capacity > 0);
        } else {
            prop_assert_eq!(resolved, Some(ClaimIntent::Reserve));
        }
    }
}
