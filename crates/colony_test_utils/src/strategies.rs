//! Proptest strategies for scheduler inputs.
//!
//! These generate random but reproducible zone snapshots, demand inputs
//! and unit censuses for property-based testing.

use colony_core::catalog::ModuleKind;
use colony_core::demand::ZoneConditions;
use colony_core::units::{BuilderTask, Role};
use colony_core::world::{Owner, Ownership, StructureKind, Zone};
use proptest::prelude::*;

use crate::fixtures::ZoneBuilder;

/// Generate energy capacities reachable by extension counts 0 to 60.
pub fn arb_extensions() -> impl Strategy<Value = u32> {
    0u32..=60
}

/// Generate any set of demand-driving flags.
pub fn arb_zone_conditions() -> impl Strategy<Value = ZoneConditions> {
    (
        any::<bool>(),
        0u32..=3,
        0u32..=1,
        any::<[bool; 4]>(),
        any::<[bool; 4]>(),
    )
        .prop_map(
            |(claimed, energy_nodes, mineral_nodes, structures, activity)| {
                let [has_tower, has_link, has_extractor, has_storage] = structures;
                let [construction, non_road, wartime, consumption] = activity;
                ZoneConditions {
                    claimed,
                    energy_nodes,
                    mineral_nodes,
                    has_tower,
                    has_link,
                    has_extractor,
                    has_storage,
                    construction_pending: construction || non_road,
                    non_road_pending: non_road,
                    wartime,
                    consumption_mode: consumption && claimed && has_storage,
                }
            },
        )
}

/// Generate any role the zone scheduler produces in peacetime.
pub fn arb_economy_role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Harvester),
        Just(Role::Transporter),
        Just(Role::Builder(BuilderTask::Upgrader)),
        Just(Role::Builder(BuilderTask::WallBuilder)),
    ]
}

/// Generate the sizing-module counts of a role's census.
pub fn arb_census_sizes(max_units: usize) -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::vec(1u32..=16, 0..max_units)
}

/// Generate controller ownership states.
pub fn arb_ownership() -> impl Strategy<Value = Ownership> {
    prop_oneof![
        Just(Ownership::Unowned),
        Just(Ownership::Owned(Owner::Colony)),
        Just(Ownership::Owned(Owner::Other("rival".into()))),
        (0u32..5000).prop_map(|ticks_remaining| Ownership::Reserved {
            owner: Owner::Colony,
            ticks_remaining,
        }),
        (0u32..5000).prop_map(|ticks_remaining| Ownership::Reserved {
            owner: Owner::Other("rival".into()),
            ticks_remaining,
        }),
    ]
}

/// Generate a claimed zone with facilities: random extensions, energy,
/// nodes, structures and pending construction.
pub fn arb_home_zone() -> impl Strategy<Value = Zone> {
    (
        arb_extensions(),
        0u32..=100,
        1usize..=3,
        any::<[bool; 3]>(),
        proptest::option::of(prop_oneof![
            Just(StructureKind::Road),
            Just(StructureKind::Extension),
        ]),
    )
        .prop_map(|(extensions, fill_percent, nodes, structures, site)| {
            let capacity = 300 + 50 * extensions;
            let mut builder = ZoneBuilder::claimed("W1N1", extensions)
                .energy(capacity * fill_percent / 100);
            for i in 0..nodes {
                builder = builder.energy_node(8 + 12 * i as u8, 10);
            }
            let [tower, link, storage] = structures;
            if tower {
                builder = builder.structure(StructureKind::Tower);
            }
            if link {
                builder = builder.structure(StructureKind::Link);
            }
            if storage {
                builder = builder.storage(500_000);
            }
            if let Some(kind) = site {
                builder = builder.construction(kind);
            }
            builder.build()
        })
}

/// Generate a hostile body with some offensive modules.
pub fn arb_hostile_body() -> impl Strategy<Value = Vec<(ModuleKind, u32)>> {
    (0u32..=10, 0u32..=10, 1u32..=5).prop_map(|(melee, ranged, mobility)| {
        vec![
            (ModuleKind::Melee, melee),
            (ModuleKind::Ranged, ranged),
            (ModuleKind::Mobility, mobility),
        ]
    })
}
