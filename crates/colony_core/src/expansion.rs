//! Expansion planner.
//!
//! Serves directive zones that have no production facility of their own by
//! borrowing the facilities of the nearest zone that does (the proxy group).

use crate::budget::Budget;
use crate::config::Directive;
use crate::demand::{Demand, ZoneConditions};
use crate::error::ColonyError;
use crate::memory::{ProxyCache, ZoneState};
use crate::scheduler::{harvest_order, CycleContext, Evaluation, Flow, ZoneOutcome};
use crate::units::{BuilderTask, ClaimIntent, Role};
use crate::world::{EntityId, NodeKind, Owner, Ownership, Position, World, ZoneName};

/// What the directive calls for in the target zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mission {
    /// Unexplored target: one colonist with a claim module.
    Scout { intent: ClaimIntent },
    /// Colonists, with or without claim modules.
    Colonise { claim: bool },
    /// A dedicated claimer.
    Claimer { intent: ClaimIntent, min_size: u32 },
    /// A single ravager while hostiles roam the zone.
    Ravage,
    /// The reservation is fresh enough; only the economy needs work.
    Hold,
}

/// Claim modules a dedicated claimer needs to break a foreign controller.
const ATTACK_CLAIM_MODULES: u32 = 3;

/// Facility group serving `target`, from the cache when it is fresh and
/// every cached facility still exists, otherwise by a fresh lookup.
fn resolve_proxy(
    ctx: &CycleContext<'_>,
    world: &World,
    target: &ZoneName,
    state: &mut ZoneState,
) -> Option<ZoneName> {
    if let Some(cache) = &state.proxy {
        if cache.is_fresh(ctx.cycle, ctx.config.proxy_cache_ttl) {
            let facilities = world.zone(&cache.zone).map(|z| &z.facilities);
            let stale = cache.facilities.iter().find(|id| {
                !facilities.is_some_and(|f| f.iter().any(|facility| facility.id == **id))
            });
            match stale {
                None => return Some(cache.zone.clone()),
                Some(&id) => tracing::debug!(
                    zone = %target,
                    error = %ColonyError::StaleAssignment(id),
                    "Proxy cache invalidated"
                ),
            }
        }
    }

    let destination = Position::center(target.clone());
    let (_, group) = world
        .zones()
        .filter(|z| &z.name != target && !z.facilities.is_empty())
        .filter_map(|z| {
            let distance = z
                .facilities
                .iter()
                .filter_map(|f| ctx.oracle.locate_path(&f.position, &destination))
                .min()?;
            Some((distance, z))
        })
        .min_by(|(a, za), (b, zb)| a.cmp(b).then_with(|| za.name.cmp(&zb.name)))?;

    tracing::debug!(zone = %target, proxy = %group.name, "Resolved proxy facilities");
    state.proxy = Some(ProxyCache {
        zone: group.name.clone(),
        facilities: group.facilities.iter().map(|f| f.id).collect(),
        cached_at: ctx.cycle,
    });
    Some(group.name.clone())
}

fn choose_mission(
    directive: &Directive,
    ownership: &Ownership,
    wartime: bool,
    reservation_refresh_below: u32,
) -> Mission {
    if wartime {
        return Mission::Ravage;
    }
    match ownership {
        Ownership::Owned(Owner::Colony) => Mission::Colonise { claim: false },
        Ownership::Owned(Owner::Other(_))
        | Ownership::Reserved {
            owner: Owner::Other(_),
            ..
        } => Mission::Claimer {
            intent: ClaimIntent::Attack,
            min_size: ATTACK_CLAIM_MODULES,
        },
        Ownership::Unowned | Ownership::Reserved { .. } if directive.claim => {
            Mission::Colonise { claim: true }
        }
        Ownership::Reserved {
            ticks_remaining, ..
        } if *ticks_remaining > reservation_refresh_below => Mission::Hold,
        Ownership::Unowned | Ownership::Reserved { .. } => Mission::Claimer {
            intent: ClaimIntent::Reserve,
            min_size: 1,
        },
    }
}

/// Schedule a directive zone without facilities of its own.
pub fn plan_expansion(
    ctx: &mut CycleContext<'_>,
    world: &mut World,
    directive: &Directive,
    mut state: ZoneState,
) -> (ZoneState, ZoneOutcome) {
    let config = ctx.config;
    let name = &directive.zone;

    let Some(group) = resolve_proxy(ctx, world, name, &mut state) else {
        let error = ColonyError::MisconfiguredDirective {
            zone: name.clone(),
            reason: "no facility group can reach the zone".into(),
        };
        tracing::warn!(%error, "Skipping directive");
        return (state, ZoneOutcome::skipped(&error));
    };
    let Some(group_zone) = world.zone(&group) else {
        return (state, ZoneOutcome::skipped(&ColonyError::UnknownZone(group)));
    };
    let budget = Budget::for_group(group_zone, config);
    let facilities = group_zone.facilities.clone();

    let target = world.zone(name);
    let wartime = target.is_some_and(|z| z.is_at_war());
    if !wartime && !state.due(ctx.cycle, config.recompute_interval) {
        return (state, ZoneOutcome::Throttled);
    }

    // Read everything needed from the target before units are produced.
    let mut economy: Option<(Demand, Vec<(EntityId, NodeKind)>)> = None;
    let mission = match target {
        None => Mission::Scout {
            intent: if directive.claim {
                ClaimIntent::Claim
            } else {
                ClaimIntent::Reserve
            },
        },
        Some(zone) => {
            let Some(controller) = &zone.controller else {
                let error = ColonyError::MisconfiguredDirective {
                    zone: name.clone(),
                    reason: "zone has no controller".into(),
                };
                tracing::warn!(%error, "Skipping directive");
                return (state, ZoneOutcome::skipped(&error));
            };
            if !controller.ownership.is_owned_by_colony() {
                let conditions = ZoneConditions::observe(zone, false);
                economy = Some((
                    Demand::compute(&conditions, config),
                    harvest_order(zone, &facilities, ctx.oracle),
                ));
            }
            choose_mission(
                directive,
                &controller.ownership,
                wartime,
                config.reservation_refresh_below,
            )
        }
    };
    state.mark_evaluated(ctx.cycle);
    tracing::debug!(zone = %name, proxy = %group, ?mission, "Planning expansion");

    let mut eval = Evaluation::new(ctx, group, name.clone(), budget);
    let flow = match mission {
        Mission::Scout { intent } => eval.ensure_count(
            world,
            Role::Builder(BuilderTask::Colonist { claim: true }),
            1,
            1,
            Some(intent),
        ),
        Mission::Colonise { claim } => eval.ensure_count(
            world,
            Role::Builder(BuilderTask::Colonist { claim }),
            config.colonist_target as usize,
            1,
            claim.then_some(ClaimIntent::Claim),
        ),
        Mission::Claimer { intent, min_size } => {
            eval.ensure_count(world, Role::Claimer, 1, min_size, Some(intent))
        }
        Mission::Ravage => eval.ensure_count(world, Role::Ravager, 1, 1, None),
        Mission::Hold => Flow::Continue,
    };

    if flow == Flow::Continue && !wartime {
        if let Some((demand, nodes)) = economy {
            if eval.harvesters(world, &nodes) == Flow::Continue {
                eval.transporters(world, &demand, false);
            }
        }
    }

    let outcome = ZoneOutcome::Evaluated {
        wartime,
        actions: eval.into_actions(),
    };
    (state, outcome)
}
