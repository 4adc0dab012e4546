//! Role scheduler.
//!
//! Walks the roles of a zone in priority order and stops at the first one
//! that issues a production command. Decommissions and reinstatements do
//! not stop the walk.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::budget::Budget;
use crate::census::{attack_power, melee_power, ranged_power, RoleCensus};
use crate::config::SchedulerConfig;
use crate::demand::{consumption_mode, node_ideal, Demand, ZoneConditions};
use crate::error::ColonyError;
use crate::memory::ZoneState;
use crate::pathing::PathOracle;
use crate::sizer::{self, SizingDecision};
use crate::units::{Assignment, BuilderTask, ClaimIntent, CombatStyle, Role, Unit, UnitId};
use crate::world::{
    EntityId, Facility, NodeKind, ProduceError, ProductionOrder, StructureKind, World, Zone,
    ZoneName,
};

/// Something the scheduler did to the world this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// A unit was produced.
    Produced {
        /// Role of the new unit.
        role: Role,
        /// Id of the new unit.
        unit: UnitId,
        /// Sizing modules of the new unit.
        size: u32,
    },
    /// A surplus or superseded unit was sent home.
    Decommissioned {
        /// Role of the unit.
        role: Role,
        /// The unit.
        unit: UnitId,
    },
    /// A unit walking home was put back to work.
    Reinstated {
        /// Role of the unit.
        role: Role,
        /// The unit.
        unit: UnitId,
    },
    /// Demand exists but not even the smallest body fits the budget.
    Unaffordable {
        /// Role that could not be produced.
        role: Role,
        /// Cost of the smallest body.
        required: u32,
        /// Energy capacity of the group.
        available: u32,
    },
    /// The production command was refused; retried on a later cycle.
    Deferred {
        /// Role that was to be produced.
        role: Role,
        /// Why the command was refused.
        reason: ProduceError,
    },
}

/// Result of scheduling one zone for one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneOutcome {
    /// Skipped by the recompute throttle.
    Throttled,
    /// Fully evaluated.
    Evaluated {
        /// Whether wartime priorities applied.
        wartime: bool,
        /// What was done, in order.
        actions: Vec<Action>,
    },
    /// The objective is achieved; nothing more will be produced.
    Complete,
    /// Could not be scheduled at all.
    Skipped {
        /// Why.
        reason: String,
    },
}

impl ZoneOutcome {
    /// Outcome for an error that stops the zone from being scheduled.
    #[must_use]
    pub fn skipped(error: &ColonyError) -> Self {
        Self::Skipped {
            reason: error.to_string(),
        }
    }

    /// Actions taken, empty unless evaluated.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        match self {
            Self::Evaluated { actions, .. } => actions,
            Self::Throttled | Self::Complete | Self::Skipped { .. } => &[],
        }
    }

    /// The unit produced this cycle, if any.
    #[must_use]
    pub fn produced(&self) -> Option<(Role, UnitId, u32)> {
        self.actions().iter().find_map(|a| match *a {
            Action::Produced { role, unit, size } => Some((role, unit, size)),
            _ => None,
        })
    }
}

/// State shared by every zone evaluated in one cycle.
pub struct CycleContext<'a> {
    /// Tuned constants.
    pub config: &'a SchedulerConfig,
    /// Path length oracle.
    pub oracle: &'a dyn PathOracle,
    /// Current cycle number.
    pub cycle: u64,
    used_groups: BTreeSet<ZoneName>,
}

impl<'a> CycleContext<'a> {
    /// Start a cycle.
    #[must_use]
    pub fn new(config: &'a SchedulerConfig, oracle: &'a dyn PathOracle, cycle: u64) -> Self {
        Self {
            config,
            oracle,
            cycle,
            used_groups: BTreeSet::new(),
        }
    }

    /// Whether `group` already produced a unit this cycle.
    #[must_use]
    pub fn group_used(&self, group: &ZoneName) -> bool {
        self.used_groups.contains(group)
    }
}

/// Whether the walk over roles continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

/// Extraction nodes of `zone` in the order harvesters are sized for them:
/// energy before mineral, then by path length from the nearest of
/// `facilities`, then nodes with a collector first.
#[must_use]
pub fn harvest_order(
    zone: &Zone,
    facilities: &[Facility],
    oracle: &dyn PathOracle,
) -> Vec<(EntityId, NodeKind)> {
    let mut nodes: Vec<_> = zone
        .active_nodes()
        .map(|node| {
            let distance = facilities
                .iter()
                .filter_map(|f| oracle.locate_path(&f.position, &node.position))
                .min()
                .unwrap_or(u32::MAX);
            let rank = (node.kind != NodeKind::Energy, distance, !node.collector, node.id);
            (rank, (node.id, node.kind))
        })
        .collect();
    nodes.sort_by_key(|(rank, _)| *rank);
    nodes.into_iter().map(|(_, node)| node).collect()
}

/// One zone being served by one facility group.
pub(crate) struct Evaluation<'c, 'a> {
    ctx: &'c mut CycleContext<'a>,
    group: ZoneName,
    zone: ZoneName,
    budget: Budget,
    actions: Vec<Action>,
}

impl<'c, 'a> Evaluation<'c, 'a> {
    pub(crate) fn new(
        ctx: &'c mut CycleContext<'a>,
        group: ZoneName,
        zone: ZoneName,
        budget: Budget,
    ) -> Self {
        Self {
            ctx,
            group,
            zone,
            budget,
            actions: Vec::new(),
        }
    }

    pub(crate) fn config(&self) -> &'a SchedulerConfig {
        self.ctx.config
    }

    pub(crate) fn into_actions(self) -> Vec<Action> {
        self.actions
    }

    /// Size `role` against `ideal` and act on the decision.
    ///
    /// `filter` narrows the census (per-node harvesters); `assignment` is
    /// given to new and reinstated units.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn size_role(
        &mut self,
        world: &mut World,
        role: Role,
        ideal: u32,
        affordable: u32,
        filter: impl Fn(&Unit) -> bool,
        assignment: &Assignment,
        intent: Option<ClaimIntent>,
    ) -> Flow {
        let shape = self.budget.shape(role);
        let census = RoleCensus::take(world, &self.zone, role, shape.primary, filter);
        let decision = sizer::decide(role, ideal, affordable, &census);
        tracing::debug!(
            zone = %self.zone,
            role = ?role,
            ideal,
            current = census.total(),
            affordable,
            decision = ?decision,
            "Sized role"
        );

        match decision {
            SizingDecision::Hold => Flow::Continue,
            SizingDecision::Reinstate(id) => {
                self.reinstate(world, role, id, assignment);
                Flow::Continue
            }
            SizingDecision::Decommission(id) => {
                self.decommission(world, role, id);
                Flow::Continue
            }
            SizingDecision::Unaffordable => {
                self.unaffordable(role, shape.cost(1));
                Flow::Continue
            }
            SizingDecision::Spawn { size, supersedes } => {
                let body = self.budget.compose(role, size);
                if self
                    .produce(world, role, body, size, assignment.clone(), intent)
                    .is_some()
                {
                    for id in supersedes {
                        self.decommission(world, role, id);
                    }
                }
                Flow::Stop
            }
        }
    }

    /// Keep `target` units of `role` in the zone, each as large as the
    /// budget allows but never below `min_size` sizing modules.
    pub(crate) fn ensure_count(
        &mut self,
        world: &mut World,
        role: Role,
        target: usize,
        min_size: u32,
        intent: Option<ClaimIntent>,
    ) -> Flow {
        let present = world
            .query_units(&self.zone, move |u| u.is_counted() && u.role.same_slot(role))
            .count();
        if present >= target {
            return Flow::Continue;
        }

        let size = self.budget.max_affordable(role);
        if size < min_size.max(1) {
            let required = self.budget.shape(role).cost(min_size.max(1));
            self.unaffordable(role, required);
            return Flow::Continue;
        }
        let body = self.budget.compose(role, size);
        self.produce(world, role, body, size, Assignment::Unassigned, intent);
        Flow::Stop
    }

    /// Harvesters, node by node.
    pub(crate) fn harvesters(&mut self, world: &mut World, nodes: &[(EntityId, NodeKind)]) -> Flow {
        let config = self.config();
        let affordable = self.budget.max_affordable(Role::Harvester);
        for &(node, kind) in nodes {
            let assignment = Assignment::Node(node);
            let flow = self.size_role(
                world,
                Role::Harvester,
                node_ideal(kind, config),
                affordable,
                |u| u.assignment == Assignment::Node(node),
                &assignment,
                None,
            );
            if flow == Flow::Stop {
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    /// Transporters, capped in size by whether the zone is claimed.
    pub(crate) fn transporters(&mut self, world: &mut World, demand: &Demand, claimed: bool) -> Flow {
        let config = self.config();
        let cap = if claimed {
            config.transporter_cap_claimed + demand.transporter_size_bonus
        } else {
            config.transporter_cap_unclaimed
        };
        let affordable = self.budget.max_affordable_capped(Role::Transporter, cap);
        self.size_role(
            world,
            Role::Transporter,
            demand.transporter,
            affordable,
            |_| true,
            &Assignment::Unassigned,
            None,
        )
    }

    /// A builder sub-role.
    pub(crate) fn builders(&mut self, world: &mut World, task: BuilderTask, ideal: u32) -> Flow {
        let role = Role::Builder(task);
        let affordable = self.budget.max_affordable(role);
        self.size_role(
            world,
            role,
            ideal,
            affordable,
            |_| true,
            &Assignment::Unassigned,
            None,
        )
    }

    /// Defensive mercenaries until the zone's own force outweighs the
    /// hostiles. The weaker of the colony's melee and ranged sides is
    /// reinforced.
    pub(crate) fn mercenaries(&mut self, world: &mut World) -> Flow {
        let config = self.config();
        let Some(zone) = world.zone(&self.zone) else {
            return Flow::Continue;
        };
        let hostile = attack_power(zone.hostiles.iter().map(|h| &h.body), config.melee_weight);

        let style = {
            let ours: Vec<_> = world
                .query_units(&self.zone, |u| {
                    u.is_counted() && matches!(u.role, Role::Mercenary(_))
                })
                .map(|u| &u.body)
                .collect();
            let own = attack_power(ours.iter().copied(), config.melee_weight);
            if own >= hostile * config.mercenary_margin {
                tracing::debug!(zone = %self.zone, %own, %hostile, "Defence holds");
                return Flow::Continue;
            }
            let melee = melee_power(ours.iter().copied(), config.melee_weight);
            let ranged = ranged_power(ours.iter().copied());
            if melee < ranged {
                CombatStyle::Melee
            } else {
                CombatStyle::Ranged
            }
        };

        let role = Role::Mercenary(style);
        let size = self.budget.max_affordable(role);
        if size == 0 {
            self.unaffordable(role, self.budget.shape(role).cost(1));
            return Flow::Continue;
        }
        let body = self.budget.compose(role, size);
        self.produce(world, role, body, size, Assignment::Unassigned, None);
        Flow::Stop
    }

    /// Issue a production command to the group. Returns the new unit's id.
    pub(crate) fn produce(
        &mut self,
        world: &mut World,
        role: Role,
        body: Body,
        size: u32,
        assignment: Assignment,
        claim_intent: Option<ClaimIntent>,
    ) -> Option<UnitId> {
        if self.ctx.group_used(&self.group) {
            tracing::debug!(group = %self.group, role = ?role, "Group already produced this cycle");
            self.actions.push(Action::Deferred {
                role,
                reason: ProduceError::Busy,
            });
            return None;
        }

        let order = ProductionOrder {
            group: self.group.clone(),
            role,
            body,
            zone: self.zone.clone(),
            assignment,
            claim_intent,
        };
        match world.produce(order) {
            Ok(unit) => {
                self.ctx.used_groups.insert(self.group.clone());
                tracing::info!(
                    zone = %self.zone,
                    group = %self.group,
                    role = ?role,
                    unit,
                    size,
                    cycle = self.ctx.cycle,
                    "Produced unit"
                );
                self.actions.push(Action::Produced { role, unit, size });
                Some(unit)
            }
            Err(reason) => {
                let error = ColonyError::from_produce(reason.clone(), &self.group);
                tracing::debug!(zone = %self.zone, role = ?role, %error, "Production deferred");
                self.actions.push(Action::Deferred { role, reason });
                None
            }
        }
    }

    fn decommission(&mut self, world: &mut World, role: Role, id: UnitId) {
        let Some(unit) = world.unit_mut(id) else {
            tracing::debug!(error = %ColonyError::StaleAssignment(id), "Unit vanished");
            return;
        };
        match unit.decommission() {
            Ok(()) => {
                tracing::info!(zone = %self.zone, role = ?role, unit = id, "Decommissioned unit");
                self.actions.push(Action::Decommissioned { role, unit: id });
            }
            Err(error) => tracing::warn!(%error, "Decommission refused"),
        }
    }

    fn reinstate(&mut self, world: &mut World, role: Role, id: UnitId, assignment: &Assignment) {
        let Some(unit) = world.unit_mut(id) else {
            tracing::debug!(error = %ColonyError::StaleAssignment(id), "Unit vanished");
            return;
        };
        match unit.reinstate() {
            Ok(()) => {
                // Per-node harvesters stay pinned to the node they were counted for.
                if matches!(assignment, Assignment::Node(_)) {
                    unit.assignment = assignment.clone();
                }
                tracing::info!(zone = %self.zone, role = ?role, unit = id, "Reinstated unit");
                self.actions.push(Action::Reinstated { role, unit: id });
            }
            Err(error) => tracing::warn!(%error, "Reinstatement refused"),
        }
    }

    fn unaffordable(&mut self, role: Role, required: u32) {
        let error = ColonyError::InsufficientBudget {
            required,
            available: self.budget.energy,
        };
        tracing::warn!(zone = %self.zone, group = %self.group, role = ?role, %error, "Cannot size unit");
        self.actions.push(Action::Unaffordable {
            role,
            required,
            available: self.budget.energy,
        });
    }
}

/// Schedule a zone that has production facilities of its own.
///
/// `state` is the zone's persisted record; the updated record is returned
/// alongside the outcome.
pub fn schedule_zone(
    ctx: &mut CycleContext<'_>,
    world: &mut World,
    name: &ZoneName,
    mut state: ZoneState,
) -> (ZoneState, ZoneOutcome) {
    let config = ctx.config;
    let Some(zone) = world.zone(name) else {
        return (state, ZoneOutcome::skipped(&ColonyError::UnknownZone(name.clone())));
    };

    let wartime = zone.is_at_war();
    if !wartime && !state.due(ctx.cycle, config.recompute_interval) {
        return (state, ZoneOutcome::Throttled);
    }

    let eligible = zone.is_claimed() && zone.has_structure(StructureKind::Storage);
    state.consumption_mode =
        consumption_mode(state.consumption_mode, zone.stored_total, eligible, config);
    let conditions = ZoneConditions::observe(zone, state.consumption_mode);
    let demand = Demand::compute(&conditions, config);
    let budget = Budget::for_group(zone, config);
    let nodes = harvest_order(zone, &zone.facilities, ctx.oracle);
    state.mark_evaluated(ctx.cycle);

    tracing::debug!(zone = %name, ?demand, wartime, cycle = ctx.cycle, "Evaluating zone");

    let mut eval = Evaluation::new(ctx, name.clone(), name.clone(), budget);
    if wartime && conditions.claimed {
        if eval.transporters(world, &demand, true) == Flow::Continue {
            eval.mercenaries(world);
        }
    } else if wartime {
        eval.ensure_count(world, Role::Ravager, 1, 1, None);
    } else {
        run_economy(&mut eval, world, &demand, &nodes, conditions.claimed);
    }

    let outcome = ZoneOutcome::Evaluated {
        wartime,
        actions: eval.into_actions(),
    };
    (state, outcome)
}

/// Peacetime order: wall-builder, upgrader, harvester, transporter.
pub(crate) fn run_economy(
    eval: &mut Evaluation<'_, '_>,
    world: &mut World,
    demand: &Demand,
    nodes: &[(EntityId, NodeKind)],
    claimed: bool,
) -> Flow {
    if claimed {
        if eval.builders(world, BuilderTask::WallBuilder, demand.wall_builder) == Flow::Stop {
            return Flow::Stop;
        }
        if eval.builders(world, BuilderTask::Upgrader, demand.upgrader) == Flow::Stop {
            return Flow::Stop;
        }
    }
    if eval.harvesters(world, nodes) == Flow::Stop {
        return Flow::Stop;
    }
    eval.transporters(world, demand, claimed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModuleKind;
    use crate::pathing::GridPathOracle;
    use crate::units::Lifecycle;
    use crate::world::{
        ConstructionSite, Controller, ExtractionNode, Hostile, Owner, Ownership, Position,
    };

    fn home() -> ZoneName {
        ZoneName::new("W1N1")
    }

    fn claimed_zone(extensions: u32) -> Zone {
        let mut zone = Zone::new(home());
        zone.extension_count = extensions;
        zone.energy_available = 300 + 50 * extensions;
        zone.facilities.push(Facility {
            id: 1,
            position: Position::new(home(), 25, 25),
            busy_for: 0,
        });
        zone.controller = Some(Controller {
            id: 2,
            position: Position::new(home(), 30, 30),
            ownership: Ownership::Owned(Owner::Colony),
            upgrade_blocked: 0,
        });
        zone.nodes.push(ExtractionNode {
            id: 10,
            kind: NodeKind::Energy,
            position: Position::new(home(), 10, 10),
            capacity: 3000,
            collector: false,
        });
        zone.construction_sites.push(ConstructionSite {
            id: 50,
            kind: StructureKind::Road,
        });
        zone
    }

    fn world(zone: Zone) -> World {
        let mut world = World::new();
        world.insert_zone(zone);
        world
    }

    fn run(world: &mut World, cycle: u64, state: ZoneState) -> (ZoneState, ZoneOutcome) {
        let config = SchedulerConfig::default();
        let mut ctx = CycleContext::new(&config, &GridPathOracle, cycle);
        schedule_zone(&mut ctx, world, &home(), state)
    }

    fn add(world: &mut World, role: Role, body: Body, assignment: Assignment) -> UnitId {
        let id = world.allocate_unit_id();
        world.add_unit(Unit {
            id,
            role,
            home: home(),
            zone: home(),
            body,
            assignment,
            claim_intent: None,
            lifecycle: Lifecycle::Active,
            waiting: false,
            ticks_to_live: 1000,
        })
    }

    #[test]
    fn test_wall_builder_comes_first() {
        let mut w = world(claimed_zone(10));
        let (_, outcome) = run(&mut w, 0, ZoneState::default());
        let (role, _, _) = outcome.produced().unwrap();
        assert_eq!(role, Role::Builder(BuilderTask::WallBuilder));
        assert_eq!(outcome.actions().len(), 1);
    }

    #[test]
    fn test_second_pass_same_cycle_is_refused() {
        let mut w = world(claimed_zone(10));
        w.zone_mut(&home()).unwrap().facilities.push(Facility {
            id: 3,
            position: Position::new(home(), 26, 25),
            busy_for: 0,
        });
        let config = SchedulerConfig::default();
        let mut ctx = CycleContext::new(&config, &GridPathOracle, 0);
        let (state, first) = schedule_zone(&mut ctx, &mut w, &home(), ZoneState::default());
        assert!(first.produced().is_some());

        let mut state = state;
        state.request_refresh();
        let (_, second) = schedule_zone(&mut ctx, &mut w, &home(), state);
        assert!(second.produced().is_none());
        assert!(matches!(
            second.actions().last(),
            Some(Action::Deferred {
                reason: ProduceError::Busy,
                ..
            })
        ));
    }

    #[test]
    fn test_throttle_until_interval() {
        let mut w = world(claimed_zone(10));
        let (state, _) = run(&mut w, 0, ZoneState::default());
        let (state, outcome) = run(&mut w, 5, state);
        assert_eq!(outcome, ZoneOutcome::Throttled);
        let (_, outcome) = run(&mut w, 12, state);
        assert!(matches!(outcome, ZoneOutcome::Evaluated { .. }));
    }

    #[test]
    fn test_harvester_assigned_to_node_once_builders_met() {
        let mut w = world(claimed_zone(20));
        let wall = Body::from_counts(&[(ModuleKind::Labor, 6), (ModuleKind::Mobility, 3)]);
        let upgrade = Body::from_counts(&[(ModuleKind::Labor, 8), (ModuleKind::Mobility, 2)]);
        add(&mut w, Role::Builder(BuilderTask::WallBuilder), wall, Assignment::Unassigned);
        add(&mut w, Role::Builder(BuilderTask::Upgrader), upgrade, Assignment::Unassigned);

        let (_, outcome) = run(&mut w, 0, ZoneState::default());
        let (role, unit, size) = outcome.produced().unwrap();
        assert_eq!(role, Role::Harvester);
        assert_eq!(size, 7);
        assert_eq!(w.unit(unit).unwrap().assignment, Assignment::Node(10));
    }

    #[test]
    fn test_wartime_ignores_throttle_and_prefers_transporters() {
        let mut zone = claimed_zone(10);
        zone.hostiles.push(Hostile {
            id: 99,
            body: Body::from_counts(&[(ModuleKind::Melee, 2)]),
        });
        let mut w = world(zone);
        let mut state = ZoneState::default();
        state.mark_evaluated(0);

        let (_, outcome) = run(&mut w, 1, state);
        assert!(matches!(outcome, ZoneOutcome::Evaluated { wartime: true, .. }));
        assert_eq!(outcome.produced().map(|p| p.0), Some(Role::Transporter));
    }

    #[test]
    fn test_mercenary_reinforces_weaker_side() {
        let mut zone = claimed_zone(20);
        zone.hostiles.push(Hostile {
            id: 99,
            body: Body::from_counts(&[(ModuleKind::Ranged, 30)]),
        });
        let mut w = world(zone);
        let carry = Body::from_counts(&[(ModuleKind::Carry, 14), (ModuleKind::Mobility, 7)]);
        add(&mut w, Role::Transporter, carry, Assignment::Unassigned);
        // Melee power 6 * 1.5 = 9 against ranged power 15.
        let melee = Body::from_counts(&[(ModuleKind::Melee, 6)]);
        add(&mut w, Role::Mercenary(CombatStyle::Melee), melee, Assignment::Unassigned);
        let ranged = Body::from_counts(&[(ModuleKind::Ranged, 15)]);
        add(&mut w, Role::Mercenary(CombatStyle::Ranged), ranged, Assignment::Unassigned);

        let (_, outcome) = run(&mut w, 0, ZoneState::default());
        assert_eq!(outcome.produced().map(|p| p.0), Some(Role::Mercenary(CombatStyle::Melee)));
    }

    #[test]
    fn test_no_mercenaries_once_defence_outweighs_hostiles() {
        let mut zone = claimed_zone(20);
        zone.hostiles.push(Hostile {
            id: 99,
            body: Body::from_counts(&[(ModuleKind::Ranged, 20)]),
        });
        let mut w = world(zone);
        let carry = Body::from_counts(&[(ModuleKind::Carry, 14), (ModuleKind::Mobility, 7)]);
        add(&mut w, Role::Transporter, carry, Assignment::Unassigned);
        let ranged = Body::from_counts(&[(ModuleKind::Ranged, 20)]);
        add(&mut w, Role::Mercenary(CombatStyle::Ranged), ranged, Assignment::Unassigned);

        let (_, outcome) = run(&mut w, 0, ZoneState::default());
        assert_eq!(outcome.produced(), None);
        assert!(outcome.actions().is_empty());
    }

    #[test]
    fn test_harvest_order_energy_first_then_distance() {
        let mut zone = claimed_zone(0);
        zone.structures.push(crate::world::Structure {
            id: 60,
            kind: StructureKind::Extractor,
            position: Position::new(home(), 1, 1),
            hostile: false,
        });
        zone.nodes.push(ExtractionNode {
            id: 11,
            kind: NodeKind::Mineral,
            position: Position::new(home(), 24, 24),
            capacity: 1000,
            collector: false,
        });
        zone.nodes.push(ExtractionNode {
            id: 12,
            kind: NodeKind::Energy,
            position: Position::new(home(), 20, 20),
            capacity: 1000,
            collector: false,
        });
        let order = harvest_order(&zone, &zone.facilities, &GridPathOracle);
        let ids: Vec<_> = order.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![12, 10, 11]);
    }

    #[test]
    fn test_unknown_zone_is_skipped() {
        let mut w = World::new();
        let (_, outcome) = run(&mut w, 0, ZoneState::default());
        assert!(matches!(outcome, ZoneOutcome::Skipped { .. }));
    }
}
