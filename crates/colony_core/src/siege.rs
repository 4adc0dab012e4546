//! Siege scheduler.
//!
//! Keeps a fixed assault force on one target zone until its controller
//! belongs to the colony, and sends a single downgrader once the target is
//! defenceless.

use crate::budget::Budget;
use crate::config::SiegeConfig;
use crate::error::ColonyError;
use crate::memory::SiegeState;
use crate::scheduler::{Action, CycleContext, Evaluation, Flow, ZoneOutcome};
use crate::units::{ClaimIntent, Role, SiegeRole};
use crate::world::{Owner, Ownership, StructureKind, World};

/// Whether the target is ready for a downgrader: explored, held by another
/// party, no hostile tower or production facility left, and the
/// controller's upgrade block nearly over.
fn downgrade_ready(world: &World, config: &SiegeConfig) -> bool {
    let Some(zone) = world.zone(&config.target) else {
        return false;
    };
    let Some(controller) = &zone.controller else {
        return false;
    };
    let foreign = matches!(controller.ownership, Ownership::Owned(Owner::Other(_)));
    let defended = world
        .query_structures(&config.target, |kind| {
            matches!(kind, StructureKind::Tower | StructureKind::Facility)
        })
        .any(|s| s.hostile);
    foreign && !defended && controller.upgrade_blocked < config.downgrade_below
}

/// Run the siege for one cycle.
pub fn schedule_siege(
    ctx: &mut CycleContext<'_>,
    world: &mut World,
    config: &SiegeConfig,
    state: &mut SiegeState,
) -> ZoneOutcome {
    if state.complete {
        return ZoneOutcome::Complete;
    }
    if world.zone(&config.target).is_some_and(|z| z.is_claimed()) {
        tracing::info!(zone = %config.target, "Siege objective taken");
        state.complete = true;
        return ZoneOutcome::Complete;
    }
    let Some(home) = world.zone(&config.home) else {
        return ZoneOutcome::skipped(&ColonyError::UnknownZone(config.home.clone()));
    };

    let budget = Budget::for_group(home, ctx.config);
    let ready = downgrade_ready(world, config);
    let mut eval = Evaluation::new(ctx, config.home.clone(), config.target.clone(), budget);

    let force = [
        (SiegeRole::Assault, config.targets.assault),
        (SiegeRole::Medic, config.targets.medic),
        (SiegeRole::Skirmisher, config.targets.skirmisher),
    ];
    let mut flow = Flow::Continue;
    for (role, target) in force {
        flow = eval.ensure_count(world, Role::Siege(role), target as usize, 1, None);
        if flow == Flow::Stop {
            break;
        }
    }
    if flow == Flow::Continue && ready && !state.downgrader_sent {
        eval.ensure_count(
            world,
            Role::Siege(SiegeRole::Downgrader),
            1,
            1,
            Some(ClaimIntent::Attack),
        );
    }

    let actions = eval.into_actions();
    if actions.iter().any(|action| {
        matches!(
            action,
            Action::Produced {
                role: Role::Siege(SiegeRole::Downgrader),
                ..
            }
        )
    }) {
        state.downgrader_sent = true;
    }
    ZoneOutcome::Evaluated {
        wartime: true,
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SchedulerConfig, SiegeTargets};
    use crate::pathing::GridPathOracle;
    use crate::world::{Controller, Facility, Position, Structure, Zone, ZoneName};

    fn siege() -> SiegeConfig {
        SiegeConfig {
            target: ZoneName::new("W5N5"),
            home: ZoneName::new("W1N1"),
            targets: SiegeTargets::default(),
            downgrade_below: 250,
        }
    }

    fn world(ownership: Ownership, upgrade_blocked: u32) -> World {
        let cfg = siege();
        let mut home = Zone::new(cfg.home.clone());
        home.extension_count = 40;
        home.energy_available = 2300;
        home.facilities.push(Facility {
            id: 1,
            position: Position::new(cfg.home.clone(), 25, 25),
            busy_for: 0,
        });
        let mut target = Zone::new(cfg.target.clone());
        target.controller = Some(Controller {
            id: 2,
            position: Position::new(cfg.target.clone(), 20, 20),
            ownership,
            upgrade_blocked,
        });
        let mut world = World::new();
        world.insert_zone(home);
        world.insert_zone(target);
        world
    }

    fn run(world: &mut World, state: &mut SiegeState) -> ZoneOutcome {
        let config = SchedulerConfig::default();
        let mut ctx = CycleContext::new(&config, &GridPathOracle, 0);
        schedule_siege(&mut ctx, world, &siege(), state)
    }

    fn refill(world: &mut World) {
        let home = world.zone_mut(&siege().home).unwrap();
        home.facilities[0].busy_for = 0;
        home.energy_available = home.energy_capacity();
    }

    fn rival() -> Ownership {
        Ownership::Owned(Owner::Other("rival".into()))
    }

    #[test]
    fn test_assault_unit_first() {
        let mut w = world(rival(), 0);
        let outcome = run(&mut w, &mut SiegeState::default());
        let (role, unit, _) = outcome.produced().unwrap();
        assert_eq!(role, Role::Siege(SiegeRole::Assault));
        assert_eq!(w.unit(unit).unwrap().zone, siege().target);
    }

    #[test]
    fn test_downgrader_once_defences_fall() {
        let mut w = world(rival(), 100);
        let mut state = SiegeState::default();
        run(&mut w, &mut state);
        refill(&mut w);

        let outcome = run(&mut w, &mut state);
        let (role, unit, _) = outcome.produced().unwrap();
        assert_eq!(role, Role::Siege(SiegeRole::Downgrader));
        assert_eq!(w.unit(unit).unwrap().claim_intent, Some(ClaimIntent::Attack));

        // Only one.
        assert!(state.downgrader_sent);
        refill(&mut w);
        assert_eq!(run(&mut w, &mut state).produced(), None);
    }

    #[test]
    fn test_lost_downgrader_is_not_replaced() {
        let mut w = world(rival(), 100);
        let mut state = SiegeState::default();
        run(&mut w, &mut state);
        refill(&mut w);
        let (_, unit, _) = run(&mut w, &mut state).produced().unwrap();

        w.unit_mut(unit).unwrap().retire().unwrap();
        w.prune_retired();
        refill(&mut w);
        assert_eq!(run(&mut w, &mut state).produced(), None);
    }

    #[test]
    fn test_no_downgrader_while_tower_stands() {
        let mut w = world(rival(), 100);
        w.zone_mut(&siege().target).unwrap().structures.push(Structure {
            id: 9,
            kind: StructureKind::Tower,
            position: Position::new(siege().target, 1, 1),
            hostile: true,
        });
        let mut state = SiegeState::default();
        run(&mut w, &mut state);
        refill(&mut w);
        assert_eq!(run(&mut w, &mut state).produced(), None);
    }

    #[test]
    fn test_no_downgrader_while_upgrade_blocked() {
        let mut w = world(rival(), 250);
        assert!(!downgrade_ready(&w, &siege()));
        w.zone_mut(&siege().target)
            .unwrap()
            .controller
            .as_mut()
            .unwrap()
            .upgrade_blocked = 249;
        assert!(downgrade_ready(&w, &siege()));
    }

    #[test]
    fn test_stops_for_good_once_target_is_ours() {
        let mut w = world(Ownership::Owned(Owner::Colony), 0);
        let mut state = SiegeState::default();
        assert_eq!(run(&mut w, &mut state), ZoneOutcome::Complete);
        assert!(state.complete);

        w.zone_mut(&siege().target).unwrap().controller.as_mut().unwrap().ownership = rival();
        assert_eq!(run(&mut w, &mut state), ZoneOutcome::Complete);
        assert_eq!(w.units().count(), 0);
    }
}
