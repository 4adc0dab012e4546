//! Unit sizer.
//!
//! Reconciles ideal demand, the affordable unit size and the census of a
//! role into one concrete decision.

use serde::{Deserialize, Serialize};

use crate::census::RoleCensus;
use crate::units::{Role, UnitId};

/// Outcome of sizing one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizingDecision {
    /// Produce a unit with `size` sizing modules. Once it is produced, the
    /// `supersedes` units are decommissioned.
    Spawn {
        /// Sizing modules of the new unit.
        size: u32,
        /// Undersized units the new one replaces.
        supersedes: Vec<UnitId>,
    },
    /// Cancel the decommission of a unit still walking home.
    Reinstate(UnitId),
    /// Mark a surplus unit for retirement.
    Decommission(UnitId),
    /// Demand is unmet but not even a single module is affordable.
    Unaffordable,
    /// Nothing to do.
    Hold,
}

/// Decide what to do for `role` given its `ideal` total, the largest
/// `affordable` unit and the current `census`.
#[must_use]
pub fn decide(role: Role, ideal: u32, affordable: u32, census: &RoleCensus) -> SizingDecision {
    let current = census.total();

    if current < ideal {
        // Only a unit that fits back under the ideal is reinstated, so a
        // fresh decommission is never undone on the next evaluation.
        if let Some(unit) = census
            .decommissioned
            .iter()
            .filter(|m| current + m.size <= ideal)
            .max_by_key(|m| (m.size, m.id))
        {
            return SizingDecision::Reinstate(unit.id);
        }
        if affordable == 0 {
            return SizingDecision::Unaffordable;
        }

        let deficit = ideal - current;
        let mut size = deficit.min(affordable);
        if size < affordable && (census.has_undersized(affordable) || affordable >= ideal) {
            size = affordable.min(ideal);
        }

        return SizingDecision::Spawn {
            size,
            supersedes: superseded(census, size, ideal),
        };
    }

    if current > ideal && !role.is_protected() {
        if let Some(unit) = census.most_replaceable() {
            return SizingDecision::Decommission(unit.id);
        }
    }

    SizingDecision::Hold
}

/// Smallest units smaller than `size` whose retirement keeps the role at or
/// below `ideal` once the new unit arrives.
fn superseded(census: &RoleCensus, size: u32, ideal: u32) -> Vec<UnitId> {
    let mut candidates: Vec<_> = census.members.iter().filter(|m| m.size < size).collect();
    candidates.sort_by_key(|m| (m.size, m.ticks_to_live, m.id));

    let mut projected = census.total() + size;
    let mut retired = Vec::new();
    for member in candidates {
        if projected <= ideal {
            break;
        }
        projected -= member.size;
        retired.push(member.id);
    }
    retired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::census::Member;
    use crate::units::BuilderTask;

    fn census(sizes: &[u32]) -> RoleCensus {
        RoleCensus {
            members: sizes
                .iter()
                .enumerate()
                .map(|(i, &size)| Member {
                    id: i as UnitId + 1,
                    size,
                    ticks_to_live: 1000,
                })
                .collect(),
            decommissioned: Vec::new(),
        }
    }

    #[test]
    fn test_consolidation_grows_to_full_size() {
        let decision = decide(Role::Transporter, 10, 10, &census(&[4]));
        assert_eq!(
            decision,
            SizingDecision::Spawn {
                size: 10,
                supersedes: vec![1]
            }
        );
    }

    #[test]
    fn test_plain_deficit_spawns_deficit_when_units_full_size() {
        // Existing unit is already at the affordable size and ideal exceeds it.
        let decision = decide(Role::Harvester, 20, 8, &census(&[8, 8]));
        assert_eq!(
            decision,
            SizingDecision::Spawn {
                size: 4,
                supersedes: vec![]
            }
        );
    }

    #[test]
    fn test_deficit_capped_by_affordable() {
        let decision = decide(Role::Harvester, 20, 6, &census(&[]));
        assert_eq!(
            decision,
            SizingDecision::Spawn {
                size: 6,
                supersedes: vec![]
            }
        );
    }

    #[test]
    fn test_affordable_meets_ideal_spawns_ideal() {
        let decision = decide(Role::Harvester, 7, 10, &census(&[]));
        assert_eq!(
            decision,
            SizingDecision::Spawn {
                size: 7,
                supersedes: vec![]
            }
        );
    }

    #[test]
    fn test_surplus_decommissions_smallest() {
        let decision = decide(Role::Transporter, 10, 10, &census(&[10, 4]));
        assert_eq!(decision, SizingDecision::Decommission(2));
    }

    #[test]
    fn test_oversized_surplus_is_decommissioned() {
        let role = Role::Builder(BuilderTask::Upgrader);
        assert_eq!(decide(role, 1, 10, &census(&[8])), SizingDecision::Decommission(1));
    }

    #[test]
    fn test_partial_surplus_decommissions_then_refills() {
        let decision = decide(Role::Transporter, 8, 5, &census(&[5, 5]));
        assert_eq!(decision, SizingDecision::Decommission(1));

        // The unit walking home does not fit back under the ideal.
        let mut after = census(&[5]);
        after.members[0].id = 2;
        after.decommissioned.push(Member {
            id: 1,
            size: 5,
            ticks_to_live: 1000,
        });
        assert_eq!(
            decide(Role::Transporter, 8, 5, &after),
            SizingDecision::Spawn {
                size: 3,
                supersedes: vec![]
            }
        );
    }

    #[test]
    fn test_colonists_never_decommissioned() {
        let role = Role::Builder(BuilderTask::Colonist { claim: false });
        assert_eq!(decide(role, 0, 5, &census(&[5, 5])), SizingDecision::Hold);
    }

    #[test]
    fn test_exact_demand_holds() {
        assert_eq!(
            decide(Role::Harvester, 7, 7, &census(&[7])),
            SizingDecision::Hold
        );
    }

    #[test]
    fn test_reinstate_before_spawning() {
        let mut c = census(&[3]);
        c.decommissioned.push(Member {
            id: 9,
            size: 4,
            ticks_to_live: 500,
        });
        assert_eq!(
            decide(Role::Builder(BuilderTask::Upgrader), 8, 5, &c),
            SizingDecision::Reinstate(9)
        );
    }

    #[test]
    fn test_unaffordable() {
        assert_eq!(
            decide(Role::Claimer, 3, 0, &census(&[])),
            SizingDecision::Unaffordable
        );
    }
}
