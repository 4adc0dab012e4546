//! Budget calculator.
//!
//! Converts a facility group's energy capacity into the largest unit of
//! each role it can afford. Pure function of the current snapshot.

use crate::body::Body;
use crate::catalog::RoleShape;
use crate::config::SchedulerConfig;
use crate::units::Role;
use crate::world::Zone;

/// Affordability for one facility group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    /// `300 + 50 * extensions` of the group.
    pub energy: u32,
    second_carry_at: u32,
}

impl Budget {
    /// Budget of an explicit energy capacity.
    #[must_use]
    pub const fn new(energy: u32, second_carry_at: u32) -> Self {
        Self {
            energy,
            second_carry_at,
        }
    }

    /// Budget of the facility group in `group`.
    #[must_use]
    pub fn for_group(group: &Zone, config: &SchedulerConfig) -> Self {
        Self::new(group.energy_capacity(), config.second_carry_at)
    }

    /// Body shape of `role` under this budget's carry threshold.
    #[must_use]
    pub fn shape(&self, role: Role) -> RoleShape {
        RoleShape::for_role(role, self.second_carry_at)
    }

    /// Largest primary-module count of `role` that fits the budget.
    #[must_use]
    pub fn max_affordable(&self, role: Role) -> u32 {
        self.max_affordable_capped(role, u32::MAX)
    }

    /// Largest primary-module count of `role` that fits the budget and `cap`.
    #[must_use]
    pub fn max_affordable_capped(&self, role: Role, cap: u32) -> u32 {
        self.shape(role).max_affordable(self.energy, cap)
    }

    /// Body of `role` with `size` primary modules.
    #[must_use]
    pub fn compose(&self, role: Role, size: u32) -> Body {
        Body::from_counts(&self.shape(role).composition(size))
    }
}
