//! Error types for the colony scheduler.
//!
//! None of these escape a scheduling cycle as a hard failure: the colony
//! runner turns them into a logged [`crate::scheduler::ZoneOutcome`] and moves
//! on to the next zone. Only config and state loading hand them to callers.

use thiserror::Error;

use crate::units::{Lifecycle, UnitId};
use crate::world::{ProduceError, ZoneName};

/// Result type alias using [`ColonyError`].
pub type Result<T> = std::result::Result<T, ColonyError>;

/// Top-level error type for all scheduler errors.
#[derive(Debug, Error)]
pub enum ColonyError {
    /// Target size cannot be afforded even at a single module.
    #[error("Insufficient budget: need {required} energy, have {available}")]
    InsufficientBudget {
        /// Energy required for the smallest useful body.
        required: u32,
        /// Energy the facility group can spend.
        available: u32,
    },

    /// Every facility in the group is already producing.
    #[error("All facilities in {0} are busy")]
    FacilityBusy(ZoneName),

    /// A cached world reference no longer resolves.
    #[error("Stale reference: {0}")]
    StaleAssignment(u64),

    /// A directive names a zone that can never be scheduled as written.
    #[error("Misconfigured directive for {zone}: {reason}")]
    MisconfiguredDirective {
        /// Zone named by the directive.
        zone: ZoneName,
        /// What is wrong with it.
        reason: String,
    },

    /// A unit lifecycle transition that the state machine does not allow.
    #[error("Unit {unit} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        /// Unit being transitioned.
        unit: UnitId,
        /// Current lifecycle state.
        from: Lifecycle,
        /// Requested lifecycle state.
        to: Lifecycle,
    },

    /// Zone is not part of the world snapshot.
    #[error("Unknown zone: {0}")]
    UnknownZone(ZoneName),

    /// Failed to decode persisted scheduler state.
    #[error("Failed to decode scheduler state: {0}")]
    StateDecode(String),

    /// Failed to encode scheduler state.
    #[error("Failed to encode scheduler state: {0}")]
    StateEncode(String),
}

impl ColonyError {
    /// Lift a refused production command for the facility group `group`.
    #[must_use]
    pub fn from_produce(error: ProduceError, group: &ZoneName) -> Self {
        match error {
            ProduceError::Busy => Self::FacilityBusy(group.clone()),
            ProduceError::InsufficientBudget {
                required,
                available,
            } => Self::InsufficientBudget {
                required,
                available,
            },
        }
    }
}
