//! # Colony Core
//!
//! Deterministic production scheduler for a multi-zone colony.
//!
//! Once per cycle the scheduler decides, for every managed zone, which
//! worker unit (if any) to produce next, at what size, and which surplus
//! units to retire. It only reads a world snapshot and issues production
//! commands and unit flag changes; movement and combat belong elsewhere.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO beyond explicit load/save of config and state
//! - No randomness
//! - No floating-point math (uses fixed-point)
//!
//! ## Crate Structure
//!
//! - [`budget`] - Largest affordable unit per role
//! - [`demand`] - Ideal module totals per role
//! - [`sizer`] - Reconciles demand, budget and census
//! - [`scheduler`] - Priority walk over the roles of a zone
//! - [`expansion`] - Zones served by another zone's facilities
//! - [`siege`] - Assault force against a single target
//! - [`colony`] - Per-cycle driver
//! - [`memory`] - Persisted scheduling state
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod body;
pub mod budget;
pub mod catalog;
pub mod census;
pub mod colony;
pub mod config;
pub mod demand;
pub mod error;
pub mod expansion;
pub mod math;
pub mod memory;
pub mod pathing;
pub mod scheduler;
pub mod siege;
pub mod sizer;
pub mod units;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::body::{Body, BodyModule};
    pub use crate::budget::Budget;
    pub use crate::catalog::ModuleKind;
    pub use crate::colony::{Colony, CycleReport};
    pub use crate::config::{ColonyConfig, ConfigError, Directive, SchedulerConfig, SiegeConfig};
    pub use crate::demand::{Demand, ZoneConditions};
    pub use crate::error::{ColonyError, Result};
    pub use crate::math::Fixed;
    pub use crate::memory::{ColonyMemory, ZoneState};
    pub use crate::pathing::{GridPathOracle, PathOracle};
    pub use crate::scheduler::{Action, ZoneOutcome};
    pub use crate::sizer::SizingDecision;
    pub use crate::units::{
        Assignment, BuilderTask, ClaimIntent, CombatStyle, Lifecycle, Role, SiegeRole, Unit,
        UnitId,
    };
    pub use crate::world::{
        ConstructionSite, Controller, EntityId, ExtractionNode, Facility, Hostile, NodeKind,
        Owner, Ownership, Position, ProduceError, ProductionOrder, Structure, StructureKind, World,
        Zone, ZoneName,
    };
}
