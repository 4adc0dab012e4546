//! Persisted scheduling state.
//!
//! One small record per zone, passed into each scheduler invocation and
//! handed back updated. Saved and loaded explicitly at cycle boundaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ColonyError, Result};
use crate::world::{EntityId, ZoneName};

/// Cached proxy facilities serving a zone without its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyCache {
    /// Zone whose facilities act as proxy.
    pub zone: ZoneName,
    /// Facility ids at lookup time.
    pub facilities: Vec<EntityId>,
    /// Cycle of the lookup.
    pub cached_at: u64,
}

impl ProxyCache {
    /// Whether the lookup is still within `ttl` cycles. A lookup stamped
    /// after `cycle` comes from another run and is stale.
    #[must_use]
    pub fn is_fresh(&self, cycle: u64, ttl: u64) -> bool {
        cycle
            .checked_sub(self.cached_at)
            .is_some_and(|age| age < ttl)
    }
}

/// Scheduling state of one zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneState {
    /// Surplus-consumption mode, toggled with hysteresis.
    pub consumption_mode: bool,
    /// Cycle of the last full evaluation.
    pub last_full_evaluation: Option<u64>,
    /// Bypass the recompute throttle on the next cycle.
    pub refresh_requested: bool,
    /// Cached proxy facilities.
    pub proxy: Option<ProxyCache>,
}

impl ZoneState {
    /// Ask for a full evaluation next cycle.
    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    /// Whether the throttle allows a full evaluation at `cycle`. An
    /// evaluation stamped after `cycle` never holds the throttle.
    #[must_use]
    pub fn due(&self, cycle: u64, interval: u64) -> bool {
        self.refresh_requested
            || self
                .last_full_evaluation
                .and_then(|last| cycle.checked_sub(last))
                .map_or(true, |elapsed| elapsed >= interval)
    }

    /// Record a full evaluation.
    pub fn mark_evaluated(&mut self, cycle: u64) {
        self.last_full_evaluation = Some(cycle);
        self.refresh_requested = false;
    }
}

/// Persisted state of the siege scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiegeState {
    /// The target zone has been taken; nothing more is produced.
    pub complete: bool,
    /// The controller downgrader has been produced. It is never replaced.
    pub downgrader_sent: bool,
}

/// All persisted scheduling state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonyMemory {
    /// Per-zone records.
    pub zones: BTreeMap<ZoneName, ZoneState>,
    /// Siege record.
    pub siege: SiegeState,
    /// Last cycle the colony ran.
    pub last_cycle: Option<u64>,
}

impl ColonyMemory {
    /// Take a zone's record out for a scheduler invocation.
    #[must_use]
    pub fn take_zone(&mut self, zone: &ZoneName) -> ZoneState {
        self.zones.remove(zone).unwrap_or_default()
    }

    /// Cycle to resume from.
    #[must_use]
    pub fn next_cycle(&self) -> u64 {
        self.last_cycle.map_or(0, |cycle| cycle.saturating_add(1))
    }

    /// Put a zone's record back after an invocation.
    pub fn store_zone(&mut self, zone: ZoneName, state: ZoneState) {
        self.zones.insert(zone, state);
    }

    /// Externally request a full evaluation of `zone` next cycle.
    pub fn request_refresh(&mut self, zone: &ZoneName) {
        self.zones.entry(zone.clone()).or_default().request_refresh();
    }

    /// Encode for persistence.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| ColonyError::StateEncode(e.to_string()))
    }

    /// Decode persisted state.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| ColonyError::StateDecode(e.to_string()))
    }

    /// Decode persisted state, starting fresh when the blob is unusable.
    #[must_use]
    pub fn from_bytes_or_default(bytes: &[u8]) -> Self {
        match Self::from_bytes(bytes) {
            Ok(memory) => memory,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable scheduler state");
                Self::default()
            }
        }
    }
}
