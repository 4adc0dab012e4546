//! Path length queries.
//!
//! Movement and routing belong to the behavior subsystem; the scheduler
//! only needs a length estimate to rank nodes and proxy facilities.

use crate::world::{Position, ZONE_SIZE};

/// Answers `locatePath(origin, destination)` for the scheduler.
pub trait PathOracle {
    /// Path length in tiles, or `None` when no path exists.
    fn locate_path(&self, origin: &Position, destination: &Position) -> Option<u32>;
}

/// Straight-line oracle on the global tile grid.
///
/// Uses Chebyshev distance, which matches eight-way movement with no
/// obstacles. Zones whose names carry no grid coordinates are only
/// reachable from inside themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridPathOracle;

impl GridPathOracle {
    fn global(position: &Position) -> Option<(i64, i64)> {
        let size = i64::from(ZONE_SIZE);
        let (zx, zy) = position.zone.coords()?;
        Some((
            i64::from(zx) * size + i64::from(position.x),
            i64::from(zy) * size + i64::from(position.y),
        ))
    }
}

impl PathOracle for GridPathOracle {
    fn locate_path(&self, origin: &Position, destination: &Position) -> Option<u32> {
        if origin.zone == destination.zone {
            let dx = i32::from(origin.x) - i32::from(destination.x);
            let dy = i32::from(origin.y) - i32::from(destination.y);
            return Some(dx.unsigned_abs().max(dy.unsigned_abs()));
        }
        let (ax, ay) = Self::global(origin)?;
        let (bx, by) = Self::global(destination)?;
        let distance = (ax - bx).unsigned_abs().max((ay - by).unsigned_abs());
        // Farther than any tile count can express: treat as unreachable.
        u32::try_from(distance).ok()
    }
}
