//! Background refresh of the station registry.

use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::stations::{Feed, StationRegistry};

/// What one refresh cycle achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Roster could not be fetched or decoded; nothing changed.
    Aborted,
    /// Roster applied and every known station visited.
    Completed {
        /// Entries in the roster document.
        roster: usize,
        /// Stations whose detail update failed.
        failed: usize,
        /// Whether the snapshot was saved.
        cached: bool,
    },
}

/// Run one update-and-cache cycle.
///
/// A snapshot failure is logged and the cycle goes on: the in-memory
/// registry is already up to date. Any other roster failure ends the cycle.
pub async fn refresh_cycle<F: Feed>(registry: &StationRegistry<F>) -> CycleOutcome {
    let start = Instant::now();

    let (roster, cached) = match registry.update().await {
        Ok(count) => (count, true),
        Err(e) if e.is_cache() => {
            warn!(error = %e, "failed to save station snapshot");
            (registry.len().await, false)
        }
        Err(e) => {
            error!(error = %e, "failed to update station roster");
            return CycleOutcome::Aborted;
        }
    };

    let errors = registry.update_all().await;
    if let Some(first) = errors.first() {
        warn!(
            failed = errors.len(),
            first = %first,
            "some stations could not be updated"
        );
    }

    info!(
        stations = roster,
        failed = errors.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "refreshed station data"
    );

    CycleOutcome::Completed {
        roster,
        failed: errors.len(),
        cached,
    }
}

/// Refresh now, then every `period`, forever.
///
/// Each tick runs as its own task without waiting for the previous one,
/// so a slow cycle never delays the schedule. Overlapping cycles are safe:
/// every registry mutation is applied under its own write lock.
pub async fn run_refresher<F: Feed>(registry: StationRegistry<F>, period: Duration) {
    refresh_cycle(&registry).await;

    let mut interval = tokio::time::interval(period);
    interval.tick().await; // First tick is immediate, skip it
    loop {
        interval.tick().await;
        let registry = registry.clone();
        tokio::spawn(async move {
            refresh_cycle(&registry).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationId;
    use crate::stations::StationCache;
    use crate::stations::mock::{MockFeed, detail_xml, roster_xml};
    use tempfile::tempdir;

    fn feed() -> MockFeed {
        let feed = MockFeed::new();
        feed.set_roster(roster_xml(&[(1, "A", 50.0, 3.0), (2, "B", 50.1, 3.1)]));
        feed.set_detail(StationId::new(1), detail_xml("Rue A", 3, 4, true));
        feed
    }

    #[tokio::test]
    async fn cycle_updates_roster_and_details() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.json");
        let registry = StationRegistry::new(feed()).with_cache(StationCache::new(&path));

        let outcome = refresh_cycle(&registry).await;
        assert_eq!(
            outcome,
            CycleOutcome::Completed {
                roster: 2,
                failed: 1,
                cached: true
            }
        );
        assert_eq!(registry.get(StationId::new(1)).await.bikes, 3);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn cycle_aborts_without_roster() {
        let registry = StationRegistry::new(MockFeed::new());
        assert_eq!(refresh_cycle(&registry).await, CycleOutcome::Aborted);
    }

    #[tokio::test]
    async fn cycle_survives_cache_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.json");
        std::fs::write(&path, "not a snapshot").unwrap();
        let registry = StationRegistry::new(feed()).with_cache(StationCache::new(&path));

        let outcome = refresh_cycle(&registry).await;
        assert_eq!(
            outcome,
            CycleOutcome::Completed {
                roster: 2,
                failed: 1,
                cached: false
            }
        );
        assert_eq!(registry.get(StationId::new(1)).await.slots, 4);
    }
}
