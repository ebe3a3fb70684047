//! The live station registry.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::{Availability, Coordinates, Station, StationId, matches_all};
use crate::geo::{GeoStation, rank_by_distance};

use super::cache::StationCache;
use super::client::{Feed, FeedClient};
use super::decode::{decode_detail, decode_roster};
use super::error::StationError;

/// Default number of detail documents fetched at once by [`StationRegistry::update_all`].
pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Default)]
struct RegistryState {
    stations: HashMap<StationId, Station>,
    refreshed_at: Option<DateTime<Utc>>,
}

/// Thread-safe station registry.
///
/// Holds every known station keyed by id. Cloning is cheap and clones
/// share the same state, so one handle can be given to the web layer and
/// another to the background refresher.
///
/// Fetches run outside the lock; each mutation takes the write lock only
/// long enough to apply decoded data. Readers may therefore see a mix of
/// old and new occupancy across stations while a refresh is running.
pub struct StationRegistry<F = FeedClient> {
    inner: Arc<RwLock<RegistryState>>,
    feed: Arc<F>,
    cache: Option<StationCache>,
    concurrency: usize,
}

impl<F> Clone for StationRegistry<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            feed: Arc::clone(&self.feed),
            cache: self.cache.clone(),
            concurrency: self.concurrency,
        }
    }
}

impl<F: Feed> StationRegistry<F> {
    /// Create an empty registry with caching disabled.
    pub fn new(feed: F) -> Self {
        Self::from_stations(feed, Vec::new())
    }

    /// Create a registry holding the given stations, with caching disabled.
    pub fn from_stations(feed: F, stations: impl IntoIterator<Item = Station>) -> Self {
        let state = RegistryState {
            stations: stations.into_iter().map(|s| (s.id, s)).collect(),
            refreshed_at: None,
        };

        Self {
            inner: Arc::new(RwLock::new(state)),
            feed: Arc::new(feed),
            cache: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Create a registry seeded from the snapshot at `path`, saving back to it.
    ///
    /// A missing snapshot gives an empty registry.
    pub fn load_cache(feed: F, path: impl Into<PathBuf>) -> Result<Self, StationError> {
        let cache = StationCache::new(path);
        let stations = cache.load()?;
        info!(
            path = %cache.path().display(),
            stations = stations.len(),
            "loaded station snapshot"
        );

        Ok(Self::from_stations(feed, stations).with_cache(cache))
    }

    /// Enable caching to the given snapshot.
    pub fn with_cache(mut self, cache: StationCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set how many detail documents [`update_all`](Self::update_all) fetches at once.
    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn cache(&self) -> Option<&StationCache> {
        self.cache.as_ref()
    }

    /// Look up a station, returning the empty station if the id is unknown.
    pub async fn get(&self, id: StationId) -> Station {
        self.lookup(id).await.unwrap_or_default()
    }

    /// Look up a station by id.
    pub async fn lookup(&self, id: StationId) -> Option<Station> {
        let guard = self.inner.read().await;
        guard.stations.get(&id).cloned()
    }

    /// All stations, ascending by id.
    pub async fn list(&self) -> Vec<Station> {
        self.filter(&[]).await
    }

    /// Stations satisfying every filter, ascending by id.
    pub async fn filter(&self, filters: &[Availability]) -> Vec<Station> {
        let mut stations: Vec<Station> = {
            let guard = self.inner.read().await;
            guard
                .stations
                .values()
                .filter(|s| matches_all(filters, s))
                .cloned()
                .collect()
        };
        stations.sort_by_key(|s| s.id);
        stations
    }

    /// Stations satisfying every filter, nearest to `origin` first.
    pub async fn rank_by_distance(
        &self,
        origin: Coordinates,
        filters: &[Availability],
    ) -> Vec<GeoStation> {
        rank_by_distance(self.filter(filters).await, origin)
    }

    /// Get the number of stations in the registry.
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.stations.len()
    }

    /// Check if the registry is empty.
    pub async fn is_empty(&self) -> bool {
        let guard = self.inner.read().await;
        guard.stations.is_empty()
    }

    /// When the roster was last applied successfully.
    pub async fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        let guard = self.inner.read().await;
        guard.refreshed_at
    }

    /// Apply a roster document.
    ///
    /// New stations are inserted; known ones get their identity fields
    /// overwritten and keep their occupancy. The document is decoded in
    /// full before anything is applied, so a decode error leaves the
    /// registry untouched. Returns the number of entries applied.
    pub async fn update_roster(&self, raw: &str) -> Result<usize, StationError> {
        let entries = decode_roster(raw)?;

        let mut guard = self.inner.write().await;
        for entry in &entries {
            guard
                .stations
                .entry(entry.id)
                .and_modify(|s| s.apply_identity(entry))
                .or_insert_with(|| Station::from(entry));
        }
        guard.refreshed_at = Some(Utc::now());

        Ok(entries.len())
    }

    /// Fetch and apply the detail document of one known station.
    ///
    /// Only occupancy fields change. On any failure the station is left
    /// as it was.
    pub async fn update_station(&self, id: StationId) -> Result<(), StationError> {
        if self.lookup(id).await.is_none() {
            return Err(StationError::UnknownStation(id));
        }

        let raw = self.feed.fetch_detail(id).await?;
        let occupancy = decode_detail(&raw)?;
        debug!(%id, bikes = occupancy.bikes, slots = occupancy.slots, "updated station");

        let mut guard = self.inner.write().await;
        let station = guard
            .stations
            .get_mut(&id)
            .ok_or(StationError::UnknownStation(id))?;
        station.apply_occupancy(occupancy);

        Ok(())
    }

    /// Update every known station, collecting failures.
    ///
    /// One station failing never stops the others.
    pub async fn update_all(&self) -> Vec<StationError> {
        let mut ids: Vec<StationId> = {
            let guard = self.inner.read().await;
            guard.stations.keys().copied().collect()
        };
        ids.sort();

        stream::iter(ids)
            .map(|id| self.update_station(id))
            .buffer_unordered(self.concurrency)
            .filter_map(|result| async move { result.err() })
            .collect()
            .await
    }

    /// Fetch and apply the roster, then save the snapshot.
    ///
    /// A [`StationError::Cache`] means the registry itself was updated and
    /// only persisting it failed.
    pub async fn update(&self) -> Result<usize, StationError> {
        let raw = self.feed.fetch_roster().await?;
        let count = self.update_roster(&raw).await?;
        self.save_cache().await?;
        Ok(count)
    }

    /// Merge the registry into the snapshot on disk.
    ///
    /// Does nothing when caching is disabled.
    pub async fn save_cache(&self) -> Result<(), StationError> {
        let Some(cache) = self.cache.clone() else {
            return Ok(());
        };

        let stations = self.list().await;
        let written = tokio::task::spawn_blocking(move || cache.save_merged(&stations))
            .await
            .map_err(|e| StationError::cache(format!("save task failed: {e}")))??;
        debug!(stations = written, "saved station snapshot");

        Ok(())
    }
}
