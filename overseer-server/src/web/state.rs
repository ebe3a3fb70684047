//! Application state for the web layer.

use crate::stations::StationRegistry;

/// Shared application state.
///
/// The registry handle shares its data with the background refresher, so
/// handlers always see the latest applied updates.
#[derive(Clone)]
pub struct AppState {
    /// Live station registry
    pub registry: StationRegistry,
}

impl AppState {
    /// Create a new app state.
    pub fn new(registry: StationRegistry) -> Self {
        Self { registry }
    }
}
