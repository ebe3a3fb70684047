//! V'Lille feed client and the live station registry.
//!
//! The registry is filled from two XML endpoints: a roster of every
//! station with its location, and a per-station detail document with
//! occupancy. It is persisted to a JSON snapshot that only ever grows.

mod cache;
mod client;
mod decode;
mod error;
pub mod mock;
mod registry;

pub use cache::StationCache;
pub use client::{Feed, FeedClient, FeedConfig, normalize_declared_charset};
pub use decode::{decode_detail, decode_roster};
pub use error::StationError;
pub use mock::MockFeed;
pub use registry::{DEFAULT_CONCURRENCY, StationRegistry};
