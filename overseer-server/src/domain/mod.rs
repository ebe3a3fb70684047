//! Domain types for the bike-share overseer.
//!
//! Stations are keyed by their upstream [`StationId`]. Roster and detail
//! feeds each own a disjoint set of [`Station`] fields; see
//! [`RosterEntry`] and [`Occupancy`].

mod availability;
mod station;

pub use availability::{Availability, matches_all};
pub use station::{Coordinates, InvalidStationId, Occupancy, RosterEntry, Station, StationId};
