//! Proximity queries over stations.
//!
//! [`rank_by_distance`] sorts stations by great-circle distance from a
//! point; [`select_now`] picks the nearest station for each of the things
//! a rider may need right now.

mod now;
mod rank;

pub use now::{Now, select_now};
pub use rank::{EARTH_DIAMETER_M, GeoStation, distance_between, rank_by_distance};
