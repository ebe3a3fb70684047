//! Distance ranking.

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinates, Station};

/// Mean diameter of the Earth in metres, treated as a sphere.
pub const EARTH_DIAMETER_M: f64 = 12_756_200.0;

/// A station together with its distance from a query point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoStation {
    pub station: Station,
    /// Great-circle distance in metres.
    pub distance: f64,
}

fn hav(theta: f64) -> f64 {
    (theta / 2.0).sin().powi(2)
}

/// Haversine distance in metres between two points.
pub fn distance_between(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = (to.lng - from.lng).to_radians();

    let h = hav(d_lat) + lat1.cos() * lat2.cos() * hav(d_lng);
    // Rounding can push h just past 1 for antipodal points.
    EARTH_DIAMETER_M * h.sqrt().min(1.0).asin()
}

/// Annotate every station with its distance from `origin`, nearest first.
///
/// Equal distances are ordered by station id. Nothing is truncated.
pub fn rank_by_distance(
    stations: impl IntoIterator<Item = Station>,
    origin: Coordinates,
) -> Vec<GeoStation> {
    let mut ranked: Vec<GeoStation> = stations
        .into_iter()
        .map(|station| GeoStation {
            distance: distance_between(origin, station.coordinates()),
            station,
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.station.id.cmp(&b.station.id))
    });
    ranked
}
