//! Station types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid station id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// Upstream identifier of a docking station.
///
/// # Examples
///
/// ```
/// use overseer_server::domain::StationId;
///
/// let id: StationId = "83".parse().unwrap();
/// assert_eq!(id.get(), 83);
///
/// assert!("".parse::<StationId>().is_err());
/// assert!("-4".parse::<StationId>().is_err());
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(u32);

impl StationId {
    pub const fn new(id: u32) -> Self {
        StationId(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl FromStr for StationId {
    type Err = InvalidStationId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidStationId {
                reason: "must not be empty",
            });
        }
        s.parse::<u32>().map(StationId).map_err(|_| InvalidStationId {
            reason: "must be a non-negative integer",
        })
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// One physical docking point.
///
/// Identity fields (`id`, `name`, `lat`, `lng`) come from the roster feed.
/// Occupancy fields (`address`, `status`, `bikes`, `slots`,
/// `sells_tickets`) come from the per-station detail feed. The two are
/// only ever written through [`Station::apply_identity`] and
/// [`Station::apply_occupancy`] so that neither feed clobbers the other.
///
/// Snapshots written by the older service used Go-style field names;
/// those are accepted on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    #[serde(alias = "ID")]
    pub id: StationId,

    #[serde(alias = "Name")]
    pub name: String,

    #[serde(alias = "Lat")]
    pub lat: f64,

    #[serde(alias = "Lng")]
    pub lng: f64,

    /// Street address, empty until the first detail fetch.
    #[serde(alias = "Adress", default)]
    pub address: String,

    /// Operational code from the provider, passed through untouched.
    #[serde(alias = "Status", default)]
    pub status: i32,

    #[serde(alias = "Bikes", default)]
    pub bikes: u32,

    /// Free docking slots.
    #[serde(alias = "Slots", default)]
    pub slots: u32,

    #[serde(alias = "SellTickets", default)]
    pub sells_tickets: bool,
}

impl Station {
    /// Create a station from roster data, with empty occupancy.
    pub fn new(id: StationId, name: impl Into<String>, at: Coordinates) -> Self {
        Self {
            id,
            name: name.into(),
            lat: at.lat,
            lng: at.lng,
            ..Self::default()
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }

    /// True for the empty record handed out for ids the registry has never seen.
    pub fn is_unknown(&self) -> bool {
        self.name.is_empty() && self.lat == 0.0 && self.lng == 0.0
    }

    /// Overwrite identity fields from a roster entry, keeping occupancy.
    pub fn apply_identity(&mut self, entry: &RosterEntry) {
        self.id = entry.id;
        self.name.clone_from(&entry.name);
        self.lat = entry.lat;
        self.lng = entry.lng;
    }

    /// Overwrite occupancy fields from a detail document, keeping identity.
    pub fn apply_occupancy(&mut self, occupancy: Occupancy) {
        self.address = occupancy.address;
        self.status = occupancy.status;
        self.bikes = occupancy.bikes;
        self.slots = occupancy.slots;
        self.sells_tickets = occupancy.sells_tickets;
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.bikes, self.bikes.saturating_add(self.slots))
    }
}

/// One `<marker>` of the roster document.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub id: StationId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<&RosterEntry> for Station {
    fn from(entry: &RosterEntry) -> Self {
        Station::new(entry.id, entry.name.clone(), Coordinates::new(entry.lat, entry.lng))
    }
}

/// Decoded per-station detail document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occupancy {
    pub address: String,
    pub status: i32,
    pub bikes: u32,
    pub slots: u32,
    pub sells_tickets: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rihour() -> Station {
        Station::new(
            StationId::new(10),
            "RIHOUR",
            Coordinates::new(50.6366, 3.0645),
        )
    }

    #[test]
    fn parse_station_id() {
        assert_eq!("83".parse::<StationId>().unwrap(), StationId::new(83));
        assert_eq!(" 7 ".parse::<StationId>().unwrap(), StationId::new(7));
        assert!("".parse::<StationId>().is_err());
        assert!("abc".parse::<StationId>().is_err());
        assert!("-1".parse::<StationId>().is_err());
        assert!("1.5".parse::<StationId>().is_err());
    }

    #[test]
    fn station_id_debug_and_display() {
        let id = StationId::new(42);
        assert_eq!(format!("{id}"), "42");
        assert_eq!(format!("{id:?}"), "StationId(42)");
    }

    #[test]
    fn default_station_is_unknown() {
        assert!(Station::default().is_unknown());
        assert!(!rihour().is_unknown());
    }

    #[test]
    fn display_shows_bikes_over_capacity() {
        let mut station = rihour();
        station.bikes = 3;
        station.slots = 17;
        assert_eq!(station.to_string(), "RIHOUR (3/20)");
    }

    #[test]
    fn display_saturates_huge_counts() {
        let mut station = rihour();
        station.bikes = u32::MAX;
        station.slots = 2;
        assert_eq!(station.to_string(), format!("RIHOUR ({0}/{0})", u32::MAX));
    }

    #[test]
    fn apply_identity_keeps_occupancy() {
        let mut station = rihour();
        station.apply_occupancy(Occupancy {
            address: "Place Rihour".to_string(),
            status: 1,
            bikes: 4,
            slots: 6,
            sells_tickets: true,
        });

        station.apply_identity(&RosterEntry {
            id: StationId::new(10),
            name: "RIHOUR (renamed)".to_string(),
            lat: 50.0,
            lng: 3.0,
        });

        assert_eq!(station.name, "RIHOUR (renamed)");
        assert_eq!(station.lat, 50.0);
        assert_eq!(station.address, "Place Rihour");
        assert_eq!(station.bikes, 4);
        assert_eq!(station.slots, 6);
        assert!(station.sells_tickets);
    }

    #[test]
    fn apply_occupancy_keeps_identity() {
        let mut station = rihour();
        station.apply_occupancy(Occupancy {
            bikes: 2,
            ..Occupancy::default()
        });
        assert_eq!(station.name, "RIHOUR");
        assert_eq!(station.coordinates(), Coordinates::new(50.6366, 3.0645));
        assert_eq!(station.bikes, 2);
    }

    #[test]
    fn json_uses_camel_case() {
        let json = serde_json::to_value(rihour()).unwrap();
        assert_eq!(json["id"], 10);
        assert_eq!(json["name"], "RIHOUR");
        assert_eq!(json["sellsTickets"], false);
        assert!(json.get("sells_tickets").is_none());
    }

    #[test]
    fn reads_legacy_field_names() {
        let json = r#"{
            "ID": 12, "Name": "GARE LILLE FLANDRES", "Lat": 50.63, "Lng": 3.07,
            "Adress": "Place de la Gare", "Status": 0, "Bikes": 5, "Slots": 11,
            "SellTickets": true
        }"#;
        let station: Station = serde_json::from_str(json).unwrap();
        assert_eq!(station.id, StationId::new(12));
        assert_eq!(station.address, "Place de la Gare");
        assert_eq!(station.slots, 11);
        assert!(station.sells_tickets);
    }

    #[test]
    fn occupancy_fields_default_when_missing() {
        let json = r#"{"id": 3, "name": "X", "lat": 1.0, "lng": 2.0}"#;
        let station: Station = serde_json::from_str(json).unwrap();
        assert_eq!(station.bikes, 0);
        assert_eq!(station.address, "");
    }
}
