//! Availability predicates over stations.

use super::Station;

/// Something a rider may need from a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    /// At least one bike to take.
    Bike,
    /// At least one free slot to return a bike to.
    Slot,
    /// A ticket-selling terminal.
    Tickets,
}

impl Availability {
    /// Parse a filter name as used in query strings (`bike`, `slot`, `tickets`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "bike" => Some(Availability::Bike),
            "slot" => Some(Availability::Slot),
            "tickets" => Some(Availability::Tickets),
            _ => None,
        }
    }

    /// Parse a comma-separated filter list, skipping names we don't know.
    pub fn parse_list(list: &str) -> Vec<Self> {
        list.split(',').filter_map(Self::parse).collect()
    }

    pub fn matches(self, station: &Station) -> bool {
        match self {
            Availability::Bike => station.bikes > 0,
            Availability::Slot => station.slots > 0,
            Availability::Tickets => station.sells_tickets,
        }
    }
}

/// True if the station satisfies every filter. An empty filter list matches everything.
pub fn matches_all(filters: &[Availability], station: &Station) -> bool {
    filters.iter().all(|f| f.matches(station))
}
