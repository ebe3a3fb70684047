//! "Where do I go right now" selection.

use serde::Serialize;

use crate::domain::Availability;

use super::rank::GeoStation;

/// Nearest station for each need, if any station meets it.
///
/// The same station may fill several fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Now {
    pub bike: Option<GeoStation>,
    pub slot: Option<GeoStation>,
    pub ticket: Option<GeoStation>,
}

impl Now {
    fn is_complete(&self) -> bool {
        self.bike.is_some() && self.slot.is_some() && self.ticket.is_some()
    }
}

/// Pick the first station of a nearest-first list for each need.
///
/// Stops scanning once every need is met.
pub fn select_now<'a>(ranked: impl IntoIterator<Item = &'a GeoStation>) -> Now {
    let mut now = Now::default();

    for geo in ranked {
        if now.is_complete() {
            break;
        }
        for (need, slot) in [
            (Availability::Bike, &mut now.bike),
            (Availability::Slot, &mut now.slot),
            (Availability::Tickets, &mut now.ticket),
        ] {
            if slot.is_none() && need.matches(&geo.station) {
                *slot = Some(geo.clone());
            }
        }
    }

    now
}
