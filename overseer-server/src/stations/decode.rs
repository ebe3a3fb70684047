//! Decoding of the V'Lille XML documents.
//!
//! Roster:
//!
//! ```xml
//! <markers>
//!   <marker id="10" lat="50.6366" lng="3.0645" name="RIHOUR"/>
//! </markers>
//! ```
//!
//! Detail:
//!
//! ```xml
//! <station>
//!   <adress>Place Rihour </adress>
//!   <status>0</status>
//!   <bikes>4</bikes>
//!   <attachs>16</attachs>
//!   <paiement>AVEC_TPE</paiement>
//! </station>
//! ```

use std::str::FromStr;

use roxmltree::{Document, Node};

use crate::domain::{Occupancy, RosterEntry};

use super::error::StationError;

/// Prefix of `paiement` values for stations with a ticket terminal.
const TICKET_TERMINAL_PREFIX: &str = "AVEC_";

/// Decode a roster document into its entries, in document order.
///
/// The whole document is decoded before anything is returned, so a bad
/// marker anywhere fails the roster as a whole.
pub fn decode_roster(xml: &str) -> Result<Vec<RosterEntry>, StationError> {
    let doc = parse_document(xml, "markers")?;

    doc.root_element()
        .children()
        .filter(|n| n.has_tag_name("marker"))
        .map(|marker| -> Result<RosterEntry, StationError> {
            Ok(RosterEntry {
                id: required_attribute(&marker, "id")?,
                lat: required_attribute(&marker, "lat")?,
                lng: required_attribute(&marker, "lng")?,
                name: marker
                    .attribute("name")
                    .ok_or_else(|| StationError::decode("marker without 'name' attribute"))?
                    .to_string(),
            })
        })
        .collect()
}

/// Decode a per-station detail document.
///
/// Missing or empty elements decode to their zero value, which is what
/// the feed means by them.
pub fn decode_detail(xml: &str) -> Result<Occupancy, StationError> {
    let doc = parse_document(xml, "station")?;
    let root = doc.root_element();

    Ok(Occupancy {
        address: child_text(&root, "adress").trim().to_string(),
        status: child_number(&root, "status")?,
        bikes: child_number(&root, "bikes")?,
        slots: child_number(&root, "attachs")?,
        sells_tickets: child_text(&root, "paiement").starts_with(TICKET_TERMINAL_PREFIX),
    })
}

fn parse_document<'a>(xml: &'a str, root: &str) -> Result<Document<'a>, StationError> {
    let doc = Document::parse(xml).map_err(|e| StationError::decode(e.to_string()))?;
    let found = doc.root_element().tag_name().name();
    if found != root {
        return Err(StationError::decode(format!(
            "expected <{root}> root element, found <{found}>"
        )));
    }
    Ok(doc)
}

fn required_attribute<T: FromStr>(node: &Node<'_, '_>, name: &str) -> Result<T, StationError> {
    let raw = node
        .attribute(name)
        .ok_or_else(|| StationError::decode(format!("marker without '{name}' attribute")))?;
    raw.trim()
        .parse()
        .map_err(|_| StationError::decode(format!("invalid '{name}' attribute: {raw:?}")))
}

fn child_text<'a>(node: &Node<'a, '_>, name: &str) -> &'a str {
    node.children()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.text())
        .unwrap_or("")
}

fn child_number<T: FromStr + Default>(node: &Node<'_, '_>, name: &str) -> Result<T, StationError> {
    let raw = child_text(node, name).trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse()
        .map_err(|_| StationError::decode(format!("invalid <{name}> value: {raw:?}")))
}
