//! In-memory feed for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::StationId;

use super::client::Feed;
use super::error::StationError;

/// Status reported for documents the mock has no answer for.
const UNAVAILABLE: u16 = 503;

#[derive(Default)]
struct MockDocuments {
    roster: Option<String>,
    details: HashMap<StationId, String>,
    detail_requests: usize,
}

/// Feed serving canned documents.
///
/// Anything not set up answers like an unavailable upstream, so an empty
/// `MockFeed` makes every fetch fail.
#[derive(Clone, Default)]
pub struct MockFeed {
    documents: Arc<Mutex<MockDocuments>>,
}

impl MockFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this roster document.
    pub fn set_roster(&self, xml: impl Into<String>) {
        self.lock().roster = Some(xml.into());
    }

    /// Serve this detail document for `id`.
    pub fn set_detail(&self, id: StationId, xml: impl Into<String>) {
        self.lock().details.insert(id, xml.into());
    }

    /// Make the detail endpoint fail for `id`.
    pub fn remove_detail(&self, id: StationId) {
        self.lock().details.remove(&id);
    }

    /// Number of detail documents requested so far.
    pub fn detail_requests(&self) -> usize {
        self.lock().detail_requests
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockDocuments> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Feed for MockFeed {
    async fn fetch_roster(&self) -> Result<String, StationError> {
        self.lock().roster.clone().ok_or_else(|| StationError::Api {
            status: UNAVAILABLE,
            url: "mock://roster".to_string(),
        })
    }

    async fn fetch_detail(&self, id: StationId) -> Result<String, StationError> {
        let mut docs = self.lock();
        docs.detail_requests += 1;
        docs.details.get(&id).cloned().ok_or_else(|| StationError::Api {
            status: UNAVAILABLE,
            url: format!("mock://station/{id}"),
        })
    }
}

/// Roster document listing the given `(id, name, lat, lng)` markers.
pub fn roster_xml(markers: &[(u32, &str, f64, f64)]) -> String {
    let body: String = markers
        .iter()
        .map(|(id, name, lat, lng)| {
            format!(r#"<marker id="{id}" lat="{lat}" lng="{lng}" name="{name}"/>"#)
        })
        .collect();
    format!(r#"<?xml version="1.0" encoding="utf-8"?><markers>{body}</markers>"#)
}

/// Detail document with the given counts.
pub fn detail_xml(address: &str, bikes: u32, slots: u32, sells_tickets: bool) -> String {
    let paiement = if sells_tickets { "AVEC_TPE" } else { "SANS_TPE" };
    format!(
        "<station><adress>{address}</adress><status>0</status><bikes>{bikes}</bikes>\
         <attachs>{slots}</attachs><paiement>{paiement}</paiement></station>"
    )
}
