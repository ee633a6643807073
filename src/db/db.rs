// db/db.rs
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use super::fixtures;
use crate::models::complaintmodel::{Complaint, ComplaintEvent};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// In-memory complaint store shared by every handler through `AppState`.
#[derive(Clone)]
pub struct DBClient {
    pub(crate) complaints: Arc<RwLock<Vec<Complaint>>>,
    events: broadcast::Sender<ComplaintEvent>,
}

impl std::fmt::Debug for DBClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DBClient")
            .field("complaints", &"RwLock<Vec<Complaint>>")
            .field("subscribers", &self.events.receiver_count())
            .finish()
    }
}

impl DBClient {
    /// Create an empty store
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        DBClient {
            complaints: Arc::new(RwLock::new(Vec::new())),
            events,
        }
    }

    /// Create a store holding the seed complaints
    pub fn with_fixtures() -> Self {
        let client = DBClient::new();
        if let Ok(mut complaints) = client.complaints.try_write() {
            complaints.extend(fixtures::seed_complaints());
        }
        client
    }

    /// Load the seed complaints if nothing has been stored yet. Returns whether seeding happened.
    pub async fn seed_if_empty(&self) -> bool {
        let mut complaints = self.complaints.write().await;
        if !complaints.is_empty() {
            return false;
        }

        complaints.extend(fixtures::seed_complaints());
        tracing::info!("Seeded {} fixture complaints", complaints.len());
        true
    }

    pub async fn complaint_count(&self) -> usize {
        self.complaints.read().await.len()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ComplaintEvent> {
        self.events.subscribe()
    }

    pub(crate) fn publish(&self, event: ComplaintEvent) {
        // No subscribers is the normal case outside of open event streams.
        if self.events.send(event).is_err() {
            tracing::trace!("No complaint event subscribers");
        }
    }
}

impl Default for DBClient {
    fn default() -> Self {
        DBClient::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixtures_are_loaded_once() {
        let client = DBClient::with_fixtures();
        assert_eq!(client.complaint_count().await, 2);
        assert!(!client.seed_if_empty().await);
        assert_eq!(client.complaint_count().await, 2);
    }

    #[tokio::test]
    async fn empty_store_seeds_on_demand() {
        let client = DBClient::new();
        assert_eq!(client.complaint_count().await, 0);
        assert!(client.seed_if_empty().await);
        assert_eq!(client.complaint_count().await, 2);
    }
}
