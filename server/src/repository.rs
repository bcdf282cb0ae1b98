//! In-memory Record Store.
//!
//! # Design
//! The id counter and the record map sit behind one `RwLock`, and `save`
//! takes the next id and inserts under a single write guard. A record is
//! therefore never visible before its id has been handed out, and two
//! concurrent saves can never draw the same id. Readers share the lock.
//!
//! Ids live in `1..=u64::MAX`. The counter saturates at the top instead of
//! wrapping to 0; a store that gets there keeps handing out `u64::MAX`.

use std::collections::HashMap;
use std::sync::Arc;

use thing_core::{Thing, ThingId};
use tokio::sync::RwLock;

const FIRST_ID: u64 = 1;

#[derive(Debug)]
struct Records {
    next_id: u64,
    things: HashMap<ThingId, Thing>,
}

impl Default for Records {
    fn default() -> Self {
        Self {
            next_id: FIRST_ID,
            things: HashMap::new(),
        }
    }
}

/// Cloneable handle to one store; clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct ThingRepository {
    records: Arc<RwLock<Records>>,
}

impl ThingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn save(&self, thing: Thing) -> ThingId {
        let mut records = self.records.write().await;
        let id = ThingId::new(records.next_id);
        records.next_id = match records.next_id.checked_add(1) {
            Some(next) => next,
            None => {
                tracing::error!(%id, "id space exhausted");
                records.next_id
            }
        };
        records.things.insert(id, thing);
        id
    }

    pub async fn get(&self, id: ThingId) -> Option<Thing> {
        self.records.read().await.things.get(&id).cloned()
    }

    /// Drop every record and restart numbering at `next_id`, raised to 1 if
    /// it is 0.
    ///
    /// Test fixture only; no route reaches it.
    pub async fn reset(&self, next_id: u64) {
        let next_id = next_id.max(FIRST_ID);
        let mut records = self.records.write().await;
        records.things.clear();
        records.next_id = next_id;
        tracing::debug!(next_id, "store reset");
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.things.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
