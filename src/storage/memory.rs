use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Entity, Repository, StorageError};

// ============================================================================
// In-Memory Repository
// ============================================================================
//
// Used when no DATABASE_URL is configured and as the store in tests.
// Identifiers come from a sequence starting at 1; listing keeps insertion
// order.
//
// ============================================================================

pub struct InMemoryRepository<E: Entity> {
    state: RwLock<MemoryState<E>>,
}

struct MemoryState<E> {
    next_id: i64,
    records: Vec<E>,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                next_id: 1,
                records: Vec::new(),
            }),
        }
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn insert(&self, mut record: E) -> Result<i64, StorageError> {
        if let Some(id) = record.id() {
            return Err(StorageError::AlreadyAssigned(id));
        }

        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;

        record.assign_id(id);
        state.records.push(record);

        tracing::debug!(id = id, "Inserted record into in-memory store");
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<E>, StorageError> {
        let state = self.state.read().await;
        Ok(state.records.clone())
    }
}
