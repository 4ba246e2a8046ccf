mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

use async_trait::async_trait;

// ============================================================================
// Storage Abstraction
// ============================================================================
//
// Each service owns exactly one store. Identifiers are assigned by the store
// on insert and never change afterwards.
//
// ============================================================================

/// A record whose identifier is handed out by storage
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> Option<i64>;

    fn assign_id(&mut self, id: i64);
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("record already has identifier {0}")]
    AlreadyAssigned(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Persist a new record and return the identifier assigned to it
    async fn insert(&self, record: E) -> Result<i64, StorageError>;

    /// Every stored record, in storage order
    async fn list_all(&self) -> Result<Vec<E>, StorageError>;
}
