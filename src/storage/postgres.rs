use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use super::{Entity, Repository, StorageError};
use crate::customer::Customer;
use crate::notification::Notification;

// ============================================================================
// Postgres Repository
// ============================================================================
//
// One pool per service. Identifiers come from BIGSERIAL columns, so insert
// returns whatever the database handed out.
//
// ============================================================================

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the customer table if it does not exist yet
    pub async fn ensure_customer_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS customer (
                id BIGSERIAL PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create the notification table if it does not exist yet
    pub async fn ensure_notification_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS notification (
                notification_id BIGSERIAL PRIMARY KEY,
                message TEXT NOT NULL,
                sent_at TIMESTAMPTZ NOT NULL,
                sender TEXT NOT NULL,
                target_customer_id BIGINT NOT NULL,
                target_customer_email TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn customer_from_row(row: &PgRow) -> Result<Customer, sqlx::Error> {
    Ok(Customer {
        id: Some(row.try_get("id")?),
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
    })
}

fn notification_from_row(row: &PgRow) -> Result<Notification, sqlx::Error> {
    Ok(Notification {
        notification_id: Some(row.try_get("notification_id")?),
        message: row.try_get("message")?,
        sent_at: row.try_get("sent_at")?,
        sender: row.try_get("sender")?,
        target_customer_id: row.try_get("target_customer_id")?,
        target_customer_email: row.try_get("target_customer_email")?,
    })
}

#[async_trait]
impl Repository<Customer> for PgRepository {
    async fn insert(&self, record: Customer) -> Result<i64, StorageError> {
        if let Some(id) = record.id() {
            return Err(StorageError::AlreadyAssigned(id));
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO customer (first_name, last_name, email) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<Customer>, StorageError> {
        let rows = sqlx::query("SELECT id, first_name, last_name, email FROM customer ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(customer_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::from)
    }
}

#[async_trait]
impl Repository<Notification> for PgRepository {
    async fn insert(&self, record: Notification) -> Result<i64, StorageError> {
        if let Some(id) = record.id() {
            return Err(StorageError::AlreadyAssigned(id));
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO notification \
             (message, sent_at, sender, target_customer_id, target_customer_email) \
             VALUES ($1, $2, $3, $4, $5) RETURNING notification_id",
        )
        .bind(&record.message)
        .bind(record.sent_at)
        .bind(&record.sender)
        .bind(record.target_customer_id)
        .bind(&record.target_customer_email)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<Notification>, StorageError> {
        let rows = sqlx::query(
            "SELECT notification_id, message, sent_at, sender, target_customer_id, target_customer_email \
             FROM notification ORDER BY notification_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(notification_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::from)
    }
}
