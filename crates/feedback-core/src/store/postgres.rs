// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! PostgreSQL storage backend.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use super::FeedbackStore;
use crate::error::StorageResult;
use crate::types::{Feedback, FeedbackId, FeedbackInput, Page, PageRequest};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS feedbacks (
    id            UUID PRIMARY KEY,
    customer_name TEXT NOT NULL,
    email         TEXT NOT NULL,
    feedback_text TEXT NOT NULL,
    source        TEXT NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL,
    updated_at    TIMESTAMPTZ NOT NULL
)
"#;

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_feedbacks_created_at ON feedbacks (created_at, id)";

const SELECT_COLUMNS: &str =
    "SELECT id, customer_name, email, feedback_text, source, created_at, updated_at FROM feedbacks";

#[derive(Debug, FromRow)]
struct FeedbackRow {
    id: Uuid,
    customer_name: String,
    email: String,
    feedback_text: String,
    source: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Self {
            id: FeedbackId::from_uuid(row.id),
            customer_name: row.customer_name,
            email: row.email,
            feedback_text: row.feedback_text,
            source: row.source,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL-backed feedback table.
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Connects to `url` and ensures the table exists.
    pub async fn connect(url: &str, max_connections: u32) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::info!(max_connections, "Connected to PostgreSQL feedback store");
        Ok(store)
    }

    /// Wraps an existing pool without running migrations.
    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Creates the table and ordering index if absent.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl FeedbackStore for PostgresStore {
    async fn create(&self, input: &FeedbackInput) -> StorageResult<Feedback> {
        let record = Feedback::from_input(FeedbackId::new(), input, column_timestamp(Utc::now()));

        sqlx::query(
            r#"
            INSERT INTO feedbacks (id, customer_name, email, feedback_text, source, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*record.id.as_uuid())
        .bind(&record.customer_name)
        .bind(&record.email)
        .bind(&record.feedback_text)
        .bind(&record.source)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(feedback_id = %record.id, "Stored feedback in PostgreSQL");
        Ok(record)
    }

    async fn get_by_id(&self, id: FeedbackId) -> StorageResult<Option<Feedback>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
        let row = sqlx::query_as::<_, FeedbackRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Feedback::from))
    }

    async fn get_all(&self) -> StorageResult<Vec<Feedback>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at, id");
        let rows = sqlx::query_as::<_, FeedbackRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Feedback::from).collect())
    }

    async fn get_page(&self, request: PageRequest) -> StorageResult<Page> {
        let limit = i64::try_from(request.limit).unwrap_or(i64::MAX);

        // An unknown cursor makes the subquery yield no row, so the row-value
        // comparison is NULL and the page comes back empty.
        let rows = match request.cursor {
            None => {
                let sql = format!("{SELECT_COLUMNS} ORDER BY created_at, id LIMIT $1");
                sqlx::query_as::<_, FeedbackRow>(&sql)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
            Some(cursor) => {
                let sql = format!(
                    "{SELECT_COLUMNS} WHERE (created_at, id) > \
                     (SELECT created_at, id FROM feedbacks WHERE id = $1) \
                     ORDER BY created_at, id LIMIT $2"
                );
                sqlx::query_as::<_, FeedbackRow>(&sql)
                    .bind(*cursor.as_uuid())
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(Page::new(rows.into_iter().map(Feedback::from).collect()))
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

/// `TIMESTAMPTZ` keeps microseconds; the returned record must match a
/// later read of the same row.
fn column_timestamp(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}
