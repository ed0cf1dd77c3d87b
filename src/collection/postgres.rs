//! Document-store collection: one JSONB row per item in a per-resource table.

use super::{new_id, stamp, Collection, Document};
use crate::error::AppError;
use crate::store::{ensure_resource_table, ensure_schema, qualified_resource_table};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

pub struct PgCollection {
    pool: PgPool,
    table: String,
}

impl PgCollection {
    /// Open the collection for `resource`, creating its schema and table if missing.
    pub async fn open(pool: PgPool, schema: &str, resource: &str) -> Result<Self, AppError> {
        ensure_schema(&pool, schema).await?;
        ensure_resource_table(&pool, schema, resource).await?;
        Ok(PgCollection {
            pool,
            table: qualified_resource_table(schema, resource),
        })
    }

    /// Insert `seed` only when the table is empty, so restarts do not duplicate it.
    /// Returns the number of rows written.
    pub async fn seed_if_empty(&self, seed: Vec<Document>) -> Result<u64, AppError> {
        if seed.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        let existing: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table))
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Ok(0);
        }
        let sql = format!("INSERT INTO {} (id, document) VALUES ($1, $2)", self.table);
        let mut count = 0u64;
        for doc in seed {
            let id = new_id();
            sqlx::query(&sql)
                .bind(&id)
                .bind(Value::Object(stamp(doc, &id)))
                .execute(&mut *tx)
                .await?;
            count += 1;
        }
        tx.commit().await?;
        Ok(count)
    }
}

#[async_trait]
impl Collection for PgCollection {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn find_all(&self) -> Result<Vec<Value>, AppError> {
        let sql = format!("SELECT document FROM {} ORDER BY seq", self.table);
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query_scalar::<_, Value>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn find_one(&self, id: &str) -> Result<Option<Value>, AppError> {
        let sql = format!("SELECT document FROM {} WHERE id = $1", self.table);
        tracing::debug!(sql = %sql, id = %id, "query");
        let row = sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, doc: Document) -> Result<Value, AppError> {
        let id = new_id();
        let sql = format!(
            "INSERT INTO {} (id, document) VALUES ($1, $2) RETURNING document",
            self.table
        );
        tracing::debug!(sql = %sql, id = %id, "query");
        let row = sqlx::query_scalar::<_, Value>(&sql)
            .bind(&id)
            .bind(Value::Object(stamp(doc, &id)))
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn replace(&self, id: &str, doc: Document) -> Result<Option<Value>, AppError> {
        let sql = format!(
            "UPDATE {} SET document = $2, updated_at = NOW() WHERE id = $1 RETURNING document",
            self.table
        );
        tracing::debug!(sql = %sql, id = %id, "query");
        let row = sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .bind(Value::Object(stamp(doc, id)))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn remove(&self, id: &str) -> Result<Option<Value>, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING document", self.table);
        tracing::debug!(sql = %sql, id = %id, "query");
        let row = sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
