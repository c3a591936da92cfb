//! SQL access for example entities.

use sqlx::PgPool;
use thiserror::Error;
use tracing::{Instrument, Span};
use uuid::Uuid;

use crate::example::entity::{ExampleEntity, ExamplePage, ExampleRequest};
use crate::query::QueryData;

const TABLE: &str = "example_entity";
const COLUMNS: &str = "id, title, description, status, enabled, created_on, modified_on";

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("example {0} not found")]
    NotFound(Uuid),

    #[error("unsupported sort attribute '{0}'")]
    InvalidSort(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Maps an API sort attribute onto a column. Anything else is rejected so
/// the attribute never reaches the SQL text unchecked.
pub fn sort_column(attr: &str) -> Option<&'static str> {
    match attr {
        "title" => Some("title"),
        "status" => Some("status"),
        "enabled" => Some("enabled"),
        "created_on" | "createdOn" => Some("created_on"),
        "modified_on" | "modifiedOn" => Some("modified_on"),
        _ => None,
    }
}

pub fn list_sql(query: &QueryData) -> Result<String, RepoError> {
    let column = sort_column(&query.sorting.attr)
        .ok_or_else(|| RepoError::InvalidSort(query.sorting.attr.clone()))?;
    Ok(format!(
        "SELECT {COLUMNS} FROM {TABLE} WHERE deleted = false ORDER BY {column} {order}, id LIMIT $1 OFFSET $2",
        order = query.sorting.order.as_sql(),
    ))
}

/// Repository over the shared connection pool.
#[derive(Debug, Clone)]
pub struct ExampleRepository {
    pool: PgPool,
    span: Span,
}

impl ExampleRepository {
    pub fn new(pool: PgPool, span: Span) -> Self {
        Self { pool, span }
    }

    pub async fn list(&self, query: &QueryData) -> Result<ExamplePage, RepoError> {
        let sql = list_sql(query)?;
        async {
            let items = sqlx::query_as::<_, ExampleEntity>(&sql)
                .bind(i64::from(query.paging.limit))
                .bind(i64::from(query.paging.offset))
                .fetch_all(&self.pool)
                .await?;
            let total: i64 = sqlx::query_scalar(&format!(
                "SELECT count(*) FROM {TABLE} WHERE deleted = false"
            ))
            .fetch_one(&self.pool)
            .await?;

            tracing::debug!(count = items.len(), total, "listed examples");
            Ok::<_, RepoError>(ExamplePage {
                items,
                limit: query.paging.limit,
                offset: query.paging.offset,
                total,
            })
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn detail(&self, id: Uuid) -> Result<ExampleEntity, RepoError> {
        sqlx::query_as::<_, ExampleEntity>(&format!(
            "SELECT {COLUMNS} FROM {TABLE} WHERE id = $1 AND deleted = false"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .instrument(self.span.clone())
        .await?
        .ok_or(RepoError::NotFound(id))
    }

    pub async fn create(&self, data: &ExampleRequest) -> Result<ExampleEntity, RepoError> {
        let entity = sqlx::query_as::<_, ExampleEntity>(&format!(
            "INSERT INTO {TABLE} (id, title, description, status, enabled) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(data.title.trim())
        .bind(data.description.as_deref())
        .bind(data.status)
        .bind(data.enabled)
        .fetch_one(&self.pool)
        .instrument(self.span.clone())
        .await?;

        self.span.in_scope(|| tracing::info!(id = %entity.id, "example created"));
        Ok(entity)
    }

    pub async fn update(&self, id: Uuid, data: &ExampleRequest) -> Result<ExampleEntity, RepoError> {
        sqlx::query_as::<_, ExampleEntity>(&format!(
            "UPDATE {TABLE} SET title = $2, description = $3, status = $4, enabled = $5, \
             modified_on = now() WHERE id = $1 AND deleted = false RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(data.title.trim())
        .bind(data.description.as_deref())
        .bind(data.status)
        .bind(data.enabled)
        .fetch_optional(&self.pool)
        .instrument(self.span.clone())
        .await?
        .ok_or(RepoError::NotFound(id))
    }

    /// Soft delete.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query(&format!(
            "UPDATE {TABLE} SET deleted = true, modified_on = now() WHERE id = $1 AND deleted = false"
        ))
        .bind(id)
        .execute(&self.pool)
        .instrument(self.span.clone())
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(id));
        }
        self.span.in_scope(|| tracing::info!(id = %id, "example deleted"));
        Ok(())
    }
}
