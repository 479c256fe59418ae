//! Postgres-backed document store.
//!
//! Documents live in a single `documents` table keyed by `(collection, id)`
//! with the body in a JSONB column. Filters are translated to SQL with every
//! user-supplied value bound as a parameter.
//!
//! ## Error Mapping
//!
//! Every SQLx error becomes `StoreError::Backend` carrying the driver message
//! unchanged; the failing operation is logged with it.
//!
//! ## Atomicity
//!
//! Each trait method is a single SQL statement, so it is atomic for the rows it
//! touches. Nothing is wrapped in a transaction across calls.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;
use uuid::Uuid;

use agrimarket_core::query::path_segments;
use agrimarket_core::{Condition, DocumentId, Filter, FindOptions, SortKey, SortOrder};

use super::r#trait::{Document, DocumentStore, ID_FIELD, StoreError, StoreResult};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id UUID NOT NULL,
        body JSONB NOT NULL,
        PRIMARY KEY (collection, id)
    )
"#;

/// Postgres-backed document store.
///
/// Uses an SQLx connection pool, which is `Send + Sync` and safe to share.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Wrap an existing pool. The schema is not touched.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url` and make sure the schema exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self, body))]
    async fn insert(&self, collection: &str, mut body: Document) -> StoreResult<DocumentId> {
        body.remove(ID_FIELD);
        let id = DocumentId::new();

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(*id.as_uuid())
            .bind(Json(body))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;

        Ok(id)
    }

    #[instrument(skip(self, options))]
    async fn find(&self, collection: &str, options: &FindOptions) -> StoreResult<Vec<Document>> {
        let mut qb = find_query(collection, options);
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;

        rows.into_iter()
            .map(|row| {
                let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("find", e))?;
                let Json(mut body): Json<Document> =
                    row.try_get("body").map_err(|e| map_sqlx_error("find", e))?;
                body.insert(ID_FIELD.to_string(), JsonValue::String(id.to_string()));
                Ok(body)
            })
            .collect()
    }

    #[instrument(skip(self, filter))]
    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM documents");
        push_where(&mut qb, collection, filter);
        let count: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    #[instrument(skip(self, set))]
    async fn update_by_id(&self, collection: &str, id: DocumentId, mut set: Document) -> StoreResult<bool> {
        set.remove(ID_FIELD);
        let result = sqlx::query(
            "UPDATE documents SET body = body || $3::jsonb WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(*id.as_uuid())
        .bind(Json(set))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_by_id", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, collection: &str, id: DocumentId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_by_id", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, filter))]
    async fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM documents");
        push_where(&mut qb, collection, filter);
        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_many", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn distinct(&self, collection: &str, field: &str) -> StoreResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT body #>> $2::text[] AS value
            FROM documents
            WHERE collection = $1 AND body #>> $2::text[] IS NOT NULL
            ORDER BY value
            "#,
        )
        .bind(collection)
        .bind(path_segments(field))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("distinct", e))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn find_query(collection: &str, options: &FindOptions) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT id, body FROM documents");
    push_where(&mut qb, collection, &options.filter);

    match &options.sort {
        None => {
            qb.push(" ORDER BY id ASC");
        }
        Some(sort) => {
            let order = match sort.order {
                SortOrder::Asc => " ASC NULLS FIRST",
                SortOrder::Desc => " DESC NULLS LAST",
            };
            let id_order = match sort.order {
                SortOrder::Asc => " ASC",
                SortOrder::Desc => " DESC",
            };
            qb.push(" ORDER BY ");
            if let SortKey::Field(field) = &sort.key {
                qb.push("body #> ")
                    .push_bind(path_segments(field))
                    .push("::text[]")
                    .push(order)
                    .push(", ");
            }
            qb.push("id").push(id_order);
        }
    }

    qb.push(" OFFSET ").push_bind(to_i64(options.skip));
    if let Some(limit) = options.limit {
        qb.push(" LIMIT ").push_bind(to_i64(limit));
    }
    qb
}

fn push_where(qb: &mut QueryBuilder<'static, Postgres>, collection: &str, filter: &Filter) {
    qb.push(" WHERE collection = ").push_bind(collection.to_string());

    for condition in filter.conditions() {
        qb.push(" AND ");
        match condition {
            Condition::Eq { field, value } => {
                qb.push("body #> ")
                    .push_bind(path_segments(field))
                    .push("::text[] = ")
                    .push_bind(Json(value.clone()))
                    .push("::jsonb");
            }
            Condition::ContainsAnyIgnoreCase { fields, needle } => {
                if fields.is_empty() {
                    qb.push("FALSE");
                    continue;
                }
                let pattern = format!("%{}%", escape_like(needle));
                qb.push("(");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push("body #>> ")
                        .push_bind(path_segments(field))
                        .push("::text[] ILIKE ")
                        .push_bind(pattern.clone())
                        .push(" ESCAPE '\\'");
                }
                qb.push(")");
            }
            Condition::IdEq(id) => {
                qb.push("id = ").push_bind(*id.as_uuid());
            }
            Condition::IdNe(id) => {
                qb.push("id <> ").push_bind(*id.as_uuid());
            }
        }
    }
}

/// Make `needle` match literally inside an ILIKE pattern.
fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    tracing::error!(operation, error = %err, "document store operation failed");
    StoreError::Backend(err.to_string())
}
