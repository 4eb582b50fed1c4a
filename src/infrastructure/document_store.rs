use actix_web::web;
use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::upsert::excluded;
use serde_json::Value;

use crate::db::DbPool;
use crate::domain::errors::StoreError;
use crate::domain::ports::{Document, DocumentStore, StoredDocument};
use crate::schema::documents;

use super::models::{DocumentRow, NewDocumentRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for StoreError {
    fn from(e: diesel::result::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(e: r2d2::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

fn into_document(data: Value) -> Result<Document, StoreError> {
    match data {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::Backend(format!(
            "stored document is not a JSON object: {other}"
        ))),
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

fn get_document(
    conn: &mut PgConnection,
    collection: &str,
    id: &str,
) -> Result<Option<Document>, StoreError> {
    documents::table
        .filter(documents::collection.eq(collection))
        .filter(documents::id.eq(id))
        .select(documents::data)
        .first::<Value>(conn)
        .optional()?
        .map(into_document)
        .transpose()
}

fn set_document(
    conn: &mut PgConnection,
    collection: &str,
    id: &str,
    document: Document,
) -> Result<(), StoreError> {
    diesel::insert_into(documents::table)
        .values(&NewDocumentRow {
            collection: collection.to_string(),
            id: id.to_string(),
            data: Value::Object(document),
            updated_at: Utc::now(),
        })
        .on_conflict((documents::collection, documents::id))
        .do_update()
        .set((
            documents::data.eq(excluded(documents::data)),
            documents::updated_at.eq(excluded(documents::updated_at)),
        ))
        .execute(conn)?;
    Ok(())
}

fn update_document(
    conn: &mut PgConnection,
    collection: &str,
    id: &str,
    fields: Document,
) -> Result<(), StoreError> {
    conn.transaction::<_, StoreError, _>(|conn| {
        let current = documents::table
            .filter(documents::collection.eq(collection))
            .filter(documents::id.eq(id))
            .select(documents::data)
            .for_update()
            .first::<Value>(conn)
            .optional()?;

        let Some(current) = current else {
            return Err(StoreError::Missing(id.to_string()));
        };

        let mut document = into_document(current)?;
        document.extend(fields);

        diesel::update(
            documents::table
                .filter(documents::collection.eq(collection))
                .filter(documents::id.eq(id)),
        )
        .set((
            documents::data.eq(Value::Object(document)),
            documents::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;
        Ok(())
    })
}

fn delete_document(conn: &mut PgConnection, collection: &str, id: &str) -> Result<(), StoreError> {
    let deleted = diesel::delete(
        documents::table
            .filter(documents::collection.eq(collection))
            .filter(documents::id.eq(id)),
    )
    .execute(conn)?;

    if deleted == 0 {
        return Err(StoreError::Missing(id.to_string()));
    }
    Ok(())
}

fn list_documents(conn: &mut PgConnection, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
    let rows = documents::table
        .filter(documents::collection.eq(collection))
        .select(DocumentRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| {
            Ok(StoredDocument {
                id: row.id,
                data: into_document(row.data)?,
            })
        })
        .collect()
}

// ── Store ────────────────────────────────────────────────────────────────────

/// One collection of JSONB documents in PostgreSQL.
pub struct DieselDocumentStore {
    pool: DbPool,
    collection: String,
}

impl DieselDocumentStore {
    pub fn new(pool: DbPool, collection: impl Into<String>) -> Self {
        Self {
            pool,
            collection: collection.into(),
        }
    }

    /// Runs `op` with a pooled connection on the blocking thread pool.
    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut PgConnection, &str) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let collection = self.collection.clone();
        web::block(move || {
            let mut conn = pool.get()?;
            op(&mut *conn, collection.as_str())
        })
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
    }
}

#[async_trait]
impl DocumentStore for DieselDocumentStore {
    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let id = id.to_string();
        self.run(move |conn, collection| get_document(conn, collection, &id))
            .await
    }

    async fn set(&self, id: &str, document: Document) -> Result<(), StoreError> {
        let id = id.to_string();
        self.run(move |conn, collection| set_document(conn, collection, &id, document))
            .await
    }

    async fn update(&self, id: &str, fields: Document) -> Result<(), StoreError> {
        let id = id.to_string();
        self.run(move |conn, collection| update_document(conn, collection, &id, fields))
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        self.run(move |conn, collection| delete_document(conn, collection, &id))
            .await
    }

    async fn list_all(&self) -> Result<Vec<StoredDocument>, StoreError> {
        self.run(list_documents).await
    }
}
