use async_trait::async_trait;
use serde_json::{Map, Value};

use super::errors::{IdentityError, StoreError};
use super::principal::{Principal, UserRecord};

/// A schemaless JSON document as held by the store.
pub type Document = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Document,
}

/// One collection of a document database.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError>;
    /// Creates or replaces the document.
    async fn set(&self, id: &str, document: Document) -> Result<(), StoreError>;
    /// Merges `fields` into the top level of an existing document.
    async fn update(&self, id: &str, fields: Document) -> Result<(), StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
    /// Every document in the collection, in no particular order.
    async fn list_all(&self) -> Result<Vec<StoredDocument>, StoreError>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    async fn verify_token(&self, credential: &str) -> Result<Principal, IdentityError>;
    async fn create_user(&self, email: &str, password: &str) -> Result<UserRecord, IdentityError>;
    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, IdentityError>;
    async fn create_custom_token(&self, uid: &str) -> Result<String, IdentityError>;
}
