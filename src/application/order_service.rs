use std::sync::Arc;

use log::info;
use serde_json::Value;

use crate::domain::errors::DomainError;
use crate::domain::order::{utc_timestamp, NewOrder, Order, OrderSummary};
use crate::domain::ports::{Document, DocumentStore};
use crate::domain::principal::Principal;

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn DocumentStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create_order(&self, owner: &Principal, draft: NewOrder) -> Result<Order, DomainError> {
        let order = draft.into_order(owner);
        self.store.set(&order.id, order.clone().into()).await?;
        info!("Order {} created for user {} (total {})", order.id, owner.uid, order.total);
        Ok(order)
    }

    /// The stored document with its `id` filled in.
    pub async fn get_order(&self, id: &str) -> Result<Document, DomainError> {
        let mut document = self.store.get(id).await?.ok_or(DomainError::NotFound)?;
        document.insert("id".to_string(), Value::from(id));
        Ok(document)
    }

    pub async fn list_orders(&self) -> Result<Vec<OrderSummary>, DomainError> {
        let documents = self.store.list_all().await?;
        Ok(documents.into_iter().map(OrderSummary::from).collect())
    }

    /// Overwrites `status` and touches `ultima_atualizacao`; nothing else changes.
    pub async fn update_status(&self, id: &str, status: &str) -> Result<(), DomainError> {
        self.ensure_exists(id).await?;

        let mut fields = Document::new();
        fields.insert("status".to_string(), Value::from(status));
        fields.insert("ultima_atualizacao".to_string(), Value::from(utc_timestamp()));
        self.store.update(id, fields).await?;

        info!("Order {} moved to status {}", id, status);
        Ok(())
    }

    pub async fn delete_order(&self, id: &str) -> Result<(), DomainError> {
        self.ensure_exists(id).await?;
        self.store.delete(id).await?;
        info!("Order {} deleted", id);
        Ok(())
    }

    async fn ensure_exists(&self, id: &str) -> Result<(), DomainError> {
        match self.store.get(id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::NotFound),
        }
    }
}
