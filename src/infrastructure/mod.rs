pub mod document_store;
pub mod identity_toolkit;
pub mod models;
