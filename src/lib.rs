//! # pedidos service
//!
//! Order management ("pedidos") and user account endpoints over HTTP. Orders
//! live as JSON documents in PostgreSQL; identities are owned by an external
//! identity provider reached through its REST API.
//!
//! Routes:
//! * `POST /pedidos`, `GET /pedidos`
//! * `GET|PUT|PATCH|DELETE /pedidos/{id}`
//! * `POST /register`, `POST /login`, `POST /validate-token`
//! * `/swagger-ui/` and `/api-docs/openapi.json`
pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;
pub mod state;


use std::error::Error;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::ServerConfig;
pub use db::{create_pool, DbPool};
pub use state::AppState;

use domain::order::COLLECTION;
use errors::ErrorPolicy;
use infrastructure::document_store::DieselDocumentStore;
use infrastructure::identity_toolkit::IdentityToolkitClient;
use openapi::ApiDoc;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Wires the production collaborators: the Postgres document store and the
/// Identity Toolkit client.
pub fn build_state(config: &ServerConfig, pool: DbPool) -> AppState {
    AppState::new(
        Arc::new(DieselDocumentStore::new(pool, COLLECTION)),
        Arc::new(IdentityToolkitClient::new(config.identity.clone())),
        ErrorPolicy {
            expose_internal_errors: config.expose_internal_errors,
        },
    )
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(state: AppState, host: &str, port: u16) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(state);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(handlers::routes)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()))
    })
    .bind((host.to_string(), port))?
    .run())
}
