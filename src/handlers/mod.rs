//! HTTP surface.
//!
//! Every resource answers `OPTIONS` with an empty `204` before anything else,
//! carries CORS headers on all of its responses, and rejects methods it does
//! not serve with `405`. On authenticated resources the `405` is only returned
//! after the caller has been authenticated.
pub mod cors;
pub mod orders;
pub mod users;

use actix_web::http::Method;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::state::AppState;

/// Fallback for authenticated resources.
pub async fn authenticated_method_not_allowed(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.authenticate(&req).await?;
    Err(AppError::MethodNotAllowed)
}

/// Fallback for public resources.
pub async fn method_not_allowed() -> Result<HttpResponse, AppError> {
    Err(AppError::MethodNotAllowed)
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/pedidos")
            .route(web::method(Method::OPTIONS).to(cors::preflight))
            .route(web::get().to(orders::list_orders))
            .route(web::post().to(orders::create_order))
            .default_service(web::to(authenticated_method_not_allowed))
            .wrap(cors::policy(cors::ORDER_COLLECTION_METHODS, cors::AUTHENTICATED_HEADERS)),
    )
    .service(
        // The id is pulled out of the raw path so `/pedidos/` still reaches a handler.
        web::resource("/pedidos/{id:.*}")
            .route(web::method(Method::OPTIONS).to(cors::preflight))
            .route(web::get().to(orders::get_order))
            .route(web::put().to(orders::update_order_status))
            .route(web::patch().to(orders::update_order_status))
            .route(web::delete().to(orders::delete_order))
            .default_service(web::to(authenticated_method_not_allowed))
            .wrap(cors::policy(cors::ORDER_ITEM_METHODS, cors::AUTHENTICATED_HEADERS)),
    )
    .service(
        web::resource("/validate-token")
            .route(web::method(Method::OPTIONS).to(cors::preflight))
            .route(web::post().to(users::validate_token))
            .default_service(web::to(authenticated_method_not_allowed))
            .wrap(cors::policy(cors::POST_METHODS, cors::AUTHENTICATED_HEADERS)),
    )
    .service(
        web::resource("/login")
            .route(web::method(Method::OPTIONS).to(cors::preflight))
            .route(web::post().to(users::login_user))
            .default_service(web::to(method_not_allowed))
            .wrap(cors::policy(cors::POST_METHODS, cors::PUBLIC_HEADERS)),
    )
    .service(
        web::resource("/register")
            .route(web::method(Method::OPTIONS).to(cors::preflight))
            .route(web::post().to(users::register_user))
            .default_service(web::to(method_not_allowed))
            .wrap(cors::policy(cors::POST_METHODS, cors::PUBLIC_HEADERS)),
    );
}
