use actix_web::http::header;
use actix_web::middleware::DefaultHeaders;
use actix_web::HttpResponse;

pub const ORDER_COLLECTION_METHODS: &str = "GET, POST, OPTIONS";
pub const ORDER_ITEM_METHODS: &str = "GET, PUT, PATCH, DELETE, OPTIONS";
pub const POST_METHODS: &str = "POST, OPTIONS";

pub const AUTHENTICATED_HEADERS: &str = "Content-Type, Authorization";
pub const PUBLIC_HEADERS: &str = "Content-Type";

/// Permissive CORS headers attached to every response of a resource,
/// errors included.
pub fn policy(methods: &'static str, allowed_headers: &'static str) -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .add((header::ACCESS_CONTROL_ALLOW_METHODS, methods))
        .add((header::ACCESS_CONTROL_ALLOW_HEADERS, allowed_headers))
}

/// `OPTIONS` on any resource: no authentication, no body.
pub async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}
