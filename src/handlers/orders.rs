use std::borrow::Cow;

use actix_web::{web, HttpRequest, HttpResponse};
use log::debug;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::order::{CreateOrderRequest, NewOrder, OrderSummary, COLLECTION};
use crate::domain::requests::StatusUpdate;
use crate::errors::{AppError, ErrorResponse};
use crate::state::AppState;

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub message: String,
    pub id: String,
    pub status: String,
    pub total: f64,
    pub data_criacao: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusUpdateResponse {
    pub message: String,
    pub id: String,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteOrderResponse {
    pub message: String,
    pub id: String,
}

// ── Path handling ────────────────────────────────────────────────────────────

/// Extracts the percent-decoded order id from `/pedidos/{id}`. Leading and
/// trailing slashes are ignored and anything after the id is not looked at.
pub fn order_id_from_path(path: &str) -> Result<Cow<'_, str>, AppError> {
    let mut segments = path.trim_matches('/').split('/');
    match (segments.next(), segments.next()) {
        (Some(COLLECTION), Some(id)) if !id.is_empty() => {
            urlencoding::decode(id).map_err(|_| AppError::order_id_missing())
        }
        _ => Err(AppError::order_id_missing()),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /pedidos
///
/// Validates the submission, computes the total from the line items and stores
/// the new order with status `PENDENTE`.
#[utoipa::path(
    post,
    path = "/pedidos",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Malformed body, missing fields or invalid item", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "pedidos"
)]
pub async fn create_order(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let principal = state.authenticate(&req).await?;
    let draft = NewOrder::parse(&body)?;
    debug!("Creating order with {} item(s)", draft.lines.len());

    let order = state
        .orders
        .create_order(&principal, draft)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(HttpResponse::Ok().json(CreateOrderResponse {
        message: "order created successfully".to_string(),
        id: order.id,
        status: order.status,
        total: order.total,
        data_criacao: order.created_at,
    }))
}

/// GET /pedidos/{id}
///
/// Returns the stored document with its `id`.
#[utoipa::path(
    get,
    path = "/pedidos/{id}",
    params(
        ("id" = String, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "The full order document"),
        (status = 400, description = "Order id missing from the path", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "pedidos"
)]
pub async fn get_order(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.authenticate(&req).await?;
    let id = order_id_from_path(req.path())?;

    let order = state.orders.get_order(&id).await.map_err(|e| state.fail(e))?;
    Ok(HttpResponse::Ok().json(order))
}

/// GET /pedidos
#[utoipa::path(
    get,
    path = "/pedidos",
    responses(
        (status = 200, description = "Every order, absent fields defaulted", body = Vec<OrderSummary>),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "pedidos"
)]
pub async fn list_orders(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.authenticate(&req).await?;

    let orders = state.orders.list_orders().await.map_err(|e| state.fail(e))?;
    debug!("Listing {} order(s)", orders.len());
    Ok(HttpResponse::Ok().json(orders))
}

/// PUT|PATCH /pedidos/{id}
///
/// Replaces the order status. Any status string is accepted.
#[utoipa::path(
    method(put, patch),
    path = "/pedidos/{id}",
    params(
        ("id" = String, Path, description = "Order id"),
    ),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Status updated", body = StatusUpdateResponse),
        (status = 400, description = "Order id or status missing", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "pedidos"
)]
pub async fn update_order_status(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.authenticate(&req).await?;
    let id = order_id_from_path(req.path())?;
    let update = StatusUpdate::parse(&body)?;

    state
        .orders
        .update_status(&id, &update.status)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(HttpResponse::Ok().json(StatusUpdateResponse {
        message: "order status updated successfully".to_string(),
        id: id.into_owned(),
        status: update.status,
    }))
}

/// DELETE /pedidos/{id}
#[utoipa::path(
    delete,
    path = "/pedidos/{id}",
    params(
        ("id" = String, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order deleted", body = DeleteOrderResponse),
        (status = 400, description = "Order id missing from the path", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "pedidos"
)]
pub async fn delete_order(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.authenticate(&req).await?;
    let id = order_id_from_path(req.path())?;

    state.orders.delete_order(&id).await.map_err(|e| state.fail(e))?;

    Ok(HttpResponse::Ok().json(DeleteOrderResponse {
        message: "order deleted successfully".to_string(),
        id: id.into_owned(),
    }))
}
