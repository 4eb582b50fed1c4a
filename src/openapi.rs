use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::order::{CreateOrderRequest, OrderSummary};
use crate::domain::requests::{Credentials, StatusUpdate};
use crate::errors::ErrorResponse;
use crate::handlers::orders::{CreateOrderResponse, DeleteOrderResponse, StatusUpdateResponse};
use crate::handlers::users::{LoginResponse, RegisterResponse, ValidateTokenResponse};
use crate::handlers::{orders, users};

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order,
        orders::get_order,
        orders::list_orders,
        orders::update_order_status,
        orders::delete_order,
        users::register_user,
        users::login_user,
        users::validate_token,
    ),
    components(schemas(
        CreateOrderRequest,
        CreateOrderResponse,
        OrderSummary,
        StatusUpdate,
        StatusUpdateResponse,
        DeleteOrderResponse,
        Credentials,
        RegisterResponse,
        LoginResponse,
        ValidateTokenResponse,
        ErrorResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "pedidos", description = "Order management"),
        (name = "users", description = "Registration, login and token validation"),
    )
)]
pub struct ApiDoc;

/// Declares the `bearer` scheme referenced by the authenticated paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
