pub mod authenticator;
pub mod order_service;
pub mod user_service;
