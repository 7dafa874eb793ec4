pub mod admin_handler;
pub mod auth_handler;
pub mod category_handler;
pub mod dashboard_handler;
pub mod pricing_handler;
pub mod ticket_handler;
pub mod ticket_ws_handler;
pub mod user_handler;
pub mod webhook_handler;
