pub mod access_resolver;
pub mod access_service;
pub mod activity_service;
pub mod category_service;
pub mod cleanup_service;
pub mod dashboard_service;
pub mod pricing_service;
pub mod stripe_service;
pub mod subscription_service;
pub mod ticket_events;
pub mod ticket_service;
pub mod user_service;
