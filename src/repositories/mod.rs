pub mod category_repository;
pub mod dashboard_repository;
pub mod pricing_plan_repository;
pub mod subscription_repository;
pub mod ticket_repository;
pub mod user_activity_repository;
pub mod user_repository;
