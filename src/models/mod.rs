pub mod category_model;
pub mod dashboard_model;
pub mod pricing_plan_model;
pub mod subscription_model;
pub mod ticket_model;
pub mod user_activity_model;
pub mod user_model;
