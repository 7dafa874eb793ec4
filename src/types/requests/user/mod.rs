pub mod assign_dashboard_request;
pub mod create_user_request;
pub mod update_user_request;
