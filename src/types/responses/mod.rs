pub mod api_response;
pub mod cleanup_response;
pub mod dashboard_access_response;
pub mod user_response;
