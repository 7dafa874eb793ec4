pub mod dashboard_request;
