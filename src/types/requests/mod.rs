pub mod activity;
pub mod auth;
pub mod category;
pub mod dashboard;
pub mod pricing;
pub mod ticket;
pub mod user;
