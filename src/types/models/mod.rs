pub mod activity;
pub mod dashboard;
pub mod pricing;
pub mod ticket;
pub mod user;
