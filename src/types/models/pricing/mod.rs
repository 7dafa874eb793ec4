pub mod billing_cycle;
pub mod subscription_status;
