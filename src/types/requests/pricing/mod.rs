pub mod grant_subscription_request;
pub mod pricing_plan_request;
pub mod start_trial_request;
pub mod stripe_event;
