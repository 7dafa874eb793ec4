pub mod activity_action;
