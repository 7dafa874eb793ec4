pub mod defaults;
pub mod role;
