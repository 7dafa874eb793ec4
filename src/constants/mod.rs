use std::env;
use std::sync::LazyLock;

macro_rules! lazy_env_var {
    ($name:ident, $default:expr) => {
        pub static $name: LazyLock<String> = LazyLock::new(|| {
            let var_name = stringify!($name);
            env::var(var_name).unwrap_or_else(|_| $default.to_string())
        });
    };
}

lazy_env_var!(DB_NAME, "bi_portal");
lazy_env_var!(USER_COL_NAME, "users");
lazy_env_var!(DASHBOARD_COL_NAME, "dashboards");
lazy_env_var!(CATEGORY_COL_NAME, "categories");
lazy_env_var!(PRICING_PLAN_COL_NAME, "pricing_plans");
lazy_env_var!(SUBSCRIPTION_COL_NAME, "subscriptions");
lazy_env_var!(TICKET_COL_NAME, "tickets");
lazy_env_var!(USER_ACTIVITY_COL_NAME, "user_activities");

pub const DEFAULT_JWT_TTL_HOURS: i64 = 24;
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;
pub const TICKET_EVENT_CAPACITY: usize = 256;
pub const STRIPE_SIGNATURE_TOLERANCE_SECS: i64 = 300;
pub const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
pub const VERIFICATION_TOKEN_LENGTH: usize = 40;
pub const DEFAULT_ACTIVITY_LIMIT: i64 = 100;
pub const MAX_ACTIVITY_LIMIT: i64 = 1000;
