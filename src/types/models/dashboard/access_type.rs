use serde::{Deserialize, Serialize};
use strum::Display;

/// How a user reaches a dashboard, in descending precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AccessType {
    Assigned,
    Subscription,
    Public,
}
