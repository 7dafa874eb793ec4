use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityAction {
    Login,
    Logout,
    ViewDashboard,
    StartTrial,
    Subscribe,
    CancelSubscription,
    CreateTicket,
    ReplyTicket,
}
