use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    Canceled,
}

impl SubscriptionStatus {
    pub fn is_live(self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }

    /// Stripe has more states than the portal; anything that is not paying
    /// or trialing is treated as canceled.
    pub fn from_stripe(status: &str) -> Self {
        match status {
            "active" => SubscriptionStatus::Active,
            "trialing" => SubscriptionStatus::Trialing,
            _ => SubscriptionStatus::Canceled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stripe_states_collapse_to_portal_states() {
        assert_eq!(SubscriptionStatus::from_stripe("active"), SubscriptionStatus::Active);
        assert_eq!(SubscriptionStatus::from_stripe("trialing"), SubscriptionStatus::Trialing);
        assert_eq!(SubscriptionStatus::from_stripe("past_due"), SubscriptionStatus::Canceled);
        assert_eq!(
            SubscriptionStatus::from_stripe("incomplete_expired"),
            SubscriptionStatus::Canceled
        );
    }

    #[test]
    fn only_active_and_trialing_are_live() {
        assert!(SubscriptionStatus::Active.is_live());
        assert!(SubscriptionStatus::Trialing.is_live());
        assert!(!SubscriptionStatus::Canceled.is_live());
    }
}
