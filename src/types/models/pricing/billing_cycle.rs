use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingCycle {
    pub fn months(self) -> u32 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Quarterly => 3,
            BillingCycle::Yearly => 12,
        }
    }

    /// End of the billing period starting at `start`. Month arithmetic clamps
    /// to the last day of shorter months (Jan 31 + 1 month = Feb 28/29).
    pub fn period_end(self, start: DateTime<Utc>) -> DateTime<Utc> {
        start
            .checked_add_months(Months::new(self.months()))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn monthly_period_clamps_to_end_of_february() {
        let start = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
        let end = BillingCycle::Monthly.period_end(start);
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 2, 28, 12, 0, 0).unwrap());
    }

    #[test]
    fn yearly_and_quarterly_add_calendar_months() {
        let start = Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();
        assert_eq!(
            BillingCycle::Quarterly.period_end(start),
            Utc.with_ymd_and_hms(2024, 8, 10, 0, 0, 0).unwrap()
        );
        assert_eq!(
            BillingCycle::Yearly.period_end(start),
            Utc.with_ymd_and_hms(2025, 5, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn parses_from_snake_case() {
        assert_eq!("quarterly".parse::<BillingCycle>().unwrap(), BillingCycle::Quarterly);
        assert!("weekly".parse::<BillingCycle>().is_err());
    }
}
