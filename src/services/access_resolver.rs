//! Merges a user's dashboard grants into the per-category view the portal
//! renders.
//!
//! A dashboard can be reached three ways: a personal assignment, a live
//! subscription whose plan bundles it, or being public (directly or through
//! its category). The resolver picks one grant per dashboard in that order of
//! precedence and annotates it with `has_access` and `expires_at`. It does no
//! I/O; callers fetch the documents and pass `now` explicitly.

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::{
    constants::UNCATEGORIZED_LABEL,
    models::{
        category_model::Category, dashboard_model::Dashboard, pricing_plan_model::PricingPlan,
        subscription_model::Subscription, user_model::DashboardAssignment,
    },
    types::{
        models::dashboard::access_type::AccessType,
        responses::dashboard_access_response::{CategoryAccess, DashboardAccess},
    },
};

pub struct AccessInput<'a> {
    pub dashboards: &'a [Dashboard],
    pub categories: &'a [Category],
    pub assignments: &'a [DashboardAssignment],
    pub subscriptions: &'a [Subscription],
    pub plans: &'a [PricingPlan],
}

struct Grant {
    access_type: AccessType,
    has_access: bool,
    expires_at: Option<DateTime<Utc>>,
}

fn subscription_grant(
    dashboard_id: &ObjectId,
    subscriptions: &[Subscription],
    plans: &HashMap<ObjectId, &PricingPlan>,
    now: DateTime<Utc>,
) -> Option<Grant> {
    subscriptions
        .iter()
        .filter(|subscription| subscription.grants_access(now))
        .filter(|subscription| {
            plans
                .get(&subscription.plan_id)
                .is_some_and(|plan| plan.includes(dashboard_id))
        })
        .max_by_key(|subscription| subscription.current_period_end)
        .map(|subscription| Grant {
            access_type: AccessType::Subscription,
            has_access: true,
            expires_at: Some(subscription.current_period_end),
        })
}

fn choose_grant(
    dashboard: &Dashboard,
    dashboard_id: &ObjectId,
    category: Option<&Category>,
    input: &AccessInput<'_>,
    plans: &HashMap<ObjectId, &PricingPlan>,
    now: DateTime<Utc>,
) -> Option<Grant> {
    let assignment = input
        .assignments
        .iter()
        .find(|assignment| &assignment.dashboard_id == dashboard_id);

    if let Some(assignment) = assignment.filter(|assignment| assignment.is_valid_at(now)) {
        return Some(Grant {
            access_type: AccessType::Assigned,
            has_access: true,
            expires_at: assignment.expires_at,
        });
    }

    if let Some(grant) = subscription_grant(dashboard_id, input.subscriptions, plans, now) {
        return Some(grant);
    }

    if dashboard.is_public || category.is_some_and(|category| category.is_public) {
        return Some(Grant {
            access_type: AccessType::Public,
            has_access: true,
            expires_at: None,
        });
    }

    // Only an expired assignment is left; keep it visible so the UI can say so.
    assignment.map(|assignment| Grant {
        access_type: AccessType::Assigned,
        has_access: false,
        expires_at: assignment.expires_at,
    })
}

fn sort_key(name: &str) -> String {
    name.to_lowercase()
}

pub fn resolve_dashboard_access(input: AccessInput<'_>, now: DateTime<Utc>) -> Vec<CategoryAccess> {
    let categories_by_id: HashMap<ObjectId, &Category> = input
        .categories
        .iter()
        .filter_map(|category| category._id.map(|id| (id, category)))
        .collect();

    let mut categories_by_member: HashMap<ObjectId, &Category> = HashMap::new();
    for category in input.categories {
        for dashboard_id in &category.dashboards {
            categories_by_member.entry(*dashboard_id).or_insert(category);
        }
    }

    let plans: HashMap<ObjectId, &PricingPlan> = input
        .plans
        .iter()
        .filter_map(|plan| plan._id.map(|id| (id, plan)))
        .collect();

    let mut groups: HashMap<Option<ObjectId>, CategoryAccess> = HashMap::new();

    for dashboard in input.dashboards.iter().filter(|dashboard| dashboard.is_active) {
        let Some(dashboard_id) = dashboard._id else {
            continue;
        };

        let category = dashboard
            .category_id
            .and_then(|id| categories_by_id.get(&id).copied())
            .or_else(|| categories_by_member.get(&dashboard_id).copied());

        let Some(grant) = choose_grant(dashboard, &dashboard_id, category, &input, &plans, now)
        else {
            continue;
        };

        let group = groups
            .entry(category.and_then(|category| category._id))
            .or_insert_with(|| match category {
                Some(category) => CategoryAccess {
                    category_id: category._id.map(|id| id.to_hex()),
                    name: category.name.clone(),
                    description: category.description.clone(),
                    dashboards: Vec::new(),
                },
                None => CategoryAccess {
                    category_id: None,
                    name: UNCATEGORIZED_LABEL.to_string(),
                    description: None,
                    dashboards: Vec::new(),
                },
            });

        group.dashboards.push(DashboardAccess {
            dashboard_id: dashboard_id.to_hex(),
            name: dashboard.name.clone(),
            description: dashboard.description.clone(),
            embed_url: grant.has_access.then(|| dashboard.embed_url.clone()),
            access_type: grant.access_type,
            has_access: grant.has_access,
            expires_at: grant.expires_at,
        });
    }

    let mut resolved: Vec<CategoryAccess> = groups.into_values().collect();
    for group in &mut resolved {
        group.dashboards.sort_by(|a, b| {
            sort_key(&a.name)
                .cmp(&sort_key(&b.name))
                .then_with(|| a.dashboard_id.cmp(&b.dashboard_id))
        });
    }
    resolved.sort_by(|a, b| {
        a.category_id
            .is_none()
            .cmp(&b.category_id.is_none())
            .then_with(|| sort_key(&a.name).cmp(&sort_key(&b.name)))
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    resolved
}

pub fn find_dashboard<'a>(
    resolved: &'a [CategoryAccess],
    dashboard_id: &str,
) -> Option<&'a DashboardAccess> {
    resolved
        .iter()
        .flat_map(|group| group.dashboards.iter())
        .find(|dashboard| dashboard.dashboard_id == dashboard_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::subscription_model::fixtures::subscription,
        types::models::pricing::{
            billing_cycle::BillingCycle, subscription_status::SubscriptionStatus,
        },
    };
    use chrono::Duration;

    fn dashboard(name: &str, category_id: Option<ObjectId>) -> Dashboard {
        let now = Utc::now();
        Dashboard {
            _id: Some(ObjectId::new()),
            name: name.to_string(),
            description: None,
            embed_url: format!("https://app.powerbi.com/view?r={}", name),
            is_active: true,
            is_public: false,
            category_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn category(name: &str, is_public: bool) -> Category {
        let now = Utc::now();
        Category {
            _id: Some(ObjectId::new()),
            name: name.to_string(),
            description: None,
            is_public,
            dashboards: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn plan(dashboards: Vec<ObjectId>) -> PricingPlan {
        let now = Utc::now();
        PricingPlan {
            _id: Some(ObjectId::new()),
            name: "Pro".to_string(),
            description: None,
            price_minor: 4900,
            currency: "usd".to_string(),
            billing_cycle: BillingCycle::Monthly,
            features: Vec::new(),
            dashboards,
            trial_days: 14,
            is_active: true,
            stripe_price_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn assign(dashboard: &Dashboard, expires_at: Option<DateTime<Utc>>) -> DashboardAssignment {
        DashboardAssignment {
            dashboard_id: dashboard._id.unwrap(),
            assigned_at: Utc::now(),
            expires_at,
        }
    }

    fn resolve(
        dashboards: &[Dashboard],
        categories: &[Category],
        assignments: &[DashboardAssignment],
        subscriptions: &[Subscription],
        plans: &[PricingPlan],
        now: DateTime<Utc>,
    ) -> Vec<CategoryAccess> {
        resolve_dashboard_access(
            AccessInput {
                dashboards,
                categories,
                assignments,
                subscriptions,
                plans,
            },
            now,
        )
    }

    fn only(resolved: &[CategoryAccess]) -> &DashboardAccess {
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].dashboards.len(), 1);
        &resolved[0].dashboards[0]
    }

    #[test]
    fn assignment_beats_subscription_and_public() {
        let now = Utc::now();
        let mut sales = dashboard("Sales", None);
        sales.is_public = true;
        let pro = plan(vec![sales._id.unwrap()]);
        let subs = vec![subscription(
            ObjectId::new(),
            pro._id.unwrap(),
            SubscriptionStatus::Active,
            Duration::days(10),
        )];
        let expiry = now + Duration::days(2);
        let assignments = vec![assign(&sales, Some(expiry))];

        let resolved = resolve(&[sales], &[], &assignments, &subs, &[pro], now);
        let entry = only(&resolved);
        assert_eq!(entry.access_type, AccessType::Assigned);
        assert!(entry.has_access);
        assert_eq!(entry.expires_at, Some(expiry));
        assert!(entry.embed_url.is_some());
    }

    #[test]
    fn expired_assignment_yields_to_live_subscription() {
        let now = Utc::now();
        let sales = dashboard("Sales", None);
        let pro = plan(vec![sales._id.unwrap()]);
        let subs = vec![subscription(
            ObjectId::new(),
            pro._id.unwrap(),
            SubscriptionStatus::Trialing,
            Duration::days(5),
        )];
        let assignments = vec![assign(&sales, Some(now - Duration::days(1)))];

        let resolved = resolve(&[sales], &[], &assignments, &subs, &[pro], now);
        let entry = only(&resolved);
        assert_eq!(entry.access_type, AccessType::Subscription);
        assert_eq!(entry.expires_at, Some(subs[0].current_period_end));
    }

    #[test]
    fn latest_subscription_period_wins() {
        let now = Utc::now();
        let sales = dashboard("Sales", None);
        let basic = plan(vec![sales._id.unwrap()]);
        let pro = plan(vec![sales._id.unwrap()]);
        let user_id = ObjectId::new();
        let subs = vec![
            subscription(
                user_id,
                basic._id.unwrap(),
                SubscriptionStatus::Active,
                Duration::days(3),
            ),
            subscription(user_id, pro._id.unwrap(), SubscriptionStatus::Active, Duration::days(30)),
        ];

        let resolved = resolve(&[sales], &[], &[], &subs, &[basic, pro], now);
        assert_eq!(only(&resolved).expires_at, Some(subs[1].current_period_end));
    }

    #[test]
    fn lapsed_or_canceled_subscriptions_grant_nothing() {
        let now = Utc::now();
        let sales = dashboard("Sales", None);
        let pro = plan(vec![sales._id.unwrap()]);
        let user_id = ObjectId::new();
        let pro_id = pro._id.unwrap();
        let subs = vec![
            subscription(user_id, pro_id, SubscriptionStatus::Active, Duration::days(-1)),
            subscription(user_id, pro_id, SubscriptionStatus::Canceled, Duration::days(20)),
        ];

        assert!(resolve(&[sales], &[], &[], &subs, &[pro], now).is_empty());
    }

    #[test]
    fn public_category_makes_its_dashboards_public() {
        let now = Utc::now();
        let open = category("Open data", true);
        let sales = dashboard("Sales", open._id);

        let resolved = resolve(&[sales], &[open], &[], &[], &[], now);
        let entry = only(&resolved);
        assert_eq!(entry.access_type, AccessType::Public);
        assert_eq!(entry.expires_at, None);
        assert_eq!(resolved[0].name, "Open data");
    }

    #[test]
    fn expired_only_assignment_is_listed_without_access() {
        let now = Utc::now();
        let sales = dashboard("Sales", None);
        let expired_at = now - Duration::hours(3);
        let assignments = vec![assign(&sales, Some(expired_at))];

        let resolved = resolve(&[sales], &[], &assignments, &[], &[], now);
        let entry = only(&resolved);
        assert_eq!(entry.access_type, AccessType::Assigned);
        assert!(!entry.has_access);
        assert_eq!(entry.expires_at, Some(expired_at));
        assert_eq!(entry.embed_url, None);
    }

    #[test]
    fn inactive_and_ungranted_dashboards_are_hidden() {
        let now = Utc::now();
        let mut retired = dashboard("Retired", None);
        retired.is_active = false;
        retired.is_public = true;
        let private = dashboard("Private", None);

        assert!(resolve(&[retired, private], &[], &[], &[], &[], now).is_empty());
    }

    #[test]
    fn groups_are_sorted_with_uncategorized_last() {
        let now = Utc::now();
        let finance = category("finance", false);
        let analytics = category("Analytics", false);
        let mut dashboards = vec![
            dashboard("Loose", None),
            dashboard("Zeta", finance._id),
            dashboard("alpha", finance._id),
            dashboard("Traffic", analytics._id),
            dashboard("Ghost category", Some(ObjectId::new())),
        ];
        for dashboard in &mut dashboards {
            dashboard.is_public = true;
        }

        let resolved = resolve(&dashboards, &[finance, analytics], &[], &[], &[], now);
        let names: Vec<&str> = resolved.iter().map(|group| group.name.as_str()).collect();
        assert_eq!(names, vec!["Analytics", "finance", UNCATEGORIZED_LABEL]);

        let finance_names: Vec<&str> =
            resolved[1].dashboards.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(finance_names, vec!["alpha", "Zeta"]);
        assert_eq!(resolved[2].dashboards.len(), 2);
        assert_eq!(resolved[2].category_id, None);
    }

    #[test]
    fn category_membership_is_used_when_dashboard_has_no_category() {
        let now = Utc::now();
        let mut sales = dashboard("Sales", None);
        sales.is_public = true;
        let mut reports = category("Reports", false);
        reports.dashboards.push(sales._id.unwrap());

        let resolved = resolve(&[sales], &[reports], &[], &[], &[], now);
        assert_eq!(resolved[0].name, "Reports");
    }

    #[test]
    fn missing_plan_is_skipped() {
        let now = Utc::now();
        let sales = dashboard("Sales", None);
        let subs = vec![subscription(
            ObjectId::new(),
            ObjectId::new(),
            SubscriptionStatus::Active,
            Duration::days(10),
        )];

        assert!(resolve(&[sales], &[], &[], &subs, &[], now).is_empty());
    }

    #[test]
    fn finds_single_dashboard_in_view() {
        let now = Utc::now();
        let mut sales = dashboard("Sales", None);
        sales.is_public = true;
        let id = sales._id.unwrap().to_hex();

        let resolved = resolve(&[sales], &[], &[], &[], &[], now);
        assert!(find_dashboard(&resolved, &id).is_some());
        assert!(find_dashboard(&resolved, "missing").is_none());
    }
}
