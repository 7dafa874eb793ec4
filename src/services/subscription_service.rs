use crate::{
    errors::{AppError, AppResult},
    middleware::auth_middleware::AuthUser,
    models::{pricing_plan_model::PricingPlan, subscription_model::Subscription},
    repositories::{
        pricing_plan_repository::PricingPlanRepository,
        subscription_repository::SubscriptionRepository, user_repository::UserRepository,
    },
    services::stripe_service::StripeService,
    types::{
        models::pricing::subscription_status::SubscriptionStatus,
        requests::pricing::{
            grant_subscription_request::GrantSubscriptionRequest,
            stripe_event::{StripeCheckoutSession, StripeEvent, StripeSubscriptionObject},
        },
    },
    utils::{
        locale_utils::{Messages, Namespace},
        request_utils::parse_object_id,
    },
};
use bson::oid::ObjectId;
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Debug, PartialEq)]
pub enum TrialRejection {
    Unavailable,
    AlreadyUsed,
    AlreadySubscribed,
}

/// A plan offers one trial per user, and never on top of a running
/// subscription to the same plan.
pub fn check_trial_eligibility(
    plan: &PricingPlan,
    existing: &[Subscription],
    now: DateTime<Utc>,
) -> Result<(), TrialRejection> {
    if !plan.offers_trial() {
        return Err(TrialRejection::Unavailable);
    }
    if existing.iter().any(|subscription| subscription.is_trial) {
        return Err(TrialRejection::AlreadyUsed);
    }
    if existing.iter().any(|subscription| subscription.grants_access(now)) {
        return Err(TrialRejection::AlreadySubscribed);
    }
    Ok(())
}

/// What a webhook event did to the portal's subscriptions.
#[derive(Debug)]
pub enum WebhookOutcome {
    Ignored,
    Subscribed(Subscription),
    Updated(Subscription),
    Canceled(Subscription),
}

/// A verified Stripe event narrowed to the payload the portal acts on.
#[derive(Debug)]
pub enum StripeChange {
    CheckoutCompleted(StripeCheckoutSession),
    SubscriptionUpdated(StripeSubscriptionObject),
    SubscriptionDeleted(StripeSubscriptionObject),
    Unhandled(String),
}

impl StripeChange {
    pub fn from_event(event: StripeEvent) -> AppResult<Self> {
        let StripeEvent { event_type, data, .. } = event;
        let change = match event_type.as_str() {
            "checkout.session.completed" => {
                Self::CheckoutCompleted(payload(&event_type, data.object)?)
            }
            "customer.subscription.updated" => {
                Self::SubscriptionUpdated(payload(&event_type, data.object)?)
            }
            "customer.subscription.deleted" => {
                Self::SubscriptionDeleted(payload(&event_type, data.object)?)
            }
            _ => Self::Unhandled(event_type),
        };
        Ok(change)
    }
}

fn payload<T: DeserializeOwned>(event_type: &str, object: serde_json::Value) -> AppResult<T> {
    serde_json::from_value(object)
        .map_err(|err| AppError::BadRequest(format!("Malformed {}: {}", event_type, err)))
}

fn from_unix(seconds: Option<i64>) -> Option<DateTime<Utc>> {
    seconds.and_then(|seconds| DateTime::from_timestamp(seconds, 0))
}

pub struct SubscriptionService {
    pub subscription_repository: Arc<SubscriptionRepository>,
    pub pricing_plan_repository: Arc<PricingPlanRepository>,
    pub user_repository: Arc<UserRepository>,
    pub stripe: Arc<StripeService>,
}

impl SubscriptionService {
    pub fn new(
        subscription_repository: Arc<SubscriptionRepository>,
        pricing_plan_repository: Arc<PricingPlanRepository>,
        user_repository: Arc<UserRepository>,
        stripe: Arc<StripeService>,
    ) -> Self {
        Self {
            subscription_repository,
            pricing_plan_repository,
            user_repository,
            stripe,
        }
    }

    fn not_found(messages: &Messages) -> AppError {
        AppError::NotFound(messages.get_str(
            Namespace::Pricing,
            "subscriptions.not_found",
            "Subscription not found.",
        ))
    }

    async fn require_plan(&self, id: &ObjectId, messages: &Messages) -> AppResult<PricingPlan> {
        self.pricing_plan_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(messages.get_str(
                    Namespace::Pricing,
                    "plans.not_found",
                    "Pricing plan not found.",
                ))
            })
    }

    pub async fn start_trial(
        &self,
        user_id: &ObjectId,
        plan_id: &ObjectId,
        now: DateTime<Utc>,
        messages: &Messages,
    ) -> AppResult<Subscription> {
        let plan = self.require_plan(plan_id, messages).await?;
        let existing = self
            .subscription_repository
            .find_by_user_and_plan(user_id, plan_id)
            .await?;

        check_trial_eligibility(&plan, &existing, now).map_err(|rejection| {
            warn!("Trial for plan {} refused for user {}: {:?}", plan_id, user_id, rejection);
            match rejection {
                TrialRejection::Unavailable => AppError::BadRequest(messages.get_str(
                    Namespace::Pricing,
                    "trial.unavailable",
                    "This plan does not offer a trial.",
                )),
                TrialRejection::AlreadyUsed => AppError::Conflict(messages.get_str(
                    Namespace::Pricing,
                    "trial.already_used",
                    "You have already used the trial for this plan.",
                )),
                TrialRejection::AlreadySubscribed => AppError::Conflict(messages.get_str(
                    Namespace::Pricing,
                    "trial.already_subscribed",
                    "You already have an active subscription to this plan.",
                )),
            }
        })?;

        let subscription = Subscription {
            _id: Some(ObjectId::new()),
            user_id: *user_id,
            plan_id: *plan_id,
            status: SubscriptionStatus::Trialing,
            current_period_start: now,
            current_period_end: now + Duration::days(i64::from(plan.trial_days)),
            is_trial: true,
            stripe_subscription_id: None,
            stripe_customer_id: None,
            canceled_at: None,
            created_at: now,
            updated_at: now,
        };

        let subscription = self.subscription_repository.create_subscription(&subscription).await?;
        info!("User {} started a {}-day trial of '{}'", user_id, plan.trial_days, plan.name);
        Ok(subscription)
    }

    pub async fn get_user_subscriptions(&self, user_id: &ObjectId) -> AppResult<Vec<Subscription>> {
        Ok(self.subscription_repository.find_by_user(user_id).await?)
    }

    pub async fn get_all_subscriptions(&self) -> AppResult<Vec<Subscription>> {
        Ok(self.subscription_repository.find_all().await?)
    }

    /// Owners cancel their own subscriptions; admins cancel any.
    pub async fn cancel_subscription(
        &self,
        id: &ObjectId,
        actor: &AuthUser,
        now: DateTime<Utc>,
        messages: &Messages,
    ) -> AppResult<Subscription> {
        let subscription = self
            .subscription_repository
            .find_by_id(id)
            .await?
            .filter(|subscription| actor.is_admin() || subscription.user_id == actor.id)
            .ok_or_else(|| Self::not_found(messages))?;

        let already_canceled = || {
            AppError::Conflict(messages.get_str(
                Namespace::Pricing,
                "subscriptions.already_canceled",
                "Subscription is already canceled.",
            ))
        };
        if subscription.status == SubscriptionStatus::Canceled {
            return Err(already_canceled());
        }

        if let Some(stripe_id) = subscription.stripe_subscription_id.as_deref() {
            self.stripe.cancel_subscription(stripe_id).await.map_err(AppError::Internal)?;
        }

        let subscription = self
            .subscription_repository
            .cancel(id, now)
            .await?
            .ok_or_else(already_canceled)?;
        info!("Subscription {} canceled by {}", id, actor.email);
        Ok(subscription)
    }

    /// Admin-issued subscription, e.g. for offline payment.
    pub async fn grant_subscription(
        &self,
        request: GrantSubscriptionRequest,
        now: DateTime<Utc>,
        messages: &Messages,
    ) -> AppResult<Subscription> {
        let user_id = parse_object_id(&request.user_id, "user")?;
        let plan_id = parse_object_id(&request.plan_id, "plan")?;

        if self.user_repository.find_by_id(&user_id).await?.is_none() {
            return Err(AppError::NotFound(messages.get_str(
                Namespace::User,
                "fetch.not_found",
                "User not found.",
            )));
        }
        let plan = self.require_plan(&plan_id, messages).await?;

        let status = request.status.unwrap_or(SubscriptionStatus::Active);
        let start = request.current_period_start.unwrap_or(now);
        let end = request
            .current_period_end
            .unwrap_or_else(|| plan.billing_cycle.period_end(start));
        if end <= start {
            return Err(AppError::BadRequest(messages.get_str(
                Namespace::Pricing,
                "subscriptions.invalid_period",
                "The period end must be after its start.",
            )));
        }

        let subscription = Subscription {
            _id: Some(ObjectId::new()),
            user_id,
            plan_id,
            status,
            current_period_start: start,
            current_period_end: end,
            is_trial: status == SubscriptionStatus::Trialing,
            stripe_subscription_id: None,
            stripe_customer_id: None,
            canceled_at: (status == SubscriptionStatus::Canceled).then_some(now),
            created_at: now,
            updated_at: now,
        };

        let subscription = self.subscription_repository.create_subscription(&subscription).await?;
        info!("Granted plan '{}' to user {} until {}", plan.name, user_id, end);
        Ok(subscription)
    }

    pub async fn apply_stripe_event(
        &self,
        change: StripeChange,
        now: DateTime<Utc>,
    ) -> AppResult<WebhookOutcome> {
        match change {
            StripeChange::CheckoutCompleted(session) => self.complete_checkout(session, now).await,
            StripeChange::SubscriptionUpdated(object) => {
                self.sync_stripe_subscription(object, now).await
            }
            StripeChange::SubscriptionDeleted(object) => {
                let Some(subscription) =
                    self.subscription_repository.find_by_stripe_id(&object.id).await?
                else {
                    warn!("Stripe deleted unknown subscription {}", object.id);
                    return Ok(WebhookOutcome::Ignored);
                };
                let Some(id) = subscription
                    ._id
                    .filter(|_| subscription.status != SubscriptionStatus::Canceled)
                else {
                    return Ok(WebhookOutcome::Canceled(subscription));
                };
                match self.subscription_repository.cancel(&id, now).await? {
                    Some(canceled) => Ok(WebhookOutcome::Canceled(canceled)),
                    None => Ok(WebhookOutcome::Ignored),
                }
            }
            StripeChange::Unhandled(event_type) => {
                info!("Ignoring Stripe event type {}", event_type);
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    async fn complete_checkout(
        &self,
        session: StripeCheckoutSession,
        now: DateTime<Utc>,
    ) -> AppResult<WebhookOutcome> {
        let user_id = session
            .client_reference_id
            .as_deref()
            .and_then(|raw| ObjectId::parse_str(raw).ok());
        let plan_id = session
            .metadata
            .get("plan_id")
            .and_then(|raw| ObjectId::parse_str(raw).ok());
        let (Some(user_id), Some(plan_id)) = (user_id, plan_id) else {
            warn!("Checkout session {} lacks a user or plan reference", session.id);
            return Ok(WebhookOutcome::Ignored);
        };

        if let Some(stripe_id) = session.subscription.as_deref() {
            let existing = self.subscription_repository.find_by_stripe_id(stripe_id).await?;
            if let Some(mut existing) = existing {
                existing.status = SubscriptionStatus::Active;
                existing.is_trial = false;
                existing.canceled_at = None;
                existing.updated_at = now;
                self.subscription_repository.apply_stripe_state(&existing).await?;
                return Ok(WebhookOutcome::Updated(existing));
            }
        }

        let Some(plan) = self.pricing_plan_repository.find_by_id(&plan_id).await? else {
            warn!("Checkout session {} references unknown plan {}", session.id, plan_id);
            return Ok(WebhookOutcome::Ignored);
        };

        let subscription = Subscription {
            _id: Some(ObjectId::new()),
            user_id,
            plan_id,
            status: SubscriptionStatus::Active,
            current_period_start: now,
            current_period_end: plan.billing_cycle.period_end(now),
            is_trial: false,
            stripe_subscription_id: session.subscription,
            stripe_customer_id: session.customer,
            canceled_at: None,
            created_at: now,
            updated_at: now,
        };
        let subscription = self.subscription_repository.create_subscription(&subscription).await?;
        info!("User {} subscribed to '{}' via checkout {}", user_id, plan.name, session.id);
        Ok(WebhookOutcome::Subscribed(subscription))
    }

    async fn sync_stripe_subscription(
        &self,
        object: StripeSubscriptionObject,
        now: DateTime<Utc>,
    ) -> AppResult<WebhookOutcome> {
        let Some(mut subscription) =
            self.subscription_repository.find_by_stripe_id(&object.id).await?
        else {
            warn!("Stripe updated unknown subscription {}", object.id);
            return Ok(WebhookOutcome::Ignored);
        };

        apply_stripe_state(&mut subscription, &object, now);
        if subscription.current_period_end < subscription.current_period_start {
            warn!("Stripe sent an inverted period for {}; update skipped", object.id);
            return Ok(WebhookOutcome::Ignored);
        }

        self.subscription_repository.apply_stripe_state(&subscription).await?;
        Ok(WebhookOutcome::Updated(subscription))
    }
}

/// Copies status and period bounds from a Stripe subscription object.
fn apply_stripe_state(
    subscription: &mut Subscription,
    object: &StripeSubscriptionObject,
    now: DateTime<Utc>,
) {
    let status = SubscriptionStatus::from_stripe(&object.status);
    let was_canceled = subscription.status == SubscriptionStatus::Canceled;
    if status == SubscriptionStatus::Canceled && !was_canceled {
        subscription.canceled_at = Some(now);
    } else if status != SubscriptionStatus::Canceled {
        subscription.canceled_at = None;
    }
    subscription.status = status;
    subscription.is_trial = status == SubscriptionStatus::Trialing;

    if let Some(start) = from_unix(object.current_period_start) {
        subscription.current_period_start = start;
    }
    if let Some(end) = from_unix(object.current_period_end) {
        subscription.current_period_end = end;
    }
    if object.customer.is_some() {
        subscription.stripe_customer_id = object.customer.clone();
    }
    subscription.updated_at = now;
}
