use crate::{
    config::app_config::AppConfig,
    errors::{AppError, AppResult, is_duplicate_key},
    models::user_model::{DashboardAssignment, User},
    repositories::{
        dashboard_repository::DashboardRepository, subscription_repository::SubscriptionRepository,
        user_repository::UserRepository,
    },
    types::{
        models::user::role::Role,
        requests::{
            auth::register_request::RegisterRequest,
            user::{
                assign_dashboard_request::AssignDashboardRequest,
                create_user_request::CreateUserRequest, update_user_request::UpdateUserRequest,
            },
        },
    },
    utils::{
        auth_utils::{generate_jwt, generate_verification_token, hash_password, verify_password},
        locale_utils::{Messages, Namespace},
    },
    validations::common::normalize_phone,
};
use anyhow::anyhow;
use bson::{Document, doc, oid::ObjectId, to_bson};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash(password: &str, email: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| {
        AppError::Internal(anyhow!("Failed to hash password for user '{}': {}", email, e))
    })
}

/// `$set`/`$unset` document for an admin edit. Only supplied fields are
/// written; dashboard assignments are never part of it.
fn user_update_document(
    changes: &UpdateUserRequest,
    email: Option<&str>,
    password_hash: Option<&str>,
    now: DateTime<Utc>,
) -> bson::ser::Result<Document> {
    let mut set = doc! { "updated_at": to_bson(&now)? };
    let mut unset = Document::new();

    if let Some(name) = changes.name.as_deref() {
        set.insert("name", name.trim());
    }
    if let Some(email) = email {
        set.insert("email", email);
    }
    if let Some(password_hash) = password_hash {
        set.insert("password", password_hash);
    }
    if let Some(role) = changes.role {
        set.insert("role", to_bson(&role)?);
    }
    if let Some(phone) = changes.phone.as_deref() {
        match normalize_phone(phone) {
            Some(phone) => {
                set.insert("phone", phone);
            }
            None => {
                unset.insert("phone", "");
            }
        }
    }
    if let Some(avatar_url) = changes.avatar_url.as_deref() {
        set.insert("avatar_url", avatar_url);
    }
    if let Some(is_verified) = changes.is_verified {
        set.insert("is_verified", is_verified);
        if is_verified {
            unset.insert("verification_token", "");
        }
    }

    let mut update = doc! { "$set": set };
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    Ok(update)
}

pub struct UserService {
    pub user_repository: Arc<UserRepository>,
    pub dashboard_repository: Arc<DashboardRepository>,
    pub subscription_repository: Arc<SubscriptionRepository>,
    jwt_secret: String,
    jwt_ttl_hours: i64,
}

impl UserService {
    pub fn new(
        user_repository: Arc<UserRepository>,
        dashboard_repository: Arc<DashboardRepository>,
        subscription_repository: Arc<SubscriptionRepository>,
        config: &AppConfig,
    ) -> Self {
        Self {
            user_repository,
            dashboard_repository,
            subscription_repository,
            jwt_secret: config.jwt_secret.clone(),
            jwt_ttl_hours: config.jwt_ttl_hours,
        }
    }

    fn duplicate_email(email: &str, messages: &Messages, namespace: Namespace) -> AppError {
        let key = match namespace {
            Namespace::Auth => "register.duplicate",
            _ => "create.duplicate",
        };
        warn!("Rejected duplicate email '{}'", email);
        AppError::Conflict(messages.get_str(
            namespace,
            key,
            "A user with this email already exists.",
        ))
    }

    /// The unique email index still has the last word when two writes race
    /// past `ensure_email_free`.
    fn email_write_error(
        err: mongodb::error::Error,
        email: &str,
        messages: &Messages,
        namespace: Namespace,
    ) -> AppError {
        if is_duplicate_key(&err) {
            Self::duplicate_email(email, messages, namespace)
        } else {
            AppError::Database(err)
        }
    }

    async fn ensure_email_free(
        &self,
        email: &str,
        messages: &Messages,
        namespace: Namespace,
    ) -> AppResult<()> {
        if self.user_repository.find_user("email", email).await?.is_some() {
            return Err(Self::duplicate_email(email, messages, namespace));
        }
        Ok(())
    }

    fn not_found(messages: &Messages) -> AppError {
        AppError::NotFound(messages.get_str(Namespace::User, "fetch.not_found", "User not found."))
    }

    async fn require_user(&self, id: &ObjectId, messages: &Messages) -> AppResult<User> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(messages))
    }

    /// Self-service sign-up. The account starts unverified with a fresh
    /// verification token.
    pub async fn register_user(
        &self,
        new_user: RegisterRequest,
        messages: &Messages,
    ) -> AppResult<User> {
        let email = normalize_email(&new_user.email);
        self.ensure_email_free(&email, messages, Namespace::Auth).await?;

        let now = Utc::now();
        let user = User {
            _id: Some(ObjectId::new()),
            name: new_user.name.trim().to_string(),
            password: hash(&new_user.password, &email)?,
            email,
            role: Role::User,
            avatar_url: None,
            phone: new_user.phone.as_deref().and_then(normalize_phone),
            is_verified: false,
            verification_token: Some(generate_verification_token()),
            dashboard_assignments: Vec::new(),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        let user = self
            .user_repository
            .create_user(&user)
            .await
            .map_err(|err| Self::email_write_error(err, &user.email, messages, Namespace::Auth))?;
        if let Some(token) = user.verification_token.as_deref() {
            info!("Registered {}; verification link: /api/auth/verify/{}", user.email, token);
        }
        Ok(user)
    }

    pub async fn authenticate_user(
        &self,
        email: &str,
        password: &str,
        messages: &Messages,
    ) -> AppResult<(User, String)> {
        let invalid = || {
            AppError::Unauthorized(messages.get_str(
                Namespace::Auth,
                "login.invalid_credentials",
                "Invalid email or password.",
            ))
        };

        let email = normalize_email(email);
        let mut user = self.user_repository.find_user("email", &email).await?.ok_or_else(invalid)?;

        let matches = verify_password(password, &user.password).map_err(|err| {
            AppError::Internal(anyhow!(
                "Password verification failed for user '{}': {:?}",
                user.email,
                err
            ))
        })?;
        if !matches {
            warn!("Failed login for {}", email);
            return Err(invalid());
        }

        let id = user._id.ok_or_else(|| AppError::Internal(anyhow!("Stored user has no _id")))?;
        let token = generate_jwt(
            &id.to_hex(),
            &user.name,
            &user.email,
            user.role,
            &self.jwt_secret,
            self.jwt_ttl_hours,
        )
        .map_err(|e| {
            AppError::Internal(anyhow!("JWT generation failed for user '{}': {}", user.email, e))
        })?;

        let now = Utc::now();
        self.user_repository.set_last_login(&id, now).await?;
        user.last_login_at = Some(now);

        Ok((user, token))
    }

    pub async fn verify_email(&self, token: &str, messages: &Messages) -> AppResult<()> {
        if !self.user_repository.mark_verified(token, Utc::now()).await? {
            return Err(AppError::BadRequest(messages.get_str(
                Namespace::Auth,
                "verify.invalid_token",
                "Verification link is invalid or already used.",
            )));
        }
        Ok(())
    }

    pub async fn get_all_users(&self) -> AppResult<Vec<User>> {
        Ok(self.user_repository.get_all_users().await?)
    }

    pub async fn get_user(&self, id: &ObjectId, messages: &Messages) -> AppResult<User> {
        self.require_user(id, messages).await
    }

    pub async fn create_user(
        &self,
        new_user: CreateUserRequest,
        messages: &Messages,
    ) -> AppResult<User> {
        let email = normalize_email(&new_user.email);
        self.ensure_email_free(&email, messages, Namespace::User).await?;

        let now = Utc::now();
        let user = User {
            _id: Some(ObjectId::new()),
            name: new_user.name.trim().to_string(),
            password: hash(&new_user.password, &email)?,
            email,
            role: new_user.role.unwrap_or(Role::User),
            avatar_url: new_user.avatar_url,
            phone: new_user.phone.as_deref().and_then(normalize_phone),
            is_verified: new_user.is_verified.unwrap_or(true),
            verification_token: None,
            dashboard_assignments: Vec::new(),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        let user = self
            .user_repository
            .create_user(&user)
            .await
            .map_err(|err| Self::email_write_error(err, &user.email, messages, Namespace::User))?;
        info!("Admin created user {} with role {}", user.email, user.role);
        Ok(user)
    }

    /// Writes only the supplied fields, so concurrent assignment changes
    /// and cleanup runs are kept.
    pub async fn update_user(
        &self,
        id: &ObjectId,
        changes: UpdateUserRequest,
        messages: &Messages,
    ) -> AppResult<User> {
        let current = self.require_user(id, messages).await?;

        let email = match changes.email.as_deref().map(normalize_email) {
            Some(email) if email != current.email => {
                self.ensure_email_free(&email, messages, Namespace::User).await?;
                Some(email)
            }
            _ => None,
        };
        let owner = email.as_deref().unwrap_or(&current.email);
        let password_hash = changes
            .password
            .as_deref()
            .map(|password| hash(password, owner))
            .transpose()?;

        let update =
            user_update_document(&changes, email.as_deref(), password_hash.as_deref(), Utc::now())?;
        self.user_repository
            .update_user(id, update)
            .await
            .map_err(|err| Self::email_write_error(err, owner, messages, Namespace::User))?
            .ok_or_else(|| Self::not_found(messages))
    }

    /// Removes the user together with their subscriptions.
    pub async fn delete_user(
        &self,
        id: &ObjectId,
        acting_admin: &ObjectId,
        messages: &Messages,
    ) -> AppResult<()> {
        if id == acting_admin {
            return Err(AppError::Conflict(messages.get_str(
                Namespace::User,
                "delete.self",
                "You cannot delete your own account.",
            )));
        }
        if !self.user_repository.delete_user(id).await? {
            return Err(Self::not_found(messages));
        }

        let removed = self.subscription_repository.delete_by_user(id).await?;
        info!("Deleted user {} and {} subscription(s)", id, removed);
        Ok(())
    }

    pub async fn list_assignments(
        &self,
        user_id: &ObjectId,
        messages: &Messages,
    ) -> AppResult<Vec<DashboardAssignment>> {
        Ok(self.require_user(user_id, messages).await?.dashboard_assignments)
    }

    /// Grants (or re-grants) one dashboard. Re-assigning replaces the expiry.
    pub async fn assign_dashboard(
        &self,
        user_id: &ObjectId,
        dashboard_id: ObjectId,
        request: &AssignDashboardRequest,
        now: DateTime<Utc>,
        messages: &Messages,
    ) -> AppResult<User> {
        if request.expires_at.is_some_and(|expires_at| expires_at <= now) {
            return Err(AppError::BadRequest(messages.get_str(
                Namespace::User,
                "assignments.invalid_expiry",
                "Expiry must be in the future.",
            )));
        }

        self.require_user(user_id, messages).await?;
        if self.dashboard_repository.find_by_id(&dashboard_id).await?.is_none() {
            return Err(AppError::NotFound(messages.get_str(
                Namespace::Dashboard,
                "fetch.not_found",
                "Dashboard not found.",
            )));
        }

        let assignment = DashboardAssignment {
            dashboard_id,
            assigned_at: now,
            expires_at: request.expires_at,
        };
        let user = self
            .user_repository
            .upsert_assignment(user_id, &assignment, now)
            .await?
            .ok_or_else(|| Self::not_found(messages))?;

        info!(
            "Assigned dashboard {} to {} (expires {:?})",
            dashboard_id, user.email, request.expires_at
        );
        Ok(user)
    }

    pub async fn remove_assignment(
        &self,
        user_id: &ObjectId,
        dashboard_id: &ObjectId,
        messages: &Messages,
    ) -> AppResult<User> {
        let not_assigned = || {
            AppError::NotFound(messages.get_str(
                Namespace::User,
                "assignments.not_found",
                "The user has no assignment for this dashboard.",
            ))
        };

        let user = self.require_user(user_id, messages).await?;
        if user.assignment_for(dashboard_id).is_none() {
            return Err(not_assigned());
        }

        self.user_repository
            .remove_assignment(user_id, dashboard_id, Utc::now())
            .await?
            .ok_or_else(not_assigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_compared_case_insensitively() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn update_writes_only_supplied_fields() {
        let changes = UpdateUserRequest {
            name: Some("  Grace Hopper ".to_string()),
            role: Some(Role::Admin),
            ..Default::default()
        };
        let update = user_update_document(&changes, None, None, Utc::now()).unwrap();

        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("name").unwrap(), "Grace Hopper");
        assert_eq!(set.get_str("role").unwrap(), "admin");
        assert!(set.contains_key("updated_at"));
        assert!(!set.contains_key("email"));
        assert!(!set.contains_key("password"));
        assert!(!set.contains_key("dashboard_assignments"));
        assert!(!update.contains_key("$unset"));
    }

    #[test]
    fn verifying_clears_token_and_bad_phone_is_removed() {
        let changes = UpdateUserRequest {
            phone: Some("12345".to_string()),
            is_verified: Some(true),
            ..Default::default()
        };
        let update = user_update_document(
            &changes,
            Some("ada@example.com"),
            Some("$argon2id$hash"),
            Utc::now(),
        )
        .unwrap();

        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("email").unwrap(), "ada@example.com");
        assert_eq!(set.get_str("password").unwrap(), "$argon2id$hash");
        assert!(set.get_bool("is_verified").unwrap());

        let unset = update.get_document("$unset").unwrap();
        assert!(unset.contains_key("verification_token"));
        assert!(unset.contains_key("phone"));
    }
}
