//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;
use warbler_common::{AppError, AppResult, IdGenerator};
use warbler_db::{
    entities::{message, user},
    repositories::{FollowsRepository, MessageRepository, UserRepository},
};

/// Number of messages shown on a profile page.
pub const PROFILE_MESSAGES_LIMIT: u64 = 100;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    message_repo: MessageRepository,
    follows_repo: FollowsRepository,
    id_gen: IdGenerator,
}

/// Input for signing up.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupInput {
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(max = 1024))]
    pub image_url: Option<String>,
}

/// Input for editing a profile.
///
/// `password` is the user's current password and is only checked, never stored.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(max = 1024))]
    pub image_url: Option<String>,

    #[validate(length(max = 1024))]
    pub header_image_url: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    #[validate(length(max = 256))]
    pub location: Option<String>,

    pub password: String,
}

/// Everything a profile page shows about one user.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub user: user::Model,
    pub messages: Vec<message::Model>,
    pub messages_count: u64,
    pub following_count: u64,
    pub followers_count: u64,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        message_repo: MessageRepository,
        follows_repo: FollowsRepository,
    ) -> Self {
        Self {
            user_repo,
            message_repo,
            follows_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Sign up a new user.
    ///
    /// Returns `Ok(None)` when the username or email is already taken; the
    /// store is left unchanged in that case.
    pub async fn signup(&self, input: SignupInput) -> AppResult<Option<user::Model>> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username_or_email(&input.username, &input.email)
            .await?
            .is_some()
        {
            tracing::debug!(username = %input.username, "Signup rejected: username or email taken");
            return Ok(None);
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            email: Set(input.email),
            password: Set(password_hash),
            image_url: Set(non_blank(input.image_url)),
            header_image_url: Set(None),
            bio: Set(None),
            location: Set(None),
            created_at: Set(chrono::Utc::now().into()),
        };

        // A concurrent signup can still win the race; the unique index decides
        let user = self.user_repo.try_create(model).await?;
        if let Some(ref u) = user {
            tracing::info!(user_id = %u.id, username = %u.username, "User signed up");
        }
        Ok(user)
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Find a user by ID.
    pub async fn find(&self, id: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_id(id).await
    }

    /// List users, optionally filtered by a username search.
    pub async fn search(&self, query: Option<&str>, limit: u64) -> AppResult<Vec<user::Model>> {
        self.user_repo.search(query, limit).await
    }

    /// Load a user's profile page data.
    pub async fn get_profile(&self, id: &str) -> AppResult<ProfileSummary> {
        let user = self.user_repo.get_by_id(id).await?;
        let messages = self
            .message_repo
            .find_by_user(id, PROFILE_MESSAGES_LIMIT)
            .await?;
        let messages_count = self.message_repo.count_by_user(id).await?;
        let following_count = self.follows_repo.count_following(id).await?;
        let followers_count = self.follows_repo.count_followers(id).await?;

        Ok(ProfileSummary {
            user,
            messages,
            messages_count,
            following_count,
            followers_count,
        })
    }

    /// Update a user's profile after re-checking their password.
    ///
    /// Blank image fields fall back to the default images.
    pub async fn update_profile(
        &self,
        id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(id).await?;
        if !verify_password(&input.password, &user.password)? {
            return Err(AppError::Unauthorized);
        }

        let mut active: user::ActiveModel = user.into();
        active.username = Set(input.username);
        active.email = Set(input.email);
        active.image_url = Set(non_blank(input.image_url));
        active.header_image_url = Set(non_blank(input.header_image_url));
        active.bio = Set(non_blank(input.bio));
        active.location = Set(non_blank(input.location));

        let updated = self.user_repo.update(active).await?;
        tracing::info!(user_id = %updated.id, "Profile updated");
        Ok(updated)
    }

    /// Delete a user together with their messages and follow edges.
    pub async fn delete_account(&self, id: &str) -> AppResult<()> {
        if !self.user_repo.delete_with_dependents(id).await? {
            return Err(AppError::UserNotFound(id.to_string()));
        }
        tracing::info!(user_id = %id, "Account deleted");
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Hash a password.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
