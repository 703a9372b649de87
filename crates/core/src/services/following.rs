//! Following service and the social graph view.

use sea_orm::Set;
use serde::Serialize;
use warbler_common::{AppError, AppResult};
use warbler_db::{
    entities::{follows, user},
    repositories::{FollowsRepository, UserRepository},
};

/// A user together with the users they follow and the users following them.
///
/// The predicates are membership checks over the loaded collections, so a
/// graph reflects the edges that existed when it was loaded.
#[derive(Debug, Clone, Serialize)]
pub struct SocialGraph {
    pub user: user::Model,
    pub following: Vec<user::Model>,
    pub followers: Vec<user::Model>,
}

impl SocialGraph {
    /// Whether this user follows `other_id`.
    #[must_use]
    pub fn is_following(&self, other_id: &str) -> bool {
        self.following.iter().any(|u| u.id == other_id)
    }

    /// Whether `other_id` follows this user.
    #[must_use]
    pub fn is_followed_by(&self, other_id: &str) -> bool {
        self.followers.iter().any(|u| u.id == other_id)
    }

    /// IDs of the users this user follows.
    #[must_use]
    pub fn following_ids(&self) -> Vec<String> {
        self.following.iter().map(|u| u.id.clone()).collect()
    }
}

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    follows_repo: FollowsRepository,
    user_repo: UserRepository,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(follows_repo: FollowsRepository, user_repo: UserRepository) -> Self {
        Self {
            follows_repo,
            user_repo,
        }
    }

    /// Make `follower_id` follow `followed_id`.
    pub async fn follow(&self, follower_id: &str, followed_id: &str) -> AppResult<follows::Model> {
        // Can't follow yourself
        if follower_id == followed_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        // Target must exist
        self.user_repo.get_by_id(followed_id).await?;

        if self.follows_repo.exists(follower_id, followed_id).await? {
            return Err(AppError::Conflict("Already following".to_string()));
        }

        let model = follows::ActiveModel {
            follower_id: Set(follower_id.to_string()),
            followed_id: Set(followed_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let edge = self.follows_repo.create(model).await?;
        tracing::info!(follower_id = %follower_id, followed_id = %followed_id, "Followed user");
        Ok(edge)
    }

    /// Remove the edge `follower_id -> followed_id`.
    pub async fn unfollow(&self, follower_id: &str, followed_id: &str) -> AppResult<()> {
        if !self
            .follows_repo
            .delete_by_pair(follower_id, followed_id)
            .await?
        {
            return Err(AppError::BadRequest("Not following".to_string()));
        }

        tracing::info!(follower_id = %follower_id, followed_id = %followed_id, "Unfollowed user");
        Ok(())
    }

    /// Whether `follower_id` follows `followed_id`.
    pub async fn is_following(&self, follower_id: &str, followed_id: &str) -> AppResult<bool> {
        self.follows_repo.exists(follower_id, followed_id).await
    }

    /// Users that `user_id` follows.
    pub async fn following(&self, user_id: &str) -> AppResult<Vec<user::Model>> {
        self.follows_repo.find_following(user_id).await
    }

    /// Users following `user_id`.
    pub async fn followers(&self, user_id: &str) -> AppResult<Vec<user::Model>> {
        self.follows_repo.find_followers(user_id).await
    }

    /// Load a user with both sides of their follow graph.
    pub async fn social_graph(&self, user_id: &str) -> AppResult<SocialGraph> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let following = self.follows_repo.find_following(user_id).await?;
        let followers = self.follows_repo.find_followers(user_id).await?;

        Ok(SocialGraph {
            user,
            following,
            followers,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: format!("name_{id}"),
            email: format!("{id}@example.com"),
            password: "$argon2id$hash".to_string(),
            image_url: None,
            header_image_url: None,
            bio: None,
            location: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_follow(follower_id: &str, followed_id: &str) -> follows::Model {
        follows::Model {
            follower_id: follower_id.to_string(),
            followed_id: followed_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service(db: &Arc<DatabaseConnection>) -> FollowingService {
        FollowingService::new(
            FollowsRepository::new(Arc::clone(db)),
            UserRepository::new(Arc::clone(db)),
        )
    }

    #[test]
    fn test_social_graph_predicates_are_directional() {
        // u1 follows u2 only
        let u1 = SocialGraph {
            user: create_test_user("u1"),
            following: vec![create_test_user("u2")],
            followers: vec![],
        };
        let u2 = SocialGraph {
            user: create_test_user("u2"),
            following: vec![],
            followers: vec![create_test_user("u1")],
        };

        assert!(u1.is_following("u2"));
        assert!(!u2.is_following("u1"));
        assert!(u2.is_followed_by("u1"));
        assert!(!u1.is_followed_by("u2"));
        assert_eq!(u1.following_ids(), vec!["u2".to_string()]);
    }

    #[tokio::test]
    async fn test_follow_creates_edge() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u2")]])
                .append_query_results([Vec::<follows::Model>::new()])
                .append_query_results([[create_test_follow("u1", "u2")]])
                .into_connection(),
        );

        let edge = service(&db).follow("u1", "u2").await.unwrap();
        assert_eq!(edge.follower_id, "u1");
        assert_eq!(edge.followed_id, "u2");
    }

    #[tokio::test]
    async fn test_follow_self_is_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(&db).follow("u1", "u1").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_follow_unknown_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let result = service(&db).follow("u1", "ghost").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_follow_twice_conflicts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u2")]])
                .append_query_results([[create_test_follow("u1", "u2")]])
                .into_connection(),
        );

        let result = service(&db).follow("u1", "u2").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unfollow_when_not_following() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let result = service(&db).unfollow("u1", "u2").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_social_graph_loads_both_sides() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1")]])
                .append_query_results([[create_test_user("u2"), create_test_user("u3")]])
                .append_query_results([[create_test_user("u3")]])
                .into_connection(),
        );

        let graph = service(&db).social_graph("u1").await.unwrap();
        assert!(graph.is_following("u2"));
        assert!(graph.is_following("u3"));
        assert!(graph.is_followed_by("u3"));
        assert!(!graph.is_followed_by("u2"));
    }
}
