//! Follows repository.

use std::sync::Arc;

use crate::entities::{Follows, User, follows, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use warbler_common::{AppError, AppResult};

/// Follows repository for database operations.
#[derive(Clone)]
pub struct FollowsRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowsRepository {
    /// Create a new follows repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the edge `follower_id -> followed_id`.
    pub async fn find_by_pair(
        &self,
        follower_id: &str,
        followed_id: &str,
    ) -> AppResult<Option<follows::Model>> {
        Follows::find()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .filter(follows::Column::FollowedId.eq(followed_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if `follower_id` follows `followed_id`.
    pub async fn exists(&self, follower_id: &str, followed_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(follower_id, followed_id).await?.is_some())
    }

    /// Create a follow edge.
    pub async fn create(&self, model: follows::ActiveModel) -> AppResult<follows::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete the edge `follower_id -> followed_id`. Returns whether it existed.
    pub async fn delete_by_pair(&self, follower_id: &str, followed_id: &str) -> AppResult<bool> {
        let result = Follows::delete_many()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .filter(follows::Column::FollowedId.eq(followed_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Edges going out of a user.
    pub async fn find_by_follower(&self, follower_id: &str) -> AppResult<Vec<follows::Model>> {
        Follows::find()
            .filter(follows::Column::FollowerId.eq(follower_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users that `user_id` follows, most recently followed first.
    pub async fn find_following(&self, user_id: &str) -> AppResult<Vec<user::Model>> {
        User::find()
            .join_rev(JoinType::InnerJoin, follows::Relation::Followed.def())
            .filter(follows::Column::FollowerId.eq(user_id))
            .order_by_desc(follows::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users following `user_id`, most recent first.
    pub async fn find_followers(&self, user_id: &str) -> AppResult<Vec<user::Model>> {
        User::find()
            .join_rev(JoinType::InnerJoin, follows::Relation::Follower.def())
            .filter(follows::Column::FollowedId.eq(user_id))
            .order_by_desc(follows::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count followers of a user.
    pub async fn count_followers(&self, user_id: &str) -> AppResult<u64> {
        Follows::find()
            .filter(follows::Column::FollowedId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users a user follows.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        Follows::find()
            .filter(follows::Column::FollowerId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};

    fn create_test_follow(follower_id: &str, followed_id: &str) -> follows::Model {
        follows::Model {
            follower_id: follower_id.to_string(),
            followed_id: followed_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

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

    #[tokio::test]
    async fn test_exists_true() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_follow("user1", "user2")]])
                .into_connection(),
        );

        let repo = FollowsRepository::new(db);
        assert!(repo.exists("user1", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follows::Model>::new()])
                .into_connection(),
        );

        let repo = FollowsRepository::new(db);
        assert!(!repo.exists("user2", "user1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_pair() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = FollowsRepository::new(db);
        assert!(repo.delete_by_pair("user1", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_following_returns_users() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user2"), create_test_user("user3")]])
                .into_connection(),
        );

        let repo = FollowsRepository::new(db);
        let users = repo.find_following("user1").await.unwrap();

        let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["user2", "user3"]);
    }

    #[test]
    fn test_following_query_joins_on_followed_side() {
        let sql = User::find()
            .join_rev(JoinType::InnerJoin, follows::Relation::Followed.def())
            .filter(follows::Column::FollowerId.eq("user1"))
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"INNER JOIN "follows""#));
        assert!(sql.contains(r#""follows"."followed_id""#));
        assert!(sql.contains(r#""follows"."follower_id" = 'user1'"#));
    }

    #[tokio::test]
    async fn test_count_followers() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(2))
                }]])
                .into_connection(),
        );

        let repo = FollowsRepository::new(db);
        assert_eq!(repo.count_followers("user1").await.unwrap(), 2);
    }
}
