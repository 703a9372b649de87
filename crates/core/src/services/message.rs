//! Message service: posting, deleting and the home feed.

use std::collections::HashMap;

use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;
use warbler_common::{AppError, AppResult, IdGenerator};
use warbler_db::{
    entities::{message, user},
    repositories::{FollowsRepository, MessageRepository, UserRepository},
};

/// Maximum number of messages in a home feed.
pub const FEED_LIMIT: u64 = 100;

/// Input for posting a message.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMessageInput {
    #[validate(length(min = 1, max = 140, message = "Message must be 1 to 140 characters"))]
    pub text: String,
}

/// A message paired with its author, as shown in feeds.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub message: message::Model,
    pub author: user::Model,
}

/// Message service for business logic.
#[derive(Clone)]
pub struct MessageService {
    message_repo: MessageRepository,
    user_repo: UserRepository,
    follows_repo: FollowsRepository,
    id_gen: IdGenerator,
}

impl MessageService {
    /// Create a new message service.
    #[must_use]
    pub fn new(
        message_repo: MessageRepository,
        user_repo: UserRepository,
        follows_repo: FollowsRepository,
    ) -> Self {
        Self {
            message_repo,
            user_repo,
            follows_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a message as `user_id`.
    pub async fn create(&self, user_id: &str, input: CreateMessageInput) -> AppResult<message::Model> {
        let input = CreateMessageInput {
            text: input.text.trim().to_string(),
        };
        input.validate()?;

        let model = message::ActiveModel {
            id: Set(self.id_gen.generate()),
            text: Set(input.text),
            user_id: Set(user_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let msg = self.message_repo.create(model).await?;
        tracing::debug!(message_id = %msg.id, user_id = %user_id, "Message created");
        Ok(msg)
    }

    /// Get a message by ID.
    pub async fn get(&self, id: &str) -> AppResult<message::Model> {
        self.message_repo.get_by_id(id).await
    }

    /// Get a message together with its author.
    pub async fn get_with_author(&self, id: &str) -> AppResult<FeedItem> {
        let message = self.message_repo.get_by_id(id).await?;
        let author = self.user_repo.get_by_id(&message.user_id).await?;
        Ok(FeedItem { message, author })
    }

    /// Delete a message. Only its author may do so.
    pub async fn delete(&self, user_id: &str, message_id: &str) -> AppResult<message::Model> {
        let message = self.message_repo.get_by_id(message_id).await?;

        if message.user_id != user_id {
            return Err(AppError::Forbidden(
                "Cannot delete another user's message".to_string(),
            ));
        }

        self.message_repo.delete(message_id).await?;
        tracing::debug!(message_id = %message_id, user_id = %user_id, "Message deleted");
        Ok(message)
    }

    /// Messages written by a user, newest first.
    pub async fn user_messages(&self, user_id: &str, limit: u64) -> AppResult<Vec<message::Model>> {
        self.message_repo.find_by_user(user_id, limit).await
    }

    /// Messages from the users `user_id` follows, newest first.
    ///
    /// The user's own messages are never part of the feed, even when a
    /// self-follow edge exists in the store.
    pub async fn messages_from_followed_users(&self, user_id: &str) -> AppResult<Vec<FeedItem>> {
        let followed_ids: Vec<String> = self
            .follows_repo
            .find_by_follower(user_id)
            .await?
            .into_iter()
            .map(|f| f.followed_id)
            .filter(|id| id != user_id)
            .collect();

        let messages = self
            .message_repo
            .find_by_user_ids(&followed_ids, FEED_LIMIT)
            .await?;

        self.attach_authors(messages).await
    }

    async fn attach_authors(&self, messages: Vec<message::Model>) -> AppResult<Vec<FeedItem>> {
        let mut author_ids: Vec<String> = messages.iter().map(|m| m.user_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(messages
            .into_iter()
            .filter_map(|message| {
                let author = authors.get(&message.user_id)?.clone();
                Some(FeedItem { message, author })
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use warbler_db::entities::follows;

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

    fn create_test_message(id: &str, user_id: &str, minutes_ago: i64) -> message::Model {
        message::Model {
            id: id.to_string(),
            text: format!("message {id}"),
            user_id: user_id.to_string(),
            created_at: (Utc::now() - Duration::minutes(minutes_ago)).into(),
        }
    }

    fn create_test_follow(follower_id: &str, followed_id: &str) -> follows::Model {
        follows::Model {
            follower_id: follower_id.to_string(),
            followed_id: followed_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service(db: &Arc<DatabaseConnection>) -> MessageService {
        MessageService::new(
            MessageRepository::new(Arc::clone(db)),
            UserRepository::new(Arc::clone(db)),
            FollowsRepository::new(Arc::clone(db)),
        )
    }

    #[tokio::test]
    async fn test_create_message() {
        let msg = create_test_message("m1", "u1", 0);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[msg]])
                .into_connection(),
        );

        let input = CreateMessageInput {
            text: "  message m1  ".to_string(),
        };
        let created = service(&db).create("u1", input).await.unwrap();
        assert_eq!(created.user_id, "u1");
    }

    #[tokio::test]
    async fn test_create_message_too_long() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = CreateMessageInput {
            text: "a".repeat(141),
        };
        let result = service(&db).create("u1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_message_blank() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = CreateMessageInput {
            text: "   ".to_string(),
        };
        let result = service(&db).create("u1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_message_counts_characters_not_bytes() {
        let text = "é".repeat(140);
        let msg = message::Model {
            text: text.clone(),
            ..create_test_message("m1", "u1", 0)
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[msg]])
                .into_connection(),
        );

        let created = service(&db)
            .create("u1", CreateMessageInput { text })
            .await
            .unwrap();
        assert_eq!(created.text.chars().count(), 140);
    }

    #[tokio::test]
    async fn test_delete_other_users_message_is_forbidden() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_message("m1", "u2", 0)]])
                .into_connection(),
        );

        let result = service(&db).delete("u1", "m1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_own_message() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_message("m1", "u1", 0)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let deleted = service(&db).delete("u1", "m1").await.unwrap();
        assert_eq!(deleted.id, "m1");
    }

    #[tokio::test]
    async fn test_feed_contains_followed_users_messages_only() {
        // u1 follows u2 and u3; u1's own message must not show up
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_follow("u1", "u2"),
                    create_test_follow("u1", "u3"),
                ]])
                .append_query_results([[
                    create_test_message("m3", "u3", 1),
                    create_test_message("m2", "u2", 2),
                ]])
                .append_query_results([[create_test_user("u2"), create_test_user("u3")]])
                .into_connection(),
        );

        let svc = service(&db);
        let feed = svc.messages_from_followed_users("u1").await.unwrap();
        drop(svc);

        let ids: Vec<_> = feed.iter().map(|f| f.message.id.as_str()).collect();
        assert_eq!(ids, vec!["m3", "m2"]);
        assert!(feed.iter().all(|f| f.author.id != "u1"));
        assert_eq!(feed[0].author.id, "u3");

        // The message query filtered on exactly the followed users
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let message_query = format!("{:?}", log[1]);
        assert!(message_query.contains("u2"));
        assert!(message_query.contains("u3"));
        assert!(!message_query.contains("\"u1\""));
    }

    #[tokio::test]
    async fn test_feed_ignores_self_follow_edge() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_follow("u1", "u1")]])
                .into_connection(),
        );

        // With no one else followed, no message or author query runs
        let feed = service(&db).messages_from_followed_users("u1").await.unwrap();
        assert!(feed.is_empty());
    }

    #[tokio::test]
    async fn test_feed_empty_when_following_nobody() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follows::Model>::new()])
                .into_connection(),
        );

        let feed = service(&db).messages_from_followed_users("u1").await.unwrap();
        assert!(feed.is_empty());
    }
}
