//! Response helpers and the view models handed to templates.

#![allow(missing_docs)]

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use warbler_core::{FeedItem, ProfileSummary, UpdateProfileInput};
use warbler_db::entities::{message, user};

/// `302 Found` redirect to `location`.
pub fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

const TIMESTAMP_FORMAT: &str = "%d %B %Y";

/// A user as templates see it: no password, image defaults applied.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl From<&user::Model> for UserView {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            image_url: user.image_url_or_default().to_string(),
            header_image_url: user.header_image_url_or_default().to_string(),
            bio: user.bio.clone(),
            location: user.location.clone(),
        }
    }
}

/// Convert a slice of users.
pub fn user_views(users: &[user::Model]) -> Vec<UserView> {
    users.iter().map(UserView::from).collect()
}

/// A message as templates see it.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub id: String,
    pub text: String,
    pub user_id: String,
    pub timestamp: String,
    pub author: Option<UserView>,
}

impl MessageView {
    fn build(message: &message::Model, author: Option<UserView>) -> Self {
        Self {
            id: message.id.clone(),
            text: message.text.clone(),
            user_id: message.user_id.clone(),
            timestamp: message.created_at.format(TIMESTAMP_FORMAT).to_string(),
            author,
        }
    }

    /// A message whose author is shown elsewhere on the page.
    pub fn bare(message: &message::Model) -> Self {
        Self::build(message, None)
    }
}

impl From<&FeedItem> for MessageView {
    fn from(item: &FeedItem) -> Self {
        Self::build(&item.message, Some(UserView::from(&item.author)))
    }
}

/// Header data shared by the profile, following and followers pages.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user: UserView,
    pub messages_count: u64,
    pub following_count: u64,
    pub followers_count: u64,
}

impl From<&ProfileSummary> for ProfileView {
    fn from(summary: &ProfileSummary) -> Self {
        Self {
            user: UserView::from(&summary.user),
            messages_count: summary.messages_count,
            following_count: summary.following_count,
            followers_count: summary.followers_count,
        }
    }
}

/// Values shown in the profile edit form.
///
/// Blank optional fields stay blank instead of showing the default images,
/// so saving an untouched form keeps them unset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: String,
    pub location: String,
}

impl From<&user::Model> for ProfileForm {
    fn from(user: &user::Model) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            image_url: user.image_url.clone().unwrap_or_default(),
            header_image_url: user.header_image_url.clone().unwrap_or_default(),
            bio: user.bio.clone().unwrap_or_default(),
            location: user.location.clone().unwrap_or_default(),
        }
    }
}

impl From<&UpdateProfileInput> for ProfileForm {
    fn from(input: &UpdateProfileInput) -> Self {
        Self {
            username: input.username.clone(),
            email: input.email.clone(),
            image_url: input.image_url.clone().unwrap_or_default(),
            header_image_url: input.header_image_url.clone().unwrap_or_default(),
            bio: input.bio.clone().unwrap_or_default(),
            location: input.location.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn test_user() -> user::Model {
        user::Model {
            id: "u1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "$argon2id$hash".to_string(),
            image_url: None,
            header_image_url: Some("/hdr.png".to_string()),
            bio: None,
            location: None,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_redirect_is_found() {
        let response = redirect("/login");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[test]
    fn test_user_view_applies_defaults() {
        let view = UserView::from(&test_user());
        assert_eq!(view.image_url, user::DEFAULT_IMAGE_URL);
        assert_eq!(view.header_image_url, "/hdr.png");
    }

    #[test]
    fn test_profile_form_keeps_blank_images_blank() {
        let form = ProfileForm::from(&test_user());
        assert_eq!(form.image_url, "");
        assert_eq!(form.header_image_url, "/hdr.png");
        assert_eq!(form.bio, "");
    }

    #[test]
    fn test_profile_form_from_submitted_input() {
        let input = UpdateProfileInput {
            username: "alice2".to_string(),
            email: "not-an-email".to_string(),
            image_url: None,
            header_image_url: None,
            bio: Some("typed bio".to_string()),
            location: None,
            password: "secret".to_string(),
        };

        let form = ProfileForm::from(&input);
        assert_eq!(form.username, "alice2");
        assert_eq!(form.email, "not-an-email");
        assert_eq!(form.bio, "typed bio");
    }

    #[test]
    fn test_message_timestamp_format() {
        let msg = message::Model {
            id: "m1".to_string(),
            text: "hi".to_string(),
            user_id: "u1".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap().into(),
        };
        assert_eq!(MessageView::bare(&msg).timestamp, "05 March 2024");
    }
}
