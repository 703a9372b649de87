//! Business logic services.

#![allow(missing_docs)]

pub mod following;
pub mod message;
pub mod user;

pub use following::{FollowingService, SocialGraph};
pub use message::{CreateMessageInput, FEED_LIMIT, FeedItem, MessageService};
pub use user::{ProfileSummary, SignupInput, UpdateProfileInput, UserService};
