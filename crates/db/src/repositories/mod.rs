//! Repositories wrapping sea-orm queries for each table.

mod follows;
mod message;
mod user;

pub use follows::FollowsRepository;
pub use message::MessageRepository;
pub use user::UserRepository;
