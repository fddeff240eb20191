//! Social network API abstraction.
//!
//! The rest of the crate talks to the network only through the
//! [`SocialApi`] trait. [`TwitterClient`] implements it over REST v1.1;
//! tests use `testing::MockSocialApi`.

mod client;
mod error;
mod oauth;
mod types;

pub use client::TwitterClient;
pub use error::{ApiError, QUOTA_ERROR_CODES};
pub use types::*;

use async_trait::async_trait;
use std::path::Path;

/// Maximum number of ids accepted by a single user lookup.
pub const LOOKUP_BATCH_LIMIT: usize = 100;

/// Authenticated calls the bot needs from the social network.
///
/// Every method is a single request. Implementations must not retry.
#[async_trait]
pub trait SocialApi: Send + Sync {
    /// Returns the name of this backend.
    fn name(&self) -> &str;

    /// One page of follower or friend ids of `screen_name`.
    async fn list_ids(
        &self,
        listing: IdListing,
        screen_name: &str,
        cursor: Cursor,
    ) -> Result<IdPage, ApiError>;

    /// Profiles for up to [`LOOKUP_BATCH_LIMIT`] ids.
    async fn lookup_users(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, ApiError>;

    async fn follow(&self, id: UserId) -> Result<UserProfile, ApiError>;

    async fn unfollow(&self, id: UserId) -> Result<UserProfile, ApiError>;

    async fn favorite(&self, id: StatusId) -> Result<Post, ApiError>;

    async fn retweet(&self, id: StatusId) -> Result<Post, ApiError>;

    async fn unretweet(&self, id: StatusId) -> Result<Post, ApiError>;

    /// Post a status, uploading `media` first when given.
    async fn post_status(&self, text: &str, media: Option<&Path>) -> Result<Post, ApiError>;

    async fn delete_status(&self, id: StatusId) -> Result<Post, ApiError>;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Post>, ApiError>;

    /// One page of ids the operator has muted.
    async fn list_muted_ids(&self, cursor: Cursor) -> Result<IdPage, ApiError>;

    async fn mute(&self, id: UserId) -> Result<UserProfile, ApiError>;

    async fn unmute(&self, id: UserId) -> Result<UserProfile, ApiError>;

    /// Add `screen_name` to the operator's list `slug`.
    async fn add_list_member(
        &self,
        owner_screen_name: &str,
        slug: &str,
        screen_name: &str,
    ) -> Result<ListInfo, ApiError>;
}
