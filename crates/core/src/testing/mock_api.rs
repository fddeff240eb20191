//! Mock social API for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::{
    ApiError, Cursor, IdListing, IdPage, ListInfo, Post, SearchQuery, SocialApi, StatusId,
    UserId, UserProfile, FIRST_PAGE, LOOKUP_BATCH_LIMIT,
};

/// A recorded API call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    ListIds {
        listing: IdListing,
        screen_name: String,
        cursor: Cursor,
    },
    LookupUsers(Vec<UserId>),
    Follow(UserId),
    Unfollow(UserId),
    Favorite(StatusId),
    Retweet(StatusId),
    Unretweet(StatusId),
    PostStatus {
        text: String,
        media: Option<PathBuf>,
    },
    DeleteStatus(StatusId),
    Search(String),
    ListMuted(Cursor),
    Mute(UserId),
    Unmute(UserId),
    AddListMember {
        slug: String,
        screen_name: String,
    },
}

/// Mock implementation of the SocialApi trait.
///
/// Provides controllable behavior for testing:
/// - Serve id listings in pages of a configurable size
/// - Return configured profiles from lookups
/// - Return configured search results per phrase
/// - Fail the next call, or every call touching a given id
/// - Record every call for assertions
///
/// # Example
///
/// ```rust,ignore
/// use tweeterbot_core::testing::{fixtures, MockSocialApi, RecordedCall};
///
/// let api = MockSocialApi::new();
/// api.add_profile(fixtures::profile(1, "ferris", 500, 200)).await;
/// api.set_ids(IdListing::Followers, "me", vec![UserId(1)]).await;
///
/// // ... run a workflow ...
///
/// assert!(api.calls().await.contains(&RecordedCall::Follow(UserId(1))));
/// ```
pub struct MockSocialApi {
    /// Profiles returned by lookups and friendship calls.
    profiles: Arc<RwLock<HashMap<UserId, UserProfile>>>,
    /// Id listings by kind and screen name.
    id_lists: Arc<RwLock<HashMap<(IdListing, String), Vec<UserId>>>>,
    /// Ids the operator has muted.
    muted: Arc<RwLock<Vec<UserId>>>,
    /// Ids per listing page.
    page_size: Arc<RwLock<usize>>,
    /// Search results by phrase.
    search_results: Arc<RwLock<HashMap<String, Vec<Post>>>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<ApiError>>>,
    /// Ids (user or status) whose calls fail with (status, code).
    failing_ids: Arc<RwLock<HashMap<u64, (u16, Option<i64>)>>>,
    /// Next id handed out by post_status.
    next_status_id: Arc<RwLock<u64>>,
}

impl std::fmt::Debug for MockSocialApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSocialApi")
            .field("profiles", &"<profiles>")
            .field("id_lists", &"<id_lists>")
            .field("search_results", &"<search_results>")
            .field("calls", &"<calls>")
            .field("next_error", &"<next_error>")
            .finish()
    }
}

impl Default for MockSocialApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSocialApi {
    /// Create a new mock with no data.
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(RwLock::new(HashMap::new())),
            id_lists: Arc::new(RwLock::new(HashMap::new())),
            muted: Arc::new(RwLock::new(Vec::new())),
            page_size: Arc::new(RwLock::new(5000)),
            search_results: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failing_ids: Arc::new(RwLock::new(HashMap::new())),
            next_status_id: Arc::new(RwLock::new(1_000_000)),
        }
    }

    /// Add a profile returned by lookups.
    pub async fn add_profile(&self, profile: UserProfile) {
        self.profiles.write().await.insert(profile.id, profile);
    }

    /// Add several profiles.
    pub async fn add_profiles(&self, profiles: impl IntoIterator<Item = UserProfile>) {
        let mut map = self.profiles.write().await;
        for profile in profiles {
            map.insert(profile.id, profile);
        }
    }

    /// Set the ids returned for a listing of `screen_name`.
    pub async fn set_ids(&self, listing: IdListing, screen_name: &str, ids: Vec<UserId>) {
        self.id_lists
            .write()
            .await
            .insert((listing, screen_name.to_string()), ids);
    }

    /// Set the ids returned by the muted listing.
    pub async fn set_muted(&self, ids: Vec<UserId>) {
        *self.muted.write().await = ids;
    }

    /// Set how many ids each listing page holds.
    pub async fn set_page_size(&self, size: usize) {
        *self.page_size.write().await = size.max(1);
    }

    /// Set the posts returned when searching for `phrase`.
    pub async fn set_search_results(&self, phrase: &str, posts: Vec<Post>) {
        self.search_results
            .write()
            .await
            .insert(phrase.to_string(), posts);
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: ApiError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every call on `id` fail with an API error.
    pub async fn fail_id(&self, id: u64, status: u16, code: Option<i64>) {
        self.failing_ids.write().await.insert(id, (status, code));
    }

    /// Get recorded calls.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Recorded calls that change remote state.
    pub async fn mutations(&self) -> Vec<RecordedCall> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| {
                !matches!(
                    c,
                    RecordedCall::ListIds { .. }
                        | RecordedCall::LookupUsers(_)
                        | RecordedCall::Search(_)
                        | RecordedCall::ListMuted(_)
                )
            })
            .cloned()
            .collect()
    }

    /// Clear recorded calls.
    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    async fn record(&self, call: RecordedCall) -> Result<(), ApiError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        let target = match &call {
            RecordedCall::Follow(id)
            | RecordedCall::Unfollow(id)
            | RecordedCall::Mute(id)
            | RecordedCall::Unmute(id) => Some(id.0),
            RecordedCall::Favorite(id)
            | RecordedCall::Retweet(id)
            | RecordedCall::Unretweet(id)
            | RecordedCall::DeleteStatus(id) => Some(id.0),
            _ => None,
        };
        let failing = match target {
            Some(id) => self.failing_ids.read().await.get(&id).copied(),
            None => None,
        };

        self.calls.write().await.push(call);

        match failing {
            Some((status, code)) => Err(ApiError::Api {
                status,
                code,
                message: "mock failure".to_string(),
            }),
            None => Ok(()),
        }
    }

    async fn profile_or_stub(&self, id: UserId) -> UserProfile {
        self.profiles
            .read()
            .await
            .get(&id)
            .cloned()
            .unwrap_or_else(|| super::fixtures::bare_profile(id.0, &format!("user{}", id.0)))
    }

    /// Cursors are plain offsets into `all`.
    async fn page(&self, all: &[UserId], cursor: Cursor) -> IdPage {
        let page_size = *self.page_size.read().await;
        let start = if cursor == FIRST_PAGE { 0 } else { cursor.max(0) as usize };
        let end = (start + page_size).min(all.len());
        let ids = all.get(start..end).map(|s| s.to_vec()).unwrap_or_default();
        let next_cursor = if end < all.len() { end as Cursor } else { 0 };
        IdPage { ids, next_cursor }
    }

    async fn post_for(&self, id: StatusId) -> Post {
        let posts = self.search_results.read().await;
        posts
            .values()
            .flatten()
            .find(|p| p.id == id)
            .cloned()
            .unwrap_or_else(|| {
                super::fixtures::post(id.0, super::fixtures::bare_profile(0, "someone"), "")
            })
    }
}

#[async_trait]
impl SocialApi for MockSocialApi {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_ids(
        &self,
        listing: IdListing,
        screen_name: &str,
        cursor: Cursor,
    ) -> Result<IdPage, ApiError> {
        self.record(RecordedCall::ListIds {
            listing,
            screen_name: screen_name.to_string(),
            cursor,
        })
        .await?;

        let all = self
            .id_lists
            .read()
            .await
            .get(&(listing, screen_name.to_string()))
            .cloned()
            .unwrap_or_default();
        Ok(self.page(&all, cursor).await)
    }

    async fn lookup_users(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, ApiError> {
        if ids.len() > LOOKUP_BATCH_LIMIT {
            return Err(ApiError::BatchTooLarge {
                size: ids.len(),
                max: LOOKUP_BATCH_LIMIT,
            });
        }
        self.record(RecordedCall::LookupUsers(ids.to_vec())).await?;

        // Unknown ids are silently dropped, as the real endpoint does.
        let profiles = self.profiles.read().await;
        Ok(ids.iter().filter_map(|id| profiles.get(id).cloned()).collect())
    }

    async fn follow(&self, id: UserId) -> Result<UserProfile, ApiError> {
        self.record(RecordedCall::Follow(id)).await?;
        Ok(self.profile_or_stub(id).await)
    }

    async fn unfollow(&self, id: UserId) -> Result<UserProfile, ApiError> {
        self.record(RecordedCall::Unfollow(id)).await?;
        Ok(self.profile_or_stub(id).await)
    }

    async fn favorite(&self, id: StatusId) -> Result<Post, ApiError> {
        self.record(RecordedCall::Favorite(id)).await?;
        Ok(self.post_for(id).await)
    }

    async fn retweet(&self, id: StatusId) -> Result<Post, ApiError> {
        self.record(RecordedCall::Retweet(id)).await?;
        Ok(self.post_for(id).await)
    }

    async fn unretweet(&self, id: StatusId) -> Result<Post, ApiError> {
        self.record(RecordedCall::Unretweet(id)).await?;
        Ok(self.post_for(id).await)
    }

    async fn post_status(&self, text: &str, media: Option<&Path>) -> Result<Post, ApiError> {
        self.record(RecordedCall::PostStatus {
            text: text.to_string(),
            media: media.map(Path::to_path_buf),
        })
        .await?;

        let mut next = self.next_status_id.write().await;
        let id = *next;
        *next += 1;
        Ok(super::fixtures::post(
            id,
            super::fixtures::bare_profile(0, "me"),
            text,
        ))
    }

    async fn delete_status(&self, id: StatusId) -> Result<Post, ApiError> {
        self.record(RecordedCall::DeleteStatus(id)).await?;
        Ok(self.post_for(id).await)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Post>, ApiError> {
        self.record(RecordedCall::Search(query.phrase.clone())).await?;

        let results = self.search_results.read().await;
        let posts = results.get(&query.phrase).cloned().unwrap_or_default();
        Ok(posts.into_iter().take(query.count as usize).collect())
    }

    async fn list_muted_ids(&self, cursor: Cursor) -> Result<IdPage, ApiError> {
        self.record(RecordedCall::ListMuted(cursor)).await?;
        let muted = self.muted.read().await.clone();
        Ok(self.page(&muted, cursor).await)
    }

    async fn mute(&self, id: UserId) -> Result<UserProfile, ApiError> {
        self.record(RecordedCall::Mute(id)).await?;
        let mut muted = self.muted.write().await;
        if !muted.contains(&id) {
            muted.push(id);
        }
        drop(muted);
        Ok(self.profile_or_stub(id).await)
    }

    async fn unmute(&self, id: UserId) -> Result<UserProfile, ApiError> {
        self.record(RecordedCall::Unmute(id)).await?;
        self.muted.write().await.retain(|m| *m != id);
        Ok(self.profile_or_stub(id).await)
    }

    async fn add_list_member(
        &self,
        _owner_screen_name: &str,
        slug: &str,
        screen_name: &str,
    ) -> Result<ListInfo, ApiError> {
        self.record(RecordedCall::AddListMember {
            slug: slug.to_string(),
            screen_name: screen_name.to_string(),
        })
        .await?;
        Ok(ListInfo {
            id: 1,
            slug: slug.to_string(),
            member_count: None,
        })
    }
}
