//! Testing utilities and a mock social API.
//!
//! Lets workflows run end to end without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use tweeterbot_core::testing::{fixtures, MockSocialApi};
//!
//! let api = MockSocialApi::new();
//! api.add_profile(fixtures::profile(42, "ferris", 1200, 300)).await;
//! api.set_search_results("#rustlang", vec![fixtures::post(1, fixtures::profile(42, "ferris", 1200, 300), "hi")]).await;
//! ```

mod mock_api;

pub use mock_api::{MockSocialApi, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::api::{Post, StatusId, UserId, UserProfile};

    /// A profile with every field present, an avatar and 200 posts.
    ///
    /// Not protected, not verified, not followed by the operator.
    pub fn profile(id: u64, screen_name: &str, followers: u64, friends: u64) -> UserProfile {
        UserProfile {
            id: UserId(id),
            screen_name: screen_name.to_string(),
            followers_count: Some(followers),
            friends_count: Some(friends),
            statuses_count: Some(200),
            protected: Some(false),
            verified: Some(false),
            following: Some(false),
            profile_image_url: Some(format!("http://pbs.twimg.com/profile_images/{}/a.png", id)),
            profile_image_url_https: Some(format!(
                "https://pbs.twimg.com/profile_images/{}/a.png",
                id
            )),
        }
    }

    /// A profile with only the guaranteed fields.
    pub fn bare_profile(id: u64, screen_name: &str) -> UserProfile {
        UserProfile {
            id: UserId(id),
            screen_name: screen_name.to_string(),
            followers_count: None,
            friends_count: None,
            statuses_count: None,
            protected: None,
            verified: None,
            following: None,
            profile_image_url: None,
            profile_image_url_https: None,
        }
    }

    /// A verified profile the operator already follows.
    pub fn verified_friend(id: u64, screen_name: &str) -> UserProfile {
        UserProfile {
            verified: Some(true),
            following: Some(true),
            ..profile(id, screen_name, 50_000, 100)
        }
    }

    pub fn post(id: u64, author: UserProfile, text: &str) -> Post {
        Post {
            id: StatusId(id),
            text: text.to_string(),
            user: author,
            created_at: None,
        }
    }
}
