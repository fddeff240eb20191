//! Types exchanged with the social network API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ResultType;

/// Opaque account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(UserId)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        UserId(id)
    }
}

/// Opaque post identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(pub u64);

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StatusId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(StatusId)
    }
}

/// Account profile as returned by lookups and friendship calls.
///
/// Only `id` and `screen_name` are guaranteed. Everything else may be
/// missing from a response and is kept as `None` rather than guessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub screen_name: String,
    #[serde(default)]
    pub followers_count: Option<u64>,
    /// Number of accounts this profile follows.
    #[serde(default)]
    pub friends_count: Option<u64>,
    #[serde(default)]
    pub statuses_count: Option<u64>,
    #[serde(default)]
    pub protected: Option<bool>,
    #[serde(default)]
    pub verified: Option<bool>,
    /// Whether the authenticated account already follows this profile.
    #[serde(default)]
    pub following: Option<bool>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub profile_image_url_https: Option<String>,
}

impl UserProfile {
    pub fn followers(&self) -> u64 {
        self.followers_count.unwrap_or(0)
    }

    pub fn friends(&self) -> u64 {
        self.friends_count.unwrap_or(0)
    }

    pub fn statuses(&self) -> u64 {
        self.statuses_count.unwrap_or(0)
    }

    pub fn is_protected(&self) -> bool {
        self.protected.unwrap_or(false)
    }

    pub fn is_verified(&self) -> bool {
        self.verified.unwrap_or(false)
    }

    pub fn is_followed(&self) -> bool {
        self.following.unwrap_or(false)
    }

    /// Whether either avatar URL is present and non-empty.
    pub fn has_profile_image(&self) -> bool {
        [&self.profile_image_url, &self.profile_image_url_https]
            .into_iter()
            .flatten()
            .any(|url| !url.trim().is_empty())
    }

    /// Followers divided by following, `0.0` when following nobody.
    pub fn ff_ratio(&self) -> f64 {
        match self.friends() {
            0 => 0.0,
            friends => self.followers() as f64 / friends as f64,
        }
    }
}

/// Human-readable summary built from whichever fields are present.
impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}, ", self.screen_name)?;
        if let Some(followers) = self.followers_count {
            write!(f, "Followers: {}, ", followers)?;
        }
        if let Some(friends) = self.friends_count {
            write!(f, "Following: {}, ", friends)?;
        }
        if self.followers_count.is_some() && self.friends_count.is_some() {
            write!(f, "FF_Ratio: {:.2}, ", self.ff_ratio())?;
        }
        write!(f, "[id: {}]", self.id)
    }
}

/// A single post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: StatusId,
    #[serde(default)]
    pub text: String,
    pub user: UserProfile,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Cursor position for paginated id listings.
pub type Cursor = i64;

/// Cursor value that requests the first page.
pub const FIRST_PAGE: Cursor = -1;

/// One page of a cursored id listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdPage {
    pub ids: Vec<UserId>,
    #[serde(default)]
    pub next_cursor: Cursor,
}

impl IdPage {
    /// The API signals the final page with a zero cursor.
    pub fn is_last(&self) -> bool {
        self.next_cursor == 0
    }
}

/// Which relationship listing to page through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdListing {
    Followers,
    Friends,
}

/// A list the operator owns, as returned after adding a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInfo {
    pub id: u64,
    pub slug: String,
    #[serde(default)]
    pub member_count: Option<u64>,
}

/// Phrase search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub phrase: String,
    pub count: u32,
    #[serde(default)]
    pub result_type: ResultType,
}

impl SearchQuery {
    pub fn new(phrase: impl Into<String>, count: u32, result_type: ResultType) -> Self {
        Self {
            phrase: phrase.into(),
            count,
            result_type,
        }
    }
}
