use std::fmt;
use std::path::PathBuf;

use crate::api::{StatusId, UserId};

/// A single remote mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Follow(UserId),
    Unfollow(UserId),
    Favorite(StatusId),
    Retweet(StatusId),
    Unretweet(StatusId),
    Post {
        text: String,
        media: Option<PathBuf>,
    },
    DeleteStatus(StatusId),
    Mute(UserId),
    Unmute(UserId),
    /// Add `screen_name` to `owner`'s list `slug`.
    AddToList {
        owner: String,
        slug: String,
        screen_name: String,
    },
}

impl Action {
    /// Metric label for this kind of action.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Follow(_) => "follow",
            Action::Unfollow(_) => "unfollow",
            Action::Favorite(_) => "favorite",
            Action::Retweet(_) => "retweet",
            Action::Unretweet(_) => "unretweet",
            Action::Post { .. } => "post",
            Action::DeleteStatus(_) => "delete_status",
            Action::Mute(_) => "mute",
            Action::Unmute(_) => "unmute",
            Action::AddToList { .. } => "add_to_list",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Follow(id) => write!(f, "follow user {}", id),
            Action::Unfollow(id) => write!(f, "unfollow user {}", id),
            Action::Favorite(id) => write!(f, "favorite status {}", id),
            Action::Retweet(id) => write!(f, "retweet status {}", id),
            Action::Unretweet(id) => write!(f, "unretweet status {}", id),
            Action::Post { media: Some(path), .. } => {
                write!(f, "post status with {}", path.display())
            }
            Action::Post { media: None, .. } => write!(f, "post status"),
            Action::DeleteStatus(id) => write!(f, "delete status {}", id),
            Action::Mute(id) => write!(f, "mute user {}", id),
            Action::Unmute(id) => write!(f, "unmute user {}", id),
            Action::AddToList {
                slug, screen_name, ..
            } => write!(f, "add @{} to list {}", screen_name, slug),
        }
    }
}

/// What happened to an executed action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The API accepted the action. Carries the summary it returned.
    Done(String),
    /// The API rejected the action with a non-fatal error.
    Failed(String),
}

impl ActionOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, ActionOutcome::Done(_))
    }
}
