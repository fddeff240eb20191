//! Phrase search with per-author deduplication.

use std::collections::HashMap;
use tracing::debug;

use crate::api::{ApiError, Post, SearchQuery, SocialApi};
use crate::config::SearchConfig;

/// Runs phrase searches and keeps one post per author.
#[derive(Debug, Clone)]
pub struct SearchCollector {
    own_handle: String,
    config: SearchConfig,
}

impl SearchCollector {
    /// `own_handle` may carry a leading `@`.
    pub fn new(own_handle: &str, config: SearchConfig) -> Self {
        Self {
            own_handle: own_handle.trim_start_matches('@').to_string(),
            config,
        }
    }

    pub fn query(&self, phrase: &str) -> SearchQuery {
        SearchQuery::new(phrase, self.config.count, self.config.result_type)
    }

    pub async fn collect(&self, api: &dyn SocialApi, phrase: &str) -> Result<Vec<Post>, ApiError> {
        let posts = api.search(&self.query(phrase)).await?;
        let found = posts.len();
        let deduped = dedup_by_author(posts, &self.own_handle);
        debug!(
            phrase,
            found,
            authors = deduped.len(),
            "Collected search results"
        );
        Ok(deduped)
    }
}

/// Keep one post per author screen name and drop the operator's own posts.
///
/// A later post by the same author replaces the earlier one, but the
/// author stays at the position where they were first seen. Handles are
/// compared case-insensitively.
pub fn dedup_by_author(posts: Vec<Post>, own_handle: &str) -> Vec<Post> {
    let own = own_handle.trim_start_matches('@').to_lowercase();
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Post> = Vec::new();

    for post in posts {
        let author = post.user.screen_name.to_lowercase();
        if author == own {
            continue;
        }
        match slots.get(&author) {
            Some(&index) => kept[index] = post,
            None => {
                slots.insert(author, kept.len());
                kept.push(post);
            }
        }
    }

    kept
}
