//! Set differences over relationship sets.
//!
//! Pure functions: no I/O, no errors. Results come back in ascending id
//! order so runs are reproducible.

use crate::api::{UserId, LOOKUP_BATCH_LIMIT};
use crate::store::RelationshipSet;

/// Ids per block in the non-followers report.
pub const REPORT_CHUNK_SIZE: usize = 99;

/// `a \ b`.
pub fn difference(a: &RelationshipSet, b: &RelationshipSet) -> Vec<UserId> {
    a.as_btree().difference(b.as_btree()).copied().collect()
}

/// `a \ b \ excluded`.
pub fn difference_excluding(
    a: &RelationshipSet,
    b: &RelationshipSet,
    excluded: &RelationshipSet,
) -> Vec<UserId> {
    a.iter()
        .filter(|id| !b.contains(id) && !excluded.contains(id))
        .copied()
        .collect()
}

/// Followers the operator does not follow yet, minus `excluded`.
pub fn follow_back_candidates(
    followers: &RelationshipSet,
    following: &RelationshipSet,
    excluded: &RelationshipSet,
) -> Vec<UserId> {
    difference_excluding(followers, following, excluded)
}

/// Accounts the operator follows that do not follow back, minus `excluded`.
pub fn non_followers(
    following: &RelationshipSet,
    followers: &RelationshipSet,
    excluded: &RelationshipSet,
) -> Vec<UserId> {
    difference_excluding(following, followers, excluded)
}

/// Split `ids` into consecutive slices of at most `size` elements.
///
/// # Panics
///
/// Panics if `size` is 0.
pub fn chunks(ids: &[UserId], size: usize) -> impl Iterator<Item = &[UserId]> {
    ids.chunks(size)
}

/// Split `ids` into batches accepted by a single user lookup.
pub fn lookup_batches(ids: &[UserId]) -> impl Iterator<Item = &[UserId]> {
    chunks(ids, LOOKUP_BATCH_LIMIT)
}
