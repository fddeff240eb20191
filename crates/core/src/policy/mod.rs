//! Acceptance rules for follow and unfollow actions.

mod filter;
mod types;

pub use filter::{decide, PolicyFilter};
pub use types::{ActionPath, PolicyDecision, Thresholds};
