pub mod api;
pub mod archive;
pub mod bot;
pub mod config;
pub mod executor;
pub mod metrics;
pub mod policy;
pub mod reconcile;
pub mod search;
pub mod store;
pub mod testing;

pub use api::{ApiError, SocialApi, StatusId, TwitterClient, UserId, UserProfile};
pub use archive::ArchiveError;
pub use bot::{Bot, BotError, NonFollowersReport, RunReport, SyncReport};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use executor::{Action, ActionExecutor, ExecutorError, NoPacer, Pacer, RandomPacer};
pub use policy::{ActionPath, PolicyDecision, PolicyFilter, Thresholds};
pub use store::{Category, RelationshipSet, RelationshipStore, StoreError};
