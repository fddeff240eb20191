//! Bot workflows.
//!
//! A [`Bot`] wires the relationship store, policy filter, search collector
//! and action executor together and exposes one method per workflow. Every
//! workflow runs sequentially and stops at the first quota error.

mod content;
mod error;
mod moderation;
mod relationships;
mod report;

pub use error::BotError;
pub use report::{NonFollowersReport, RunReport, SyncReport};

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::api::{ApiError, Post, SocialApi, TwitterClient, UserId, UserProfile};
use crate::config::Config;
use crate::executor::{Action, ActionExecutor, Pacer, RandomPacer};
use crate::policy::{ActionPath, PolicyFilter, Thresholds};
use crate::reconcile;
use crate::search::SearchCollector;
use crate::store::{Category, IgnoreLog, RelationshipStore};

/// The operator's automation bot.
pub struct Bot {
    config: Config,
    store: RelationshipStore,
    api: Arc<dyn SocialApi>,
    executor: ActionExecutor,
    filter: PolicyFilter,
    search: SearchCollector,
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("handle", &self.config.account.handle)
            .field("store", &self.store)
            .field("api", &self.api.name())
            .finish()
    }
}

impl Bot {
    /// Build a bot talking to the real API with randomized pacing.
    pub fn from_config(config: Config) -> Result<Self, BotError> {
        let client = TwitterClient::new(&config.api, &config.account)
            .map_err(|e| BotError::api("client setup", e))?;
        let pacer = RandomPacer::from(&config.pacing);
        Self::new(config, Arc::new(client), Arc::new(pacer))
    }

    /// Open the relationship store under `config.storage.data_dir` and
    /// load the ignore log.
    pub fn new(
        config: Config,
        api: Arc<dyn SocialApi>,
        pacer: Arc<dyn Pacer>,
    ) -> Result<Self, BotError> {
        let store = RelationshipStore::open(&config.storage.data_dir)?;
        let ignored = IgnoreLog::load(&store)?;
        let filter = PolicyFilter::new(Thresholds::from(&config.policy), ignored);
        let search = SearchCollector::new(config.account.screen_name(), config.search.clone());
        let executor = ActionExecutor::new(api.clone(), pacer);

        info!(
            handle = %config.account.handle,
            data_dir = %store.dir().display(),
            api = api.name(),
            ignored = filter.ignored().len(),
            "Bot ready"
        );

        Ok(Self {
            config,
            store,
            api,
            executor,
            filter,
            search,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &RelationshipStore {
        &self.store
    }

    fn screen_name(&self) -> &str {
        self.config.account.screen_name()
    }

    /// Warn if followers/following were synced too long ago.
    fn check_freshness(&self) -> bool {
        let max_age =
            Duration::from_secs(self.config.storage.stale_after_hours.saturating_mul(3600));
        self.store.warn_if_stale(max_age)
    }

    /// Look up one batch of profiles.
    ///
    /// Quota errors are fatal. Other failures skip the batch.
    async fn lookup_batch(
        &self,
        batch: &[UserId],
        report: &mut RunReport,
    ) -> Result<Vec<UserProfile>, BotError> {
        match self.api.lookup_users(batch).await {
            Ok(profiles) => {
                report.skip(batch.len().saturating_sub(profiles.len()));
                Ok(profiles)
            }
            Err(e) if e.is_quota_exceeded() => Err(BotError::api("user lookup", e)),
            Err(e) => {
                log_lookup_failure(batch, &e);
                report.skip(batch.len());
                Ok(Vec::new())
            }
        }
    }

    /// Run the follow policy on `profile` and follow it if accepted.
    ///
    /// Successful follows are appended to the already-followed file.
    async fn follow_profile(
        &mut self,
        profile: &UserProfile,
        report: &mut RunReport,
    ) -> Result<bool, BotError> {
        let decision = self.filter.evaluate(profile, ActionPath::Follow)?;
        if !decision.is_proceed() {
            report.skip(1);
            return Ok(false);
        }

        let outcome = self.executor.execute(&Action::Follow(profile.id)).await?;
        let done = report.record(&outcome);
        if done {
            self.store.append(Category::AlreadyFollowed, profile.id)?;
        }
        Ok(done)
    }

    /// Search `phrase`, one post per author, own posts dropped.
    async fn collect(&self, phrase: &str) -> Result<Vec<Post>, BotError> {
        self.search
            .collect(self.api.as_ref(), phrase)
            .await
            .map_err(|e| BotError::api(format!("search for {:?}", phrase), e))
    }

    /// Execute `actions` in order, adding their outcomes to `report`.
    async fn run_actions(
        &mut self,
        mut report: RunReport,
        actions: impl IntoIterator<Item = Action>,
    ) -> Result<RunReport, BotError> {
        for action in actions {
            let outcome = self.executor.execute(&action).await?;
            report.record(&outcome);
        }
        Ok(report)
    }

    /// Look up `ids` in API-sized batches and follow the accepted ones.
    async fn follow_ids(&mut self, ids: &[UserId], report: &mut RunReport) -> Result<(), BotError> {
        for batch in reconcile::lookup_batches(ids) {
            let profiles = self.lookup_batch(batch, report).await?;
            for profile in &profiles {
                self.follow_profile(profile, report).await?;
            }
        }
        Ok(())
    }
}

fn log_lookup_failure(batch: &[UserId], e: &ApiError) {
    error!(
        batch_size = batch.len(),
        first_id = batch.first().map(|id| id.0),
        error = %e,
        "User lookup failed, skipping batch"
    );
}
