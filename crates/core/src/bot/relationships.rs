//! Follower-graph workflows: sync, follow back, unfollow, reports.

use tracing::{info, warn};

use crate::api::{IdListing, UserId, FIRST_PAGE};
use crate::executor::Action;
use crate::metrics;
use crate::policy::ActionPath;
use crate::reconcile::{self, REPORT_CHUNK_SIZE};
use crate::store::{Category, RelationshipSet};

use super::{Bot, BotError, NonFollowersReport, RunReport, SyncReport};

impl Bot {
    /// Fetch every follower and friend id of the operator and overwrite
    /// both files. Nothing is written unless both listings complete.
    pub async fn sync_follows(&mut self) -> Result<SyncReport, BotError> {
        let handle = self.screen_name().to_string();
        info!(handle = %handle, "Syncing followers and following");

        let followers = self.fetch_all_ids(IdListing::Followers, &handle).await?;
        let following = self.fetch_all_ids(IdListing::Friends, &handle).await?;

        self.store.save(Category::Followers, &followers)?;
        self.store.save(Category::Following, &following)?;

        for (category, set) in [
            (Category::Followers, &followers),
            (Category::Following, &following),
        ] {
            metrics::SYNCED_IDS
                .with_label_values(&[category.as_str()])
                .set(set.len() as i64);
        }

        let report = SyncReport {
            followers: followers.len(),
            following: following.len(),
        };
        info!(
            followers = report.followers,
            following = report.following,
            "Sync complete"
        );
        Ok(report)
    }

    async fn fetch_all_ids(
        &self,
        listing: IdListing,
        screen_name: &str,
    ) -> Result<RelationshipSet, BotError> {
        let mut ids = RelationshipSet::new();
        let mut cursor = FIRST_PAGE;
        loop {
            let page = self
                .api
                .list_ids(listing, screen_name, cursor)
                .await
                .map_err(|e| BotError::api(format!("{:?} sync", listing), e))?;
            ids.extend(page.ids.iter().copied());
            if page.is_last() {
                break;
            }
            cursor = page.next_cursor;
        }
        Ok(ids)
    }

    /// Follow back followers the bot has not followed, followed before or
    /// rejected.
    pub async fn follow_back(&mut self) -> Result<RunReport, BotError> {
        self.check_freshness();

        let followers = self.store.load(Category::Followers)?;
        let following = self.store.load(Category::Following)?;
        let mut excluded = self.store.load(Category::AlreadyFollowed)?;
        excluded.extend(self.filter.ignored().ids().iter().copied());

        let candidates = reconcile::follow_back_candidates(&followers, &following, &excluded);
        info!(candidates = candidates.len(), "Following back");

        let mut report = RunReport::default();
        self.follow_ids(&candidates, &mut report).await?;

        info!(%report, "Follow back finished");
        Ok(report)
    }

    /// Unfollow accounts that do not follow back.
    ///
    /// The keep-following list and ignored ids are never touched. All
    /// candidates are merged into the already-followed file first, so they
    /// are never followed again automatically.
    pub async fn unfollow_non_followers(&mut self) -> Result<RunReport, BotError> {
        self.check_freshness();

        let followers = self.store.load(Category::Followers)?;
        let following = self.store.load(Category::Following)?;
        let mut excluded: RelationshipSet = self
            .config
            .policy
            .keep_following
            .iter()
            .copied()
            .map(UserId)
            .collect();
        excluded.extend(self.filter.ignored().ids().iter().copied());

        let candidates = reconcile::non_followers(&following, &followers, &excluded);
        info!(candidates = candidates.len(), "Unfollowing non-followers");

        let mut already = self.store.load(Category::AlreadyFollowed)?;
        already.extend(candidates.iter().copied());
        self.store.save(Category::AlreadyFollowed, &already)?;

        let mut report = RunReport::default();
        for batch in reconcile::lookup_batches(&candidates) {
            let profiles = self.lookup_batch(batch, &mut report).await?;
            for profile in &profiles {
                let decision = self.filter.evaluate(profile, ActionPath::Unfollow)?;
                if !decision.is_proceed() {
                    report.skip(1);
                    continue;
                }
                let outcome = self.executor.execute(&Action::Unfollow(profile.id)).await?;
                report.record(&outcome);
            }
        }

        info!(%report, "Unfollow finished");
        Ok(report)
    }

    /// Follow the first page of another account's followers.
    pub async fn follow_followers_of(&mut self, handle: &str) -> Result<RunReport, BotError> {
        let handle = handle.trim().trim_start_matches('@');
        let page = self
            .api
            .list_ids(IdListing::Followers, handle, FIRST_PAGE)
            .await
            .map_err(|e| BotError::api(format!("follower listing of @{}", handle), e))?;

        let following = self.store.load(Category::Following)?;
        let already = self.store.load(Category::AlreadyFollowed)?;

        let mut report = RunReport::default();
        let mut seen = RelationshipSet::new();
        let mut candidates = Vec::new();
        for id in page.ids {
            if !seen.insert(id) {
                continue;
            }
            if following.contains(&id) || already.contains(&id) || self.filter.ignored().contains(&id)
            {
                report.skip(1);
            } else {
                candidates.push(id);
            }
        }
        info!(
            target_handle = %handle,
            candidates = candidates.len(),
            "Following followers of another account"
        );

        self.follow_ids(&candidates, &mut report).await?;

        info!(%report, "Follow followers finished");
        Ok(report)
    }

    /// Write `[*] @name [id: N]` for every followed account that does not
    /// follow back (`*` marks verified accounts).
    pub async fn report_non_followers(&mut self) -> Result<NonFollowersReport, BotError> {
        self.check_freshness();

        let followers = self.store.load(Category::Followers)?;
        let following = self.store.load(Category::Following)?;
        let non_followers = reconcile::difference(&following, &followers);
        info!(
            followers = followers.len(),
            following = following.len(),
            non_followers = non_followers.len(),
            "Building non-followers report"
        );

        let mut lines = Vec::with_capacity(non_followers.len());
        let mut unused = RunReport::default();
        for chunk in reconcile::chunks(&non_followers, REPORT_CHUNK_SIZE) {
            for profile in self.lookup_batch(chunk, &mut unused).await? {
                lines.push(format!(
                    "[{}] @{} [id: {}]",
                    if profile.is_verified() { "*" } else { " " },
                    profile.screen_name,
                    profile.id
                ));
            }
        }
        if lines.len() < non_followers.len() {
            warn!(
                missing = non_followers.len() - lines.len(),
                "Some non-followers could not be looked up"
            );
        }

        let path = self.store.write_report(&lines)?;
        info!(path = %path.display(), listed = lines.len(), "Wrote non-followers report");
        Ok(NonFollowersReport {
            path,
            total: non_followers.len(),
            listed: lines.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{bot, HANDLE};
    use super::*;
    use crate::api::ApiError;
    use crate::testing::{fixtures, MockSocialApi, RecordedCall};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn set(ids: &[u64]) -> RelationshipSet {
        ids.iter().copied().map(UserId).collect()
    }

    #[tokio::test]
    async fn test_sync_pages_through_listings() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockSocialApi::new());
        api.set_page_size(2).await;
        api.set_ids(
            IdListing::Followers,
            HANDLE,
            vec![UserId(1), UserId(2), UserId(3)],
        )
        .await;
        api.set_ids(IdListing::Friends, HANDLE, vec![UserId(2)]).await;

        let mut bot = bot(&dir, &api);
        let report = bot.sync_follows().await.unwrap();

        assert_eq!(report, SyncReport { followers: 3, following: 1 });
        assert_eq!(bot.store().load(Category::Followers).unwrap(), set(&[1, 2, 3]));
        assert_eq!(bot.store().load(Category::Following).unwrap(), set(&[2]));

        let listing_calls = api
            .calls()
            .await
            .into_iter()
            .filter(|c| matches!(c, RecordedCall::ListIds { .. }))
            .count();
        assert_eq!(listing_calls, 3);
    }

    #[tokio::test]
    async fn test_failed_sync_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockSocialApi::new());
        let mut bot = bot(&dir, &api);
        bot.store().save(Category::Followers, &set(&[9])).unwrap();

        api.set_next_error(ApiError::RateLimited { retry_after: Some(60) })
            .await;
        let err = bot.sync_follows().await.unwrap_err();

        assert!(err.is_quota_exceeded());
        assert_eq!(bot.store().load(Category::Followers).unwrap(), set(&[9]));
    }

    #[tokio::test]
    async fn test_follow_back_scenario() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockSocialApi::new());
        api.add_profile(fixtures::profile(1, "one", 500, 200)).await;
        let mut bot = bot(&dir, &api);
        bot.store().save(Category::Followers, &set(&[1, 2, 3])).unwrap();
        bot.store().save(Category::Following, &set(&[2, 3])).unwrap();

        let report = bot.follow_back().await.unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(api.mutations().await, vec![RecordedCall::Follow(UserId(1))]);
        assert!(bot
            .store()
            .load(Category::AlreadyFollowed)
            .unwrap()
            .contains(&UserId(1)));
    }

    #[tokio::test]
    async fn test_follow_back_records_rejections() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockSocialApi::new());
        api.add_profile(fixtures::profile(4, "small", 50, 20)).await;
        let mut bot = bot(&dir, &api);
        bot.store().save(Category::Followers, &set(&[4])).unwrap();

        let report = bot.follow_back().await.unwrap();

        assert_eq!(report.skipped, 1);
        assert!(api.mutations().await.is_empty());
        assert_eq!(bot.store().load(Category::Ignored).unwrap(), set(&[4]));

        // Second run does not even look the account up.
        api.clear_calls().await;
        let report = bot.follow_back().await.unwrap();
        assert_eq!(report, RunReport::default());
        assert!(api.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_unfollow_respects_keep_list_and_verified() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockSocialApi::new());
        let mut plain = fixtures::profile(10, "plain", 10, 900);
        plain.following = Some(true);
        api.add_profiles([plain, fixtures::verified_friend(11, "famous")])
            .await;

        let mut config = super::super::test_support::config(&dir);
        config.policy.keep_following = vec![12];
        let mut bot = Bot::new(config, api.clone(), Arc::new(crate::executor::NoPacer)).unwrap();
        bot.store().save(Category::Followers, &set(&[1])).unwrap();
        bot.store()
            .save(Category::Following, &set(&[1, 10, 11, 12]))
            .unwrap();

        let report = bot.unfollow_non_followers().await.unwrap();

        assert_eq!(api.mutations().await, vec![RecordedCall::Unfollow(UserId(10))]);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            bot.store().load(Category::AlreadyFollowed).unwrap(),
            set(&[10, 11])
        );
    }

    #[tokio::test]
    async fn test_quota_stops_unfollow() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockSocialApi::new());
        for id in [20, 21] {
            let mut p = fixtures::profile(id, "x", 10, 10);
            p.following = Some(true);
            api.add_profile(p).await;
        }
        api.fail_id(20, 429, Some(88)).await;

        let mut bot = bot(&dir, &api);
        bot.store().save(Category::Following, &set(&[20, 21])).unwrap();

        let err = bot.unfollow_non_followers().await.unwrap_err();
        assert!(err.is_quota_exceeded());
        assert_eq!(api.mutations().await, vec![RecordedCall::Unfollow(UserId(20))]);
    }

    #[tokio::test]
    async fn test_follow_followers_of() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockSocialApi::new());
        api.set_ids(
            IdListing::Followers,
            "rustlang",
            vec![UserId(30), UserId(31), UserId(32), UserId(30)],
        )
        .await;
        api.add_profiles([
            fixtures::profile(30, "a", 500, 200),
            fixtures::profile(32, "c", 500, 200),
        ])
        .await;

        let mut bot = bot(&dir, &api);
        bot.store().save(Category::Following, &set(&[31])).unwrap();

        let report = bot.follow_followers_of("@rustlang").await.unwrap();

        assert_eq!(
            api.mutations().await,
            vec![
                RecordedCall::Follow(UserId(30)),
                RecordedCall::Follow(UserId(32))
            ]
        );
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn test_non_followers_report() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(MockSocialApi::new());
        api.add_profiles([
            fixtures::profile(40, "plain", 10, 10),
            fixtures::verified_friend(41, "famous"),
        ])
        .await;

        let mut bot = bot(&dir, &api);
        bot.store().save(Category::Followers, &set(&[1])).unwrap();
        bot.store()
            .save(Category::Following, &set(&[1, 40, 41, 42]))
            .unwrap();

        let report = bot.report_non_followers().await.unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.listed, 2);
        assert_eq!(
            std::fs::read_to_string(&report.path).unwrap(),
            "[ ] @plain [id: 40]\n[*] @famous [id: 41]\n"
        );
        assert!(api.mutations().await.is_empty());
    }
}
