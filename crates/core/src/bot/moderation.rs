//! Mutes, lists and explicit unfollows.

use tracing::info;

use crate::api::{UserId, FIRST_PAGE};
use crate::executor::Action;
use crate::reconcile;
use crate::store::{Category, RelationshipSet};

use super::{Bot, BotError, RunReport};

impl Bot {
    async fn fetch_muted(&self) -> Result<RelationshipSet, BotError> {
        let mut ids = RelationshipSet::new();
        let mut cursor = FIRST_PAGE;
        loop {
            let page = self
                .api
                .list_muted_ids(cursor)
                .await
                .map_err(|e| BotError::api("muted listing", e))?;
            ids.extend(page.ids.iter().copied());
            if page.is_last() {
                break;
            }
            cursor = page.next_cursor;
        }
        Ok(ids)
    }

    /// Mute every followed account that is not muted yet, except the
    /// `keep_unmuted` list.
    pub async fn mute_following(&mut self) -> Result<RunReport, BotError> {
        self.check_freshness();

        let following = self.store.load(Category::Following)?;
        let muted = self.fetch_muted().await?;
        let keep: RelationshipSet = id_set(&self.config.policy.keep_unmuted);

        let candidates = reconcile::difference_excluding(&following, &muted, &keep);
        info!(
            following = following.len(),
            muted = muted.len(),
            candidates = candidates.len(),
            "Muting followed accounts"
        );

        let mut report = RunReport::default();
        report.skip(
            following
                .iter()
                .filter(|id| !muted.contains(id) && keep.contains(id))
                .count(),
        );
        let report = self
            .run_actions(report, candidates.into_iter().map(Action::Mute))
            .await?;
        info!(%report, "Mute following finished");
        Ok(report)
    }

    /// Unmute every muted account except the `keep_muted` list.
    pub async fn unmute_all(&mut self) -> Result<RunReport, BotError> {
        let muted = self.fetch_muted().await?;
        let keep: RelationshipSet = id_set(&self.config.policy.keep_muted);
        let candidates = reconcile::difference(&muted, &keep);
        info!(
            muted = muted.len(),
            candidates = candidates.len(),
            "Unmuting accounts"
        );

        let mut report = RunReport::default();
        report.skip(muted.len() - candidates.len());
        let report = self
            .run_actions(report, candidates.into_iter().map(Action::Unmute))
            .await?;
        info!(%report, "Unmute finished");
        Ok(report)
    }

    /// Add the author of each recent post matching `phrase` to the
    /// operator's list `slug`, one post per author.
    pub async fn add_to_list_by_phrase(
        &mut self,
        phrase: &str,
        slug: &str,
    ) -> Result<RunReport, BotError> {
        let posts = self.collect(phrase).await?;
        info!(phrase, slug, authors = posts.len(), "Adding authors to list");

        let owner = self.screen_name().to_string();
        let actions = posts.into_iter().map(|post| Action::AddToList {
            owner: owner.clone(),
            slug: slug.to_string(),
            screen_name: post.user.screen_name,
        });
        let report = self.run_actions(RunReport::default(), actions).await?;
        info!(%report, "Add to list finished");
        Ok(report)
    }

    /// Unfollow exactly `ids`, in order.
    ///
    /// Duplicates and the keep-following list are skipped. Every other id
    /// is merged into the already-followed file first, like the
    /// non-follower unfollow does. No policy check runs: the operator chose
    /// these accounts.
    pub async fn unfollow_listed(&mut self, ids: &[UserId]) -> Result<RunReport, BotError> {
        let keep = id_set(&self.config.policy.keep_following);
        let mut seen = RelationshipSet::new();
        let mut report = RunReport::default();
        let mut candidates = Vec::with_capacity(ids.len());
        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            if keep.contains(&id) {
                report.skip(1);
            } else {
                candidates.push(id);
            }
        }
        info!(
            listed = ids.len(),
            candidates = candidates.len(),
            "Unfollowing listed accounts"
        );

        let mut already = self.store.load(Category::AlreadyFollowed)?;
        already.extend(candidates.iter().copied());
        self.store.save(Category::AlreadyFollowed, &already)?;

        let report = self
            .run_actions(report, candidates.into_iter().map(Action::Unfollow))
            .await?;
        info!(%report, "Unfollow listed finished");
        Ok(report)
    }

    /// Unfollow every account left in `non_followers.txt`.
    pub async fn unfollow_from_report(&mut self) -> Result<RunReport, BotError> {
        let ids = self.store.load_report_ids()?;
        info!(
            path = %self.store.non_followers_path().display(),
            ids = ids.len(),
            "Unfollowing from non-followers report"
        );
        self.unfollow_listed(&ids).await
    }
}

fn id_set(ids: &[u64]) -> RelationshipSet {
    ids.iter().copied().map(UserId).collect()
}
