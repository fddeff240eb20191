//! Content workflows: phrase search actions, posting, archive cleanup.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::api::StatusId;
use crate::archive;
use crate::executor::Action;
use crate::store::Category;

use super::{Bot, BotError, RunReport};

impl Bot {
    /// Follow authors of recent posts matching `phrase`.
    ///
    /// Authors already followed, followed before or rejected before are
    /// skipped without a policy check, as are authors without an avatar.
    pub async fn follow_by_phrase(&mut self, phrase: &str) -> Result<RunReport, BotError> {
        self.check_freshness();

        let posts = self.collect(phrase).await?;
        let mut following = self.store.load(Category::Following)?;
        let already = self.store.load(Category::AlreadyFollowed)?;
        info!(phrase, authors = posts.len(), "Following by phrase");

        let mut report = RunReport::default();
        for post in &posts {
            let id = post.user.id;
            if following.contains(&id)
                || already.contains(&id)
                || self.filter.ignored().contains(&id)
            {
                report.skip(1);
                continue;
            }
            if !post.user.has_profile_image() {
                debug!(
                    user_id = %id,
                    screen_name = %post.user.screen_name,
                    "Skipping author without avatar"
                );
                report.skip(1);
                continue;
            }
            if self.follow_profile(&post.user, &mut report).await? {
                following.insert(id);
            }
        }

        info!(%report, "Follow by phrase finished");
        Ok(report)
    }

    /// Favorite one recent post per author matching `phrase`.
    pub async fn favorite_by_phrase(&mut self, phrase: &str) -> Result<RunReport, BotError> {
        let posts = self.collect(phrase).await?;
        info!(phrase, posts = posts.len(), "Favoriting by phrase");
        let actions = posts.iter().map(|p| Action::Favorite(p.id));
        let report = self.run_actions(RunReport::default(), actions).await?;
        info!(%report, "Favorite by phrase finished");
        Ok(report)
    }

    /// Retweet one recent post per author matching `phrase`.
    pub async fn retweet_by_phrase(&mut self, phrase: &str) -> Result<RunReport, BotError> {
        let posts = self.collect(phrase).await?;
        info!(phrase, posts = posts.len(), "Retweeting by phrase");
        let actions = posts.iter().map(|p| Action::Retweet(p.id));
        let report = self.run_actions(RunReport::default(), actions).await?;
        info!(%report, "Retweet by phrase finished");
        Ok(report)
    }

    /// Post a status, optionally with an image.
    pub async fn post_status(
        &mut self,
        text: &str,
        image: Option<&Path>,
    ) -> Result<RunReport, BotError> {
        let action = Action::Post {
            text: text.to_string(),
            media: image.map(Path::to_path_buf),
        };
        self.run_actions(RunReport::default(), [action]).await
    }

    pub async fn unretweet(&mut self, id: StatusId) -> Result<RunReport, BotError> {
        self.run_actions(RunReport::default(), [Action::Unretweet(id)])
            .await
    }

    /// Delete archived posts dated strictly before `cutoff` (`YYYY-MM-DD`).
    ///
    /// The cutoff and the whole archive are validated before the first
    /// deletion.
    pub async fn delete_archived(
        &mut self,
        archive_path: &Path,
        cutoff: &str,
    ) -> Result<RunReport, BotError> {
        let cutoff = archive::parse_cutoff(cutoff)?;
        let rows = archive::load_archive(archive_path)?;
        let selected = archive::select_before(&rows, cutoff);
        info!(
            archive = %archive_path.display(),
            %cutoff,
            rows = rows.len(),
            selected = selected.len(),
            "Deleting archived posts"
        );

        let mut report = RunReport::default();
        for row in selected {
            let outcome = self
                .executor
                .execute(&Action::DeleteStatus(row.tweet_id))
                .await?;
            if report.record(&outcome) {
                info!(status_id = %row.tweet_id, date = %row.date, text = %row.text, "Deleted post");
            }
        }

        if report.failed > 0 {
            warn!(failed = report.failed, "Some archived posts were not deleted");
        }
        info!(%report, "Archive cleanup finished");
        Ok(report)
    }
}
