//! Workflow integration tests.
//!
//! These tests drive a [`Bot`] built from a config file on disk against the
//! mock API, through a full cycle:
//! sync -> follow back -> unfollow -> report, across separate runs.

use std::sync::Arc;

use tempfile::TempDir;

use tweeterbot_core::{
    api::IdListing,
    load_config,
    testing::{fixtures, MockSocialApi, RecordedCall},
    validate_config, Bot, Category, Config, NoPacer, UserId,
};

const HANDLE: &str = "operator";

/// Test helper holding a config directory and the mock API.
struct TestHarness {
    api: Arc<MockSocialApi>,
    config: Config,
    _temp_dir: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!(
                r#"
[account]
handle = "@{HANDLE}"
consumer_key = "ck"
consumer_secret = "cs"
access_token = "at"
access_token_secret = "ats"

[storage]
data_dir = "state"

[pacing]
min_secs = 0
max_secs = 0

[policy]
min_followers = 100
min_statuses = 10
keep_following = [500]
"#
            ),
        )
        .expect("Failed to write config");

        let config = load_config(&config_path).expect("Failed to load config");
        validate_config(&config).expect("Config should be valid");

        Self {
            api: Arc::new(MockSocialApi::new()),
            config,
            _temp_dir: temp_dir,
        }
    }

    /// A fresh bot, as a new process would build it.
    fn bot(&self) -> Bot {
        Bot::new(self.config.clone(), self.api.clone(), Arc::new(NoPacer))
            .expect("Failed to create bot")
    }

    async fn set_graph(&self, followers: &[u64], following: &[u64]) {
        let ids = |v: &[u64]| v.iter().copied().map(UserId).collect::<Vec<_>>();
        self.api
            .set_ids(IdListing::Followers, HANDLE, ids(followers))
            .await;
        self.api
            .set_ids(IdListing::Friends, HANDLE, ids(following))
            .await;
    }
}

fn followed(id: u64, name: &str) -> tweeterbot_core::UserProfile {
    let mut profile = fixtures::profile(id, name, 300, 300);
    profile.following = Some(true);
    profile
}

#[tokio::test]
async fn test_data_dir_resolved_next_to_config() {
    let harness = TestHarness::new().await;
    let bot = harness.bot();

    assert!(bot.store().dir().ends_with("state"));
    for category in Category::ALL {
        assert!(bot.store().path(category).exists());
    }
}

#[tokio::test]
async fn test_full_cycle() {
    let harness = TestHarness::new().await;
    // Followers 1..=4, following 3, 4, 100, 101, 500.
    harness.set_graph(&[1, 2, 3, 4], &[3, 4, 100, 101, 500]).await;
    harness
        .api
        .add_profiles([
            fixtures::profile(1, "fan", 400, 300),
            fixtures::profile(2, "spammy", 20, 4000),
            followed(100, "quiet"),
            fixtures::verified_friend(101, "celebrity"),
            followed(500, "bestie"),
        ])
        .await;

    let mut bot = harness.bot();
    let sync = bot.sync_follows().await.unwrap();
    assert_eq!((sync.followers, sync.following), (4, 5));

    // Follow back: 1 accepted, 2 rejected and ignored.
    let report = bot.follow_back().await.unwrap();
    assert_eq!((report.succeeded, report.skipped), (1, 1));

    // Unfollow: 500 is on the keep list, 101 is verified.
    let report = bot.unfollow_non_followers().await.unwrap();
    assert_eq!((report.succeeded, report.skipped), (1, 1));

    assert_eq!(
        harness.api.mutations().await,
        vec![
            RecordedCall::Follow(UserId(1)),
            RecordedCall::Unfollow(UserId(100)),
        ]
    );

    let store = bot.store();
    let already = store.load(Category::AlreadyFollowed).unwrap();
    assert!(already.contains(&UserId(1)));
    assert!(already.contains(&UserId(100)));
    assert!(!already.contains(&UserId(500)));

    let ignored = store.load(Category::Ignored).unwrap();
    assert!(ignored.contains(&UserId(2)));
    assert!(ignored.contains(&UserId(101)));
}

#[tokio::test]
async fn test_rejections_persist_across_runs() {
    let harness = TestHarness::new().await;
    harness.set_graph(&[7], &[]).await;
    harness
        .api
        .add_profile(fixtures::profile(7, "tiny", 12, 40))
        .await;

    let mut first = harness.bot();
    first.sync_follows().await.unwrap();
    first.follow_back().await.unwrap();

    harness.api.clear_calls().await;
    let mut second = harness.bot();
    let report = second.follow_back().await.unwrap();

    assert_eq!(report.attempted, 0);
    assert!(harness.api.calls().await.is_empty());
}

#[tokio::test]
async fn test_quota_stops_follow_back_midway() {
    let harness = TestHarness::new().await;
    harness.set_graph(&[1, 2, 3], &[]).await;
    harness
        .api
        .add_profiles((1..=3).map(|id| fixtures::profile(id, "fan", 400, 300)))
        .await;
    harness.api.fail_id(2, 403, Some(161)).await;

    let mut bot = harness.bot();
    bot.sync_follows().await.unwrap();
    let err = bot.follow_back().await.unwrap_err();

    assert!(err.is_quota_exceeded());
    assert_eq!(
        harness.api.mutations().await,
        vec![
            RecordedCall::Follow(UserId(1)),
            RecordedCall::Follow(UserId(2)),
        ]
    );
    assert_eq!(
        bot.store().load(Category::AlreadyFollowed).unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_non_followers_report_after_sync() {
    let harness = TestHarness::new().await;
    harness.set_graph(&[1], &[1, 100, 101]).await;
    harness
        .api
        .add_profiles([followed(100, "quiet"), fixtures::verified_friend(101, "celebrity")])
        .await;

    let mut bot = harness.bot();
    bot.sync_follows().await.unwrap();
    let report = bot.report_non_followers().await.unwrap();

    let contents = std::fs::read_to_string(&report.path).unwrap();
    assert_eq!(contents, "[ ] @quiet [id: 100]\n[*] @celebrity [id: 101]\n");
}
