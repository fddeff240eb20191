//! Command-line interface for tweeterbot.
//!
//! Every workflow is a flag. Several may be given at once; they run in the
//! order the flags are declared here, with `--sync` always first.

use clap::builder::PossibleValuesParser;
use clap::Parser;
use std::path::PathBuf;

use tweeterbot_core::{StatusId, UserId};

/// Log levels accepted by `--loglevel`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Parser)]
#[command(
    name = "tweeterbot",
    version,
    about = "Automates following, favoriting, retweeting and pruning on Twitter"
)]
pub struct Cli {
    /// Configuration file [default: ~/.tweeterbot/config.toml]
    #[arg(long, env = "TWEETERBOT_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Sync followers and following to local files
    #[arg(long)]
    pub sync: bool,

    /// Follow back followers not yet followed
    #[arg(long)]
    pub follow_back: bool,

    /// Unfollow accounts that do not follow back
    #[arg(long)]
    pub unfollow: bool,

    /// Follow authors of recent posts matching PHRASE
    #[arg(long, value_name = "PHRASE")]
    pub follow_by_phrase: Option<String>,

    /// Favorite recent posts matching PHRASE
    #[arg(long, value_name = "PHRASE")]
    pub fav_by_phrase: Option<String>,

    /// Retweet recent posts matching PHRASE
    #[arg(long, value_name = "PHRASE")]
    pub rt_by_phrase: Option<String>,

    /// Follow the followers of HANDLE
    #[arg(long, value_name = "HANDLE")]
    pub follow_followers_of: Option<String>,

    /// Write accounts that do not follow back to non_followers.txt
    #[arg(long)]
    pub non_followers: bool,

    /// Unfollow every account listed in non_followers.txt
    #[arg(long)]
    pub unfollow_report: bool,

    /// Unfollow the given account ids
    #[arg(long, value_name = "ID", value_delimiter = ',', num_args = 1..)]
    pub unfollow_ids: Vec<UserId>,

    /// Mute every followed account
    #[arg(long)]
    pub mute_following: bool,

    /// Unmute every muted account
    #[arg(long)]
    pub unmute_all: bool,

    /// Add authors of recent posts matching PHRASE to --list-slug
    #[arg(long, value_name = "PHRASE", requires = "list_slug")]
    pub add_to_list: Option<String>,

    /// List receiving --add-to-list authors
    #[arg(long, value_name = "SLUG", requires = "add_to_list")]
    pub list_slug: Option<String>,

    /// Post a status
    #[arg(long, value_name = "TEXT")]
    pub post: Option<String>,

    /// Image to attach to --post
    #[arg(long, value_name = "PATH", requires = "post")]
    pub image: Option<PathBuf>,

    /// Undo a retweet
    #[arg(long, value_name = "STATUS_ID")]
    pub unretweet: Option<StatusId>,

    /// Delete posts listed in an exported archive CSV
    #[arg(long, value_name = "CSV", requires = "before")]
    pub delete_archived: Option<PathBuf>,

    /// Cutoff for --delete-archived: posts dated before it are deleted
    #[arg(long, value_name = "YYYY-MM-DD", requires = "delete_archived")]
    pub before: Option<String>,

    /// Print the effective configuration with secrets redacted and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write Prometheus metrics to PATH when the run ends
    #[arg(long, value_name = "PATH")]
    pub metrics_out: Option<PathBuf>,

    /// Log level, overrides RUST_LOG
    #[arg(long, value_parser = PossibleValuesParser::new(LOG_LEVELS))]
    pub loglevel: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Whether any workflow flag was given.
    pub fn has_workflow(&self) -> bool {
        self.sync
            || self.follow_back
            || self.unfollow
            || self.follow_by_phrase.is_some()
            || self.fav_by_phrase.is_some()
            || self.rt_by_phrase.is_some()
            || self.follow_followers_of.is_some()
            || self.non_followers
            || self.unfollow_report
            || !self.unfollow_ids.is_empty()
            || self.mute_following
            || self.unmute_all
            || self.add_to_list.is_some()
            || self.post.is_some()
            || self.unretweet.is_some()
            || self.delete_archived.is_some()
    }

    /// `--config`, else `$HOME/.tweeterbot/config.toml`, else
    /// `.tweeterbot/config.toml` in the working directory.
    pub fn config_path(&self) -> PathBuf {
        if let Some(path) = &self.config {
            return path.clone();
        }
        let base = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(".tweeterbot").join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_combined_flags() {
        let cli = Cli::try_parse_from([
            "tweeterbot",
            "--sync",
            "--follow-back",
            "--fav-by-phrase",
            "#rustlang",
            "--loglevel",
            "debug",
        ])
        .unwrap();
        assert!(cli.sync);
        assert!(cli.follow_back);
        assert_eq!(cli.fav_by_phrase.as_deref(), Some("#rustlang"));
        assert_eq!(cli.loglevel.as_deref(), Some("debug"));
        assert!(cli.has_workflow());
    }

    #[test]
    fn test_unknown_loglevel_rejected() {
        assert!(Cli::try_parse_from(["tweeterbot", "--loglevel", "chatty"]).is_err());
    }

    #[test]
    fn test_delete_archived_requires_before() {
        assert!(Cli::try_parse_from(["tweeterbot", "--delete-archived", "tweets.csv"]).is_err());

        let cli = Cli::try_parse_from([
            "tweeterbot",
            "--delete-archived",
            "tweets.csv",
            "--before",
            "2020-01-01",
        ])
        .unwrap();
        assert_eq!(cli.before.as_deref(), Some("2020-01-01"));
    }

    #[test]
    fn test_image_requires_post() {
        assert!(Cli::try_parse_from(["tweeterbot", "--image", "crab.png"]).is_err());
    }

    #[test]
    fn test_unretweet_parses_status_id() {
        let cli = Cli::try_parse_from(["tweeterbot", "--unretweet", "12345"]).unwrap();
        assert_eq!(cli.unretweet, Some(StatusId(12345)));
        assert!(Cli::try_parse_from(["tweeterbot", "--unretweet", "abc"]).is_err());
    }

    #[test]
    fn test_unfollow_ids_list() {
        let cli = Cli::try_parse_from(["tweeterbot", "--unfollow-ids", "12,34", "56"]).unwrap();
        assert_eq!(cli.unfollow_ids, vec![UserId(12), UserId(34), UserId(56)]);
        assert!(cli.has_workflow());
        assert!(Cli::try_parse_from(["tweeterbot", "--unfollow-ids", "12,x"]).is_err());
    }

    #[test]
    fn test_add_to_list_needs_slug() {
        assert!(Cli::try_parse_from(["tweeterbot", "--add-to-list", "#rust"]).is_err());
        assert!(Cli::try_parse_from(["tweeterbot", "--list-slug", "crabs"]).is_err());

        let cli = Cli::try_parse_from([
            "tweeterbot",
            "--add-to-list",
            "#rust",
            "--list-slug",
            "crabs",
            "--mute-following",
        ])
        .unwrap();
        assert_eq!(cli.list_slug.as_deref(), Some("crabs"));
        assert!(cli.mute_following);
        assert!(!cli.unmute_all);
    }

    #[test]
    fn test_explicit_config_path() {
        let cli = Cli::try_parse_from(["tweeterbot", "--config", "/tmp/bot.toml"]).unwrap();
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/bot.toml"));
        assert!(!cli.has_workflow());
    }
}
