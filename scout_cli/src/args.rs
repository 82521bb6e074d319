use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use scout_core::config::PipelineConfig;

#[derive(Debug, Parser)]
#[command(name = "follow-scout", version, about = "Find accounts worth following among a target's followers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Filter (and optionally score) the followers of TARGET for OPERATOR
    Run(RunArgs),
    /// Print the profile URLs of an exported list, one per line
    Open {
        /// CSV written by `run`
        csv: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Your handle, `@handle` or profile URL
    pub operator: String,
    /// Account whose followers are searched
    pub target: String,

    #[arg(long, env = "TWITTER_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: String,

    /// JSON file with pipeline settings; flags below override it
    #[arg(long, env = "SCOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Score candidates by mutual connections and write the mutuals list
    #[arg(long)]
    pub use_mutuals: bool,
    /// Write the filtered, unscored list
    #[arg(long)]
    pub write_base_csv: bool,
    #[arg(long, env = "SCOUT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Abort the whole run after this many seconds, including any rate-limit wait
    #[arg(long, env = "SCOUT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    #[arg(long)]
    pub min_followers: Option<u64>,
    #[arg(long)]
    pub min_ratio: Option<f64>,
    #[arg(long)]
    pub max_ratio: Option<f64>,
    #[arg(long)]
    pub min_tweet_count: Option<u64>,
    #[arg(long)]
    pub tweet_days_cutoff: Option<u32>,

    #[arg(long)]
    pub mutuals_threshold: Option<usize>,
    #[arg(long)]
    pub max_followers_for_skip: Option<u64>,
    #[arg(long)]
    pub good_mutuals_limit: Option<usize>,
    /// Follower fetches kept in flight while scoring
    #[arg(long)]
    pub concurrency: Option<usize>,

    #[arg(long)]
    pub page_size: Option<u32>,
    #[arg(long)]
    pub backoff_secs: Option<u64>,
}

impl RunArgs {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Apply flags on top of `config`.
    pub fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        config.use_mutuals |= self.use_mutuals;
        config.write_base_csv |= self.write_base_csv;
        if let Some(ref dir) = self.output_dir {
            config.output_dir = dir.clone();
        }

        let filter = &mut config.filter;
        override_with(&mut filter.min_followers, self.min_followers);
        override_with(&mut filter.min_ratio, self.min_ratio);
        override_with(&mut filter.max_ratio, self.max_ratio);
        override_with(&mut filter.min_tweet_count, self.min_tweet_count);
        override_with(&mut filter.tweet_days_cutoff, self.tweet_days_cutoff);

        let score = &mut config.score;
        override_with(&mut score.mutuals_threshold, self.mutuals_threshold);
        override_with(&mut score.max_followers_for_skip, self.max_followers_for_skip);
        override_with(&mut score.good_mutuals_limit, self.good_mutuals_limit);
        override_with(&mut score.concurrency, self.concurrency);

        override_with(&mut config.fetch.page_size, self.page_size);
        override_with(
            &mut config.fetch.rate_limit_backoff,
            self.backoff_secs.map(Duration::from_secs),
        );
        config
    }
}

fn override_with<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RunArgs {
        let mut argv = vec!["follow-scout", "run", "alice", "bob", "--bearer-token", "token"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Command::Run(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn defaults_are_untouched_without_flags() {
        let config = parse(&[]).apply(PipelineConfig::default());
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn flags_override_config() {
        let args = parse(&[
            "--use-mutuals",
            "--min-followers",
            "50",
            "--max-ratio",
            "2.5",
            "--good-mutuals-limit",
            "3",
            "--backoff-secs",
            "60",
            "--output-dir",
            "out",
            "--timeout-secs",
            "3600",
        ]);
        let config = args.apply(PipelineConfig::default());
        assert!(config.use_mutuals);
        assert!(!config.write_base_csv);
        assert_eq!(config.filter.min_followers, 50);
        assert_eq!(config.filter.max_ratio, 2.5);
        assert_eq!(config.filter.min_ratio, 0.3);
        assert_eq!(config.score.good_mutuals_limit, 3);
        assert_eq!(config.fetch.rate_limit_backoff, Duration::from_secs(60));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(args.timeout(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn negative_cutoff_is_rejected() {
        let argv = ["follow-scout", "run", "alice", "bob", "--bearer-token", "t", "--tweet-days-cutoff=-5"];
        assert!(Cli::try_parse_from(argv).is_err());
        assert_eq!(parse(&["--tweet-days-cutoff", "7"]).tweet_days_cutoff, Some(7));
    }

    #[test]
    fn open_takes_a_path() {
        let cli = Cli::parse_from(["follow-scout", "open", "alice-bob-mutuals.csv"]);
        assert!(matches!(cli.command, Command::Open { csv } if csv == PathBuf::from("alice-bob-mutuals.csv")));
    }
}
