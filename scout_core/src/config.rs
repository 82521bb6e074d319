use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use std::path::PathBuf;
use std::time::Duration;

/// Thresholds of the quality filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    pub min_followers: u64,
    pub min_ratio: f64,
    pub max_ratio: f64,
    pub min_tweet_count: u64,
    /// Trailing window, in days, within which an account must have posted.
    pub tweet_days_cutoff: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_followers: 100,
            min_ratio: 0.3,
            max_ratio: 1.1,
            min_tweet_count: 10,
            tweet_days_cutoff: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoreConfig {
    pub mutuals_threshold: usize,
    /// Candidates with at least this many followers are not scored at all.
    pub max_followers_for_skip: u64,
    /// Scoring stops once this many good candidates are found.
    pub good_mutuals_limit: usize,
    /// Follower fetches kept in flight at once.
    pub concurrency: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            mutuals_threshold: 5,
            max_followers_for_skip: 1000,
            good_mutuals_limit: 10,
            concurrency: 1,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub page_size: u32,
    /// Wait before the single retry of a rate-limited request.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub rate_limit_backoff: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            // 15 minute window plus a minute of margin
            rate_limit_backoff: Duration::from_secs(16 * 60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub use_mutuals: bool,
    pub write_base_csv: bool,
    pub output_dir: PathBuf,
    pub filter: FilterConfig,
    pub score: ScoreConfig,
    pub fetch: FetchConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            use_mutuals: false,
            write_base_csv: false,
            output_dir: PathBuf::from("."),
            filter: FilterConfig::default(),
            score: ScoreConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}
