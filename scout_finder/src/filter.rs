use chrono::{TimeDelta, Utc};
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use scout_core::config::FilterConfig;
use scout_core::{AccountCollection, AccountRecord, ActivityService, Error, Result};
use scout_util::handle_key;

use crate::cache::RecencyCache;
use crate::fetcher::retry_rate_limited;

/// Why a candidate was dropped, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rejection {
    SelfAccount,
    ExistingFollower,
    TooFewFollowers,
    NoFollowing,
    TooFewPosts,
    RatioOutOfRange,
    Inactive,
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Rejection::SelfAccount => "own account",
            Rejection::ExistingFollower => "already a follower",
            Rejection::TooFewFollowers => "too few followers",
            Rejection::NoFollowing => "follows nobody",
            Rejection::TooFewPosts => "too few posts",
            Rejection::RatioOutOfRange => "ratio out of range",
            Rejection::Inactive => "no recent posts",
        };
        f.write_str(reason)
    }
}

pub struct QualityFilter<A> {
    activity: A,
    config: FilterConfig,
    rate_limit_backoff: Duration,
}

impl<A: ActivityService> QualityFilter<A> {
    pub fn new(activity: A, config: FilterConfig, rate_limit_backoff: Duration) -> Self {
        Self {
            activity,
            config,
            rate_limit_backoff,
        }
    }

    pub fn activity(&self) -> &A {
        &self.activity
    }

    /// The metric predicates, without the recency lookup.
    pub fn check_stats(
        &self,
        record: &AccountRecord,
        exclude: &AccountCollection,
        self_handle: &str,
    ) -> std::result::Result<(), Rejection> {
        let config = &self.config;
        let key = record.key();
        if key == handle_key(self_handle) {
            return Err(Rejection::SelfAccount);
        }
        if exclude.contains(&key) {
            return Err(Rejection::ExistingFollower);
        }
        if record.follower_count() < config.min_followers {
            return Err(Rejection::TooFewFollowers);
        }
        // Checked before any division
        let Some(ratio) = record.ratio() else {
            return Err(Rejection::NoFollowing);
        };
        if record.post_count() < config.min_tweet_count {
            return Err(Rejection::TooFewPosts);
        }
        if !(config.min_ratio <= ratio && ratio <= config.max_ratio) {
            return Err(Rejection::RatioOutOfRange);
        }
        Ok(())
    }

    /// Keep the candidates passing every predicate. `exclude` holds the operator's followers.
    pub async fn filter(
        &self,
        candidates: &AccountCollection,
        exclude: &AccountCollection,
        self_handle: &str,
        cache: &mut RecencyCache,
    ) -> Result<AccountCollection> {
        let mut accepted = AccountCollection::new();
        let mut rejections = Vec::new();
        for record in candidates.records() {
            let verdict = match self.check_stats(record, exclude, self_handle) {
                Ok(()) => {
                    if self.tweeted_recently(record, cache).await? {
                        Ok(())
                    } else {
                        Err(Rejection::Inactive)
                    }
                }
                Err(rejection) => Err(rejection),
            };
            match verdict {
                Ok(()) => {
                    accepted.insert(record.clone());
                }
                Err(rejection) => {
                    tracing::trace!("Rejected {}: {}", record.handle(), rejection);
                    rejections.push(rejection);
                }
            }
        }

        if !rejections.is_empty() {
            let summary = rejections
                .into_iter()
                .counts()
                .into_iter()
                .sorted()
                .map(|(rejection, count)| format!("{}: {}", rejection, count))
                .join(", ");
            tracing::debug!("Rejected candidates ({})", summary);
        }
        Ok(accepted)
    }

    /// Recency check through the cache. Only a miss reaches the activity service.
    async fn tweeted_recently(&self, record: &AccountRecord, cache: &mut RecencyCache) -> Result<bool> {
        if let Some(cached) = cache.get(record.handle()) {
            return Ok(cached);
        }

        let days = self.config.tweet_days_cutoff;
        let since = TimeDelta::try_days(i64::from(days))
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .ok_or_else(|| Error::Config(format!("tweet_days_cutoff of {} days is out of range", days)))?;
        let count = retry_rate_limited(self.rate_limit_backoff, || {
            self.activity.post_count_since(record.id(), since)
        })
        .await?;
        let recent = count > 0;
        cache.insert(record.handle(), recent);
        Ok(recent)
    }
}
