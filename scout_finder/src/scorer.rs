use futures::{pin_mut, Stream, StreamExt};
use indexmap::IndexMap;

use scout_core::config::ScoreConfig;
use scout_core::{AccountCollection, AccountRecord, GraphService, RelationKind, Result};
use scout_util::handle_key;

use crate::fetcher::GraphFetcher;

/// Classification of one candidate, produced in candidate order.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreEvent {
    /// Met the mutuals threshold.
    Good { record: AccountRecord, mutuals: usize },
    Bad { record: AccountRecord, mutuals: usize },
    /// Too many followers to be worth fetching.
    Skipped { record: AccountRecord },
    /// Followers could not be fetched.
    Errored { record: AccountRecord, error: String },
}

/// Outcome of a scoring run. `good` and `bad` are keyed by lower-cased handle and never share a key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringResult {
    pub good: IndexMap<String, usize>,
    pub bad: IndexMap<String, usize>,
    pub skipped: Vec<String>,
    pub errored: IndexMap<String, String>,
}

enum Outcome {
    Skip,
    Fetched(Result<AccountCollection>),
}

pub struct MutualScorer<'a, G> {
    fetcher: &'a GraphFetcher<G>,
    config: ScoreConfig,
}

impl<'a, G: GraphService> MutualScorer<'a, G> {
    pub fn new(fetcher: &'a GraphFetcher<G>, config: ScoreConfig) -> Self {
        Self { fetcher, config }
    }

    /// Classify candidates until `good_mutuals_limit` good ones have been produced.
    ///
    /// Up to `concurrency` follower fetches run ahead of the consumer; results are still
    /// classified in candidate order, and fetches still in flight when the limit is reached
    /// are dropped unclassified. A rate limit that survives its retry ends the stream with
    /// the error; any other fetch failure is reported as [`ScoreEvent::Errored`].
    pub fn score_stream<'s>(
        &'s self,
        candidates: &'s AccountCollection,
        my_following: &'s AccountCollection,
        self_handle: &'s str,
    ) -> impl Stream<Item = Result<ScoreEvent>> + 's {
        let config = &self.config;
        let fetcher: &'s GraphFetcher<G> = self.fetcher;
        let self_key = handle_key(self_handle);

        async_stream::try_stream! {
            let work = futures::stream::iter(candidates.records().filter(move |r| r.key() != self_key))
                .map(move |record| async move {
                    if record.follower_count() >= config.max_followers_for_skip {
                        return (record, Outcome::Skip);
                    }
                    let followers = fetcher.fetch_relationships(record.id(), RelationKind::Followers).await;
                    (record, Outcome::Fetched(followers))
                })
                .buffered(config.concurrency.max(1));
            pin_mut!(work);

            let mut good = 0;
            while good < config.good_mutuals_limit {
                let Some((record, outcome)) = work.next().await else {
                    break;
                };
                let record = record.clone();
                match outcome {
                    Outcome::Skip => yield ScoreEvent::Skipped { record },
                    Outcome::Fetched(Ok(followers)) => {
                        let mutuals = my_following.mutual_count(&followers);
                        if mutuals >= config.mutuals_threshold {
                            good += 1;
                            yield ScoreEvent::Good { record, mutuals };
                        } else {
                            yield ScoreEvent::Bad { record, mutuals };
                        }
                    }
                    Outcome::Fetched(Err(e)) if e.retryable() => {
                        Err::<(), _>(e)?;
                    }
                    Outcome::Fetched(Err(e)) => yield ScoreEvent::Errored { record, error: e.to_string() },
                }
            }
        }
    }

    /// Drain [`score_stream`](Self::score_stream) into good/bad mappings, logging each event.
    pub async fn score(
        &self,
        candidates: &AccountCollection,
        my_following: &AccountCollection,
        self_handle: &str,
    ) -> Result<ScoringResult> {
        let mut result = ScoringResult::default();
        let events = self.score_stream(candidates, my_following, self_handle);
        pin_mut!(events);
        while let Some(event) = events.next().await {
            match event? {
                ScoreEvent::Good { record, mutuals } => {
                    let url = record.profile_url();
                    tracing::info!(handle = record.handle(), mutuals, url = url.as_str(), "Good candidate");
                    result.good.insert(record.key(), mutuals);
                }
                ScoreEvent::Bad { record, mutuals } => {
                    tracing::debug!("Bad candidate {} with {} mutuals", record.handle(), mutuals);
                    result.bad.insert(record.key(), mutuals);
                }
                ScoreEvent::Skipped { record } => {
                    tracing::info!("Skipping {} due to {} followers", record.handle(), record.follower_count());
                    result.skipped.push(record.key());
                }
                ScoreEvent::Errored { record, error } => {
                    tracing::warn!("Cannot score {}: {}", record.handle(), error);
                    result.errored.insert(record.key(), error);
                }
            }
        }
        Ok(result)
    }
}
