use std::future::Future;
use std::time::Duration;

use tokio_retry::{strategy::FixedInterval, RetryIf};

use scout_core::config::FetchConfig;
use scout_core::{AccountCollection, AccountId, AccountRecord, Error, GraphService, RelationKind, Result};

/// Run `action`, and if it is rate limited, wait `backoff` and run it exactly once more.
/// A second rate limit is returned to the caller.
/// The wait is an ordinary timer, so dropping the returned future cancels it.
pub async fn retry_rate_limited<T, F, Fut>(backoff: Duration, action: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let strategy = FixedInterval::new(backoff).take(1);
    RetryIf::spawn(strategy, action, |e: &Error| {
        if e.retryable() {
            tracing::warn!("{}, sleeping {} s before retrying once", e, backoff.as_secs());
            true
        } else {
            false
        }
    })
    .await
}

/// Retrieves whole relationship sets, page by page.
#[derive(Debug, Clone)]
pub struct GraphFetcher<G> {
    graph: G,
    config: FetchConfig,
}

impl<G: GraphService> GraphFetcher<G> {
    pub fn new(graph: G, config: FetchConfig) -> Self {
        Self { graph, config }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub async fn resolve(&self, handle: &str) -> Result<AccountRecord> {
        retry_rate_limited(self.config.rate_limit_backoff, || self.graph.resolve(handle)).await
    }

    /// All `kind` relations of `id`, keyed by lower-cased handle.
    pub async fn fetch_relationships(&self, id: &AccountId, kind: RelationKind) -> Result<AccountCollection> {
        let mut collection = AccountCollection::new();
        let mut token: Option<String> = None;
        let mut pages = 0;
        loop {
            let page = retry_rate_limited(self.config.rate_limit_backoff, || {
                self.graph
                    .relationship_page(id, kind, self.config.page_size, token.as_deref())
            })
            .await?;
            pages += 1;
            tracing::debug!("Fetched {} page {} of {}: {} accounts", kind, pages, id, page.accounts.len());
            collection.extend(page.accounts);

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(collection)
    }
}
