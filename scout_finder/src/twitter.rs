use async_trait::async_trait;
use chrono::{DateTime, Utc};

use scout_core::{
    AccountId, AccountRecord, ActivityService, Error, GraphService, RelationKind, RelationPage, Result,
};
use twitter_client::{Relation, TwitterClient, User, TWEETS_MIN_RESULTS};

/// Binds [`TwitterClient`] to the graph and activity service contracts.
#[derive(Debug, Clone)]
pub struct TwitterServices {
    client: TwitterClient,
}

impl TwitterServices {
    pub fn new(client: TwitterClient) -> Self {
        Self { client }
    }

    pub fn from_token(bearer_token: &str) -> Result<Self> {
        let client = TwitterClient::new(bearer_token).map_err(anyhow::Error::from)?;
        Ok(Self::new(client))
    }
}

fn record(user: User) -> AccountRecord {
    AccountRecord::new(
        user.username,
        AccountId::new(user.id.to_string()),
        user.public_metrics.followers_count,
        user.public_metrics.following_count,
        user.public_metrics.tweet_count,
    )
}

fn user_id(id: &AccountId) -> Result<u64> {
    id.as_str()
        .parse()
        .map_err(|_| Error::MalformedPage(format!("not a Twitter user id: {}", id)))
}

fn convert_error(error: twitter_client::Error) -> Error {
    match error {
        twitter_client::Error::RateLimited { reset } => match reset {
            Some(reset) => Error::RateLimit(format!("window resets at {}", reset)),
            None => Error::RateLimit("too many requests".to_string()),
        },
        twitter_client::Error::JSONError(e) => Error::MalformedPage(e.to_string()),
        other => anyhow::Error::from(other).into(),
    }
}

#[async_trait]
impl GraphService for TwitterServices {
    async fn resolve(&self, handle: &str) -> Result<AccountRecord> {
        match self.client.user_by_username(handle).await {
            Ok(user) => Ok(record(user)),
            Err(twitter_client::Error::NotFound(detail)) => {
                tracing::debug!("Lookup of {} failed: {}", handle, detail);
                Err(Error::Resolution(handle.to_string()))
            }
            Err(e) => Err(convert_error(e)),
        }
    }

    async fn relationship_page(
        &self,
        id: &AccountId,
        kind: RelationKind,
        page_size: u32,
        token: Option<&str>,
    ) -> Result<RelationPage> {
        let relation = match kind {
            RelationKind::Followers => Relation::Followers,
            RelationKind::Following => Relation::Following,
        };
        let page = self
            .client
            .relationship_page(user_id(id)?, relation, page_size, token)
            .await
            .map_err(convert_error)?;
        if page.skipped > 0 {
            tracing::warn!("Skipped {} malformed entries in {} of {}", page.skipped, kind, id);
        }
        Ok(RelationPage {
            accounts: page.users.into_iter().map(record).collect(),
            next_token: page.next_token,
        })
    }
}

#[async_trait]
impl ActivityService for TwitterServices {
    async fn post_count_since(&self, id: &AccountId, since: DateTime<Utc>) -> Result<u32> {
        // Any non-zero count answers the question, so ask for the smallest page.
        self.client
            .recent_tweet_count(user_id(id)?, since, TWEETS_MIN_RESULTS)
            .await
            .map_err(convert_error)
    }
}
