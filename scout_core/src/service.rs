// Contracts of the two external services the finder consumes.
// The Twitter binding lives in `scout_finder::twitter`; tests use in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};

use crate::account::{AccountId, AccountRecord};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Accounts the subject follows.
    Following,
    /// Accounts following the subject.
    Followers,
}

impl Display for RelationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationKind::Following => f.write_str("following"),
            RelationKind::Followers => f.write_str("followers"),
        }
    }
}

/// One page of a relationship listing. A missing `next_token` marks the last page.
#[derive(Debug, Clone, Default)]
pub struct RelationPage {
    pub accounts: Vec<AccountRecord>,
    pub next_token: Option<String>,
}

/// Source of account identities and follower graphs.
#[async_trait]
pub trait GraphService: Send + Sync {
    /// Look up an account by handle. Unknown handles yield [`Error::Resolution`](crate::Error::Resolution).
    async fn resolve(&self, handle: &str) -> Result<AccountRecord>;

    /// Fetch one page of `kind` relations of `id`. A rate-limited request yields
    /// [`Error::RateLimit`](crate::Error::RateLimit).
    async fn relationship_page(
        &self,
        id: &AccountId,
        kind: RelationKind,
        page_size: u32,
        token: Option<&str>,
    ) -> Result<RelationPage>;
}

/// Source of recent posting activity.
#[async_trait]
pub trait ActivityService: Send + Sync {
    /// Number of posts by `id` since `since`. Zero when the service reports no count.
    async fn post_count_since(&self, id: &AccountId, since: DateTime<Utc>) -> Result<u32>;
}
