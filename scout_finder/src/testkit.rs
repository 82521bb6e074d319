// In-memory graph and activity services for tests. Both count the calls they receive.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use scout_core::{
    AccountCollection, AccountId, AccountRecord, ActivityService, Error, GraphService, RelationKind, RelationPage,
    Result,
};

pub fn account(handle: &str, followers: u64, following: u64, posts: u64) -> AccountRecord {
    AccountRecord::new(handle, AccountId::new(format!("id-{}", handle.to_lowercase())), followers, following, posts)
}

pub fn collection(records: impl IntoIterator<Item = AccountRecord>) -> AccountCollection {
    records.into_iter().collect()
}

/// A collection of plain accounts with the given handles.
pub fn handles(handles: &[&str]) -> AccountCollection {
    handles.iter().map(|h| account(h, 10, 10, 10)).collect()
}

#[derive(Default)]
pub struct FakeGraph {
    accounts: HashMap<String, AccountRecord>,
    relations: HashMap<(AccountId, RelationKind), Vec<AccountRecord>>,
    /// Remaining rate-limit answers for a given (account, kind, page index).
    rate_limits: Mutex<HashMap<(AccountId, RelationKind, usize), u32>>,
    /// Remaining rate-limit answers for lookups of a lower-cased handle.
    resolve_rate_limits: Mutex<HashMap<String, u32>>,
    failing: HashSet<AccountId>,
    pub page_calls: Mutex<Vec<(AccountId, RelationKind, Option<String>)>>,
    pub resolve_calls: Mutex<Vec<String>>,
}

impl FakeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, record: AccountRecord) -> Self {
        self.accounts.insert(record.key(), record);
        self
    }

    pub fn with_relations(mut self, owner: &AccountRecord, kind: RelationKind, records: Vec<AccountRecord>) -> Self {
        self.relations.insert((owner.id().clone(), kind), records);
        self
    }

    pub fn with_rate_limit(self, owner: &AccountRecord, kind: RelationKind, page: usize, times: u32) -> Self {
        self.rate_limits
            .lock()
            .unwrap()
            .insert((owner.id().clone(), kind, page), times);
        self
    }

    pub fn with_resolve_rate_limit(self, handle: &str, times: u32) -> Self {
        self.resolve_rate_limits
            .lock()
            .unwrap()
            .insert(handle.to_lowercase(), times);
        self
    }

    pub fn with_failure(mut self, owner: &AccountRecord) -> Self {
        self.failing.insert(owner.id().clone());
        self
    }

    pub fn page_call_count(&self) -> usize {
        self.page_calls.lock().unwrap().len()
    }

    /// Ids whose `kind` relations were requested, in request order, without repeats.
    pub fn fetched_ids(&self, kind: RelationKind) -> Vec<AccountId> {
        let mut seen = Vec::new();
        for (id, k, _) in self.page_calls.lock().unwrap().iter() {
            if *k == kind && !seen.contains(id) {
                seen.push(id.clone());
            }
        }
        seen
    }
}

#[async_trait]
impl GraphService for FakeGraph {
    async fn resolve(&self, handle: &str) -> Result<AccountRecord> {
        self.resolve_calls.lock().unwrap().push(handle.to_string());
        if take_rate_limit(&self.resolve_rate_limits, handle.to_lowercase()) {
            return Err(Error::RateLimit(format!("lookup of {}", handle)));
        }
        self.accounts
            .get(&handle.to_lowercase())
            .cloned()
            .ok_or(Error::Resolution(handle.to_string()))
    }

    async fn relationship_page(
        &self,
        id: &AccountId,
        kind: RelationKind,
        page_size: u32,
        token: Option<&str>,
    ) -> Result<RelationPage> {
        self.page_calls
            .lock()
            .unwrap()
            .push((id.clone(), kind, token.map(str::to_string)));

        if self.failing.contains(id) {
            return Err(Error::Service(format!("{} is unavailable", id)));
        }

        let page: usize = token.map(|t| t.parse().unwrap()).unwrap_or(0);
        if take_rate_limit(&self.rate_limits, (id.clone(), kind, page)) {
            return Err(Error::RateLimit(format!("{} {} page {}", id, kind, page)));
        }

        let records = self.relations.get(&(id.clone(), kind)).cloned().unwrap_or_default();
        let size = page_size.max(1) as usize;
        let start = page * size;
        let accounts: Vec<_> = records.iter().skip(start).take(size).cloned().collect();
        let next_token = (start + size < records.len()).then(|| (page + 1).to_string());
        Ok(RelationPage { accounts, next_token })
    }
}

/// Consume one pending rate-limit answer for `key`, if any is left.
fn take_rate_limit<K: std::hash::Hash + Eq>(limits: &Mutex<HashMap<K, u32>>, key: K) -> bool {
    match limits.lock().unwrap().get_mut(&key) {
        Some(remaining) if *remaining > 0 => {
            *remaining -= 1;
            true
        }
        _ => false,
    }
}

#[derive(Default)]
pub struct FakeActivity {
    posts: HashMap<AccountId, Vec<DateTime<Utc>>>,
    rate_limits: Mutex<HashMap<AccountId, u32>>,
    pub calls: Mutex<Vec<AccountId>>,
}

impl FakeActivity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a post by `record` made `days_ago` days before now.
    pub fn with_post(mut self, record: &AccountRecord, days_ago: i64) -> Self {
        self.posts
            .entry(record.id().clone())
            .or_default()
            .push(Utc::now() - Duration::days(days_ago));
        self
    }

    /// Answer the next `times` lookups for `record` with a rate limit.
    pub fn with_rate_limit(self, record: &AccountRecord, times: u32) -> Self {
        self.rate_limits.lock().unwrap().insert(record.id().clone(), times);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, record: &AccountRecord) -> usize {
        self.calls.lock().unwrap().iter().filter(|id| *id == record.id()).count()
    }
}

#[async_trait]
impl ActivityService for FakeActivity {
    async fn post_count_since(&self, id: &AccountId, since: DateTime<Utc>) -> Result<u32> {
        self.calls.lock().unwrap().push(id.clone());
        if take_rate_limit(&self.rate_limits, id.clone()) {
            return Err(Error::RateLimit(format!("activity of {}", id)));
        }
        let count = self
            .posts
            .get(id)
            .map(|posts| posts.iter().filter(|p| **p >= since).count())
            .unwrap_or(0);
        Ok(count as u32)
    }
}
