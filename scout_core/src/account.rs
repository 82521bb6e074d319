use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use scout_util::{handle_key, profile_url};

/// Opaque account identifier issued by the graph service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity and public metrics of one account. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    handle: String,
    id: AccountId,
    follower_count: u64,
    following_count: u64,
    post_count: u64,
}

impl AccountRecord {
    pub fn new(
        handle: impl Into<String>,
        id: AccountId,
        follower_count: u64,
        following_count: u64,
        post_count: u64,
    ) -> Self {
        Self {
            handle: handle.into(),
            id,
            follower_count,
            following_count,
            post_count,
        }
    }

    /// Handle as the service spells it.
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Lower-cased handle, the identity key used by collections.
    pub fn key(&self) -> String {
        handle_key(&self.handle)
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn follower_count(&self) -> u64 {
        self.follower_count
    }

    pub fn following_count(&self) -> u64 {
        self.following_count
    }

    pub fn post_count(&self) -> u64 {
        self.post_count
    }

    /// `follower_count / following_count`, or `None` when the account follows nobody.
    pub fn ratio(&self) -> Option<f64> {
        if self.following_count == 0 {
            return None;
        }
        Some(self.follower_count as f64 / self.following_count as f64)
    }

    pub fn profile_url(&self) -> String {
        profile_url(&self.key())
    }
}

/// Accounts keyed by lower-cased handle, in the order the service returned them.
/// Inserting a handle twice keeps the position of the first and the value of the last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountCollection {
    accounts: IndexMap<String, AccountRecord>,
}

impl AccountCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: AccountRecord) -> Option<AccountRecord> {
        self.accounts.insert(record.key(), record)
    }

    pub fn get(&self, handle: &str) -> Option<&AccountRecord> {
        self.accounts.get(&handle_key(handle))
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.accounts.contains_key(&handle_key(handle))
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Lower-cased handles in collection order.
    pub fn handles(&self) -> impl Iterator<Item = &str> {
        self.accounts.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &AccountRecord> {
        self.accounts.values()
    }

    /// Number of handles present in both collections.
    /// Membership is tested while walking the smaller side; the count does not depend on it.
    pub fn mutual_count(&self, other: &AccountCollection) -> usize {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .accounts
            .keys()
            .filter(|handle| large.accounts.contains_key(*handle))
            .count()
    }
}

impl FromIterator<AccountRecord> for AccountCollection {
    fn from_iter<T: IntoIterator<Item = AccountRecord>>(iter: T) -> Self {
        let mut collection = AccountCollection::new();
        collection.extend(iter);
        collection
    }
}

impl Extend<AccountRecord> for AccountCollection {
    fn extend<T: IntoIterator<Item = AccountRecord>>(&mut self, iter: T) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl IntoIterator for AccountCollection {
    type Item = AccountRecord;
    type IntoIter = indexmap::map::IntoValues<String, AccountRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.accounts.into_values()
    }
}
