use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr};

// User

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicMetrics {
    pub followers_count: u64,
    pub following_count: u64,
    pub tweet_count: u64,
    #[serde(default)]
    pub listed_count: u64,
}

#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct User {
    #[serde_as(as = "DisplayFromStr")]
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: String,
    pub public_metrics: PublicMetrics,
}

// Errors reported inside a 200 response, e.g. an unknown username

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Problem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
    #[serde(rename = "type", default)]
    pub type_: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UserLookupResponse {
    pub data: Option<User>,
    #[serde(default)]
    pub errors: Vec<Problem>,
}

// Paginated lists

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct Meta {
    pub result_count: Option<u32>,
    pub next_token: Option<String>,
}

/// Entries are kept as raw JSON so a malformed one can be dropped without losing the page.
#[derive(Deserialize, Serialize, Debug)]
pub struct UserListResponse {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub meta: Meta,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct TweetListResponse {
    #[serde(default)]
    pub meta: Meta,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ErrorResponse {
    pub title: Option<String>,
    pub detail: Option<String>,
    #[serde(default)]
    pub errors: Vec<Problem>,
}
