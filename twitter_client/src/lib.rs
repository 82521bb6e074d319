mod consts;
mod error;
mod response;
mod result;
mod util;

use chrono::{DateTime, Utc};
use reqwest::{header, Client, Response, StatusCode, Url};

pub use consts::{TWEETS_MAX_RESULTS, TWEETS_MIN_RESULTS, USER_LIST_MAX_RESULTS};
use consts::*;
use response::{ErrorResponse, TweetListResponse, UserListResponse, UserLookupResponse};
pub use result::*;

pub use crate::error::Error;
use crate::error::Result;

use scout_util::build_params;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Followers,
    Following,
}

impl Relation {
    fn path_segment(self) -> &'static str {
        match self {
            Relation::Followers => "followers",
            Relation::Following => "following",
        }
    }
}

/// Client for the read-only user endpoints of the Twitter API v2, authenticated with an app bearer token.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    client: reqwest::Client,
    base_url: Url,
}

impl TwitterClient {
    pub fn new(bearer_token: &str) -> Result<TwitterClient> {
        Self::with_base_url(bearer_token, API_BASE)
    }

    /// Point the client at another host, e.g. a recording proxy.
    pub fn with_base_url(bearer_token: &str, base_url: &str) -> Result<TwitterClient> {
        let authorization = format!("Bearer {}", bearer_token.trim());
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&authorization).map_err(|_| Error::InvalidToken)?,
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(TwitterClient { client, base_url })
    }

    pub async fn user_by_username(&self, username: &str) -> Result<User> {
        let params = build_params! {
            required "user.fields" => USER_FIELDS,
        };
        let response: UserLookupResponse = self
            .api_get("user_by_username", &format!("users/by/username/{}", username), &params)
            .await?;
        response.try_into()
    }

    /// One page of the accounts following, or followed by, `user_id`.
    pub async fn relationship_page(
        &self,
        user_id: u64,
        relation: Relation,
        max_results: u32,
        pagination_token: Option<&str>,
    ) -> Result<UserPage> {
        let max_results = max_results.clamp(1, USER_LIST_MAX_RESULTS);
        let params = build_params! {
            required "user.fields" => USER_FIELDS,
            required max_results,
            optional pagination_token,
        };
        let endpoint = relation.path_segment();
        let response: UserListResponse = self
            .api_get(endpoint, &format!("users/{}/{}", user_id, endpoint), &params)
            .await?;
        Ok(response.into())
    }

    /// Number of tweets posted by `user_id` since `start_time`, capped at `max_results`.
    /// A missing count is reported as zero.
    pub async fn recent_tweet_count(&self, user_id: u64, start_time: DateTime<Utc>, max_results: u32) -> Result<u32> {
        let max_results = max_results.clamp(TWEETS_MIN_RESULTS, TWEETS_MAX_RESULTS);
        let start_time = util::format_start_time(start_time);
        let params = build_params! {
            required max_results,
            required start_time,
        };
        let response: TweetListResponse = self
            .api_get("user_tweets", &format!("users/{}/tweets", user_id), &params)
            .await?;
        Ok(response.meta.result_count.unwrap_or(0))
    }
}

impl TwitterClient {
    async fn api_get<R>(&self, name: &str, path: &str, params: &[(String, String)]) -> Result<R>
    where
        R: serde::de::DeserializeOwned,
    {
        let url = self.base_url.join(path)?;
        let response: Response = self.client.get(url).query(params).send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let content = response.text().await?;
        log(name, &content).await?;
        check_status(status, &headers, &content)?;

        let deserializer = &mut serde_json::Deserializer::from_str(&content);
        serde_path_to_error::deserialize(deserializer).map_err(|e| e.into())
    }
}

/// Classify a response by status. 429 becomes [`Error::RateLimited`] with the window reset from
/// the headers, 404 becomes [`Error::NotFound`], and any other failure becomes [`Error::Api`].
fn check_status(status: StatusCode, headers: &header::HeaderMap, content: &str) -> Result<()> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let reset = util::rate_limit_reset(headers);
        return Err(Error::RateLimited { reset });
    }
    if !status.is_success() {
        return Err(api_error(status, content));
    }
    Ok(())
}

fn api_error(status: StatusCode, content: &str) -> Error {
    let detail = serde_json::from_str::<ErrorResponse>(content)
        .ok()
        .and_then(|r| r.detail())
        .unwrap_or_else(|| content.to_string());
    if status == StatusCode::NOT_FOUND {
        Error::NotFound(detail)
    } else {
        Error::Api {
            status: status.as_u16(),
            detail,
        }
    }
}

async fn log(name: &str, content: &str) -> Result<()> {
    use std::path::PathBuf;
    use tokio::{fs::File, io::AsyncWriteExt};

    if let Ok(dir) = std::env::var("CLIENT_LOG_DIR") {
        let time = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let filepath = PathBuf::from(dir).join(format!("twitter_{}_{}.json", name, time));
        let mut file = File::create(filepath).await?;
        file.write_all(content.as_bytes()).await?;
    }
    Ok(())
}
