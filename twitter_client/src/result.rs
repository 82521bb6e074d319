use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::response::{ErrorResponse, UserListResponse, UserLookupResponse};
pub use crate::response::{Problem, PublicMetrics, User};

/// One page of a followers/following listing.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct UserPage {
    pub users: Vec<User>,
    pub next_token: Option<String>,
    /// Entries dropped because they could not be decoded.
    pub skipped: usize,
}

// MARK: Conversions

impl From<UserListResponse> for UserPage {
    fn from(response: UserListResponse) -> Self {
        let mut users = Vec::with_capacity(response.data.len());
        let mut skipped = 0;
        for entry in response.data {
            let username = entry
                .get("username")
                .and_then(|u| u.as_str())
                .unwrap_or("<unknown>")
                .to_string();
            match serde_path_to_error::deserialize::<_, User>(entry) {
                Ok(user) => users.push(user),
                Err(e) => {
                    tracing::warn!("Skipped malformed user entry {}: {}", username, e);
                    skipped += 1;
                }
            }
        }
        UserPage {
            users,
            next_token: response.meta.next_token,
            skipped,
        }
    }
}

impl TryFrom<UserLookupResponse> for User {
    type Error = Error;

    fn try_from(value: UserLookupResponse) -> Result<Self, Self::Error> {
        match value.data {
            Some(user) => Ok(user),
            None => {
                let detail = value
                    .errors
                    .into_iter()
                    .next()
                    .map(|p| p.detail)
                    .unwrap_or_else(|| "empty user lookup response".to_string());
                Err(Error::NotFound(detail))
            }
        }
    }
}

impl ErrorResponse {
    pub fn detail(&self) -> Option<String> {
        self.detail
            .clone()
            .or_else(|| self.errors.first().map(|p| p.detail.clone()))
            .or_else(|| self.title.clone())
    }
}
