pub mod account;
pub mod config;
pub mod error;
pub mod service;

pub use account::{AccountCollection, AccountId, AccountRecord};
pub use error::{Error, Result};
pub use service::{ActivityService, GraphService, RelationKind, RelationPage};
