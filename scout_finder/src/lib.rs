pub mod cache;
pub mod export;
pub mod fetcher;
pub mod filter;
pub mod pipeline;
pub mod scorer;
#[cfg(test)]
mod testkit;
pub mod twitter;

pub use cache::RecencyCache;
pub use fetcher::GraphFetcher;
pub use filter::{QualityFilter, Rejection};
pub use pipeline::{Pipeline, RunReport, Stage};
pub use scorer::{MutualScorer, ScoreEvent, ScoringResult};
pub use twitter::TwitterServices;
