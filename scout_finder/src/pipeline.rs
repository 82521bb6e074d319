// Sequences one discovery run:
// identify -> fetch operator graphs -> fetch target followers -> filter -> (export) -> score -> (export).
// Stages only move forward; any fatal error ends the run where it happened.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use scout_core::config::PipelineConfig;
use scout_core::{AccountCollection, AccountRecord, ActivityService, GraphService, RelationKind, Result};

use crate::cache::RecencyCache;
use crate::export;
use crate::fetcher::GraphFetcher;
use crate::filter::QualityFilter;
use crate::scorer::{MutualScorer, ScoringResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Identify,
    FetchOperatorGraphs,
    FetchTargetFollowers,
    Filter,
    Score,
    Done,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Identify => "identify",
            Stage::FetchOperatorGraphs => "fetch operator graphs",
            Stage::FetchTargetFollowers => "fetch target followers",
            Stage::Filter => "filter",
            Stage::Score => "score",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub operator: AccountRecord,
    pub target: AccountRecord,
    pub target_followers: usize,
    pub filtered: AccountCollection,
    pub scoring: Option<ScoringResult>,
    pub base_csv: Option<PathBuf>,
    pub mutuals_csv: Option<PathBuf>,
}

pub struct Pipeline<G, A> {
    fetcher: GraphFetcher<G>,
    filter: QualityFilter<A>,
    config: PipelineConfig,
    cache: RecencyCache,
    stage: Stage,
}

impl<G: GraphService, A: ActivityService> Pipeline<G, A> {
    pub fn new(graph: G, activity: A, config: PipelineConfig) -> Self {
        let fetcher = GraphFetcher::new(graph, config.fetch.clone());
        let filter = QualityFilter::new(activity, config.filter.clone(), config.fetch.rate_limit_backoff);
        Self {
            fetcher,
            filter,
            config,
            cache: RecencyCache::new(),
            stage: Stage::Identify,
        }
    }

    pub fn fetcher(&self) -> &GraphFetcher<G> {
        &self.fetcher
    }

    pub fn filter(&self) -> &QualityFilter<A> {
        &self.filter
    }

    pub fn cache(&self) -> &RecencyCache {
        &self.cache
    }

    /// The stage the last run reached; on failure, the stage that failed.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Find candidates for `operator` among the followers of `target`.
    /// The recency cache is kept across runs of the same pipeline.
    pub async fn run(&mut self, operator: &str, target: &str) -> Result<RunReport> {
        tracing::info!("----------");
        tracing::info!("Running for {}, targeting {}", operator, target);

        // 1. Both handles must exist before anything else is fetched
        self.enter(Stage::Identify);
        let operator = self.fetcher.resolve(operator).await?;
        tracing::info!("{} has id {}", operator.handle(), operator.id());
        let target = self.fetcher.resolve(target).await?;
        tracing::info!("{} has id {}", target.handle(), target.id());

        // 2. Operator graphs
        self.enter(Stage::FetchOperatorGraphs);
        let my_followers = self
            .fetcher
            .fetch_relationships(operator.id(), RelationKind::Followers)
            .await?;
        let my_following = self
            .fetcher
            .fetch_relationships(operator.id(), RelationKind::Following)
            .await?;
        tracing::info!(
            "{} has {} followers and follows {}",
            operator.handle(),
            my_followers.len(),
            my_following.len()
        );

        // 3. Target followers
        self.enter(Stage::FetchTargetFollowers);
        let followers = self
            .fetcher
            .fetch_relationships(target.id(), RelationKind::Followers)
            .await?;
        tracing::info!("Found {} followers for {}", followers.len(), target.handle());

        // 4. Filter
        self.enter(Stage::Filter);
        let filtered = self
            .filter
            .filter(&followers, &my_followers, operator.handle(), &mut self.cache)
            .await?;
        tracing::info!("Filtered by stats down to {} for {}", filtered.len(), target.handle());

        let (operator_key, target_key) = (operator.key(), target.key());
        let output_dir = self.config.output_dir.clone();
        let base_csv = if self.config.write_base_csv {
            let path = export::base_csv_path(&output_dir, &operator_key, &target_key);
            export::write_base_csv(&path, &filtered).await?;
            tracing::info!("Wrote {} candidates to {}", filtered.len(), path.display());
            Some(path)
        } else {
            None
        };

        // 5. Score
        let (scoring, mutuals_csv) = if self.config.use_mutuals {
            self.enter(Stage::Score);
            let scorer = MutualScorer::new(&self.fetcher, self.config.score.clone());
            let scoring = scorer.score(&filtered, &my_following, operator.handle()).await?;
            tracing::info!(
                "Scored {} candidates: {} good, {} bad, {} skipped, {} errored",
                filtered.len(),
                scoring.good.len(),
                scoring.bad.len(),
                scoring.skipped.len(),
                scoring.errored.len()
            );
            tracing::info!("Bad mutuals for {}: {:?}", operator.handle(), scoring.bad);

            let path = export::mutuals_csv_path(&output_dir, &operator_key, &target_key);
            export::write_mutuals_csv(&path, &scoring.good).await?;
            tracing::info!("Wrote {} candidates to {}", scoring.good.len(), path.display());
            (Some(scoring), Some(path))
        } else {
            (None, None)
        };

        self.enter(Stage::Done);
        Ok(RunReport {
            operator,
            target,
            target_followers: followers.len(),
            filtered,
            scoring,
            base_csv,
            mutuals_csv,
        })
    }

    fn enter(&mut self, stage: Stage) {
        tracing::debug!("Stage: {}", stage);
        self.stage = stage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::*;
    use scout_core::Error;

    struct World {
        graph: FakeGraph,
        activity: FakeActivity,
    }

    /// alice follows m0..m5 and is followed by `fan`; bob is followed by carol, dave, fan and alice.
    /// carol is followed by five of alice's follows; dave has too many followers to score.
    fn world() -> World {
        let alice = account("alice", 50, 10, 300);
        let bob = account("Bob", 900, 800, 3000);
        let carol = account("carol", 150, 140, 20);
        let dave = account("dave", 2000, 1900, 50);
        let fan = account("fan", 150, 140, 20);
        let my_following: Vec<_> = (0..6).map(|i| account(&format!("m{}", i), 10, 10, 10)).collect();

        let graph = FakeGraph::new()
            .with_account(alice.clone())
            .with_account(bob.clone())
            .with_relations(&alice, RelationKind::Followers, vec![fan.clone()])
            .with_relations(&alice, RelationKind::Following, my_following.clone())
            .with_relations(
                &bob,
                RelationKind::Followers,
                vec![carol.clone(), dave.clone(), fan.clone(), alice.clone()],
            )
            .with_relations(&carol, RelationKind::Followers, my_following[..5].to_vec());
        let activity = FakeActivity::new()
            .with_post(&carol, 2)
            .with_post(&dave, 1)
            .with_post(&fan, 1);
        World { graph, activity }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("scout_pipeline_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[tokio::test]
    async fn full_run_exports_both_lists() {
        let World { graph, activity } = world();
        let output_dir = temp_dir("full");
        let config = PipelineConfig {
            use_mutuals: true,
            write_base_csv: true,
            output_dir: output_dir.clone(),
            ..PipelineConfig::default()
        };
        let mut pipeline = Pipeline::new(graph, activity, config);
        let report = pipeline.run("alice", "bob").await.unwrap();

        assert_eq!(pipeline.stage(), Stage::Done);
        assert_eq!(report.target_followers, 4);
        assert_eq!(report.filtered.handles().collect::<Vec<_>>(), vec!["carol", "dave"]);

        let scoring = report.scoring.unwrap();
        assert_eq!(scoring.good.get("carol"), Some(&5));
        assert!(!scoring.good.contains_key("dave"));
        assert!(!scoring.bad.contains_key("dave"));

        let base = std::fs::read_to_string(report.base_csv.unwrap()).unwrap();
        assert_eq!(base, "https://twitter.com/carol,carol\r\nhttps://twitter.com/dave,dave\r\n");
        let mutuals = std::fs::read_to_string(output_dir.join("alice-bob-mutuals.csv")).unwrap();
        assert_eq!(mutuals, "https://twitter.com/carol,carol,5\r\n");
    }

    #[tokio::test]
    async fn exports_are_gated_by_flags() {
        let World { graph, activity } = world();
        let output_dir = temp_dir("gated");
        let config = PipelineConfig {
            output_dir: output_dir.clone(),
            ..PipelineConfig::default()
        };
        let mut pipeline = Pipeline::new(graph, activity, config);
        let report = pipeline.run("alice", "bob").await.unwrap();

        assert!(report.scoring.is_none());
        assert!(report.base_csv.is_none() && report.mutuals_csv.is_none());
        assert!(!output_dir.exists());
        assert_eq!(pipeline.fetcher().graph().fetched_ids(RelationKind::Followers).len(), 2);
    }

    #[tokio::test]
    async fn unknown_target_aborts_before_fetching() {
        let World { graph, activity } = world();
        let mut pipeline = Pipeline::new(graph, activity, PipelineConfig::default());
        let result = pipeline.run("alice", "nobody").await;

        assert!(matches!(result, Err(Error::Resolution(h)) if h == "nobody"));
        assert_eq!(pipeline.stage(), Stage::Identify);
        assert_eq!(*pipeline.fetcher().graph().resolve_calls.lock().unwrap(), vec!["alice", "nobody"]);
        assert_eq!(pipeline.fetcher().graph().page_call_count(), 0);
        assert_eq!(pipeline.filter().activity().call_count(), 0);
    }

    #[tokio::test]
    async fn out_of_range_cutoff_fails_in_filter() {
        let World { graph, activity } = world();
        let mut config = PipelineConfig::default();
        config.filter.tweet_days_cutoff = u32::MAX;
        let mut pipeline = Pipeline::new(graph, activity, config);
        let result = pipeline.run("alice", "bob").await;

        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(pipeline.stage(), Stage::Filter);
        assert_eq!(pipeline.filter().activity().call_count(), 0);
    }

    #[tokio::test]
    async fn cache_survives_between_runs() {
        let World { graph, activity } = world();
        let mut pipeline = Pipeline::new(graph, activity, PipelineConfig::default());
        pipeline.run("alice", "bob").await.unwrap();
        let calls = pipeline.filter().activity().call_count();
        assert_eq!(calls, 2);
        assert_eq!(pipeline.cache().get("carol"), Some(true));

        pipeline.run("alice", "bob").await.unwrap();
        assert_eq!(pipeline.filter().activity().call_count(), calls);
    }
}
