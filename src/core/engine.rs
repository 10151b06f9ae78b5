//! Pipeline runner: search → location post-filter → enrichment → scoring →
//! deduplication → assembly.

use crate::config::run_config::RunConfig;
use crate::core::dispatcher::{apply_location_filter, DispatchBudget, Dispatcher};
use crate::core::registry::SourceRegistry;
use crate::core::{assembler, dedup, scorer};
use crate::domain::model::{Profile, RunResult};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::sync::Arc;
use std::time::Duration;

pub struct SearchEngine {
    registry: SourceRegistry,
    dispatcher: Dispatcher,
    profile: Arc<Profile>,
    config: RunConfig,
}

impl SearchEngine {
    pub fn new(registry: SourceRegistry, profile: Profile, config: RunConfig) -> Self {
        let budget = DispatchBudget {
            search_workers: config.concurrency.search_workers,
            enrich_workers: config.concurrency.enrich_workers,
            task_timeout: Duration::from_secs(config.timeouts.task_seconds),
            run_timeout: Duration::from_secs(config.timeouts.run_seconds),
        };
        Self {
            registry,
            dispatcher: Dispatcher::new(budget),
            profile: Arc::new(profile),
            config,
        }
    }

    /// Runs the full pipeline. The only errors this returns are the fatal
    /// preconditions (invalid profile, nothing to search); every per-source
    /// and per-posting fault is recovered into the outcome map instead.
    pub async fn run(&self) -> Result<RunResult> {
        self.profile.validate()?;
        let enabled = self.registry.enabled(&self.config)?;
        let started = std::time::Instant::now();

        tracing::info!(sources = enabled.len(), "phase 1: searching");
        let report = self
            .dispatcher
            .run_search(
                &enabled,
                &self.config.search.queries,
                &self.config.search.locations,
            )
            .await;
        tracing::info!(postings = report.postings.len(), "search phase complete");

        let deferred = Dispatcher::deferred_sources(&enabled);
        let postings = apply_location_filter(
            report.postings,
            &deferred,
            &self.profile.target_locations,
        );

        let postings = if self.config.search.fetch_full_description {
            tracing::info!("phase 2: enrichment");
            self.dispatcher.run_enrichment(postings, &enabled).await
        } else {
            postings
        };

        tracing::info!(postings = postings.len(), "phase 3: scoring");
        let scored = postings
            .iter()
            .map(|p| scorer::score(p, &self.profile))
            .collect::<Vec<_>>();

        let canonical = dedup::deduplicate(scored, &self.profile);
        tracing::info!(unique = canonical.len(), "phase 4: deduplication complete");

        let result = assembler::assemble(canonical, report.outcomes);
        self.log_summary(&result, started.elapsed());
        Ok(result)
    }

    fn log_summary(&self, result: &RunResult, elapsed: Duration) {
        for (source, outcome) in &result.outcomes {
            tracing::info!(source = source.as_str(), outcome = ?outcome, "source outcome");
        }
        for (rank, canonical) in result.postings.iter().take(5).enumerate() {
            tracing::info!(
                rank = rank + 1,
                score = canonical.posting.score,
                title = canonical.posting.posting.title.as_str(),
                link = canonical.posting.posting.link.as_str(),
                "top result"
            );
        }
        tracing::info!(
            postings = result.postings.len(),
            elapsed_s = format!("{:.1}", elapsed.as_secs_f64()),
            "run complete"
        );
    }
}
