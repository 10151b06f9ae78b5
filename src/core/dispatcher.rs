//! Concurrent fan-out of search and enrichment work.
//!
//! Both phases run under bounded pools (`buffer_unordered`) with independent
//! ceilings: search fans out per (source × query × location), enrichment per
//! posting. Every task resolves to a value, never a panic across the pool
//! boundary: a failed or timed-out task becomes part of its source's outcome,
//! and no failure cancels sibling tasks. A global run deadline bounds total
//! wall-clock time; sources still in flight when it fires are recorded as
//! incomplete rather than silently dropped.

use crate::core::registry::EnabledSource;
use crate::domain::model::{RawPosting, SearchTask, SourceOutcome};
use crate::domain::ports::Source;
use crate::utils::error::SourceError;
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

/// Concurrency and timeout budget for one run. Search and enrichment get
/// separate ceilings because their per-item cost differs by an order of
/// magnitude.
#[derive(Debug, Clone)]
pub struct DispatchBudget {
    pub search_workers: usize,
    pub enrich_workers: usize,
    pub task_timeout: Duration,
    pub run_timeout: Duration,
}

impl Default for DispatchBudget {
    fn default() -> Self {
        Self {
            search_workers: 6,
            enrich_workers: 5,
            task_timeout: Duration::from_secs(30),
            run_timeout: Duration::from_secs(300),
        }
    }
}

/// Everything the search phase produced: the raw postings from all sources
/// that reported, plus exactly one outcome slot per enabled source.
#[derive(Debug)]
pub struct SearchReport {
    pub postings: Vec<RawPosting>,
    pub outcomes: BTreeMap<String, SourceOutcome>,
}

struct TaskReport {
    source_id: String,
    result: Result<Vec<RawPosting>, SourceError>,
}

/// Per-source tally, folded into a single outcome when the phase ends. Each
/// source's slot is written exactly once, after the pool has been joined, so
/// no synchronization beyond the stream itself is needed.
struct SlotState {
    expected: usize,
    completed: usize,
    successes: usize,
    postings: usize,
    errors: Vec<String>,
}

struct OutcomeCollector {
    slots: BTreeMap<String, SlotState>,
    deadline_hit: bool,
}

impl OutcomeCollector {
    fn new(tasks: &[SearchTask], sources: &[EnabledSource]) -> Self {
        let mut slots: BTreeMap<String, SlotState> = BTreeMap::new();
        for enabled in sources {
            slots.insert(
                enabled.source.id().to_string(),
                SlotState {
                    expected: 0,
                    completed: 0,
                    successes: 0,
                    postings: 0,
                    errors: Vec::new(),
                },
            );
        }
        for task in tasks {
            if let Some(slot) = slots.get_mut(&task.source_id) {
                slot.expected += 1;
            }
        }
        Self {
            slots,
            deadline_hit: false,
        }
    }

    fn record(&mut self, report: TaskReport) {
        let Some(slot) = self.slots.get_mut(&report.source_id) else {
            return;
        };
        slot.completed += 1;
        match report.result {
            Ok(postings) => {
                slot.successes += 1;
                slot.postings += postings.len();
            }
            Err(e) => slot.errors.push(e.to_string()),
        }
    }

    fn mark_deadline_hit(&mut self) {
        self.deadline_hit = true;
    }

    fn finish(self) -> BTreeMap<String, SourceOutcome> {
        self.slots
            .into_iter()
            .map(|(id, slot)| {
                let outcome = if self.deadline_hit && slot.completed < slot.expected {
                    SourceOutcome::Incomplete
                } else if slot.successes > 0 || slot.errors.is_empty() {
                    SourceOutcome::Succeeded {
                        postings: slot.postings,
                    }
                } else {
                    SourceOutcome::Failed {
                        error: slot.errors.join("; "),
                    }
                };
                (id, outcome)
            })
            .collect()
    }
}

pub struct Dispatcher {
    budget: DispatchBudget,
}

impl Dispatcher {
    pub fn new(budget: DispatchBudget) -> Self {
        Self { budget }
    }

    /// One task per (query × location) for sources that filter natively; one
    /// unscoped task per query for sources that don't, whose results are
    /// location-filtered afterwards. This keeps redundant per-location
    /// queries off sources that would ignore the parameter anyway.
    pub fn build_tasks(
        sources: &[EnabledSource],
        queries: &[String],
        locations: &[String],
    ) -> Vec<SearchTask> {
        let mut tasks = Vec::new();
        for enabled in sources {
            let source_id = enabled.source.id().to_string();
            for query in queries {
                if enabled.source.supports_location_filter() && !locations.is_empty() {
                    for location in locations {
                        tasks.push(SearchTask {
                            source_id: source_id.clone(),
                            query: query.clone(),
                            location: Some(location.clone()),
                        });
                    }
                } else {
                    tasks.push(SearchTask {
                        source_id: source_id.clone(),
                        query: query.clone(),
                        location: None,
                    });
                }
            }
        }
        tasks
    }

    /// Ids of enabled sources whose location filtering is deferred to
    /// post-processing.
    pub fn deferred_sources(sources: &[EnabledSource]) -> BTreeSet<String> {
        sources
            .iter()
            .filter(|e| !e.source.supports_location_filter())
            .map(|e| e.source.id().to_string())
            .collect()
    }

    pub async fn run_search(
        &self,
        sources: &[EnabledSource],
        queries: &[String],
        locations: &[String],
    ) -> SearchReport {
        let tasks = Self::build_tasks(sources, queries, locations);
        tracing::info!(
            sources = sources.len(),
            tasks = tasks.len(),
            workers = self.budget.search_workers,
            "dispatching search tasks"
        );

        let handles: BTreeMap<String, (Arc<dyn Source>, usize)> = sources
            .iter()
            .map(|e| {
                (
                    e.source.id().to_string(),
                    (e.source.clone(), e.max_results),
                )
            })
            .collect();

        let mut collector = OutcomeCollector::new(&tasks, sources);
        let task_timeout = self.budget.task_timeout;

        let futures = tasks.into_iter().filter_map(|task| {
            let (source, limit) = handles.get(&task.source_id)?.clone();
            Some(async move {
                let searched = source.search(&task.query, task.location.as_deref(), limit);
                let result = match tokio::time::timeout(task_timeout, searched).await {
                    Ok(Ok(postings)) => {
                        tracing::debug!(
                            source = source.id(),
                            query = task.query.as_str(),
                            location = task.location.as_deref().unwrap_or("-"),
                            found = postings.len(),
                            "search task finished"
                        );
                        Ok(postings)
                    }
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(SourceError::TimeoutError {
                        seconds: task_timeout.as_secs(),
                    }),
                };
                TaskReport {
                    source_id: task.source_id,
                    result,
                }
            })
        });

        let mut pool =
            stream::iter(futures).buffer_unordered(self.budget.search_workers.max(1));
        let deadline = tokio::time::sleep(self.budget.run_timeout);
        tokio::pin!(deadline);

        let mut postings = Vec::new();
        loop {
            tokio::select! {
                item = pool.next() => match item {
                    Some(report) => {
                        if let Err(e) = &report.result {
                            tracing::warn!(
                                source = report.source_id.as_str(),
                                error = %e,
                                "search task failed, continuing with remaining sources"
                            );
                        }
                        if let Ok(found) = &report.result {
                            postings.extend(found.iter().cloned());
                        }
                        collector.record(report);
                    }
                    None => break,
                },
                _ = &mut deadline => {
                    tracing::warn!(
                        seconds = self.budget.run_timeout.as_secs(),
                        "run deadline reached, cancelling tasks still in flight"
                    );
                    collector.mark_deadline_hit();
                    break;
                }
            }
        }

        SearchReport {
            postings,
            outcomes: collector.finish(),
        }
    }

    /// Fetch full descriptions for summary-only postings under the enrichment
    /// budget. A failed or timed-out fetch degrades that posting to its
    /// summary; nothing is removed.
    pub async fn run_enrichment(
        &self,
        postings: Vec<RawPosting>,
        sources: &[EnabledSource],
    ) -> Vec<RawPosting> {
        let handles: BTreeMap<String, Arc<dyn Source>> = sources
            .iter()
            .map(|e| (e.source.id().to_string(), e.source.clone()))
            .collect();

        let (pending, mut complete): (Vec<_>, Vec<_>) = postings
            .into_iter()
            .partition(|p| p.description.trim().is_empty());
        if pending.is_empty() {
            return complete;
        }

        tracing::info!(
            count = pending.len(),
            workers = self.budget.enrich_workers,
            "fetching full descriptions"
        );

        let task_timeout = self.budget.task_timeout;
        let futures = pending.into_iter().map(|mut posting| {
            let source = handles.get(&posting.source).cloned();
            async move {
                let Some(source) = source else {
                    return posting;
                };
                let fetched = source.fetch_full_description(&posting);
                match tokio::time::timeout(task_timeout, fetched).await {
                    Ok(Ok(Some(description))) => posting.description = description,
                    Ok(Ok(None)) => {}
                    Ok(Err(e)) => tracing::warn!(
                        source = posting.source.as_str(),
                        link = posting.link.as_str(),
                        error = %e,
                        "enrichment failed, keeping summary"
                    ),
                    Err(_) => tracing::warn!(
                        source = posting.source.as_str(),
                        link = posting.link.as_str(),
                        "enrichment timed out, keeping summary"
                    ),
                }
                posting
            }
        });

        let mut enriched: Vec<RawPosting> = stream::iter(futures)
            .buffer_unordered(self.budget.enrich_workers.max(1))
            .collect()
            .await;
        enriched.append(&mut complete);
        enriched
    }
}

/// Drops postings from deferred sources that match none of the target
/// locations. Postings without a location, or explicitly remote ones, are
/// kept; natively-filtered sources pass through untouched.
pub fn apply_location_filter(
    postings: Vec<RawPosting>,
    deferred: &BTreeSet<String>,
    targets: &[String],
) -> Vec<RawPosting> {
    if targets.is_empty() || deferred.is_empty() {
        return postings;
    }
    let targets: Vec<String> = targets.iter().map(|t| t.to_lowercase()).collect();
    let before = postings.len();
    let kept: Vec<RawPosting> = postings
        .into_iter()
        .filter(|p| {
            if !deferred.contains(&p.source) {
                return true;
            }
            let location = p.location.to_lowercase();
            location.trim().is_empty()
                || location.contains("remote")
                || targets.iter().any(|t| location.contains(t.as_str()))
        })
        .collect();
    if kept.len() < before {
        tracing::debug!(dropped = before - kept.len(), "location post-filter applied");
    }
    kept
}
