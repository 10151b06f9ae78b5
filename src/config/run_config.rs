use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Full run configuration, loaded from a TOML file. Everything except the
/// query list has a usable default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub search: SearchConfig,
    #[serde(default)]
    pub sources: BTreeMap<String, SourceConfig>,
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub filtering: FilteringConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub queries: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    /// When set, postings that came back summary-only go through the
    /// enrichment phase.
    #[serde(default)]
    pub fetch_full_description: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Endpoint for HTTP-API-backed sources built from configuration alone.
    pub endpoint: Option<String>,
    pub display_name: Option<String>,
    #[serde(default = "default_true")]
    pub supports_location_filter: bool,
}

fn default_max_results() -> usize {
    20
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    #[serde(default = "default_search_workers")]
    pub search_workers: usize,
    #[serde(default = "default_enrich_workers")]
    pub enrich_workers: usize,
}

fn default_search_workers() -> usize {
    6
}

fn default_enrich_workers() -> usize {
    5
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            search_workers: default_search_workers(),
            enrich_workers: default_enrich_workers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_task_seconds")]
    pub task_seconds: u64,
    #[serde(default = "default_run_seconds")]
    pub run_seconds: u64,
}

fn default_task_seconds() -> u64 {
    30
}

fn default_run_seconds() -> u64 {
    300
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            task_seconds: default_task_seconds(),
            run_seconds: default_run_seconds(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilteringConfig {
    /// Postings below this score are dropped at export, never in memory.
    #[serde(default)]
    pub min_relevance_score: u8,
    /// Case-insensitive title substrings that exclude a posting at export.
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    #[serde(default = "default_base_filename")]
    pub base_filename: String,
}

fn default_output_path() -> String {
    "./outputs".to_string()
}

fn default_formats() -> Vec<String> {
    vec!["csv".to_string()]
}

fn default_base_filename() -> String {
    "jobs".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            formats: default_formats(),
            base_filename: default_base_filename(),
        }
    }
}

impl RunConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Restrict the run to the listed source ids, as if every other source
    /// had `enabled = false`. Ids without a config entry get one created, so
    /// a source can be forced on from the command line alone.
    pub fn restrict_sources(&mut self, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        for conf in self.sources.values_mut() {
            conf.enabled = false;
        }
        for id in ids {
            let key = id.to_lowercase();
            self.sources
                .entry(key)
                .and_modify(|c| c.enabled = true)
                .or_insert_with(|| SourceConfig {
                    enabled: true,
                    max_results: default_max_results(),
                    endpoint: None,
                    display_name: None,
                    supports_location_filter: true,
                });
        }
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("search.queries", self.search.queries.len(), 1)?;
        for query in &self.search.queries {
            validate_non_empty_string("search.queries", query)?;
        }
        validate_positive_number(
            "concurrency.search_workers",
            self.concurrency.search_workers,
            1,
        )?;
        validate_positive_number(
            "concurrency.enrich_workers",
            self.concurrency.enrich_workers,
            1,
        )?;
        validate_positive_number("timeouts.task_seconds", self.timeouts.task_seconds as usize, 1)?;
        validate_positive_number("timeouts.run_seconds", self.timeouts.run_seconds as usize, 1)?;
        validate_non_empty_string("output.path", &self.output.path)?;
        for (id, conf) in &self.sources {
            if let Some(endpoint) = &conf.endpoint {
                validate_url(&format!("sources.{}.endpoint", id), endpoint)?;
            }
        }
        Ok(())
    }
}
