use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One weighted group of profile skills ("programming", "roles", ...).
///
/// Skill tokens are case-insensitive-normalized and unique within a category;
/// the loader in `config::profile` enforces that before the profile reaches
/// the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCategory {
    pub skills: Vec<String>,
    pub weight: f64,
    /// Core categories get a skill-gap report (missing skills) in the output.
    #[serde(default)]
    pub core: bool,
    /// Multiplier applied to a skill found in the posting title. Skills found
    /// only in the description count with weight 1.0.
    #[serde(default = "default_title_boost")]
    pub title_boost: f64,
}

fn default_title_boost() -> f64 {
    2.0
}

/// The user's skill profile. Built once per run from external configuration,
/// immutable thereafter, shared read-only across all concurrent tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub categories: BTreeMap<String, SkillCategory>,
    #[serde(default)]
    pub target_locations: Vec<String>,
    #[serde(default)]
    pub target_roles: Vec<String>,
    #[serde(default)]
    pub known_companies: Vec<String>,
}

/// One unit of search work: (source, query, optional location). Sources
/// without native location filtering get tasks with `location: None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTask {
    pub source_id: String,
    pub query: String,
    pub location: Option<String>,
}

/// A posting as reported by a source, immutable once produced. The
/// description may be a summary until the enrichment phase fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPosting {
    pub title: String,
    pub source: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub posting_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkLocationType {
    Remote,
    Hybrid,
    OnSite,
}

impl std::fmt::Display for WorkLocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkLocationType::Remote => write!(f, "Remote"),
            WorkLocationType::Hybrid => write!(f, "Hybrid"),
            WorkLocationType::OnSite => write!(f, "On-site"),
        }
    }
}

/// A posting after relevance scoring and gap analysis. Produced by the
/// scorer; immutable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPosting {
    pub posting: RawPosting,
    /// Relevance in [0, 100].
    pub score: u8,
    /// Matched skills per category.
    pub matched_skills: BTreeMap<String, Vec<String>>,
    /// Missing skills, reported for core categories only.
    pub missing_skills: BTreeMap<String, Vec<String>>,
    pub matched_roles: Vec<String>,
    pub work_location_type: WorkLocationType,
    pub salary_hint: Option<String>,
}

/// The deduplicated representative of one or more raw postings sharing a
/// fingerprint, carrying every source that independently reported it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalPosting {
    pub fingerprint: String,
    pub posting: ScoredPosting,
    pub sources: BTreeSet<String>,
}

/// Terminal status of one source's slot in the outcome map. Written exactly
/// once per source during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Succeeded { postings: usize },
    Failed { error: String },
    /// Still in flight when the global run deadline fired.
    Incomplete,
}

/// Terminal artifact of the core pipeline, handed to the export boundary.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Canonical postings, score-descending with a deterministic tie-break.
    pub postings: Vec<CanonicalPosting>,
    /// One outcome slot per enabled source.
    pub outcomes: BTreeMap<String, SourceOutcome>,
}
