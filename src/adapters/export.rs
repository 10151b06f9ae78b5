//! Export boundary: writes a finished run to disk.
//!
//! The in-memory `RunResult` always keeps everything; the score/keyword
//! filter only shapes what lands in the files. Each run gets its own
//! timestamped directory under the configured output path.

use crate::config::run_config::{FilteringConfig, OutputConfig};
use crate::domain::model::{CanonicalPosting, RunResult};
use crate::utils::error::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};

pub struct Exporter {
    output: OutputConfig,
    filtering: FilteringConfig,
}

impl Exporter {
    pub fn new(output: OutputConfig, filtering: FilteringConfig) -> Self {
        Self { output, filtering }
    }

    /// Writes every configured format and returns the run directory.
    pub fn export(&self, result: &RunResult) -> Result<PathBuf> {
        let dir = Path::new(&self.output.path).join(format!(
            "{}_{}",
            Utc::now().format("%Y%m%d_%H%M"),
            self.output.base_filename
        ));
        std::fs::create_dir_all(&dir)?;

        let filtered = self.filtered(result);
        tracing::info!(
            kept = filtered.len(),
            total = result.postings.len(),
            dir = %dir.display(),
            "exporting results"
        );

        for format in &self.output.formats {
            match format.as_str() {
                "csv" => self.write_csv(&dir, &filtered)?,
                "json" => self.write_json(&dir, result, &filtered)?,
                "markdown" => self.write_markdown(&dir, result, &filtered)?,
                other => {
                    tracing::warn!(format = other, "unknown output format, skipping");
                }
            }
        }
        Ok(dir)
    }

    fn filtered<'a>(&self, result: &'a RunResult) -> Vec<&'a CanonicalPosting> {
        let excluded: Vec<String> = self
            .filtering
            .exclude_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();
        result
            .postings
            .iter()
            .filter(|c| c.posting.score >= self.filtering.min_relevance_score)
            .filter(|c| {
                let title = c.posting.posting.title.to_lowercase();
                !excluded.iter().any(|k| !k.is_empty() && title.contains(k))
            })
            .collect()
    }

    fn write_csv(&self, dir: &Path, postings: &[&CanonicalPosting]) -> Result<()> {
        let path = dir.join(format!("{}.csv", self.output.base_filename));
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record([
            "relevance_score",
            "sources",
            "title",
            "company",
            "location",
            "work_location_type",
            "matched_skills",
            "missing_skills",
            "matched_roles",
            "salary_hint",
            "link",
            "fingerprint",
        ])?;
        for canonical in postings {
            let scored = &canonical.posting;
            writer.write_record([
                scored.score.to_string(),
                canonical.sources.iter().cloned().collect::<Vec<_>>().join("; "),
                scored.posting.title.clone(),
                scored.posting.company.clone(),
                scored.posting.location.clone(),
                scored.work_location_type.to_string(),
                flatten_skills(&scored.matched_skills),
                flatten_skills(&scored.missing_skills),
                scored.matched_roles.join(", "),
                scored.salary_hint.clone().unwrap_or_default(),
                scored.posting.link.clone(),
                canonical.fingerprint.clone(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_json(
        &self,
        dir: &Path,
        result: &RunResult,
        postings: &[&CanonicalPosting],
    ) -> Result<()> {
        let path = dir.join(format!("{}.json", self.output.base_filename));
        let document = serde_json::json!({
            "postings": postings,
            "outcomes": result.outcomes,
        });
        std::fs::write(&path, serde_json::to_string_pretty(&document)?)?;
        Ok(())
    }

    fn write_markdown(
        &self,
        dir: &Path,
        result: &RunResult,
        postings: &[&CanonicalPosting],
    ) -> Result<()> {
        let path = dir.join(format!("{}.md", self.output.base_filename));
        let mut report = format!(
            "# Job Search Results ({})\n\nTotal exported: {}\n\n## Sources\n\n",
            Utc::now().format("%Y-%m-%d"),
            postings.len()
        );
        for (source, outcome) in &result.outcomes {
            report.push_str(&format!("- **{}**: {:?}\n", source, outcome));
        }
        report.push_str("\n## Postings\n\n");
        for (rank, canonical) in postings.iter().enumerate() {
            let scored = &canonical.posting;
            report.push_str(&format!(
                "### {}. {} (**{}%**)\n",
                rank + 1,
                scored.posting.title,
                scored.score
            ));
            report.push_str(&format!(
                "- **Sources:** {} | **Location:** {}\n",
                canonical.sources.iter().cloned().collect::<Vec<_>>().join(", "),
                scored.posting.location
            ));
            report.push_str(&format!(
                "- **Matching skills:** {}\n",
                flatten_skills(&scored.matched_skills)
            ));
            report.push_str(&format!("- **Link:** {}\n\n---\n", scored.posting.link));
        }
        std::fs::write(&path, report)?;
        Ok(())
    }
}

fn flatten_skills(by_category: &std::collections::BTreeMap<String, Vec<String>>) -> String {
    by_category
        .iter()
        .map(|(category, skills)| format!("{}: {}", category, skills.join(", ")))
        .collect::<Vec<_>>()
        .join(" | ")
}
