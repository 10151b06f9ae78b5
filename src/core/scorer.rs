//! Pure relevance scoring and skill-gap analysis.
//!
//! `score` is a pure function of (posting, profile): no I/O, no shared
//! mutable state, safe to call from any number of concurrent tasks.
//!
//! Scoring model: per category, each matched skill contributes 1.0 when it
//! only appears in the description and `title_boost` when it appears in the
//! title. The category fraction is the weighted hit count normalized by the
//! number of configured skills in that category, capped at 1.0. The final
//! score is the weight-averaged category fraction scaled to [0, 100]. A
//! known-company match adds a bonus pseudo-category worth 10% of the summed
//! category weights.

use crate::domain::model::{Profile, RawPosting, ScoredPosting, WorkLocationType};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Share of the summed category weights granted to the known-company bonus.
const KNOWN_COMPANY_SHARE: f64 = 0.1;

const REMOTE_KEYWORDS: &[&str] = &[
    "remote",
    "home office",
    "homeoffice",
    "ortsunabhängig",
    "telearbeit",
];

/// Lowercase text and replace every non-alphanumeric character with a space,
/// collapsing runs. Multi-word skills then match as contiguous phrases.
pub fn fold(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut folded = String::with_capacity(lowered.len());
    let mut last_was_space = true;
    for ch in lowered.chars() {
        if ch.is_alphanumeric() {
            folded.push(ch);
            last_was_space = false;
        } else if !last_was_space {
            folded.push(' ');
            last_was_space = true;
        }
    }
    if folded.ends_with(' ') {
        folded.pop();
    }
    folded
}

/// Token-boundary containment check against pre-folded text. Skills carrying
/// symbols ("c++", "c#", ".net") would be destroyed by folding, so they match
/// as plain lowercase substrings of the raw text instead.
fn has_skill(folded: &str, raw_lower: &str, skill: &str) -> bool {
    let symbolic = skill
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());
    if symbolic {
        return raw_lower.contains(skill);
    }
    let folded_skill = fold(skill);
    if folded_skill.is_empty() {
        return false;
    }
    let padded = format!(" {} ", folded);
    padded.contains(&format!(" {} ", folded_skill))
}

struct PostingText {
    title_folded: String,
    title_raw: String,
    body_folded: String,
    body_raw: String,
}

impl PostingText {
    fn new(posting: &RawPosting) -> Self {
        // Company and location participate in description-side matching, the
        // same text a reader would scan.
        let body = format!(
            "{} {} {}",
            posting.description, posting.company, posting.location
        );
        Self {
            title_folded: fold(&posting.title),
            title_raw: posting.title.to_lowercase(),
            body_folded: fold(&body),
            body_raw: body.to_lowercase(),
        }
    }

    fn in_title(&self, skill: &str) -> bool {
        has_skill(&self.title_folded, &self.title_raw, skill)
    }

    fn in_body(&self, skill: &str) -> bool {
        has_skill(&self.body_folded, &self.body_raw, skill)
    }
}

pub fn score(posting: &RawPosting, profile: &Profile) -> ScoredPosting {
    let text = PostingText::new(posting);

    let mut matched_skills: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut missing_skills: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut weighted_total = 0.0f64;
    let mut weight_sum = 0.0f64;

    for (name, category) in &profile.categories {
        if category.skills.is_empty() {
            continue;
        }

        let mut matched = Vec::new();
        let mut missing = Vec::new();
        let mut hits = 0.0f64;
        for skill in &category.skills {
            let in_title = text.in_title(skill);
            let in_body = text.in_body(skill);
            if in_title || in_body {
                hits += if in_title { category.title_boost } else { 1.0 };
                matched.push(skill.clone());
            } else {
                missing.push(skill.clone());
            }
        }

        if !matched.is_empty() {
            matched_skills.insert(name.clone(), matched);
        }
        if category.core && !missing.is_empty() {
            missing_skills.insert(name.clone(), missing);
        }

        if category.weight > 0.0 {
            let fraction = (hits / category.skills.len() as f64).min(1.0);
            weighted_total += fraction * category.weight;
            weight_sum += category.weight;
        }
    }

    if !profile.known_companies.is_empty() && weight_sum > 0.0 {
        let bonus_weight = KNOWN_COMPANY_SHARE * weight_sum;
        let company_lower = posting.company.to_lowercase();
        let known = profile
            .known_companies
            .iter()
            .any(|c| !c.is_empty() && company_lower.contains(c));
        if known {
            weighted_total += bonus_weight;
        }
        weight_sum += bonus_weight;
    }

    let score = if weight_sum > 0.0 {
        ((weighted_total / weight_sum) * 100.0).round().clamp(0.0, 100.0) as u8
    } else {
        0
    };

    let matched_roles = profile
        .target_roles
        .iter()
        .filter(|role| text.in_title(role) || text.in_body(role))
        .cloned()
        .collect();

    ScoredPosting {
        score,
        matched_skills,
        missing_skills,
        matched_roles,
        work_location_type: classify_work_location(&text),
        salary_hint: salary_hint(&posting.description),
        posting: posting.clone(),
    }
}

fn classify_work_location(text: &PostingText) -> WorkLocationType {
    let padded = format!(" {} {} ", text.title_folded, text.body_folded);
    if REMOTE_KEYWORDS
        .iter()
        .any(|kw| padded.contains(&format!(" {} ", fold(kw))))
    {
        WorkLocationType::Remote
    } else if padded.contains(" hybrid ") {
        WorkLocationType::Hybrid
    } else {
        WorkLocationType::OnSite
    }
}

fn salary_hint(description: &str) -> Option<String> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE
        .get_or_init(|| {
            Regex::new(
                r"(?i)(?:Salary|Gehalt|Stundensatz|Vergütung)\s*:?\s*([€$]\s?\d{2,3}[kK]|\d{2,3}[.,]\d{3}\s?[€$]|\d{2,3}\s?€\s?/\s?h|EUR)",
            )
            .ok()
        })
        .as_ref()?;
    re.captures(description)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SkillCategory;

    fn category(skills: &[&str], weight: f64, core: bool) -> SkillCategory {
        SkillCategory {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            weight,
            core,
            title_boost: 2.0,
        }
    }

    fn profile_with(categories: &[(&str, SkillCategory)]) -> Profile {
        Profile {
            categories: categories
                .iter()
                .map(|(n, c)| (n.to_string(), c.clone()))
                .collect(),
            ..Profile::default()
        }
    }

    fn posting(title: &str, description: &str) -> RawPosting {
        RawPosting {
            title: title.to_string(),
            source: "boardone".to_string(),
            company: String::new(),
            location: String::new(),
            link: "https://boardone.example.com/jobs/1".to_string(),
            description: description.to_string(),
            posting_id: None,
        }
    }

    #[test]
    fn test_full_match_in_both_categories_scores_100() {
        let profile = profile_with(&[
            ("programming", category(&["python"], 1.0, false)),
            ("roles", category(&["senior"], 0.5, false)),
        ]);
        let scored = score(&posting("Senior Python Engineer", ""), &profile);

        assert_eq!(scored.score, 100);
        assert_eq!(scored.matched_skills["programming"], vec!["python"]);
        assert_eq!(scored.matched_skills["roles"], vec!["senior"]);
        assert!(scored.missing_skills.is_empty());
    }

    #[test]
    fn test_zero_overlap_scores_zero_with_gap_report() {
        let profile = profile_with(&[
            ("programming", category(&["python", "rust"], 1.0, true)),
            ("testing", category(&["pytest"], 1.0, true)),
        ]);
        let scored = score(&posting("Accountant", "Bookkeeping and payroll."), &profile);

        assert_eq!(scored.score, 0);
        assert!(scored.matched_skills.is_empty());
        assert_eq!(scored.missing_skills["programming"], vec!["python", "rust"]);
        assert_eq!(scored.missing_skills["testing"], vec!["pytest"]);
    }

    #[test]
    fn test_missing_skills_only_for_core_categories() {
        let profile = profile_with(&[
            ("programming", category(&["python"], 1.0, true)),
            ("domain", category(&["automotive"], 1.0, false)),
        ]);
        let scored = score(&posting("Gardener", ""), &profile);

        assert!(scored.missing_skills.contains_key("programming"));
        assert!(!scored.missing_skills.contains_key("domain"));
    }

    #[test]
    fn test_scoring_is_pure_and_deterministic() {
        let profile = profile_with(&[("programming", category(&["python", "rust"], 1.0, true))]);
        let input = posting("Rust Developer", "We use Rust and Python in production.");

        let first = score(&input, &profile);
        let second = score(&input, &profile);
        assert_eq!(first, second);
    }

    #[test]
    fn test_score_always_within_bounds() {
        // Title boost could push a category past 1.0 without the cap.
        let profile = profile_with(&[("programming", category(&["rust"], 1.0, false))]);
        let scored = score(&posting("Rust Rust Rust", "rust rust"), &profile);
        assert!(scored.score <= 100);
        assert_eq!(scored.score, 100);
    }

    #[test]
    fn test_description_only_match_weighs_less_than_title_match() {
        let profile = profile_with(&[("programming", category(&["python", "rust"], 1.0, false))]);
        let title_hit = score(&posting("Python Engineer", ""), &profile);
        let body_hit = score(&posting("Engineer", "Python experience required."), &profile);
        assert!(title_hit.score > body_hit.score);
    }

    #[test]
    fn test_multi_word_skill_matches_as_phrase() {
        let profile = profile_with(&[("testing", category(&["test automation"], 1.0, false))]);

        let contiguous = score(&posting("Test Automation Engineer", ""), &profile);
        assert_eq!(contiguous.matched_skills["testing"], vec!["test automation"]);

        let split = score(
            &posting("Automation Engineer", "We test everything manually."),
            &profile,
        );
        assert!(split.matched_skills.is_empty());
    }

    #[test]
    fn test_symbolic_skills_match_as_substrings() {
        let profile = profile_with(&[("programming", category(&["c++", "c#"], 1.0, false))]);
        let scored = score(&posting("C++ Developer", "Modern C++ (17/20)."), &profile);
        assert_eq!(scored.matched_skills["programming"], vec!["c++"]);
    }

    #[test]
    fn test_plain_skill_does_not_match_inside_word() {
        let profile = profile_with(&[("programming", category(&["java"], 1.0, false))]);
        let scored = score(&posting("JavaScript Developer", ""), &profile);
        assert!(scored.matched_skills.is_empty());
    }

    #[test]
    fn test_unicode_text_does_not_crash() {
        let profile = profile_with(&[("programming", category(&["python"], 1.0, true))]);
        let scored = score(
            &posting(
                "Entwickler (m/w/d) für Embedded-Systeme",
                "Wir suchen Verstärkung — 日本語もOK. Vergütung: 85.000 €",
            ),
            &profile,
        );
        assert_eq!(scored.score, 0);
        assert_eq!(scored.salary_hint.as_deref(), Some("85.000 €"));
    }

    #[test]
    fn test_known_company_bonus() {
        let mut profile = profile_with(&[("programming", category(&["python"], 1.0, false))]);
        profile.known_companies = vec!["acme".to_string()];

        let mut at_known = posting("Python Engineer", "");
        at_known.company = "ACME Robotics GmbH".to_string();
        let mut at_other = posting("Python Engineer", "");
        at_other.company = "Initech".to_string();

        let known = score(&at_known, &profile);
        let other = score(&at_other, &profile);
        assert!(known.score > other.score);
        assert_eq!(known.score, 100);
    }

    #[test]
    fn test_matched_roles_from_target_roles() {
        let mut profile = profile_with(&[("programming", category(&["python"], 1.0, false))]);
        profile.target_roles = vec!["test architect".to_string(), "qa lead".to_string()];
        let scored = score(
            &posting("Test Architect (Python)", "Leading test strategy."),
            &profile,
        );
        assert_eq!(scored.matched_roles, vec!["test architect"]);
    }

    #[test]
    fn test_work_location_classification() {
        let profile = profile_with(&[("programming", category(&["python"], 1.0, false))]);
        let remote = score(&posting("Engineer", "100% remote within the EU"), &profile);
        assert_eq!(remote.work_location_type, WorkLocationType::Remote);

        let hybrid = score(&posting("Engineer", "Hybrid: 2 days on site"), &profile);
        assert_eq!(hybrid.work_location_type, WorkLocationType::Hybrid);

        let onsite = score(&posting("Engineer", "On site in Munich"), &profile);
        assert_eq!(onsite.work_location_type, WorkLocationType::OnSite);
    }

    #[test]
    fn test_salary_hint_extraction() {
        assert_eq!(
            salary_hint("Gehalt: 85.000 € plus bonus"),
            Some("85.000 €".to_string())
        );
        assert_eq!(salary_hint("Stundensatz: 95 €/h remote"), Some("95 €/h".to_string()));
        assert_eq!(salary_hint("No compensation details."), None);
    }

    #[test]
    fn test_empty_profile_categories_score_zero() {
        let scored = score(&posting("Python Engineer", "python"), &Profile::default());
        assert_eq!(scored.score, 0);
    }
}
