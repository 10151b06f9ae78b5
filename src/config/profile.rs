use crate::domain::model::Profile;
use crate::utils::error::{Result, ScoutError};
use crate::utils::validation::Validate;
use std::path::Path;

/// Loads a profile from JSON and normalizes it so the scorer can rely on the
/// skill-token invariants: lowercase, trimmed, unique within a category.
pub fn load_profile<P: AsRef<Path>>(path: P) -> Result<Profile> {
    let content = std::fs::read_to_string(path)?;
    let profile: Profile = serde_json::from_str(&content)?;
    Ok(normalize(profile))
}

pub fn normalize(mut profile: Profile) -> Profile {
    for category in profile.categories.values_mut() {
        let mut seen = std::collections::BTreeSet::new();
        category.skills = category
            .skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();
    }
    profile.target_locations = normalize_list(&profile.target_locations);
    profile.target_roles = normalize_list(&profile.target_roles);
    profile.known_companies = normalize_list(&profile.known_companies);
    profile
}

fn normalize_list(values: &[String]) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    values
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

impl Validate for Profile {
    fn validate(&self) -> Result<()> {
        let mut scorable = 0usize;
        for (name, category) in &self.categories {
            if !category.weight.is_finite() || category.weight < 0.0 {
                return Err(ScoutError::InvalidProfileError {
                    message: format!("category '{}' has invalid weight {}", name, category.weight),
                });
            }
            if !category.title_boost.is_finite() || category.title_boost < 1.0 {
                return Err(ScoutError::InvalidProfileError {
                    message: format!(
                        "category '{}' has invalid title_boost {} (must be >= 1)",
                        name, category.title_boost
                    ),
                });
            }
            if category.weight > 0.0 && !category.skills.is_empty() {
                scorable += 1;
            }
        }
        if scorable == 0 {
            return Err(ScoutError::InvalidProfileError {
                message: "no category with skills and a positive weight".to_string(),
            });
        }
        Ok(())
    }
}
