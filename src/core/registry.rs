//! Static source registry: an explicit id → implementation map built once at
//! startup. No dynamic discovery; the run config decides which registered
//! sources participate.

use crate::config::run_config::RunConfig;
use crate::domain::ports::Source;
use crate::utils::error::{Result, ScoutError};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A registered source selected for this run, with its per-source result cap.
#[derive(Clone)]
pub struct EnabledSource {
    pub source: Arc<dyn Source>,
    pub max_results: usize,
}

#[derive(Default)]
pub struct SourceRegistry {
    sources: BTreeMap<String, Arc<dyn Source>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, source: Arc<dyn Source>) {
        self.sources.insert(source.id().to_string(), source);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Source>> {
        self.sources.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The enabled sources for this run, in deterministic id order. An empty
    /// selection is fatal: there is nothing to search, so the run must not
    /// start.
    pub fn enabled(&self, config: &RunConfig) -> Result<Vec<EnabledSource>> {
        let mut selected = Vec::new();
        for (id, conf) in &config.sources {
            if !conf.enabled {
                continue;
            }
            match self.sources.get(id) {
                Some(source) => selected.push(EnabledSource {
                    source: source.clone(),
                    max_results: conf.max_results,
                }),
                None => {
                    tracing::warn!(source = id.as_str(), "enabled source is not registered, skipping");
                }
            }
        }
        if selected.is_empty() {
            return Err(ScoutError::EmptyRegistryError);
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RawPosting;
    use crate::utils::error::SourceResult;
    use async_trait::async_trait;

    struct NullSource {
        id: String,
    }

    #[async_trait]
    impl Source for NullSource {
        fn id(&self) -> &str {
            &self.id
        }

        fn display_name(&self) -> &str {
            &self.id
        }

        async fn search(
            &self,
            _query: &str,
            _location: Option<&str>,
            _limit: usize,
        ) -> SourceResult<Vec<RawPosting>> {
            Ok(Vec::new())
        }
    }

    fn config_with(entries: &[(&str, bool)]) -> RunConfig {
        let mut toml = String::from("[search]\nqueries = [\"q\"]\n");
        for (id, enabled) in entries {
            toml.push_str(&format!("[sources.{}]\nenabled = {}\n", id, enabled));
        }
        toml::from_str(&toml).unwrap()
    }

    #[test]
    fn test_enabled_respects_config_and_order() {
        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(NullSource { id: "beta".to_string() }));
        registry.register(Arc::new(NullSource { id: "alpha".to_string() }));

        let config = config_with(&[("alpha", true), ("beta", true), ("gamma", false)]);
        let enabled = registry.enabled(&config).unwrap();
        let ids: Vec<&str> = enabled.iter().map(|e| e.source.id()).collect();
        assert_eq!(ids, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_unregistered_enabled_source_is_skipped() {
        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(NullSource { id: "alpha".to_string() }));

        let config = config_with(&[("alpha", true), ("ghost", true)]);
        let enabled = registry.enabled(&config).unwrap();
        assert_eq!(enabled.len(), 1);
    }

    #[test]
    fn test_empty_selection_is_fatal() {
        let registry = SourceRegistry::new();
        let config = config_with(&[("alpha", true)]);
        assert!(matches!(
            registry.enabled(&config),
            Err(ScoutError::EmptyRegistryError)
        ));

        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(NullSource { id: "alpha".to_string() }));
        let config = config_with(&[("alpha", false)]);
        assert!(matches!(
            registry.enabled(&config),
            Err(ScoutError::EmptyRegistryError)
        ));
    }
}
