use crate::domain::model::RawPosting;
use crate::utils::error::SourceResult;
use async_trait::async_trait;

/// Contract every job-posting provider implements. Implementations own their
/// session state (cookies, clients); the dispatcher only sees this interface.
///
/// `search` must report failures as `SourceError` values rather than panic:
/// the dispatcher records any failure as that source's outcome and keeps the
/// run going.
#[async_trait]
pub trait Source: Send + Sync {
    /// Stable identifier, also the key in the registry and the outcome map.
    fn id(&self) -> &str;

    fn display_name(&self) -> &str;

    /// Whether `search` applies the location argument itself. Sources that
    /// return false receive one unscoped task per query and their results
    /// are location-filtered in post-processing.
    fn supports_location_filter(&self) -> bool {
        true
    }

    async fn search(
        &self,
        query: &str,
        location: Option<&str>,
        limit: usize,
    ) -> SourceResult<Vec<RawPosting>>;

    /// Fetch the full description for a posting that only returned a summary.
    /// Sources whose `search` already returns full text keep the default;
    /// `Ok(None)` means "not supported", which is not an error.
    async fn fetch_full_description(
        &self,
        _posting: &RawPosting,
    ) -> SourceResult<Option<String>> {
        Ok(None)
    }
}
