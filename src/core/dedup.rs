//! Cross-source deduplication and merge.
//!
//! Postings are grouped by a stable fingerprint over the complete collection,
//! so the canonical set never depends on the order in which sources finished.
//! The representative of each group is the copy with the richest description;
//! its score is recomputed once from that text instead of averaged, and its
//! source set is the union of every source that reported the listing.

use crate::core::scorer;
use crate::domain::model::{CanonicalPosting, Profile, RawPosting, ScoredPosting};
use std::collections::{btree_map::Entry, BTreeMap, BTreeSet};
use url::Url;

/// Query parameters that identify a click, not a posting.
const TRACKING_PARAMS: &[&str] = &[
    "ref", "refid", "trk", "trackingid", "fbclid", "gclid", "mc_cid", "mc_eid",
];

fn is_tracking_param(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.starts_with("utm_") || TRACKING_PARAMS.contains(&lower.as_str())
}

fn canonical_url(mut url: Url) -> String {
    url.set_fragment(None);
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| !is_tracking_param(name))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    url.set_query(None);
    if !kept.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &kept {
            pairs.append_pair(name, value);
        }
    }
    let mut normalized = url.to_string().to_lowercase();
    while normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// Stable key identifying the real-world listing behind a posting: the
/// normalized canonical URL when one exists, otherwise normalized
/// title|company|location.
pub fn fingerprint(posting: &RawPosting) -> String {
    let link = posting.link.trim();
    if !link.is_empty() {
        if let Ok(url) = Url::parse(link) {
            return canonical_url(url);
        }
    }
    format!(
        "{}|{}|{}",
        scorer::fold(&posting.title),
        scorer::fold(&posting.company),
        scorer::fold(&posting.location)
    )
}

/// Whether `candidate` should replace `current` as the group representative.
/// Longest non-empty description wins; ties break on link then source so the
/// choice is identical for every arrival order.
fn richer(candidate: &RawPosting, current: &RawPosting) -> bool {
    let by_len = candidate.description.len().cmp(&current.description.len());
    by_len
        .then_with(|| current.link.cmp(&candidate.link))
        .then_with(|| current.source.cmp(&candidate.source))
        .is_gt()
}

pub fn deduplicate(postings: Vec<ScoredPosting>, profile: &Profile) -> Vec<CanonicalPosting> {
    let mut groups: BTreeMap<String, (RawPosting, BTreeSet<String>)> = BTreeMap::new();

    for scored in postings {
        let key = fingerprint(&scored.posting);
        match groups.entry(key) {
            Entry::Vacant(slot) => {
                let mut sources = BTreeSet::new();
                sources.insert(scored.posting.source.clone());
                slot.insert((scored.posting, sources));
            }
            Entry::Occupied(mut slot) => {
                let (representative, sources) = slot.get_mut();
                sources.insert(scored.posting.source.clone());
                if richer(&scored.posting, representative) {
                    *representative = scored.posting;
                }
            }
        }
    }

    groups
        .into_iter()
        .map(|(fingerprint, (representative, sources))| CanonicalPosting {
            // Recomputed from the merged best-available text, not averaged.
            posting: scorer::score(&representative, profile),
            fingerprint,
            sources,
        })
        .collect()
}
