// Merge discovery lists from TMDB and Trakt into one deduplicated list

use std::collections::HashSet;

use crate::models::MediaSummary;

/// Size of the lists served by /api/movies and /api/shows
pub const DEFAULT_LIMIT: usize = 50;

/// Merge `primary` and `secondary`, dropping repeats of a catalog id.
///
/// Primary entries come first (TMDB has the artwork), each source keeps its own
/// order and nothing is re-ranked. Entries without a catalog id cannot collide
/// with anything, so they are always kept.
pub fn merge(
    primary: Vec<MediaSummary>,
    secondary: Vec<MediaSummary>,
    limit: usize,
) -> Vec<MediaSummary> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(limit.min(primary.len() + secondary.len()));

    for item in primary.into_iter().chain(secondary) {
        if merged.len() >= limit {
            break;
        }
        let is_new = match item.catalog_id() {
            Some(id) => seen.insert(id),
            None => true,
        };
        if is_new {
            merged.push(item);
        }
    }

    merged
}
