// Library reconciliation - combine a manager's library with its download queue
//
// Queue records only know the manager's internal id of their parent item, while
// the frontend only knows external ids (TMDB, TVDB). Reconciling translates one
// into the other and puts every library item in exactly one bucket.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// An item in a manager's library (a Radarr movie, a Sonarr series)
pub trait ManagedItem {
    /// Internal id that queue records refer to
    fn internal_id(&self) -> i64;

    /// Whether the manager reports files on disk for this item
    fn has_files(&self) -> bool;
}

/// One active download, reduced to what progress needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueItem {
    pub parent_id: i64,
    pub size: f64,
    pub size_left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Downloaded,
    Downloading(u8),
    Missing,
}

/// Managers report an unset external id as 0
pub fn external_id(id: Option<i64>) -> Option<i64> {
    id.filter(|&id| id > 0)
}

/// Download progress in whole percent. An unknown total size counts as 0%.
pub fn progress_percent(size: f64, size_left: f64) -> u8 {
    if size <= 0.0 {
        return 0;
    }
    ((1.0 - size_left / size) * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Highest progress per library item. Queue entries whose parent is not in
/// the library listing are ignored.
pub fn progress_index<I: ManagedItem>(library: &[I], queue: &[QueueItem]) -> HashMap<i64, u8> {
    let known: HashSet<i64> = library.iter().map(ManagedItem::internal_id).collect();
    let mut index: HashMap<i64, u8> = HashMap::new();

    for entry in queue.iter().filter(|q| known.contains(&q.parent_id)) {
        let progress = progress_percent(entry.size, entry.size_left);
        index
            .entry(entry.parent_id)
            .and_modify(|current| *current = (*current).max(progress))
            .or_insert(progress);
    }

    index
}

/// Downloading wins over downloaded, which wins over missing
pub fn classify<I: ManagedItem>(item: &I, progress: &HashMap<i64, u8>) -> Presence {
    if let Some(&p) = progress.get(&item.internal_id()) {
        Presence::Downloading(p)
    } else if item.has_files() {
        Presence::Downloaded
    } else {
        Presence::Missing
    }
}

/// Classify every library item against the queue
pub fn reconcile<'a, I: ManagedItem>(
    library: &'a [I],
    queue: &[QueueItem],
) -> Vec<(&'a I, Presence)> {
    let progress = progress_index(library, queue);
    library
        .iter()
        .map(|item| (item, classify(item, &progress)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadProgress {
    pub progress: u8,
    pub url: Option<String>,
}

/// Presence buckets for one external id scheme
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PresenceMap {
    pub downloaded: BTreeMap<i64, Location>,
    pub downloading: BTreeMap<i64, DownloadProgress>,
    pub missing: BTreeMap<i64, Location>,
}

impl PresenceMap {
    pub fn insert(&mut self, id: i64, presence: Presence, url: Option<String>) {
        match presence {
            Presence::Downloading(progress) => {
                self.downloading
                    .insert(id, DownloadProgress { progress, url });
            }
            Presence::Downloaded => {
                self.downloaded.insert(id, Location { url });
            }
            Presence::Missing => {
                self.missing.insert(id, Location { url });
            }
        }
    }
}

#[cfg(test)]
impl PresenceMap {
    pub fn presence_of(&self, id: i64) -> Option<Presence> {
        if let Some(d) = self.downloading.get(&id) {
            Some(Presence::Downloading(d.progress))
        } else if self.downloaded.contains_key(&id) {
            Some(Presence::Downloaded)
        } else if self.missing.contains_key(&id) {
            Some(Presence::Missing)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.downloaded.len() + self.downloading.len() + self.missing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
