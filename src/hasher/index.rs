use super::xxhash::{fingerprint, Fingerprint};
use crate::model::Reason;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Append-only fingerprint → first-seen filename map.
///
/// Insertion is an atomic insert-if-absent, so a shared index cannot
/// record two owners for one fingerprint.
#[derive(Debug, Default)]
pub struct FingerprintIndex {
    seen: DashMap<Fingerprint, String>,
}

impl FingerprintIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `filename` as the owner of `fp`, or return the existing owner.
    pub fn claim(&self, fp: Fingerprint, filename: &str) -> Result<(), String> {
        match self.seen.entry(fp) {
            Entry::Occupied(entry) => Err(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(filename.to_string());
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Rejects documents whose content prefix was already seen in this run.
#[derive(Debug)]
pub struct Deduplicator {
    prefix_chars: usize,
    index: FingerprintIndex,
}

impl Deduplicator {
    pub fn new(prefix_chars: usize) -> Self {
        Self {
            prefix_chars,
            index: FingerprintIndex::new(),
        }
    }

    pub fn check(&self, filename: &str, content: &str) -> Result<(), Reason> {
        let fp = fingerprint(content, self.prefix_chars);
        self.index.claim(fp, filename).map_err(Reason::DuplicateOf)
    }

    pub fn distinct(&self) -> usize {
        self.index.len()
    }
}
