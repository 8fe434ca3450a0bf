//! Memoized hierarchy computation
//!
//! Recomputing is O(cards x edges) in the worst case, so the service keeps the
//! last result keyed by the snapshot fingerprint.

use tracing::{debug, instrument};

use crate::application::hash::snapshot_fingerprint;
use crate::application::ApplicationResult;
use crate::domain::{compute_hierarchy, Heuristics, HierarchyResult, Snapshot};

/// Service computing best-guess hierarchies with a single-entry memo.
pub struct HierarchyService {
    heuristics: Heuristics,
    memo: Option<(String, HierarchyResult)>,
    hits: u64,
    misses: u64,
}

impl HierarchyService {
    /// Create a service; rejects invalid tunables up front.
    pub fn new(heuristics: Heuristics) -> ApplicationResult<Self> {
        heuristics.validate()?;
        Ok(Self {
            heuristics,
            memo: None,
            hits: 0,
            misses: 0,
        })
    }

    pub fn heuristics(&self) -> &Heuristics {
        &self.heuristics
    }

    /// Compute the hierarchy, reusing the previous result for an identical snapshot.
    #[instrument(level = "debug", skip_all)]
    pub fn compute(&mut self, snapshot: &Snapshot) -> &HierarchyResult {
        let fingerprint = snapshot_fingerprint(snapshot);
        let reuse = matches!(&self.memo, Some((key, _)) if *key == fingerprint);
        if reuse {
            self.hits += 1;
            debug!("memo hit {}", fingerprint);
        } else {
            self.misses += 1;
            debug!("memo miss {}", fingerprint);
            self.memo = None;
        }
        let heuristics = &self.heuristics;
        let (_, result) = self
            .memo
            .get_or_insert_with(|| (fingerprint, compute_hierarchy(snapshot, heuristics)));
        result
    }

    /// Drop the memoized result.
    pub fn invalidate(&mut self) {
        self.memo = None;
    }

    pub fn cache_hits(&self) -> u64 {
        self.hits
    }

    pub fn cache_misses(&self) -> u64 {
        self.misses
    }
}
