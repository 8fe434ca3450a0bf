//! Structural fingerprints of card/edge snapshots
//!
//! Cheap memoization key: two snapshots with the same cards and edges in the
//! same order share a fingerprint.

use sha2::{Digest, Sha256};

use crate::domain::{Card, CardKind, Edge, Snapshot};

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 16;

/// Compute a 16-character hex fingerprint (first 64 bits of SHA-256).
///
/// Every field that can change the computed hierarchy goes into the hash;
/// strings are length-prefixed so adjacent fields cannot run together.
pub fn snapshot_fingerprint(snapshot: &Snapshot) -> String {
    let mut hasher = Sha256::new();
    hasher.update((snapshot.cards().len() as u64).to_le_bytes());
    for card in snapshot.cards() {
        hash_card(&mut hasher, card);
    }
    hasher.update((snapshot.edges().len() as u64).to_le_bytes());
    for edge in snapshot.edges() {
        hash_edge(&mut hasher, edge);
    }
    let result = hasher.finalize();
    hex::encode(&result[..FINGERPRINT_LEN / 2])
}

fn hash_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn hash_coord(hasher: &mut Sha256, value: Option<f64>) {
    match value {
        Some(v) => {
            hasher.update([1u8]);
            hasher.update(v.to_bits().to_le_bytes());
        }
        None => hasher.update([0u8]),
    }
}

fn hash_card(hasher: &mut Sha256, card: &Card) {
    hash_str(hasher, card.id.as_str());
    hash_coord(hasher, card.x);
    hash_coord(hasher, card.y);
    match card.kind {
        Some(kind) => {
            hash_str(hasher, kind.tag());
            let resulting = matches!(kind, CardKind::Claim { resulting: true });
            hasher.update([resulting as u8]);
        }
        None => hash_str(hasher, ""),
    }
    hasher.update(card.created_at.timestamp_micros().to_le_bytes());
}

fn hash_edge(hasher: &mut Sha256, edge: &Edge) {
    hash_str(hasher, edge.source.as_str());
    hash_str(hasher, edge.target.as_str());
    hash_str(hasher, edge.target_handle.map(|h| h.as_str()).unwrap_or(""));
}
