//! Root identification and resulting-claim promotion

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, trace};

use crate::domain::graph::{CardGraph, CardIx};

/// Roots of the forest plus the ancestry of promoted roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootSet {
    /// Root cards in card-list order.
    pub roots: Vec<CardIx>,
    /// Promoted root -> initial root it descends from. Ordering hint only.
    pub ancestry: BTreeMap<CardIx, CardIx>,
}

/// A card is an initial root when it has no incoming edge, or when it is an
/// originating (non-resulting) claim.
fn is_initial_root(graph: &CardGraph<'_>, ix: CardIx) -> bool {
    let card = graph.card(ix);
    let has_incoming = graph.has_incoming(ix);
    let originating_claim = card.is_originating_claim();
    let unlinked_resulting_claim = card.is_resulting_claim() && !has_incoming;
    let unlinked_question = card.is_question() && !has_incoming;

    !has_incoming || originating_claim || unlinked_resulting_claim || unlinked_question
}

/// Resulting claims with an incoming edge hand their children over as roots.
pub fn is_linked_resulting_claim(graph: &CardGraph<'_>, ix: CardIx) -> bool {
    graph.card(ix).is_resulting_claim() && graph.has_incoming(ix)
}

/// Classify roots and record promoted-root ancestry.
pub fn identify_roots(graph: &CardGraph<'_>) -> RootSet {
    let initial: Vec<bool> = (0..graph.len()).map(|ix| is_initial_root(graph, ix)).collect();

    let mut promoted: HashSet<CardIx> = HashSet::new();
    let mut ancestry = BTreeMap::new();
    for claim in (0..graph.len()).filter(|&ix| is_linked_resulting_claim(graph, ix)) {
        let children = graph.children(claim);
        if children.is_empty() {
            continue;
        }
        let origin = find_original_root(graph, claim, &initial);
        trace!(
            "resulting claim {} promotes {} children (origin: {:?})",
            graph.card(claim).id,
            children.len(),
            origin.map(|o| &graph.card(o).id)
        );
        for (child, _) in children {
            promoted.insert(child);
            if let Some(origin) = origin {
                ancestry.insert(child, origin);
            }
        }
    }

    let roots: Vec<CardIx> = (0..graph.len())
        .filter(|ix| initial[*ix] || promoted.contains(ix))
        .collect();
    debug!(
        "roots: {} of {} cards ({} promoted)",
        roots.len(),
        graph.len(),
        promoted.len()
    );

    RootSet { roots, ancestry }
}

/// Walk backward along incoming edges, depth first in edge order, until an
/// initial root is met.
fn find_original_root(graph: &CardGraph<'_>, start: CardIx, initial: &[bool]) -> Option<CardIx> {
    let mut visited = HashSet::from([start]);
    let mut stack: Vec<CardIx> = graph.parents(start).into_iter().rev().collect();
    while let Some(current) = stack.pop() {
        if initial[current] {
            return Some(current);
        }
        if !visited.insert(current) {
            continue;
        }
        stack.extend(graph.parents(current).into_iter().rev());
    }
    None
}
