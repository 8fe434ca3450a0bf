//! Index over a snapshot: card positions and per-card edge lists

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::domain::entities::{Card, CardId, Handle};
use crate::domain::snapshot::Snapshot;

/// Position of a card in the snapshot's card list.
pub type CardIx = usize;

/// Read-only adjacency view of a [`Snapshot`].
///
/// Cards are addressed by their index in the card list, so every ordering
/// that falls back to "card order" is a plain integer comparison.
#[derive(Debug)]
pub struct CardGraph<'a> {
    snapshot: &'a Snapshot,
    by_id: HashMap<&'a CardId, CardIx>,
    /// Edge indices leaving each card, in edge-list order.
    outgoing: Vec<Vec<usize>>,
    /// Edge indices entering each card, in edge-list order. Sources may be dangling.
    incoming: Vec<Vec<usize>>,
}

impl<'a> CardGraph<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        let cards = snapshot.cards();
        let by_id: HashMap<&CardId, CardIx> =
            cards.iter().enumerate().map(|(ix, c)| (&c.id, ix)).collect();

        let mut outgoing = vec![Vec::new(); cards.len()];
        let mut incoming = vec![Vec::new(); cards.len()];
        for (edge_ix, edge) in snapshot.edges().iter().enumerate() {
            let source = by_id.get(&edge.source).copied();
            let target = by_id.get(&edge.target).copied();
            if source.is_none() || target.is_none() {
                debug!(
                    "dangling edge {} -> {} (source known: {}, target known: {})",
                    edge.source,
                    edge.target,
                    source.is_some(),
                    target.is_some()
                );
            }
            if let Some(s) = source {
                outgoing[s].push(edge_ix);
            }
            if let Some(t) = target {
                incoming[t].push(edge_ix);
            }
        }

        Self {
            snapshot,
            by_id,
            outgoing,
            incoming,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot.cards().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.cards().is_empty()
    }

    pub fn card(&self, ix: CardIx) -> &'a Card {
        &self.snapshot.cards()[ix]
    }

    pub fn cards(&self) -> &'a [Card] {
        self.snapshot.cards()
    }

    pub fn index_of(&self, id: &CardId) -> Option<CardIx> {
        self.by_id.get(id).copied()
    }

    pub fn has_incoming(&self, ix: CardIx) -> bool {
        !self.incoming[ix].is_empty()
    }

    /// Cards one outgoing edge away from `ix`, in card-list order, each paired
    /// with the handle of the first edge that reaches it.
    pub fn children(&self, ix: CardIx) -> Vec<(CardIx, Option<Handle>)> {
        let edges = self.snapshot.edges();
        let mut first_edge: BTreeMap<CardIx, Option<Handle>> = BTreeMap::new();
        for &edge_ix in &self.outgoing[ix] {
            let edge = &edges[edge_ix];
            if let Some(target) = self.index_of(&edge.target) {
                first_edge.entry(target).or_insert(edge.target_handle);
            }
        }
        first_edge.into_iter().collect()
    }

    /// Known cards with an edge into `ix`, in edge-list order (repeats kept).
    pub fn parents(&self, ix: CardIx) -> Vec<CardIx> {
        let edges = self.snapshot.edges();
        self.incoming[ix]
            .iter()
            .filter_map(|&e| self.index_of(&edges[e].source))
            .collect()
    }

    /// Whether `start` can reach itself along edges whose intermediate cards
    /// all satisfy `allowed`.
    pub fn lies_on_cycle(&self, start: CardIx, allowed: impl Fn(CardIx) -> bool) -> bool {
        let mut seen = vec![false; self.len()];
        let mut stack: Vec<CardIx> = self.children(start).into_iter().map(|(c, _)| c).collect();
        while let Some(current) = stack.pop() {
            if current == start {
                return true;
            }
            if seen[current] || !allowed(current) {
                continue;
            }
            seen[current] = true;
            stack.extend(self.children(current).into_iter().map(|(c, _)| c));
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Edge;
    use chrono::{DateTime, Utc};

    fn id(raw: &str) -> CardId {
        CardId::parse(raw).unwrap()
    }

    fn snapshot(ids: &[&str], edges: &[(&str, &str, Option<Handle>)]) -> Snapshot {
        let cards = ids
            .iter()
            .map(|i| Card::new(id(i), DateTime::<Utc>::UNIX_EPOCH))
            .collect();
        let edges = edges
            .iter()
            .map(|(s, t, h)| Edge {
                source: id(s),
                target: id(t),
                target_handle: *h,
            })
            .collect();
        Snapshot::new(cards, edges).unwrap()
    }

    #[test]
    fn given_repeated_edges_when_listing_children_then_first_handle_wins_in_card_order() {
        let snap = snapshot(
            &["a", "b", "c"],
            &[
                ("a", "c", Some(Handle::Right)),
                ("a", "b", None),
                ("a", "c", Some(Handle::Top)),
            ],
        );
        let graph = CardGraph::new(&snap);

        assert_eq!(
            graph.children(0),
            vec![(1, None), (2, Some(Handle::Right))]
        );
    }

    #[test]
    fn given_dangling_source_when_checking_incoming_then_counts() {
        let snap = snapshot(&["a"], &[("ghost", "a", None)]);
        let graph = CardGraph::new(&snap);

        assert!(graph.has_incoming(0));
        assert!(graph.parents(0).is_empty());
        assert!(graph.children(0).is_empty());
    }

    #[test]
    fn given_three_cycle_when_probing_then_every_member_lies_on_cycle() {
        let snap = snapshot(
            &["1", "2", "3", "4"],
            &[("1", "2", None), ("2", "3", None), ("3", "1", None), ("3", "4", None)],
        );
        let graph = CardGraph::new(&snap);

        assert!(graph.lies_on_cycle(0, |_| true));
        assert!(graph.lies_on_cycle(2, |_| true));
        assert!(!graph.lies_on_cycle(3, |_| true));
        assert!(!graph.lies_on_cycle(0, |c| c != 1));
    }
}
