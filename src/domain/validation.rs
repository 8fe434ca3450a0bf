//! Validation gate: reject snapshots too degenerate to infer a hierarchy from

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::domain::heuristics::Heuristics;
use crate::domain::hierarchy::HierarchyNode;
use crate::domain::snapshot::Snapshot;

/// Why no hierarchy was inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoCards,
    InsufficientEdges,
    NoPositionData,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoCards => "no_cards",
            Self::InsufficientEdges => "insufficient_edges",
            Self::NoPositionData => "no_position_data",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// At least two cards, at least one edge, and either enough edges per card or
/// enough density relative to the undirected maximum.
pub fn has_sufficient_edges(card_count: usize, edge_count: usize, heuristics: &Heuristics) -> bool {
    if card_count < 2 || edge_count == 0 {
        return false;
    }
    let cards = card_count as f64;
    let edges = edge_count as f64;
    let max_possible = cards * (cards - 1.0) / 2.0;
    let density = edges / max_possible;

    edges >= cards / heuristics.cards_per_edge || density >= heuristics.min_edge_density
}

/// Run the checks in order; the first failing one wins.
pub fn check(snapshot: &Snapshot, heuristics: &Heuristics) -> Result<(), FallbackReason> {
    let cards = snapshot.cards();
    if cards.is_empty() {
        return Err(FallbackReason::NoCards);
    }
    if !has_sufficient_edges(cards.len(), snapshot.edges().len(), heuristics) {
        debug!(
            "gate: {} edges insufficient for {} cards",
            snapshot.edges().len(),
            cards.len()
        );
        return Err(FallbackReason::InsufficientEdges);
    }
    if !cards.iter().any(|c| c.has_position()) {
        debug!("gate: no card carries both coordinates");
        return Err(FallbackReason::NoPositionData);
    }
    Ok(())
}

/// Flat fallback: every card as a childless level-0 node, newest first.
pub fn time_ordered_fallback(snapshot: &Snapshot) -> Vec<HierarchyNode> {
    let mut cards: Vec<_> = snapshot.cards().iter().collect();
    cards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    cards
        .into_iter()
        .map(|c| HierarchyNode::leaf(c.clone(), 0, false))
        .collect()
}
