//! Best-guess hierarchy: result types and the top-level computation

use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::builder::HierarchyBuilder;
use crate::domain::entities::{Card, CardId, Handle};
use crate::domain::graph::CardGraph;
use crate::domain::heuristics::Heuristics;
use crate::domain::orientation::{self, Orientation, OrientationProfile};
use crate::domain::roots;
use crate::domain::snapshot::Snapshot;
use crate::domain::validation::{self, FallbackReason};

/// A card placed in the inferred forest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    pub card: Card,
    /// Path length from the owning root.
    pub level: usize,
    /// Default expansion state; callers keep their own toggles.
    pub is_expanded: bool,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn leaf(card: Card, level: usize, is_expanded: bool) -> Self {
        Self {
            card,
            level,
            is_expanded,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &CardId {
        &self.card.id
    }

    /// First child with the given id.
    pub fn child(&self, id: &str) -> Option<&HierarchyNode> {
        self.children.iter().find(|c| c.card.id.as_str() == id)
    }
}

/// Pre-order walk over every node of a forest, ignoring expansion state.
pub fn walk(nodes: &[HierarchyNode]) -> impl Iterator<Item = &HierarchyNode> {
    let mut stack: Vec<&HierarchyNode> = nodes.iter().rev().collect();
    std::iter::from_fn(move || {
        let node = stack.pop()?;
        stack.extend(node.children.iter().rev());
        Some(node)
    })
}

/// Find a node anywhere in the forest.
pub fn find<'n>(nodes: &'n [HierarchyNode], id: &str) -> Option<&'n HierarchyNode> {
    walk(nodes).find(|n| n.card.id.as_str() == id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossLinkReason {
    /// The target already belongs to another subtree.
    AlreadyAssigned,
    /// The link enters the target from a side that does not fit the orientation.
    CrossLink,
}

impl CrossLinkReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyAssigned => "already-assigned",
            Self::CrossLink => "cross-link",
        }
    }
}

/// An edge that does not fit the inferred tree shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossLink {
    pub source: Card,
    pub target: Card,
    pub reason: CrossLinkReason,
    pub target_handle: Option<Handle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CycleReason {
    CycleDetected,
}

impl CycleReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CycleDetected => "cycle-detected",
        }
    }
}

/// A repeated visit inside one root's descent chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    pub node: Card,
    pub reason: CycleReason,
    /// Descent chain at detection time, root first.
    pub path: Vec<CardId>,
}

/// Outcome of one hierarchy computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyResult {
    pub has_hierarchy: bool,
    pub nodes: Vec<HierarchyNode>,
    pub total_cards: usize,
    pub edge_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<OrientationProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    pub cross_links: Vec<CrossLink>,
    pub cycles: Vec<Cycle>,
}

impl HierarchyResult {
    fn fallback(snapshot: &Snapshot, reason: FallbackReason) -> Self {
        let nodes = match reason {
            FallbackReason::NoCards => Vec::new(),
            _ => validation::time_ordered_fallback(snapshot),
        };
        Self {
            has_hierarchy: false,
            nodes,
            total_cards: snapshot.cards().len(),
            edge_count: snapshot.edges().len(),
            orientation: None,
            fallback_reason: Some(reason),
            cross_links: Vec::new(),
            cycles: Vec::new(),
        }
    }
}

/// Infer a forest from a card/edge snapshot.
///
/// Never fails on graph shape: sparse input, missing positions, cycles and
/// conflicting links all come back as data on the result.
#[instrument(level = "debug", skip_all, fields(cards = snapshot.cards().len(), edges = snapshot.edges().len()))]
pub fn compute_hierarchy(snapshot: &Snapshot, heuristics: &Heuristics) -> HierarchyResult {
    if let Err(reason) = validation::check(snapshot, heuristics) {
        debug!("fallback: {}", reason);
        return HierarchyResult::fallback(snapshot, reason);
    }

    let graph = CardGraph::new(snapshot);
    let root_set = roots::identify_roots(&graph);
    let profile = orientation::analyze(&graph, &root_set, heuristics.orientation_ratio);
    let output = HierarchyBuilder::new(&graph, &profile, *heuristics).build(&root_set);
    debug!(
        "built {} top-level nodes, {} cross-links, {} cycles",
        output.nodes.len(),
        output.cross_links.len(),
        output.cycles.len()
    );

    HierarchyResult {
        has_hierarchy: true,
        nodes: output.nodes,
        total_cards: snapshot.cards().len(),
        edge_count: snapshot.edges().len(),
        orientation: Some(profile),
        fallback_reason: None,
        cross_links: output.cross_links,
        cycles: output.cycles,
    }
}
