//! Hierarchy builder: walks roots and assigns children with duplicate and
//! cycle guards.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use tracing::{debug, trace};

use crate::domain::arena::ForestArena;
use crate::domain::graph::{CardGraph, CardIx};
use crate::domain::heuristics::Heuristics;
use crate::domain::hierarchy::{CrossLink, CrossLinkReason, Cycle, CycleReason, HierarchyNode};
use crate::domain::orientation::{Orientation, OrientationProfile};
use crate::domain::roots::{is_linked_resulting_claim, RootSet};

/// Forest plus diagnostic side-lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutput {
    pub nodes: Vec<HierarchyNode>,
    pub cross_links: Vec<CrossLink>,
    pub cycles: Vec<Cycle>,
}

/// Constructs the forest for one snapshot.
///
/// `processed` is the forest-wide ownership set; a card enters it when some
/// node claims it and never leaves. Cycle detection uses the descent chain of
/// the node being expanded, read off the arena's parent links.
pub struct HierarchyBuilder<'g, 'a> {
    graph: &'g CardGraph<'a>,
    profile: &'g OrientationProfile,
    heuristics: Heuristics,
    forest: ForestArena,
    processed: Vec<bool>,
    cross_links: Vec<CrossLink>,
    cycles: Vec<Cycle>,
}

impl<'g, 'a> HierarchyBuilder<'g, 'a> {
    pub fn new(graph: &'g CardGraph<'a>, profile: &'g OrientationProfile, heuristics: Heuristics) -> Self {
        Self {
            graph,
            profile,
            heuristics,
            forest: ForestArena::new(),
            processed: vec![false; graph.len()],
            cross_links: Vec::new(),
            cycles: Vec::new(),
        }
    }

    pub fn build(mut self, roots: &RootSet) -> BuildOutput {
        // every root owns itself before any traversal starts
        for &root in &roots.roots {
            self.processed[root] = true;
        }

        for root in order_roots(self.graph, roots, self.profile.root_orientation) {
            self.traverse(root);
        }

        self.place_unclaimed();
        self.into_output()
    }

    /// Cards no root reached: enter every rootless cycle first, then list
    /// what is still unclaimed flat. Both passes run in card order.
    fn place_unclaimed(&mut self) {
        let graph = self.graph;
        if self.heuristics.enter_rootless_cycles {
            for ix in 0..graph.len() {
                if self.processed[ix] {
                    continue;
                }
                let processed = &self.processed;
                if graph.lies_on_cycle(ix, |c| !processed[c]) {
                    debug!("entering rootless cycle at {}", graph.card(ix).id);
                    self.processed[ix] = true;
                    self.traverse(ix);
                }
            }
        }

        for ix in 0..graph.len() {
            if !self.processed[ix] {
                self.processed[ix] = true;
                self.forest.insert_root(ix, false);
            }
        }
    }

    /// Pre-order walk below `root` with an explicit stack.
    fn traverse(&mut self, root: CardIx) {
        let start = self.forest.insert_root(root, true);
        let mut pending = vec![start];
        while let Some(current) = pending.pop() {
            let accepted = self.expand(current);
            pending.extend(accepted.into_iter().rev());
        }
    }

    /// Classify the candidate children of one node and attach the accepted ones.
    fn expand(&mut self, idx: Index) -> Vec<Index> {
        let graph = self.graph;
        let Some(node) = self.forest.get_node(idx) else {
            return Vec::new();
        };
        let card_ix = node.card;
        let chain = self.forest.chain(idx);
        let ancestors = &chain[..chain.len().saturating_sub(1)];

        if ancestors.contains(&card_ix) {
            self.record_cycle(card_ix, ancestors);
            return Vec::new();
        }
        self.processed[card_ix] = true;

        // its children were promoted to roots
        if is_linked_resulting_claim(graph, card_ix) {
            return Vec::new();
        }

        let parent = graph.card(card_ix);
        let orientation = self.profile.children_orientation(&parent.id);
        let mut accepted = Vec::new();
        for (child, handle) in graph.children(card_ix) {
            if chain.contains(&child) {
                self.record_cycle(child, &chain);
                continue;
            }
            if self.processed[child] {
                trace!("{} -> {}: already assigned", parent.id, graph.card(child).id);
                self.cross_links.push(CrossLink {
                    source: parent.clone(),
                    target: graph.card(child).clone(),
                    reason: CrossLinkReason::AlreadyAssigned,
                    target_handle: handle,
                    orientation: None,
                });
                continue;
            }
            if let Some(h) = handle.filter(|h| !orientation.accepts(*h)) {
                trace!(
                    "{} -> {}: handle {} off-axis for {}",
                    parent.id,
                    graph.card(child).id,
                    h,
                    orientation.as_str()
                );
                self.cross_links.push(CrossLink {
                    source: parent.clone(),
                    target: graph.card(child).clone(),
                    reason: CrossLinkReason::CrossLink,
                    target_handle: Some(h),
                    orientation: Some(orientation),
                });
                continue;
            }
            self.processed[child] = true;
            accepted.push(child);
        }

        sort_cards(graph, &mut accepted, orientation);
        accepted
            .into_iter()
            .filter_map(|child| self.forest.insert_child(idx, child))
            .collect()
    }

    fn record_cycle(&mut self, card: CardIx, path: &[CardIx]) {
        let graph = self.graph;
        trace!("cycle at {}", graph.card(card).id);
        self.cycles.push(Cycle {
            node: graph.card(card).clone(),
            reason: CycleReason::CycleDetected,
            path: path.iter().map(|&c| graph.card(c).id.clone()).collect(),
        });
    }

    fn into_output(self) -> BuildOutput {
        let graph = self.graph;
        let forest = &self.forest;
        let nodes = forest
            .roots()
            .iter()
            .filter_map(|&root| {
                let mut finished: HashMap<Index, HierarchyNode> = HashMap::new();
                for (idx, node) in forest.iter_postorder(root) {
                    let children = node
                        .children
                        .iter()
                        .filter_map(|c| finished.remove(c))
                        .collect();
                    finished.insert(
                        idx,
                        HierarchyNode {
                            card: graph.card(node.card).clone(),
                            level: node.level,
                            is_expanded: node.expanded,
                            children,
                        },
                    );
                }
                finished.remove(&root)
            })
            .collect();

        BuildOutput {
            nodes,
            cross_links: self.cross_links,
            cycles: self.cycles,
        }
    }
}

fn compare_cards(graph: &CardGraph<'_>, a: CardIx, b: CardIx, orientation: Orientation) -> Ordering {
    let (a, b) = (graph.card(a), graph.card(b));
    match orientation {
        Orientation::Horizontal => a.x_or_zero().partial_cmp(&b.x_or_zero()),
        Orientation::Vertical => a.y_or_zero().partial_cmp(&b.y_or_zero()),
        Orientation::Mixed => Some(a.created_at.cmp(&b.created_at)),
    }
    .unwrap_or(Ordering::Equal)
}

/// Stable sort by x (horizontal), y (vertical) or creation time (mixed).
pub fn sort_cards(graph: &CardGraph<'_>, cards: &mut [CardIx], orientation: Orientation) {
    cards.sort_by(|&a, &b| compare_cards(graph, a, b, orientation));
}

/// Sort roots along the root orientation, then place every promoted root
/// right after its logical ancestor unless it already came earlier.
pub fn order_roots(graph: &CardGraph<'_>, roots: &RootSet, orientation: Orientation) -> Vec<CardIx> {
    let mut sorted = roots.roots.clone();
    sort_cards(graph, &mut sorted, orientation);

    let mut placed = HashSet::with_capacity(sorted.len());
    let mut ordered = Vec::with_capacity(sorted.len());
    for &root in &sorted {
        if !placed.insert(root) {
            continue;
        }
        ordered.push(root);
        for &promoted in sorted
            .iter()
            .filter(|&&c| roots.ancestry.get(&c) == Some(&root))
        {
            if placed.insert(promoted) {
                ordered.push(promoted);
            }
        }
    }
    ordered
}
