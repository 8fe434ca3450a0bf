//! Expansion-aware linearization of a forest for display

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::entities::CardId;
use crate::domain::heuristics::DEFAULT_MAX_DISPLAY_LEVEL;
use crate::domain::hierarchy::{walk, HierarchyNode};

/// Source of truth for which nodes are open.
pub trait ExpansionState {
    fn is_expanded(&self, node: &HierarchyNode) -> bool;
}

/// Uses the flag stored on each node.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredExpansion;

impl ExpansionState for StoredExpansion {
    fn is_expanded(&self, node: &HierarchyNode) -> bool {
        node.is_expanded
    }
}

/// Caller-owned per-card overrides on top of the stored flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionOverrides {
    overrides: HashMap<CardId, bool>,
}

impl ExpansionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expand(&mut self, id: CardId) {
        self.overrides.insert(id, true);
    }

    pub fn collapse(&mut self, id: CardId) {
        self.overrides.insert(id, false);
    }

    /// Flip the effective state of `node`.
    pub fn toggle(&mut self, node: &HierarchyNode) {
        let next = !self.is_expanded(node);
        self.overrides.insert(node.card.id.clone(), next);
    }

    /// Open every node that has children.
    pub fn expand_all(&mut self, nodes: &[HierarchyNode]) {
        for node in walk(nodes).filter(|n| !n.children.is_empty()) {
            self.overrides.insert(node.card.id.clone(), true);
        }
    }

    pub fn clear(&mut self) {
        self.overrides.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

impl ExpansionState for ExpansionOverrides {
    fn is_expanded(&self, node: &HierarchyNode) -> bool {
        self.overrides
            .get(&node.card.id)
            .copied()
            .unwrap_or(node.is_expanded)
    }
}

/// One row of the flattened list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayNode<'a> {
    pub node: &'a HierarchyNode,
    /// Stored level capped for indentation.
    pub display_level: usize,
}

/// Flatten using the stored expansion flags and the default level cap.
pub fn flatten_for_display(nodes: &[HierarchyNode]) -> Vec<DisplayNode<'_>> {
    flatten_with(nodes, &StoredExpansion, DEFAULT_MAX_DISPLAY_LEVEL)
}

/// Depth-first: emit each node, descend only into expanded ones.
pub fn flatten_with<'a>(
    nodes: &'a [HierarchyNode],
    expansion: &impl ExpansionState,
    max_level: usize,
) -> Vec<DisplayNode<'a>> {
    let mut rows = Vec::new();
    let mut stack: Vec<&HierarchyNode> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        rows.push(DisplayNode {
            node,
            display_level: node.level.min(max_level),
        });
        if expansion.is_expanded(node) {
            stack.extend(node.children.iter().rev());
        }
    }
    rows
}
