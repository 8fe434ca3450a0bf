use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::graph::CardIx;

/// Forest node while the hierarchy is under construction.
#[derive(Debug)]
pub struct ForestNode {
    /// Card this node stands for
    pub card: CardIx,
    /// Distance from the owning root
    pub level: usize,
    /// Index of parent node in the arena, None for roots
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in display order
    pub children: Vec<Index>,
    /// Default expansion flag handed to the caller
    pub expanded: bool,
}

/// Arena-backed forest used by the worklist builder.
///
/// Nodes refer to each other by arena index, so the builder can hold a
/// stack of pending indices while still appending children to any node.
#[derive(Debug, Default)]
pub struct ForestArena {
    arena: Arena<ForestNode>,
    roots: Vec<Index>,
}

impl ForestArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_root(&mut self, card: CardIx, expanded: bool) -> Index {
        let idx = self.arena.insert(ForestNode {
            card,
            level: 0,
            parent: None,
            children: Vec::new(),
            expanded,
        });
        self.roots.push(idx);
        idx
    }

    /// Append a child below `parent`. Returns None if `parent` is not in the arena.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_child(&mut self, parent: Index, card: CardIx) -> Option<Index> {
        let level = self.arena.get(parent)?.level + 1;
        let idx = self.arena.insert(ForestNode {
            card,
            level,
            parent: Some(parent),
            children: Vec::new(),
            expanded: false,
        });
        if let Some(p) = self.arena.get_mut(parent) {
            p.children.push(idx);
        }
        Some(idx)
    }

    pub fn get_node(&self, idx: Index) -> Option<&ForestNode> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Cards from the owning root down to `idx`, root first.
    pub fn chain(&self, idx: Index) -> Vec<CardIx> {
        let mut chain = Vec::new();
        let mut current = Some(idx);
        while let Some(node) = current.and_then(|i| self.arena.get(i)) {
            chain.push(node.card);
            current = node.parent;
        }
        chain.reverse();
        chain
    }

    /// Post-order walk of the subtree at `root`.
    pub fn iter_postorder(&self, root: Index) -> PostOrderIterator<'_> {
        PostOrderIterator {
            arena: self,
            stack: vec![(root, false)],
        }
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a ForestArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a ForestNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
