//! Integration tests for display flattening with expansion state.

use chrono::{DateTime, Utc};

use cardtree::domain::{
    compute_hierarchy, flatten_for_display, flatten_with, Card, CardId, DisplayNode, Edge,
    ExpansionOverrides, Heuristics, HierarchyNode, HierarchyResult, Snapshot, StoredExpansion,
    DEFAULT_MAX_DISPLAY_LEVEL,
};

/// Vertical chain 1 -> 2 -> ... -> n.
fn chain(n: u64) -> HierarchyResult {
    let cards = (1..=n)
        .map(|i| Card::new(CardId::from(i), DateTime::<Utc>::UNIX_EPOCH).at(0.0, i as f64 * 100.0))
        .collect();
    let edges = (1..n)
        .map(|i| Edge::new(CardId::from(i), CardId::from(i + 1)))
        .collect();
    let snapshot = Snapshot::new(cards, edges).unwrap();
    compute_hierarchy(&snapshot, &Heuristics::default())
}

fn rows(display: &[DisplayNode<'_>]) -> Vec<(usize, String)> {
    display
        .iter()
        .map(|d| (d.display_level, d.node.card.id.to_string()))
        .collect()
}

fn leaf(id: u64, level: usize) -> HierarchyNode {
    HierarchyNode::leaf(
        Card::new(CardId::from(id), DateTime::<Utc>::UNIX_EPOCH),
        level,
        false,
    )
}

#[test]
fn given_stored_flags_when_flattening_then_descends_only_into_expanded_roots() {
    // Arrange
    let result = chain(3);

    // Act
    let display = flatten_for_display(&result.nodes);

    // Assert
    assert_eq!(rows(&display), vec![(0, "1".into()), (1, "2".into())]);
}

#[test]
fn given_expand_all_when_flattening_deep_chain_then_caps_display_level() {
    // Arrange
    let result = chain(6);
    let mut overrides = ExpansionOverrides::new();
    overrides.expand_all(&result.nodes);

    // Act
    let display = flatten_with(&result.nodes, &overrides, DEFAULT_MAX_DISPLAY_LEVEL);

    // Assert
    let levels: Vec<usize> = display.iter().map(|d| d.display_level).collect();
    assert_eq!(levels, vec![0, 1, 2, 3, 3, 3]);
    assert_eq!(display[5].node.level, 5);
}

#[test]
fn given_toggled_root_when_flattening_then_children_hidden() {
    // Arrange
    let result = chain(3);
    let mut overrides = ExpansionOverrides::new();

    // Act
    overrides.toggle(&result.nodes[0]);
    let display = flatten_with(&result.nodes, &overrides, DEFAULT_MAX_DISPLAY_LEVEL);

    // Assert
    assert_eq!(rows(&display), vec![(0, "1".into())]);
}

#[test]
fn given_toggle_twice_when_flattening_then_back_to_stored_state() {
    let result = chain(3);
    let mut overrides = ExpansionOverrides::new();

    overrides.toggle(&result.nodes[0]);
    overrides.toggle(&result.nodes[0]);

    assert_eq!(
        rows(&flatten_with(&result.nodes, &overrides, 3)),
        rows(&flatten_for_display(&result.nodes))
    );
}

#[test]
fn given_explicit_expand_and_collapse_when_flattening_then_overrides_win() {
    // Arrange
    let result = chain(4);
    let mut overrides = ExpansionOverrides::new();
    overrides.expand(CardId::from(2));
    overrides.expand(CardId::from(3));

    // Act
    let opened = rows(&flatten_with(&result.nodes, &overrides, 3));
    overrides.collapse(CardId::from(3));
    let closed = rows(&flatten_with(&result.nodes, &overrides, 3));

    // Assert
    assert_eq!(opened.len(), 4);
    assert_eq!(closed.len(), 3);
}

#[test]
fn given_cleared_overrides_when_flattening_then_matches_stored_flags() {
    let result = chain(3);
    let mut overrides = ExpansionOverrides::new();
    overrides.expand_all(&result.nodes);
    assert!(!overrides.is_empty());

    overrides.clear();

    assert!(overrides.is_empty());
    assert_eq!(
        rows(&flatten_with(&result.nodes, &overrides, 3)),
        rows(&flatten_with(&result.nodes, &StoredExpansion, 3))
    );
}

#[test]
fn given_flat_fallback_nodes_when_flattening_then_all_rows_at_level_zero() {
    let nodes = vec![leaf(3, 0), leaf(2, 0), leaf(1, 0)];

    let display = flatten_for_display(&nodes);

    assert_eq!(
        rows(&display),
        vec![(0, "3".into()), (0, "2".into()), (0, "1".into())]
    );
}

#[test]
fn given_empty_forest_when_flattening_then_empty() {
    assert!(flatten_for_display(&[]).is_empty());
}
