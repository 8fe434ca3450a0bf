//! Integration tests for root identification and resulting-claim promotion.

use chrono::{DateTime, Utc};

use cardtree::domain::graph::CardGraph;
use cardtree::domain::roots::identify_roots;
use cardtree::domain::{Card, CardId, CardKind, Edge, Snapshot};

fn card(id: &str, kind: Option<CardKind>) -> Card {
    let mut c = Card::new(CardId::parse(id).unwrap(), DateTime::<Utc>::UNIX_EPOCH).at(0.0, 0.0);
    c.kind = kind;
    c
}

fn edge(s: &str, t: &str) -> Edge {
    Edge::new(CardId::parse(s).unwrap(), CardId::parse(t).unwrap())
}

fn root_ids(cards: Vec<Card>, edges: Vec<Edge>) -> Vec<String> {
    let snapshot = Snapshot::new(cards, edges).unwrap();
    let graph = CardGraph::new(&snapshot);
    identify_roots(&graph)
        .roots
        .iter()
        .map(|&ix| graph.card(ix).id.to_string())
        .collect()
}

#[test]
fn given_cards_without_incoming_edges_when_identifying_then_all_are_roots() {
    let roots = root_ids(
        vec![card("a", None), card("b", None), card("c", None)],
        vec![edge("a", "b")],
    );

    assert_eq!(roots, vec!["a", "c"]);
}

#[test]
fn given_linked_originating_claim_when_identifying_then_still_a_root() {
    let roots = root_ids(
        vec![
            card("s", Some(CardKind::Source)),
            card("claim", Some(CardKind::Claim { resulting: false })),
        ],
        vec![edge("s", "claim")],
    );

    assert_eq!(roots, vec!["s", "claim"]);
}

#[test]
fn given_linked_question_or_insight_when_identifying_then_not_roots() {
    let roots = root_ids(
        vec![
            card("s", None),
            card("q", Some(CardKind::Question)),
            card("i", Some(CardKind::Insight)),
        ],
        vec![edge("s", "q"), edge("s", "i")],
    );

    assert_eq!(roots, vec!["s"]);
}

#[test]
fn given_unlinked_resulting_claim_when_identifying_then_root() {
    let roots = root_ids(
        vec![
            card("r", Some(CardKind::Claim { resulting: true })),
            card("c", None),
        ],
        vec![edge("r", "c")],
    );

    assert_eq!(roots, vec!["r"]);
}

#[test]
fn given_linked_resulting_claim_when_identifying_then_children_promoted_with_ancestry() {
    // Arrange: o -> m -> r(resulting) -> {c1, c2}
    let snapshot = Snapshot::new(
        vec![
            card("o", Some(CardKind::Claim { resulting: false })),
            card("m", None),
            card("r", Some(CardKind::Claim { resulting: true })),
            card("c1", None),
            card("c2", None),
        ],
        vec![edge("o", "m"), edge("m", "r"), edge("r", "c1"), edge("r", "c2")],
    )
    .unwrap();
    let graph = CardGraph::new(&snapshot);

    // Act
    let roots = identify_roots(&graph);

    // Assert
    assert_eq!(roots.roots, vec![0, 3, 4]);
    assert_eq!(roots.ancestry.get(&3), Some(&0));
    assert_eq!(roots.ancestry.get(&4), Some(&0));
    assert!(!roots.roots.contains(&2));
}

#[test]
fn given_resulting_claim_without_children_when_identifying_then_promotes_nothing() {
    let roots = root_ids(
        vec![
            card("a", None),
            card("r", Some(CardKind::Claim { resulting: true })),
        ],
        vec![edge("a", "r")],
    );

    assert_eq!(roots, vec!["a"]);
}

#[test]
fn given_every_card_with_incoming_edge_when_identifying_then_no_roots() {
    let roots = root_ids(
        vec![card("a", None), card("b", None)],
        vec![edge("a", "b"), edge("b", "a")],
    );

    assert!(roots.is_empty());
}
