//! Spread/orientation analysis of card layouts

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::domain::entities::{Card, CardId, Handle};
use crate::domain::graph::CardGraph;
use crate::domain::roots::RootSet;

/// Dominant spatial axis of a group of cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
    Mixed,
}

impl Orientation {
    /// Target handles that mark a legitimate parent -> child link.
    pub fn valid_handles(&self) -> &'static [Handle] {
        match self {
            Self::Vertical => &[Handle::Top],
            Self::Horizontal => &[Handle::Left],
            Self::Mixed => &[Handle::Top, Handle::Left],
        }
    }

    pub fn accepts(&self, handle: Handle) -> bool {
        self.valid_handles().contains(&handle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Mixed => "mixed",
        }
    }
}

/// `max - min`, or 0 for fewer than two values.
pub fn spread(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    max - min
}

/// Classify the arrangement described by two coordinate lists.
pub fn classify(xs: &[f64], ys: &[f64], ratio: f64) -> Orientation {
    let x_spread = spread(xs);
    let y_spread = spread(ys);
    if x_spread > y_spread * ratio {
        Orientation::Horizontal
    } else if y_spread > x_spread * ratio {
        Orientation::Vertical
    } else {
        Orientation::Mixed
    }
}

/// Orientation of a group of cards; fewer than two cards are vertical.
pub fn classify_cards<'c>(cards: impl IntoIterator<Item = &'c Card>, ratio: f64) -> Orientation {
    let (xs, ys): (Vec<f64>, Vec<f64>) = cards
        .into_iter()
        .map(|c| (c.x_or_zero(), c.y_or_zero()))
        .unzip();
    if xs.len() < 2 {
        return Orientation::Vertical;
    }
    classify(&xs, &ys, ratio)
}

/// Children orientation recorded for one root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildrenOrientation {
    pub root_id: CardId,
    pub orientation: Orientation,
}

/// Everything the builder needs to know about layout and roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrientationProfile {
    pub root_orientation: Orientation,
    /// One entry per root that has at least one child, in root order.
    pub children_orientations: Vec<ChildrenOrientation>,
    pub roots: Vec<CardId>,
    /// Promoted root -> logical ancestor root.
    pub ancestry: BTreeMap<CardId, CardId>,
}

impl OrientationProfile {
    /// Children orientation of `id`; cards without an entry count as vertical.
    pub fn children_orientation(&self, id: &CardId) -> Orientation {
        self.children_orientations
            .iter()
            .find(|co| &co.root_id == id)
            .map(|co| co.orientation)
            .unwrap_or(Orientation::Vertical)
    }
}

/// Analyze root and per-root children orientation.
pub fn analyze(graph: &CardGraph<'_>, roots: &RootSet, ratio: f64) -> OrientationProfile {
    let root_orientation = classify_cards(roots.roots.iter().map(|&r| graph.card(r)), ratio);

    let children_orientations: Vec<ChildrenOrientation> = roots
        .roots
        .iter()
        .filter_map(|&root| {
            let children = graph.children(root);
            if children.is_empty() {
                return None;
            }
            Some(ChildrenOrientation {
                root_id: graph.card(root).id.clone(),
                orientation: classify_cards(children.iter().map(|&(c, _)| graph.card(c)), ratio),
            })
        })
        .collect();

    debug!(
        "orientation: roots={} root_orientation={} children_entries={}",
        roots.roots.len(),
        root_orientation.as_str(),
        children_orientations.len()
    );

    OrientationProfile {
        root_orientation,
        children_orientations,
        roots: roots.roots.iter().map(|&r| graph.card(r).id.clone()).collect(),
        ancestry: roots
            .ancestry
            .iter()
            .map(|(&child, &root)| (graph.card(child).id.clone(), graph.card(root).id.clone()))
            .collect(),
    }
}
