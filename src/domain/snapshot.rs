//! Card/edge snapshots and their stored record form

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Card, CardId, CardKind, Edge, Handle};
use crate::domain::error::{DomainError, DomainResult};

/// Immutable input of one hierarchy computation.
///
/// Card ids are unique. Edges may point at cards outside the snapshot; such
/// dangling edges still count as edges but never yield children.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    cards: Vec<Card>,
    edges: Vec<Edge>,
}

impl Snapshot {
    pub fn new(cards: Vec<Card>, edges: Vec<Edge>) -> DomainResult<Self> {
        let mut seen = HashSet::with_capacity(cards.len());
        for card in &cards {
            if !seen.insert(&card.id) {
                return Err(DomainError::DuplicateCardId(card.id.clone()));
            }
        }
        Ok(Self { cards, edges })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Card reference as stored: edges historically carry integer ids while
/// cards carry strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CardRef {
    Integer(u64),
    Text(String),
}

impl CardRef {
    pub fn to_card_id(&self) -> DomainResult<CardId> {
        match self {
            Self::Integer(value) => Ok(CardId::from(*value)),
            Self::Text(text) => CardId::parse(text),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardRecord {
    pub id: CardRef,
    #[serde(default)]
    pub position_x: Option<f64>,
    #[serde(default)]
    pub position_y: Option<f64>,
    #[serde(default, rename = "type")]
    pub card_type: Option<String>,
    #[serde(default, rename = "isResultingClaim", alias = "is_resulting_claim")]
    pub is_resulting_claim: Option<bool>,
    #[serde(default)]
    pub time_created: Option<DateTime<Utc>>,
}

impl CardRecord {
    pub fn into_card(self) -> DomainResult<Card> {
        let id = self.id.to_card_id()?;
        let kind = match self.card_type.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(tag) => Some(
                CardKind::from_tag(tag, self.is_resulting_claim.unwrap_or(false)).ok_or_else(
                    || DomainError::UnknownCardKind {
                        id: id.to_string(),
                        kind: tag.to_string(),
                    },
                )?,
            ),
        };
        Ok(Card {
            id,
            x: self.position_x,
            y: self.position_y,
            kind,
            created_at: self.time_created.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeRecord {
    pub source_card_id: CardRef,
    pub target_card_id: CardRef,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl EdgeRecord {
    pub fn into_edge(self) -> DomainResult<Edge> {
        // a blank handle carries no direction information
        let target_handle = match self.target_handle.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(label) => Some(label.parse::<Handle>()?),
        };
        Ok(Edge {
            source: self.source_card_id.to_card_id()?,
            target: self.target_card_id.to_card_id()?,
            target_handle,
        })
    }
}

/// Top-level stored document: `{ "cards": [...], "edges": [...] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub cards: Vec<CardRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl TryFrom<SnapshotDocument> for Snapshot {
    type Error = DomainError;

    fn try_from(doc: SnapshotDocument) -> Result<Self, Self::Error> {
        let cards = doc
            .cards
            .into_iter()
            .map(CardRecord::into_card)
            .collect::<DomainResult<Vec<_>>>()?;
        let edges = doc
            .edges
            .into_iter()
            .map(EdgeRecord::into_edge)
            .collect::<DomainResult<Vec<_>>>()?;
        Snapshot::new(cards, edges)
    }
}
