//! Domain entities: cards, edges and their identifiers

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::{DomainError, DomainResult};

/// Identifier of a card in the external card store.
///
/// Always non-empty and trimmed. Numeric identifiers coming from edge records
/// are rendered to their decimal text so both spellings compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidCardId(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for CardId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for CardId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of card types. Only claims carry the "resulting" flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CardKind {
    /// A thesis or hypothesis. `resulting` marks a concluding claim.
    Claim { resulting: bool },
    Question,
    Source,
    Insight,
    Thought,
}

impl CardKind {
    /// Map a stored type tag onto a kind. The resulting flag is ignored for
    /// everything but claims.
    pub fn from_tag(tag: &str, resulting: bool) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "claim" => Some(Self::Claim { resulting }),
            "question" => Some(Self::Question),
            "source" => Some(Self::Source),
            "insight" => Some(Self::Insight),
            "thought" => Some(Self::Thought),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Claim { .. } => "claim",
            Self::Question => "question",
            Self::Source => "source",
            Self::Insight => "insight",
            Self::Thought => "thought",
        }
    }
}

/// Compass side at which a link enters its target card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Top,
    Bottom,
    Left,
    Right,
}

impl Handle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl FromStr for Handle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(DomainError::UnknownHandle(s.to_string())),
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of a card as seen by the hierarchy computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub id: CardId,
    pub x: Option<f64>,
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<CardKind>,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn new(id: CardId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            x: None,
            y: None,
            kind: None,
            created_at,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_kind(mut self, kind: CardKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// True when both coordinates are known.
    pub fn has_position(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    /// x coordinate, with a missing value read as 0.
    pub fn x_or_zero(&self) -> f64 {
        self.x.unwrap_or(0.0)
    }

    /// y coordinate, with a missing value read as 0.
    pub fn y_or_zero(&self) -> f64 {
        self.y.unwrap_or(0.0)
    }

    pub fn is_resulting_claim(&self) -> bool {
        matches!(self.kind, Some(CardKind::Claim { resulting: true }))
    }

    /// A claim that is not a resulting claim: an originating thesis.
    pub fn is_originating_claim(&self) -> bool {
        matches!(self.kind, Some(CardKind::Claim { resulting: false }))
    }

    pub fn is_question(&self) -> bool {
        matches!(self.kind, Some(CardKind::Question))
    }
}

/// Directed link between two cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source: CardId,
    pub target: CardId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<Handle>,
}

impl Edge {
    pub fn new(source: CardId, target: CardId) -> Self {
        Self {
            source,
            target,
            target_handle: None,
        }
    }

    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.target_handle = Some(handle);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_padded_id_when_parsing_then_trims() {
        let id = CardId::parse("  42 ").unwrap();
        assert_eq!(id.as_str(), "42");
        assert_eq!(id, CardId::from(42));
    }

    #[test]
    fn given_blank_id_when_parsing_then_errors() {
        assert_eq!(
            CardId::parse("   "),
            Err(DomainError::InvalidCardId("   ".to_string()))
        );
    }

    #[test]
    fn given_type_tags_when_mapping_then_resulting_flag_only_sticks_to_claims() {
        assert_eq!(
            CardKind::from_tag("Claim", true),
            Some(CardKind::Claim { resulting: true })
        );
        assert_eq!(CardKind::from_tag("question", true), Some(CardKind::Question));
        assert_eq!(CardKind::from_tag("diagram", false), None);
    }

    #[test]
    fn given_handle_labels_when_parsing_then_accepts_compass_sides_only() {
        assert_eq!("top".parse::<Handle>().unwrap(), Handle::Top);
        assert_eq!(" LEFT".parse::<Handle>().unwrap(), Handle::Left);
        assert!("center".parse::<Handle>().is_err());
    }

    #[test]
    fn given_card_with_one_coordinate_when_checking_position_then_false() {
        let mut card = Card::new(CardId::from(1), DateTime::<Utc>::UNIX_EPOCH);
        card.x = Some(10.0);
        assert!(!card.has_position());
        assert_eq!(card.y_or_zero(), 0.0);
    }
}
