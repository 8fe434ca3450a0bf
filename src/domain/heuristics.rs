//! Tunable constants of the best-guess heuristics

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Display levels at and beyond this value share one indentation.
pub const DEFAULT_MAX_DISPLAY_LEVEL: usize = 3;

/// Thresholds steering the validation gate, orientation analysis and display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Edges suffice when `edges >= cards / cards_per_edge`.
    pub cards_per_edge: f64,
    /// ...or when `edges / (n * (n - 1) / 2) >= min_edge_density`.
    pub min_edge_density: f64,
    /// Factor by which one axis' spread must dominate the other.
    pub orientation_ratio: f64,
    /// Cap applied to emitted display levels.
    pub max_display_level: usize,
    /// Traverse cycles that no root reaches instead of listing their cards flat.
    pub enter_rootless_cycles: bool,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            cards_per_edge: 3.0,
            min_edge_density: 0.20,
            orientation_ratio: 1.5,
            max_display_level: DEFAULT_MAX_DISPLAY_LEVEL,
            enter_rootless_cycles: true,
        }
    }
}

impl Heuristics {
    pub fn validate(&self) -> DomainResult<()> {
        positive("cards_per_edge", self.cards_per_edge)?;
        positive("min_edge_density", self.min_edge_density)?;
        positive("orientation_ratio", self.orientation_ratio)?;
        if self.orientation_ratio < 1.0 {
            return Err(DomainError::InvalidHeuristic {
                name: "orientation_ratio",
                message: format!("must be >= 1, got {}", self.orientation_ratio),
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> DomainResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DomainError::InvalidHeuristic {
            name,
            message: format!("must be a finite number > 0, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_validating_then_ok() {
        assert!(Heuristics::default().validate().is_ok());
    }

    #[test]
    fn given_ratio_below_one_when_validating_then_errors() {
        let h = Heuristics {
            orientation_ratio: 0.5,
            ..Heuristics::default()
        };
        assert!(matches!(
            h.validate(),
            Err(DomainError::InvalidHeuristic {
                name: "orientation_ratio",
                ..
            })
        ));
    }

    #[test]
    fn given_nan_density_when_validating_then_errors() {
        let h = Heuristics {
            min_edge_density: f64::NAN,
            ..Heuristics::default()
        };
        assert!(h.validate().is_err());
    }
}
