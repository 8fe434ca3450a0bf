//! Domain layer: entities and hierarchy inference
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod flatten;
pub mod graph;
pub mod heuristics;
pub mod hierarchy;
pub mod orientation;
pub mod roots;
pub mod snapshot;
pub mod validation;

pub use entities::{Card, CardId, CardKind, Edge, Handle};
pub use error::{DomainError, DomainResult};
pub use flatten::{
    flatten_for_display, flatten_with, DisplayNode, ExpansionOverrides, ExpansionState,
    StoredExpansion,
};
pub use heuristics::{Heuristics, DEFAULT_MAX_DISPLAY_LEVEL};
pub use hierarchy::{
    compute_hierarchy, find, walk, CrossLink, CrossLinkReason, Cycle, CycleReason,
    HierarchyNode, HierarchyResult,
};
pub use orientation::{ChildrenOrientation, Orientation, OrientationProfile};
pub use snapshot::{Snapshot, SnapshotDocument};
pub use validation::FallbackReason;

/// Expand `~`, `$VAR` and `${VAR}` in a path-like string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
