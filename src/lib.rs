//! cardtree: best-guess hierarchy inference for spatially positioned cards
//!
//! Layers, innermost first:
//! - `domain`: cards, edges, the inference pipeline and display flattening
//! - `application`: snapshot loading, fingerprinting and memoized computation
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: argument parsing, command dispatch and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::services::{HierarchyService, SnapshotService};
pub use config::Settings;
pub use domain::{compute_hierarchy, flatten_for_display, Heuristics, HierarchyResult, Snapshot};
