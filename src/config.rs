//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/cardtree/cardtree.toml`
//! 3. Local config: `<snapshot_dir>/.cardtree.toml`
//! 4. Environment variables: `CARDTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, Heuristics};

/// How commands print their results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Raw heuristics for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawHeuristics {
    pub cards_per_edge: Option<f64>,
    pub min_edge_density: Option<f64>,
    pub orientation_ratio: Option<f64>,
    pub max_display_level: Option<usize>,
    pub enter_rootless_cycles: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub output: Option<OutputFormat>,
    pub snapshot: Option<PathBuf>,
    #[serde(default)]
    pub heuristics: RawHeuristics,
}

/// Unified configuration for cardtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default output format
    pub output: OutputFormat,
    /// Snapshot used when a command is given none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
    /// Hierarchy heuristics
    pub heuristics: Heuristics,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output: OutputFormat::Text,
            snapshot: None,
            heuristics: Heuristics::default(),
        }
    }
}

/// Get the XDG config directory for cardtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cardtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("cardtree.toml"))
}

/// Get the path to the local config file next to a snapshot.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".cardtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn merge_heuristics(base: &Heuristics, overlay: &RawHeuristics) -> Heuristics {
    Heuristics {
        cards_per_edge: overlay.cards_per_edge.unwrap_or(base.cards_per_edge),
        min_edge_density: overlay.min_edge_density.unwrap_or(base.min_edge_density),
        orientation_ratio: overlay.orientation_ratio.unwrap_or(base.orientation_ratio),
        max_display_level: overlay.max_display_level.unwrap_or(base.max_display_level),
        enter_rootless_cycles: overlay
            .enter_rootless_cycles
            .unwrap_or(base.enter_rootless_cycles),
    }
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(snapshot) = &self.snapshot {
            let expanded = expand_env_vars(snapshot.to_string_lossy().as_ref());
            self.snapshot = Some(PathBuf::from(expanded));
        }
    }

    /// Merge overlay config onto self (base): overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            output: overlay.output.unwrap_or(self.output),
            snapshot: overlay.snapshot.clone().or_else(|| self.snapshot.clone()),
            heuristics: merge_heuristics(&self.heuristics, &overlay.heuristics),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.cardtree.toml`
    ///   (usually the snapshot's directory)
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/cardtree/cardtree.toml`
    /// 3. Local config: `<local_dir>/.cardtree.toml`
    /// 4. Environment variables: `CARDTREE_*` prefix
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current, Environment::with_prefix("CARDTREE"))?;

        current.expand_paths();
        current
            .heuristics
            .validate()
            .map_err(|e| ApplicationError::Config {
                message: e.to_string(),
            })?;

        Ok(current)
    }

    /// Apply CARDTREE_* environment variables as explicit overrides.
    ///
    /// Nested keys use `__`: `CARDTREE_HEURISTICS__MIN_EDGE_DENSITY=0.3`.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env.prefix_separator("_").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("output") {
            settings.output = match val.to_ascii_lowercase().as_str() {
                "text" => OutputFormat::Text,
                "json" => OutputFormat::Json,
                other => {
                    return Err(ApplicationError::Config {
                        message: format!("unknown output format: {other}"),
                    })
                }
            };
        }
        if let Ok(val) = config.get_string("snapshot") {
            settings.snapshot = Some(PathBuf::from(val));
        }
        let h = &mut settings.heuristics;
        if let Some(val) = get_opt(&config, "heuristics.cards_per_edge", Config::get_float)? {
            h.cards_per_edge = val;
        }
        if let Some(val) = get_opt(&config, "heuristics.min_edge_density", Config::get_float)? {
            h.min_edge_density = val;
        }
        if let Some(val) = get_opt(&config, "heuristics.orientation_ratio", Config::get_float)? {
            h.orientation_ratio = val;
        }
        if let Some(val) = get_opt(&config, "heuristics.max_display_level", Config::get_int)? {
            h.max_display_level = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("heuristics.max_display_level must be >= 0, got {val}"),
            })?;
        }
        if let Some(val) = get_opt(&config, "heuristics.enter_rootless_cycles", Config::get_bool)? {
            h.enter_rootless_cycles = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# cardtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/cardtree/cardtree.toml
#   Local:  <snapshot_dir>/.cardtree.toml
#   Env:    CARDTREE_* environment variables
#           (nested keys use "__": CARDTREE_HEURISTICS__MIN_EDGE_DENSITY=0.3)

# Output format for compute: "text" or "json"
# output = "text"

# Snapshot used when a command is given none
# snapshot = "~/boards/current.json"

[heuristics]
# Edges suffice when edges >= cards / cards_per_edge
# cards_per_edge = 3.0

# ...or when edges / (n * (n - 1) / 2) >= min_edge_density
# min_edge_density = 0.2

# Factor by which one axis' spread must dominate the other
# orientation_ratio = 1.5

# Display levels beyond this share one indentation
# max_display_level = 3

# Traverse cycles that no root reaches instead of listing their cards flat
# enter_rootless_cycles = true
"#
        .to_string()
    }
}

/// Read an optional key: missing keys are `None`, unparsable values are errors.
fn get_opt<T>(
    config: &Config,
    key: &str,
    get: fn(&Config, &str) -> Result<T, ConfigError>,
) -> Result<Option<T>, ApplicationError> {
    match get(config, key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("CARDTREE").source(Some(map))
    }

    #[test]
    fn given_no_overrides_when_applying_env_then_keeps_defaults() {
        let settings = Settings::apply_env_overrides(Settings::default(), env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn given_nested_env_vars_when_applying_then_overrides_heuristics() {
        let settings = Settings::apply_env_overrides(
            Settings::default(),
            env(&[
                ("CARDTREE_HEURISTICS__MIN_EDGE_DENSITY", "0.35"),
                ("CARDTREE_HEURISTICS__MAX_DISPLAY_LEVEL", "5"),
                ("CARDTREE_HEURISTICS__ENTER_ROOTLESS_CYCLES", "false"),
                ("CARDTREE_OUTPUT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.heuristics.min_edge_density, 0.35);
        assert_eq!(settings.heuristics.max_display_level, 5);
        assert!(!settings.heuristics.enter_rootless_cycles);
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.heuristics.cards_per_edge, 3.0);
    }

    #[test]
    fn given_garbage_number_when_applying_env_then_errors() {
        let result = Settings::apply_env_overrides(
            Settings::default(),
            env(&[("CARDTREE_HEURISTICS__ORIENTATION_RATIO", "wide")]),
        );
        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_overlay_when_merging_then_only_specified_fields_change() {
        let overlay = RawSettings {
            heuristics: RawHeuristics {
                cards_per_edge: Some(2.0),
                ..RawHeuristics::default()
            },
            ..RawSettings::default()
        };

        let merged = Settings::default().merge_with(&overlay);

        assert_eq!(merged.heuristics.cards_per_edge, 2.0);
        assert_eq!(merged.heuristics.min_edge_density, 0.20);
        assert_eq!(merged.output, OutputFormat::Text);
    }

    #[test]
    fn given_tilde_snapshot_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            snapshot: Some(PathBuf::from("~/boards/a.json")),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let snapshot = settings.snapshot.unwrap();
        assert!(snapshot.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.output.is_none());
        assert!(raw.heuristics.cards_per_edge.is_none());
    }
}
