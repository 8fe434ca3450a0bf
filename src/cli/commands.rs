//! Command implementations

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{snapshot_fingerprint, ApplicationError};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, OutputFormat, Settings};
use crate::domain::validation;
use crate::domain::{
    find, flatten_with, walk, CardId, ExpansionOverrides, HierarchyNode, HierarchyResult, Snapshot,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Execute the CLI command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Compute { snapshot, format }) => cmd_compute(snapshot.as_deref(), *format),
        Some(Commands::Outline {
            snapshot,
            expand,
            collapse,
            expand_all,
        }) => cmd_outline(snapshot.as_deref(), expand, collapse, *expand_all),
        Some(Commands::Check { snapshot }) => cmd_check(snapshot.as_deref()),
        Some(Commands::Fingerprint { snapshot }) => cmd_fingerprint(snapshot.as_deref()),
        Some(Commands::Config { command }) => cmd_config(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `cardtree --help`".to_string(),
        )),
    }
}

/// Settings, container and loaded snapshot for one command run.
struct Context {
    container: ServiceContainer,
    snapshot: Snapshot,
}

/// Resolve the snapshot path and load settings next to it.
///
/// An explicit path wins; otherwise the configured default is used.
fn load_context(snapshot: Option<&Path>) -> CliResult<Context> {
    let path = resolve_snapshot_path(snapshot)?;
    let settings = Settings::load(path.parent())?;
    let container = ServiceContainer::new(settings);
    let snapshot = container.snapshot_service().load(&path)?;
    Ok(Context {
        container,
        snapshot,
    })
}

fn resolve_snapshot_path(snapshot: Option<&Path>) -> CliResult<PathBuf> {
    if let Some(path) = snapshot {
        return Ok(path.to_path_buf());
    }
    let settings = Settings::load(None)?;
    settings.snapshot.ok_or_else(|| {
        CliError::Usage("no snapshot given and none configured (set `snapshot` in config)".into())
    })
}

#[instrument(level = "debug")]
fn cmd_compute(snapshot: Option<&Path>, format: Option<OutputFormat>) -> CliResult<()> {
    let ctx = load_context(snapshot)?;
    let mut service = ctx.container.hierarchy_service()?;
    let format = format.unwrap_or(ctx.container.settings.output);
    debug!("format: {:?}", format);
    let result = service.compute(&ctx.snapshot);

    match format {
        OutputFormat::Json => write_json(result),
        OutputFormat::Text => {
            print_summary(result);
            Ok(())
        }
    }
}

fn write_json(result: &HierarchyResult) -> CliResult<()> {
    let json =
        serde_json::to_string_pretty(result).map_err(|e| ApplicationError::OperationFailed {
            context: "serialize hierarchy".into(),
            source: Box::new(e),
        })?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}").map_err(|e| InfraError::io("write stdout", e))?;
    Ok(())
}

fn print_summary(result: &HierarchyResult) {
    if let Some(reason) = result.fallback_reason {
        output::warning(&format!("no hierarchy: {reason}"));
    }
    output::action("cards", &result.total_cards);
    output::action("edges", &result.edge_count);
    if let Some(profile) = &result.orientation {
        output::action("orientation", &profile.root_orientation.as_str());
    }

    output::header("Nodes");
    for node in walk(&result.nodes) {
        let marker = if node.children.is_empty() {
            " "
        } else if node.is_expanded {
            "-"
        } else {
            "+"
        };
        output::info(&format!("{}{} {}", "  ".repeat(node.level), marker, node.card.id));
    }

    if !result.cross_links.is_empty() {
        output::header("Cross-links");
        for link in &result.cross_links {
            let handle = link.target_handle.map(|h| h.as_str()).unwrap_or("-");
            output::detail(&format!(
                "{} -> {} ({}, handle {})",
                link.source.id,
                link.target.id,
                link.reason.as_str(),
                handle
            ));
        }
    }

    if !result.cycles.is_empty() {
        output::header("Cycles");
        for cycle in &result.cycles {
            output::detail(&format!(
                "{} via {}",
                cycle.node.id,
                cycle.path.iter().join(" -> ")
            ));
        }
    }
}

#[instrument(level = "debug")]
fn cmd_outline(
    snapshot: Option<&Path>,
    expand: &[String],
    collapse: &[String],
    expand_all: bool,
) -> CliResult<()> {
    let ctx = load_context(snapshot)?;
    let mut service = ctx.container.hierarchy_service()?;
    let max_level = service.heuristics().max_display_level;
    let result = service.compute(&ctx.snapshot);

    let mut overrides = ExpansionOverrides::new();
    if expand_all {
        overrides.expand_all(&result.nodes);
    }
    for raw in expand {
        overrides.expand(parse_known_id(&result.nodes, raw)?);
    }
    for raw in collapse {
        overrides.collapse(parse_known_id(&result.nodes, raw)?);
    }

    for row in flatten_with(&result.nodes, &overrides, max_level) {
        output::info(&format!("{}\t{}", row.display_level, row.node.card.id));
    }
    Ok(())
}

/// Parse a card id from the command line, warning when no node carries it.
fn parse_known_id(nodes: &[HierarchyNode], raw: &str) -> CliResult<CardId> {
    let id = CardId::parse(raw).map_err(|e| CliError::InvalidArgs(e.to_string()))?;
    if find(nodes, id.as_str()).is_none() {
        output::warning(&format!("no node with id {id}"));
    }
    Ok(id)
}

#[instrument(level = "debug")]
fn cmd_check(snapshot: Option<&Path>) -> CliResult<()> {
    let ctx = load_context(snapshot)?;
    let heuristics = ctx.container.settings.heuristics;
    let cards = ctx.snapshot.cards().len();
    let edges = ctx.snapshot.edges().len();
    match validation::check(&ctx.snapshot, &heuristics) {
        Ok(()) => output::success(&format!("hierarchy possible: {cards} cards, {edges} edges")),
        Err(reason) => output::failure(&format!(
            "fallback ({reason}): {cards} cards, {edges} edges"
        )),
    }
    Ok(())
}

#[instrument(level = "debug")]
fn cmd_fingerprint(snapshot: Option<&Path>) -> CliResult<()> {
    let ctx = load_context(snapshot)?;
    output::info(&snapshot_fingerprint(&ctx.snapshot));
    Ok(())
}

fn cmd_config(command: &ConfigCommands) -> CliResult<()> {
    let cwd = std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?;
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(&cwd))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => {
            output::info(&Settings::template());
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &describe_path(&path)),
                None => output::action("global", &"(no config directory)"),
            }
            output::action("local", &describe_path(&local_config_path(&cwd)));
        }
    }
    Ok(())
}

fn describe_path(path: &Path) -> String {
    let state = if path.exists() { "exists" } else { "missing" };
    format!("{} ({})", path.display(), state)
}

