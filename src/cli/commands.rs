//! Command dispatch

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{Species, TreeNodeConvert};
use crate::infrastructure::di::ServiceContainer;

/// Load settings, wire the services and run the command against stdout.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };
    let mut stdout = io::stdout().lock();
    if let Commands::Completion { shell } = command {
        print_completions(*shell, &mut stdout);
        return Ok(());
    }

    let container = create_container(cli)?;
    run_command(&container, command, &mut stdout)
}

/// Run `command` with the given services, writing results to `out`.
pub fn run_command<W: Write>(container: &ServiceContainer, command: &Commands, out: &mut W) -> CliResult<()> {
    match command {
        Commands::Tree { file, depth } => cmd_tree(container, file, *depth, out),
        Commands::Newick { file, precision } => cmd_newick(container, file, *precision, out),
        Commands::Show { file } => cmd_show(container, file, out),
        Commands::Info { file } => cmd_info(container, file, out),
        Commands::Species { file } => cmd_species(container, file, out),
        Commands::Find { file, label } => cmd_find(container, file, label, out),
        Commands::Lca {
            file,
            label_a,
            label_b,
        } => cmd_lca(container, file, label_a, label_b, out),
        Commands::Distance {
            file,
            label_a,
            label_b,
        } => cmd_distance(container, file, label_a, label_b, out),
        Commands::Config => cmd_config(container, out),
        Commands::Completion { shell } => {
            print_completions(*shell, out);
            Ok(())
        }
    }
}

/// Command line flags layered over loaded settings.
pub fn apply_cli_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(metric) = cli.metric {
        settings.metric = metric;
    }
    settings
}

fn create_container(cli: &Cli) -> CliResult<ServiceContainer> {
    let config_path = cli.config.as_deref().map(expand_path);
    let settings = apply_cli_overrides(Settings::load(config_path.as_deref())?, cli);
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings))
}

/// Expand `~` and `$VAR` in a user supplied path.
fn expand_path(path: &Path) -> PathBuf {
    shellexpand::full(&path.to_string_lossy())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn load_species(container: &ServiceContainer, file: &Path) -> CliResult<Vec<Species>> {
    let path = expand_path(file);
    if !container.fs.is_file(&path) {
        return Err(CliError::InvalidArgs(format!(
            "species file does not exist: {}",
            path.display()
        )));
    }
    Ok(container.phylogeny.load_species(&path)?)
}

fn print_completions<W: Write>(shell: Shell, out: &mut W) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}

#[instrument(level = "debug", skip(container, out))]
fn cmd_tree<W: Write>(container: &ServiceContainer, file: &Path, depth: Option<usize>, out: &mut W) -> CliResult<()> {
    let depth = depth.unwrap_or(container.settings.printing_depth);
    if depth == 0 {
        return Err(CliError::InvalidArgs("printing depth must be positive".into()));
    }
    let species = load_species(container, file)?;
    let tree = container.phylogeny.build_tree(&species)?;
    output::info(out, tree.to_indented_string(depth).trim_end())?;
    Ok(())
}

#[instrument(level = "debug", skip(container, out))]
fn cmd_newick<W: Write>(
    container: &ServiceContainer,
    file: &Path,
    precision: Option<usize>,
    out: &mut W,
) -> CliResult<()> {
    let precision = precision.unwrap_or(container.settings.precision);
    let species = load_species(container, file)?;
    let tree = container.phylogeny.build_tree(&species)?;
    output::info(out, &tree.to_newick(precision))?;
    Ok(())
}

#[instrument(level = "debug", skip(container, out))]
fn cmd_show<W: Write>(container: &ServiceContainer, file: &Path, out: &mut W) -> CliResult<()> {
    let species = load_species(container, file)?;
    let tree = container.phylogeny.build_tree(&species)?;
    write!(out, "{}", tree.to_tree_string())?;
    Ok(())
}

#[instrument(level = "debug", skip(container, out))]
fn cmd_info<W: Write>(container: &ServiceContainer, file: &Path, out: &mut W) -> CliResult<()> {
    let species = load_species(container, file)?;
    let tree = container.phylogeny.build_tree(&species)?;
    let summary = container.phylogeny.summary(&tree);
    output::header(out, &file.display())?;
    output::field(out, "species", &summary.species_count)?;
    output::field(out, "nodes", &summary.node_count)?;
    output::field(out, "root", &summary.root_label)?;
    output::field(out, "height", &summary.height)?;
    output::field(out, "weighted height", &summary.weighted_height)?;
    Ok(())
}

#[instrument(level = "debug", skip(container, out))]
fn cmd_species<W: Write>(container: &ServiceContainer, file: &Path, out: &mut W) -> CliResult<()> {
    let species = load_species(container, file)?;
    if species.is_empty() {
        output::warning(&format!("no species in {}", file.display()));
    }
    output::header(out, &format!("{} species", species.len()))?;
    for s in &species {
        output::detail(out, &format!("{} ({} symbols)", s.name, s.sequence.len()))?;
    }
    Ok(())
}

#[instrument(level = "debug", skip(container, out))]
fn cmd_find<W: Write>(container: &ServiceContainer, file: &Path, label: &str, out: &mut W) -> CliResult<()> {
    let species = load_species(container, file)?;
    let tree = container.phylogeny.build_tree(&species)?;
    let report = container.phylogeny.describe(&tree, label)?;
    output::header(out, &report.label)?;
    output::field(out, "kind", if report.is_leaf { "leaf" } else { "internal" })?;
    output::field(out, "leaves", &report.leaf_count)?;
    output::field(out, "depth", &report.depth)?;
    output::field(out, "weighted depth", &report.weighted_depth)?;
    output::field(out, "height", &report.height)?;
    output::field(out, "weighted height", &report.weighted_height)?;
    Ok(())
}

#[instrument(level = "debug", skip(container, out))]
fn cmd_lca<W: Write>(
    container: &ServiceContainer,
    file: &Path,
    label_a: &str,
    label_b: &str,
    out: &mut W,
) -> CliResult<()> {
    let species = load_species(container, file)?;
    let tree = container.phylogeny.build_tree(&species)?;
    output::info(out, &container.phylogeny.lca(&tree, label_a, label_b)?)?;
    Ok(())
}

#[instrument(level = "debug", skip(container, out))]
fn cmd_distance<W: Write>(
    container: &ServiceContainer,
    file: &Path,
    label_a: &str,
    label_b: &str,
    out: &mut W,
) -> CliResult<()> {
    let species = load_species(container, file)?;
    let tree = container.phylogeny.build_tree(&species)?;
    output::info(out, &container.phylogeny.distance(&tree, label_a, label_b)?)?;
    Ok(())
}

fn cmd_config<W: Write>(container: &ServiceContainer, out: &mut W) -> CliResult<()> {
    match global_config_path() {
        Some(path) => output::field(out, "global config", &path.display())?,
        None => output::field(out, "global config", "unavailable")?,
    }
    output::info(out, &container.settings.to_toml()?)?;
    Ok(())
}
