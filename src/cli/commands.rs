//! Command dispatch: one function per subcommand.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::kinematics::ImpossibleDecay;
use crate::application::render::format_probability;
use crate::application::services::DocumentSource;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::ProcessGroup;
use crate::infrastructure::di::ServiceContainer;
use crate::parser::{is_bare_id, is_keyword, quote_if_necessary};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Check { file } => check(cli, file),
        Commands::Tree { file } => tree(cli, file),
        Commands::Expand { file, limit } => expand(cli, file, *limit),
        Commands::Emit { file, output } => emit(cli, file, output.as_deref()),
        Commands::Kinematics { file } => kinematics(cli, file),
        Commands::Id { name } => id(name),
        Commands::Config { command } => config(command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

/// Settings for `document` (its directory supplies the local config) with
/// the command-line database override applied.
fn container(cli: &Cli, document: &Path) -> CliResult<ServiceContainer> {
    let mut settings = Settings::load(document.parent())?;
    if let Some(database) = &cli.database {
        settings.database = Some(database.clone());
    }
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings)?)
}

fn load(container: &ServiceContainer, file: &Path) -> CliResult<ProcessGroup> {
    Ok(container.decay_service.load(&DocumentSource::from(file))?)
}

#[instrument(level = "debug", skip(cli))]
fn check(cli: &Cli, file: &Path) -> CliResult<()> {
    let container = container(cli, file)?;
    let group = load(&container, file)?;
    output::success(&format!(
        "{}: {} particles in {} trees",
        file.display(),
        group.tree().particle_count(),
        group.len()
    ));
    for &root in group.root_particles() {
        let count = group.tree().subtree(root).count();
        if let Some(particle) = group.tree().particle(root) {
            output::detail(&format!("{} ({} particles)", particle.type_name(), count));
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn tree(cli: &Cli, file: &Path) -> CliResult<()> {
    let container = container(cli, file)?;
    let group = load(&container, file)?;
    output::info(&container.decay_service.render(&group)?);
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn expand(cli: &Cli, file: &Path, limit: Option<usize>) -> CliResult<()> {
    let container = container(cli, file)?;
    let service = &container.decay_service;
    let mut group = load(&container, file)?;
    let expansions = service.expand(&mut group, limit)?;
    for expansion in &expansions {
        if let Some(particle) = group.tree().particle(expansion.root) {
            output::header(particle.type_name());
        }
        output::info(&service.render_expansion(&group, expansion)?);
        let total = expansion
            .alternatives
            .iter()
            .map(|a| a.probability)
            .try_fold(0.0, |sum, p| p.map(|p| sum + p));
        output::detail(&format!("sum of probabilities: {}", format_probability(total)));
    }
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn emit(cli: &Cli, file: &Path, target: Option<&Path>) -> CliResult<()> {
    let container = container(cli, file)?;
    let service = &container.decay_service;
    let group = load(&container, file)?;
    let text = service.emit(&group)?;
    match target {
        Some(path) => {
            service.write(path, &text)?;
            output::action("Wrote", &path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn describe(group: &ProcessGroup, finding: &ImpossibleDecay) -> String {
    let tree = group.tree();
    let name = |id| {
        tree.particle(id)
            .map(|p| p.type_name().to_string())
            .unwrap_or_default()
    };
    let products = tree
        .decay(finding.decay)
        .map(|d| d.iter().map(|&p| name(p)).collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    format!(
        "{} -> {}: {} > {}",
        name(finding.parent),
        products,
        finding.product_mass,
        finding.parent_mass
    )
}

#[instrument(level = "debug", skip(cli))]
fn kinematics(cli: &Cli, file: &Path) -> CliResult<()> {
    let container = container(cli, file)?;
    let group = load(&container, file)?;
    let findings = container.decay_service.kinematics(&group)?;
    if findings.is_empty() {
        output::success("all decays are kinematically allowed");
    } else {
        output::warning(&format!("{} kinematically impossible decays", findings.len()));
        for finding in &findings {
            output::failure(&describe(&group, finding));
        }
    }
    Ok(())
}

fn id(name: &str) -> CliResult<()> {
    if is_bare_id(name) && !is_keyword(name) {
        output::success(&format!("{name} is a bare identifier"));
        return Ok(());
    }
    match quote_if_necessary(name) {
        Some(quoted) => {
            output::warning(&format!("{name:?} must be quoted"));
            output::info(&quoted);
            Ok(())
        }
        None => Err(CliError::InvalidArgs(format!(
            "{name:?} contains a double quote or line break and cannot be written as an identifier"
        ))),
    }
}

fn config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show { file } => {
            let dir = file.as_deref().and_then(Path::parent);
            output::info(&Settings::load(dir)?.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no config directory on this platform"),
            }
            let local = local_config_path(Path::new("."));
            output::action("local", &local.display());
        }
    }
    Ok(())
}
