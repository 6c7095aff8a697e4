//! Command dispatch and the interactive edit loop

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument, warn};

use crate::application::services::{EditorSession, PromptedOutcome};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{self, Settings};
use crate::domain::{LevelCap, NodePath};
use crate::infrastructure::traits::{
    FileSystem, Prompter, RealFileSystem, SelectionItem, Selector, SkimSelector, TerminalPrompter,
};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Show {
            file,
            level,
            expanded,
        }) => show(file, level, *expanded),
        Some(Commands::Stats { file }) => stats(file),
        Some(Commands::Edit { file }) => edit(file),
        Some(Commands::Export { file, output }) => export(file, output.as_deref()),
        Some(Commands::Config { command }) => config_command(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "taxedit", &mut std::io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given (try --help)".to_string(),
        )),
    }
}

fn parse_level(level: &str) -> CliResult<LevelCap> {
    level
        .parse::<LevelCap>()
        .map_err(CliError::InvalidArgs)
}

fn load_session(file: &Path, cap: LevelCap) -> CliResult<EditorSession> {
    let fs = RealFileSystem;
    let input = fs.read_to_string(file).map_err(|e| {
        crate::infrastructure::InfraError::io(format!("read {}", file.display()), e)
    })?;
    Ok(EditorSession::load(&input, cap)?)
}

#[instrument]
fn show(file: &Path, level: &str, expanded: bool) -> CliResult<()> {
    let cap = parse_level(level)?;
    let mut session = load_session(file, cap)?;
    if expanded {
        session.expand_all();
    }
    output::info(&session.display());
    Ok(())
}

#[instrument]
fn stats(file: &Path) -> CliResult<()> {
    let session = load_session(file, LevelCap::All)?;
    print_stats(&session);
    Ok(())
}

fn print_stats(session: &EditorSession) {
    output::header("Nodes per level");
    for (level, count) in session.level_counts() {
        let plural = if count == 1 { "node" } else { "nodes" };
        output::detail(&format!("Level {level}: {count} {plural}"));
    }
}

#[instrument]
fn export(file: &Path, target: Option<&Path>) -> CliResult<()> {
    let settings = Settings::load()?;
    let mut session = load_session(file, LevelCap::All)?;
    let target = target
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&settings.export_file));
    session.export_to_file(Arc::new(RealFileSystem), &target)?;
    output::success(&format!("exported to {}", target.display()));
    Ok(())
}

#[instrument]
fn edit(file: &Path) -> CliResult<()> {
    let settings = Settings::load()?;
    let cap = settings.default_cap()?;
    let mut session = load_session(file, cap)?;
    let prompter = TerminalPrompter;
    let selector = SkimSelector;

    output::header(&format!("Editing {}", file.display()));
    output::detail("type \"help\" for commands, \"quit\" to leave");
    output::info(&session.display());

    let stdin = std::io::stdin();
    loop {
        output::prompt("taxedit>");
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                return Err(crate::infrastructure::InfraError::io("read command", e).into());
            }
        }
        match dispatch_line(&mut session, &settings, line.trim(), &prompter, &selector) {
            Ok(LoopAction::Continue) => {}
            Ok(LoopAction::Quit) => break,
            // Session errors are surfaced and the loop continues; a path
            // failure here means view and store disagree, which is worth
            // seeing, not worth dying for.
            Err(e) => {
                warn!("interactive command failed: {e}");
                output::error(&e);
            }
        }
    }
    Ok(())
}

enum LoopAction {
    Continue,
    Quit,
}

fn dispatch_line(
    session: &mut EditorSession,
    settings: &Settings,
    line: &str,
    prompter: &dyn Prompter,
    selector: &dyn Selector,
) -> CliResult<LoopAction> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(LoopAction::Continue);
    };
    let rest: Vec<&str> = parts.collect();
    debug!("dispatch_line: {command} {rest:?}");

    match command {
        "show" => output::info(&session.display()),
        "stats" => print_stats(session),
        "toggle" => {
            let path = require_path(&rest)?;
            session.toggle(&path);
            output::info(&session.display());
        }
        "expand-all" => {
            session.expand_all();
            output::info(&session.display());
        }
        "collapse-all" => {
            session.collapse_all();
            output::info(&session.display());
        }
        "level" => {
            let arg = rest
                .first()
                .ok_or_else(|| CliError::Usage("usage: level <1..N|all>".to_string()))?;
            session.set_level(parse_level(arg)?);
            output::info(&session.display());
        }
        "rename" => {
            rename_command(session, &rest, prompter, selector)?;
            output::info(&session.display());
        }
        "add" => {
            let path = require_path(&rest)?;
            let name = rest[1..].join(" ");
            let outcome = if name.trim().is_empty() {
                session.insert_child_prompting(&path, prompter)?
            } else {
                session.insert_child(&path, &name)?;
                PromptedOutcome::Applied
            };
            match outcome {
                PromptedOutcome::Applied => output::info(&session.display()),
                PromptedOutcome::Cancelled => output::detail("cancelled"),
            }
        }
        "delete" => {
            let path = require_path(&rest)?;
            match session.delete_with_confirmation(&path, prompter)? {
                PromptedOutcome::Applied => {
                    output::success("deleted");
                    output::info(&session.display());
                }
                PromptedOutcome::Cancelled => output::detail("cancelled"),
            }
        }
        "export" => {
            let target = rest
                .first()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(&settings.export_file));
            session.export_to_file(Arc::new(RealFileSystem), &target)?;
            output::success(&format!("exported to {}", target.display()));
        }
        "help" => print_help(),
        "quit" | "exit" | "q" => return Ok(LoopAction::Quit),
        other => {
            output::warning(&format!("unknown command: {other} (try \"help\")"));
        }
    }
    Ok(LoopAction::Continue)
}

fn require_path(rest: &[&str]) -> CliResult<NodePath> {
    let raw = rest
        .first()
        .ok_or_else(|| CliError::Usage("missing node path (e.g. 0.2.1)".to_string()))?;
    raw.parse::<NodePath>()
        .map_err(|e| CliError::InvalidArgs(e.to_string()))
}

fn rename_command(
    session: &mut EditorSession,
    rest: &[&str],
    prompter: &dyn Prompter,
    selector: &dyn Selector,
) -> CliResult<()> {
    let (path, text) = if rest.is_empty() {
        // No path given: pick the node with the fuzzy selector.
        let Some(path) = select_node(session, selector)? else {
            output::detail("cancelled");
            return Ok(());
        };
        let Some(text) = prompter
            .input("New name:")
            .map_err(|e| crate::infrastructure::InfraError::io("read new name", e))?
        else {
            output::detail("cancelled");
            return Ok(());
        };
        (path, text)
    } else {
        let path = require_path(rest)?;
        let text = rest[1..].join(" ");
        if text.trim().is_empty() {
            return Err(CliError::Usage(
                "usage: rename <path> <new name> (or rename with no args to pick)".to_string(),
            ));
        }
        (path, text)
    };
    session.rename(&path, &text)?;
    Ok(())
}

fn select_node(
    session: &EditorSession,
    selector: &dyn Selector,
) -> CliResult<Option<NodePath>> {
    let mut items = Vec::new();
    session.view().walk(&mut |node| {
        let label = match &node.code {
            Some(code) => format!("{} [{}] {}", node.path, code, node.name),
            None => format!("{} {}", node.path, node.name),
        };
        items.push(SelectionItem {
            display: label,
            value: node.path.to_string(),
        });
    });
    let selected = selector
        .select_one(&items, "node> ")
        .map_err(CliError::InvalidArgs)?;
    match selected {
        Some(item) => {
            let path = item
                .value
                .parse::<NodePath>()
                .map_err(|e| CliError::InvalidArgs(e.to_string()))?;
            Ok(Some(path))
        }
        None => Ok(None),
    }
}

fn print_help() {
    output::header("Commands");
    output::detail("show                 render the tree");
    output::detail("stats                node counts per level");
    output::detail("toggle <path>        expand/collapse a node");
    output::detail("expand-all           expand every node");
    output::detail("collapse-all         collapse every node");
    output::detail("level <1..N|all>     depth filter");
    output::detail("rename [<path> <name>]  rename a node (no args: fuzzy-pick)");
    output::detail("add <path> [name]    append a child (prompts without name)");
    output::detail("delete <path>        delete a subtree (asks for confirmation)");
    output::detail("export [file]        write the updated taxonomy");
    output::detail("quit                 leave the session");
}

fn config_command(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load()?;
            let rendered =
                toml::to_string_pretty(&settings).map_err(|e| {
                    CliError::from(crate::application::ApplicationError::Config {
                        message: format!("render config: {e}"),
                    })
                })?;
            output::info(&rendered);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let target = if *global {
                config::global_config_path().ok_or_else(|| {
                    CliError::from(crate::application::ApplicationError::Config {
                        message: "cannot determine global config directory".to_string(),
                    })
                })?
            } else {
                config::local_config_path()
            };
            if target.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    target.display()
                )));
            }
            let fs = RealFileSystem;
            let template = Settings::template()?;
            fs.ensure_parent(&target)
                .and_then(|_| fs.write(&target, &template))
                .map_err(|e| {
                    crate::infrastructure::InfraError::io(
                        format!("write {}", target.display()),
                        e,
                    )
                })?;
            output::action("created", &target.display());
            Ok(())
        }
        ConfigCommands::Path => {
            if let Some(global) = config::global_config_path() {
                output::detail(&format!("global: {}", global.display()));
            }
            output::detail(&format!("local:  {}", config::local_config_path().display()));
            Ok(())
        }
    }
}
