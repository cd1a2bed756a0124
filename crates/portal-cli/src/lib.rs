//! Portal Inspect
//!
//! Command-line inspection of page templates and editable content.
//!
//! ```text
//! portal-inspect [--config <file>] [-v] template <file> [--json]
//! portal-inspect [--config <file>] [-v] content <file> [--json]
//! portal-inspect [--config <file>] [-v] normalize <file> [--kind template|content] [--output <file>]
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod commands;
pub mod config;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use commands::normalize::DocumentKind;
use config::PortalConfig;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Build the command-line definition
#[must_use]
pub fn cli() -> Command {
    Command::new("portal-inspect")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect and normalize portal page templates and editable content")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file (default: ./portal.toml if present)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Raise log level (-v debug, -vv trace)"),
        )
        .subcommand(
            Command::new("template")
                .about("Summarize zones and web parts of a page template")
                .arg(path_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("content")
                .about("Summarize regions and web parts of editable content")
                .arg(path_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("normalize")
                .about("Re-serialize a document with the configured output settings")
                .arg(path_arg())
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .value_parser(["template", "content"])
                        .help("Document kind (default: inferred from the root element)"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write to this file instead of stdout"),
                ),
        )
}

fn path_arg() -> Arg {
    Arg::new("path")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Input XML file")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

/// Number of `-v` flags given
#[must_use]
pub fn verbosity(matches: &ArgMatches) -> u8 {
    matches.get_count("verbose")
}

/// Execute the parsed command line, writing reports to `out`
///
/// # Errors
/// Returns error if configuration, input or output fails
pub fn run(matches: &ArgMatches, out: &mut dyn Write) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let config = PortalConfig::resolve(
        matches.get_one::<PathBuf>("config").map(PathBuf::as_path),
        &cwd,
    )?;
    tracing::debug!(?config, "resolved configuration");

    match matches.subcommand() {
        Some(("template", args)) => {
            commands::template::run(required_path(args)?, args.get_flag("json"), out)?;
        }
        Some(("content", args)) => {
            commands::content::run(required_path(args)?, args.get_flag("json"), out)?;
        }
        Some(("normalize", args)) => {
            let kind = args
                .get_one::<String>("kind")
                .map(|kind| kind.parse::<DocumentKind>())
                .transpose()?;
            let output = args.get_one::<PathBuf>("output").map(PathBuf::as_path);
            commands::normalize::run(required_path(args)?, kind, output, &config, out)?;
        }
        Some((other, _)) => anyhow::bail!("unknown command '{other}'"),
        None => anyhow::bail!("no command given"),
    }
    Ok(())
}

fn required_path(args: &ArgMatches) -> Result<&Path> {
    args.get_one::<PathBuf>("path")
        .map(PathBuf::as_path)
        .context("input path is required")
}
