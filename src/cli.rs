//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use stackbuild::logging;

use crate::commands;

/// stackbuild - Build server software stacks from source
#[derive(Parser, Debug)]
#[command(name = "stackbuild")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Minimum level written to the build log (error, warn, info, debug, trace)
    #[arg(
        short = 'l',
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "info",
        value_parser = parse_log_level
    )]
    log_level: log::LevelFilter,

    /// Minimum level shown on the terminal (error, warn, info, debug, trace)
    #[arg(
        short = 'o',
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "info",
        value_parser = parse_log_level
    )]
    output_level: log::LevelFilter,
}

fn parse_log_level(value: &str) -> Result<log::LevelFilter, String> {
    logging::parse_level(value).ok_or_else(|| {
        format!(
            "invalid log level '{}' (expected error, warn, info, debug or trace)",
            value
        )
    })
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build every component of a profile
    Build(commands::build::BuildArgs),

    /// Validate a profile without building anything
    Validate(commands::validate::ValidateArgs),

    /// Show the validated contents of a profile
    Show(commands::show::ShowArgs),

    /// List the applications stackbuild can build
    Apps(commands::apps::AppsArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let sink = logging::init(self.output_level, self.log_level);

        match self.command {
            Commands::Build(args) => commands::build::execute(args, &sink, &self.color),
            Commands::Validate(args) => commands::validate::execute(args, &self.color),
            Commands::Show(args) => commands::show::execute(args),
            Commands::Apps(args) => commands::apps::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
