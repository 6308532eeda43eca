//! # Show Command Implementation
//!
//! Prints a validated profile with every default filled in: resolved paths,
//! deduplicated modules and the dependency tokens each component needs.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use stackbuild::defaults::{DEFAULT_PROFILE_FILENAME, ENV_PROFILE};
use stackbuild::registry::ApplicationRegistry;

/// Show the validated contents of a profile
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Path to the profile to show.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = ENV_PROFILE,
        default_value = DEFAULT_PROFILE_FILENAME
    )]
    pub profile: PathBuf,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `show` command.
pub fn execute(args: ShowArgs) -> Result<()> {
    let registry = ApplicationRegistry::builtin()?;
    let profile = super::load_profile(&args.profile, &registry, false)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("{}", profile);
    }
    Ok(())
}
