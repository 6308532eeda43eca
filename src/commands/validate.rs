//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which checks a profile
//! without building anything.
//!
//! Validation is exactly what `build` does before touching the host: metadata
//! first, then each component in order, stopping at the first problem. No
//! platform detection, elevation or network access is involved, so this is
//! safe to run anywhere.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use stackbuild::defaults::{DEFAULT_PROFILE_FILENAME, ENV_PROFILE};
use stackbuild::output::{emoji, status_line, OutputConfig, Status};
use stackbuild::registry::ApplicationRegistry;

/// Validate a profile without building anything
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the profile to validate.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = ENV_PROFILE,
        default_value = DEFAULT_PROFILE_FILENAME
    )]
    pub profile: PathBuf,

    /// Reject unrecognized keys instead of warning about them.
    #[arg(long)]
    pub strict: bool,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    println!(
        "{} Validating profile: {}",
        emoji(&out, "🔍", "[SCAN]"),
        args.profile.display()
    );

    let registry = ApplicationRegistry::builtin()?;
    let profile = match super::load_profile(&args.profile, &registry, args.strict) {
        Ok(profile) => profile,
        Err(e) => {
            println!("{}", status_line(&out, Status::Error, "Profile is invalid"));
            return Err(e);
        }
    };

    println!(
        "{}",
        status_line(
            &out,
            Status::Ok,
            &format!(
                "Profile '{}' is valid ({} component(s))",
                profile.name(),
                profile.components().len()
            )
        )
    );
    for (index, spec) in profile.components().iter().enumerate() {
        let modules = if spec.modules().is_empty() {
            "no modules".to_string()
        } else {
            spec.modules().join(", ")
        };
        println!("   #{} {} ({})", index, spec.label(), modules);
    }
    Ok(())
}
