//! # CLI Command Implementations
//!
//! One module per subcommand of the `stackbuild` binary. Each defines an
//! `Args` struct derived with `clap` and an `execute` function that calls
//! into the `stackbuild` library.

pub mod apps;
pub mod build;
pub mod completions;
pub mod show;
pub mod validate;

use std::path::Path;

use anyhow::Result;
use stackbuild::profile::{self, ParseOptions, Profile};
use stackbuild::registry::ApplicationRegistry;
use stackbuild::suggestions;

/// Load and validate the profile at `path`.
pub(crate) fn load_profile(
    path: &Path,
    registry: &ApplicationRegistry,
    strict: bool,
) -> Result<Profile> {
    if !path.exists() {
        return Err(suggestions::profile_not_found(path));
    }
    Ok(profile::from_file(path, registry, &ParseOptions { strict })?)
}
