//! # Error Suggestions
//!
//! Errors raised by the CLI layer that should tell the operator how to fix
//! them, not just what went wrong.

use std::path::Path;

use crate::defaults::{DEFAULT_PROFILE_FILENAME, ENV_PROFILE};

/// The profile file does not exist.
pub fn profile_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Profile not found: {path}\n\n\
         hint: Create a {default} file in the current directory\n\
         hint: Use -p/--profile to specify a different path\n\
         hint: Set the {env} environment variable",
        path = path.display(),
        default = DEFAULT_PROFILE_FILENAME,
        env = ENV_PROFILE,
    )
}

/// The requested application is not registered.
pub fn unknown_application(id: &str, known: &[String]) -> anyhow::Error {
    anyhow::anyhow!(
        "Unknown application: {id}\n\n\
         hint: Supported applications are: {known}\n\
         hint: Run 'stackbuild apps' to list them with their versions",
        known = known.join(", "),
    )
}
