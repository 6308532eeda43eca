//! Default values for stackbuild configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Default profile file name, used when `--profile` is not given.
pub const DEFAULT_PROFILE_FILENAME: &str = "stackbuild.yaml";

/// Program used for privilege elevation unless overridden.
pub const DEFAULT_ELEVATOR: &str = "sudo";

/// Name of the log file written into each run directory.
pub const LOG_FILENAME: &str = "stackbuild.log";

/// Prefix of every run directory.
pub const RUN_DIR_PREFIX: &str = "stackbuild-";

/// Standard location of the os-release file.
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Marker file present on Red Hat family systems.
pub const REDHAT_RELEASE_PATH: &str = "/etc/redhat-release";

/// Environment variable naming the profile file.
pub const ENV_PROFILE: &str = "STACKBUILD_PROFILE";
/// Environment variable naming the base directory for run directories.
pub const ENV_WORK_DIR: &str = "STACKBUILD_WORK_DIR";
/// Environment variable naming the elevation program.
pub const ENV_ELEVATE: &str = "STACKBUILD_ELEVATE";
/// Environment variable forcing the OS family.
pub const ENV_OS_FAMILY: &str = "STACKBUILD_OS_FAMILY";
/// Environment variable overriding the os-release location.
pub const ENV_OS_RELEASE: &str = "STACKBUILD_OS_RELEASE";

/// Returns the default base directory for run directories.
///
/// This is the system temporary directory (`$TMPDIR`, falling back to
/// `/tmp` on Linux). It can be overridden by the `--work-dir` CLI flag or the
/// `STACKBUILD_WORK_DIR` environment variable.
pub fn default_work_root() -> PathBuf {
    std::env::temp_dir()
}
