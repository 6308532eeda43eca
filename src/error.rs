//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for
//! `stackbuild`. It uses the `thiserror` library to create an `Error` enum
//! covering every failure a build run can hit, from profile validation to the
//! final privileged install.
//!
//! ## Key Components
//!
//! - **`ValidationError`**: Problems found while turning a raw profile into
//!   typed component specifications. These are always raised before anything
//!   touches the host.
//!
//! - **`Error`**: The main enum. Wraps `ValidationError` and adds platform,
//!   elevation, package and pipeline-stage failures.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Library code never terminates the process. The binary maps an `Error` to
//! an exit status through [`Error::exit_code`] in exactly one place.

use thiserror::Error;

/// Exit status used for generic failures, including pipeline stage failures.
pub const EXIT_FAILURE: u8 = 1;
/// Exit status for profiles that fail validation (sysexits `EX_DATAERR`).
pub const EXIT_INVALID_PROFILE: u8 = 65;
/// Exit status when the operator interrupted a build.
pub const EXIT_INTERRUPTED: u8 = 64;
/// Exit status when the package manager reports failure.
pub const EXIT_PACKAGE_MANAGER: u8 = 70;
/// Exit status when no package abstraction exists for the host OS.
pub const EXIT_UNSUPPORTED_PLATFORM: u8 = 72;
/// Exit status when no privilege channel is available (sysexits `EX_NOPERM`).
pub const EXIT_NO_ELEVATION: u8 = 77;

/// A profile validation failure.
///
/// Validation stops at the first problem, so exactly one of these is reported
/// per run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required key is missing from the profile's `metadata` block.
    #[error("Profile metadata is missing required key '{key}'")]
    MissingMetadata { key: String },

    /// The profile lists no components to build.
    #[error("Profile does not list any components")]
    NoComponents,

    /// A component entry lacks a required field.
    #[error("Component #{index} is missing required field '{field}'")]
    MissingField { index: usize, field: String },

    /// A field has the wrong shape (for example `modules` is not a list).
    #[error("Component #{index} has an invalid '{field}' field: {message}")]
    InvalidField {
        index: usize,
        field: String,
        message: String,
    },

    /// No application with this identifier is registered.
    #[error("Unknown application '{application}' in component #{index}{}", known_hint(known))]
    UnknownApplication {
        index: usize,
        application: String,
        /// Registered identifiers, used to build a hint
        known: Vec<String>,
    },

    /// The requested version is not in the application's supported set.
    #[error(
        "Unsupported version '{version}' of application '{application}'{}",
        newest_hint(latest)
    )]
    UnsupportedVersion {
        application: String,
        version: String,
        /// Newest supported version, used to build a hint
        latest: Option<String>,
    },

    /// A path is missing, relative where it must be absolute, or malformed.
    #[error("Invalid path '{value}' for key '{key}' in application '{application}'")]
    InvalidPath {
        application: String,
        key: String,
        value: String,
    },

    /// A module name the application does not define.
    #[error("Unknown module '{module}' for application '{application}'")]
    UnknownModule { application: String, module: String },

    /// A key nobody recognizes, reported only in strict mode.
    #[error("Unrecognized key '{key}' in {location}")]
    UnrecognizedKey { location: String, key: String },
}

fn newest_hint(latest: &Option<String>) -> String {
    latest
        .as_ref()
        .map(|l| format!("\n  hint: the newest supported version is {}", l))
        .unwrap_or_default()
}

fn known_hint(known: &[String]) -> String {
    if known.is_empty() {
        String::new()
    } else {
        format!("\n  hint: registered applications are: {}", known.join(", "))
    }
}

/// Main error type for stackbuild operations
#[derive(Error, Debug)]
pub enum Error {
    /// The profile failed validation.
    #[error("Profile validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A dependency token has no entry in the platform's package filter.
    #[error("Unresolved dependency '{token}': no {family} package is mapped to it")]
    UnresolvedDependency { token: String, family: String },

    /// The host operating system has no package abstraction.
    #[error(
        "Unsupported operating system ({detected}): stackbuild needs a package filter \
         and package manager for the host OS to install build dependencies"
    )]
    UnsupportedPlatform { detected: String },

    /// No trusted privilege channel could be set up.
    #[error("Privilege elevation unavailable via '{program}': {message}")]
    ElevationUnavailable { program: String, message: String },

    /// The package manager ran but reported failure.
    #[error(
        "Package manager '{tool}' failed with exit code {exit_code}\n  \
         hint: check the build log for the package manager output"
    )]
    PackageInstall { tool: String, exit_code: i32 },

    /// The operator interrupted a privileged operation; the run was stopped
    /// once that operation finished.
    #[error("Interrupted while '{program}' was running; the build has been aborted")]
    Interrupted { program: String },

    /// The configure step exited non-zero.
    #[error("Configure failed for {component} (exit code {exit_code})")]
    Configure { component: String, exit_code: i32 },

    /// The compile step exited non-zero.
    #[error("Compilation failed for {component} (exit code {exit_code})")]
    Compile { component: String, exit_code: i32 },

    /// The install step exited non-zero.
    #[error("Installation failed for {component} (exit code {exit_code})")]
    Install { component: String, exit_code: i32 },

    /// Retrieving a source archive failed.
    #[error("Download failed for {url}: {message}")]
    Download { url: String, message: String },

    /// Unpacking a source archive failed.
    #[error("Extraction failed for {archive}: {message}")]
    Extract { archive: String, message: String },

    /// A native tool could not be started at all.
    #[error("Failed to execute '{program}': {message}")]
    Spawn { program: String, message: String },

    /// An application identifier was registered twice.
    #[error("Application '{id}' is already registered")]
    DuplicateApplication { id: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// The process exit status this error should produce.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Validation(_) | Error::Yaml(_) => EXIT_INVALID_PROFILE,
            Error::UnsupportedPlatform { .. } => EXIT_UNSUPPORTED_PLATFORM,
            Error::ElevationUnavailable { .. } => EXIT_NO_ELEVATION,
            Error::PackageInstall { .. } => EXIT_PACKAGE_MANAGER,
            Error::Interrupted { .. } => EXIT_INTERRUPTED,
            _ => EXIT_FAILURE,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unsupported_version_with_hint() {
        let error = ValidationError::UnsupportedVersion {
            application: "nginx".to_string(),
            version: "9.9.9".to_string(),
            latest: Some("1.0.5".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Unsupported version '9.9.9'"));
        assert!(display.contains("nginx"));
        assert!(display.contains("hint: the newest supported version is 1.0.5"));
    }

    #[test]
    fn test_error_display_unsupported_version_without_hint() {
        let error = ValidationError::UnsupportedVersion {
            application: "nginx".to_string(),
            version: "9.9.9".to_string(),
            latest: None,
        };
        assert!(!format!("{}", error).contains("hint:"));
    }

    #[test]
    fn test_error_display_unknown_application() {
        let error = ValidationError::UnknownApplication {
            index: 2,
            application: "apache".to_string(),
            known: vec!["nginx".to_string()],
        };
        let display = format!("{}", error);
        assert!(display.contains("Unknown application 'apache'"));
        assert!(display.contains("#2"));
        assert!(display.contains("registered applications are: nginx"));
    }

    #[test]
    fn test_error_display_invalid_path() {
        let error = ValidationError::InvalidPath {
            application: "nginx".to_string(),
            key: "conf".to_string(),
            value: "etc/nginx.conf".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Invalid path 'etc/nginx.conf'"));
        assert!(display.contains("'conf'"));
    }

    #[test]
    fn test_validation_error_wraps_into_error() {
        let error: Error = ValidationError::NoComponents.into();
        let display = format!("{}", error);
        assert!(display.contains("Profile validation error"));
        assert!(display.contains("does not list any components"));
    }

    #[test]
    fn test_error_display_package_install() {
        let error = Error::PackageInstall {
            tool: "yum".to_string(),
            exit_code: 1,
        };
        let display = format!("{}", error);
        assert!(display.contains("'yum' failed with exit code 1"));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn test_error_display_interrupted_is_distinct_from_failure() {
        let interrupted = Error::Interrupted {
            program: "yum".to_string(),
        };
        let failed = Error::PackageInstall {
            tool: "yum".to_string(),
            exit_code: 1,
        };
        assert!(format!("{}", interrupted).contains("Interrupted"));
        assert_ne!(interrupted.exit_code(), failed.exit_code());
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_error =
            serde_yaml::from_str::<serde_yaml::Value>("invalid: [unclosed").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(format!("{}", error).contains("YAML parsing error"));
        assert_eq!(error.exit_code(), EXIT_INVALID_PROFILE);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            Error::from(ValidationError::NoComponents).exit_code(),
            EXIT_INVALID_PROFILE
        );
        assert_eq!(
            Error::UnsupportedPlatform {
                detected: "plan9".to_string()
            }
            .exit_code(),
            EXIT_UNSUPPORTED_PLATFORM
        );
        assert_eq!(
            Error::ElevationUnavailable {
                program: "sudo".to_string(),
                message: "not found".to_string()
            }
            .exit_code(),
            EXIT_NO_ELEVATION
        );
        assert_eq!(
            Error::Configure {
                component: "#0 nginx-1.0.5".to_string(),
                exit_code: 1
            }
            .exit_code(),
            EXIT_FAILURE
        );
    }
}
