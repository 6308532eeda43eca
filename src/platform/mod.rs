//! # Host Platform Abstraction
//!
//! Dependency installation is the only part of a build that depends on the
//! host operating system. This module detects the OS family once at startup
//! and turns it into the pair the pipeline needs:
//!
//! - **[`PackageFilter`]**: translates abstract dependency tokens (`ssl-dev`)
//!   into the family's package names (`openssl-devel`, `libssl-dev`).
//! - **[`PackageManager`]**: installs a set of package names in one
//!   non-interactive, privileged call.
//!
//! Detection failure is fatal: without both halves no component can be
//! built, so [`Platform::detect`] returns [`Error::UnsupportedPlatform`]
//! before anything else happens.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use ini::Ini;
use log::{debug, info};
use serde::Serialize;

use crate::defaults::{OS_RELEASE_PATH, REDHAT_RELEASE_PATH};
use crate::error::{Error, Result};

pub mod filter;
pub mod manager;

pub use filter::PackageFilter;
pub use manager::PackageManager;

/// Operating system families stackbuild can install packages on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    /// RHEL, CentOS, Fedora, Rocky, AlmaLinux (yum)
    RedHat,
    /// Debian, Ubuntu (apt-get)
    Debian,
}

impl OsFamily {
    pub const ALL: [OsFamily; 2] = [OsFamily::RedHat, OsFamily::Debian];

    pub fn name(&self) -> &'static str {
        match self {
            OsFamily::RedHat => "redhat",
            OsFamily::Debian => "debian",
        }
    }

    /// Map an os-release `ID` or `ID_LIKE` entry to a family.
    pub fn from_os_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "rhel" | "centos" | "fedora" | "rocky" | "almalinux" | "redhat" => {
                Some(OsFamily::RedHat)
            }
            "debian" | "ubuntu" => Some(OsFamily::Debian),
            _ => None,
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OsFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        OsFamily::ALL
            .into_iter()
            .find(|family| family.name() == s)
            .ok_or_else(|| Error::UnsupportedPlatform {
                detected: s.to_string(),
            })
    }
}

/// The package abstraction for the host, constructed once per process.
#[derive(Debug, Clone)]
pub struct Platform {
    family: OsFamily,
    filter: PackageFilter,
    manager: PackageManager,
}

impl Platform {
    pub fn for_family(family: OsFamily) -> Self {
        Self {
            family,
            filter: PackageFilter::for_family(family),
            manager: PackageManager::for_family(family),
        }
    }

    /// Detect the host family from the standard release files.
    pub fn detect() -> Result<Self> {
        Self::detect_from(Path::new(OS_RELEASE_PATH), Path::new(REDHAT_RELEASE_PATH))
    }

    /// Detect the host family from explicit release file locations.
    ///
    /// `ID` is consulted before `ID_LIKE`. When os-release does not exist, the
    /// presence of `redhat_release` alone selects [`OsFamily::RedHat`].
    pub fn detect_from(os_release: &Path, redhat_release: &Path) -> Result<Self> {
        let family = detect_family(os_release, redhat_release)?;
        info!("Detected {} platform", family);
        Ok(Self::for_family(family))
    }

    pub fn family(&self) -> OsFamily {
        self.family
    }

    pub fn filter(&self) -> &PackageFilter {
        &self.filter
    }

    pub fn manager(&self) -> &PackageManager {
        &self.manager
    }
}

fn detect_family(os_release: &Path, redhat_release: &Path) -> Result<OsFamily> {
    if os_release.is_file() {
        let release = Ini::load_from_file(os_release).map_err(|e| Error::UnsupportedPlatform {
            detected: format!("unreadable {}: {}", os_release.display(), e),
        })?;
        let section = release.general_section();
        let id = section.get("ID").unwrap_or_default().to_string();
        debug!("os-release ID={:?} ID_LIKE={:?}", id, section.get("ID_LIKE"));

        let like = section.get("ID_LIKE").unwrap_or_default();
        let candidates = std::iter::once(id.as_str()).chain(like.split_whitespace());
        for candidate in candidates {
            if let Some(family) = OsFamily::from_os_id(candidate) {
                return Ok(family);
            }
        }
        return Err(Error::UnsupportedPlatform {
            detected: if id.is_empty() {
                "unknown".to_string()
            } else {
                id
            },
        });
    }

    if redhat_release.is_file() {
        return Ok(OsFamily::RedHat);
    }

    Err(Error::UnsupportedPlatform {
        detected: std::env::consts::OS.to_string(),
    })
}
