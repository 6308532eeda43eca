//! Shared test utilities for CLI end-to-end tests.
//!
//! Add `mod common;` to a test file, then:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_profile(profiles::SINGLE);
//! fixture.command().arg("validate").assert().success();
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::profiles;
    pub use super::TestFixture;
}

/// Profile YAML snippets.
#[allow(dead_code)]
pub mod profiles {
    /// One nginx component with defaults and the SSL module.
    pub const SINGLE: &str = r#"
metadata:
  name: web
  description: Front-end web server
components:
  - application: nginx
    version: 1.0.5
    paths:
      prefix: /opt/nginx
    modules: [http, http-ssl]
"#;

    /// Two components, built in order.
    pub const TWO_COMPONENTS: &str = r#"
metadata:
  name: pair
  description: Current and legacy nginx
components:
  - application: nginx
    version: 1.0.5
    paths:
      prefix: /opt/nginx
      conf: /etc/nginx/nginx.conf
    modules: [http, http-gzip]
  - application: nginx
    version: 0.8.55
    paths:
      prefix: /opt/nginx-legacy
"#;

    /// Version outside the supported set.
    pub const UNSUPPORTED_VERSION: &str = r#"
metadata:
  name: web
  description: Too new
components:
  - application: nginx
    version: 1.25.3
    paths:
      prefix: /opt/nginx
"#;

    /// Relative path override.
    pub const RELATIVE_PATH: &str = r#"
metadata:
  name: web
  description: Relative conf
components:
  - application: nginx
    version: 1.0.5
    paths:
      prefix: /opt/nginx
      conf: etc/nginx.conf
"#;

    /// Application nobody registered.
    pub const UNKNOWN_APPLICATION: &str = r#"
metadata:
  name: web
  description: Apache
components:
  - application: apache
    version: "2.4"
"#;

    /// Valid except for a key stackbuild does not know.
    pub const EXTRA_KEY: &str = r#"
metadata:
  name: web
  description: Extra key
components:
  - application: nginx
    version: 1.0.5
    user: www-data
    paths:
      prefix: /opt/nginx
"#;

    /// Missing the description.
    pub const MISSING_DESCRIPTION: &str = r#"
metadata:
  name: web
components:
  - application: nginx
    version: 1.0.5
    paths:
      prefix: /opt/nginx
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "metadata: [unclosed";
}

/// os-release contents.
#[allow(dead_code)]
pub mod os_release {
    pub const ROCKY: &str = "NAME=\"Rocky Linux\"\nID=\"rocky\"\nID_LIKE=\"rhel centos fedora\"\n";
    pub const UBUNTU: &str = "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\n";
    pub const UNSUPPORTED: &str = "NAME=\"Plan 9\"\nID=plan9\n";
}

/// A temporary directory holding a profile and whatever else a test needs.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `stackbuild.yaml` with the given content.
    pub fn with_profile(self, content: &str) -> Self {
        self.temp_dir
            .child("stackbuild.yaml")
            .write_str(content)
            .expect("Failed to write profile");
        self
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    #[allow(dead_code)]
    pub fn profile_path(&self) -> PathBuf {
        self.temp_dir.path().join("stackbuild.yaml")
    }

    /// A `stackbuild` command running in the fixture directory, isolated
    /// from any `STACKBUILD_*` settings of the calling environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("stackbuild");
        cmd.current_dir(self.path())
            .env_remove("STACKBUILD_PROFILE")
            .env_remove("STACKBUILD_WORK_DIR")
            .env_remove("STACKBUILD_ELEVATE")
            .env_remove("STACKBUILD_OS_FAMILY")
            .env_remove("STACKBUILD_OS_RELEASE")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_profile() {
        let fixture = TestFixture::new().with_profile(profiles::SINGLE);
        assert!(fixture.profile_path().exists());
    }

    #[test]
    fn test_profiles_are_valid_yaml() {
        for profile in [
            profiles::SINGLE,
            profiles::TWO_COMPONENTS,
            profiles::UNSUPPORTED_VERSION,
            profiles::RELATIVE_PATH,
            profiles::UNKNOWN_APPLICATION,
            profiles::EXTRA_KEY,
            profiles::MISSING_DESCRIPTION,
        ] {
            serde_yaml::from_str::<serde_yaml::Value>(profile)
                .expect("Profile should be valid YAML");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        assert!(serde_yaml::from_str::<serde_yaml::Value>(profiles::INVALID_YAML).is_err());
    }
}
