//! Privileged package installation.

use std::collections::BTreeSet;

use log::info;

use crate::error::{Error, Result};
use crate::process::{CommandRunner, Invocation};

use super::OsFamily;

/// The OS package tool for one family.
///
/// Installs always run non-interactively, through the elevation channel, with
/// the whole package set in a single call.
#[derive(Debug, Clone)]
pub struct PackageManager {
    tool: &'static str,
    install_args: &'static [&'static str],
}

impl PackageManager {
    pub fn for_family(family: OsFamily) -> Self {
        match family {
            OsFamily::RedHat => Self {
                tool: "yum",
                install_args: &["-y", "install"],
            },
            OsFamily::Debian => Self {
                tool: "apt-get",
                install_args: &["-y", "install"],
            },
        }
    }

    pub fn tool(&self) -> &'static str {
        self.tool
    }

    /// The invocation that installs `packages`.
    ///
    /// Package names are listed in sorted order so the command line is
    /// reproducible; the tool does not care about order.
    pub fn install_invocation(&self, packages: &BTreeSet<String>) -> Invocation {
        Invocation::new(self.tool)
            .args(self.install_args.iter().copied())
            .args(packages.iter().cloned())
            .privileged()
    }

    /// Install `packages` in one blocking call, tagging the tool's output
    /// with `label`.
    ///
    /// Packages that are already installed are fine; the tool treats them as
    /// satisfied. An empty set is skipped, as the tools reject an empty
    /// install.
    pub fn install(
        &self,
        runner: &dyn CommandRunner,
        packages: &BTreeSet<String>,
        label: &str,
    ) -> Result<()> {
        if packages.is_empty() {
            info!("No packages to install");
            return Ok(());
        }

        let invocation = self.install_invocation(packages).label(label);
        info!("Installing packages: {}", join(packages));
        match runner.run(&invocation)? {
            0 => Ok(()),
            exit_code => Err(Error::PackageInstall {
                tool: self.tool.to_string(),
                exit_code,
            }),
        }
    }
}

fn join(packages: &BTreeSet<String>) -> String {
    packages.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}
