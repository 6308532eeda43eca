//! Component specifications and the static tables applications describe
//! themselves with.
//!
//! A [`ComponentSpec`] is the validated, immutable description of one
//! application instance to build. It owns all of its containers; the
//! application-level tables ([`PathDef`], [`ModuleDef`]) are `'static` and
//! only ever read.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Path key every application must accept.
pub const PREFIX_KEY: &str = "prefix";

/// A path an application can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathDef {
    /// Key used in profiles (e.g. `conf`)
    pub key: &'static str,
    /// Configure flag receiving the path (e.g. `--conf-path`)
    pub flag: &'static str,
    /// Default relative to the prefix; `None` means the key is mandatory
    pub default: Option<&'static str>,
}

/// How a module appears on the baseline configure line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Baseline {
    /// Built by default upstream; the baseline line carries the module's
    /// disable flag and enabling it removes that flag.
    Suppressed,
    /// Not built unless asked for; enabling it appends the enable flag.
    OptIn,
}

/// An optional feature toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleDef {
    pub name: &'static str,
    /// The flag token: a disable flag for [`Baseline::Suppressed`] modules,
    /// an enable flag for [`Baseline::OptIn`] ones
    pub flag: &'static str,
    pub baseline: Baseline,
    /// Extra dependency tokens contributed when the module is requested
    pub dependencies: &'static [&'static str],
}

impl ModuleDef {
    pub const fn suppressed(name: &'static str, flag: &'static str) -> Self {
        Self {
            name,
            flag,
            baseline: Baseline::Suppressed,
            dependencies: &[],
        }
    }

    pub const fn opt_in(name: &'static str, flag: &'static str) -> Self {
        Self {
            name,
            flag,
            baseline: Baseline::OptIn,
            dependencies: &[],
        }
    }

    pub const fn requiring(mut self, dependencies: &'static [&'static str]) -> Self {
        self.dependencies = dependencies;
        self
    }
}

/// Validated, immutable configuration for one application instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSpec {
    application: String,
    version: String,
    paths: BTreeMap<String, PathBuf>,
    modules: Vec<String>,
    dependencies: BTreeSet<String>,
}

impl ComponentSpec {
    /// Assemble a spec from already-validated parts.
    ///
    /// Callers are the application validators; they guarantee every path is
    /// absolute and every module is known.
    pub fn new(
        application: impl Into<String>,
        version: impl Into<String>,
        paths: BTreeMap<String, PathBuf>,
        modules: Vec<String>,
        dependencies: BTreeSet<String>,
    ) -> Self {
        Self {
            application: application.into(),
            version: version.into(),
            paths,
            modules,
            dependencies,
        }
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn paths(&self) -> &BTreeMap<String, PathBuf> {
        &self.paths
    }

    pub fn path(&self, key: &str) -> Option<&Path> {
        self.paths.get(key).map(PathBuf::as_path)
    }

    pub fn prefix(&self) -> Option<&Path> {
        self.path(PREFIX_KEY)
    }

    /// Requested modules, deduplicated, in the order they were first listed.
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Abstract dependency tokens needed to build this component.
    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// Short label used in log lines and error messages.
    pub fn label(&self) -> String {
        format!("{}-{}", self.application, self.version)
    }
}

impl fmt::Display for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Application: {} {}", self.application, self.version)?;
        writeln!(f, "Paths:")?;
        for (key, path) in &self.paths {
            writeln!(f, "  {}: {}", key, path.display())?;
        }
        writeln!(f, "Modules:")?;
        for module in &self.modules {
            writeln!(f, "  * {}", module)?;
        }
        write!(f, "Dependencies:")?;
        for dependency in &self.dependencies {
            write!(f, "\n  * {}", dependency)?;
        }
        Ok(())
    }
}

/// Per-component state handed to a builder.
///
/// Created by the orchestrator for exactly one component and dropped when that
/// component's pipeline ends, whatever the outcome.
#[derive(Debug)]
pub struct BuildContext<'a> {
    spec: &'a ComponentSpec,
    work_dir: PathBuf,
    label: String,
}

impl<'a> BuildContext<'a> {
    pub fn new(index: usize, spec: &'a ComponentSpec, work_dir: PathBuf) -> Self {
        Self {
            spec,
            work_dir,
            label: format!("#{} {}", index, spec.label()),
        }
    }

    pub fn spec(&self) -> &ComponentSpec {
        self.spec
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Prefix for every log line about this component.
    pub fn label(&self) -> &str {
        &self.label
    }
}
