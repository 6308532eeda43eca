//! # Table-Driven Applications
//!
//! Most source-built server software follows the same recipe: download a
//! versioned tarball, run `./configure` with path and feature flags, then
//! `make` and `make install`. [`AppDefinition`] captures everything that
//! differs between such applications as static data and implements
//! [`Application`] once for all of them.
//!
//! ## Configure line composition
//!
//! The configure arguments for a spec are built in three steps:
//!
//! 1. Start from the baseline: the disable flag of every
//!    [`Baseline::Suppressed`] module, in module-table order.
//! 2. Append `<flag>=<path>` for every path key, in path-table order.
//! 3. For each requested module, in the order the profile lists them,
//!    remove its disable flag ([`Baseline::Suppressed`]) or append its enable
//!    flag ([`Baseline::OptIn`]).
//!
//! Removing a flag that is already gone and appending one that is already
//! present are both no-ops, so composition is idempotent.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use url::Url;

use crate::component::{Baseline, BuildContext, ComponentSpec, ModuleDef, PathDef, PREFIX_KEY};
use crate::error::{Result, ValidationError};
use crate::orchestrator::BuildEnv;
use crate::pipeline::ComponentBuilder;
use crate::profile::{self, ParseOptions};
use crate::registry::Application;

pub mod nginx;
pub mod source_builder;

pub use source_builder::SourceBuilder;

/// Placeholder substituted with the version in URL and directory templates.
const VERSION_PLACEHOLDER: &str = "{version}";

/// Keys a component entry may carry.
pub const COMPONENT_KEYS: &[&str] = &["application", "version", "paths", "modules"];

/// Static description of an autotools-style application.
#[derive(Debug)]
pub struct AppDefinition {
    pub id: &'static str,
    /// Supported versions, oldest first
    pub versions: &'static [&'static str],
    /// Source archive URL, containing `{version}`
    pub source_url: &'static str,
    /// Top-level directory of the extracted archive, containing `{version}`
    pub source_dir: &'static str,
    pub paths: &'static [PathDef],
    pub modules: &'static [ModuleDef],
    /// Dependency tokens needed regardless of modules
    pub dependencies: &'static [&'static str],
}

impl AppDefinition {
    pub fn supports(&self, version: &str) -> bool {
        self.versions.contains(&version)
    }

    /// The highest supported version by semver ordering.
    pub fn latest_version(&self) -> Option<&'static str> {
        self.versions
            .iter()
            .filter_map(|v| semver::Version::parse(v).ok().map(|parsed| (parsed, *v)))
            .max_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, v)| v)
    }

    pub fn module(&self, name: &str) -> Option<&'static ModuleDef> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Name of the directory the archive for `version` extracts to.
    pub fn source_dir_name(&self, version: &str) -> String {
        self.source_dir.replace(VERSION_PLACEHOLDER, version)
    }

    /// Resolve a component's `paths` block.
    ///
    /// `prefix` is mandatory and absolute. Every other key takes the explicit
    /// override when given (which must also be absolute), else its default
    /// relative to the prefix.
    pub fn resolve_paths(
        &self,
        index: usize,
        raw: Option<&Value>,
        options: &ParseOptions,
    ) -> std::result::Result<BTreeMap<String, PathBuf>, ValidationError> {
        let empty = Mapping::new();
        let overrides = match raw {
            None | Some(Value::Null) => &empty,
            Some(Value::Mapping(map)) => map,
            Some(_) => {
                return Err(ValidationError::InvalidField {
                    index,
                    field: "paths".to_string(),
                    message: "expected a mapping of path keys to paths".to_string(),
                })
            }
        };

        let known: Vec<&str> = self.paths.iter().map(|p| p.key).collect();
        profile::check_keys(
            overrides,
            &known,
            &format!("paths of component #{}", index),
            options,
        )?;

        let prefix = self
            .path_override(overrides, PREFIX_KEY)?
            .ok_or_else(|| self.invalid_path(PREFIX_KEY, ""))?;

        let mut resolved = BTreeMap::new();
        for def in self.paths {
            let path = match self.path_override(overrides, def.key)? {
                Some(path) => path,
                None => match def.default {
                    Some(default) => prefix.join(default),
                    None => return Err(self.invalid_path(def.key, "")),
                },
            };
            resolved.insert(def.key.to_string(), path);
        }
        Ok(resolved)
    }

    fn path_override(
        &self,
        overrides: &Mapping,
        key: &str,
    ) -> std::result::Result<Option<PathBuf>, ValidationError> {
        let Some(value) = overrides.get(key) else {
            return Ok(None);
        };
        match value {
            Value::String(s) if Path::new(s).is_absolute() => Ok(Some(PathBuf::from(s))),
            Value::String(s) => Err(self.invalid_path(key, s)),
            other => Err(self.invalid_path(key, &profile::describe(other))),
        }
    }

    fn invalid_path(&self, key: &str, value: &str) -> ValidationError {
        ValidationError::InvalidPath {
            application: self.id.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// Resolve a component's `modules` list, deduplicated in first-seen order.
    pub fn resolve_modules(
        &self,
        index: usize,
        raw: Option<&Value>,
    ) -> std::result::Result<Vec<String>, ValidationError> {
        let entries = match raw {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Sequence(entries)) => entries,
            Some(_) => {
                return Err(ValidationError::InvalidField {
                    index,
                    field: "modules".to_string(),
                    message: "expected a list of module names".to_string(),
                })
            }
        };

        let mut modules: Vec<String> = Vec::new();
        for entry in entries {
            let Value::String(name) = entry else {
                return Err(ValidationError::InvalidField {
                    index,
                    field: "modules".to_string(),
                    message: format!(
                        "module names must be strings, found {}",
                        profile::describe(entry)
                    ),
                });
            };
            if self.module(name).is_none() {
                return Err(ValidationError::UnknownModule {
                    application: self.id.to_string(),
                    module: name.clone(),
                });
            }
            if !modules.contains(name) {
                modules.push(name.clone());
            }
        }
        Ok(modules)
    }

    /// Base dependencies plus those contributed by `modules`.
    pub fn dependencies_for(&self, modules: &[String]) -> BTreeSet<String> {
        let extra = modules
            .iter()
            .filter_map(|name| self.module(name))
            .flat_map(|module| module.dependencies.iter());
        self.dependencies
            .iter()
            .chain(extra)
            .map(|token| token.to_string())
            .collect()
    }
}

impl Application for AppDefinition {
    fn id(&self) -> &'static str {
        self.id
    }

    fn supported_versions(&self) -> &'static [&'static str] {
        self.versions
    }

    fn paths(&self) -> &'static [PathDef] {
        self.paths
    }

    fn modules(&self) -> &'static [ModuleDef] {
        self.modules
    }

    fn validate(
        &self,
        index: usize,
        raw: &Value,
        options: &ParseOptions,
    ) -> std::result::Result<ComponentSpec, ValidationError> {
        let version = raw
            .get("version")
            .and_then(profile::scalar_text)
            .ok_or_else(|| ValidationError::MissingField {
                index,
                field: "version".to_string(),
            })?;
        if !self.supports(&version) {
            return Err(ValidationError::UnsupportedVersion {
                application: self.id.to_string(),
                version,
                latest: self.latest_version().map(str::to_string),
            });
        }

        let paths = self.resolve_paths(index, raw.get("paths"), options)?;
        let modules = self.resolve_modules(index, raw.get("modules"))?;
        let dependencies = self.dependencies_for(&modules);

        Ok(ComponentSpec::new(self.id, version, paths, modules, dependencies))
    }

    fn source_url(&self, version: &str) -> Result<Url> {
        Ok(Url::parse(&self.source_url.replace(VERSION_PLACEHOLDER, version))?)
    }

    fn configure_args(&self, spec: &ComponentSpec) -> Vec<String> {
        let mut args: Vec<String> = self
            .modules
            .iter()
            .filter(|m| m.baseline == Baseline::Suppressed)
            .map(|m| m.flag.to_string())
            .collect();

        for def in self.paths {
            if let Some(path) = spec.path(def.key) {
                args.push(format!("{}={}", def.flag, path.display()));
            }
        }

        for module in spec.modules().iter().filter_map(|name| self.module(name)) {
            match module.baseline {
                Baseline::Suppressed => args.retain(|arg| arg != module.flag),
                Baseline::OptIn => {
                    if !args.iter().any(|arg| arg == module.flag) {
                        args.push(module.flag.to_string());
                    }
                }
            }
        }
        args
    }

    fn new_builder<'a>(
        &'a self,
        ctx: BuildContext<'a>,
        env: &'a BuildEnv,
    ) -> Box<dyn ComponentBuilder + 'a> {
        Box::new(SourceBuilder::new(self, ctx, env))
    }
}

/// Last path segment of `url`, used as the local archive file name.
pub fn archive_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("source.tar.gz")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATHS: &[PathDef] = &[
        PathDef {
            key: PREFIX_KEY,
            flag: "--prefix",
            default: None,
        },
        PathDef {
            key: "conf",
            flag: "--conf-path",
            default: Some("etc/app.conf"),
        },
    ];

    const MODULES: &[ModuleDef] = &[
        ModuleDef::suppressed("feature-x", "--without-feature-x").requiring(&["lib-dev"]),
        ModuleDef::suppressed("feature-y", "--without-feature-y"),
        ModuleDef::opt_in("feature-z", "--with-feature-z").requiring(&["z-dev", "lib-dev"]),
    ];

    const APP: AppDefinition = AppDefinition {
        id: "app",
        versions: &["0.9.1", "1.0.0", "1.10.0", "1.2.0"],
        source_url: "https://example.invalid/dist/app-{version}.tar.gz",
        source_dir: "app-{version}",
        paths: PATHS,
        modules: MODULES,
        dependencies: &["gcc", "make"],
    };

    fn component(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn validate(yaml: &str) -> std::result::Result<ComponentSpec, ValidationError> {
        APP.validate(0, &component(yaml), &ParseOptions::default())
    }

    #[test]
    fn test_latest_version_uses_semver_ordering() {
        assert_eq!(APP.latest_version(), Some("1.10.0"));
    }

    #[test]
    fn test_default_path_is_relative_to_prefix() {
        let spec =
            validate("{application: app, version: 1.0.0, paths: {prefix: /opt/app}}").unwrap();
        assert_eq!(spec.path("conf"), Some(Path::new("/opt/app/etc/app.conf")));
        assert_eq!(spec.prefix(), Some(Path::new("/opt/app")));
    }

    #[test]
    fn test_absolute_override_is_used() {
        let spec = validate(
            "{application: app, version: 1.0.0, paths: {prefix: /opt/app, conf: /etc/app.conf}}",
        )
        .unwrap();
        assert_eq!(spec.path("conf"), Some(Path::new("/etc/app.conf")));
    }

    #[test]
    fn test_relative_override_is_rejected() {
        let err = validate(
            "{application: app, version: 1.0.0, paths: {prefix: /opt/app, conf: etc/app.conf}}",
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidPath {
                application: "app".to_string(),
                key: "conf".to_string(),
                value: "etc/app.conf".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_or_relative_prefix_is_rejected() {
        for yaml in [
            "{application: app, version: 1.0.0}",
            "{application: app, version: 1.0.0, paths: {}}",
            "{application: app, version: 1.0.0, paths: {prefix: opt/app}}",
        ] {
            let err = validate(yaml).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidPath { ref key, .. } if key == "prefix"),
                "{yaml}: {err:?}"
            );
        }
    }

    #[test]
    fn test_unsupported_version_reports_latest() {
        let err =
            validate("{application: app, version: 2.0.0, paths: {prefix: /opt}}").unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedVersion {
                application: "app".to_string(),
                version: "2.0.0".to_string(),
                latest: Some("1.10.0".to_string()),
            }
        );
    }

    #[test]
    fn test_missing_version() {
        let err = validate("{application: app, paths: {prefix: /opt}}").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingField { ref field, .. } if field == "version"
        ));
    }

    #[test]
    fn test_no_modules_gives_base_dependencies() {
        let spec =
            validate("{application: app, version: 1.0.0, paths: {prefix: /opt}, modules: []}")
                .unwrap();
        let expected: BTreeSet<String> = ["gcc", "make"].iter().map(|s| s.to_string()).collect();
        assert_eq!(spec.dependencies(), &expected);
    }

    #[test]
    fn test_module_listed_twice_is_recorded_once() {
        let spec = validate(concat!(
            "{application: app, version: 1.0.0, paths: {prefix: /opt}, ",
            "modules: [feature-x, feature-x]}",
        ))
        .unwrap();
        assert_eq!(spec.modules(), &["feature-x".to_string()]);
        let expected: BTreeSet<String> = ["gcc", "lib-dev", "make"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(spec.dependencies(), &expected);
    }

    #[test]
    fn test_shared_dependency_tokens_collapse() {
        let spec = validate(concat!(
            "{application: app, version: 1.0.0, paths: {prefix: /opt}, ",
            "modules: [feature-x, feature-z]}",
        ))
        .unwrap();
        assert_eq!(spec.dependencies().len(), 4);
    }

    #[test]
    fn test_unknown_module_is_rejected() {
        let err = validate(concat!(
            "{application: app, version: 1.0.0, paths: {prefix: /opt}, ",
            "modules: [warp-drive]}",
        ))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownModule {
                application: "app".to_string(),
                module: "warp-drive".to_string(),
            }
        );
    }

    #[test]
    fn test_modules_must_be_a_list() {
        let err = validate(
            "{application: app, version: 1.0.0, paths: {prefix: /opt}, modules: feature-x}",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidField { ref field, .. } if field == "modules"
        ));
    }

    #[test]
    fn test_unknown_path_key_rejected_in_strict_mode() {
        let raw =
            component("{application: app, version: 1.0.0, paths: {prefix: /opt, logs: /var/log}}");
        assert!(APP.validate(0, &raw, &ParseOptions::default()).is_ok());
        let err = APP
            .validate(0, &raw, &ParseOptions { strict: true })
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnrecognizedKey { ref key, .. } if key == "logs"));
    }

    #[test]
    fn test_configure_args_baseline() {
        let spec =
            validate("{application: app, version: 1.0.0, paths: {prefix: /opt/app}}").unwrap();
        assert_eq!(
            APP.configure_args(&spec),
            vec![
                "--without-feature-x",
                "--without-feature-y",
                "--prefix=/opt/app",
                "--conf-path=/opt/app/etc/app.conf",
            ]
        );
    }

    #[test]
    fn test_configure_args_toggle_modules() {
        let spec = validate(concat!(
            "{application: app, version: 1.0.0, paths: {prefix: /opt/app}, ",
            "modules: [feature-z, feature-x]}",
        ))
        .unwrap();
        assert_eq!(
            APP.configure_args(&spec),
            vec![
                "--without-feature-y",
                "--prefix=/opt/app",
                "--conf-path=/opt/app/etc/app.conf",
                "--with-feature-z",
            ]
        );
    }

    #[test]
    fn test_source_url_and_archive_name() {
        let url = APP.source_url("1.2.0").unwrap();
        assert_eq!(url.as_str(), "https://example.invalid/dist/app-1.2.0.tar.gz");
        assert_eq!(archive_name(&url), "app-1.2.0.tar.gz");
        assert_eq!(APP.source_dir_name("1.2.0"), "app-1.2.0");
    }
}
