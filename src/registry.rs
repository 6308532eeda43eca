//! # Application Registry
//!
//! The registry is the table of applications stackbuild knows how to build.
//! Each entry is an [`Application`]: it validates a raw profile component
//! into a [`ComponentSpec`] and creates the [`ComponentBuilder`] that runs the
//! component's pipeline.
//!
//! Applications are registered once, at startup, from code. Profiles can only
//! name applications that are already registered; nothing read from a
//! profile ever adds to the table.

use std::collections::BTreeMap;

use serde_yaml::Value;
use url::Url;

use crate::apps;
use crate::component::{BuildContext, ComponentSpec, ModuleDef, PathDef};
use crate::error::{Error, Result, ValidationError};
use crate::orchestrator::BuildEnv;
use crate::pipeline::ComponentBuilder;
use crate::profile::ParseOptions;

/// An application stackbuild can build from source.
pub trait Application {
    /// Identifier used in profiles (e.g. `nginx`).
    fn id(&self) -> &'static str;

    /// Versions that may be requested, oldest first.
    fn supported_versions(&self) -> &'static [&'static str];

    /// Path keys accepted under a component's `paths`.
    fn paths(&self) -> &'static [PathDef];

    /// Optional feature toggles.
    fn modules(&self) -> &'static [ModuleDef];

    /// Validate one raw profile component.
    ///
    /// `index` is the component's position in the profile and only used in
    /// error messages. The returned spec owns freshly built containers.
    fn validate(
        &self,
        index: usize,
        raw: &Value,
        options: &ParseOptions,
    ) -> std::result::Result<ComponentSpec, ValidationError>;

    /// Where the source archive for `version` is downloaded from.
    fn source_url(&self, version: &str) -> Result<Url>;

    /// Arguments passed to the native configuration step for `spec`.
    fn configure_args(&self, spec: &ComponentSpec) -> Vec<String>;

    /// Create the builder that runs `ctx`'s component through the pipeline.
    fn new_builder<'a>(
        &'a self,
        ctx: BuildContext<'a>,
        env: &'a BuildEnv,
    ) -> Box<dyn ComponentBuilder + 'a>;
}

/// Identifier → application table.
#[derive(Default)]
pub struct ApplicationRegistry {
    applications: BTreeMap<&'static str, Box<dyn Application>>,
}

impl ApplicationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every application shipped with stackbuild.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Box::new(apps::nginx::NGINX))?;
        Ok(registry)
    }

    /// Add an application. Identifiers are unique.
    pub fn register(&mut self, application: Box<dyn Application>) -> Result<()> {
        let id = application.id();
        if self.applications.contains_key(id) {
            return Err(Error::DuplicateApplication { id: id.to_string() });
        }
        self.applications.insert(id, application);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&dyn Application> {
        self.applications.get(id).map(|app| app.as_ref())
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.applications.keys().map(|id| id.to_string()).collect()
    }

    /// Registered applications, sorted by identifier.
    pub fn applications(&self) -> impl Iterator<Item = &dyn Application> {
        self.applications.values().map(|app| app.as_ref())
    }
}
