//! # Build Orchestration
//!
//! The orchestrator walks a validated [`Profile`] in order. For each component
//! it creates a fresh working directory, asks the component's application
//! for a builder and runs that builder through the [`pipeline`].
//!
//! The first failure ends the whole run: the failing component's remaining
//! stages are skipped and later components are never started. Everything
//! happens on the calling thread, one stage at a time.
//!
//! Host access goes through [`BuildEnv`], which bundles the platform's
//! package abstraction with the process, download and extract collaborators.

use std::collections::BTreeSet;
use std::path::PathBuf;

use log::info;
use serde::Serialize;

use crate::component::{BuildContext, ComponentSpec};
use crate::error::{Result, ValidationError};
use crate::pipeline;
use crate::platform::Platform;
use crate::process::CommandRunner;
use crate::profile::Profile;
use crate::registry::{Application, ApplicationRegistry};
use crate::source::{Downloader, Extractor};
use crate::workspace::Workspace;

/// Host-facing collaborators shared by every component of a run.
pub struct BuildEnv {
    platform: Platform,
    runner: Box<dyn CommandRunner>,
    downloader: Box<dyn Downloader>,
    extractor: Box<dyn Extractor>,
}

impl BuildEnv {
    pub fn new(
        platform: Platform,
        runner: Box<dyn CommandRunner>,
        downloader: Box<dyn Downloader>,
        extractor: Box<dyn Extractor>,
    ) -> Self {
        Self {
            platform,
            runner,
            downloader,
            extractor,
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    pub fn downloader(&self) -> &dyn Downloader {
        self.downloader.as_ref()
    }

    pub fn extractor(&self) -> &dyn Extractor {
        self.extractor.as_ref()
    }
}

/// Outcome of one successfully built component.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentReport {
    pub label: String,
    pub packages: BTreeSet<String>,
    pub work_dir: PathBuf,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub components: Vec<ComponentReport>,
}

/// What a build would do for one component, without doing it.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentPlan {
    pub label: String,
    pub packages: BTreeSet<String>,
    pub source_url: String,
    pub configure_args: Vec<String>,
}

fn lookup<'r>(
    registry: &'r ApplicationRegistry,
    index: usize,
    spec: &ComponentSpec,
) -> Result<&'r dyn Application> {
    registry.get(spec.application()).ok_or_else(|| {
        ValidationError::UnknownApplication {
            index,
            application: spec.application().to_string(),
            known: registry.ids(),
        }
        .into()
    })
}

/// Resolve every component's package set, source location and configure
/// line. Touches nothing on the host.
pub fn plan(
    profile: &Profile,
    registry: &ApplicationRegistry,
    platform: &Platform,
) -> Result<Vec<ComponentPlan>> {
    profile
        .components()
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let app = lookup(registry, index, spec)?;
            Ok(ComponentPlan {
                label: format!("#{} {}", index, spec.label()),
                packages: platform.filter().resolve_all(spec.dependencies())?,
                source_url: app.source_url(spec.version())?.to_string(),
                configure_args: app.configure_args(spec),
            })
        })
        .collect()
}

/// Runs profiles against a registry and a build environment.
pub struct Orchestrator<'a> {
    registry: &'a ApplicationRegistry,
    env: &'a BuildEnv,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a ApplicationRegistry, env: &'a BuildEnv) -> Self {
        Self { registry, env }
    }

    /// Build every component of `profile`, in order, inside `workspace`.
    pub fn run(&self, profile: &Profile, workspace: &Workspace) -> Result<BuildReport> {
        let total = profile.components().len();
        let mut report = BuildReport::default();

        for (index, spec) in profile.components().iter().enumerate() {
            let app = lookup(self.registry, index, spec)?;
            let work_dir = workspace.component_dir(index)?;
            info!(
                "Building component {} of {}: {} in {}",
                index + 1,
                total,
                spec.label(),
                work_dir.display()
            );

            let ctx = BuildContext::new(index, spec, work_dir.clone());
            let label = ctx.label().to_string();
            let mut builder = app.new_builder(ctx, self.env);
            pipeline::run(builder.as_mut())?;

            report.components.push(ComponentReport {
                label,
                packages: self.env.platform().filter().resolve_all(spec.dependencies())?,
                work_dir,
            });
        }

        info!("All {} components built", total);
        Ok(report)
    }
}
