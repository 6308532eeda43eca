//! # Apps Command Implementation
//!
//! Lists the registered applications with their supported versions, path
//! keys and modules. Versions are shown newest first.

use std::cmp::Reverse;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use stackbuild::component::Baseline;
use stackbuild::registry::{Application, ApplicationRegistry};
use stackbuild::suggestions;

/// List the applications stackbuild can build
#[derive(Args, Debug)]
pub struct AppsArgs {
    /// Only show this application.
    #[arg(value_name = "APPLICATION")]
    pub application: Option<String>,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ModuleInfo {
    name: &'static str,
    baseline: Baseline,
    dependencies: &'static [&'static str],
}

#[derive(Serialize)]
struct AppInfo {
    id: &'static str,
    versions: Vec<&'static str>,
    paths: Vec<&'static str>,
    modules: Vec<ModuleInfo>,
}

fn describe(app: &dyn Application) -> AppInfo {
    let mut versions = app.supported_versions().to_vec();
    versions.sort_by_key(|v| Reverse(semver::Version::parse(v).ok()));
    AppInfo {
        id: app.id(),
        versions,
        paths: app.paths().iter().map(|p| p.key).collect(),
        modules: app
            .modules()
            .iter()
            .map(|m| ModuleInfo {
                name: m.name,
                baseline: m.baseline,
                dependencies: m.dependencies,
            })
            .collect(),
    }
}

fn print_text(info: &AppInfo) {
    println!("{}", info.id);
    println!("  versions: {}", info.versions.join(", "));
    println!("  paths: {}", info.paths.join(", "));
    println!("  modules:");
    for module in &info.modules {
        let state = match module.baseline {
            Baseline::Suppressed => "built upstream by default",
            Baseline::OptIn => "opt-in",
        };
        if module.dependencies.is_empty() {
            println!("    {} ({})", module.name, state);
        } else {
            println!(
                "    {} ({}; needs {})",
                module.name,
                state,
                module.dependencies.join(", ")
            );
        }
    }
}

/// Execute the `apps` command.
pub fn execute(args: AppsArgs) -> Result<()> {
    let registry = ApplicationRegistry::builtin()?;

    let infos: Vec<AppInfo> = match &args.application {
        Some(id) => {
            let app = registry
                .get(id)
                .ok_or_else(|| suggestions::unknown_application(id, &registry.ids()))?;
            vec![describe(app)]
        }
        None => registry.applications().map(describe).collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
    } else {
        for info in &infos {
            print_text(info);
        }
    }
    Ok(())
}
