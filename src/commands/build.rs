//! # Build Command Implementation
//!
//! This module implements the `build` subcommand, which builds every
//! component of a profile on the current host.
//!
//! ## Process
//!
//! 1. **Platform**: detect the OS family (or take `--os-family`). Without a
//!    package filter and manager nothing can be built, so this comes first.
//! 2. **Profile**: load and validate the profile completely.
//! 3. **Elevation**: set up the privilege channel used for package and final
//!    installs.
//! 4. **Workspace**: create the run directory and start writing the run log
//!    into it.
//! 5. **Build**: run the six-stage pipeline for each component in order.
//!
//! With `--dry-run` the command stops after step 2 and prints, per
//! component, the packages it would install and the configure line it would
//! run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use log::{error, info};

use stackbuild::defaults::{
    default_work_root, DEFAULT_ELEVATOR, DEFAULT_PROFILE_FILENAME, ENV_ELEVATE, ENV_OS_FAMILY,
    ENV_OS_RELEASE, ENV_PROFILE, ENV_WORK_DIR, REDHAT_RELEASE_PATH,
};
use stackbuild::elevation::Elevator;
use stackbuild::logging::LogSink;
use stackbuild::orchestrator::{self, BuildEnv, ComponentPlan, Orchestrator};
use stackbuild::output::{status_line, OutputConfig, Status};
use stackbuild::platform::{OsFamily, Platform};
use stackbuild::process::SystemRunner;
use stackbuild::registry::ApplicationRegistry;
use stackbuild::source::{HttpDownloader, TarGzExtractor};
use stackbuild::workspace::Workspace;

/// Build every component of a profile
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the profile to build.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = ENV_PROFILE,
        default_value = DEFAULT_PROFILE_FILENAME
    )]
    pub profile: PathBuf,

    /// Directory in which the run directory is created.
    ///
    /// Defaults to the system temporary directory.
    #[arg(long, value_name = "DIR", env = ENV_WORK_DIR)]
    pub work_dir: Option<PathBuf>,

    /// Keep the run directory after a successful build.
    ///
    /// The run directory of a failed build is always kept.
    #[arg(long)]
    pub keep_work_dir: bool,

    /// Program used to run privileged commands (default: sudo, or none when
    /// running as root).
    #[arg(long, value_name = "PROGRAM", env = ENV_ELEVATE)]
    pub elevate_with: Option<String>,

    /// Skip OS detection and use this family's packages.
    #[arg(long, value_name = "FAMILY", env = ENV_OS_FAMILY, value_parser = ["redhat", "debian"])]
    pub os_family: Option<String>,

    /// Read OS identification from this file instead of /etc/os-release.
    #[arg(long, value_name = "FILE", env = ENV_OS_RELEASE, hide = true)]
    pub os_release: Option<PathBuf>,

    /// Reject unrecognized profile keys instead of warning about them.
    #[arg(long)]
    pub strict: bool,

    /// Show what would be installed and configured, without doing it.
    #[arg(long)]
    pub dry_run: bool,

    /// Hide download progress bars.
    #[arg(short, long)]
    pub quiet: bool,
}

fn detect_platform(args: &BuildArgs) -> Result<Platform> {
    if let Some(family) = &args.os_family {
        let family: OsFamily = family.parse()?;
        info!("Using {} platform (forced)", family);
        return Ok(Platform::for_family(family));
    }
    let platform = match &args.os_release {
        Some(os_release) => Platform::detect_from(os_release, Path::new(REDHAT_RELEASE_PATH))?,
        None => Platform::detect()?,
    };
    Ok(platform)
}

fn print_plan(out: &OutputConfig, plans: &[ComponentPlan]) {
    for plan in plans {
        println!("{}", status_line(out, Status::Build, &plan.label));
        println!("   Source: {}", plan.source_url);
        let packages: Vec<&str> = plan.packages.iter().map(String::as_str).collect();
        println!("   Packages: {}", packages.join(" "));
        println!("   Configure: ./configure {}", plan.configure_args.join(" "));
    }
}

/// Execute the `build` command.
pub fn execute(args: BuildArgs, sink: &LogSink, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let platform = detect_platform(&args)?;

    let registry = ApplicationRegistry::builtin()?;
    let profile = super::load_profile(&args.profile, &registry, args.strict)?;
    info!("Interpreted profile as:\n{}", profile);

    if args.dry_run {
        let plans = orchestrator::plan(&profile, &registry, &platform)?;
        print_plan(&out, &plans);
        return Ok(());
    }

    let elevator = Elevator::configure(args.elevate_with.as_deref(), DEFAULT_ELEVATOR)?;

    let label = args
        .profile
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "profile".to_string());
    let base = args.work_dir.clone().unwrap_or_else(default_work_root);
    let workspace = Workspace::create(&base, &label)
        .with_context(|| format!("Failed to create run directory in {}", base.display()))?;
    sink.attach(&workspace.log_file())?;
    info!("Logging to {}", workspace.log_file().display());

    let env = BuildEnv::new(
        platform,
        Box::new(SystemRunner::new(elevator)),
        Box::new(HttpDownloader::new(!args.quiet)?),
        Box::new(TarGzExtractor),
    );

    match Orchestrator::new(&registry, &env).run(&profile, &workspace) {
        Ok(report) => {
            for component in &report.components {
                println!(
                    "{}",
                    status_line(&out, Status::Ok, &format!("Built {}", component.label))
                );
            }
            if args.keep_work_dir {
                println!("Build log: {}", workspace.log_file().display());
            }
            workspace.finish(args.keep_work_dir)?;
            Ok(())
        }
        Err(e) => {
            error!("Build failed: {}", e);
            println!("{}", status_line(&out, Status::Error, "Build failed"));
            println!("Build log: {}", workspace.log_file().display());
            workspace.finish(true)?;
            Err(e.into())
        }
    }
}
