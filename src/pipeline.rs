//! # Build Pipeline
//!
//! Every component goes through the same six stages, in the same order:
//!
//! 1. **Install dependencies**: resolve the component's dependency tokens and
//!    install the resulting packages in one privileged call.
//! 2. **Fetch**: download the versioned source archive.
//! 3. **Extract**: unpack it into the component's working directory.
//! 4. **Configure**: run the native configuration step.
//! 5. **Compile**: run the native build tool.
//! 6. **Install**: run the native install target with elevated privilege.
//!
//! Applications implement [`ComponentBuilder`] to say *how* each stage is done;
//! [`run`] is the only place that decides *when*. No stage is skipped,
//! reordered or retried, and the first failure ends the component.

use std::fmt;

use log::{error, info};

use crate::error::Result;

/// One pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    InstallDependencies,
    Fetch,
    Extract,
    Configure,
    Compile,
    Install,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::InstallDependencies,
        Stage::Fetch,
        Stage::Extract,
        Stage::Configure,
        Stage::Compile,
        Stage::Install,
    ];

    /// 1-based position in the pipeline.
    pub fn number(&self) -> usize {
        Stage::ALL
            .iter()
            .position(|stage| stage == self)
            .map_or(0, |index| index + 1)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::InstallDependencies => "install dependencies",
            Stage::Fetch => "fetch",
            Stage::Extract => "extract",
            Stage::Configure => "configure",
            Stage::Compile => "compile",
            Stage::Install => "install",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stage implementations for one component.
///
/// A builder is created for exactly one component and consumed by [`run`].
pub trait ComponentBuilder {
    /// Label used to prefix log lines (e.g. `#0 nginx-1.0.5`).
    fn label(&self) -> &str;

    fn install_dependencies(&mut self) -> Result<()>;
    fn fetch(&mut self) -> Result<()>;
    fn extract(&mut self) -> Result<()>;
    fn configure(&mut self) -> Result<()>;
    fn compile(&mut self) -> Result<()>;
    fn install(&mut self) -> Result<()>;
}

fn run_stage(builder: &mut dyn ComponentBuilder, stage: Stage) -> Result<()> {
    match stage {
        Stage::InstallDependencies => builder.install_dependencies(),
        Stage::Fetch => builder.fetch(),
        Stage::Extract => builder.extract(),
        Stage::Configure => builder.configure(),
        Stage::Compile => builder.compile(),
        Stage::Install => builder.install(),
    }
}

/// Drive `builder` through every stage, stopping at the first failure.
pub fn run(builder: &mut dyn ComponentBuilder) -> Result<()> {
    let total = Stage::ALL.len();
    for stage in Stage::ALL {
        info!(
            "{}: [{}/{}] {}",
            builder.label(),
            stage.number(),
            total,
            stage
        );
        if let Err(e) = run_stage(builder, stage) {
            error!("{}: {} stage failed: {}", builder.label(), stage, e);
            return Err(e);
        }
    }
    info!("{}: built and installed", builder.label());
    Ok(())
}
