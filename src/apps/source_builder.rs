//! The `./configure && make && make install` builder.

use std::path::PathBuf;

use log::info;

use crate::component::BuildContext;
use crate::error::{Error, Result};
use crate::orchestrator::BuildEnv;
use crate::pipeline::ComponentBuilder;
use crate::process::Invocation;
use crate::registry::Application;

use super::{archive_name, AppDefinition};

/// Builds one component of an [`AppDefinition`] application.
pub struct SourceBuilder<'a> {
    app: &'a AppDefinition,
    ctx: BuildContext<'a>,
    env: &'a BuildEnv,
    archive: Option<PathBuf>,
}

impl<'a> SourceBuilder<'a> {
    pub fn new(app: &'a AppDefinition, ctx: BuildContext<'a>, env: &'a BuildEnv) -> Self {
        Self {
            app,
            ctx,
            env,
            archive: None,
        }
    }

    /// The extracted source tree every native tool runs in.
    pub fn source_dir(&self) -> PathBuf {
        self.ctx
            .work_dir()
            .join(self.app.source_dir_name(self.ctx.spec().version()))
    }

    fn run_tool(&self, invocation: Invocation) -> Result<i32> {
        info!("{}: running {}", self.ctx.label(), invocation);
        let invocation = invocation.dir(&self.source_dir()).label(self.ctx.label());
        self.env.runner().run(&invocation)
    }
}

impl ComponentBuilder for SourceBuilder<'_> {
    fn label(&self) -> &str {
        self.ctx.label()
    }

    fn install_dependencies(&mut self) -> Result<()> {
        let platform = self.env.platform();
        let packages = platform
            .filter()
            .resolve_all(self.ctx.spec().dependencies())?;
        platform
            .manager()
            .install(self.env.runner(), &packages, self.ctx.label())
    }

    fn fetch(&mut self) -> Result<()> {
        let url = self.app.source_url(self.ctx.spec().version())?;
        let dest = self.ctx.work_dir().join(archive_name(&url));
        info!("{}: downloading {}", self.ctx.label(), url);
        self.env.downloader().download(&url, &dest)?;
        self.archive = Some(dest);
        Ok(())
    }

    fn extract(&mut self) -> Result<()> {
        let archive = match &self.archive {
            Some(archive) => archive.clone(),
            None => {
                let url = self.app.source_url(self.ctx.spec().version())?;
                self.ctx.work_dir().join(archive_name(&url))
            }
        };
        info!("{}: extracting {}", self.ctx.label(), archive.display());
        self.env.extractor().extract(&archive, self.ctx.work_dir())?;

        let source_dir = self.source_dir();
        if !source_dir.is_dir() {
            return Err(Error::Extract {
                archive: archive.display().to_string(),
                message: format!(
                    "archive did not contain the expected directory {}",
                    source_dir.display()
                ),
            });
        }
        Ok(())
    }

    fn configure(&mut self) -> Result<()> {
        let args = self.app.configure_args(self.ctx.spec());
        match self.run_tool(Invocation::new("./configure").args(args))? {
            0 => Ok(()),
            exit_code => Err(Error::Configure {
                component: self.ctx.label().to_string(),
                exit_code,
            }),
        }
    }

    fn compile(&mut self) -> Result<()> {
        match self.run_tool(Invocation::new("make"))? {
            0 => Ok(()),
            exit_code => Err(Error::Compile {
                component: self.ctx.label().to_string(),
                exit_code,
            }),
        }
    }

    fn install(&mut self) -> Result<()> {
        match self.run_tool(Invocation::new("make").arg("install").privileged())? {
            0 => Ok(()),
            exit_code => Err(Error::Install {
                component: self.ctx.label().to_string(),
                exit_code,
            }),
        }
    }
}
