//! Run directory provisioning.
//!
//! Each build run gets a fresh directory holding the run log and one numbered
//! sub-directory per component. Downloads, extracted trees and build output
//! all stay inside it; nothing is written to system directories until a
//! component's install stage.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::defaults::{LOG_FILENAME, RUN_DIR_PREFIX};
use crate::error::Result;

/// The directory owned by one build run.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a uniquely named run directory under `base`.
    ///
    /// `label` (usually the profile's file stem) is appended to the directory
    /// name to make runs easy to tell apart.
    pub fn create(base: &Path, label: &str) -> Result<Self> {
        fs::create_dir_all(base)?;
        let suffix = format!("_{}", sanitize(label));
        let root = tempfile::Builder::new()
            .prefix(RUN_DIR_PREFIX)
            .suffix(&suffix)
            .tempdir_in(base)?
            .keep();
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the run log.
    pub fn log_file(&self) -> PathBuf {
        self.root.join(LOG_FILENAME)
    }

    /// Create the directory exclusive to component `index`.
    pub fn component_dir(&self, index: usize) -> Result<PathBuf> {
        let dir = self.root.join(index.to_string());
        fs::create_dir(&dir)?;
        Ok(dir)
    }

    /// Remove the run directory, or leave it in place when `keep` is set.
    pub fn finish(self, keep: bool) -> Result<()> {
        if keep {
            info!(
                "Left working directory {} intact; it will need to be removed manually",
                self.root.display()
            );
            return Ok(());
        }
        info!("Removing working directory {}", self.root.display());
        fs::remove_dir_all(&self.root)?;
        Ok(())
    }
}

fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
