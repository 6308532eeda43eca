//! # stackbuild
//!
//! Builds server software from source on a host according to a declarative
//! profile. The `stackbuild` binary is a thin CLI over this library.
//!
//! ## Quick Example
//!
//! ```
//! use stackbuild::platform::{OsFamily, Platform};
//! use stackbuild::profile::{self, ParseOptions};
//! use stackbuild::registry::ApplicationRegistry;
//!
//! let registry = ApplicationRegistry::builtin().unwrap();
//! let profile = profile::from_str(
//!     r#"
//! metadata:
//!   name: web
//!   description: Front-end web server
//! components:
//!   - application: nginx
//!     version: 1.0.5
//!     paths:
//!       prefix: /opt/nginx
//!     modules: [http-ssl]
//! "#,
//!     &registry,
//!     &ParseOptions::default(),
//! )
//! .unwrap();
//!
//! let platform = Platform::for_family(OsFamily::RedHat);
//! let plans = stackbuild::orchestrator::plan(&profile, &registry, &platform).unwrap();
//! assert!(plans[0].packages.contains("openssl-devel"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Profiles (`profile`)**: the YAML document naming what to build, parsed
//!   and fully validated into [`component::ComponentSpec`]s before anything
//!   touches the host.
//! - **Applications (`registry`, `apps`)**: the startup-time table of
//!   buildable applications. Each validates its own components and creates
//!   their builders.
//! - **Platform (`platform`)**: the host OS family, which selects the
//!   dependency-token → package-name filter and the package manager.
//! - **Pipeline (`pipeline`, `orchestrator`)**: six strictly sequential stages
//!   per component, components in profile order, first failure ends the run.
//! - **Host access (`process`, `elevation`, `source`, `workspace`)**: native
//!   tool execution, the privilege channel, archive download and extraction,
//!   and the run directory.
//!
//! ## Execution Flow
//!
//! 1. **Detect** the platform; stop if it has no package abstraction.
//! 2. **Parse** the profile; stop at the first invalid component.
//! 3. **Configure** the privilege channel; stop if none is available.
//! 4. **Build** each component: install dependencies, fetch, extract,
//!    configure, compile, install.

pub mod apps;
pub mod component;
pub mod defaults;
pub mod elevation;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod profile;
pub mod registry;
pub mod source;
pub mod suggestions;
pub mod workspace;

pub use error::{Error, Result};
