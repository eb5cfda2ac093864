//! build_env library
//!
//! Resolves the host platform to a fixed package profile, installs it with
//! the native package manager and builds third-party dependencies from
//! source.

pub mod app;
pub mod cli;
pub mod config;
pub mod dependencies;
pub mod error;
pub mod exec;
pub mod installer;
pub mod package_manager;
pub mod platform;
pub mod postinstall;
#[cfg(unix)]
pub mod process_guard;
pub mod profiles;
pub mod sanity;
pub mod source_build;
pub mod types;

// Re-export main types for convenience
pub use config::{BuildRequest, Step, StepToggles};
pub use dependencies::Dependency;
pub use error::{BuildEnvError, Result};
pub use exec::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
pub use installer::{Installer, SystemInstallReport};
pub use package_manager::{PackageInstaller, PackageManagerKind, SystemPackageManager};
pub use platform::{resolve, DistributionDetector, HostDetector, HostFacts, OsFamily, PlatformSelector};
pub use postinstall::{Fixup, FixupOutcome};
pub use profiles::{PlatformProfile, ProfileName};
pub use source_build::{BuildSystem, GitSourceBuilder, SourceBuilder};
pub use types::{Architecture, DistroFamily, OsName, WordSize};
