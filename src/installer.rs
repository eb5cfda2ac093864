//! Installer orchestration
//!
//! Drives a run once the platform is known: installs the profile's system
//! packages in order, applies post-install fixups, and builds source
//! dependencies. Execution is strictly sequential; nothing here retries or
//! rolls back. Failure policy for a single package or build belongs to the
//! collaborators and is inherited unchanged.

use crate::config::Step;
use crate::dependencies::Dependency;
use crate::error::Result;
use crate::package_manager::PackageInstaller;
use crate::platform::PlatformSelector;
use crate::postinstall::{self, Fixup, FixupOutcome};
use crate::profiles::PlatformProfile;
use crate::source_build::SourceBuilder;
use std::path::PathBuf;
use tracing::info;

/// What `install_system` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInstallReport {
    /// Package names handed to the installer, in order
    pub packages: Vec<&'static str>,
    pub fixups: Vec<FixupOutcome>,
}

/// Orchestrates a run for one resolved platform.
pub struct Installer<P, B> {
    selector: PlatformSelector,
    profile: &'static PlatformProfile,
    packages: P,
    sources: B,
    root: PathBuf,
    dry_run: bool,
}

impl<P: PackageInstaller, B: SourceBuilder> Installer<P, B> {
    /// Resolve the profile for `selector`.
    ///
    /// Fails with `UnsupportedPlatform` before any collaborator is touched.
    pub fn new(selector: PlatformSelector, packages: P, sources: B) -> Result<Self> {
        let profile = selector.profile()?;
        info!("Resolved platform {} to profile {}", selector, profile.name);
        Ok(Self {
            selector,
            profile,
            packages,
            sources,
            root: postinstall::system_root(),
            dry_run: false,
        })
    }

    /// Filesystem root for fixups.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn profile(&self) -> &'static PlatformProfile {
        self.profile
    }

    pub fn packages(&self) -> &P {
        &self.packages
    }

    pub fn sources(&self) -> &B {
        &self.sources
    }

    /// Fixups that follow a system install on this platform
    pub fn fixups(&self) -> Vec<Fixup> {
        if self.selector.is_rhel() {
            vec![Fixup::NinjaSymlink]
        } else {
            Vec::new()
        }
    }

    /// Install required packages, then build packages, then apply fixups.
    pub fn install_system(&mut self) -> Result<SystemInstallReport> {
        let packages: Vec<&'static str> = self.profile.all_packages().collect();
        info!(
            "Installing {} system packages for {}",
            packages.len(),
            self.profile.name
        );
        for package in &packages {
            self.packages.install(package)?;
        }

        let fixups = self
            .fixups()
            .into_iter()
            .map(|fixup| {
                info!("Applying post-install fixup: {}", fixup);
                postinstall::apply(fixup, &self.root, self.dry_run)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SystemInstallReport { packages, fixups })
    }

    /// Clone and build one dependency with its default flags.
    pub fn build_dependency(&mut self, dependency: Dependency) -> Result<()> {
        info!("Building {} from {}", dependency, dependency.url());
        let flags: Vec<String> = dependency
            .default_flags()
            .iter()
            .map(|f| f.to_string())
            .collect();
        self.sources
            .clone_and_build(dependency.url(), dependency.build_system(), &flags)
    }

    /// Execute `steps` in order; the first error ends the run.
    pub fn run(&mut self, steps: &[Step]) -> Result<()> {
        for step in steps {
            info!("==> {}", step);
            match *step {
                Step::System => {
                    self.install_system()?;
                }
                Step::Build(dependency) => self.build_dependency(dependency)?,
            }
        }
        Ok(())
    }
}
