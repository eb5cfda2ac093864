//! Application module
//!
//! Wires a `BuildRequest` to the real collaborators: host detection, the
//! subprocess runner, the native package manager and the git source builder.
//!
//! Phases, in order:
//! 1. Detect host facts and resolve the platform profile (fatal on failure)
//! 2. Pre-flight checks
//! 3. Execute the selected steps sequentially

use crate::config::BuildRequest;
use crate::error::Result;
use crate::exec::SystemRunner;
use crate::installer::Installer;
use crate::package_manager::{PackageManagerKind, SystemPackageManager};
use crate::platform::{DistributionDetector, HostFacts, PlatformSelector};
use crate::profiles::PlatformProfile;
use crate::sanity;
use crate::source_build::GitSourceBuilder;
use tracing::{debug, info};

/// Host facts and the profile they resolve to.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub facts: HostFacts,
    pub selector: PlatformSelector,
    pub profile: &'static PlatformProfile,
}

/// Detect the host (honouring overrides) and resolve its profile.
pub fn resolve_request(
    request: &BuildRequest,
    detector: &dyn DistributionDetector,
) -> Result<Resolution> {
    let facts = HostFacts::detect(detector, request.platform, request.architecture.as_deref())?;
    let selector = facts.selector()?;
    let profile = selector.profile()?;
    Ok(Resolution {
        facts,
        selector,
        profile,
    })
}

/// Run a whole request against the host.
pub fn run(request: &BuildRequest, detector: &dyn DistributionDetector) -> Result<()> {
    let resolution = resolve_request(request, detector)?;
    let profile = resolution.profile;

    if request.print_profile {
        println!("{}", serde_json::to_string_pretty(profile)?);
        return Ok(());
    }

    sanity::verify_environment(request, profile)?;

    if request.steps.is_empty() {
        info!("No steps selected, nothing to do");
        return Ok(());
    }
    debug!("Selected steps: {:?}", request.steps);

    let runner = SystemRunner::new(request.dry_run);
    let packages = SystemPackageManager::new(
        PackageManagerKind::for_profile(profile.name),
        runner.clone(),
        request.fail_fast,
    );
    let sources = GitSourceBuilder::new(
        BuildRequest::build_dir(resolution.facts.os),
        request.prefix.clone(),
        runner,
    );

    let mut installer =
        Installer::new(resolution.selector, packages, sources)?.with_dry_run(request.dry_run);
    installer.run(&request.steps)
}
