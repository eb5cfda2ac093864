//! Pre-flight checks for the runtime environment
//!
//! Runs before any installation step:
//! - The profile's package manager is on PATH when system packages are selected
//! - `git` is on PATH when sources will be built and the system step will
//!   not install it
//!
//! In dry-run mode failures are reported as warnings only.

use crate::config::BuildRequest;
use crate::error::{BuildEnvError, Result};
use crate::package_manager::PackageManagerKind;
use crate::profiles::PlatformProfile;
use tracing::{debug, warn};

/// Result of environment verification
#[derive(Debug, Default)]
pub struct SanityCheckResult {
    pub missing_binaries: Vec<String>,
}

impl SanityCheckResult {
    pub fn is_ok(&self) -> bool {
        self.missing_binaries.is_empty()
    }
}

/// Binaries the request needs before it can start.
pub fn required_binaries(request: &BuildRequest, profile: &PlatformProfile) -> Vec<&'static str> {
    let mut binaries = Vec::new();
    if request.includes_system() {
        binaries.push(PackageManagerKind::for_profile(profile.name).binary());
    } else if request.includes_source_builds() {
        binaries.push("git");
    }
    binaries
}

/// Check every binary with `exists`, collecting the missing ones.
pub fn verify_with<F>(binaries: &[&str], exists: F) -> SanityCheckResult
where
    F: Fn(&str) -> bool,
{
    let missing_binaries = binaries
        .iter()
        .copied()
        .filter(|b| !exists(b))
        .map(|b| b.to_string())
        .collect();
    SanityCheckResult { missing_binaries }
}

fn binary_exists(name: &str) -> bool {
    let found = which::which(name);
    if let Ok(ref path) = found {
        debug!("Found {} at {}", name, path.display());
    }
    found.is_ok()
}

/// Verify the host environment for `request`.
pub fn verify_environment(request: &BuildRequest, profile: &PlatformProfile) -> Result<()> {
    let result = verify_with(&required_binaries(request, profile), binary_exists);
    if result.is_ok() {
        return Ok(());
    }

    let message = format!(
        "required binaries not found on PATH: {}",
        result.missing_binaries.join(", ")
    );
    if request.dry_run {
        warn!("{} (ignored in dry-run mode)", message);
        Ok(())
    } else {
        Err(BuildEnvError::preflight(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Step;
    use crate::dependencies::Dependency;
    use crate::profiles::{DEBIAN, MACOSX};

    fn request(steps: Vec<Step>, dry_run: bool) -> BuildRequest {
        BuildRequest {
            platform: None,
            architecture: None,
            prefix: None,
            steps,
            dry_run,
            fail_fast: false,
            print_profile: false,
        }
    }

    #[test]
    fn test_system_step_needs_package_manager() {
        let req = request(vec![Step::System, Step::Build(Dependency::JsonC)], false);
        assert_eq!(required_binaries(&req, &DEBIAN), ["apt-get"]);
        assert_eq!(required_binaries(&req, &MACOSX), ["port"]);
    }

    #[test]
    fn test_source_builds_alone_need_git() {
        let req = request(vec![Step::Build(Dependency::Tinyxml2)], false);
        assert_eq!(required_binaries(&req, &DEBIAN), ["git"]);
    }

    #[test]
    fn test_nothing_selected_needs_nothing() {
        let req = request(vec![], false);
        assert!(required_binaries(&req, &DEBIAN).is_empty());
        assert!(verify_environment(&req, &DEBIAN).is_ok());
    }

    #[test]
    fn test_verify_with_collects_missing() {
        let result = verify_with(&["apt-get", "git"], |b| b == "git");
        assert!(!result.is_ok());
        assert_eq!(result.missing_binaries, ["apt-get"]);
    }

    #[test]
    fn test_dry_run_downgrades_failure() {
        let req = request(vec![Step::Build(Dependency::Tinyxml2)], true);
        // git may or may not exist on the test host; either way dry-run passes
        assert!(verify_environment(&req, &DEBIAN).is_ok());
    }
}
