//! Run configuration
//!
//! Turns parsed command-line arguments into a `BuildRequest`: typed
//! platform overrides, the install prefix and the ordered list of steps.

use crate::cli::Cli;
use crate::dependencies::Dependency;
use crate::error::{BuildEnvError, Result};
use crate::types::OsName;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// One unit of work, executed strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Install the profile's system packages, then run fixups
    System,
    /// Clone and build a dependency from source
    Build(Dependency),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system packages"),
            Self::Build(dep) => write!(f, "{}", dep),
        }
    }
}

/// Per-step toggles plus the two master switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepToggles {
    pub system: bool,
    pub json_c: bool,
    pub tinyxml2: bool,
    pub libev: bool,
    pub common: bool,
    pub fastotv_protocol: bool,
    pub install_other_packages: bool,
    pub install_fastogt_packages: bool,
}

impl Default for StepToggles {
    fn default() -> Self {
        Self {
            system: true,
            json_c: true,
            tinyxml2: true,
            libev: true,
            common: true,
            fastotv_protocol: true,
            install_other_packages: true,
            install_fastogt_packages: true,
        }
    }
}

impl StepToggles {
    /// Selected steps in their fixed execution order.
    pub fn steps(&self) -> Vec<Step> {
        let other = self.install_other_packages;
        let fastogt = self.install_fastogt_packages;
        [
            (Step::System, self.system && other),
            (Step::Build(Dependency::JsonC), self.json_c && other),
            (Step::Build(Dependency::Tinyxml2), self.tinyxml2 && other),
            (Step::Build(Dependency::Libev), self.libev && other),
            (Step::Build(Dependency::Common), self.common && fastogt),
            (
                Step::Build(Dependency::FastotvProtocol),
                self.fastotv_protocol && fastogt,
            ),
        ]
        .into_iter()
        .filter_map(|(step, enabled)| enabled.then_some(step))
        .collect()
    }
}

/// Everything a run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// `--platform` override; host-detected when None
    pub platform: Option<OsName>,
    /// Raw `--architecture` override. Parsed only once the platform turns
    /// out to be windows; host-detected when None
    pub architecture: Option<String>,
    pub prefix: Option<PathBuf>,
    pub steps: Vec<Step>,
    pub dry_run: bool,
    pub fail_fast: bool,
    pub print_profile: bool,
}

impl BuildRequest {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let platform = cli
            .platform
            .as_deref()
            .map(|name| {
                OsName::from_str(name).map_err(|_| {
                    BuildEnvError::unsupported_platform(format!(
                        "unknown operating system '{}'",
                        name
                    ))
                })
            })
            .transpose()?;
        let toggles = StepToggles {
            system: cli.system(),
            json_c: cli.json_c(),
            tinyxml2: cli.tinyxml2(),
            libev: cli.libev(),
            common: cli.common(),
            fastotv_protocol: cli.fastotv_protocol(),
            install_other_packages: cli.install_other_packages,
            install_fastogt_packages: cli.install_fastogt_packages,
        };

        Ok(Self {
            platform,
            architecture: cli.architecture.clone(),
            prefix: cli.prefix.clone(),
            steps: toggles.steps(),
            dry_run: cli.dry_run,
            fail_fast: cli.fail_fast,
            print_profile: cli.print_profile,
        })
    }

    pub fn includes_system(&self) -> bool {
        self.steps.contains(&Step::System)
    }

    pub fn includes_source_builds(&self) -> bool {
        self.steps.iter().any(|s| matches!(s, Step::Build(_)))
    }

    /// Checkout directory for source builds, `build_<platform>_env`
    pub fn build_dir(os: OsName) -> PathBuf {
        PathBuf::from(os.build_dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn request(args: &[&str]) -> Result<BuildRequest> {
        let argv = std::iter::once("build_env").chain(args.iter().copied());
        BuildRequest::from_cli(&Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_default_steps_in_order() {
        assert_eq!(
            StepToggles::default().steps(),
            [
                Step::System,
                Step::Build(Dependency::JsonC),
                Step::Build(Dependency::Tinyxml2),
                Step::Build(Dependency::Libev),
                Step::Build(Dependency::Common),
                Step::Build(Dependency::FastotvProtocol),
            ]
        );
    }

    #[test]
    fn test_other_packages_master_switch() {
        let req = request(&["--install-other-packages", "false"]).unwrap();
        assert_eq!(
            req.steps,
            [
                Step::Build(Dependency::Common),
                Step::Build(Dependency::FastotvProtocol),
            ]
        );
        assert!(!req.includes_system());
    }

    #[test]
    fn test_fastogt_master_switch() {
        let req = request(&["--install-fastogt-packages", "0", "--without-libev"]).unwrap();
        assert_eq!(
            req.steps,
            [
                Step::System,
                Step::Build(Dependency::JsonC),
                Step::Build(Dependency::Tinyxml2),
            ]
        );
    }

    #[test]
    fn test_everything_disabled() {
        let req = request(&[
            "--install-other-packages",
            "no",
            "--install-fastogt-packages",
            "no",
        ])
        .unwrap();
        assert!(req.steps.is_empty());
        assert!(!req.includes_source_builds());
    }

    #[test]
    fn test_platform_overrides() {
        let req = request(&["--platform", "windows", "--architecture", "x86_64"]).unwrap();
        assert_eq!(req.platform, Some(OsName::Windows));
        assert_eq!(req.architecture.as_deref(), Some("x86_64"));
    }

    #[test]
    fn test_unknown_platform_is_unsupported() {
        let err = request(&["--platform", "beos"]).unwrap_err();
        assert!(err.is_unsupported_platform());
    }

    #[test]
    fn test_architecture_is_not_parsed_up_front() {
        // Word size only matters for windows; detection validates it there
        let req = request(&["--platform", "linux", "--architecture", "mips64"]).unwrap();
        assert_eq!(req.architecture.as_deref(), Some("mips64"));
        assert!(request(&["--architecture", "pdp11"]).is_ok());
    }

    #[test]
    fn test_build_dir() {
        assert_eq!(
            BuildRequest::build_dir(OsName::Freebsd),
            PathBuf::from("build_freebsd_env")
        );
    }
}
