//! Native package manager integration
//!
//! `PackageInstaller` is the collaborator the installer hands package names
//! to, one at a time. `SystemPackageManager` implements it by shelling out to
//! the package manager that belongs to the resolved profile.
//!
//! # Failure Policy
//!
//! Owned here, not by the orchestrator. By default a package that fails to
//! install is logged and skipped (best-effort provisioning). With
//! `fail_fast` the first failure aborts the run. A package manager binary
//! that cannot be spawned always aborts.

use crate::error::Result;
use crate::exec::{CommandRunner, CommandSpec};
use crate::profiles::ProfileName;
use strum::Display;
use tracing::{info, warn};

/// Installs one package by name.
pub trait PackageInstaller {
    fn install(&mut self, package: &str) -> Result<()>;
}

/// Host package manager backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PackageManagerKind {
    AptGet,
    Yum,
    Pacman,
    Pkg,
    Port,
    /// pacman running inside an MSYS2 shell
    Msys2Pacman,
}

impl PackageManagerKind {
    pub fn for_profile(profile: ProfileName) -> Self {
        match profile {
            ProfileName::Debian => Self::AptGet,
            ProfileName::RedHat => Self::Yum,
            ProfileName::Arch => Self::Pacman,
            ProfileName::FreeBsd => Self::Pkg,
            ProfileName::MacOsx => Self::Port,
            ProfileName::Windows64 | ProfileName::Windows32 => Self::Msys2Pacman,
        }
    }

    /// Executable that must be on PATH
    pub fn binary(self) -> &'static str {
        match self {
            Self::AptGet => "apt-get",
            Self::Yum => "yum",
            Self::Pacman | Self::Msys2Pacman => "pacman",
            Self::Pkg => "pkg",
            Self::Port => "port",
        }
    }

    /// Non-interactive install command for a single package
    pub fn install_command(self, package: &str) -> CommandSpec {
        let cmd = CommandSpec::new(self.binary());
        match self {
            Self::AptGet | Self::Yum | Self::Pkg => cmd.args(["install", "-y", package]),
            Self::Pacman | Self::Msys2Pacman => cmd.args(["-S", "--noconfirm", "--needed", package]),
            Self::Port => cmd.args(["install", package]),
        }
    }
}

/// `PackageInstaller` backed by the host package manager.
pub struct SystemPackageManager<R> {
    kind: PackageManagerKind,
    runner: R,
    fail_fast: bool,
    failed: Vec<String>,
}

impl<R: CommandRunner> SystemPackageManager<R> {
    pub fn new(kind: PackageManagerKind, runner: R, fail_fast: bool) -> Self {
        Self {
            kind,
            runner,
            fail_fast,
            failed: Vec::new(),
        }
    }

    pub fn kind(&self) -> PackageManagerKind {
        self.kind
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Packages that failed and were skipped under the best-effort policy
    pub fn failed_packages(&self) -> &[String] {
        &self.failed
    }
}

impl<R: CommandRunner> PackageInstaller for SystemPackageManager<R> {
    fn install(&mut self, package: &str) -> Result<()> {
        info!("Installing package {} via {}", package, self.kind);
        let spec = self.kind.install_command(package);
        let output = self.runner.run(&spec)?;

        if output.success {
            return Ok(());
        }
        if self.fail_fast {
            return output.ensure_success(self.kind.binary());
        }
        warn!(
            "Package {} failed to install (exit code {}), continuing",
            package,
            output.exit_code.unwrap_or(-1)
        );
        self.failed.push(package.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildEnvError;
    use crate::exec::CommandOutput;

    /// Records every command and fails the ones whose last arg is in `failing`
    #[derive(Default)]
    struct ScriptedRunner {
        commands: Vec<CommandSpec>,
        failing: Vec<&'static str>,
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&mut self, cmd: &CommandSpec) -> Result<CommandOutput> {
            self.commands.push(cmd.clone());
            let fails = cmd
                .args
                .last()
                .is_some_and(|a| self.failing.contains(&a.as_str()));
            if fails {
                Ok(CommandOutput {
                    stderr: "E: Unable to locate package".to_string(),
                    exit_code: Some(100),
                    success: false,
                })
            } else {
                Ok(CommandOutput::succeeded())
            }
        }
    }

    #[test]
    fn test_install_commands_per_backend() {
        assert_eq!(
            PackageManagerKind::AptGet.install_command("git").to_string(),
            "apt-get install -y git"
        );
        assert_eq!(
            PackageManagerKind::Yum.install_command("gcc-c++").to_string(),
            "yum install -y gcc-c++"
        );
        assert_eq!(
            PackageManagerKind::Pacman.install_command("ninja").to_string(),
            "pacman -S --noconfirm --needed ninja"
        );
        assert_eq!(
            PackageManagerKind::Port.install_command("cmake").to_string(),
            "port install cmake"
        );
        assert_eq!(
            PackageManagerKind::Pkg.install_command("nasm").to_string(),
            "pkg install -y nasm"
        );
    }

    #[test]
    fn test_kind_for_profile() {
        assert_eq!(PackageManagerKind::for_profile(ProfileName::Debian), PackageManagerKind::AptGet);
        assert_eq!(PackageManagerKind::for_profile(ProfileName::RedHat), PackageManagerKind::Yum);
        assert_eq!(
            PackageManagerKind::for_profile(ProfileName::Windows32),
            PackageManagerKind::Msys2Pacman
        );
        assert_eq!(PackageManagerKind::Msys2Pacman.binary(), "pacman");
    }

    #[test]
    fn test_best_effort_continues_after_failure() {
        let runner = ScriptedRunner {
            failing: vec!["libudev-dev"],
            ..Default::default()
        };
        let mut pm = SystemPackageManager::new(PackageManagerKind::AptGet, runner, false);

        pm.install("libudev-dev").unwrap();
        pm.install("git").unwrap();
        assert_eq!(pm.failed_packages(), ["libudev-dev".to_string()]);
        assert_eq!(pm.runner().commands.len(), 2);
    }

    #[test]
    fn test_fail_fast_aborts() {
        let runner = ScriptedRunner {
            failing: vec!["libudev-dev"],
            ..Default::default()
        };
        let mut pm = SystemPackageManager::new(PackageManagerKind::AptGet, runner, true);

        let err = pm.install("libudev-dev").unwrap_err();
        assert!(matches!(err, BuildEnvError::Command { code: 100, .. }));
    }
}
