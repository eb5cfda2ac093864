//! Host environment detection
//!
//! Detects the operating system, the Linux distribution family and the CPU
//! architecture. Everything that touches the real machine sits behind the
//! `DistributionDetector` trait so resolution and orchestration can be
//! tested with injected facts.
//!
//! # Design
//!
//! - **Fail Fast**: An unrecognized distribution is an `UnsupportedPlatform`
//!   error at detection time, never a silent "no profile".
//! - **No shelling out**: The distribution comes from `/etc/os-release`.

use crate::error::{BuildEnvError, Result};
use crate::platform::resolver::PlatformSelector;
use crate::types::{Architecture, DistroFamily, OsName};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// Source of host facts.
pub trait DistributionDetector {
    /// Operating system this process runs on.
    fn os_name(&self) -> Result<OsName>;

    /// Linux distribution family. Only called when the OS is linux.
    fn distro_family(&self) -> Result<DistroFamily>;

    /// CPU architecture of the host. Only called when the OS is windows.
    fn architecture(&self) -> Result<Architecture>;
}

/// Detector backed by the running system.
#[derive(Debug, Clone)]
pub struct HostDetector {
    os_release_paths: Vec<PathBuf>,
}

impl Default for HostDetector {
    fn default() -> Self {
        Self {
            os_release_paths: vec![
                PathBuf::from("/etc/os-release"),
                PathBuf::from("/usr/lib/os-release"),
            ],
        }
    }
}

impl HostDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read os-release from explicit locations instead of the standard ones.
    pub fn with_os_release_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            os_release_paths: paths,
        }
    }
}

impl DistributionDetector for HostDetector {
    fn os_name(&self) -> Result<OsName> {
        OsName::from_rust_os(std::env::consts::OS)
    }

    fn distro_family(&self) -> Result<DistroFamily> {
        for path in &self.os_release_paths {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    debug!("Reading distribution info from {}", path.display());
                    let fields = parse_os_release(&content);
                    return classify_distribution(&fields);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(BuildEnvError::unsupported_platform(
            "linux distribution could not be determined (no os-release file)",
        ))
    }

    fn architecture(&self) -> Result<Architecture> {
        Architecture::host()
    }
}

/// Parse `KEY=value` lines of an os-release file, unquoting values.
pub fn parse_os_release(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Map os-release `ID` / `ID_LIKE` to a distribution family.
///
/// `ID` is checked first, then each `ID_LIKE` token in order.
pub fn classify_distribution(fields: &HashMap<String, String>) -> Result<DistroFamily> {
    let id = fields.get("ID").map(String::as_str).unwrap_or("");
    let like = fields.get("ID_LIKE").map(String::as_str).unwrap_or("");

    std::iter::once(id)
        .chain(like.split_whitespace())
        .find_map(family_for_id)
        .ok_or_else(|| {
            let shown = if id.is_empty() { "unknown" } else { id };
            BuildEnvError::unsupported_platform(format!(
                "unknown linux distribution '{}'",
                shown
            ))
        })
}

fn family_for_id(id: &str) -> Option<DistroFamily> {
    match id.to_ascii_lowercase().as_str() {
        "debian" | "ubuntu" | "linuxmint" | "raspbian" | "pop" | "elementary" => {
            Some(DistroFamily::Debian)
        }
        "rhel" | "centos" | "fedora" | "rocky" | "almalinux" | "ol" | "amzn" => {
            Some(DistroFamily::Rhel)
        }
        "arch" | "manjaro" | "endeavouros" | "artix" => Some(DistroFamily::Arch),
        _ => None,
    }
}

/// Aggregated host facts, after command-line overrides.
#[derive(Debug, Clone)]
pub struct HostFacts {
    pub os: OsName,
    /// Present exactly when `os` is linux
    pub distro: Option<DistroFamily>,
    /// Present exactly when `os` is windows
    pub architecture: Option<Architecture>,
}

impl HostFacts {
    /// Collect facts from `detector`, preferring explicit overrides.
    ///
    /// The distribution is only detected for linux, so a non-linux
    /// `--platform` on a linux host never reads os-release. Likewise the
    /// architecture (raw `--architecture` or the host's) is only parsed for
    /// windows, the one family whose profile depends on word size.
    pub fn detect(
        detector: &dyn DistributionDetector,
        platform: Option<OsName>,
        architecture: Option<&str>,
    ) -> Result<Self> {
        let os = match platform {
            Some(os) => os,
            None => detector.os_name()?,
        };
        let distro = match os {
            OsName::Linux => Some(detector.distro_family()?),
            _ => None,
        };
        let architecture = match (os, architecture) {
            (OsName::Windows, Some(name)) => Some(Architecture::parse(name)?),
            (OsName::Windows, None) => Some(detector.architecture()?),
            (_, Some(name)) => {
                debug!("Ignoring --architecture {} for {}", name, os);
                None
            }
            _ => None,
        };

        let facts = Self {
            os,
            distro,
            architecture,
        };
        info!("Host detection: {}", facts);
        Ok(facts)
    }

    pub fn selector(&self) -> Result<PlatformSelector> {
        let word_size = self.architecture.as_ref().map(Architecture::word_size);
        PlatformSelector::new(self.os, self.distro, word_size)
    }
}

impl fmt::Display for HostFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "os={}", self.os)?;
        if let Some(distro) = self.distro {
            write!(f, ", distro={}", distro)?;
        }
        if let Some(ref arch) = self.architecture {
            write!(f, ", arch={}", arch)?;
        }
        Ok(())
    }
}
