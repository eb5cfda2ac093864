//! Platform Resolver
//!
//! Maps host facts to exactly one static `PlatformProfile`.
//!
//! # Design
//!
//! - **Pure logic**: No I/O, no side effects. Detection lives in `detect`.
//! - **No silent default**: Every unmatched combination is an
//!   `UnsupportedPlatform` error, raised at the point the fact is parsed.
//!
//! # Resolution Rules
//!
//! | OS        | Extra fact      | Profile |
//! |-----------|-----------------|---------|
//! | linux     | DEBIAN          | Debian |
//! | linux     | RHEL            | RedHat |
//! | linux     | ARCH            | Arch |
//! | freebsd   | any             | FreeBSD |
//! | macosx    | any             | MacOSX |
//! | windows   | 64              | Windows64 |
//! | windows   | 32              | Windows32 |

use crate::error::{BuildEnvError, Result};
use crate::profiles::{PlatformProfile, ProfileName};
use crate::types::{DistroFamily, OsName, WordSize};
use std::fmt;
use std::str::FromStr;

/// Operating system family, with Linux split by distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    LinuxDebian,
    LinuxRedhat,
    LinuxArch,
    Freebsd,
    Macos,
    Windows,
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LinuxDebian => "linux-debian",
            Self::LinuxRedhat => "linux-redhat",
            Self::LinuxArch => "linux-arch",
            Self::Freebsd => "freebsd",
            Self::Macos => "macos",
            Self::Windows => "windows",
        };
        f.write_str(s)
    }
}

/// The runtime input used to choose a profile.
///
/// `word_size` is only meaningful for `OsFamily::Windows`; it is carried
/// for the other families but ignored by `profile_name()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformSelector {
    pub os_family: OsFamily,
    pub word_size: Option<WordSize>,
}

impl PlatformSelector {
    /// Build a selector from typed facts.
    ///
    /// Linux requires a distribution family and Windows requires a word size;
    /// missing facts fail here rather than later.
    pub fn new(
        os: OsName,
        distro: Option<DistroFamily>,
        word_size: Option<WordSize>,
    ) -> Result<Self> {
        let os_family = match os {
            OsName::Linux => match distro {
                Some(DistroFamily::Debian) => OsFamily::LinuxDebian,
                Some(DistroFamily::Rhel) => OsFamily::LinuxRedhat,
                Some(DistroFamily::Arch) => OsFamily::LinuxArch,
                None => {
                    return Err(BuildEnvError::unsupported_platform(
                        "linux without a distribution family",
                    ));
                }
            },
            OsName::Freebsd => OsFamily::Freebsd,
            OsName::Macosx => OsFamily::Macos,
            OsName::Windows => {
                if word_size.is_none() {
                    return Err(BuildEnvError::unsupported_platform(
                        "windows without an architecture bit width",
                    ));
                }
                OsFamily::Windows
            }
        };
        Ok(Self {
            os_family,
            word_size,
        })
    }

    /// Build a selector from raw strings, as they arrive from the command
    /// line or the distribution detector.
    ///
    /// `distro_family` is only consulted for linux, `bit_width` only for windows.
    pub fn from_raw(
        os_name: &str,
        distro_family: Option<&str>,
        bit_width: Option<u32>,
    ) -> Result<Self> {
        let os = OsName::from_str(os_name).map_err(|_| {
            BuildEnvError::unsupported_platform(format!("unknown operating system '{}'", os_name))
        })?;

        let distro = match (os, distro_family) {
            (OsName::Linux, Some(raw)) => Some(DistroFamily::from_str(raw).map_err(|_| {
                BuildEnvError::unsupported_platform(format!(
                    "unknown linux distribution '{}'",
                    raw
                ))
            })?),
            _ => None,
        };

        let word_size = match (os, bit_width) {
            (OsName::Windows, Some(bits)) => Some(WordSize::from_bits(bits)?),
            _ => None,
        };

        Self::new(os, distro, word_size)
    }

    /// The profile this selector maps to.
    pub fn profile_name(&self) -> Result<ProfileName> {
        match self.os_family {
            OsFamily::LinuxDebian => Ok(ProfileName::Debian),
            OsFamily::LinuxRedhat => Ok(ProfileName::RedHat),
            OsFamily::LinuxArch => Ok(ProfileName::Arch),
            OsFamily::Freebsd => Ok(ProfileName::FreeBsd),
            OsFamily::Macos => Ok(ProfileName::MacOsx),
            OsFamily::Windows => match self.word_size {
                Some(WordSize::Bits64) => Ok(ProfileName::Windows64),
                Some(WordSize::Bits32) => Ok(ProfileName::Windows32),
                None => Err(BuildEnvError::unsupported_platform(
                    "windows without an architecture bit width",
                )),
            },
        }
    }

    pub fn profile(&self) -> Result<&'static PlatformProfile> {
        self.profile_name().map(ProfileName::profile)
    }

    /// True when the post-install ninja fixup applies.
    pub fn is_rhel(&self) -> bool {
        self.os_family == OsFamily::LinuxRedhat
    }
}

impl fmt::Display for PlatformSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.os_family, self.word_size) {
            (OsFamily::Windows, Some(ws)) => write!(f, "{} ({})", self.os_family, ws),
            _ => write!(f, "{}", self.os_family),
        }
    }
}

/// Resolve raw host facts to a profile.
///
/// # Errors
///
/// `UnsupportedPlatform` for an unknown OS, an unrecognized Linux
/// distribution family, or a Windows bit width other than 32 or 64.
pub fn resolve(
    os_name: &str,
    distro_family: Option<&str>,
    bit_width: Option<u32>,
) -> Result<&'static PlatformProfile> {
    PlatformSelector::from_raw(os_name, distro_family, bit_width)?.profile()
}
