//! Type-safe host facts for build_env
//!
//! Operating system names, Linux distribution families and CPU word sizes
//! are parsed into enums once, at the edge, so the resolver can match on
//! them exhaustively.

use crate::error::{BuildEnvError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// Operating system name as accepted by `--platform`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OsName {
    Linux,
    Freebsd,
    Macosx,
    Windows,
}

impl OsName {
    /// Map the compile-time host OS (`std::env::consts::OS`) to an `OsName`.
    pub fn from_rust_os(os: &str) -> Result<Self> {
        match os {
            "linux" => Ok(Self::Linux),
            "freebsd" => Ok(Self::Freebsd),
            "macos" => Ok(Self::Macosx),
            "windows" => Ok(Self::Windows),
            other => Err(BuildEnvError::unsupported_platform(format!(
                "unknown operating system '{}'",
                other
            ))),
        }
    }

    /// Directory name used for source checkouts: `build_<platform>_env`
    pub fn build_dir_name(self) -> String {
        format!("build_{}_env", self)
    }
}

/// Linux distribution family, classified by package-manager ecosystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum DistroFamily {
    Debian,
    Rhel,
    Arch,
}

/// CPU word size; only Windows profiles depend on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WordSize {
    Bits32,
    Bits64,
}

impl WordSize {
    /// Convert a raw bit width. Anything but 32 or 64 is unsupported.
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            32 => Ok(Self::Bits32),
            64 => Ok(Self::Bits64),
            other => Err(BuildEnvError::unsupported_platform(format!(
                "{}-bit architecture",
                other
            ))),
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Self::Bits32 => 32,
            Self::Bits64 => 64,
        }
    }
}

impl fmt::Display for WordSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// A named CPU architecture with its word size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Architecture {
    name: String,
    word_size: WordSize,
}

// Names as reported by `std::env::consts::ARCH`, `uname -m` and Windows
const ARCH_64: &[&str] = &[
    "x86_64", "amd64", "x64", "aarch64", "arm64", "powerpc64", "ppc64", "ppc64le", "riscv64",
    "s390x", "loongarch64", "mips64", "sparc64",
];

const ARCH_32: &[&str] = &[
    "i386", "i486", "i586", "i686", "x86", "armv6l", "armv7l", "arm", "powerpc", "mips",
];

impl Architecture {
    /// Parse an architecture name such as `x86_64` or `i686`.
    pub fn parse(name: &str) -> Result<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        let word_size = if ARCH_64.contains(&lowered.as_str()) {
            WordSize::Bits64
        } else if ARCH_32.contains(&lowered.as_str()) {
            WordSize::Bits32
        } else {
            return Err(BuildEnvError::unsupported_architecture(name.to_string()));
        };
        Ok(Self {
            name: lowered,
            word_size,
        })
    }

    /// The architecture this binary runs on.
    pub fn host() -> Result<Self> {
        Self::parse(std::env::consts::ARCH)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn word_size(&self) -> WordSize {
        self.word_size
    }

    pub fn bit_width(&self) -> u32 {
        self.word_size.bits()
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.word_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_os_name_parse() {
        assert_eq!(OsName::from_str("linux").unwrap(), OsName::Linux);
        assert_eq!(OsName::from_str("MacOSX").unwrap(), OsName::Macosx);
        assert_eq!(OsName::Windows.to_string(), "windows");
        assert!(OsName::from_str("solaris").is_err());
    }

    #[test]
    fn test_os_name_from_rust_os() {
        assert_eq!(OsName::from_rust_os("macos").unwrap(), OsName::Macosx);
        assert!(OsName::from_rust_os("haiku").unwrap_err().is_unsupported_platform());
    }

    #[test]
    fn test_build_dir_name() {
        assert_eq!(OsName::Linux.build_dir_name(), "build_linux_env");
    }

    #[test]
    fn test_distro_family_parse() {
        assert_eq!(DistroFamily::from_str("DEBIAN").unwrap(), DistroFamily::Debian);
        assert_eq!(DistroFamily::from_str("rhel").unwrap(), DistroFamily::Rhel);
        assert_eq!(DistroFamily::Arch.to_string(), "ARCH");
        assert!(DistroFamily::from_str("GENTOO").is_err());
    }

    #[test]
    fn test_word_size_from_bits() {
        assert_eq!(WordSize::from_bits(32).unwrap(), WordSize::Bits32);
        assert_eq!(WordSize::from_bits(64).unwrap(), WordSize::Bits64);
        assert!(WordSize::from_bits(16).is_err());
    }

    #[test]
    fn test_architecture_parse() {
        let arch = Architecture::parse("x86_64").unwrap();
        assert_eq!(arch.bit_width(), 64);
        assert_eq!(arch.name(), "x86_64");

        let arch = Architecture::parse("I686").unwrap();
        assert_eq!(arch.word_size(), WordSize::Bits32);
        assert_eq!(arch.to_string(), "i686 (32-bit)");

        assert_eq!(Architecture::parse("powerpc64").unwrap().bit_width(), 64);

        assert!(matches!(
            Architecture::parse("sparc"),
            Err(BuildEnvError::UnsupportedArchitecture(_))
        ));
    }
}
