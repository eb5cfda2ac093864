//! Platform profiles.
//!
//! Each supported target environment owns two fixed package lists:
//! toolchain essentials (`required_packages`) and native-build
//! dependencies (`build_packages`). The lists are compile-time constants
//! and are never mutated.
//!
//! # Supported Profiles
//!
//! | Profile   | Package manager |
//! |-----------|-----------------|
//! | Debian    | apt-get |
//! | RedHat    | yum |
//! | Arch      | pacman |
//! | FreeBSD   | pkg |
//! | MacOSX    | port |
//! | Windows64 | pacman (MSYS2, mingw-w64-x86_64) |
//! | Windows32 | pacman (MSYS2, mingw-w64-i686) |

use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Identifier of a supported platform profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProfileName {
    Debian,
    RedHat,
    Arch,
    FreeBsd,
    MacOsx,
    Windows64,
    Windows32,
}

/// One supported target environment and its two package lists.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct PlatformProfile {
    pub name: ProfileName,
    pub required_packages: &'static [&'static str],
    pub build_packages: &'static [&'static str],
}

impl PlatformProfile {
    /// Required packages followed by build packages, each list in its own order.
    pub fn all_packages(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.required_packages
            .iter()
            .chain(self.build_packages.iter())
            .copied()
    }
}

pub static DEBIAN: PlatformProfile = PlatformProfile {
    name: ProfileName::Debian,
    required_packages: &[
        "git",
        "gcc",
        "g++",
        "make",
        "ninja-build",
        "cmake",
        "python3-pip",
    ],
    build_packages: &["autoconf", "automake", "libtool", "pkg-config", "libudev-dev"],
};

pub static RED_HAT: PlatformProfile = PlatformProfile {
    name: ProfileName::RedHat,
    required_packages: &[
        "git",
        "gcc",
        "gcc-c++",
        "make",
        "ninja-build",
        "cmake",
        "python3-pip",
    ],
    build_packages: &["autoconf", "automake", "libtool", "pkgconfig", "libudev-devel"],
};

pub static ARCH: PlatformProfile = PlatformProfile {
    name: ProfileName::Arch,
    required_packages: &["git", "gcc", "make", "ninja", "cmake", "python3-pip"],
    build_packages: &["autoconf", "automake", "libtool", "pkgconfig", "udev"],
};

pub static FREEBSD: PlatformProfile = PlatformProfile {
    name: ProfileName::FreeBsd,
    required_packages: &[
        "git",
        "yasm",
        "nasm",
        "gcc",
        "make",
        "ninja",
        "cmake",
        "python3-pip",
    ],
    build_packages: &["autoconf", "automake", "libtool", "pkgconfig", "libudev-devd"],
};

pub static MACOSX: PlatformProfile = PlatformProfile {
    name: ProfileName::MacOsx,
    required_packages: &["git", "make", "ninja", "cmake", "python3-pip"],
    build_packages: &["autoconf", "automake", "libtool", "pkgconfig"],
};

pub static WINDOWS64: PlatformProfile = PlatformProfile {
    name: ProfileName::Windows64,
    required_packages: &[
        "git",
        "mingw-w64-x86_64-gcc",
        "make",
        "mingw-w64-x86_64-ninja",
        "mingw-w64-x86_64-cmake",
        "mingw-w64-x86_64-python3-pip",
        "mingw-w64-x86_64-pkg-config",
    ],
    build_packages: &[],
};

pub static WINDOWS32: PlatformProfile = PlatformProfile {
    name: ProfileName::Windows32,
    required_packages: &[
        "git",
        "mingw-w64-i686-gcc",
        "make",
        "mingw-w64-i686-ninja",
        "mingw-w64-i686-cmake",
        "mingw-w64-i686-python3-pip",
        "mingw-w64-i686-pkg-config",
    ],
    build_packages: &[],
};

impl ProfileName {
    /// The static profile for this name.
    pub fn profile(self) -> &'static PlatformProfile {
        match self {
            ProfileName::Debian => &DEBIAN,
            ProfileName::RedHat => &RED_HAT,
            ProfileName::Arch => &ARCH,
            ProfileName::FreeBsd => &FREEBSD,
            ProfileName::MacOsx => &MACOSX,
            ProfileName::Windows64 => &WINDOWS64,
            ProfileName::Windows32 => &WINDOWS32,
        }
    }
}

/// Every defined profile, in declaration order.
pub fn all_profiles() -> impl Iterator<Item = &'static PlatformProfile> {
    ProfileName::iter().map(ProfileName::profile)
}
