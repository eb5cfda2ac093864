//! Third-party source dependencies built from git.
//!
//! Two groups: general libraries (json-c, tinyxml2, libev) gated by
//! `--install-other-packages`, and FastoGT libraries (common,
//! fastotv_protocol) gated by `--install-fastogt-packages`.

use crate::source_build::BuildSystem;
use strum::{Display, EnumIter};

pub const JSONC_URL: &str = "https://github.com/fastogt/json-c";
pub const TINYXML2_URL: &str = "https://github.com/leethomason/tinyxml2";
pub const LIBEV_URL: &str = "https://github.com/fastogt/libev";
pub const COMMON_URL: &str = "https://github.com/fastogt/common";
pub const FASTOTV_PROTOCOL_URL: &str = "https://github.com/fastogt/fastotv_protocol";

/// A named dependency with a fixed repository and build recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Dependency {
    #[strum(serialize = "json-c")]
    JsonC,
    #[strum(serialize = "tinyxml2")]
    Tinyxml2,
    #[strum(serialize = "libev")]
    Libev,
    #[strum(serialize = "common")]
    Common,
    #[strum(serialize = "fastotv_protocol")]
    FastotvProtocol,
}

impl Dependency {
    pub fn url(self) -> &'static str {
        match self {
            Self::JsonC => JSONC_URL,
            Self::Tinyxml2 => TINYXML2_URL,
            Self::Libev => LIBEV_URL,
            Self::Common => COMMON_URL,
            Self::FastotvProtocol => FASTOTV_PROTOCOL_URL,
        }
    }

    pub fn build_system(self) -> BuildSystem {
        match self {
            Self::Libev => BuildSystem::Autotools,
            _ => BuildSystem::CMake,
        }
    }

    /// Flags passed to the configure step. tinyxml2 and fastotv_protocol build with none.
    pub fn default_flags(self) -> &'static [&'static str] {
        match self {
            Self::JsonC => &["-DBUILD_SHARED_LIBS=OFF", "-DBUILD_TESTING=OFF"],
            Self::Tinyxml2 => &[],
            Self::Libev => &["--with-pic", "--disable-shared", "--enable-static"],
            Self::Common => &["-DJSON_ENABLED=ON"],
            Self::FastotvProtocol => &[],
        }
    }

    /// True for the FastoGT ecosystem libraries
    pub fn is_fastogt(self) -> bool {
        matches!(self, Self::Common | Self::FastotvProtocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_tinyxml2_builds_without_flags() {
        assert!(Dependency::Tinyxml2.default_flags().is_empty());
        assert_eq!(Dependency::Tinyxml2.url(), "https://github.com/leethomason/tinyxml2");
        assert_eq!(Dependency::Tinyxml2.build_system(), BuildSystem::CMake);
    }

    #[test]
    fn test_only_libev_uses_autotools() {
        let autotools: Vec<Dependency> = Dependency::iter()
            .filter(|d| d.build_system() == BuildSystem::Autotools)
            .collect();
        assert_eq!(autotools, [Dependency::Libev]);
    }

    #[test]
    fn test_fastogt_group() {
        let fastogt: Vec<String> = Dependency::iter()
            .filter(|d| d.is_fastogt())
            .map(|d| d.to_string())
            .collect();
        assert_eq!(fastogt, ["common", "fastotv_protocol"]);
    }
}
