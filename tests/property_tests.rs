//! Property-Based Tests for build_env
//!
//! Uses proptest for resolver invariants:
//! - Supported combinations always resolve, unsupported ones never do
//! - Every profile has required packages
//! - Parsed enums round-trip through Display

use build_env::{resolve, BuildEnvError, DistroFamily, OsName, ProfileName};
use proptest::prelude::*;
use std::str::FromStr;

/// Strategy for generating supported (os, distro, bits) combinations
fn supported_strategy() -> impl Strategy<Value = (&'static str, Option<&'static str>, Option<u32>, ProfileName)> {
    prop_oneof![
        Just(("linux", Some("DEBIAN"), None, ProfileName::Debian)),
        Just(("linux", Some("RHEL"), None, ProfileName::RedHat)),
        Just(("linux", Some("ARCH"), None, ProfileName::Arch)),
        Just(("freebsd", None, None, ProfileName::FreeBsd)),
        Just(("macosx", None, None, ProfileName::MacOsx)),
        Just(("windows", None, Some(64), ProfileName::Windows64)),
        Just(("windows", None, Some(32), ProfileName::Windows32)),
    ]
}

fn os_strategy() -> impl Strategy<Value = OsName> {
    prop_oneof![
        Just(OsName::Linux),
        Just(OsName::Freebsd),
        Just(OsName::Macosx),
        Just(OsName::Windows),
    ]
}

proptest! {
    /// Supported combinations resolve to the expected profile
    #[test]
    fn supported_combinations_resolve((os, distro, bits, expected) in supported_strategy()) {
        let profile = resolve(os, distro, bits).expect("should resolve");
        prop_assert_eq!(profile.name, expected);
        prop_assert!(!profile.required_packages.is_empty());
    }

    /// Windows with any bit width but 32 or 64 is unsupported
    #[test]
    fn windows_rejects_other_bit_widths(bits in any::<u32>().prop_filter("not 32/64", |b| *b != 32 && *b != 64)) {
        let err = resolve("windows", None, Some(bits)).unwrap_err();
        prop_assert!(matches!(err, BuildEnvError::UnsupportedPlatform(_)));
    }

    /// Unrecognized distribution families never produce a profile
    #[test]
    fn unknown_distributions_fail(distro in "[A-Z]{3,10}") {
        prop_assume!(DistroFamily::from_str(&distro).is_err());
        let err = resolve("linux", Some(&distro), None).unwrap_err();
        prop_assert!(matches!(err, BuildEnvError::UnsupportedPlatform(_)));
    }

    /// Unknown OS names never produce a profile
    #[test]
    fn unknown_os_names_fail(os in "[a-z]{1,12}") {
        prop_assume!(OsName::from_str(&os).is_err());
        prop_assert!(resolve(&os, Some("DEBIAN"), Some(64)).is_err());
    }

    /// OsName: to_string → parse round-trip is identity
    #[test]
    fn os_name_roundtrip(os in os_strategy()) {
        let parsed = OsName::from_str(&os.to_string()).expect("should parse");
        prop_assert_eq!(os, parsed);
    }
}
