//! Platform layer: turns host facts into a platform profile.
//!
//! # Modules
//!
//! - `detect`: host detection of OS, Linux distribution family, architecture
//! - `resolver`: pure lookup from a `PlatformSelector` to a `PlatformProfile`

pub mod detect;
pub mod resolver;

pub use detect::{DistributionDetector, HostDetector, HostFacts};
pub use resolver::{resolve, OsFamily, PlatformSelector};
