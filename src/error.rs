//! Error handling module for build_env
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Platform resolution failures are fatal and surface unchanged to `main`.

use thiserror::Error;

/// Main error type for build_env
#[derive(Error, Debug)]
pub enum BuildEnvError {
    /// No profile exists for the (OS, distribution, architecture) combination
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Architecture name could not be mapped to a word size
    #[error("Unsupported architecture: {0}")]
    UnsupportedArchitecture(String),

    /// A subprocess ran but exited unsuccessfully
    #[error("Command `{program}` failed (exit code {code}): {stderr}")]
    Command {
        program: String,
        code: i32,
        stderr: String,
    },

    /// A subprocess could not be started at all
    #[error("Failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Environment checks that run before anything else
    #[error("Preflight check failed: {0}")]
    Preflight(String),

    /// IO errors (build directories, symlinks, os-release)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for build_env operations
pub type Result<T> = std::result::Result<T, BuildEnvError>;

// Convenient error constructors
impl BuildEnvError {
    /// Create an unsupported platform error
    pub fn unsupported_platform(msg: impl Into<String>) -> Self {
        Self::UnsupportedPlatform(msg.into())
    }

    /// Create an unsupported architecture error
    pub fn unsupported_architecture(msg: impl Into<String>) -> Self {
        Self::UnsupportedArchitecture(msg.into())
    }

    /// Create a preflight error
    pub fn preflight(msg: impl Into<String>) -> Self {
        Self::Preflight(msg.into())
    }

    /// Returns true for the platform-resolution family of errors
    pub fn is_unsupported_platform(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPlatform(_) | Self::UnsupportedArchitecture(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BuildEnvError::unsupported_platform("linux/GENTOO");
        assert_eq!(err.to_string(), "Unsupported platform: linux/GENTOO");

        let err = BuildEnvError::Command {
            program: "apt-get".to_string(),
            code: 100,
            stderr: "E: Unable to locate package".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command `apt-get` failed (exit code 100): E: Unable to locate package"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BuildEnvError = io_err.into();
        assert!(matches!(err, BuildEnvError::Io(_)));
    }

    #[test]
    fn test_is_unsupported_platform() {
        assert!(BuildEnvError::unsupported_platform("x").is_unsupported_platform());
        assert!(BuildEnvError::unsupported_architecture("sparc").is_unsupported_platform());
        assert!(!BuildEnvError::preflight("no apt-get").is_unsupported_platform());
    }
}
