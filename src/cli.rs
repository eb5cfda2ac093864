use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// build_env - prepare a clean machine for building
///
/// Installs the toolchain packages for the detected platform, then clones
/// and builds third-party dependencies from source.
#[derive(Parser, Debug)]
#[command(name = "build_env")]
#[command(about = "Installs build dependencies for the detected platform")]
#[command(version)]
pub struct Cli {
    /// Install system packages (default)
    #[arg(long, overrides_with = "without_system")]
    pub with_system: bool,
    /// Skip system packages
    #[arg(long, overrides_with = "with_system")]
    pub without_system: bool,

    /// Build json-c (default, version: git master)
    #[arg(long = "with-json-c", overrides_with = "without_json_c")]
    pub with_json_c: bool,
    /// Build without json-c
    #[arg(long = "without-json-c", overrides_with = "with_json_c")]
    pub without_json_c: bool,

    /// Build tinyxml2 (default, version: git master)
    #[arg(long, overrides_with = "without_tinyxml2")]
    pub with_tinyxml2: bool,
    /// Build without tinyxml2
    #[arg(long, overrides_with = "with_tinyxml2")]
    pub without_tinyxml2: bool,

    /// Build libev (default, version: git master)
    #[arg(long, overrides_with = "without_libev")]
    pub with_libev: bool,
    /// Build without libev
    #[arg(long, overrides_with = "with_libev")]
    pub without_libev: bool,

    /// Build common (default, version: git master)
    #[arg(long, overrides_with = "without_common")]
    pub with_common: bool,
    /// Build without common
    #[arg(long, overrides_with = "with_common")]
    pub without_common: bool,

    /// Build fastotv_protocol (default, version: git master)
    #[arg(long, overrides_with = "without_fastotv_protocol")]
    pub with_fastotv_protocol: bool,
    /// Build without fastotv_protocol
    #[arg(long, overrides_with = "with_fastotv_protocol")]
    pub without_fastotv_protocol: bool,

    /// Build for platform: linux, freebsd, macosx, windows (default: host)
    #[arg(long, value_name = "NAME")]
    pub platform: Option<String>,

    /// Architecture, e.g. x86_64 or i686 (default: host)
    #[arg(long, value_name = "NAME")]
    pub architecture: Option<String>,

    /// Install prefix for dependencies built from source
    #[arg(long, value_name = "PATH")]
    pub prefix: Option<PathBuf>,

    /// Install other packages: system, json-c, tinyxml2, libev
    #[arg(long, value_name = "BOOL", default_value = "true", action = ArgAction::Set, value_parser = parse_bool)]
    pub install_other_packages: bool,

    /// Install FastoGT packages: common, fastotv_protocol
    #[arg(long, value_name = "BOOL", default_value = "true", action = ArgAction::Set, value_parser = parse_bool)]
    pub install_fastogt_packages: bool,

    /// Log every command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Abort on the first package that fails to install
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the resolved platform profile as JSON and exit
    #[arg(long)]
    pub print_profile: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn system(&self) -> bool {
        !self.without_system
    }

    pub fn json_c(&self) -> bool {
        !self.without_json_c
    }

    pub fn tinyxml2(&self) -> bool {
        !self.without_tinyxml2
    }

    pub fn libev(&self) -> bool {
        !self.without_libev
    }

    pub fn common(&self) -> bool {
        !self.without_common
    }

    pub fn fastotv_protocol(&self) -> bool {
        !self.without_fastotv_protocol
    }
}

/// Accepts yes/true/t/y/1 and no/false/f/n/0, case-insensitive.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Ok(true),
        "no" | "false" | "f" | "n" | "0" => Ok(false),
        _ => Err(format!("Boolean value expected, got '{}'", value)),
    }
}
