//! Clone-and-build of third-party sources
//!
//! `SourceBuilder` is the collaborator the installer uses for
//! `build_dependency`. `GitSourceBuilder` clones (or fast-forwards) a
//! repository under the build directory and runs its native build system
//! through configure, build and install.

use crate::error::Result;
use crate::exec::{CommandRunner, CommandSpec};
use std::path::{Path, PathBuf};
use strum::Display;
use tracing::info;

/// Build system a dependency uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum BuildSystem {
    CMake,
    Autotools,
}

/// Out-of-tree CMake build directory, relative to the checkout
const CMAKE_BUILD_DIR: &str = "build_cmake";

/// Clones a repository and builds/installs it.
pub trait SourceBuilder {
    fn clone_and_build(&mut self, url: &str, build_system: BuildSystem, flags: &[String]) -> Result<()>;
}

/// `SourceBuilder` that drives git, cmake and make through a `CommandRunner`.
pub struct GitSourceBuilder<R> {
    build_dir: PathBuf,
    prefix: Option<PathBuf>,
    jobs: usize,
    runner: R,
}

impl<R: CommandRunner> GitSourceBuilder<R> {
    pub fn new(build_dir: impl Into<PathBuf>, prefix: Option<PathBuf>, runner: R) -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            build_dir: build_dir.into(),
            prefix,
            jobs,
            runner,
        }
    }

    /// Override the `make -j` job count.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    fn run(&mut self, spec: CommandSpec) -> Result<()> {
        let program = spec.program.clone();
        self.runner.run(&spec)?.ensure_success(&program)
    }

    fn checkout(&mut self, url: &str) -> Result<PathBuf> {
        if !self.runner.is_dry_run() {
            std::fs::create_dir_all(&self.build_dir)?;
        }
        let dir = self.build_dir.join(checkout_name(url));

        if dir.join(".git").exists() {
            info!("Updating existing checkout {}", dir.display());
            self.run(
                CommandSpec::new("git")
                    .arg("-C")
                    .arg(path_arg(&dir))
                    .args(["pull", "--ff-only"]),
            )?;
        } else {
            info!("Cloning {} into {}", url, dir.display());
            self.run(
                CommandSpec::new("git")
                    .args(["clone", "--depth", "1", url])
                    .arg(path_arg(&dir)),
            )?;
        }
        Ok(dir)
    }

    fn build_cmake(&mut self, src: &Path, flags: &[String]) -> Result<()> {
        let build = src.join(CMAKE_BUILD_DIR);

        let mut configure = CommandSpec::new("cmake")
            .arg("-S")
            .arg(path_arg(src))
            .arg("-B")
            .arg(path_arg(&build))
            .args(["-G", "Ninja", "-DCMAKE_BUILD_TYPE=RELEASE"]);
        if let Some(ref prefix) = self.prefix {
            configure = configure.arg(format!("-DCMAKE_INSTALL_PREFIX={}", prefix.display()));
        }
        self.run(configure.args(flags.iter().cloned()))?;

        self.run(CommandSpec::new("cmake").arg("--build").arg(path_arg(&build)))?;
        self.run(CommandSpec::new("cmake").arg("--install").arg(path_arg(&build)))
    }

    fn build_autotools(&mut self, src: &Path, flags: &[String]) -> Result<()> {
        let bootstrap = if src.join("autogen.sh").exists() {
            CommandSpec::new("sh").arg("autogen.sh")
        } else {
            CommandSpec::new("autoreconf").arg("-fi")
        };
        self.run(bootstrap.current_dir(src))?;

        let mut configure = CommandSpec::new("./configure").current_dir(src);
        if let Some(ref prefix) = self.prefix {
            configure = configure.arg(format!("--prefix={}", prefix.display()));
        }
        self.run(configure.args(flags.iter().cloned()))?;

        let jobs = format!("-j{}", self.jobs);
        self.run(CommandSpec::new("make").arg(jobs).current_dir(src))?;
        self.run(CommandSpec::new("make").arg("install").current_dir(src))
    }
}

impl<R: CommandRunner> SourceBuilder for GitSourceBuilder<R> {
    fn clone_and_build(&mut self, url: &str, build_system: BuildSystem, flags: &[String]) -> Result<()> {
        let src = self.checkout(url)?;
        info!("Building {} with {}", src.display(), build_system);
        match build_system {
            BuildSystem::CMake => self.build_cmake(&src, flags),
            BuildSystem::Autotools => self.build_autotools(&src, flags),
        }
    }
}

/// Last path segment of a repository URL, without a `.git` suffix.
pub fn checkout_name(url: &str) -> &str {
    let last = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(url);
    last.strip_suffix(".git").unwrap_or(last)
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}
