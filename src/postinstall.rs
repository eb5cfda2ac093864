//! Post-install fixups
//!
//! Runs after the system packages are in place. Currently one fixup exists:
//! RHEL-family distributions ship ninja as `ninja-build`, so `ninja` is
//! linked to it (the equivalent of `ln -sf /usr/bin/ninja-build /usr/bin/ninja`).
//!
//! Fixups are idempotent: applying one twice is not an error.

use crate::error::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fixups that can follow a system install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixup {
    /// `/usr/bin/ninja` -> `/usr/bin/ninja-build`
    NinjaSymlink,
}

impl fmt::Display for Fixup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NinjaSymlink => write!(f, "ninja -> ninja-build symlink"),
        }
    }
}

/// What applying a fixup did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixupOutcome {
    Applied(Fixup),
    /// Already in the desired state
    AlreadyPresent(Fixup),
    /// Dry run: logged only
    Skipped(Fixup),
}

impl FixupOutcome {
    pub fn fixup(self) -> Fixup {
        match self {
            Self::Applied(f) | Self::AlreadyPresent(f) | Self::Skipped(f) => f,
        }
    }
}

const NINJA_BUILD: &str = "usr/bin/ninja-build";
const NINJA: &str = "usr/bin/ninja";

/// Apply `fixup` relative to filesystem `root` (`/` outside of tests).
pub fn apply(fixup: Fixup, root: &Path, dry_run: bool) -> Result<FixupOutcome> {
    match fixup {
        Fixup::NinjaSymlink => {
            let target = root.join(NINJA_BUILD);
            let link = root.join(NINJA);
            if dry_run {
                info!("[dry-run] would link {} -> {}", link.display(), target.display());
                return Ok(FixupOutcome::Skipped(fixup));
            }
            force_symlink(&target, &link).map(|created| {
                if created {
                    FixupOutcome::Applied(fixup)
                } else {
                    FixupOutcome::AlreadyPresent(fixup)
                }
            })
        }
    }
}

/// Point `link` at `target`, replacing whatever is there.
///
/// Returns `false` when the link already pointed at `target`.
fn force_symlink(target: &Path, link: &Path) -> Result<bool> {
    if let Ok(existing) = std::fs::read_link(link) {
        if existing == target {
            debug!("{} already links to {}", link.display(), target.display());
            return Ok(false);
        }
    }
    if std::fs::symlink_metadata(link).is_ok() {
        std::fs::remove_file(link)?;
    }
    create_symlink(target, link)?;
    info!("Linked {} -> {}", link.display(), target.display());
    Ok(true)
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

/// Default root for fixups.
pub fn system_root() -> PathBuf {
    PathBuf::from("/")
}
