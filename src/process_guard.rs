//! Child process lifecycle for package installs and source builds
//!
//! Every subprocess (package manager, git, cmake, make) runs in its own
//! process group and is tracked in a global registry while it runs. On
//! SIGINT/SIGTERM/SIGHUP the tracked groups receive SIGTERM, then SIGKILL
//! after a grace period, so an interrupted run never leaves a package
//! manager holding its lock in the background.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

static CHILD_REGISTRY: OnceLock<Mutex<ChildRegistry>> = OnceLock::new();

/// Registry tracking running child process groups
#[derive(Debug, Default)]
pub struct ChildRegistry {
    pids: HashSet<u32>,
    /// Set once termination has started; later calls are no-ops
    cleanup_initiated: bool,
}

impl ChildRegistry {
    /// The process-wide registry
    pub fn global() -> &'static Mutex<ChildRegistry> {
        CHILD_REGISTRY.get_or_init(|| Mutex::new(ChildRegistry::default()))
    }

    pub fn register(&mut self, pid: u32) {
        self.pids.insert(pid);
        debug!("Registered child process group {}", pid);
    }

    pub fn unregister(&mut self, pid: u32) {
        self.pids.remove(&pid);
        debug!("Unregistered child process group {}", pid);
    }

    pub fn count(&self) -> usize {
        self.pids.len()
    }

    fn contains(&self, pid: u32) -> bool {
        self.pids.contains(&pid)
    }

    /// Mark termination as started and return the groups to signal.
    ///
    /// Returns nothing once termination has already begun.
    fn begin_termination(&mut self) -> Vec<u32> {
        if self.cleanup_initiated {
            return Vec::new();
        }
        self.cleanup_initiated = true;
        self.pids.iter().copied().collect()
    }
}

/// SIGTERM every group tracked in `registry`, wait up to `grace_period`,
/// then SIGKILL survivors.
///
/// The lock is released while waiting so runners can unregister the
/// children they reap; an unregistered group counts as finished.
pub fn terminate_all(registry: &Mutex<ChildRegistry>, grace_period: Duration) {
    let pids = match registry.lock() {
        Ok(mut guard) => guard.begin_termination(),
        Err(_) => return,
    };
    if pids.is_empty() {
        debug!("No child processes to terminate");
        return;
    }

    info!("Terminating {} child process group(s)", pids.len());
    for &pid in &pids {
        if let Err(e) = signal_group(pid, Signal::SIGTERM) {
            warn!("Failed to send SIGTERM to process group {}: {}", pid, e);
        }
    }

    let start = Instant::now();
    loop {
        let running: Vec<u32> = pids
            .iter()
            .copied()
            .filter(|&pid| group_running(registry, pid))
            .collect();
        if running.is_empty() {
            break;
        }
        if start.elapsed() >= grace_period {
            for pid in running {
                warn!("Process group {} ignored SIGTERM, sending SIGKILL", pid);
                let _ = signal_group(pid, Signal::SIGKILL);
            }
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    if let Ok(mut guard) = registry.lock() {
        for pid in &pids {
            guard.unregister(*pid);
        }
    }
}

fn group_running(registry: &Mutex<ChildRegistry>, pid: u32) -> bool {
    let tracked = registry.lock().map(|r| r.contains(pid)).unwrap_or(true);
    tracked && is_process_alive(pid)
}

/// Negative PID addresses the whole group, so compilers spawned by make die too
fn signal_group(pgid: u32, sig: Signal) -> Result<(), nix::Error> {
    signal::kill(Pid::from_raw(-(pgid as i32)), sig)
}

fn is_process_alive(pid: u32) -> bool {
    if signal::kill(Pid::from_raw(pid as i32), None).is_err() {
        return false;
    }
    !is_zombie(pid)
}

/// Zombies still accept signal 0; /proc tells them apart on linux.
#[cfg(target_os = "linux")]
fn is_zombie(pid: u32) -> bool {
    std::fs::read_to_string(format!("/proc/{}/stat", pid))
        .ok()
        .and_then(|stat| {
            // The state follows the parenthesised command name
            let (_, rest) = stat.rsplit_once(')')?;
            rest.split_whitespace().next().map(|state| matches!(state, "Z" | "X"))
        })
        .unwrap_or(false)
}

/// Without /proc a zombie looks alive until its runner reaps and
/// unregisters it, which `group_running` already checks.
#[cfg(not(target_os = "linux"))]
fn is_zombie(_pid: u32) -> bool {
    false
}

/// Install SIGINT, SIGTERM and SIGHUP handlers that clean up tracked children
/// and exit with 128 + signal number. Call once at program start.
pub fn init_signal_handlers() -> std::io::Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;

    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!("Received signal {}, stopping running steps", sig);
            terminate_all(ChildRegistry::global(), Duration::from_secs(3));
            std::process::exit(128 + sig);
        }
    });

    Ok(())
}

/// Extension trait for std::process::Command to set up process groups
pub trait CommandProcessGroup {
    /// Run the command as the leader of a new process group
    fn in_new_process_group(&mut self) -> &mut Self;
}

impl CommandProcessGroup for std::process::Command {
    fn in_new_process_group(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;
        self.process_group(0)
    }
}
