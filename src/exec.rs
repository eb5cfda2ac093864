//! Subprocess execution
//!
//! Every external program this tool starts (package managers, git, cmake,
//! make) goes through a `CommandRunner`. `SystemRunner` is the real one:
//!
//! - Logs the exact argv before spawning
//! - Spawns in a new process group and registers the PID for signal cleanup
//! - Streams stdout and stderr live, keeping stderr for error reporting
//! - In dry-run mode, logs the command and reports success without spawning

use crate::error::{BuildEnvError, Result};
use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Number of trailing stderr lines kept in a `BuildEnvError::Command`
const STDERR_TAIL_LINES: usize = 20;

/// A program invocation: argv plus optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Output from a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard error from the command.
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the command exited successfully (exit code 0).
    pub success: bool,
}

impl CommandOutput {
    /// A successful result with no output, as reported by dry runs and fakes.
    pub fn succeeded() -> Self {
        Self {
            stderr: String::new(),
            exit_code: Some(0),
            success: true,
        }
    }

    /// Convert an unsuccessful exit into `BuildEnvError::Command`.
    pub fn ensure_success(&self, program: &str) -> Result<()> {
        if self.success {
            return Ok(());
        }
        let lines: Vec<&str> = self.stderr.trim().lines().collect();
        let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
        Err(BuildEnvError::Command {
            program: program.to_string(),
            code: self.exit_code.unwrap_or(-1),
            stderr: tail,
        })
    }
}

/// Executes commands. A spawn failure is an error; a non-zero exit is not,
/// it is reported through `CommandOutput::success`.
pub trait CommandRunner {
    fn run(&mut self, cmd: &CommandSpec) -> Result<CommandOutput>;

    /// Whether commands are only being logged
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Runs commands on the host.
#[derive(Debug, Default, Clone)]
pub struct SystemRunner {
    dry_run: bool,
}

impl SystemRunner {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, spec: &CommandSpec) -> Result<CommandOutput> {
        if self.dry_run {
            info!("[dry-run] {}", spec);
            return Ok(CommandOutput::succeeded());
        }

        info!("Running: {}", spec);
        if let Some(ref cwd) = spec.cwd {
            debug!("Working directory: {}", cwd.display());
        }

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref cwd) = spec.cwd {
            cmd.current_dir(cwd);
        }
        #[cfg(unix)]
        {
            use crate::process_guard::CommandProcessGroup;
            cmd.in_new_process_group();
        }

        let mut child = cmd.spawn().map_err(|source| BuildEnvError::Spawn {
            program: spec.program.clone(),
            source,
        })?;
        let pid = child.id();
        register_child(pid);

        // Stream stderr on its own thread so diagnostics interleave with stdout
        let stderr_reader = child
            .stderr
            .take()
            .map(|stderr| std::thread::spawn(move || tee_lines(stderr)));

        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines().map_while(std::result::Result::ok) {
                println!("{}", line);
            }
        }

        let status = child.wait();
        unregister_child(pid);
        let status = status?;

        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        let output = CommandOutput {
            stderr,
            exit_code: status.code(),
            success: status.success(),
        };
        if output.success {
            debug!("{} exited successfully", spec.program);
        } else {
            warn!(
                "{} exited with code {}",
                spec.program,
                output.exit_code.unwrap_or(-1)
            );
        }
        Ok(output)
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Echo each line to our stderr as it arrives and return everything read.
fn tee_lines<R: Read>(reader: R) -> String {
    let mut captured = String::new();
    for line in BufReader::new(reader).lines().map_while(std::result::Result::ok) {
        eprintln!("{}", line);
        captured.push_str(&line);
        captured.push('\n');
    }
    captured
}

#[cfg(unix)]
fn register_child(pid: u32) {
    if let Ok(mut registry) = crate::process_guard::ChildRegistry::global().lock() {
        registry.register(pid);
    }
}

#[cfg(unix)]
fn unregister_child(pid: u32) {
    if let Ok(mut registry) = crate::process_guard::ChildRegistry::global().lock() {
        registry.unregister(pid);
    }
}

#[cfg(not(unix))]
fn register_child(_pid: u32) {}

#[cfg(not(unix))]
fn unregister_child(_pid: u32) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_display() {
        let spec = CommandSpec::new("apt-get").args(["install", "-y", "git"]);
        assert_eq!(spec.to_string(), "apt-get install -y git");
    }

    #[test]
    fn test_ensure_success_keeps_stderr_tail() {
        let stderr: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let output = CommandOutput {
            stderr,
            exit_code: Some(2),
            success: false,
        };
        match output.ensure_success("make") {
            Err(BuildEnvError::Command { program, code, stderr }) => {
                assert_eq!(program, "make");
                assert_eq!(code, 2);
                assert_eq!(stderr.lines().count(), STDERR_TAIL_LINES);
                assert!(stderr.ends_with("line 29"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_tee_lines_captures_every_line() {
        let captured = tee_lines("warning: unused\nerror: boom\n".as_bytes());
        assert_eq!(captured, "warning: unused\nerror: boom\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_stderr_streamed_and_kept_for_errors() {
        let mut runner = SystemRunner::new(false);
        let spec = CommandSpec::new("sh").args(["-c", "echo one >&2; echo out; echo two >&2; exit 1"]);
        let output = runner.run(&spec).unwrap();
        assert_eq!(output.stderr, "one\ntwo\n");
        match output.ensure_success("sh") {
            Err(BuildEnvError::Command { stderr, .. }) => assert_eq!(stderr, "one\ntwo"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_dry_run_does_not_spawn() {
        let mut runner = SystemRunner::new(true);
        let spec = CommandSpec::new("definitely-not-a-real-binary-12345");
        let output = runner.run(&spec).unwrap();
        assert!(output.success);
        assert!(runner.is_dry_run());
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let mut runner = SystemRunner::new(false);
        let spec = CommandSpec::new("definitely-not-a-real-binary-12345");
        assert!(matches!(runner.run(&spec), Err(BuildEnvError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_reported_not_raised() {
        let mut runner = SystemRunner::new(false);
        let spec = CommandSpec::new("sh").args(["-c", "echo boom >&2; exit 3"]);
        let output = runner.run(&spec).unwrap();
        assert!(!output.success);
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stderr.trim(), "boom");
    }
}
