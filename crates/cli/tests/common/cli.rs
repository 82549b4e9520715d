//! Helpers for driving the `treewatch` binary
//!
//! The watcher never exits on its own while healthy, so besides the
//! run-to-completion `execute` there is `spawn`, which hands back a running
//! process the test stops once it has made its filesystem changes.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Time given to the watcher to finish its initial walk
pub const SETTLE: Duration = Duration::from_millis(500);

/// CLI command builder with timing
pub struct WatchCommand {
    binary_path: PathBuf,
    args: Vec<String>,
}

impl WatchCommand {
    pub fn new() -> Self {
        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_treewatch")),
            args: Vec::new(),
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Use a config file with no exit delay, written into `dir`
    pub fn fast_exit(&mut self, dir: &Path) -> Result<&mut Self> {
        let path = dir.join("treewatch.toml");
        fs::write(&path, "exit_delay_secs = 0\n").context("Failed to write config")?;
        self.args.push("-c".to_string());
        self.args.push(path.to_string_lossy().into_owned());
        Ok(self)
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .args(&self.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }

    /// Run to completion
    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();
        let output = self.command().output().context("Failed to execute command")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }

    /// Start the watcher and wait for its initial walk
    pub fn spawn(&self) -> Result<RunningWatch> {
        let child = self.command().spawn().context("Failed to spawn command")?;
        thread::sleep(SETTLE);
        Ok(RunningWatch {
            child,
            started: Instant::now(),
        })
    }
}

/// A watcher process started by [`WatchCommand::spawn`]
pub struct RunningWatch {
    child: Child,
    started: Instant,
}

impl RunningWatch {
    /// Let pending events drain, kill the process and collect its output
    pub fn stop(mut self) -> Result<CommandResult> {
        thread::sleep(SETTLE);
        self.child.kill().context("Failed to kill watcher")?;
        let output = self
            .child
            .wait_with_output()
            .context("Failed to wait for watcher")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: self.started.elapsed(),
        })
    }
}

/// Command execution result with timing
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Whether stdout has a line exactly equal to `line`
    pub fn has_line(&self, line: &str) -> bool {
        self.stdout.lines().any(|l| l == line)
    }

    pub fn stdout_lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }
}
