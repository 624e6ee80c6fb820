//! Process management for the lpac subprocess

use super::platform;
use super::stdio::{LineReader, LineWriter};
use crate::error::{Result, TransportError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tracing::debug;

/// Configuration for spawning an lpac process
#[derive(Clone, Debug, Default)]
pub struct ProcessConfig {
    /// Path to the executable
    pub program: PathBuf,

    /// Arguments to pass, verbatim
    pub args: Vec<String>,

    /// Environment variables to set
    pub env: HashMap<String, String>,

    /// Working directory; inherited when unset
    pub working_dir: Option<PathBuf>,
}

impl ProcessConfig {
    /// Create a new process configuration
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Add an argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add several arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable
    ///
    /// # Security Note
    ///
    /// When the process is spawned, the parent process's environment is cleared
    /// and only the variables explicitly set here are passed to the child process.
    /// This prevents unintended information leakage.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// A freshly spawned process with its stdio split out
#[derive(Debug)]
pub struct SpawnedProcess {
    /// Lifecycle handle
    pub handle: ProcessHandle,

    /// Framed writer on the child's stdin
    pub stdin: LineWriter<ChildStdin>,

    /// Line reader on the child's stdout
    pub stdout: LineReader<ChildStdout>,
}

/// Handle to a running process
///
/// Owns the child for waiting and signalling. Stdio is handed out separately
/// by [`ProcessHandle::spawn`] so the reader, the writer and the reaper can
/// live on different tasks.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
}

impl ProcessHandle {
    /// Spawn a new process
    ///
    /// stderr is drained on a background task and logged at debug level; its
    /// content never decides the outcome of a command.
    ///
    /// # Security
    ///
    /// The spawned process's environment is isolated from the parent process.
    /// Only environment variables explicitly set via [ProcessConfig::with_env]
    /// are passed to the child process.
    pub async fn spawn(config: ProcessConfig) -> Result<SpawnedProcess> {
        let mut cmd = Command::new(&config.program);
        cmd.args(&config.args);

        // SECURITY: Clear inherited environment variables
        // Only explicitly set variables are passed to the child
        cmd.env_clear();
        cmd.envs(&config.env);

        if let Some(dir) = &config.working_dir {
            cmd.current_dir(dir);
        }

        // Configure stdio
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        platform::configure(&mut cmd);

        let mut child = cmd.spawn().map_err(|e| {
            TransportError::Process(format!(
                "Failed to spawn {}: {}",
                config.program.display(),
                e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::Process("Failed to get stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::Process("Failed to get stdout".to_string()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(drain_stderr(stderr, child.id()));
        }

        debug!(
            program = %config.program.display(),
            pid = ?child.id(),
            "spawned subprocess"
        );

        Ok(SpawnedProcess {
            handle: Self { child },
            stdin: LineWriter::new(stdin),
            stdout: LineReader::new(stdout),
        })
    }

    /// OS process id, `None` once the child has been reaped
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the child to exit
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        Ok(self.child.wait().await?)
    }

    /// Interrupt the child (SIGINT to its group on unix, kill elsewhere)
    pub fn interrupt(&mut self) -> Result<()> {
        Ok(platform::interrupt(&mut self.child)?)
    }

    /// Whether `status` is the result of [`ProcessHandle::interrupt`]
    pub fn is_interrupt(status: &ExitStatus) -> bool {
        platform::is_interrupt(status)
    }
}

async fn drain_stderr(stderr: ChildStderr, pid: Option<u32>) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => debug!(pid = ?pid, stderr = %line, "subprocess stderr"),
            Ok(None) => break,
            Err(e) => {
                debug!(pid = ?pid, error = %e, "stopped reading subprocess stderr");
                break;
            }
        }
    }
}
