//! Process supervisor
//!
//! [`Cmder`] runs one lpac command at a time against a shared card transport.
//! A run holds the transport's lock for its whole duration, spawns lpac,
//! drives a [`Session`] over its stdio and returns once lpac closes its
//! output. Exit status is only logged; the `lpa` message decides the outcome.
//!
//! Each run gets its own cancellation signal. [`Terminator::terminate`] reaches
//! only the run in flight, and a run that ends early interrupts the lpac it
//! left behind.

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::session::{ProgressCallback, Session};
use lpac_transport::{Apdu, ProcessHandle, SpawnedProcess};
use serde::de::{DeserializeOwned, IgnoredAny};
use std::process::ExitStatus;
use std::sync::{Arc, MutexGuard, PoisonError};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, warn};

/// Runs lpac commands against a card transport
pub struct Cmder<A> {
    transport: Arc<Mutex<A>>,
    config: Arc<BridgeConfig>,
    terminator: Terminator,
}

impl<A> Clone for Cmder<A> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
            terminator: self.terminator.clone(),
        }
    }
}

impl<A: Apdu> Cmder<A> {
    /// Create a supervisor over a shared transport
    ///
    /// Every `Cmder` built on the same `transport` serializes its commands
    /// through that transport's lock.
    pub fn new(transport: Arc<Mutex<A>>, config: BridgeConfig) -> Self {
        Self {
            transport,
            config: Arc::new(config),
            terminator: Terminator::new(),
        }
    }

    /// The shared transport
    pub fn transport(&self) -> &Arc<Mutex<A>> {
        &self.transport
    }

    /// The configuration lpac is started with
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Run lpac with `args`
    ///
    /// On success the result data is deserialized into `dst` when one is
    /// given. `progress` is called for every progress message; if it returns
    /// an error the command is abandoned with [`BridgeError::Progress`].
    ///
    /// Returns once lpac closes its output. The process itself is reaped in
    /// the background; if the run ends with an error it is interrupted first.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::Spawn`] if lpac could not be started
    /// - [`BridgeError::Protocol`] if lpac printed a malformed line
    /// - [`BridgeError::Transport`] if an APDU exchange or a pipe failed
    /// - [`BridgeError::Lpa`] if lpac reported a failure
    /// - [`BridgeError::Destination`] if the result did not fit `dst`
    /// - [`BridgeError::Progress`] if the callback aborted
    pub async fn run<I, S, T>(
        &self,
        args: I,
        dst: Option<&mut T>,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: DeserializeOwned,
    {
        let process_config = self.config.process_config(args);

        let mut transport = self.transport.lock().await;
        debug!(args = ?process_config.args, "acquired APDU transport");

        let mut run = self.terminator.begin();

        let SpawnedProcess {
            handle,
            mut stdin,
            mut stdout,
        } = ProcessHandle::spawn(process_config)
            .await
            .map_err(BridgeError::Spawn)?;

        tokio::spawn(supervise(handle, run.signal()));

        let result = Session::new(&mut *transport, dst, progress)
            .drive(&mut stdout, &mut stdin)
            .await;

        match &result {
            Ok(()) => run.finish(),
            Err(e) => debug!(error = %e, "lpac session aborted, interrupting lpac"),
        }
        result
    }

    /// Run lpac for its side effect, discarding any result data
    pub async fn execute<I, S>(&self, args: I, progress: Option<ProgressCallback<'_>>) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run::<_, _, IgnoredAny>(args, None, progress).await
    }

    /// Run lpac and deserialize its result data into `T`
    ///
    /// # Errors
    ///
    /// In addition to the errors of [`Cmder::run`], returns
    /// [`BridgeError::MissingResponse`] if lpac exited without result data.
    pub async fn query<T, I, S>(&self, args: I, progress: Option<ProgressCallback<'_>>) -> Result<T>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut result: Option<T> = None;
        self.run(args, Some(&mut result), progress).await?;
        result.ok_or(BridgeError::MissingResponse)
    }

    /// Interrupt the running command
    ///
    /// Non-blocking. A request made while no command is running is dropped;
    /// repeated requests during one command collapse into one.
    pub fn terminate(&self) {
        self.terminator.terminate();
    }

    /// Handle for interrupting commands from another task
    pub fn terminator(&self) -> Terminator {
        self.terminator.clone()
    }
}

/// Cloneable cancellation handle for a [`Cmder`]
#[derive(Debug, Clone, Default)]
pub struct Terminator {
    /// Signal of the run in flight, if any
    active: Arc<std::sync::Mutex<Option<Arc<Notify>>>>,
}

impl Terminator {
    fn new() -> Self {
        Self::default()
    }

    /// Request an interrupt of the running command
    pub fn terminate(&self) {
        match self.slot().as_ref() {
            Some(signal) => signal.notify_one(),
            None => debug!("no lpac command running, ignoring terminate"),
        }
    }

    /// Whether a command is currently running
    pub fn is_active(&self) -> bool {
        self.slot().is_some()
    }

    /// Install a fresh signal for a new run
    fn begin(&self) -> ActiveRun {
        let signal = Arc::new(Notify::new());
        *self.slot() = Some(Arc::clone(&signal));
        ActiveRun {
            terminator: self.clone(),
            signal,
            finished: false,
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<Notify>>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cancellation scope of one run
///
/// Dropping it detaches the run from its [`Terminator`]. Unless the run was
/// marked finished, the drop also signals its lpac to stop.
struct ActiveRun {
    terminator: Terminator,
    signal: Arc<Notify>,
    finished: bool,
}

impl ActiveRun {
    fn signal(&self) -> Arc<Notify> {
        Arc::clone(&self.signal)
    }

    /// lpac closed its output on its own; leave it to exit
    fn finish(&mut self) {
        self.finished = true;
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        {
            let mut slot = self.terminator.slot();
            if slot.as_ref().is_some_and(|s| Arc::ptr_eq(s, &self.signal)) {
                *slot = None;
            }
        }
        if !self.finished {
            self.signal.notify_one();
        }
    }
}

enum ProcessEvent {
    Exited(lpac_transport::Result<ExitStatus>),
    Terminate,
}

/// Reap lpac, interrupting it if termination is requested first
async fn supervise(mut process: ProcessHandle, signal: Arc<Notify>) {
    let pid = process.id();
    let mut interrupted = false;

    loop {
        let event = tokio::select! {
            status = process.wait() => ProcessEvent::Exited(status),
            () = signal.notified(), if !interrupted => ProcessEvent::Terminate,
        };

        match event {
            ProcessEvent::Terminate => {
                interrupted = true;
                debug!(pid = ?pid, "interrupting lpac");
                if let Err(e) = process.interrupt() {
                    warn!(pid = ?pid, error = %e, "failed to interrupt lpac");
                }
            }
            ProcessEvent::Exited(Ok(status)) => {
                if status.success() {
                    debug!(pid = ?pid, "lpac exited");
                } else if interrupted || ProcessHandle::is_interrupt(&status) {
                    debug!(pid = ?pid, %status, "lpac interrupted");
                } else {
                    error!(pid = ?pid, %status, "lpac command error");
                }
                return;
            }
            ProcessEvent::Exited(Err(e)) => {
                error!(pid = ?pid, error = %e, "failed to wait for lpac");
                return;
            }
        }
    }
}
