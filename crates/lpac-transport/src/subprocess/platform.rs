//! Platform hooks for spawning and interrupting lpac

use std::io;
use std::process::ExitStatus;
use tokio::process::{Child, Command};

pub use imp::{BINARY_NAME, configure, interrupt, is_interrupt};

#[cfg(unix)]
mod imp {
    use super::*;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;
    use std::os::unix::process::ExitStatusExt;

    /// File name of the lpac executable
    pub const BINARY_NAME: &str = "lpac";

    /// Put the child in its own process group so an interrupt reaches
    /// everything lpac started, and nothing of ours
    pub fn configure(cmd: &mut Command) {
        cmd.process_group(0);
    }

    /// Send SIGINT to the child's process group
    ///
    /// A child that has already been reaped is left alone.
    pub fn interrupt(child: &mut Child) -> io::Result<()> {
        let Some(pid) = child.id() else {
            return Ok(());
        };
        let pid = i32::try_from(pid)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;

        // Negative PID addresses the whole group; the child leads it
        kill(Pid::from_raw(-pid), Signal::SIGINT).map_err(io::Error::from)
    }

    /// Whether the child died from the signal [`interrupt`] sends
    pub fn is_interrupt(status: &ExitStatus) -> bool {
        status.signal() == Some(Signal::SIGINT as i32)
    }
}

#[cfg(not(unix))]
mod imp {
    use super::*;

    /// File name of the lpac executable
    #[cfg(windows)]
    pub const BINARY_NAME: &str = "lpac.exe";

    /// File name of the lpac executable
    #[cfg(not(windows))]
    pub const BINARY_NAME: &str = "lpac";

    #[cfg(windows)]
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

    /// Detach the child from our console control group
    pub fn configure(cmd: &mut Command) {
        #[cfg(windows)]
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
        #[cfg(not(windows))]
        let _ = cmd;
    }

    /// No graceful interrupt is available here, so kill the child
    pub fn interrupt(child: &mut Child) -> io::Result<()> {
        child.start_kill()
    }

    /// A killed child carries no distinguishing exit status
    pub fn is_interrupt(_status: &ExitStatus) -> bool {
        false
    }
}
