//! Shared helpers for integration tests
//!
//! Builds a throwaway data directory holding a shell script in place of lpac.

#![allow(dead_code)]

use lpac_bridge::BridgeConfig;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A fake lpac installed in its own data directory
pub struct FakeLpac {
    /// Keeps the directory alive for the duration of the test
    pub dir: TempDir,
    pub config: BridgeConfig,
}

/// Install `script` as the lpac binary of a fresh data directory
///
/// The script runs under `/bin/sh` with `PATH` passed through so it can call
/// `sleep` and friends despite lpac's cleared environment.
pub fn fake_lpac(script: &str) -> FakeLpac {
    init_tracing();

    let dir = tempfile::tempdir().expect("create data dir");
    let config = BridgeConfig::new(dir.path())
        .with_env("PATH", std::env::var("PATH").unwrap_or_default());

    let program = config.program();
    std::fs::write(&program, format!("#!/bin/sh\n{script}\n")).expect("write fake lpac");
    std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755))
        .expect("make fake lpac executable");

    FakeLpac { dir, config }
}

/// Log output captured from a thread-local subscriber
///
/// Works with the default current-thread test runtime, where spawned tasks
/// are polled on the thread that installed the subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Capture everything at debug and above until the guard is dropped
    pub fn install(&self) -> DefaultGuard {
        let logs = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || logs.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Poll until `needle` shows up, giving background tasks time to log
    pub async fn wait_for(&self, needle: &str) -> bool {
        for _ in 0..250 {
            if self.contents().contains(needle) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
