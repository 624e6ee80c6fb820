//! Bridge configuration

use crate::error::{BridgeError, Result};
use lpac_transport::ProcessConfig;
use lpac_transport::subprocess::platform;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable lpac reads to pick its APDU backend
pub const APDU_BACKEND_VAR: &str = "LPAC_APDU";

/// Backend that routes APDUs over lpac's stdio
pub const APDU_BACKEND_STDIO: &str = "stdio";

/// Where to find lpac and how to start it
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Directory holding the lpac binary; also its working directory
    pub data_dir: PathBuf,

    /// File name of the lpac binary inside `data_dir`
    pub binary: String,

    /// Extra environment for lpac (e.g. `LPAC_HTTP`)
    ///
    /// lpac otherwise starts with an empty environment. `LPAC_APDU` is always
    /// forced to `stdio` regardless of what is set here.
    pub env: HashMap<String, String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            binary: platform::BINARY_NAME.to_string(),
            env: HashMap::new(),
        }
    }
}

impl BridgeConfig {
    /// Configuration for lpac installed in `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// This will look for:
    /// - `LPAC_BRIDGE_DATA_DIR` for the directory holding lpac
    /// - `LPAC_BRIDGE_BINARY` for the binary's file name
    ///
    /// Unset variables keep their defaults; set-but-empty ones are rejected.
    pub fn from_env() -> Result<Self> {
        use std::env;

        let mut config = Self::default();

        if let Ok(data_dir) = env::var("LPAC_BRIDGE_DATA_DIR") {
            if data_dir.trim().is_empty() {
                return Err(BridgeError::Config(
                    "LPAC_BRIDGE_DATA_DIR is empty".to_string(),
                ));
            }
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(binary) = env::var("LPAC_BRIDGE_BINARY") {
            if binary.trim().is_empty() {
                return Err(BridgeError::Config("LPAC_BRIDGE_BINARY is empty".to_string()));
            }
            config.binary = binary;
        }

        Ok(config)
    }

    /// Set the binary's file name
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Pass an extra environment variable to lpac
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Full path of the lpac binary
    pub fn program(&self) -> PathBuf {
        self.data_dir.join(&self.binary)
    }

    /// Directory lpac runs in
    pub fn working_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Process configuration for one invocation with `args`
    pub fn process_config<I, S>(&self, args: I) -> ProcessConfig
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut process = ProcessConfig::new(self.program())
            .with_args(args)
            .with_working_dir(&self.data_dir);
        for (key, value) in &self.env {
            process = process.with_env(key, value);
        }
        process.with_env(APDU_BACKEND_VAR, APDU_BACKEND_STDIO)
    }
}
