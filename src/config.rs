//! Configuration management for repl-bridge.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::ServerConfig;
use crate::cli::Args;
use crate::execution::ExecutorOptions;
use crate::interpreter::DialectKind;
use crate::session::SessionConfig;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interpreter process settings.
    pub interpreter: InterpreterSection,
    /// Command execution settings.
    pub execution: ExecutionSection,
    /// HTTP server configuration.
    pub server: ServerSection,
    /// Security configuration.
    pub security: SecuritySection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Interpreter configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterSection {
    /// Dialect used to frame commands.
    pub dialect: DialectKind,
    /// Executable to launch instead of the dialect default.
    pub program: Option<String>,
    /// Arguments to pass instead of the dialect default.
    pub args: Option<Vec<String>>,
    /// Working directory of the interpreter.
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables.
    pub env: HashMap<String, String>,
}

/// Execution configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSection {
    /// Timeout applied when a command does not specify one.
    pub default_timeout_secs: u64,
    /// Remove terminal escape sequences from output.
    pub strip_ansi: bool,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            default_timeout_secs: 120,
            strip_ansi: false,
        }
    }
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
        }
    }
}

/// Security configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    /// Authentication settings.
    pub auth: AuthSection,
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// Enable authentication.
    pub enabled: bool,
    /// API keys.
    pub api_keys: Vec<String>,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level or filter directive.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// Unparseable values are ignored.
    pub fn apply_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dialect) = var("REPL_BRIDGE_DIALECT").and_then(|v| v.parse().ok()) {
            self.interpreter.dialect = dialect;
        }

        if let Some(program) = var("REPL_BRIDGE_PROGRAM").filter(|p| !p.is_empty()) {
            self.interpreter.program = Some(program);
        }

        if let Some(secs) = var("REPL_BRIDGE_TIMEOUT").and_then(|v| v.parse().ok()) {
            if secs > 0 {
                self.execution.default_timeout_secs = secs;
            }
        }

        if let Some(host) = var("REPL_BRIDGE_HOST") {
            self.server.host = host;
        }

        if let Some(port) = var("REPL_BRIDGE_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }

        if let Some(key) = var("REPL_BRIDGE_API_KEY").filter(|k| !k.is_empty()) {
            self.security.auth.enabled = true;
            if !self.security.auth.api_keys.contains(&key) {
                self.security.auth.api_keys.push(key);
            }
        }

        if let Some(level) = var("REPL_BRIDGE_LOG_LEVEL").or_else(|| var("RUST_LOG")) {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(dialect) = args.dialect {
            self.interpreter.dialect = dialect;
        }

        if let Some(ref program) = args.program {
            self.interpreter.program = Some(program.clone());
        }

        if let Some(secs) = args.timeout_secs {
            self.execution.default_timeout_secs = secs;
        }

        if args.strip_ansi {
            self.execution.strip_ansi = true;
        }

        if let Some(host) = args.host {
            self.server.host = host.to_string();
        }

        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref key) = args.api_key {
            self.security.auth.enabled = true;
            if !self.security.auth.api_keys.contains(key) {
                self.security.auth.api_keys.push(key.clone());
            }
        }

        if args.no_auth {
            self.security.auth.enabled = false;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Settings for the interpreter session.
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            dialect: self.interpreter.dialect,
            program: self.interpreter.program.clone(),
            args: self.interpreter.args.clone(),
            env: self.interpreter.env.clone(),
            working_dir: self.interpreter.working_dir.clone(),
        }
    }

    /// Settings for the executor.
    pub fn to_executor_options(&self) -> ExecutorOptions {
        ExecutorOptions {
            default_timeout: Duration::from_secs(self.execution.default_timeout_secs.max(1)),
            strip_ansi: self.execution.strip_ansi,
        }
    }

    /// Convert to ServerConfig for the API server.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;

        let mut server_config = ServerConfig::new(host.to_string(), self.server.port);
        if self.security.auth.enabled {
            if self.security.auth.api_keys.is_empty() {
                return Err(ConfigError::MissingApiKey);
            }
            server_config = server_config.with_api_keys(self.security.auth.api_keys.clone());
        }

        Ok(server_config)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid host address.
    InvalidHost(String),
    /// Authentication enabled without any key.
    MissingApiKey,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidHost(host) => write!(f, "invalid host address: {}", host),
            Self::MissingApiKey => write!(f, "authentication enabled but no API key configured"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::ReplBridgeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
