//! Server settings: defaults, then an optional TOML file, then environment
//! variables. Command-line flags are layered on top by the binary.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{McpError, McpResult, SERVER_VERSION};

/// Which transport the binary serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    #[serde(alias = "pipe")]
    Stdio,
    /// Stateless HTTP: one POST, one JSON reply.
    #[serde(alias = "single-request-http")]
    Http,
    /// Session-tracking HTTP with SSE-framed replies.
    #[serde(alias = "streaming-http")]
    StreamableHttp,
}

impl Transport {
    pub fn name(&self) -> &'static str {
        match self {
            Transport::Stdio => "stdio",
            Transport::Http => "http",
            Transport::StreamableHttp => "streamable-http",
        }
    }

    pub fn is_http(&self) -> bool {
        !matches!(self, Transport::Stdio)
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Transport {
    type Err = McpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" | "pipe" => Ok(Transport::Stdio),
            "http" | "single-request-http" => Ok(Transport::Http),
            "streamable-http" | "streaming-http" => Ok(Transport::StreamableHttp),
            other => Err(McpError::Config(format!(
                "unknown transport '{other}' (expected stdio, http or streamable-http)"
            ))),
        }
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl Environment {
    pub fn name(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Environment {
    type Err = McpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(McpError::Config(format!("unknown environment '{other}'"))),
        }
    }
}

/// Settings snapshot, built once at startup and shared behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub app_name: String,
    pub version: String,
    pub debug: bool,
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub transport: Transport,
    /// Path of the MCP endpoint on the HTTP transports.
    pub mcp_mount_path: String,
    /// `tracing` filter directive, e.g. `info` or `capability_hub=debug`.
    pub log_level: String,
    /// Root of the file sandbox.
    pub workspace_dir: PathBuf,
    /// Streamable HTTP sessions idle this long are closed.
    pub session_idle_timeout_secs: u64,
    /// Open streamable HTTP sessions; the least recently used is closed
    /// to make room.
    pub max_sessions: usize,
    /// Only its presence is ever reported.
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    /// Only its presence is ever reported.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app_name: "Capability Hub".to_string(),
            version: SERVER_VERSION.to_string(),
            debug: false,
            environment: Environment::Development,
            host: "127.0.0.1".to_string(),
            port: 8000,
            transport: Transport::Stdio,
            mcp_mount_path: "/mcp".to_string(),
            log_level: "info".to_string(),
            workspace_dir: PathBuf::from("workspace"),
            session_idle_timeout_secs: 30 * 60,
            max_sessions: 1024,
            secret_key: None,
            api_key: None,
        }
    }
}

impl ServerConfig {
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn is_testing(&self) -> bool {
        self.environment == Environment::Testing
    }

    /// `host:port` for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> McpResult<Self> {
        toml::from_str(text).map_err(|e| McpError::Config(e.to_string()))
    }

    /// Overlay environment variables, read through `lookup`.
    ///
    /// Recognized: `APP_NAME`, `HOST`, `PORT`, `TRANSPORT`, `ENVIRONMENT`,
    /// `LOG_LEVEL`, `DEBUG`, `WORKSPACE_DIR`, `MCP_MOUNT_PATH`,
    /// `SESSION_IDLE_TIMEOUT`, `MAX_SESSIONS`, `SECRET_KEY`, `API_KEY`.
    pub fn apply_env<F>(&mut self, lookup: F) -> McpResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("APP_NAME") {
            self.app_name = v;
        }
        if let Some(v) = lookup("HOST") {
            self.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.port = v
                .trim()
                .parse()
                .map_err(|_| McpError::Config(format!("PORT must be a port number, got '{v}'")))?;
        }
        if let Some(v) = lookup("TRANSPORT") {
            self.transport = v.parse()?;
        }
        if let Some(v) = lookup("ENVIRONMENT") {
            self.environment = v.parse()?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.log_level = v.to_ascii_lowercase();
        }
        if let Some(v) = lookup("DEBUG") {
            self.debug = matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(v) = lookup("WORKSPACE_DIR") {
            self.workspace_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("MCP_MOUNT_PATH") {
            self.mcp_mount_path = v;
        }
        if let Some(v) = lookup("SESSION_IDLE_TIMEOUT") {
            self.session_idle_timeout_secs = v.trim().parse().map_err(|_| {
                McpError::Config(format!("SESSION_IDLE_TIMEOUT must be seconds, got '{v}'"))
            })?;
        }
        if let Some(v) = lookup("MAX_SESSIONS") {
            self.max_sessions = v.trim().parse().map_err(|_| {
                McpError::Config(format!("MAX_SESSIONS must be a count, got '{v}'"))
            })?;
        }
        if let Some(v) = lookup("SECRET_KEY") {
            self.secret_key = Some(v);
        }
        if let Some(v) = lookup("API_KEY") {
            self.api_key = Some(v);
        }
        Ok(())
    }

    /// Reject settings the transports cannot serve.
    pub fn validate(&self) -> McpResult<()> {
        if !self.mcp_mount_path.starts_with('/') || self.mcp_mount_path.len() < 2 {
            return Err(McpError::Config(format!(
                "mcp_mount_path must be an absolute URL path, got '{}'",
                self.mcp_mount_path
            )));
        }
        if matches!(self.mcp_mount_path.as_str(), "/health" | "/info")
            || self.mcp_mount_path.starts_with("/api/")
        {
            return Err(McpError::Config(format!(
                "mcp_mount_path '{}' collides with a REST route",
                self.mcp_mount_path
            )));
        }
        if self.session_idle_timeout_secs == 0 || self.max_sessions == 0 {
            return Err(McpError::Config(
                "session_idle_timeout_secs and max_sessions must be positive".to_string(),
            ));
        }
        if self.app_name.trim().is_empty() {
            return Err(McpError::Config("app_name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Build the configuration: defaults, then `path` (if given), then the
/// process environment.
pub fn load_config(path: Option<&Path>) -> McpResult<ServerConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                McpError::Config(format!("cannot read {}: {e}", path.display()))
            })?;
            let config = ServerConfig::from_toml(&text)?;
            tracing::debug!("Loaded configuration from {}", path.display());
            config
        }
        None => ServerConfig::default(),
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn transport_aliases() {
        assert_eq!("pipe".parse::<Transport>().unwrap(), Transport::Stdio);
        assert_eq!(
            "single-request-http".parse::<Transport>().unwrap(),
            Transport::Http
        );
        assert_eq!(
            "streaming-http".parse::<Transport>().unwrap(),
            Transport::StreamableHttp
        );
        assert!("carrier-pigeon".parse::<Transport>().is_err());
    }

    #[test]
    fn env_overrides_file() {
        let mut config = ServerConfig::from_toml("port = 9000\ntransport = \"pipe\"").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.transport, Transport::Stdio);

        let env: HashMap<&str, &str> = [("PORT", "9100"), ("TRANSPORT", "http"), ("API_KEY", "k")]
            .into_iter()
            .collect();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.bind_addr(), "127.0.0.1:9100");
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut config = ServerConfig::default();
        assert!(config
            .apply_env(|key| (key == "PORT").then(|| "eighty".to_string()))
            .is_err());
    }

    #[test]
    fn session_limits_must_be_positive() {
        let mut config = ServerConfig::from_toml("max_sessions = 8").unwrap();
        assert_eq!(config.max_sessions, 8);
        assert_eq!(config.session_idle_timeout_secs, 1800);
        assert!(config.validate().is_ok());

        config
            .apply_env(|key| (key == "SESSION_IDLE_TIMEOUT").then(|| "0".to_string()))
            .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn secrets_are_never_serialized() {
        let config = ServerConfig {
            secret_key: Some("hunter2".to_string()),
            ..ServerConfig::default()
        };
        let text = serde_json::to_string(&config).unwrap();
        assert!(!text.contains("hunter2"));
    }
}
