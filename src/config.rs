//! Gateway configuration
//!
//! One immutable value, loaded from a JSON file and validated once at boot,
//! then shared by `Arc` with every component that needs a setting.
//!
//! ```json
//! {
//!   "server": { "port": 3000 },
//!   "engine": { "url": "ws://127.0.0.1:8020", "debug": false },
//!   "store": { "kind": "kubo", "api_url": "http://127.0.0.1:5001" },
//!   "functions": [ { "module": "functions/qr.wasm" } ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Engine connection and invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// JSON-RPC WebSocket endpoint of the engine
    #[serde(default = "default_engine_url")]
    pub url: String,

    /// Memory budget per invocation, in bytes
    #[serde(default = "default_memory")]
    pub memory: u64,

    /// Time budget per invocation, in milliseconds
    #[serde(default = "default_time")]
    pub time: u64,

    /// Attach a fresh nonce to every invocation so the engine never replays
    #[serde(default)]
    pub debug: bool,

    /// Workflow name used for batch submissions
    #[serde(default = "default_workflow_name")]
    pub workflow_name: String,
}

fn default_engine_url() -> String {
    "ws://127.0.0.1:8020".to_string()
}

fn default_memory() -> u64 {
    4_294_967_296
}

fn default_time() -> u64 {
    100_000
}

fn default_workflow_name() -> String {
    "test".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: default_engine_url(),
            memory: default_memory(),
            time: default_time(),
            debug: false,
            workflow_name: default_workflow_name(),
        }
    }
}

/// Which content store backs function modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// IPFS node over the Kubo RPC API
    Kubo,
    /// Local SHA-256 identifiers, no daemon required
    Digest,
}

/// Content store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_kind")]
    pub kind: StoreKind,

    #[serde(default = "default_store_api_url")]
    pub api_url: String,

    /// URI scheme of resource references, e.g. `ipfs` in `ipfs://<cid>`
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

fn default_store_kind() -> StoreKind {
    StoreKind::Kubo
}

fn default_store_api_url() -> String {
    "http://127.0.0.1:5001".to_string()
}

fn default_scheme() -> String {
    "ipfs".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: default_store_kind(),
            api_url: default_store_api_url(),
            scheme: default_scheme(),
        }
    }
}

/// A compiled module and its declaration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSource {
    /// Path to the compiled module
    pub module: PathBuf,

    /// Path to the declarations (default: module path with `.json` extension)
    #[serde(default)]
    pub declarations: Option<PathBuf>,
}

impl FunctionSource {
    pub fn new(module: impl Into<PathBuf>) -> Self {
        Self {
            module: module.into(),
            declarations: None,
        }
    }

    /// Resolved declaration document path
    pub fn declarations_path(&self) -> PathBuf {
        self.declarations
            .clone()
            .unwrap_or_else(|| self.module.with_extension("json"))
    }

    fn rebase(&mut self, base: &Path) {
        if self.module.is_relative() {
            self.module = base.join(&self.module);
        }
        if let Some(decl) = self.declarations.as_mut() {
            if decl.is_relative() {
                *decl = base.join(&*decl);
            }
        }
    }
}

/// Complete gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub functions: Vec<FunctionSource>,

    /// Minimum log severity (`trace`, `info`, `warn`, `error`, `fatal`)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            engine: EngineConfig::default(),
            store: StoreConfig::default(),
            functions: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from file.
    ///
    /// Relative function paths are resolved against the config file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let mut config: GatewayConfig = serde_json::from_str(&content)?;

        if let Some(base) = path.parent() {
            for source in &mut config.functions {
                source.rebase(base);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Same configuration with the debug nonce switch forced on
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.engine.debug = self.engine.debug || debug;
        self
    }

    /// Check invariants that serde defaults cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be > 0".into()));
        }
        if self.engine.url.trim().is_empty() {
            return Err(ConfigError::Invalid("engine.url must not be empty".into()));
        }
        if self.engine.memory == 0 {
            return Err(ConfigError::Invalid("engine.memory must be > 0".into()));
        }
        if self.engine.time == 0 {
            return Err(ConfigError::Invalid("engine.time must be > 0".into()));
        }
        if self.store.scheme.trim().is_empty() {
            return Err(ConfigError::Invalid("store.scheme must not be empty".into()));
        }
        if self.functions.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one function source is required".into(),
            ));
        }
        self.log_level
            .parse::<crate::observability::Severity>()
            .map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("wasmgate.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults_applied() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{ "functions": [ { "module": "qr.wasm" } ] }"#);

        let config = GatewayConfig::load(&path).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.engine.memory, 4_294_967_296);
        assert_eq!(config.engine.time, 100_000);
        assert!(!config.engine.debug);
        assert_eq!(config.store.kind, StoreKind::Kubo);
        assert_eq!(config.store.scheme, "ipfs");
    }

    #[test]
    fn test_relative_paths_resolved_against_config_dir() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{ "functions": [ { "module": "fns/qr.wasm", "declarations": "fns/qr.d.json" } ] }"#,
        );

        let config = GatewayConfig::load(&path).unwrap();
        assert_eq!(config.functions[0].module, dir.path().join("fns/qr.wasm"));
        assert_eq!(
            config.functions[0].declarations_path(),
            dir.path().join("fns/qr.d.json")
        );
    }

    #[test]
    fn test_default_declarations_path() {
        let source = FunctionSource::new("/srv/fns/add.wasm");
        assert_eq!(source.declarations_path(), PathBuf::from("/srv/fns/add.json"));
    }

    #[test]
    fn test_no_functions_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{ "functions": [] }"#);
        assert!(matches!(
            GatewayConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_zero_memory_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{ "engine": { "memory": 0 }, "functions": [ { "module": "a.wasm" } ] }"#,
        );
        assert!(GatewayConfig::load(&path).is_err());
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{ "log_level": "chatty", "functions": [ { "module": "a.wasm" } ] }"#,
        );
        assert!(GatewayConfig::load(&path).is_err());
    }

    #[test]
    fn test_with_debug_only_turns_on() {
        let config = GatewayConfig::default().with_debug(true);
        assert!(config.engine.debug);
        let config = config.with_debug(false);
        assert!(config.engine.debug);
    }
}
