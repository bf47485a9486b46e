//! CLI command implementations
//!
//! Startup sequence of `serve`:
//! 1. Configuration load
//! 2. Registry load (modules stored, declarations extracted)
//! 3. Engine connection
//! 4. Schema compilation
//! 5. HTTP serving until Ctrl-C

use std::path::Path;
use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::engine::HomestarClient;
use crate::functions::{load_registry, FunctionRegistry};
use crate::http_server::{GatewayServer, GatewayState};
use crate::observability::{
    log_event, log_event_with_fields, Event, Logger, ObservationScope, Severity,
};
use crate::store;
use crate::workflow::InvocationOptions;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_json;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, debug } => serve(&config, debug),
        Command::Schema { config } => schema(&config),
    }
}

/// Load and validate configuration; `--debug` can only turn debug on
pub fn load_config(config_path: &Path, debug: bool) -> CliResult<GatewayConfig> {
    let config = GatewayConfig::load(config_path)
        .map_err(|e| CliError::config_error(e.to_string()))?
        .with_debug(debug);
    Ok(config)
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Store every configured module and register its functions
pub async fn build_registry(config: &GatewayConfig) -> CliResult<FunctionRegistry> {
    let blob_store = store::from_config(&config.store);
    load_registry(&config.functions, blob_store.as_ref())
        .await
        .map_err(|e| CliError::boot_failed(e.to_string()))
}

/// Register functions, connect to the engine and serve HTTP
pub fn serve(config_path: &Path, debug: bool) -> CliResult<()> {
    let config = load_config(config_path, debug)?;
    let min = config.log_level.parse().unwrap_or(Severity::Info);
    Logger::init(min);

    log_event(Event::BootStart);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("path", &config_path.display().to_string()),
            ("functions", &config.functions.len().to_string()),
            ("debug", &config.engine.debug.to_string()),
        ],
    );

    runtime()?.block_on(serve_config(config))
}

async fn serve_config(config: GatewayConfig) -> CliResult<()> {
    let registry = build_registry(&config).await?;

    let scope = ObservationScope::new("ENGINE_CONNECT");
    let engine = match HomestarClient::connect(&config.engine.url).await {
        Ok(engine) => {
            scope.complete();
            engine
        }
        Err(e) => {
            scope.fail(&e.to_string());
            return Err(CliError::engine_unavailable(e.to_string()));
        }
    };

    let scope = ObservationScope::new("SCHEMA_COMPILE");
    let options = InvocationOptions::from_config(&config.engine, &config.store);
    let state = match GatewayState::new(registry, Arc::new(engine), options) {
        Ok(state) => {
            scope.complete();
            state.with_batch_workflow_name(config.engine.workflow_name.clone())
        }
        Err(e) => {
            scope.fail(&e.to_string());
            return Err(CliError::boot_failed(e.to_string()));
        }
    };

    log_event(Event::BootComplete);

    GatewayServer::new(config.server.clone(), Arc::new(state))
        .start()
        .await
        .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
}

/// Print the discovery document without starting the server
pub fn schema(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path, false)?;
    // stdout carries the document; keep INFO lines out of it
    Logger::init(Severity::Warn);

    let registry = runtime()?.block_on(build_registry(&config))?;
    write_json(&registry.all())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_debug_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wasmgate.json");
        fs::write(&path, r#"{ "functions": [ { "module": "m.wasm" } ] }"#).unwrap();

        assert!(!load_config(&path, false).unwrap().engine.debug);
        assert!(load_config(&path, true).unwrap().engine.debug);
    }

    #[test]
    fn test_missing_config_is_config_error() {
        let err = load_config(Path::new("/nonexistent/wasmgate.json"), false).unwrap_err();
        assert_eq!(err.code_str(), "WASMGATE_CLI_CONFIG_ERROR");
    }

    #[tokio::test]
    async fn test_build_registry_with_digest_store() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("math.wasm"), b"\0asm\x01\0\0\0").unwrap();
        fs::write(
            dir.path().join("math.json"),
            r#"{ "functions": [ { "name": "add", "params": [
                { "name": "a", "type": "number" }, { "name": "b", "type": "number" }
            ], "returns": "number" } ] }"#,
        )
        .unwrap();
        let path = dir.path().join("wasmgate.json");
        fs::write(
            &path,
            r#"{ "store": { "kind": "digest" }, "functions": [ { "module": "math.wasm" } ] }"#,
        )
        .unwrap();

        let config = load_config(&path, false).unwrap();
        let registry = build_registry(&config).await.unwrap();
        assert_eq!(registry.names(), vec!["add"]);
    }
}
