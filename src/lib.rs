//! wasmgate - WebAssembly functions as HTTP endpoints
//!
//! Functions are registered once at boot with JSON-Schema signatures derived
//! from their declarations. Requests are validated against those schemas,
//! turned into workflows for the execution engine, and the engine's receipts
//! are encoded back into HTTP responses.

pub mod batch;
pub mod cli;
pub mod config;
pub mod engine;
pub mod functions;
pub mod http_server;
pub mod observability;
pub mod response;
pub mod store;
pub mod validation;
pub mod workflow;
