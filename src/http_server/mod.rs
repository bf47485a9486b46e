//! # Gateway HTTP Server
//!
//! Exposes every registered function over HTTP.
//!
//! # Endpoints
//!
//! - `GET /` - discovery: `[name, schema]` pairs
//! - `GET /:name/schema` - request schema of one function
//! - `GET|POST /:name/workflow` - build a workflow without running it
//! - `GET|POST /:name` - run a function and encode its output
//! - `POST /run` - run a batch of invocations
//! - `POST /workflow` - build a batch workflow without running it

pub mod batch_routes;
pub mod config;
pub mod context;
pub mod errors;
pub mod function_routes;
pub mod query;
pub mod server;
pub mod state;

pub use config::HttpServerConfig;
pub use context::FunctionContext;
pub use errors::{ApiError, ApiResult};
pub use server::GatewayServer;
pub use state::GatewayState;
