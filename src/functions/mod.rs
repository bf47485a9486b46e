//! # Functions
//!
//! Callable WebAssembly functions: their declared signatures, the JSON-Schema
//! derived from them, and the registry routes are generated from.

pub mod errors;
pub mod function;
pub mod loader;
pub mod registry;
pub mod signature;

pub use errors::{FunctionError, FunctionResult};
pub use function::FunctionEntry;
pub use loader::{load_registry, read_declarations, register_declarations};
pub use registry::FunctionRegistry;
pub use signature::{extract_schema, Declarations, FunctionDecl, ParamDecl, TypeDecl};
