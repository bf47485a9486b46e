//! # Registry Loader
//!
//! Turns configured function sources into a registry:
//! module bytes go to the content store, declarations become schemas.
//! A function whose signature cannot be represented is dropped with a
//! warning; a duplicate name aborts the load.

use std::fs;
use std::path::Path;

use crate::config::FunctionSource;
use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::store::BlobStore;

use super::errors::{FunctionError, FunctionResult};
use super::registry::FunctionRegistry;
use super::signature::{extract_schema, Declarations};

/// Read and parse a declaration document
pub fn read_declarations(path: &Path) -> FunctionResult<Declarations> {
    let content = fs::read_to_string(path).map_err(|source| FunctionError::Io {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|e| FunctionError::Declaration {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Add every representable function of `declarations` to `registry`.
///
/// Returns the names of the functions that were skipped.
pub fn register_declarations(
    registry: &mut FunctionRegistry,
    content_id: &str,
    declarations: &Declarations,
) -> FunctionResult<Vec<String>> {
    let mut skipped = Vec::new();

    for decl in &declarations.functions {
        let schema = match extract_schema(decl) {
            Ok(schema) => schema,
            Err(e) if !e.is_fatal() => {
                log_event_with_fields(
                    Event::FunctionSkipped,
                    &[("name", decl.name.as_str()), ("reason", &e.to_string())],
                );
                skipped.push(decl.name.clone());
                continue;
            }
            Err(e) => return Err(e),
        };

        let entry = registry.register(&decl.name, content_id, schema)?;
        let arity = entry.arity().to_string();
        log_event_with_fields(
            Event::FunctionRegistered,
            &[
                ("name", decl.name.as_str()),
                ("content_id", content_id),
                ("arity", arity.as_str()),
            ],
        );
    }

    Ok(skipped)
}

/// Build the registry from all configured sources
pub async fn load_registry(
    sources: &[FunctionSource],
    store: &dyn BlobStore,
) -> FunctionResult<FunctionRegistry> {
    let scope = ObservationScope::new("REGISTRY_LOAD");
    let mut registry = FunctionRegistry::new();

    for source in sources {
        if let Err(e) = load_source(&mut registry, source, store).await {
            scope.fail(&e.to_string());
            return Err(e);
        }
    }

    let count = registry.len().to_string();
    log_event_with_fields(Event::RegistryBuilt, &[("functions", count.as_str())]);
    scope.complete_with_fields(&[("functions", count.as_str())]);
    Ok(registry)
}

async fn load_source(
    registry: &mut FunctionRegistry,
    source: &FunctionSource,
    store: &dyn BlobStore,
) -> FunctionResult<()> {
    let module_path = source.module.display().to_string();
    let bytes = fs::read(&source.module).map_err(|source| FunctionError::Io {
        path: module_path.clone(),
        source,
    })?;

    let content_id = store.put(&bytes).await?;
    log_event_with_fields(
        Event::ModuleStored,
        &[
            ("module", module_path.as_str()),
            ("content_id", content_id.as_str()),
            ("store", store.name()),
        ],
    );

    let declarations = read_declarations(&source.declarations_path())?;
    register_declarations(registry, &content_id, &declarations)?;
    Ok(())
}
