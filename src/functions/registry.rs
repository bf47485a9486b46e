//! # Function Registry
//!
//! Built once at startup by a single writer, then shared read-only behind an
//! `Arc` by every request handler. Entries keep registration order; the name
//! index only points into that ordered list.

use std::collections::HashMap;

use serde_json::Value;

use super::errors::{FunctionError, FunctionResult};
use super::function::FunctionEntry;

/// Registry of callable functions
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    /// Entries in registration order
    entries: Vec<FunctionEntry>,

    /// Position in `entries` by function name
    by_name: HashMap<String, usize>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function.
    ///
    /// A name can only be registered once; the first registration stays in
    /// place when a duplicate is rejected.
    pub fn register(
        &mut self,
        name: &str,
        content_id: &str,
        schema: Value,
    ) -> FunctionResult<&FunctionEntry> {
        if self.by_name.contains_key(name) {
            return Err(FunctionError::DuplicateName(name.to_string()));
        }

        let index = self.entries.len();
        self.entries.push(FunctionEntry::new(
            name.to_string(),
            content_id.to_string(),
            schema,
        ));
        self.by_name.insert(name.to_string(), index);

        Ok(&self.entries[index])
    }

    /// Get function by name
    pub fn lookup(&self, name: &str) -> FunctionResult<&FunctionEntry> {
        self.by_name
            .get(name)
            .map(|&index| &self.entries[index])
            .ok_or_else(|| FunctionError::NotFound(name.to_string()))
    }

    /// `[name, schema]` pairs in registration order, for discovery responses
    pub fn all(&self) -> Vec<(String, Value)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.clone(), entry.schema.clone()))
            .collect()
    }

    /// Entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = &FunctionEntry> {
        self.entries.iter()
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Check whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Get function count
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
