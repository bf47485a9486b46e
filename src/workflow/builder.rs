//! Workflow builder.
//!
//! Converts positional arguments and a function's content identifier into
//! engine records. In debug mode every invocation carries a fresh nonce, so
//! the engine re-executes instead of replaying a memoized receipt; otherwise
//! the nonce is empty and replay is allowed.

use rand::RngCore;
use serde_json::Value;

use crate::config::{EngineConfig, StoreConfig};
use crate::functions::{FunctionRegistry, FunctionResult};

use super::records::{Invocation, Meta, Task, TaskInput, TemplateInvocation, Workflow, WASM_RUN};

const NONCE_BYTES: usize = 12;
const BASE32HEX: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

/// Settings applied to every built invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOptions {
    /// Resource URI scheme, e.g. `ipfs`
    pub scheme: String,
    pub memory: u64,
    pub time: u64,
    /// Fresh nonce per invocation
    pub debug: bool,
}

impl InvocationOptions {
    pub fn from_config(engine: &EngineConfig, store: &StoreConfig) -> Self {
        Self {
            scheme: store.scheme.clone(),
            memory: engine.memory,
            time: engine.time,
            debug: engine.debug,
        }
    }

    fn meta(&self) -> Meta {
        Meta {
            memory: self.memory,
            time: self.time,
        }
    }

    fn resource(&self, content_id: &str) -> String {
        format!("{}://{}", self.scheme, content_id)
    }

    fn nonce(&self) -> String {
        if self.debug {
            random_nonce()
        } else {
            String::new()
        }
    }
}

impl Default for InvocationOptions {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default(), &StoreConfig::default())
    }
}

/// Unpadded lowercase base32hex of 12 random bytes
pub fn random_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    encode_base32hex(&bytes)
}

fn encode_base32hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u16 = 0;
    let mut bits = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | u16::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32HEX[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(BASE32HEX[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

/// Build the invocation of one function.
///
/// `args` are matched to `arg_names` by position; a missing argument is
/// sent as `null`.
pub fn build_invocation(
    arg_names: &[String],
    args: Vec<Option<Value>>,
    content_id: &str,
    name: &str,
    options: &InvocationOptions,
) -> Invocation {
    let mut args = args.into_iter();
    let ordered: Vec<Value> = arg_names
        .iter()
        .map(|_| args.next().flatten().unwrap_or(Value::Null))
        .collect();

    Invocation {
        run: Task {
            name: name.to_string(),
            op: WASM_RUN.to_string(),
            rsc: options.resource(content_id),
            nnc: options.nonce(),
            input: TaskInput {
                func: name.to_string(),
                args: ordered,
            },
        },
        meta: options.meta(),
        prf: Vec::new(),
    }
}

/// Single-task workflow named after the function
pub fn build_workflow(
    arg_names: &[String],
    args: Vec<Option<Value>>,
    content_id: &str,
    name: &str,
    options: &InvocationOptions,
) -> Workflow {
    Workflow::new(
        name,
        vec![build_invocation(arg_names, args, content_id, name, options)],
    )
}

/// Complete client-submitted tasks into engine invocations.
///
/// Task names and argument lists are kept as submitted, placeholders
/// included; operation, resource, nonce, budget and proofs are replaced.
pub fn build_batch(
    registry: &FunctionRegistry,
    templates: Vec<TemplateInvocation>,
    options: &InvocationOptions,
) -> FunctionResult<Vec<Invocation>> {
    templates
        .into_iter()
        .map(|template| {
            let entry = registry.lookup(&template.run.input.func)?;

            Ok(Invocation {
                run: Task {
                    name: template.run.name,
                    op: WASM_RUN.to_string(),
                    rsc: options.resource(&entry.content_id),
                    nnc: options.nonce(),
                    input: template.run.input,
                },
                meta: options.meta(),
                prf: Vec::new(),
            })
        })
        .collect()
}
