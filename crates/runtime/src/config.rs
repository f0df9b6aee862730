//! VM configuration.
//!
//! Mirrors the compiler crate's builder-style config type: plain fields,
//! a `new`/`default` pair, and `with_*` methods that consume and return
//! `Self` so callers can chain them. Values can also be loaded from a
//! `slorp.toml` file via [`VmConfig::from_toml_str`], using the same
//! `serde` + `toml` pairing the workspace already depends on.

use serde::Deserialize;

/// Default size of the VM's fixed-capacity value stack.
pub const DEFAULT_STACK_SIZE: usize = 256;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Maximum number of `Value` slots live on the stack at once.
    pub stack_size: usize,
    /// Emit a `tracing` span around every `interpret` call and a debug
    /// event per executed instruction. Off by default (even at debug
    /// level this is extremely chatty).
    pub trace_execution: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            stack_size: DEFAULT_STACK_SIZE,
            trace_execution: false,
        }
    }
}

impl VmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    pub fn with_trace_execution(mut self, trace_execution: bool) -> Self {
        self.trace_execution = trace_execution;
        self
    }

    /// Parse a `slorp.toml`-shaped document. Unknown keys are rejected by
    /// `serde`'s default behavior; missing keys fall back to
    /// [`VmConfig::default`] values via `#[serde(default)]`.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
