use serde::Deserialize;

/// Engine-wide limits and toggles. Deserializable so hosts can source it from
/// their own settings layer; `Default` matches production behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Container-field recursion limit. Exceeding it is treated as a payload
    /// error on the offending field, not a fatal render failure.
    pub max_depth: usize,
    /// Include the offending node's pretty-printed JSON inside inline error
    /// blocks. Hosts rendering untrusted documents to anonymous visitors may
    /// prefer to switch this off.
    pub error_block_payload: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            error_block_payload: true,
        }
    }
}
