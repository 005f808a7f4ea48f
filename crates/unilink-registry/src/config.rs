/// Controls registry capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Maximum number of distinct (component id, data id) registrations.
    pub max_handlers: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { max_handlers: 128 }
    }
}
