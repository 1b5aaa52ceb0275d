use crate::dialect::DEFAULT_DIALECT;
use serde::Deserialize;

/// Configuration for a [`Patcher`](crate::Patcher).
///
/// Deserializable, so it can live in an application's config file:
///
/// ```toml
/// [patch]
/// dialect = "mysql"
/// max_input_bytes = 65536
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PatcherConfig {
    /// Registered dialect name used to render SET clauses.
    pub dialect: String,
    /// Reject request bodies larger than this. `None` means no limit (default).
    pub max_input_bytes: Option<usize>,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            dialect: DEFAULT_DIALECT.to_string(),
            max_input_bytes: None,
        }
    }
}

impl PatcherConfig {
    /// Create a new configuration with defaults (`postgres`, no size limit).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dialect name.
    pub fn dialect(mut self, name: impl Into<String>) -> Self {
        self.dialect = name.into();
        self
    }

    /// Set the maximum accepted input size.
    pub fn max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_from_toml_with_defaults() {
        let cfg: PatcherConfig = toml::from_str(r#"dialect = "mysql""#).unwrap();
        assert_eq!(cfg, PatcherConfig::new().dialect("mysql"));

        let cfg: PatcherConfig = toml::from_str("max_input_bytes = 1024").unwrap();
        assert_eq!(cfg.dialect, "postgres");
        assert_eq!(cfg.max_input_bytes, Some(1024));
    }
}
