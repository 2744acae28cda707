//! Codec configuration.

/// Collection name used when neither the record nor the reader names one.
pub const DEFAULT_COLLECTION_NAME: &str = "Default";

/// Configuration shared by every encode/decode call made through a context.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Whether field, type and collection names are written as registry
    /// codes instead of literal strings.
    pub normalized_names: bool,

    /// Whether normalized codes are resolved through the registry on
    /// decode. When false, field and type names are synthesized as
    /// `"{collection}.{code}"`, and embedded collection names, which live
    /// in the global scope, as plain `"{code}"` without a registry lookup.
    pub check_field_names: bool,

    /// Collection used for records that do not name one.
    pub default_collection_name: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            normalized_names: true,
            check_field_names: true,
            default_collection_name: DEFAULT_COLLECTION_NAME.to_string(),
        }
    }
}

impl CodecConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that writes names as literal strings.
    #[must_use]
    pub fn literal() -> Self {
        Self::default().normalized_names(false)
    }

    /// Sets whether names are written as registry codes.
    #[must_use]
    pub fn normalized_names(mut self, value: bool) -> Self {
        self.normalized_names = value;
        self
    }

    /// Sets whether normalized codes are resolved on decode.
    #[must_use]
    pub fn check_field_names(mut self, value: bool) -> Self {
        self.check_field_names = value;
        self
    }

    /// Sets the default collection name.
    #[must_use]
    pub fn default_collection_name(mut self, name: impl Into<String>) -> Self {
        self.default_collection_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CodecConfig::default();
        assert!(config.normalized_names);
        assert!(config.check_field_names);
        assert_eq!(config.default_collection_name, DEFAULT_COLLECTION_NAME);
    }

    #[test]
    fn builder_pattern() {
        let config = CodecConfig::new()
            .normalized_names(false)
            .check_field_names(false)
            .default_collection_name("Settings");

        assert!(!config.normalized_names);
        assert!(!config.check_field_names);
        assert_eq!(config.default_collection_name, "Settings");
        assert!(!CodecConfig::literal().normalized_names);
    }
}
