//! # Configuration
//!
//! Runtime switches for the reflector and the validation pass.
//!
//! Loaded from TOML by the app layer; every field has a default so an empty
//! document (or no document) is a valid configuration.
//!
//! ```toml
//! [reflector]
//! actions_require_annotation = false
//! ignored_methods = ["internalState"]
//! resolve_member_types = true
//!
//! [validation]
//! enabled = true
//! fatal = true
//! disabled_validators = ["collection_element_type"]
//! ```

use crate::MetamodelError;
use serde::{Deserialize, Serialize};

/// Switches that change how types are introspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectorConfig {
    /// Only methods annotated `@Action` become actions.
    pub actions_require_annotation: bool,
    /// Extra method names that are never part of the metamodel.
    pub ignored_methods: Vec<String>,
    /// Load the specifications of member, parameter and super types while
    /// introspecting a type.
    pub resolve_member_types: bool,
}

impl Default for ReflectorConfig {
    fn default() -> Self {
        Self {
            actions_require_annotation: false,
            ignored_methods: Vec::new(),
            resolve_member_types: true,
        }
    }
}

/// Switches for the validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Run the validation pass during bootstrap.
    pub enabled: bool,
    /// Abort bootstrap when the pass reports failures.
    pub fatal: bool,
    /// Names of validators to skip.
    pub disabled_validators: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fatal: true,
            disabled_validators: Vec::new(),
        }
    }
}

impl ValidationConfig {
    /// Check if the named validator should run.
    #[must_use]
    pub fn is_enabled(&self, validator: &str) -> bool {
        self.enabled && !self.disabled_validators.iter().any(|v| v == validator)
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetamodelConfig {
    pub reflector: ReflectorConfig,
    pub validation: ValidationConfig,
}

impl MetamodelConfig {
    /// Parse a TOML configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self, MetamodelError> {
        toml::from_str(text).map_err(|e| MetamodelError::ConfigError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = MetamodelConfig::from_toml_str("").expect("parse");
        assert_eq!(config, MetamodelConfig::default());
        assert!(config.validation.fatal);
        assert!(config.reflector.resolve_member_types);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = MetamodelConfig::from_toml_str(
            r#"
[reflector]
actions_require_annotation = true

[validation]
disabled_validators = ["unique_home_page"]
"#,
        )
        .expect("parse");
        assert!(config.reflector.actions_require_annotation);
        assert!(config.reflector.resolve_member_types);
        assert!(!config.validation.is_enabled("unique_home_page"));
        assert!(config.validation.is_enabled("duplicate_member"));
    }

    #[test]
    fn disabled_pass_disables_every_validator() {
        let mut config = ValidationConfig::default();
        config.enabled = false;
        assert!(!config.is_enabled("duplicate_member"));
    }

    #[test]
    fn malformed_document_is_config_error() {
        let result = MetamodelConfig::from_toml_str("[reflector\n");
        assert!(matches!(result, Err(MetamodelError::ConfigError(_))));
    }
}
