//! Validation of the desired configuration.
//!
//! Everything the comparison engine assumes about the desired state is
//! checked here, before any comparison runs.

use crate::error::{ConfigError, Result, SyncError};
use std::collections::HashSet;
use tracing::debug;

use super::spec::{KEY_SEPARATOR, Resource, SyncConfig};

/// Resource types accepted by default.
const KNOWN_RESOURCE_TYPES: &[&str] = &["server", "database", "loadbalancer"];

/// Validator for desired configurations.
#[derive(Debug)]
pub struct ConfigValidator {
    /// Allow-list of resource types.
    known_types: HashSet<String>,
}

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
    /// Structured error, when one applies.
    kind: Option<ConfigError>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Creates a new validator with the default resource types.
    #[must_use]
    pub fn new() -> Self {
        Self {
            known_types: KNOWN_RESOURCE_TYPES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Adds a resource type to the allow-list.
    pub fn add_resource_type(&mut self, resource_type: impl Into<String>) {
        self.known_types.insert(resource_type.into());
    }

    /// Validates a configuration, collecting every finding.
    #[must_use]
    pub fn check(&self, config: &SyncConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        if config.version.trim().is_empty() {
            result.push("version", "version is required");
        }

        if config.resources.is_empty() {
            result.push("resources", "at least one resource is required");
        }

        let mut seen_keys = HashSet::new();
        for (i, resource) in config.resources.iter().enumerate() {
            let prefix = format!("resources[{i}]");
            self.validate_resource(resource, &prefix, &mut seen_keys, &mut result);
        }

        result
    }

    /// Validates a configuration.
    ///
    /// # Errors
    ///
    /// Returns the first error found if validation fails.
    pub fn validate(&self, config: &SyncConfig) -> Result<ValidationResult> {
        self.check(config).into_result()
    }

    /// Validates one resource.
    fn validate_resource(
        &self,
        resource: &Resource,
        prefix: &str,
        seen_keys: &mut HashSet<String>,
        result: &mut ValidationResult,
    ) {
        if resource.resource_type.is_empty() {
            result.push(format!("{prefix}.type"), format!("{prefix}: type is required"));
        }

        if resource.name.is_empty() {
            result.push(format!("{prefix}.name"), format!("{prefix}: name is required"));
        }

        if resource.resource_type.is_empty() || resource.name.is_empty() {
            return;
        }

        let key = resource.key();
        if seen_keys.contains(&key) {
            result.errors.push(ValidationError {
                field: format!("{prefix}.name"),
                message: format!("duplicate resource: {key}"),
                kind: Some(ConfigError::DuplicateResource { key: key.clone() }),
            });
        }

        if !self.known_types.contains(&resource.resource_type) {
            result.errors.push(ValidationError {
                field: format!("{prefix}.type"),
                message: format!(
                    "{prefix}: unsupported type '{}'",
                    resource.resource_type
                ),
                kind: Some(ConfigError::UnsupportedType {
                    resource_type: resource.resource_type.clone(),
                    field: format!("{prefix}.type"),
                }),
            });
        }

        if resource.properties.is_empty() {
            result.push(
                format!("{prefix}.properties"),
                format!("{prefix}: properties are required"),
            );
        }

        if !is_valid_name(&resource.name) {
            result.warnings.push(format!(
                "{prefix}.name: '{}' is not lowercase alphanumeric with hyphens",
                resource.name
            ));
        }

        if resource.name.contains(KEY_SEPARATOR) || resource.resource_type.contains(KEY_SEPARATOR) {
            result.warnings.push(format!(
                "{prefix}: '{key}' contains '{KEY_SEPARATOR}' in its type or name and may collide with another resource"
            ));
        }

        seen_keys.insert(key);
    }
}

/// Validates that a name follows the naming convention.
/// Names must be lowercase alphanumeric with hyphens, starting with a letter.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }

    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return false;
    }

    !name.ends_with('-') && !name.contains("--")
}

impl ValidationResult {
    /// Records an error for a field.
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field: field.into(),
            message: message.into(),
            kind: None,
        });
    }

    /// Turns the findings into a result, failing with the first error.
    ///
    /// # Errors
    ///
    /// Returns the first recorded error if there is one.
    pub fn into_result(mut self) -> Result<Self> {
        if self.errors.is_empty() {
            debug!("Configuration validation passed");
            return Ok(self);
        }

        let first = self.errors.swap_remove(0);
        Err(SyncError::Config(first.into_config_error()))
    }

    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl ValidationError {
    /// Converts into the error surfaced to callers.
    fn into_config_error(self) -> ConfigError {
        let Self {
            field,
            message,
            kind,
        } = self;
        kind.unwrap_or_else(|| ConfigError::validation(message, field))
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn props(value: serde_json::Value) -> Map<String, serde_json::Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn valid_config() -> SyncConfig {
        SyncConfig::new(
            "1.0",
            vec![
                Resource::new("server", "web-1", props(json!({"region": "us-east-1"}))),
                Resource::new("database", "main-db", props(json!({"engine": "postgres"}))),
            ],
        )
    }

    #[test]
    fn test_valid_config() {
        let validator = ConfigValidator::new();
        let result = validator.validate(&valid_config()).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.warning_count(), 0);
    }

    #[test]
    fn test_default_accepts_known_types() {
        let config = SyncConfig::new(
            "1.0",
            vec![Resource::new("server", "web-1", props(json!({"region": "us-east-1"})))],
        );
        assert!(ConfigValidator::default().validate(&config).is_ok());
    }

    #[test]
    fn test_check_result_into_error() {
        let config = SyncConfig::new("", vec![]);
        let result = ConfigValidator::new().check(&config);
        assert_eq!(result.error_count(), 2);

        let err = result.into_result().unwrap_err();
        match err {
            SyncError::Config(ConfigError::ValidationError { field, .. }) => {
                assert_eq!(field.as_deref(), Some("version"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_version() {
        let mut config = valid_config();
        config.version = String::new();

        let result = ConfigValidator::new().check(&config);
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.errors[0].field, "version");
    }

    #[test]
    fn test_no_resources() {
        let config = SyncConfig::new("1.0", vec![]);
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(err.to_string().contains("at least one resource"));
    }

    #[test]
    fn test_missing_type_and_name() {
        let config = SyncConfig::new(
            "1.0",
            vec![Resource::new("", "", props(json!({"a": 1})))],
        );
        let result = ConfigValidator::new().check(&config);
        assert_eq!(result.error_count(), 2);
        assert_eq!(result.errors[0].field, "resources[0].type");
        assert_eq!(result.errors[1].field, "resources[0].name");
    }

    #[test]
    fn test_duplicate_resource() {
        let mut config = valid_config();
        config.resources.push(Resource::new(
            "server",
            "web-1",
            props(json!({"region": "eu-west-1"})),
        ));

        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Config(ConfigError::DuplicateResource { ref key }) if key == "server.web-1"
        ));
    }

    #[test]
    fn test_unsupported_type() {
        let config = SyncConfig::new(
            "1.0",
            vec![Resource::new("queue", "jobs", props(json!({"fifo": true})))],
        );
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Config(ConfigError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_custom_resource_type() {
        let config = SyncConfig::new(
            "1.0",
            vec![Resource::new("queue", "jobs", props(json!({"fifo": true})))],
        );
        let mut validator = ConfigValidator::new();
        validator.add_resource_type("queue");
        assert!(validator.validate(&config).is_ok());
    }

    #[test]
    fn test_empty_properties() {
        let config = SyncConfig::new("1.0", vec![Resource::new("server", "web-1", Map::new())]);
        let result = ConfigValidator::new().check(&config);
        assert_eq!(result.errors[0].field, "resources[0].properties");
    }

    #[test]
    fn test_name_warnings() {
        let config = SyncConfig::new(
            "1.0",
            vec![Resource::new("server", "Web.1", props(json!({"a": 1})))],
        );
        let result = ConfigValidator::new().check(&config);
        assert!(result.is_valid());
        assert_eq!(result.warning_count(), 2);
    }

    #[test]
    fn test_valid_name() {
        assert!(is_valid_name("web-server-1"));
        assert!(is_valid_name("a"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("Web"));
        assert!(!is_valid_name("1-web"));
        assert!(!is_valid_name("web_1"));
        assert!(!is_valid_name("web-"));
        assert!(!is_valid_name("web--1"));
    }
}
