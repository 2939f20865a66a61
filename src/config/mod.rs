//! Configuration module for infrasync.
//!
//! This module handles the desired state:
//! - Parsing and deserializing the YAML definition
//! - Validation of the loader guarantees
//! - Canonical encoding and fingerprints for display

mod spec;
mod parser;
mod validator;
mod hash;

pub use spec::{KEY_SEPARATOR, Properties, Resource, SyncConfig};
pub use parser::{ConfigParser, DEFAULT_CONFIG_FILES, find_config_file};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
pub use hash::{ConfigHasher, canonical_json, canonical_object};
