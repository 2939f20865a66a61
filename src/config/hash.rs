//! Canonical encoding and fingerprinting of configurations.
//!
//! The canonical form is a compact JSON text with object keys sorted and
//! integral floats written as integers, so that semantically equal values
//! always encode (and hash) identically regardless of declaration order.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::Write;

use super::spec::{Resource, SyncConfig};

/// Hasher for computing configuration fingerprints.
#[derive(Debug, Default)]
pub struct ConfigHasher;

impl ConfigHasher {
    /// Creates a new configuration hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes a hash of the entire configuration.
    ///
    /// Resources are hashed in key order, so reordering the file does not
    /// change the result.
    #[must_use]
    pub fn hash_config(&self, config: &SyncConfig) -> String {
        let mut hasher = Sha256::new();
        hasher.update(config.version.as_bytes());

        let mut resources: Vec<_> = config.resources.iter().collect();
        resources.sort_by_cached_key(|r| r.key());
        for resource in resources {
            hasher.update(self.hash_resource(resource).as_bytes());
        }

        hex::encode(hasher.finalize())
    }

    /// Computes a hash for a single resource, identity included.
    #[must_use]
    pub fn hash_resource(&self, resource: &Resource) -> String {
        let mut hasher = Sha256::new();
        hasher.update(resource.resource_type.as_bytes());
        hasher.update([0u8]);
        hasher.update(resource.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(canonical_object(&resource.properties).as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(&self, hash: &str) -> String {
        hash.chars().take(8).collect()
    }
}

/// Returns the canonical JSON text of a value.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

/// Returns the canonical JSON text of a property map.
#[must_use]
pub fn canonical_object(map: &serde_json::Map<String, Value>) -> String {
    let mut out = String::new();
    write_object(map, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(n, out),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(map, out),
    }
}

fn write_object(map: &serde_json::Map<String, Value>, out: &mut String) {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    out.push('{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(key, out);
        out.push(':');
        write_canonical(value, out);
    }
    out.push('}');
}

/// Integral floats that an `i64` or `u64` could hold are written as integers.
#[allow(clippy::cast_possible_truncation)]
fn write_number(n: &serde_json::Number, out: &mut String) {
    if n.is_f64()
        && let Some(f) = n.as_f64()
        && f.fract() == 0.0
        && (-9_223_372_036_854_775_808.0..18_446_744_073_709_551_616.0).contains(&f)
    {
        let _ = write!(out, "{}", f as i128);
        return;
    }
    let _ = write!(out, "{n}");
}

fn write_string(s: &str, out: &mut String) {
    out.push_str(&Value::String(s.to_string()).to_string());
}
