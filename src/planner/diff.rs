//! Diff engine for comparing current vs desired state.
//!
//! This module aligns two resource collections by identity key and
//! classifies every resource as create, update, delete or no change,
//! itemizing property differences for updates.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::Resource;

use super::equality::{maps_equal, values_equal};

/// Engine for computing diffs between current and desired states.
#[derive(Debug, Default)]
pub struct DiffEngine;

/// Type of change detected for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    /// Resource needs to be created.
    Create,
    /// Resource needs to be updated.
    Update,
    /// Resource needs to be deleted.
    Delete,
    /// Resource is unchanged.
    NoChange,
}

/// A single property that differs between current and desired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyChange {
    /// Property key.
    pub key: String,
    /// Current value, absent if the key only exists in the desired state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    /// Desired value, absent if the key only exists in the current state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

/// Change record for a single resource.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceChange {
    /// Classification.
    pub change_type: ChangeType,
    /// Desired resource, or the current one for deletes.
    pub resource: Resource,
    /// Current resource, when one exists.
    pub current_resource: Option<Resource>,
    /// Itemized differences; non-empty only for updates.
    pub property_changes: Vec<PropertyChange>,
}

/// Complete diff result.
#[derive(Debug, Clone, Serialize)]
pub struct Diff {
    /// Per-resource changes: desired resources first, then deletions.
    pub changes: Vec<ResourceChange>,
    /// When the diff was computed.
    pub computed_at: DateTime<Utc>,
}

/// Counts of each change type in a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    /// Number of resources to create.
    pub creates: usize,
    /// Number of resources to update.
    pub updates: usize,
    /// Number of resources to delete.
    pub deletes: usize,
    /// Number of unchanged resources.
    pub unchanged: usize,
}

/// Resources of one side indexed by key, remembering first-seen order.
struct ResourceIndex<'a> {
    order: Vec<String>,
    by_key: HashMap<String, &'a Resource>,
}

impl<'a> ResourceIndex<'a> {
    fn build(resources: &'a [Resource], side: &str) -> Self {
        let mut order = Vec::with_capacity(resources.len());
        let mut by_key = HashMap::with_capacity(resources.len());

        for resource in resources {
            let key = resource.key();
            if by_key.insert(key.clone(), resource).is_some() {
                warn!("Duplicate {side} resource {key}, keeping the last definition");
            } else {
                order.push(key);
            }
        }

        Self { order, by_key }
    }

    fn get(&self, key: &str) -> Option<&'a Resource> {
        self.by_key.get(key).copied()
    }

    fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &'a Resource)> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.get(key).map(|res| (key.as_str(), res)))
    }
}

impl DiffEngine {
    /// Creates a new diff engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the diff between current and desired resource collections.
    #[must_use]
    pub fn compare_states(&self, current: &[Resource], desired: &[Resource]) -> Diff {
        let current_index = ResourceIndex::build(current, "current");
        let desired_index = ResourceIndex::build(desired, "desired");
        let mut changes = Vec::with_capacity(desired_index.order.len());

        for (key, desired_res) in desired_index.iter() {
            if let Some(current_res) = current_index.get(key) {
                changes.push(self.compare_resources(current_res, desired_res));
            } else {
                debug!("Resource {key} needs to be created");
                changes.push(ResourceChange {
                    change_type: ChangeType::Create,
                    resource: desired_res.clone(),
                    current_resource: None,
                    property_changes: Vec::new(),
                });
            }
        }

        for (key, current_res) in current_index.iter() {
            if !desired_index.contains(key) {
                debug!("Resource {key} needs to be deleted");
                changes.push(ResourceChange {
                    change_type: ChangeType::Delete,
                    resource: current_res.clone(),
                    current_resource: Some(current_res.clone()),
                    property_changes: Vec::new(),
                });
            }
        }

        Diff {
            changes,
            computed_at: Utc::now(),
        }
    }

    /// Compares two resources sharing the same identity key.
    #[must_use]
    pub fn compare_resources(&self, current: &Resource, desired: &Resource) -> ResourceChange {
        if maps_equal(&current.properties, &desired.properties) {
            debug!("Resource {} is up to date", desired.key());
            return ResourceChange {
                change_type: ChangeType::NoChange,
                resource: desired.clone(),
                current_resource: Some(current.clone()),
                property_changes: Vec::new(),
            };
        }

        let property_changes = Self::property_changes(current, desired);
        debug!(
            "Resource {} needs update ({} properties)",
            desired.key(),
            property_changes.len()
        );

        ResourceChange {
            change_type: ChangeType::Update,
            resource: desired.clone(),
            current_resource: Some(current.clone()),
            property_changes,
        }
    }

    /// Itemizes differing keys: current keys in order, then desired-only keys.
    fn property_changes(current: &Resource, desired: &Resource) -> Vec<PropertyChange> {
        let keys = current.properties.keys().chain(
            desired
                .properties
                .keys()
                .filter(|k| !current.properties.contains_key(*k)),
        );

        keys.filter_map(|key| {
            let old_value = current.properties.get(key);
            let new_value = desired.properties.get(key);

            (!values_equal(old_value, new_value)).then(|| PropertyChange {
                key: key.clone(),
                old_value: old_value.cloned(),
                new_value: new_value.cloned(),
            })
        })
        .collect()
    }
}

impl Diff {
    /// Returns true if any resource needs to change.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.changes
            .iter()
            .any(|c| c.change_type != ChangeType::NoChange)
    }

    /// Counts the changes by type.
    #[must_use]
    pub fn summary(&self) -> DiffSummary {
        self.changes
            .iter()
            .fold(DiffSummary::default(), |mut summary, change| {
                match change.change_type {
                    ChangeType::Create => summary.creates += 1,
                    ChangeType::Update => summary.updates += 1,
                    ChangeType::Delete => summary.deletes += 1,
                    ChangeType::NoChange => summary.unchanged += 1,
                }
                summary
            })
    }

    /// Filters to only changes that require action.
    #[must_use]
    pub fn actionable_changes(&self) -> Vec<&ResourceChange> {
        self.changes
            .iter()
            .filter(|c| c.change_type != ChangeType::NoChange)
            .collect()
    }
}

impl DiffSummary {
    /// Returns the total number of changes requiring action.
    #[must_use]
    pub const fn total_changes(&self) -> usize {
        self.creates + self.updates + self.deletes
    }
}

impl PropertyChange {
    /// Returns true if the key is only present in the desired state.
    #[must_use]
    pub const fn is_addition(&self) -> bool {
        self.old_value.is_none() && self.new_value.is_some()
    }

    /// Returns true if the key is only present in the current state.
    #[must_use]
    pub const fn is_removal(&self) -> bool {
        self.old_value.is_some() && self.new_value.is_none()
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::NoChange => "no-change",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for ResourceChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.resource.key(), self.change_type)?;
        if !self.property_changes.is_empty() {
            write!(f, " (")?;
            for (i, change) in self.property_changes.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", change.key)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Diff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.has_changes() {
            return write!(f, "No changes required");
        }

        let summary = self.summary();
        writeln!(f, "Diff ({} changes):", summary.total_changes())?;
        for change in self.actionable_changes() {
            writeln!(f, "  {change}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn res(resource_type: &str, name: &str, props: Value) -> Resource {
        Resource::new(resource_type, name, props.as_object().cloned().unwrap_or_default())
    }

    fn find<'a>(diff: &'a Diff, key: &str) -> &'a ResourceChange {
        diff.changes
            .iter()
            .find(|c| c.resource.key() == key)
            .unwrap()
    }

    #[test]
    fn test_identical_states_have_no_changes() {
        let resources = vec![
            res("server", "web-1", json!({"region": "us-east-1", "tags": {"a": [1, 2]}})),
            res("database", "main-db", json!({"engine": "postgres"})),
        ];
        let diff = DiffEngine::new().compare_states(&resources, &resources.clone());

        assert!(!diff.has_changes());
        assert_eq!(diff.changes.len(), 2);
        assert!(
            diff.changes
                .iter()
                .all(|c| c.change_type == ChangeType::NoChange && c.property_changes.is_empty())
        );
    }

    #[test]
    fn test_single_identical_resource() {
        let current = vec![res("server", "web-1", json!({"region": "us-east-1"}))];
        let desired = vec![res("server", "web-1", json!({"region": "us-east-1"}))];
        let diff = DiffEngine::new().compare_states(&current, &desired);
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_update_and_create() {
        let current = vec![res("server", "web-1", json!({"region": "us-east-1"}))];
        let desired = vec![
            res("server", "web-1", json!({"region": "us-west-2"})),
            res("database", "main-db", json!({"engine": "postgres"})),
        ];
        let diff = DiffEngine::new().compare_states(&current, &desired);

        assert!(diff.has_changes());
        assert_eq!(diff.changes.len(), 2);

        let update = find(&diff, "server.web-1");
        assert_eq!(update.change_type, ChangeType::Update);
        assert_eq!(
            update.property_changes,
            vec![PropertyChange {
                key: String::from("region"),
                old_value: Some(json!("us-east-1")),
                new_value: Some(json!("us-west-2")),
            }]
        );

        let create = find(&diff, "database.main-db");
        assert_eq!(create.change_type, ChangeType::Create);
        assert!(create.current_resource.is_none());
        assert!(create.property_changes.is_empty());
    }

    #[test]
    fn test_delete() {
        let current = vec![
            res("server", "web-1", json!({"region": "us-east-1"})),
            res("loadbalancer", "lb-1", json!({"port": 443})),
        ];
        let desired = vec![res("server", "web-1", json!({"region": "us-east-1"}))];
        let diff = DiffEngine::new().compare_states(&current, &desired);

        let delete = find(&diff, "loadbalancer.lb-1");
        assert_eq!(delete.change_type, ChangeType::Delete);
        assert!(delete.property_changes.is_empty());
        assert_eq!(delete.current_resource.as_ref(), Some(&current[1]));
        assert_eq!(delete.resource, current[1]);
        assert_eq!(diff.summary().deletes, 1);
    }

    #[test]
    fn test_update_lists_only_differing_keys() {
        let current = res(
            "server",
            "web-1",
            json!({"same": 1, "changed": "a", "removed": true, "nested": {"x": [1, 2]}}),
        );
        let desired = res(
            "server",
            "web-1",
            json!({"nested": {"x": [1, 2]}, "same": 1.0, "changed": "b", "added": null}),
        );
        let change = DiffEngine::new().compare_resources(&current, &desired);

        assert_eq!(change.change_type, ChangeType::Update);
        let keys: Vec<&str> = change
            .property_changes
            .iter()
            .map(|p| p.key.as_str())
            .collect();
        assert_eq!(keys, vec!["changed", "removed", "added"]);

        let removed = &change.property_changes[1];
        assert!(removed.is_removal());
        assert_eq!(removed.new_value, None);

        let added = &change.property_changes[2];
        assert!(added.is_addition());
        assert_eq!(added.new_value, Some(Value::Null));
    }

    #[test]
    fn test_property_order_does_not_cause_update() {
        let current = res("server", "web-1", json!({"a": 1, "b": {"c": 2, "d": 3}}));
        let mut props = Map::new();
        props.insert(String::from("b"), json!({"d": 3, "c": 2}));
        props.insert(String::from("a"), json!(1));
        let desired = Resource::new("server", "web-1", props);

        let change = DiffEngine::new().compare_resources(&current, &desired);
        assert_eq!(change.change_type, ChangeType::NoChange);
        assert_eq!(change.current_resource.as_ref(), Some(&current));
    }

    #[test]
    fn test_nested_change_reported_at_top_level_key() {
        let current = res("database", "db", json!({"config": {"replicas": [1, 2]}}));
        let desired = res("database", "db", json!({"config": {"replicas": [1, 2, 3]}}));
        let change = DiffEngine::new().compare_resources(&current, &desired);

        assert_eq!(change.property_changes.len(), 1);
        assert_eq!(change.property_changes[0].key, "config");
    }

    #[test]
    fn test_order_desired_first_then_deletes() {
        let current = vec![
            res("server", "old-1", json!({"x": 1})),
            res("server", "web-1", json!({"x": 1})),
            res("server", "old-2", json!({"x": 1})),
        ];
        let desired = vec![
            res("server", "new-1", json!({"x": 1})),
            res("server", "web-1", json!({"x": 2})),
        ];
        let diff = DiffEngine::new().compare_states(&current, &desired);

        let order: Vec<(String, ChangeType)> = diff
            .changes
            .iter()
            .map(|c| (c.resource.key(), c.change_type))
            .collect();
        assert_eq!(
            order,
            vec![
                (String::from("server.new-1"), ChangeType::Create),
                (String::from("server.web-1"), ChangeType::Update),
                (String::from("server.old-1"), ChangeType::Delete),
                (String::from("server.old-2"), ChangeType::Delete),
            ]
        );
    }

    #[test]
    fn test_same_name_different_type_are_distinct() {
        let current = vec![res("server", "main", json!({"x": 1}))];
        let desired = vec![res("database", "main", json!({"x": 1}))];
        let summary = DiffEngine::new().compare_states(&current, &desired).summary();

        assert_eq!(summary.creates, 1);
        assert_eq!(summary.deletes, 1);
        assert_eq!(summary.total_changes(), 2);
    }

    #[test]
    fn test_duplicate_current_keeps_last() {
        let current = vec![
            res("server", "web-1", json!({"x": 1})),
            res("server", "web-1", json!({"x": 2})),
        ];
        let desired = vec![res("server", "web-1", json!({"x": 2}))];
        let diff = DiffEngine::new().compare_states(&current, &desired);

        assert_eq!(diff.changes.len(), 1);
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_empty_inputs() {
        let diff = DiffEngine::new().compare_states(&[], &[]);
        assert!(diff.changes.is_empty());
        assert!(!diff.has_changes());
        assert_eq!(diff.to_string(), "No changes required");
    }

    #[test]
    fn test_display() {
        let current = vec![res("server", "web-1", json!({"region": "a", "size": "s"}))];
        let desired = vec![res("server", "web-1", json!({"region": "b", "size": "m"}))];
        let diff = DiffEngine::new().compare_states(&current, &desired);

        assert_eq!(
            diff.changes[0].to_string(),
            "server.web-1: update (region, size)"
        );
        assert!(diff.to_string().starts_with("Diff (1 changes):"));
    }

    #[test]
    fn test_change_type_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(ChangeType::NoChange).unwrap(),
            json!("no-change")
        );
    }
}
