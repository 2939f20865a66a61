//! Output formatting for CLI commands.
//!
//! This module renders diffs, validation results and state listings as
//! colored text or JSON.

use colored::Colorize;
use serde_json::Value;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{ConfigHasher, Properties, SyncConfig, ValidationResult};
use crate::planner::{ChangeType, Diff, DiffSummary, PropertyChange, ResourceChange};

use super::commands::OutputFormat;

/// Width of the plan banner rules.
const BANNER_WIDTH: usize = 70;

/// Width of the per-resource rules.
const SECTION_WIDTH: usize = 50;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Resource row for table display.
#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "Resource")]
    key: String,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Properties")]
    properties: usize,
    #[tabled(rename = "Hash")]
    hash: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a diff as a change plan.
    #[must_use]
    pub fn format_plan(&self, diff: &Diff, config_hash: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&PlanJson::new(diff, config_hash)).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_plan_text(diff, config_hash),
        }
    }

    /// Formats a plan as text.
    fn format_plan_text(diff: &Diff, config_hash: &str) -> String {
        if !diff.has_changes() {
            return format!(
                "\n{}\n",
                "✓ No changes detected. Infrastructure is up to date.".green()
            );
        }

        let rule = "=".repeat(BANNER_WIDTH);
        let mut output = String::new();

        let _ = writeln!(output, "\n{rule}");
        let _ = writeln!(output, "{}", "  Infrastructure Change Plan".cyan());
        let _ = writeln!(
            output,
            "  Config hash: {}",
            ConfigHasher::new().short_hash(config_hash)
        );
        let _ = writeln!(output, "{rule}");

        for change in diff.actionable_changes() {
            match change.change_type {
                ChangeType::Create => Self::write_create(&mut output, change),
                ChangeType::Update => Self::write_update(&mut output, change),
                ChangeType::Delete => Self::write_delete(&mut output, change),
                ChangeType::NoChange => {}
            }
        }

        let _ = writeln!(output, "\n{}", "-".repeat(BANNER_WIDTH));
        let _ = writeln!(output, "{}", "\nPlan Summary:".cyan());
        let _ = writeln!(output, "  {}", Self::format_summary(diff.summary()));

        let _ = writeln!(output, "\n{rule}");
        let _ = writeln!(
            output,
            "{}",
            "\nNote: This is a preview. No changes have been applied.".cyan()
        );
        let _ = writeln!(output, "{rule}");

        output
    }

    /// Formats the summary line, omitting zero counts.
    fn format_summary(summary: DiffSummary) -> String {
        let mut parts = Vec::new();
        if summary.creates > 0 {
            parts.push(format!("+ {} to create", summary.creates).green().to_string());
        }
        if summary.updates > 0 {
            parts.push(format!("~ {} to update", summary.updates).yellow().to_string());
        }
        if summary.deletes > 0 {
            parts.push(format!("- {} to delete", summary.deletes).red().to_string());
        }
        parts.join("  ")
    }

    fn write_create(output: &mut String, change: &ResourceChange) {
        let _ = writeln!(
            output,
            "\n{}",
            format!("+ CREATE: {}", change.resource.key()).green()
        );
        let _ = writeln!(output, "{}", "-".repeat(SECTION_WIDTH));
        Self::write_properties(output, &change.resource.properties, '+');
    }

    fn write_delete(output: &mut String, change: &ResourceChange) {
        let _ = writeln!(
            output,
            "\n{}",
            format!("- DELETE: {}", change.resource.key()).red()
        );
        let _ = writeln!(output, "{}", "-".repeat(SECTION_WIDTH));
        Self::write_properties(output, &change.resource.properties, '-');
    }

    fn write_update(output: &mut String, change: &ResourceChange) {
        let _ = writeln!(
            output,
            "\n{}",
            format!("~ UPDATE: {}", change.resource.key()).yellow()
        );
        let _ = writeln!(output, "{}", "-".repeat(SECTION_WIDTH));

        for prop in &change.property_changes {
            Self::write_property_change(output, prop);
        }
    }

    fn write_property_change(output: &mut String, prop: &PropertyChange) {
        if prop.is_addition() {
            let new = prop.new_value.as_ref().map(display_value).unwrap_or_default();
            let line = format!("    + {}: {new}", prop.key);
            let _ = writeln!(output, "{}", line.green());
        } else if prop.is_removal() {
            let old = prop.old_value.as_ref().map(display_value).unwrap_or_default();
            let line = format!("    - {}: {old}", prop.key);
            let _ = writeln!(output, "{}", line.red());
        } else if let (Some(old), Some(new)) = (&prop.old_value, &prop.new_value) {
            let _ = writeln!(output, "{}", format!("    ~ {}:", prop.key).yellow());
            let _ = writeln!(output, "{}", format!("        - {}", display_value(old)).red());
            let _ = writeln!(output, "{}", format!("        + {}", display_value(new)).green());
        }
    }

    fn write_properties(output: &mut String, properties: &Properties, sign: char) {
        for (key, value) in properties {
            let line = format!("    {sign} {key}: {}", display_value(value));
            let painted = if sign == '+' { line.green() } else { line.red() };
            let _ = writeln!(output, "{painted}");
        }
    }

    /// Formats a validation result with a configuration summary.
    #[must_use]
    pub fn format_validation(
        &self,
        config: &SyncConfig,
        result: &ValidationResult,
        show_warnings: bool,
    ) -> String {
        let hash = ConfigHasher::new().hash_config(config);

        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "valid": result.is_valid(),
                "version": config.version,
                "resources": config.resource_count(),
                "config_hash": hash,
                "errors": result.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "warnings": result.warnings,
            }))
            .unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = if result.is_valid() {
                    format!("{} Configuration is valid!\n", "✓".green())
                } else {
                    let mut output = format!("{} Configuration is invalid:\n", "✗".red());
                    for error in &result.errors {
                        let _ = writeln!(output, "   - {error}");
                    }
                    output
                };

                if show_warnings && !result.warnings.is_empty() {
                    let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
                    for warning in &result.warnings {
                        let _ = writeln!(output, "   - {warning}");
                    }
                }

                output.push_str("\nConfiguration summary:\n");
                let _ = writeln!(output, "   Version: {}", config.version);
                let _ = writeln!(output, "   Resources: {}", config.resource_count());
                let short = ConfigHasher::new().short_hash(&hash);
                let _ = writeln!(output, "   Config hash: {short}");
                output
            }
        }
    }

    /// Formats a current-state snapshot.
    #[must_use]
    pub fn format_state(&self, state: &SyncConfig, source: &str) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(state).unwrap_or_default(),
            OutputFormat::Text => {
                let mut output =
                    format!("\nCurrent state: {source} (version {})\n\n", state.version);

                if state.resources.is_empty() {
                    output.push_str("   No resources found.\n");
                    return output;
                }

                let hasher = ConfigHasher::new();
                let rows: Vec<ResourceRow> = state
                    .resources
                    .iter()
                    .map(|r| ResourceRow {
                        key: r.key(),
                        resource_type: r.resource_type.clone(),
                        properties: r.properties.len(),
                        hash: hasher.short_hash(&hasher.hash_resource(r)),
                    })
                    .collect();

                output.push_str(&Table::new(rows).to_string());
                output.push('\n');
                let _ = write!(output, "\n{} resources\n", state.resources.len());
                output
            }
        }
    }
}

/// Renders a property value for humans: strings bare, everything else as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// JSON serialization helpers

#[derive(serde::Serialize)]
struct PlanJson<'a> {
    config_hash: &'a str,
    computed_at: String,
    has_changes: bool,
    summary: DiffSummary,
    changes: Vec<ChangeJson<'a>>,
}

#[derive(serde::Serialize)]
struct ChangeJson<'a> {
    action: ChangeType,
    resource: String,
    #[serde(rename = "type")]
    resource_type: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<&'a Properties>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    property_changes: Vec<&'a PropertyChange>,
}

impl<'a> PlanJson<'a> {
    fn new(diff: &'a Diff, config_hash: &'a str) -> Self {
        Self {
            config_hash,
            computed_at: diff.computed_at.to_rfc3339(),
            has_changes: diff.has_changes(),
            summary: diff.summary(),
            changes: diff.changes.iter().map(ChangeJson::from).collect(),
        }
    }
}

impl<'a> From<&'a ResourceChange> for ChangeJson<'a> {
    fn from(change: &'a ResourceChange) -> Self {
        let properties = matches!(change.change_type, ChangeType::Create | ChangeType::Delete)
            .then_some(&change.resource.properties);

        Self {
            action: change.change_type,
            resource: change.resource.key(),
            resource_type: &change.resource.resource_type,
            name: &change.resource.name,
            properties,
            property_changes: change.property_changes.iter().collect(),
        }
    }
}
