//! Command implementations.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use colored::Colorize;
use serde_json::json;

use crate::cli::args::OutputFormat;
use crate::components::register_builtins;
use crate::definition::{ComponentInstance, RuleDefinition};
use crate::document::{parse, write as write_document};
use crate::engine::{format_load_report, Engine};
use crate::error::RulebotError;
use crate::registry::Registry;
use crate::store::FsRuleStore;

fn builtin_registry() -> Result<Registry, RulebotError> {
    let mut registry = Registry::new();
    register_builtins(&mut registry)?;
    Ok(registry)
}

fn read_file(file: &Path) -> Result<String, RulebotError> {
    std::fs::read_to_string(file)
        .map_err(|e| RulebotError::Store(format!("Failed to read {}: {e}", file.display())))
}

/// Parse and validate one rule file.
///
/// # Errors
///
/// Fails on unreadable files, parse errors, structural errors, unknown
/// component types, and rules missing a trigger or actions.
pub fn check(file: &Path, format: OutputFormat) -> Result<String, RulebotError> {
    let text = read_file(file)?;
    let registry = builtin_registry()?;
    let document = parse(&text)?;
    let definition = RuleDefinition::from_document(&document, &registry)?;

    if definition.trigger().is_none() || definition.actions().is_empty() {
        return Err(RulebotError::Validation(
            "check that trigger and actions are set".to_string(),
        ));
    }

    let trigger_type = definition
        .trigger()
        .map(ComponentInstance::type_name)
        .unwrap_or_default();
    match format {
        OutputFormat::Pretty => {
            let name = if definition.name().is_empty() {
                "(unnamed)".dimmed().to_string()
            } else {
                definition.name().to_string()
            };
            Ok(format!(
                "{} {name}: trigger {trigger_type}, {} action(s)",
                "✓".green(),
                definition.actions().len()
            ))
        }
        OutputFormat::Json => Ok(json!({
            "file": file.display().to_string(),
            "valid": true,
            "name": definition.name(),
            "trigger": trigger_type,
            "actions": definition.actions().len(),
        })
        .to_string()),
    }
}

/// Re-serialize a rule file in canonical layout.
///
/// # Errors
///
/// Fails on unreadable files and parse errors.
pub fn fmt(file: &Path, write_back: bool) -> Result<String, RulebotError> {
    let text = read_file(file)?;
    let document = parse(&text)?;
    let formatted = write_document(&document);

    if write_back {
        std::fs::write(file, &formatted)
            .map_err(|e| RulebotError::Store(format!("Failed to write {}: {e}", file.display())))?;
        Ok(format!("Rewrote {}", file.display()))
    } else {
        Ok(formatted)
    }
}

/// Load every rule in the store and report per-rule status.
///
/// # Errors
///
/// Fails if the store cannot be opened or listed; per-rule failures are
/// part of the report.
pub fn list(dir: Option<PathBuf>, format: OutputFormat) -> Result<String, RulebotError> {
    let store = match dir {
        Some(dir) => FsRuleStore::open(dir)?,
        None => FsRuleStore::new()?,
    };
    let registry = Rc::new(builtin_registry()?);
    let mut engine = Engine::new(registry);
    engine.load_from(&store)?;

    match format {
        OutputFormat::Pretty => Ok(format_load_report(&engine)),
        OutputFormat::Json => {
            let entries: Vec<_> = engine
                .known_ids()
                .into_iter()
                .map(|id| {
                    engine.rule(id).map_or_else(
                        || {
                            let error = engine
                                .component_error(id)
                                .or_else(|| engine.rule_error(id))
                                .unwrap_or("not started");
                            json!({ "id": id, "status": "error", "error": error })
                        },
                        |rule| {
                            json!({
                                "id": id,
                                "status": "running",
                                "name": rule.name(),
                                "actions": rule.action_count(),
                            })
                        },
                    )
                })
                .collect();
            Ok(json!(entries).to_string())
        }
    }
}
