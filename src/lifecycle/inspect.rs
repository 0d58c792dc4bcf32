//! SM-012: State inspection — a read-only view of what Terraform believes
//! it manages.
//!
//! Every outcome short of a spawn failure is a `StateSnapshot` variant, so
//! callers can render "no state yet" and "tool broke" differently instead of
//! collapsing both into an error.

use crate::core::types::{ResourceSummary, StateSnapshot};
use crate::lifecycle::{Runner, Stage};
use std::path::Path;
use std::time::Duration;

/// Run `show -json` in `dir` and classify the result.
///
/// A missing directory short-circuits to `NotFound` without spawning
/// anything. Only a spawn failure is an `Err`.
pub fn inspect(binary: &Path, dir: &Path) -> Result<StateSnapshot, String> {
    if !dir.is_dir() {
        return Ok(StateSnapshot::NotFound {
            directory: dir.to_path_buf(),
        });
    }

    let runner = Runner::new(binary);
    let stage = Stage::new("show", &["show", "-json"], Duration::from_secs(60), true);
    let outcome = runner.run(dir, &[stage], true);

    if let Some(error) = outcome.error {
        return Err(error);
    }
    // Exactly one stage ran if we got here
    let result = outcome
        .stages
        .into_iter()
        .next()
        .ok_or_else(|| "show produced no stage result".to_string())?;

    if !result.success() {
        return Ok(StateSnapshot::ToolFailed {
            stderr: result.stderr,
        });
    }

    match serde_json::from_str(&result.stdout) {
        Ok(state) => Ok(StateSnapshot::Parsed { state }),
        Err(_) => Ok(StateSnapshot::Unparsed {
            raw: result.stdout,
        }),
    }
}

/// Extract per-resource summaries from a parsed snapshot, walking
/// `values.root_module.resources`. Absent paths yield an empty list.
pub fn resource_summaries(state: &serde_json::Value) -> Vec<ResourceSummary> {
    let resources = match state
        .pointer("/values/root_module/resources")
        .and_then(|r| r.as_array())
    {
        Some(r) => r,
        None => return Vec::new(),
    };

    resources
        .iter()
        .map(|resource| {
            let mut attributes = Vec::new();
            if let Some(values) = resource.get("values").and_then(|v| v.as_object()) {
                for key in ["id", "arn", "name", "state"] {
                    if let Some(value) = values.get(key).and_then(|v| v.as_str()) {
                        attributes.push((key.to_string(), value.to_string()));
                    }
                }
            }
            ResourceSummary {
                resource_type: resource
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("")
                    .to_string(),
                name: resource
                    .get("name")
                    .and_then(|n| n.as_str())
                    .unwrap_or("")
                    .to_string(),
                attributes,
            }
        })
        .collect()
}
