//! SM-005: Targeted removal of one resource block from a generated config.
//!
//! A line-oriented balanced-delimiter scanner, not an HCL parser: it tracks
//! brace depth from the declaration line onward and drops lines until the
//! block closes. Assumes braces do not appear inside string literals within
//! the removed block — acceptable for configs this tool generated itself.

use std::path::Path;

/// Remove the block declaring `resource "<tf_type>" "<name>"` from `text`.
///
/// Absent declarations are silent: the text comes back unchanged apart from
/// the cleanup pass, which always runs.
pub fn remove_block(text: &str, tf_type: &str, name: &str) -> String {
    remove_declared(text, &format!("resource \"{}\" \"{}\"", tf_type, name))
}

/// Remove the block declaring `output "<name>"`. Used after a resource
/// removal to drop outputs that would otherwise dangle.
pub fn remove_output(text: &str, name: &str) -> String {
    remove_declared(text, &format!("output \"{}\"", name))
}

fn remove_declared(text: &str, declaration: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut skipping = false;
    let mut depth: i32 = 0;

    for line in text.lines() {
        if !skipping && line.contains(declaration) {
            skipping = true;
            depth = brace_delta(line);
            // A one-line block closes on its own declaration line
            if depth <= 0 {
                skipping = false;
            }
            continue;
        }

        if skipping {
            depth += brace_delta(line);
            if depth <= 0 {
                skipping = false;
            }
            continue;
        }

        kept.push(line);
    }

    cleanup(&kept)
}

/// Opening minus closing braces on one line.
fn brace_delta(line: &str) -> i32 {
    let opens = line.matches('{').count() as i32;
    let closes = line.matches('}').count() as i32;
    opens - closes
}

/// Drop blank lines and any lone `}` stranded at a boundary (file start or
/// directly after blank lines) by an earlier removal.
fn cleanup(lines: &[&str]) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut at_boundary = true;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            at_boundary = true;
            continue;
        }
        if trimmed == "}" && at_boundary {
            continue;
        }
        at_boundary = false;
        out.push(line);
    }

    let mut result = out.join("\n");
    if !result.is_empty() {
        result.push('\n');
    }
    result
}

/// File wrapper around `remove_block` — read, rewrite, overwrite in place.
/// Any `outputs` named here are removed in the same rewrite, for outputs
/// whose value referenced the removed resource.
pub fn remove_from_file(
    path: &Path,
    tf_type: &str,
    name: &str,
    outputs: &[&str],
) -> Result<(), String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let mut cleaned = remove_block(&text, tf_type, name);
    for output in outputs {
        cleaned = remove_output(&cleaned, output);
    }
    std::fs::write(path, cleaned).map_err(|e| format!("cannot write {}: {}", path.display(), e))
}
