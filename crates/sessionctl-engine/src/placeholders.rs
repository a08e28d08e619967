//! Fixed placeholder text for deterministic trim and smart-trim (spec
//! §4.3.1, §4.3.2). SPEC_FULL.md pins these down verbatim since spec.md
//! itself only requires "a fixed truncation notice".

/// Appended after the kept prefix of an oversized tool result's content
/// (spec §4.3.1 rule 4): cites the parent file and the 1-based line number
/// so a reader can go find what was cut.
pub fn truncation_notice(parent_file: &str, line_number: usize) -> String {
    format!("\n[... truncated by trim, see line {line_number} of {parent_file} for original content]")
}

/// Replaces a selected assistant message wholesale. `{0}` = parent file
/// path, `{1}` = original line index (1-based, matching how the notice is
/// read back by a human skimming the parent).
pub fn assistant_message_notice(parent_file: &str, line_number: usize) -> String {
    format!(
        "[Assistant message suppressed by trim - see line {line_number} of {parent_file} for original content]"
    )
}

/// The smart-trim single-line placeholder record (spec §4.3.2 step 6).
pub fn smart_trim_placeholder(original_length: usize, line_number: usize) -> serde_json::Value {
    serde_json::json!({
        "trimmed_line": true,
        "original_length": original_length,
        "line_number": line_number,
    })
}
