use crate::chunk::CandidateLine;

/// Parameters that shape a chunk prompt, shared by both worker modes (spec
/// §4.5 "Prompt shape (both modes)").
#[derive(Debug, Clone)]
pub struct PromptContext<'a> {
    pub chunk_index: usize,
    pub chunk_count: usize,
    pub char_threshold: usize,
    pub custom_instructions: Option<&'a str>,
}

/// Render the full prompt for one chunk: header, candidate lines, and the
/// required (verbose, 3-tuple) output format.
pub fn build_prompt(ctx: &PromptContext, candidates: &[CandidateLine]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "You are reviewing chunk {}/{} of a coding-agent session transcript for trimming.\n",
        ctx.chunk_index + 1,
        ctx.chunk_count
    ));
    out.push_str(
        "Protected lines (user messages, reasoning, session metadata, sidechain markers, \
         and anything already excluded from this list) must never be selected.\n",
    );
    out.push_str(&format!(
        "Only select lines whose content is at least {} characters long and whose removal \
         would not lose information needed to understand the conversation.\n",
        ctx.char_threshold
    ));
    if let Some(instructions) = ctx.custom_instructions {
        out.push_str("=== USER INSTRUCTIONS (PRIORITIZE THESE) ===\n");
        out.push_str(instructions);
        out.push_str("\n=== END USER INSTRUCTIONS ===\n");
    }
    out.push('\n');

    for c in candidates {
        out.push_str(&format!(
            "LINE {} [len={}]: [{}]: {}\n\n",
            c.line_number, c.length, c.kind_label, c.preview
        ));
    }

    out.push_str(
        "Respond with a single JSON array of [line, rationale, description] tuples for every \
         line you recommend trimming. Use an empty array if nothing in this chunk should be \
         trimmed. Do not include any other text in your response.",
    );
    out
}

/// Truncate a preview field to the mode-appropriate length (SPEC_FULL.md
/// §4.5+: 300 chars for CLI-mode prompts, 500 for SDK-mode chunk previews).
pub fn truncate_preview(text: &str, max_len: usize) -> String {
    sessionctl_types::truncate(text, max_len)
}

/// Join up to `max_fields` extracted text fields into one preview line with
/// `" | "` separators (SPEC_FULL.md §4.5+).
pub fn join_preview_fields(fields: &[String], max_fields: usize, max_len: usize) -> String {
    fields
        .iter()
        .take(max_fields)
        .map(|f| truncate_preview(f, max_len))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_custom_instructions_delimited() {
        let ctx = PromptContext {
            chunk_index: 0,
            chunk_count: 1,
            char_threshold: 500,
            custom_instructions: Some("keep anything about auth"),
        };
        let rendered = build_prompt(&ctx, &[]);
        assert!(rendered.contains("=== USER INSTRUCTIONS (PRIORITIZE THESE) ==="));
        assert!(rendered.contains("keep anything about auth"));
    }

    #[test]
    fn join_preview_fields_caps_count() {
        let fields = vec!["a".repeat(10), "b".repeat(10), "c".repeat(10), "d".repeat(10)];
        let joined = join_preview_fields(&fields, 3, 500);
        assert_eq!(joined.matches(" | ").count(), 2);
    }
}
