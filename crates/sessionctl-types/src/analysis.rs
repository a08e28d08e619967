use serde::{Deserialize, Serialize};

/// One trimmable-line recommendation from an analysis worker.
///
/// Workers are always asked for the verbose 3-tuple shape (`[line,
/// rationale, description]`); the bare `[int, ...]` shape some older
/// prompts accept on the way in is normalized to this on the way out, with
/// `rationale` and `description` left empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verdict {
    pub line_number: usize,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub description: String,
}

impl Verdict {
    pub fn bare(line_number: usize) -> Self {
        Self { line_number, rationale: String::new(), description: String::new() }
    }
}

/// The union of every chunk's surviving verdicts for one smart-trim run,
/// after protected-event and hard-floor filtering (spec §4.3.2 step 5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrimPlan {
    pub lines: Vec<Verdict>,
}

impl TrimPlan {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, line_number: usize) -> bool {
        self.lines.iter().any(|v| v.line_number == line_number)
    }
}
