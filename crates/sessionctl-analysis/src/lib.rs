//! Chunk dispatch and verdict parsing for the smart-trim analysis pipeline
//! (spec §4.5). This crate knows nothing about session files or dialects —
//! `sessionctl-engine` builds the candidate lines and chunk jobs, this
//! crate only runs them and turns replies into [`Verdict`]s.

pub mod chunk;
pub mod error;
pub mod parse;
pub mod prompt;
pub mod worker;

pub use chunk::{CandidateLine, DEFAULT_CHUNK_SIZE, partition};
pub use error::{Error, Result};
pub use parse::{extract_json_array, parse_verdicts};
pub use prompt::{PromptContext, build_prompt, join_preview_fields, truncate_preview};
pub use worker::{ChunkJob, CommandRunner, ProcessOutput, TokioCommandRunner, dispatch_one, dispatch_parallel};

/// Hard floor below which a verdict is dropped even if a worker recommends
/// it (spec §4.3.2 step 5 default).
pub const SMART_TRIM_HARD_FLOOR: usize = 500;

/// Content-extraction threshold: a field shorter than this is dropped from
/// the candidate pool entirely (spec §4.3.2 step 2 default).
pub const CONTENT_EXTRACTION_THRESHOLD: usize = 200;
