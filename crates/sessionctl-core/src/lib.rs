//! Home-directory resolution and shared error types.
//!
//! Deliberately thin: this crate knows *where* an agent's logs live, not how
//! to parse them (see `sessionctl-providers`) or what to do with them (see
//! `sessionctl-engine`).

mod error;
mod path;
mod store;

pub use error::{Error, Result};
pub use path::{expand_tilde, normalize_path, paths_equal};
pub use store::{encode_claude_project_dir, home_dir, sessions_root};
