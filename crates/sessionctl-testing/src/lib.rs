//! Internal testing utilities: session fixture builders, structural
//! assertions, and CLI process helpers shared across this workspace's
//! integration tests. Not published, not intended for use outside this
//! repository.

pub mod assertions;
pub mod fixtures;
pub mod process;

pub use fixtures::{ClaudeFixture, CodexFixture};
