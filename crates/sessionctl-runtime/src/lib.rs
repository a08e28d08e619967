//! Workspace facade tying discovery, the index, the derivation engine, and
//! the continuation orchestrator together into the operations a CLI
//! subcommand calls directly. No process-wide globals: every operation
//! takes an explicit [`RuntimeContext`].

pub mod config;
pub mod context;
pub mod ops;

pub use config::Config;
pub use context::RuntimeContext;
