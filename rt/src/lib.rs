//! Runtime wrapper to remove dependencies from code. The conversation and
//! transport crates only reach tokio through the re-exports in [`tasks`], so
//! swapping the executor means touching this crate alone.
//!
//! Currently, only the slice of tokio functionality the workspace needs is
//! reexported. We may want to extend this functionality as needed.

pub mod tasks;
mod tracing;
