//! Task based runtime: one tokio task per participant loop, bounded channels
//! for mailboxes and a cancellation token per loop.

mod tokio;

use crate::tracing::init_tracing;
use std::future::Future;

pub use crate::tasks::tokio::codec;
pub use crate::tasks::tokio::io;
pub use crate::tasks::tokio::mpsc;
pub use crate::tasks::tokio::net;
pub use crate::tasks::tokio::watch;
pub use crate::tasks::tokio::CancellationToken;
pub use crate::tasks::tokio::{sleep, spawn, JoinHandle, Mutex, Runtime};

/// Initializes tracing and drives `future` to completion on a fresh
/// multi-threaded runtime.
pub fn run<F: Future>(future: F) -> F::Output {
    init_tracing();

    let rt = Runtime::new().expect("failed to build the tokio runtime");
    rt.block_on(future)
}
