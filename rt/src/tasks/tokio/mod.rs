//! Tokio.rs reexports to prevent tokio dependencies within external code
pub mod codec;
pub mod io;
pub mod mpsc;
pub mod net;
pub mod watch;

pub use tokio::{
    runtime::Runtime,
    sync::Mutex,
    task::{spawn, JoinHandle},
    time::sleep,
};
pub use tokio_util::sync::CancellationToken;
