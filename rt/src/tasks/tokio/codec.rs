//! Tokio-util codec reexports, so framing code does not depend on tokio-util directly

pub use tokio_util::codec::{Decoder, Encoder, FramedRead, FramedWrite};
