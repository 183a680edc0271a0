//! Tokio.rs reexports to prevent tokio dependencies within external code

pub use tokio::net::{
    tcp::{OwnedReadHalf, OwnedWriteHalf},
    TcpListener, TcpStream, ToSocketAddrs,
};
