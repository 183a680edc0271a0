//! TCP transport for participants living in separate processes.
//!
//! A connected stream is split in two. The write half becomes the
//! participant's outbound handle; the read half is pumped into the
//! participant's mailbox, so the loop keeps a single inbound queue that also
//! carries its self-delivered STOP.

use futures::future::{BoxFuture, FutureExt as _};
use futures::{SinkExt as _, StreamExt as _};
use parley_conversation::{
    ConfigError, MailboxSender, Message, MessageReceiver, MessageSender, Participant,
    TransportError,
};
use parley_rt::tasks::{
    self as rt,
    codec::{FramedRead, FramedWrite},
    net::{OwnedReadHalf, OwnedWriteHalf, TcpListener, TcpStream, ToSocketAddrs},
    JoinHandle, Mutex,
};
use std::{net::SocketAddr, sync::Arc};

use crate::codec::WireCodec;

/// Write half of a connection. Frames are written one at a time.
#[derive(Debug)]
pub struct SocketSender {
    writer: Mutex<FramedWrite<OwnedWriteHalf, WireCodec>>,
    peer: Option<SocketAddr>,
}

impl SocketSender {
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl MessageSender for SocketSender {
    fn send(&self, message: Message) -> BoxFuture<'_, Result<(), TransportError>> {
        async move {
            let mut writer = self.writer.lock().await;
            tracing::debug!(peer = ?self.peer, %message, "Writing frame");
            writer.send(message).await
        }
        .boxed()
    }
}

/// Read half of a connection.
#[derive(Debug)]
pub struct SocketReceiver {
    reader: FramedRead<OwnedReadHalf, WireCodec>,
}

impl SocketReceiver {
    /// Next decoded message; `Ok(None)` once the peer has closed the stream.
    pub async fn recv(&mut self) -> Result<Option<Message>, TransportError> {
        self.reader.next().await.transpose()
    }
}

impl MessageReceiver for SocketReceiver {
    fn receive(&mut self) -> BoxFuture<'_, Result<Option<Message>, TransportError>> {
        self.recv().boxed()
    }
}

pub fn split(stream: TcpStream) -> (SocketSender, SocketReceiver) {
    let peer = stream.peer_addr().ok();
    let (read_half, write_half) = stream.into_split();
    (
        SocketSender {
            writer: Mutex::new(FramedWrite::new(write_half, WireCodec::new())),
            peer,
        },
        SocketReceiver {
            reader: FramedRead::new(read_half, WireCodec::new()),
        },
    )
}

/// Spawns a task forwarding every decoded message into `mailbox`.
///
/// End of stream is forwarded as the mailbox's end marker and a receive
/// failure as a failure, so the loop reading the mailbox stops either way.
/// The pump exits once the mailbox has no receiver left.
pub fn spawn_pump(mut receiver: SocketReceiver, mailbox: MailboxSender) -> JoinHandle<()> {
    rt::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(Some(message)) => {
                    if mailbox.deliver(message).await.is_err() {
                        tracing::trace!("Mailbox closed, stopping socket pump");
                        break;
                    }
                }
                Ok(None) => {
                    tracing::debug!("Socket stream finished");
                    if let Err(error) = mailbox.end().await {
                        tracing::trace!(%error, "Mailbox closed before end of stream was queued");
                    }
                    break;
                }
                Err(error) => {
                    tracing::warn!(%error, "Socket receive failed");
                    if let Err(error) = mailbox.fail(error).await {
                        tracing::trace!(%error, "Mailbox closed before the failure was queued");
                    }
                    break;
                }
            }
        }
    })
}

/// Makes `stream` the participant's link to its peer: the write half is bound
/// as the outbound handle and the read half feeds the participant's mailbox.
pub fn attach(participant: &Participant, stream: TcpStream) -> Result<JoinHandle<()>, ConfigError> {
    let (sender, receiver) = split(stream);
    tracing::info!(participant = %participant.name(), peer = ?sender.peer(), "Attaching socket");
    participant.bind_outbound(Arc::new(sender))?;
    Ok(spawn_pump(receiver, participant.mailbox()))
}

pub async fn bind(addr: impl ToSocketAddrs) -> Result<TcpListener, TransportError> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(local = ?listener.local_addr().ok(), "Listening");
    Ok(listener)
}

/// Waits for a single peer on `listener`.
pub async fn accept(listener: &TcpListener) -> Result<TcpStream, TransportError> {
    tracing::info!("Waiting for peer...");
    let (stream, peer) = listener.accept().await?;
    stream.set_nodelay(true)?;
    tracing::info!(%peer, "Peer connected");
    Ok(stream)
}

/// Binds `addr` and accepts exactly one peer.
pub async fn listen(addr: impl ToSocketAddrs) -> Result<TcpStream, TransportError> {
    let listener = bind(addr).await?;
    accept(&listener).await
}

pub async fn dial(addr: impl ToSocketAddrs) -> Result<TcpStream, TransportError> {
    let stream = TcpStream::connect(addr).await?;
    stream.set_nodelay(true)?;
    tracing::info!(peer = ?stream.peer_addr().ok(), "Connected");
    Ok(stream)
}
