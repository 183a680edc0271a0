use bytes::{Buf, BufMut, BytesMut};
use parley_conversation::{Message, MessageKind, TransportError};
use parley_rt::tasks::codec::{Decoder, Encoder};

/// Version byte written at the head of every frame body.
pub const WIRE_VERSION: u8 = 1;
/// Largest accepted frame body, in bytes.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

const LENGTH_PREFIX: usize = 4;
const KIND_NORMAL: u8 = 0;
const KIND_STOP: u8 = 1;

/// Length-prefixed, versioned framing for [`Message`].
///
/// Layout, big endian:
///
/// ```text
/// u32 body_len | u8 version | u8 kind | u16 sender_len | sender | u32 content_len | content
/// ```
///
/// `body_len` counts everything after itself. Strings are UTF-8.
#[derive(Debug, Default, Clone, Copy)]
pub struct WireCodec;

impl WireCodec {
    pub fn new() -> Self {
        Self
    }
}

// --- Encoder Implementation (Message -> BytesMut) ---
impl Encoder<Message> for WireCodec {
    type Error = TransportError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let sender = item.sender().as_bytes();
        let content = item.content().as_bytes();

        let sender_len = u16::try_from(sender.len())
            .map_err(|_| TransportError::Malformed("sender name too long".to_string()))?;
        let body_len = 1 + 1 + 2 + sender.len() + 4 + content.len();
        if body_len > MAX_FRAME_LEN {
            return Err(TransportError::Malformed(format!(
                "frame of {body_len} bytes exceeds limit of {MAX_FRAME_LEN}"
            )));
        }
        let kind = match item.kind() {
            MessageKind::Normal => KIND_NORMAL,
            MessageKind::Stop => KIND_STOP,
        };

        dst.reserve(LENGTH_PREFIX + body_len);
        dst.put_u32(body_len as u32);
        dst.put_u8(WIRE_VERSION);
        dst.put_u8(kind);
        dst.put_u16(sender_len);
        dst.put_slice(sender);
        dst.put_u32(content.len() as u32);
        dst.put_slice(content);
        Ok(())
    }
}

// --- Decoder Implementation (BytesMut -> Message) ---
impl Decoder for WireCodec {
    type Item = Message;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < LENGTH_PREFIX {
            return Ok(None);
        }

        let mut prefix = &src[..LENGTH_PREFIX];
        let body_len = prefix.get_u32() as usize;
        if body_len > MAX_FRAME_LEN {
            return Err(TransportError::Malformed(format!(
                "announced frame of {body_len} bytes exceeds limit of {MAX_FRAME_LEN}"
            )));
        }

        let frame_len = LENGTH_PREFIX + body_len;
        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_PREFIX);
        let mut body = src.split_to(body_len);
        parse_body(&mut body).map(Some)
    }
}

fn parse_body(body: &mut BytesMut) -> Result<Message, TransportError> {
    ensure_remaining(body, 2, "header")?;
    let version = body.get_u8();
    if version != WIRE_VERSION {
        return Err(TransportError::Malformed(format!(
            "unsupported wire version {version}"
        )));
    }
    let kind = body.get_u8();

    ensure_remaining(body, 2, "sender length")?;
    let sender_len = body.get_u16() as usize;
    let sender = take_string(body, sender_len, "sender")?;

    ensure_remaining(body, 4, "content length")?;
    let content_len = body.get_u32() as usize;
    let content = take_string(body, content_len, "content")?;

    if body.has_remaining() {
        return Err(TransportError::Malformed(format!(
            "{} trailing bytes in frame",
            body.remaining()
        )));
    }

    match kind {
        KIND_NORMAL => Ok(Message::normal(sender, content)),
        KIND_STOP => Ok(Message::stop(sender)),
        other => Err(TransportError::Malformed(format!("unknown message kind {other}"))),
    }
}

fn ensure_remaining(body: &BytesMut, needed: usize, what: &str) -> Result<(), TransportError> {
    if body.remaining() < needed {
        return Err(TransportError::Malformed(format!("truncated {what}")));
    }
    Ok(())
}

fn take_string(body: &mut BytesMut, len: usize, what: &str) -> Result<String, TransportError> {
    ensure_remaining(body, len, what)?;
    let bytes = body.split_to(len);
    String::from_utf8(bytes.to_vec())
        .map_err(|_| TransportError::Malformed(format!("{what} is not valid UTF-8")))
}
