//! Length-prefixed JSON message framing
//!
//! Wire format: a 4-byte little-endian body length followed by a UTF-8
//! JSON body. This is the Chrome native-messaging framing; the browser
//! extension on the other end of the pipe speaks exactly this.

use docfill_engine::{MergeError, Result};
use serde_json::Value;
use std::io::{ErrorKind, Read, Write};

/// Maximum accepted message body size (1 MiB, the browser-side cap)
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Read one framed message.
///
/// Returns `Ok(None)` on a clean EOF before a length header, which is the
/// normal shutdown signal when the peer closes the pipe. A partially read
/// header or body is [`MergeError::TruncatedMessage`]; a declared length
/// over [`MAX_MESSAGE_BYTES`] is [`MergeError::MessageTooLarge`].
pub fn read_message<R: Read>(reader: &mut R) -> Result<Option<Value>> {
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled == 0 {
        return Ok(None);
    }
    if filled < header.len() {
        return Err(MergeError::TruncatedMessage);
    }

    let size = u32::from_le_bytes(header) as usize;
    if size > MAX_MESSAGE_BYTES {
        return Err(MergeError::MessageTooLarge { size });
    }

    let mut body = vec![0u8; size];
    reader.read_exact(&mut body).map_err(|err| {
        if err.kind() == ErrorKind::UnexpectedEof {
            MergeError::TruncatedMessage
        } else {
            MergeError::Io(err)
        }
    })?;

    Ok(Some(serde_json::from_slice(&body)?))
}

/// Write one framed message and flush.
pub fn write_message<W: Write>(writer: &mut W, message: &Value) -> Result<()> {
    let body = serde_json::to_vec(message)?;
    if body.len() > MAX_MESSAGE_BYTES {
        return Err(MergeError::MessageTooLarge { size: body.len() });
    }
    writer.write_all(&(body.len() as u32).to_le_bytes())?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}
