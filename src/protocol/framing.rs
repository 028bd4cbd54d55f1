//! Length-prefix record framing for the action journal.
//!
//! ```text
//! ┌────────────┬───────────────────────────┐
//! │ Length (4B)│ postcard payload (N B)    │
//! │ LE u32     │                           │
//! └────────────┴───────────────────────────┘
//! ```
//!
//! A journal may end in a partially written frame if the process died
//! mid-append.  [`Frames`] stops cleanly at that point and reports how
//! many bytes were left over.

/// Largest accepted record payload.
pub const MAX_FRAME_SIZE: usize = 1024;

const HEADER_SIZE: usize = 4;

/// Append `[LE-u32 length][payload]` to `out`.
///
/// Returns `None` if the payload exceeds [`MAX_FRAME_SIZE`].
pub fn encode_frame(payload: &[u8], out: &mut Vec<u8>) -> Option<usize> {
    if payload.is_empty() || payload.len() > MAX_FRAME_SIZE {
        return None;
    }
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    Some(HEADER_SIZE + payload.len())
}

/// Iterator over complete frame payloads in a byte buffer.
pub struct Frames<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Frames<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Bytes after the last complete frame (a torn or invalid tail).
    pub fn remainder(&self) -> usize {
        self.buf.len() - self.offset
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let rest = &self.buf[self.offset..];
        let header: [u8; HEADER_SIZE] = rest.get(..HEADER_SIZE)?.try_into().ok()?;
        let len = u32::from_le_bytes(header) as usize;
        if len == 0 || len > MAX_FRAME_SIZE {
            return None;
        }
        let payload = rest.get(HEADER_SIZE..HEADER_SIZE + len)?;
        self.offset += HEADER_SIZE + len;
        Some(payload)
    }
}
