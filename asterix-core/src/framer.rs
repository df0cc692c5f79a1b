//! Split a raw byte stream into ASTERIX data block frames.
//!
//! Wire format per message: `[1 byte category][2 bytes BE length L][L-3 bytes
//! payload]`. The framer performs no field interpretation; a truncated tail
//! (declared length exceeding the remaining buffer) ends iteration silently,
//! which is the normal condition at recording file boundaries.

/// One framed ASTERIX message: category header plus its payload span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMessage<'a> {
    pub category: u8,
    /// Declared total length including the 3-byte header.
    pub declared_length: u16,
    pub payload: &'a [u8],
}

/// Lazy iterator of frames over an in-memory buffer.
pub struct Framer<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Framer<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Framer { buf, pos: 0 }
    }

    /// Byte offset of the next unread frame.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Framer<'a> {
    type Item = RawMessage<'a>;

    fn next(&mut self) -> Option<RawMessage<'a>> {
        let remaining = &self.buf[self.pos..];
        if remaining.len() < 3 {
            return None;
        }

        let category = remaining[0];
        let declared_length = u16::from_be_bytes([remaining[1], remaining[2]]);

        // A length below the header size can never frame correctly; treat the
        // rest of the stream as unrecoverable.
        if declared_length < 3 {
            self.pos = self.buf.len();
            return None;
        }

        if remaining.len() < declared_length as usize {
            // Truncated tail, end of stream
            return None;
        }

        let payload = &remaining[3..declared_length as usize];
        self.pos += declared_length as usize;

        Some(RawMessage {
            category,
            declared_length,
            payload,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
