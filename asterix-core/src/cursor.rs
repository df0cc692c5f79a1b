//! Bounds-checked byte cursor shared by all field decoders.
//!
//! Every read checks against `record_end` before consuming bytes. A failed
//! check is a recoverable per-field error, never a panic — ASTERIX recordings
//! routinely end mid-record and the decoder must degrade field-by-field.

use crate::types::{AsterixError, Result};

/// Cursor over one record's payload slice with an exclusive end boundary.
#[derive(Debug)]
pub struct FieldCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    record_end: usize,
}

impl<'a> FieldCursor<'a> {
    /// Cursor over the whole slice.
    pub fn new(buf: &'a [u8]) -> Self {
        FieldCursor {
            buf,
            pos: 0,
            record_end: buf.len(),
        }
    }

    /// Current byte offset into the slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left before `record_end`.
    pub fn remaining(&self) -> usize {
        self.record_end - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.record_end
    }

    fn check(&self, needed: usize) -> Result<()> {
        if self.pos + needed <= self.record_end {
            Ok(())
        } else {
            Err(AsterixError::FieldOutOfBounds {
                needed,
                remaining: self.remaining(),
            })
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.check(1)?;
        let v = self.buf[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.check(2)?;
        let v = u16::from_be_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;
        Ok(v)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u24(&mut self) -> Result<u32> {
        self.check(3)?;
        let v = ((self.buf[self.pos] as u32) << 16)
            | ((self.buf[self.pos + 1] as u32) << 8)
            | (self.buf[self.pos + 2] as u32);
        self.pos += 3;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.check(4)?;
        let v = u32::from_be_bytes([
            self.buf[self.pos],
            self.buf[self.pos + 1],
            self.buf[self.pos + 2],
            self.buf[self.pos + 3],
        ]);
        self.pos += 4;
        Ok(v)
    }

    /// Read exactly `n` bytes as a subslice.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.check(n)?;
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Advance without interpreting the bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }

    /// Consume octets of an FX-chained variable-length item until an octet
    /// with the extension bit (LSB) clear. Returns the first octet.
    ///
    /// The content is not interpreted; the point is advancing the cursor so
    /// subsequent fixed-position fields stay aligned.
    pub fn skip_fx_chain(&mut self) -> Result<u8> {
        let first = self.read_u8()?;
        let mut octet = first;
        while octet & 0x01 != 0 {
            octet = self.read_u8()?;
        }
        Ok(first)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
