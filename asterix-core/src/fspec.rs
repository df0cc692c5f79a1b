//! FSPEC presence bitmap parsing.
//!
//! Each record starts with a chain of FSPEC octets. Bits 8..2 (MSB-first) of
//! every octet are presence flags for seven consecutive Field Reference
//! Numbers; bit 1 is the FX flag signalling another octet follows.

use crate::cursor::FieldCursor;
use crate::types::{AsterixError, Result};

/// Decoded presence bitmap. FRNs are 1-based, matching the catalog tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fspec {
    bits: Vec<bool>,
    octets: usize,
}

impl Fspec {
    /// True if the item with the given 1-based FRN is present.
    ///
    /// FRNs beyond the decoded octets are absent, not an error.
    pub fn is_set(&self, frn: usize) -> bool {
        frn >= 1 && self.bits.get(frn - 1).copied().unwrap_or(false)
    }

    /// Number of presence bits: always `7 * octets()`.
    pub fn bit_count(&self) -> usize {
        self.bits.len()
    }

    /// Whole octets consumed from the payload.
    pub fn octets(&self) -> usize {
        self.octets
    }

    /// Highest FRN marked present, or 0 when the bitmap is empty.
    pub fn last_set(&self) -> usize {
        self.bits
            .iter()
            .rposition(|&b| b)
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

/// Parse an FSPEC chain at the cursor position.
///
/// An FX bit set on the final available octet means the chain runs past the
/// buffer: `MalformedFspec`, a structural failure for the whole record.
pub fn parse_fspec(cursor: &mut FieldCursor) -> Result<Fspec> {
    let mut bits = Vec::with_capacity(7);
    let mut octets = 0;

    loop {
        let octet = cursor.read_u8().map_err(|_| AsterixError::MalformedFspec)?;
        octets += 1;
        for bit in (1..8).rev() {
            bits.push(octet & (1 << bit) != 0);
        }
        if octet & 0x01 == 0 {
            break;
        }
    }

    Ok(Fspec { bits, octets })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
