//! Shared types, error enum, and field formatting helpers for asterix-core.

use serde::Serialize;
use thiserror::Error;

/// All errors produced by asterix-core.
#[derive(Debug, Error)]
pub enum AsterixError {
    #[error("truncated stream: {context}")]
    TruncatedStream { context: &'static str },
    #[error("FSPEC extension chain ran past end of payload")]
    MalformedFspec,
    #[error("unrecognized ASTERIX category: {0}")]
    UnknownCategory(u8),
    #[error("field out of bounds: needed {needed} bytes, {remaining} remain")]
    FieldOutOfBounds { needed: usize, remaining: usize },
    #[error("FRN {0} beyond the category catalog")]
    UnknownFrn(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AsterixError>;

// ---------------------------------------------------------------------------
// Data source (SAC/SIC)
// ---------------------------------------------------------------------------

/// System Area Code / System Identification Code pair identifying the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataSource {
    pub sac: u8,
    pub sic: u8,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.sac, self.sic)
    }
}

// ---------------------------------------------------------------------------
// Target address helpers
// ---------------------------------------------------------------------------

/// 3-byte Mode S target address. Stored as raw bytes to avoid per-record
/// String allocation.
pub type TargetAddress = [u8; 3];

/// Format a target address as 6-char uppercase hex string.
pub fn address_to_string(addr: &TargetAddress) -> String {
    format!("{:02X}{:02X}{:02X}", addr[0], addr[1], addr[2])
}

/// Convert address bytes to u32 for numeric comparisons.
pub fn address_to_u32(addr: &TargetAddress) -> u32 {
    ((addr[0] as u32) << 16) | ((addr[1] as u32) << 8) | (addr[2] as u32)
}

// ---------------------------------------------------------------------------
// Mode 3/A formatting
// ---------------------------------------------------------------------------

/// Format the low 12 bits of a Mode 3/A field as a 4-digit octal code.
pub fn mode3a_to_octal(raw: u16) -> String {
    format!("{:04o}", raw & 0x0FFF)
}

// ---------------------------------------------------------------------------
// Sign extension
// ---------------------------------------------------------------------------

/// Sign-extend the low `bits` bits of `raw` into an i32.
pub fn sign_extend(raw: u32, bits: u32) -> i32 {
    debug_assert!(bits >= 1 && bits <= 31);
    let mask = (1u32 << bits) - 1;
    let raw = raw & mask;
    if raw & (1 << (bits - 1)) != 0 {
        raw as i32 - (1i32 << bits)
    } else {
        raw as i32
    }
}

// ---------------------------------------------------------------------------
// Time of day
// ---------------------------------------------------------------------------

/// Time-of-day fields carry 1/128 s ticks since midnight UTC.
pub fn tod_to_seconds(raw: u32) -> f64 {
    raw as f64 / 128.0
}

// ---------------------------------------------------------------------------
// IA-5 identification characters
// ---------------------------------------------------------------------------

/// Decode a 6-byte aircraft/target identification field: eight 6-bit IA-5
/// character codes packed MSB-first across byte boundaries.
///
/// Codes 1-26 map to 'A'..'Z', 48-57 to '0'..'9', everything else to space.
/// Leading and trailing spaces are trimmed.
pub fn decode_ia5_ident(bytes: &[u8; 6]) -> String {
    let bits = u64::from_be_bytes({
        let mut buf = [0u8; 8];
        buf[2..8].copy_from_slice(bytes);
        buf
    });

    let mut ident = String::with_capacity(8);
    for i in 0..8 {
        let code = ((bits >> (42 - i * 6)) & 0x3F) as u8;
        ident.push(ia5_char(code));
    }
    ident.trim().to_string()
}

fn ia5_char(code: u8) -> char {
    match code {
        1..=26 => (b'A' + code - 1) as char,
        48..=57 => (b'0' + code - 48) as char,
        _ => ' ',
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_to_string() {
        assert_eq!(address_to_string(&[0x48, 0x40, 0xD6]), "4840D6");
        assert_eq!(address_to_string(&[0x00, 0x00, 0x01]), "000001");
    }

    #[test]
    fn test_address_to_u32() {
        assert_eq!(address_to_u32(&[0xA0, 0x00, 0x01]), 0xA00001);
    }

    #[test]
    fn test_mode3a_to_octal() {
        assert_eq!(mode3a_to_octal(0o7700), "7700");
        assert_eq!(mode3a_to_octal(0o0042), "0042");
        // Bits above the 12-bit code (V/G/L flags) are masked off
        assert_eq!(mode3a_to_octal(0x8000 | 0o1200), "1200");
    }

    #[test]
    fn test_sign_extend_negative() {
        // 14-bit pattern with the sign bit set
        assert_eq!(sign_extend(0x2005, 14), 0x2005 - 0x4000);
        assert!(sign_extend(0x2005, 14) < 0);
    }

    #[test]
    fn test_sign_extend_positive() {
        assert_eq!(sign_extend(0x1FFF, 14), 0x1FFF);
        assert_eq!(sign_extend(0, 14), 0);
    }

    #[test]
    fn test_tod_to_seconds() {
        assert_eq!(tod_to_seconds(128), 1.0);
        assert_eq!(tod_to_seconds(0), 0.0);
        // 12:00:00 UTC
        assert_eq!(tod_to_seconds(43_200 * 128), 43_200.0);
    }

    #[test]
    fn test_decode_ia5_ident_golden() {
        // Packed 6-bit codes: 8, 52, 5, 1, 16, 16, 0, 0 -> "H4EAPP  "
        let ident = decode_ia5_ident(&[0x23, 0x41, 0x41, 0x41, 0x00, 0x00]);
        assert_eq!(ident, "H4EAPP");
        // Idempotent: same bits always give the same string
        let again = decode_ia5_ident(&[0x23, 0x41, 0x41, 0x41, 0x00, 0x00]);
        assert_eq!(ident, again);
    }

    #[test]
    fn test_decode_ia5_ident_all_zero() {
        assert_eq!(decode_ia5_ident(&[0; 6]), "");
    }

    #[test]
    fn test_ia5_char_mapping() {
        assert_eq!(ia5_char(1), 'A');
        assert_eq!(ia5_char(26), 'Z');
        assert_eq!(ia5_char(48), '0');
        assert_eq!(ia5_char(57), '9');
        assert_eq!(ia5_char(32), ' ');
        assert_eq!(ia5_char(63), ' ');
    }
}
