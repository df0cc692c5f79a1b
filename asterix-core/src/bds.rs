//! Mode S Comm-B (MB) block decoding for BDS registers 4,0 / 5,0 / 6,0.
//!
//! Each MB block is 8 bytes: byte 0 carries the BDS register (high nibble =
//! BDS1, low nibble = BDS2), bytes 1..8 carry the 56-bit register content.
//! Anything other than 4,0 / 5,0 / 6,0 is kept as raw bytes.
//!
//! Zero handling is a domain rule, not a convenience: an extracted value of 0
//! means "not available" for every field EXCEPT ground speed (BDS 5,0) and
//! magnetic heading (BDS 6,0), where 0 is a legitimate reading.

use serde::Serialize;

use crate::types::sign_extend;

/// BDS 4,0 — selected vertical intention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct Bds40 {
    /// MCP/FCU selected altitude, ft.
    pub mcp_altitude_ft: Option<f64>,
    /// FMS selected altitude, ft.
    pub fms_altitude_ft: Option<f64>,
    /// Barometric pressure setting, hPa.
    pub baro_setting_hpa: Option<f64>,
}

/// BDS 5,0 — track and turn report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct Bds50 {
    /// Roll angle, degrees (negative = left wing down).
    pub roll_angle_deg: Option<f64>,
    /// True track angle, degrees 0..360.
    pub true_track_deg: Option<f64>,
    /// Ground speed, kt. Zero is a valid reading.
    pub groundspeed_kt: Option<f64>,
    /// Track angle rate, degrees/s.
    pub track_rate_deg_s: Option<f64>,
    /// True airspeed, kt.
    pub true_airspeed_kt: Option<f64>,
}

/// BDS 6,0 — heading and speed report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct Bds60 {
    /// Magnetic heading, degrees 0..360. Zero is a valid reading.
    pub magnetic_heading_deg: Option<f64>,
    /// Indicated airspeed, kt.
    pub indicated_airspeed_kt: Option<f64>,
    /// Mach number.
    pub mach: Option<f64>,
    /// Barometric altitude rate, ft/min.
    pub baro_altitude_rate_fpm: Option<f64>,
    /// Inertial vertical velocity, ft/min.
    pub inertial_vertical_rate_fpm: Option<f64>,
}

/// One decoded 8-byte MB block, tagged by its BDS register.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "register")]
pub enum ModeSBlock {
    Bds40(Bds40),
    Bds50(Bds50),
    Bds60(Bds60),
    Raw { bds1: u8, bds2: u8, data: [u8; 7] },
}

impl ModeSBlock {
    /// Barometric pressure setting carried by a BDS 4,0 block, if any.
    pub fn baro_setting(&self) -> Option<f64> {
        match self {
            ModeSBlock::Bds40(b) => b.baro_setting_hpa,
            _ => None,
        }
    }
}

/// Decode one 8-byte MB block, dispatching on the register in byte 0.
pub fn decode_block(block: &[u8; 8]) -> ModeSBlock {
    let bds1 = block[0] >> 4;
    let bds2 = block[0] & 0x0F;
    let mut data = [0u8; 7];
    data.copy_from_slice(&block[1..8]);

    match (bds1, bds2) {
        (4, 0) => ModeSBlock::Bds40(decode_bds40(&data)),
        (5, 0) => ModeSBlock::Bds50(decode_bds50(&data)),
        (6, 0) => ModeSBlock::Bds60(decode_bds60(&data)),
        _ => ModeSBlock::Raw { bds1, bds2, data },
    }
}

// ---------------------------------------------------------------------------
// Bit extraction
// ---------------------------------------------------------------------------

/// Extract `len` bits starting at 1-based MSB-first bit `start` of the
/// 56-bit register content.
fn bits(data: &[u8; 7], start: usize, len: usize) -> u32 {
    debug_assert!(start >= 1 && start + len - 1 <= 56 && len <= 32);
    let mut v = 0u32;
    for i in 0..len {
        let n = start - 1 + i;
        let bit = (data[n / 8] >> (7 - n % 8)) & 1;
        v = (v << 1) | bit as u32;
    }
    v
}

fn nonzero_scaled(raw: u32, scale: f64) -> Option<f64> {
    if raw == 0 {
        None
    } else {
        Some(raw as f64 * scale)
    }
}

fn nonzero_signed_scaled(raw: u32, width: u32, scale: f64) -> Option<f64> {
    let v = sign_extend(raw, width);
    if v == 0 {
        None
    } else {
        Some(v as f64 * scale)
    }
}

/// Signed angle in -180..180 mapped onto 0..360.
fn wrap_angle(deg: f64) -> f64 {
    if deg < 0.0 {
        deg + 360.0
    } else {
        deg
    }
}

// ---------------------------------------------------------------------------
// Register decoders
// ---------------------------------------------------------------------------

fn decode_bds40(data: &[u8; 7]) -> Bds40 {
    // Status bits at 1 / 14 / 27, values in the 12-bit ranges behind them
    let mcp = bits(data, 2, 12);
    let fms = bits(data, 15, 12);
    let baro = bits(data, 28, 12);

    Bds40 {
        mcp_altitude_ft: nonzero_scaled(mcp, 16.0),
        fms_altitude_ft: nonzero_scaled(fms, 16.0),
        baro_setting_hpa: if baro == 0 {
            None
        } else {
            Some(800.0 + baro as f64 * 0.1)
        },
    }
}

fn decode_bds50(data: &[u8; 7]) -> Bds50 {
    let roll = bits(data, 2, 10);
    let track = bits(data, 13, 11);
    let gs = bits(data, 25, 10);
    let rate = bits(data, 36, 10);
    let tas = bits(data, 47, 10);

    Bds50 {
        roll_angle_deg: nonzero_signed_scaled(roll, 10, 45.0 / 256.0),
        true_track_deg: {
            let v = sign_extend(track, 11);
            if v == 0 {
                None
            } else {
                Some(wrap_angle(v as f64 * 90.0 / 512.0))
            }
        },
        // Zero is a valid ground speed
        groundspeed_kt: Some(gs as f64 * 2.0),
        track_rate_deg_s: nonzero_signed_scaled(rate, 10, 8.0 / 256.0),
        true_airspeed_kt: nonzero_scaled(tas, 2.0),
    }
}

fn decode_bds60(data: &[u8; 7]) -> Bds60 {
    let heading = bits(data, 2, 11);
    let ias = bits(data, 14, 10);
    let mach = bits(data, 25, 10);
    let baro_rate = bits(data, 36, 10);
    let inertial = bits(data, 47, 10);

    Bds60 {
        // Zero is a valid magnetic heading
        magnetic_heading_deg: Some(wrap_angle(
            sign_extend(heading, 11) as f64 * 90.0 / 512.0,
        )),
        indicated_airspeed_kt: nonzero_scaled(ias, 1.0),
        mach: nonzero_scaled(mach, 0.008),
        baro_altitude_rate_fpm: nonzero_signed_scaled(baro_rate, 10, 32.0),
        inertial_vertical_rate_fpm: nonzero_signed_scaled(inertial, 10, 32.0),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a 7-byte register content by placing `value` at 1-based MSB-first
    /// bit position `start` with the given width.
    fn place(data: &mut [u8; 7], start: usize, len: usize, value: u32) {
        for i in 0..len {
            let bit = (value >> (len - 1 - i)) & 1;
            let n = start - 1 + i;
            if bit != 0 {
                data[n / 8] |= 1 << (7 - n % 8);
            }
        }
    }

    fn block(register: u8, data: [u8; 7]) -> [u8; 8] {
        let mut b = [0u8; 8];
        b[0] = register;
        b[1..8].copy_from_slice(&data);
        b
    }

    #[test]
    fn test_dispatch_by_register() {
        assert!(matches!(
            decode_block(&block(0x40, [0; 7])),
            ModeSBlock::Bds40(_)
        ));
        assert!(matches!(
            decode_block(&block(0x50, [0; 7])),
            ModeSBlock::Bds50(_)
        ));
        assert!(matches!(
            decode_block(&block(0x60, [0; 7])),
            ModeSBlock::Bds60(_)
        ));
    }

    #[test]
    fn test_dispatch_unknown_register_keeps_raw() {
        let b = block(0x44, [1, 2, 3, 4, 5, 6, 7]);
        match decode_block(&b) {
            ModeSBlock::Raw { bds1, bds2, data } => {
                assert_eq!(bds1, 4);
                assert_eq!(bds2, 4);
                assert_eq!(data, [1, 2, 3, 4, 5, 6, 7]);
            }
            other => panic!("expected raw block, got {other:?}"),
        }
    }

    #[test]
    fn test_bds40_altitudes_and_baro() {
        let mut data = [0u8; 7];
        place(&mut data, 2, 12, 2000); // MCP: 2000 * 16 = 32000 ft
        place(&mut data, 15, 12, 1875); // FMS: 1875 * 16 = 30000 ft
        place(&mut data, 28, 12, 2132); // baro: 800 + 213.2 = 1013.2 hPa
        let b = decode_bds40(&data);
        assert_eq!(b.mcp_altitude_ft, Some(32000.0));
        assert_eq!(b.fms_altitude_ft, Some(30000.0));
        let baro = b.baro_setting_hpa.unwrap();
        assert!((baro - 1013.2).abs() < 1e-9);
    }

    #[test]
    fn test_bds40_zero_means_absent() {
        let b = decode_bds40(&[0u8; 7]);
        assert!(b.mcp_altitude_ft.is_none());
        assert!(b.fms_altitude_ft.is_none());
        assert!(b.baro_setting_hpa.is_none());
    }

    #[test]
    fn test_bds50_fields() {
        let mut data = [0u8; 7];
        place(&mut data, 2, 10, 20); // roll 20 * 45/256 = 3.515625
        place(&mut data, 13, 11, 512); // track 512 * 90/512 = 90 deg
        place(&mut data, 25, 10, 220); // GS 440 kt
        place(&mut data, 36, 10, 16); // rate 16 * 8/256 = 0.5 deg/s
        place(&mut data, 47, 10, 225); // TAS 450 kt
        let b = decode_bds50(&data);
        assert!((b.roll_angle_deg.unwrap() - 3.515625).abs() < 1e-9);
        assert!((b.true_track_deg.unwrap() - 90.0).abs() < 1e-9);
        assert_eq!(b.groundspeed_kt, Some(440.0));
        assert!((b.track_rate_deg_s.unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(b.true_airspeed_kt, Some(450.0));
    }

    #[test]
    fn test_bds50_negative_roll() {
        let mut data = [0u8; 7];
        // -20 in 10-bit two's complement = 1004
        place(&mut data, 2, 10, 1004);
        let b = decode_bds50(&data);
        assert!((b.roll_angle_deg.unwrap() + 3.515625).abs() < 1e-9);
    }

    #[test]
    fn test_bds50_zero_groundspeed_is_valid() {
        let b = decode_bds50(&[0u8; 7]);
        assert_eq!(b.groundspeed_kt, Some(0.0));
        assert!(b.roll_angle_deg.is_none());
        assert!(b.true_track_deg.is_none());
        assert!(b.true_airspeed_kt.is_none());
    }

    #[test]
    fn test_bds50_westerly_track_wraps() {
        let mut data = [0u8; 7];
        // -512 in 11-bit two's complement = 1536 -> -90 deg -> 270 deg
        place(&mut data, 13, 11, 1536);
        let b = decode_bds50(&data);
        assert!((b.true_track_deg.unwrap() - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bds60_fields() {
        let mut data = [0u8; 7];
        place(&mut data, 2, 11, 256); // heading 256 * 90/512 = 45 deg
        place(&mut data, 14, 10, 250); // IAS 250 kt
        place(&mut data, 25, 10, 100); // Mach 0.8
        place(&mut data, 36, 10, 32); // baro rate 1024 ft/min
        place(&mut data, 47, 10, 992); // inertial -32 * 32 = -1024 ft/min
        let b = decode_bds60(&data);
        assert!((b.magnetic_heading_deg.unwrap() - 45.0).abs() < 1e-9);
        assert_eq!(b.indicated_airspeed_kt, Some(250.0));
        assert!((b.mach.unwrap() - 0.8).abs() < 1e-9);
        assert_eq!(b.baro_altitude_rate_fpm, Some(1024.0));
        assert_eq!(b.inertial_vertical_rate_fpm, Some(-1024.0));
    }

    #[test]
    fn test_bds60_zero_heading_is_valid() {
        let b = decode_bds60(&[0u8; 7]);
        assert_eq!(b.magnetic_heading_deg, Some(0.0));
        assert!(b.indicated_airspeed_kt.is_none());
        assert!(b.mach.is_none());
        assert!(b.baro_altitude_rate_fpm.is_none());
        assert!(b.inertial_vertical_rate_fpm.is_none());
    }

    #[test]
    fn test_baro_setting_accessor() {
        let mut data = [0u8; 7];
        place(&mut data, 28, 12, 2132);
        let b = decode_block(&block(0x40, data));
        assert!((b.baro_setting().unwrap() - 1013.2).abs() < 1e-9);
        assert!(decode_block(&block(0x50, data)).baro_setting().is_none());
    }
}
