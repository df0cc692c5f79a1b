//! CAT021 (ADS-B target report) record decoding.
//!
//! Same linear state machine shape as CAT048, over the 48-FRN User
//! Application Profile. Only a subset of items carries semantics the
//! downstream processor needs; the rest exist purely so the cursor advances
//! by the right width. Compound items without semantic decode are advanced
//! by their FX chains, matching the behavior of the recordings this decoder
//! was validated against.

use serde::Serialize;

use crate::bds::ModeSBlock;
use crate::cat048::{decode_mb_blocks, skip_explicit_length};
use crate::cursor::FieldCursor;
use crate::fspec::Fspec;
use crate::types::{
    decode_ia5_ident, sign_extend, AsterixError, DataSource, Result, TargetAddress,
};

/// I021/040 — target report descriptor, first octet plus the ground-bit
/// extension when transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetDescriptor {
    /// Address type, 3 bits. 2 = surface vehicle address.
    pub atp: u8,
    /// Altitude reporting capability, 2 bits.
    pub arc: u8,
    /// Range check passed.
    pub rc: bool,
    /// Report from a field monitor (fixed transponder).
    pub rab: bool,
    /// Ground bit set by the aircraft; absent when no first extension came.
    pub gbs: Option<bool>,
    /// Simulated target flag from the first extension.
    pub sim: Option<bool>,
    /// Test target flag from the first extension.
    pub tst: Option<bool>,
}

impl TargetDescriptor {
    /// Address type value designating a surface vehicle.
    pub const ATP_SURFACE_VEHICLE: u8 = 2;
}

/// Decoded-but-unconverted CAT021 record, catalog native units throughout.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RawCat021Record {
    pub data_source: Option<DataSource>,
    pub target_report: Option<TargetDescriptor>,
    pub track_number: Option<u16>,
    pub service_id: Option<u8>,
    /// Time of applicability for position, 1/128 s ticks.
    pub time_applicability_pos_raw: Option<u32>,
    /// WGS-84 latitude. Scale is 180/2^23 for the 24-bit item, 180/2^30 for
    /// the high-resolution item; `high_res_position` says which applied.
    pub latitude_raw: Option<i32>,
    pub longitude_raw: Option<i32>,
    pub high_res_position: bool,
    /// Time of applicability for velocity, 1/128 s ticks.
    pub time_applicability_vel_raw: Option<u32>,
    /// I021/150: IM flag (true = Mach 0.001 steps, false = IAS 2^-14 NM/s).
    pub airspeed_im: Option<bool>,
    pub airspeed_raw: Option<u16>,
    /// True airspeed, kt steps.
    pub true_airspeed_raw: Option<u16>,
    pub target_address: Option<TargetAddress>,
    /// Time of message reception of position, 1/128 s ticks.
    pub time_reception_pos_raw: Option<u32>,
    /// Geometric height, 6.25 ft steps, sign-extended.
    pub geometric_height_raw: Option<i16>,
    pub mops_version: Option<u8>,
    pub mode3a_raw: Option<u16>,
    /// Roll angle, 0.01 degree steps.
    pub roll_angle_raw: Option<i16>,
    /// Flight level in quarters, sign-extended from 14 bits.
    pub flight_level_quarters: Option<i16>,
    /// Magnetic heading, 360/2^16 degree steps.
    pub magnetic_heading_raw: Option<u16>,
    pub target_status: Option<u8>,
    /// Barometric vertical rate, 6.25 ft/min steps (15-bit signed).
    pub baro_vertical_rate_raw: Option<i16>,
    /// Geometric vertical rate, 6.25 ft/min steps (15-bit signed).
    pub geo_vertical_rate_raw: Option<i16>,
    /// Airborne ground vector: speed 2^-14 NM/s steps (15 bits), track angle
    /// 360/2^16 degree steps.
    pub groundspeed_raw: Option<u16>,
    pub track_angle_raw: Option<u16>,
    /// Track angle rate, 1/32 degree/s steps (10-bit signed).
    pub track_angle_rate_raw: Option<i16>,
    /// Time of ASTERIX report transmission, 1/128 s ticks.
    pub time_report_transmission_raw: Option<u32>,
    pub target_ident: Option<String>,
    pub emitter_category: Option<u8>,
    /// Selected altitude, 25 ft steps (13-bit signed).
    pub selected_altitude_raw: Option<i16>,
    pub final_selected_altitude_raw: Option<i16>,
    pub mode_s_blocks: Vec<ModeSBlock>,
    pub message_amplitude: Option<i8>,
    pub receiver_id: Option<u8>,
}

/// Decode one CAT021 record body at the cursor, guided by its FSPEC.
///
/// Same contract as the CAT048 decoder: an out-of-bounds item truncates the
/// record, already-decoded fields survive, and nothing panics.
pub fn decode_record(fspec: &Fspec, cursor: &mut FieldCursor) -> (RawCat021Record, Result<()>) {
    let mut rec = RawCat021Record::default();

    for frn in 1..=fspec.last_set() {
        if !fspec.is_set(frn) {
            continue;
        }
        if let Err(e) = decode_item(frn, cursor, &mut rec) {
            return (rec, Err(e));
        }
    }
    (rec, Ok(()))
}

fn decode_item(frn: usize, cursor: &mut FieldCursor, rec: &mut RawCat021Record) -> Result<()> {
    match frn {
        // I021/010 Data source identification
        1 => {
            let sac = cursor.read_u8()?;
            let sic = cursor.read_u8()?;
            rec.data_source = Some(DataSource { sac, sic });
        }
        // I021/040 Target report descriptor
        2 => rec.target_report = Some(decode_target_descriptor(cursor)?),
        // I021/161 Track number
        3 => rec.track_number = Some(cursor.read_u16()? & 0x0FFF),
        // I021/015 Service identification
        4 => rec.service_id = Some(cursor.read_u8()?),
        // I021/071 Time of applicability for position
        5 => rec.time_applicability_pos_raw = Some(cursor.read_u24()?),
        // I021/130 Position in WGS-84, 24-bit lat/lon
        6 => {
            let lat = cursor.read_u24()?;
            let lon = cursor.read_u24()?;
            rec.latitude_raw = Some(sign_extend(lat, 24));
            rec.longitude_raw = Some(sign_extend(lon, 24));
            rec.high_res_position = false;
        }
        // I021/131 High-resolution position in WGS-84, 32-bit lat/lon
        7 => {
            rec.latitude_raw = Some(cursor.read_u32()? as i32);
            rec.longitude_raw = Some(cursor.read_u32()? as i32);
            rec.high_res_position = true;
        }
        // I021/072 Time of applicability for velocity
        8 => rec.time_applicability_vel_raw = Some(cursor.read_u24()?),
        // I021/150 Air speed
        9 => {
            let raw = cursor.read_u16()?;
            rec.airspeed_im = Some(raw & 0x8000 != 0);
            rec.airspeed_raw = Some(raw & 0x7FFF);
        }
        // I021/151 True air speed
        10 => rec.true_airspeed_raw = Some(cursor.read_u16()? & 0x7FFF),
        // I021/080 Target address
        11 => {
            let bytes = cursor.read_bytes(3)?;
            rec.target_address = Some([bytes[0], bytes[1], bytes[2]]);
        }
        // I021/073 Time of message reception of position
        12 => rec.time_reception_pos_raw = Some(cursor.read_u24()?),
        // I021/074 Time of message reception of position, high precision
        13 => cursor.skip(4)?,
        // I021/075 Time of message reception of velocity
        14 => cursor.skip(3)?,
        // I021/076 Time of message reception of velocity, high precision
        15 => cursor.skip(4)?,
        // I021/140 Geometric height, 6.25 ft steps
        16 => rec.geometric_height_raw = Some(cursor.read_i16()?),
        // I021/090 Quality indicators
        17 => {
            cursor.skip_fx_chain()?;
        }
        // I021/210 MOPS version
        18 => rec.mops_version = Some(cursor.read_u8()?),
        // I021/070 Mode 3/A code
        19 => rec.mode3a_raw = Some(cursor.read_u16()?),
        // I021/230 Roll angle, 0.01 degree steps
        20 => rec.roll_angle_raw = Some(cursor.read_i16()?),
        // I021/145 Flight level, 14-bit two's complement quarters
        21 => {
            let raw = cursor.read_u16()?;
            rec.flight_level_quarters = Some(sign_extend(raw as u32, 14) as i16);
        }
        // I021/152 Magnetic heading
        22 => rec.magnetic_heading_raw = Some(cursor.read_u16()?),
        // I021/200 Target status
        23 => rec.target_status = Some(cursor.read_u8()?),
        // I021/155 Barometric vertical rate (bit 16 is the RE flag)
        24 => {
            let raw = cursor.read_u16()?;
            rec.baro_vertical_rate_raw = Some(sign_extend(raw as u32, 15) as i16);
        }
        // I021/157 Geometric vertical rate
        25 => {
            let raw = cursor.read_u16()?;
            rec.geo_vertical_rate_raw = Some(sign_extend(raw as u32, 15) as i16);
        }
        // I021/160 Airborne ground vector
        26 => {
            let speed = cursor.read_u16()?;
            let angle = cursor.read_u16()?;
            rec.groundspeed_raw = Some(speed & 0x7FFF);
            rec.track_angle_raw = Some(angle);
        }
        // I021/165 Track angle rate, 1/32 degree/s steps
        27 => {
            let raw = cursor.read_u16()?;
            rec.track_angle_rate_raw = Some(sign_extend(raw as u32 & 0x03FF, 10) as i16);
        }
        // I021/077 Time of ASTERIX report transmission
        28 => rec.time_report_transmission_raw = Some(cursor.read_u24()?),
        // I021/170 Target identification
        29 => {
            let bytes = cursor.read_bytes(6)?;
            let mut ident = [0u8; 6];
            ident.copy_from_slice(bytes);
            rec.target_ident = Some(decode_ia5_ident(&ident));
        }
        // I021/020 Emitter category
        30 => rec.emitter_category = Some(cursor.read_u8()?),
        // I021/220 Met information
        31 => {
            cursor.skip_fx_chain()?;
        }
        // I021/146 Selected altitude, 25 ft steps in the low 13 bits
        32 => {
            let raw = cursor.read_u16()?;
            rec.selected_altitude_raw = Some(sign_extend(raw as u32 & 0x1FFF, 13) as i16);
        }
        // I021/148 Final state selected altitude
        33 => {
            let raw = cursor.read_u16()?;
            rec.final_selected_altitude_raw = Some(sign_extend(raw as u32 & 0x1FFF, 13) as i16);
        }
        // I021/110 Trajectory intent
        34 => {
            cursor.skip_fx_chain()?;
        }
        // I021/016 Service management
        35 => cursor.skip(1)?,
        // I021/008 Aircraft operational status
        36 => cursor.skip(1)?,
        // I021/271 Surface capabilities and characteristics
        37 => {
            cursor.skip_fx_chain()?;
        }
        // I021/132 Message amplitude, dBm
        38 => rec.message_amplitude = Some(cursor.read_u8()? as i8),
        // I021/250 Mode S MB data
        39 => rec.mode_s_blocks = decode_mb_blocks(cursor)?,
        // I021/260 ACAS resolution advisory report
        40 => cursor.skip(7)?,
        // I021/400 Receiver ID
        41 => rec.receiver_id = Some(cursor.read_u8()?),
        // I021/295 Data ages
        42 => {
            cursor.skip_fx_chain()?;
        }
        // RE / SP: 1-byte length indicator that counts itself
        47 | 48 => skip_explicit_length(cursor)?,
        // Spare FRNs have no defined width; the cursor cannot advance
        _ => return Err(AsterixError::UnknownFrn(frn)),
    }
    Ok(())
}

fn decode_target_descriptor(cursor: &mut FieldCursor) -> Result<TargetDescriptor> {
    let first = cursor.read_u8()?;
    let mut desc = TargetDescriptor {
        atp: (first >> 5) & 0x07,
        arc: (first >> 3) & 0x03,
        rc: first & 0x04 != 0,
        rab: first & 0x02 != 0,
        gbs: None,
        sim: None,
        tst: None,
    };

    if first & 0x01 != 0 {
        let ext = cursor.read_u8()?;
        desc.gbs = Some(ext & 0x40 != 0);
        desc.sim = Some(ext & 0x20 != 0);
        desc.tst = Some(ext & 0x10 != 0);
        // Further extensions carry nothing we keep
        let mut octet = ext;
        while octet & 0x01 != 0 {
            octet = cursor.read_u8()?;
        }
    }
    Ok(desc)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
