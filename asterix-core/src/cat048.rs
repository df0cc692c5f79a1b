//! CAT048 (mono-radar target report) record decoding.
//!
//! A linear state machine over the 28-FRN User Application Profile: for each
//! FRN marked present in the FSPEC, decode or skip the item at the cursor.
//! Item widths are fixed by the catalog, not self-describing, so a field that
//! no longer fits truncates the rest of the record rather than risking a
//! desynchronized cursor.

use serde::Serialize;

use crate::bds::{self, ModeSBlock};
use crate::cursor::FieldCursor;
use crate::fspec::Fspec;
use crate::types::{
    decode_ia5_ident, sign_extend, AsterixError, DataSource, Result, TargetAddress,
};

/// I048/230 — communications / ACAS capability and flight status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComCapability {
    /// Communications capability, 3 bits.
    pub com: u8,
    /// Flight status, 3 bits.
    pub stat: u8,
    /// SI/II transponder capability.
    pub si: bool,
    /// Mode S specific service capability.
    pub mssc: bool,
    /// 100 ft altitude reporting capability.
    pub arc: bool,
    /// Aircraft identification capability.
    pub aic: bool,
}

/// Decoded-but-unconverted CAT048 record. Values stay in catalog native
/// units; absence always means "not transmitted", never zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RawCat048Record {
    pub data_source: Option<DataSource>,
    /// Time of day, 1/128 s ticks since midnight.
    pub time_of_day_raw: Option<u32>,
    /// First octet of the target report descriptor (I048/020).
    pub target_report: Option<u8>,
    /// Slant range, 1/256 NM steps.
    pub rho_raw: Option<u16>,
    /// Azimuth, 360/2^16 degree steps.
    pub theta_raw: Option<u16>,
    /// Mode 3/A field including V/G/L flag bits.
    pub mode3a_raw: Option<u16>,
    /// Flight level in quarters, sign-extended from 14 bits.
    pub flight_level_quarters: Option<i16>,
    pub aircraft_address: Option<TargetAddress>,
    pub aircraft_ident: Option<String>,
    /// Mode S MB blocks from I048/250, catalog order.
    pub mode_s_blocks: Vec<ModeSBlock>,
    pub track_number: Option<u16>,
    /// Calculated track position, 1/128 NM steps.
    pub cartesian_x_raw: Option<i16>,
    pub cartesian_y_raw: Option<i16>,
    /// I048/200 groundspeed component, 2^-14 NM/s steps, carried raw.
    pub groundspeed_raw: Option<u16>,
    /// I048/200 heading component, 360/2^16 degree steps, carried raw.
    pub heading_raw: Option<u16>,
    /// Height measured by 3D radar, 25 ft steps, sign-extended from 14 bits.
    pub height_3d_raw: Option<i16>,
    pub com_capability: Option<ComCapability>,
}

/// Decode one CAT048 record body at the cursor, guided by its FSPEC.
///
/// Runs FRN by FRN in catalog order. An out-of-bounds item stops the record
/// (truncated tail); previously decoded fields are kept. Never panics on any
/// truncation point.
pub fn decode_record(fspec: &Fspec, cursor: &mut FieldCursor) -> (RawCat048Record, Result<()>) {
    let mut rec = RawCat048Record::default();

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

fn decode_item(frn: usize, cursor: &mut FieldCursor, rec: &mut RawCat048Record) -> Result<()> {
    match frn {
        // I048/010 Data source identifier
        1 => {
            let sac = cursor.read_u8()?;
            let sic = cursor.read_u8()?;
            rec.data_source = Some(DataSource { sac, sic });
        }
        // I048/140 Time of day
        2 => rec.time_of_day_raw = Some(cursor.read_u24()?),
        // I048/020 Target report descriptor
        3 => rec.target_report = Some(cursor.skip_fx_chain()?),
        // I048/040 Measured position, slant polar
        4 => {
            rec.rho_raw = Some(cursor.read_u16()?);
            rec.theta_raw = Some(cursor.read_u16()?);
        }
        // I048/070 Mode 3/A code
        5 => rec.mode3a_raw = Some(cursor.read_u16()?),
        // I048/090 Flight level, 14-bit two's complement quarters
        6 => {
            let raw = cursor.read_u16()?;
            rec.flight_level_quarters = Some(sign_extend(raw as u32, 14) as i16);
        }
        // I048/130 Radar plot characteristics
        7 => {
            cursor.skip_fx_chain()?;
        }
        // I048/220 Aircraft address
        8 => {
            let bytes = cursor.read_bytes(3)?;
            rec.aircraft_address = Some([bytes[0], bytes[1], bytes[2]]);
        }
        // I048/240 Aircraft identification
        9 => {
            let bytes = cursor.read_bytes(6)?;
            let mut ident = [0u8; 6];
            ident.copy_from_slice(bytes);
            rec.aircraft_ident = Some(decode_ia5_ident(&ident));
        }
        // I048/250 Mode S MB data
        10 => rec.mode_s_blocks = decode_mb_blocks(cursor)?,
        // I048/161 Track number
        11 => rec.track_number = Some(cursor.read_u16()? & 0x0FFF),
        // I048/042 Calculated position, Cartesian
        12 => {
            rec.cartesian_x_raw = Some(cursor.read_i16()?);
            rec.cartesian_y_raw = Some(cursor.read_i16()?);
        }
        // I048/200 Calculated track velocity. The two 16-bit groups are
        // pre-scaled polar components (groundspeed, heading) and are carried
        // raw, not run through a Cartesian magnitude formula.
        13 => {
            rec.groundspeed_raw = Some(cursor.read_u16()?);
            rec.heading_raw = Some(cursor.read_u16()?);
        }
        // I048/170 Track status
        14 => {
            cursor.skip_fx_chain()?;
        }
        // I048/210 Track quality
        15 => cursor.skip(4)?,
        // I048/030 Warning/error conditions
        16 => {
            cursor.skip_fx_chain()?;
        }
        // I048/080 Mode 3/A confidence
        17 => cursor.skip(2)?,
        // I048/100 Mode C code and confidence
        18 => cursor.skip(4)?,
        // I048/110 Height measured by 3D radar, 25 ft steps
        19 => {
            let raw = cursor.read_u16()?;
            rec.height_3d_raw = Some(sign_extend(raw as u32, 14) as i16);
        }
        // I048/120 Radial Doppler speed
        20 => {
            cursor.skip_fx_chain()?;
        }
        // I048/230 Communications/ACAS capability
        21 => {
            let raw = cursor.read_u16()?;
            rec.com_capability = Some(decode_com_capability(raw));
        }
        // I048/260 ACAS resolution advisory report
        22 => cursor.skip(7)?,
        // I048/055 Mode 1 code
        23 => cursor.skip(1)?,
        // I048/050 Mode 2 code
        24 => cursor.skip(2)?,
        // I048/065 Mode 1 confidence
        25 => cursor.skip(1)?,
        // I048/060 Mode 2 confidence
        26 => cursor.skip(2)?,
        // SP / RE: 1-byte length indicator that counts itself
        27 | 28 => skip_explicit_length(cursor)?,
        _ => return Err(AsterixError::UnknownFrn(frn)),
    }
    Ok(())
}

/// Read the repetition factor then as many whole 8-byte MB blocks as fit.
///
/// A declared repetition running past the record truncates the block list,
/// not the record: the standard says how many blocks follow, and partial
/// blocks at a torn tail carry no usable register content.
pub(crate) fn decode_mb_blocks(cursor: &mut FieldCursor) -> Result<Vec<ModeSBlock>> {
    let rep = cursor.read_u8()? as usize;
    let mut blocks = Vec::with_capacity(rep.min(8));
    for _ in 0..rep {
        if cursor.remaining() < 8 {
            break;
        }
        let bytes = cursor.read_bytes(8)?;
        let mut block = [0u8; 8];
        block.copy_from_slice(bytes);
        blocks.push(bds::decode_block(&block));
    }
    Ok(blocks)
}

fn decode_com_capability(raw: u16) -> ComCapability {
    ComCapability {
        com: ((raw >> 13) & 0x07) as u8,
        stat: ((raw >> 10) & 0x07) as u8,
        si: raw & 0x0200 != 0,
        mssc: raw & 0x0080 != 0,
        arc: raw & 0x0040 != 0,
        aic: raw & 0x0020 != 0,
    }
}

/// SP/RE data items start with a 1-byte total length that includes itself.
pub(crate) fn skip_explicit_length(cursor: &mut FieldCursor) -> Result<()> {
    let len = cursor.read_u8()? as usize;
    if len < 1 {
        return Err(AsterixError::FieldOutOfBounds {
            needed: 1,
            remaining: cursor.remaining(),
        });
    }
    cursor.skip(len - 1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
