//! Convert raw decoded records into physically-scaled target reports.
//!
//! A pure transformation apart from two pieces of injected context: the
//! caller-supplied `DecodeConfig` (QNH, transition altitude, radar site) and
//! a `CoordinateTransform` collaborator that turns radar slant-polar
//! coordinates into geodetic positions. The geodetic math itself never lives
//! in this crate.

use serde::Serialize;

use crate::bds::ModeSBlock;
use crate::cat021::{RawCat021Record, TargetDescriptor};
use crate::cat048::{ComCapability, RawCat048Record};
use crate::config::{DecodeConfig, RadarSite};
use crate::decode::DecodedRecord;
use crate::types::{address_to_string, mode3a_to_octal, tod_to_seconds, DataSource};

/// ICAO standard atmosphere pressure, hPa.
pub const STANDARD_QNH_HPA: f64 = 1013.25;
/// Approximate altimeter sensitivity, ft per hPa.
const FT_PER_HPA: f64 = 30.0;

/// I048/200 speed component LSB: 2^-14 NM/s expressed in knots.
const GS_LSB_KT: f64 = 3600.0 / 16384.0;
/// 16-bit angle LSB, degrees.
const ANGLE_LSB_DEG: f64 = 360.0 / 65536.0;

/// External polar-to-geodetic service. Returns `None` on numerical failure
/// (degenerate geometry) rather than raising.
pub trait CoordinateTransform {
    fn polar_to_geodetic(&self, rho_m: f64, theta_rad: f64, site: &RadarSite)
        -> Option<(f64, f64)>;
}

/// Physically-scaled, QNH-corrected CAT048 output record. Absence means
/// "not transmitted or invalid", never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Cat048Target {
    pub data_source: Option<DataSource>,
    pub time_of_day_s: Option<f64>,
    pub latitude_deg: Option<f64>,
    pub longitude_deg: Option<f64>,
    pub rho_nm: Option<f64>,
    pub theta_deg: Option<f64>,
    pub mode3a: Option<String>,
    pub flight_level: Option<f64>,
    /// QNH-corrected altitude, ft.
    pub altitude_ft: Option<f64>,
    pub address: Option<String>,
    pub ident: Option<String>,
    pub track_number: Option<u16>,
    pub groundspeed_kt: Option<f64>,
    pub heading_deg: Option<f64>,
    pub height_3d_ft: Option<f64>,
    pub com_capability: Option<ComCapability>,
    pub mode_s: Vec<ModeSBlock>,
}

/// Physically-scaled CAT021 output record.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Cat021Target {
    pub data_source: Option<DataSource>,
    pub time_of_day_s: Option<f64>,
    pub latitude_deg: Option<f64>,
    pub longitude_deg: Option<f64>,
    pub mode3a: Option<String>,
    pub flight_level: Option<f64>,
    /// QNH-corrected barometric altitude, ft.
    pub altitude_ft: Option<f64>,
    pub geometric_height_ft: Option<f64>,
    pub address: Option<String>,
    pub ident: Option<String>,
    pub emitter_category: Option<u8>,
    pub track_number: Option<u16>,
    pub groundspeed_kt: Option<f64>,
    pub track_angle_deg: Option<f64>,
    pub magnetic_heading_deg: Option<f64>,
    pub roll_angle_deg: Option<f64>,
    pub mach: Option<f64>,
    pub indicated_airspeed_kt: Option<f64>,
    pub true_airspeed_kt: Option<f64>,
    pub baro_vertical_rate_fpm: Option<f64>,
    pub geo_vertical_rate_fpm: Option<f64>,
    pub selected_altitude_ft: Option<f64>,
    pub on_ground: bool,
    pub mode_s: Vec<ModeSBlock>,
}

/// Either derived record, tagged by category for serialized output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category")]
pub enum DerivedTarget {
    Cat048(Cat048Target),
    Cat021(Cat021Target),
}

/// Raw-to-derived processor.
///
/// Holds the last barometric pressure setting seen in any BDS 4,0 block so
/// records missing a current setting can reuse it. The hold-over is global
/// across the decode run, not keyed per aircraft.
pub struct Processor<T> {
    config: DecodeConfig,
    transform: T,
    last_baro_setting: Option<f64>,
}

impl<T: CoordinateTransform> Processor<T> {
    pub fn new(config: DecodeConfig, transform: T) -> Self {
        Processor {
            config,
            transform,
            last_baro_setting: None,
        }
    }

    pub fn process(&mut self, record: &DecodedRecord) -> DerivedTarget {
        match record {
            DecodedRecord::Cat048(raw) => DerivedTarget::Cat048(self.process_cat048(raw)),
            DecodedRecord::Cat021(raw) => DerivedTarget::Cat021(self.process_cat021(raw)),
        }
    }

    pub fn process_cat048(&mut self, raw: &RawCat048Record) -> Cat048Target {
        let rho_nm = raw.rho_raw.map(|r| r as f64 / 256.0);
        let theta_deg = raw.theta_raw.map(|t| t as f64 * ANGLE_LSB_DEG);

        let (latitude_deg, longitude_deg) = match (rho_nm, theta_deg, self.config.radar) {
            (Some(rho), Some(theta), Some(site)) => {
                let rho_m = rho * 1852.0;
                let theta_rad = theta.to_radians();
                match self.transform.polar_to_geodetic(rho_m, theta_rad, &site) {
                    Some((lat, lon)) => (Some(lat), Some(lon)),
                    None => (None, None),
                }
            }
            _ => (None, None),
        };

        let flight_level = raw.flight_level_quarters.map(|q| q as f64 / 4.0);
        let qnh = self.effective_qnh(baro_setting(&raw.mode_s_blocks));
        let altitude_ft = flight_level.map(|fl| self.correct_altitude(fl * 100.0, qnh));

        Cat048Target {
            data_source: raw.data_source,
            time_of_day_s: raw.time_of_day_raw.map(tod_to_seconds),
            latitude_deg,
            longitude_deg,
            rho_nm,
            theta_deg,
            mode3a: raw.mode3a_raw.map(mode3a_to_octal),
            flight_level,
            altitude_ft,
            address: raw.aircraft_address.as_ref().map(address_to_string),
            ident: raw.aircraft_ident.clone(),
            track_number: raw.track_number,
            groundspeed_kt: raw.groundspeed_raw.map(|v| v as f64 * GS_LSB_KT),
            heading_deg: raw.heading_raw.map(|v| v as f64 * ANGLE_LSB_DEG),
            height_3d_ft: raw.height_3d_raw.map(|v| v as f64 * 25.0),
            com_capability: raw.com_capability,
            mode_s: raw.mode_s_blocks.clone(),
        }
    }

    pub fn process_cat021(&mut self, raw: &RawCat021Record) -> Cat021Target {
        let position_scale = if raw.high_res_position {
            180.0 / (1u64 << 30) as f64
        } else {
            180.0 / (1u64 << 23) as f64
        };

        let flight_level = raw.flight_level_quarters.map(|q| q as f64 / 4.0);
        let qnh = self.effective_qnh(baro_setting(&raw.mode_s_blocks));
        let altitude_ft = flight_level.map(|fl| self.correct_altitude(fl * 100.0, qnh));

        let (mach, indicated_airspeed_kt) = match (raw.airspeed_im, raw.airspeed_raw) {
            (Some(true), Some(v)) => (Some(v as f64 * 0.001), None),
            (Some(false), Some(v)) => (None, Some(v as f64 * GS_LSB_KT)),
            _ => (None, None),
        };

        let time_of_day_s = raw
            .time_applicability_pos_raw
            .or(raw.time_reception_pos_raw)
            .or(raw.time_report_transmission_raw)
            .map(tod_to_seconds);

        Cat021Target {
            data_source: raw.data_source,
            time_of_day_s,
            latitude_deg: raw.latitude_raw.map(|v| v as f64 * position_scale),
            longitude_deg: raw.longitude_raw.map(|v| v as f64 * position_scale),
            mode3a: raw.mode3a_raw.map(mode3a_to_octal),
            flight_level,
            altitude_ft,
            geometric_height_ft: raw.geometric_height_raw.map(|v| v as f64 * 6.25),
            address: raw.target_address.as_ref().map(address_to_string),
            ident: raw.target_ident.clone(),
            emitter_category: raw.emitter_category,
            track_number: raw.track_number,
            groundspeed_kt: raw.groundspeed_raw.map(|v| v as f64 * GS_LSB_KT),
            track_angle_deg: raw.track_angle_raw.map(|v| v as f64 * ANGLE_LSB_DEG),
            magnetic_heading_deg: raw.magnetic_heading_raw.map(|v| v as f64 * ANGLE_LSB_DEG),
            roll_angle_deg: raw.roll_angle_raw.map(|v| v as f64 * 0.01),
            mach,
            indicated_airspeed_kt,
            true_airspeed_kt: raw.true_airspeed_raw.map(|v| v as f64),
            baro_vertical_rate_fpm: raw.baro_vertical_rate_raw.map(|v| v as f64 * 6.25),
            geo_vertical_rate_fpm: raw.geo_vertical_rate_raw.map(|v| v as f64 * 6.25),
            selected_altitude_ft: raw.selected_altitude_raw.map(|v| v as f64 * 25.0),
            on_ground: classify_on_ground(raw.target_report.as_ref(), flight_level),
            mode_s: raw.mode_s_blocks.clone(),
        }
    }

    /// Preference chain: a plausible BDS 4,0 setting from this record, else
    /// the caller's actual QNH, else the last plausible setting seen, else
    /// standard atmosphere. A plausible setting also refreshes the hold-over.
    fn effective_qnh(&mut self, bds_setting: Option<f64>) -> f64 {
        if let Some(setting) = bds_setting {
            // Plausibility window for a reported pressure setting, hPa
            if (800.0..=1200.0).contains(&setting) {
                self.last_baro_setting = Some(setting);
                return setting;
            }
        }
        if let Some(actual) = self.config.qnh_actual {
            return actual;
        }
        self.last_baro_setting.unwrap_or(STANDARD_QNH_HPA)
    }

    /// Apply QNH correction strictly below the transition altitude; at or
    /// above it the indicated altitude passes through unmodified.
    fn correct_altitude(&self, indicated_ft: f64, qnh: f64) -> f64 {
        if indicated_ft < self.config.transition_altitude_ft {
            indicated_ft + (qnh - STANDARD_QNH_HPA) * FT_PER_HPA
        } else {
            indicated_ft
        }
    }
}

/// First plausible barometric pressure setting among the record's MB blocks.
fn baro_setting(blocks: &[ModeSBlock]) -> Option<f64> {
    blocks.iter().find_map(|b| b.baro_setting())
}

/// Ground bit set, surface-vehicle address type, or a flight level at or
/// below FL14 all classify the target as on-ground.
fn classify_on_ground(desc: Option<&TargetDescriptor>, flight_level: Option<f64>) -> bool {
    if let Some(desc) = desc {
        if desc.gbs == Some(true) || desc.atp == TargetDescriptor::ATP_SURFACE_VEHICLE {
            return true;
        }
    }
    matches!(flight_level, Some(fl) if fl <= 14.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
