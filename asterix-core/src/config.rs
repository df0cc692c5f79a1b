//! Decode-run configuration for asterix-decode.
//!
//! Reads/writes `~/.asterix-decode/config.yaml` with the radar site position
//! used to georeference CAT048 polar plots and the actual QNH for altimeter
//! correction. Both are optional; decoding works without them, with the
//! affected derived fields simply absent or standard-atmosphere based.

use std::path::PathBuf;

use serde::Serialize;

use crate::types::AsterixError;

/// Radar antenna position, WGS-84.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadarSite {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub height_m: f64,
}

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeConfig {
    /// Caller-supplied actual QNH, hPa. None means no local reading.
    pub qnh_actual: Option<f64>,
    /// QNH correction applies strictly below this indicated altitude.
    pub transition_altitude_ft: f64,
    pub radar: Option<RadarSite>,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        DecodeConfig {
            qnh_actual: None,
            transition_altitude_ft: 6000.0,
            radar: None,
        }
    }
}

/// Get the config directory path (`~/.asterix-decode/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".asterix-decode")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.asterix-decode/config.yaml`.
///
/// Returns default config if the file doesn't exist or doesn't parse.
pub fn load_config() -> DecodeConfig {
    let path = config_file();
    if !path.exists() {
        return DecodeConfig::default();
    }

    let text = match std::fs::read_to_string(&path) {
        Ok(t) => t,
        Err(_) => return DecodeConfig::default(),
    };

    parse_config(&text).unwrap_or_default()
}

/// Save config to `~/.asterix-decode/config.yaml`.
pub fn save_config(config: &DecodeConfig) -> Result<PathBuf, AsterixError> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir).map_err(|e| AsterixError::Config(e.to_string()))?;

    let path = config_file();
    let text = serialize_config(config);
    std::fs::write(&path, text).map_err(|e| AsterixError::Config(e.to_string()))?;

    Ok(path)
}

/// Parse simple YAML-like config text.
fn parse_config(text: &str) -> Option<DecodeConfig> {
    let mut config = DecodeConfig::default();
    let mut current_section: Option<String> = None;
    let mut radar_lat: Option<f64> = None;
    let mut radar_lon: Option<f64> = None;
    let mut radar_height = 0.0f64;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        if let Some((key, val)) = stripped.split_once(':') {
            let key = key.trim();
            let val = val.trim();

            if !is_indented {
                if val.is_empty() {
                    current_section = Some(key.to_string());
                } else {
                    current_section = None;
                    match key {
                        "qnh" => config.qnh_actual = parse_float_value(val),
                        "transition_altitude_ft" => {
                            if let Some(v) = parse_float_value(val) {
                                config.transition_altitude_ft = v;
                            }
                        }
                        _ => {}
                    }
                }
            } else if current_section.as_deref() == Some("radar") {
                match key {
                    "lat" => radar_lat = parse_float_value(val),
                    "lon" => radar_lon = parse_float_value(val),
                    "height_m" => radar_height = parse_float_value(val).unwrap_or(0.0),
                    _ => {}
                }
            }
        }
    }

    if let (Some(lat_deg), Some(lon_deg)) = (radar_lat, radar_lon) {
        config.radar = Some(RadarSite {
            lat_deg,
            lon_deg,
            height_m: radar_height,
        });
    }

    Some(config)
}

fn parse_float_value(val: &str) -> Option<f64> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    val.parse().ok()
}

/// Serialize config to YAML-like text.
fn serialize_config(config: &DecodeConfig) -> String {
    let mut lines = vec!["# asterix-decode configuration".to_string(), String::new()];

    lines.push("radar:".into());
    match config.radar {
        Some(site) => {
            lines.push(format!("  lat: {}", site.lat_deg));
            lines.push(format!("  lon: {}", site.lon_deg));
            lines.push(format!("  height_m: {}", site.height_m));
        }
        None => {
            lines.push("  lat: null".into());
            lines.push("  lon: null".into());
            lines.push("  height_m: 0".into());
        }
    }
    lines.push(String::new());

    match config.qnh_actual {
        Some(q) => lines.push(format!("qnh: {q}")),
        None => lines.push("qnh: null".into()),
    }
    lines.push(format!(
        "transition_altitude_ft: {}",
        config.transition_altitude_ft
    ));

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
