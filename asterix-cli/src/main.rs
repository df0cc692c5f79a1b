//! asterix-cli: decode ASTERIX recording files from the command line.
//!
//! Supports:
//! - Framing a recording into data blocks and printing a per-category census
//! - Full CAT048/CAT021 decode to human-readable or JSON-lines output

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use asterix_core::{decode_block, load_config, AsterixError, Framer, Processor, RadarSite};

mod geodesy;

#[derive(Parser)]
#[command(name = "asterix", version, about = "ASTERIX CAT048/CAT021 recording decoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Frame a recording and print a per-category message census
    Frames {
        /// Path to the raw ASTERIX recording
        file: PathBuf,
    },
    /// Decode CAT048/CAT021 records to stdout
    Decode {
        /// Path to the raw ASTERIX recording
        file: PathBuf,

        /// Emit one JSON object per derived record
        #[arg(long)]
        json: bool,

        /// Actual QNH in hPa, overriding the config file
        #[arg(long)]
        qnh: Option<f64>,

        /// Radar site latitude in degrees, overriding the config file
        #[arg(long)]
        lat: Option<f64>,

        /// Radar site longitude in degrees, overriding the config file
        #[arg(long)]
        lon: Option<f64>,

        /// Radar site height in meters
        #[arg(long, default_value = "0")]
        height: f64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Frames { file } => cmd_frames(file),
        Commands::Decode {
            file,
            json,
            qnh,
            lat,
            lon,
            height,
        } => cmd_decode(file, json, qnh, lat, lon, height),
    };

    if let Err(e) = result {
        warn!("{e}");
        std::process::exit(1);
    }
}

fn cmd_frames(file: PathBuf) -> std::io::Result<()> {
    let buf = std::fs::read(&file)?;
    info!("framing {} ({} bytes)", file.display(), buf.len());

    let mut counts: BTreeMap<u8, (usize, usize)> = BTreeMap::new();
    let mut framer = Framer::new(&buf);
    for msg in &mut framer {
        let entry = counts.entry(msg.category).or_default();
        entry.0 += 1;
        entry.1 += msg.declared_length as usize;
    }

    let leftover = buf.len() - framer.position();
    for (category, (frames, bytes)) in &counts {
        println!("CAT{category:03}: {frames} frames, {bytes} bytes");
    }
    if leftover > 0 {
        info!("{leftover} trailing bytes not framed (torn tail)");
    }
    Ok(())
}

fn cmd_decode(
    file: PathBuf,
    json: bool,
    qnh: Option<f64>,
    lat: Option<f64>,
    lon: Option<f64>,
    height: f64,
) -> std::io::Result<()> {
    let buf = std::fs::read(&file)?;

    let mut config = load_config();
    if qnh.is_some() {
        config.qnh_actual = qnh;
    }
    if let (Some(lat_deg), Some(lon_deg)) = (lat, lon) {
        config.radar = Some(RadarSite {
            lat_deg,
            lon_deg,
            height_m: height,
        });
    }
    if config.radar.is_none() {
        info!("no radar site configured; CAT048 positions will be absent");
    }

    let mut processor = Processor::new(config, geodesy::SphericalTransform);

    let mut frames = 0u64;
    let mut records = 0u64;
    let mut unknown = 0u64;
    let mut incomplete = 0u64;

    for msg in Framer::new(&buf) {
        frames += 1;
        let block = decode_block(&msg);

        match &block.failure {
            Some(AsterixError::UnknownCategory(_)) => {
                unknown += 1;
                debug!("CAT{:03} frame passed through undecoded", block.category);
            }
            Some(failure) => {
                incomplete += 1;
                debug!("CAT{:03} block stopped early: {failure}", block.category);
            }
            None => {}
        }

        for record in &block.records {
            records += 1;
            let target = processor.process(record);
            if json {
                match serde_json::to_string(&target) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!("serialization failed: {e}"),
                }
            } else {
                println!("{target:#?}");
            }
        }
    }

    info!(
        "{frames} frames, {records} records decoded, {incomplete} blocks incomplete, \
         {unknown} unknown-category frames"
    );
    Ok(())
}
