//! asterix-core: Pure decode library for EUROCONTROL ASTERIX CAT048/CAT021.
//!
//! No async, no I/O — just algorithms over byte slices. This crate is the
//! shared core used by `asterix-cli` and anything else that needs surveillance
//! records out of a framed ASTERIX byte stream.

pub mod bds;
pub mod cat021;
pub mod cat048;
pub mod config;
pub mod cursor;
pub mod decode;
pub mod derive;
pub mod framer;
pub mod fspec;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{load_config, DecodeConfig, RadarSite};
pub use decode::{decode_block, BlockDecode, DecodedRecord};
pub use derive::{Cat021Target, Cat048Target, CoordinateTransform, DerivedTarget, Processor};
pub use framer::{Framer, RawMessage};
pub use types::*;
