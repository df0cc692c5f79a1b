//! Per-message decode driver: FSPEC + record loop + category dispatch.
//!
//! Failure taxonomy:
//! - structural failures (malformed FSPEC, truncated record body) abort the
//!   enclosing data block but keep every record decoded before the fault;
//! - individual field failures never reach here — the record decoders
//!   degrade them to absent fields;
//! - unknown categories are framed and counted but never decoded.
//!
//! No failure in one message affects any other message's decode.

use crate::cat021::{self, RawCat021Record};
use crate::cat048::{self, RawCat048Record};
use crate::cursor::FieldCursor;
use crate::framer::RawMessage;
use crate::fspec::parse_fspec;
use crate::types::AsterixError;

pub const CAT048: u8 = 48;
pub const CAT021: u8 = 21;

/// One decoded record, tagged by category.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedRecord {
    Cat048(RawCat048Record),
    Cat021(RawCat021Record),
}

/// Result of decoding one framed message: the records that decoded cleanly
/// plus the structural failure that stopped the block, if any.
#[derive(Debug)]
pub struct BlockDecode {
    pub category: u8,
    pub records: Vec<DecodedRecord>,
    pub failure: Option<AsterixError>,
}

impl BlockDecode {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Decode all records in one framed message.
pub fn decode_block(msg: &RawMessage) -> BlockDecode {
    match msg.category {
        CAT048 | CAT021 => decode_known(msg),
        other => BlockDecode {
            category: other,
            records: Vec::new(),
            failure: Some(AsterixError::UnknownCategory(other)),
        },
    }
}

fn decode_known(msg: &RawMessage) -> BlockDecode {
    let mut cursor = FieldCursor::new(msg.payload);
    let mut records = Vec::new();
    let mut failure = None;

    while !cursor.is_empty() {
        let fspec = match parse_fspec(&mut cursor) {
            Ok(f) => f,
            Err(e) => {
                // No recovery point exists mid-FSPEC
                failure = Some(e);
                break;
            }
        };

        let status = match msg.category {
            CAT048 => {
                let (rec, status) = cat048::decode_record(&fspec, &mut cursor);
                records.push(DecodedRecord::Cat048(rec));
                status
            }
            _ => {
                let (rec, status) = cat021::decode_record(&fspec, &mut cursor);
                records.push(DecodedRecord::Cat021(rec));
                status
            }
        };

        if let Err(e) = status {
            // Truncated record body: the partial record is kept, but the
            // cursor position is no longer trustworthy for a next FSPEC.
            failure = Some(match e {
                AsterixError::FieldOutOfBounds { .. } => AsterixError::TruncatedStream {
                    context: "record body ended before its declared items",
                },
                other => other,
            });
            break;
        }
    }

    BlockDecode {
        category: msg.category,
        records,
        failure,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framer::Framer;
    use crate::types::DataSource;

    fn message(category: u8, payload: &[u8]) -> Vec<u8> {
        let len = (payload.len() + 3) as u16;
        let mut out = vec![category];
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_decode_cat048_block_with_two_records() {
        // Two minimal records, each: FSPEC 0x80 + I048/010
        let payload = [0x80, 0x19, 0x0E, 0x80, 0x21, 0x07];
        let buf = message(48, &payload);
        let msg = Framer::new(&buf).next().unwrap();

        let block = decode_block(&msg);
        assert!(block.is_complete());
        assert_eq!(block.records.len(), 2);
        match &block.records[1] {
            DecodedRecord::Cat048(rec) => {
                assert_eq!(rec.data_source, Some(DataSource { sac: 0x21, sic: 0x07 }))
            }
            other => panic!("expected CAT048 record, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_cat021_block() {
        let payload = [0x80, 0x14, 0x81];
        let buf = message(21, &payload);
        let msg = Framer::new(&buf).next().unwrap();

        let block = decode_block(&msg);
        assert!(block.is_complete());
        assert_eq!(block.records.len(), 1);
        assert!(matches!(block.records[0], DecodedRecord::Cat021(_)));
    }

    #[test]
    fn test_unknown_category_pass_through() {
        let buf = message(62, &[0x80, 0x00, 0x00]);
        let msg = Framer::new(&buf).next().unwrap();

        let block = decode_block(&msg);
        assert_eq!(block.category, 62);
        assert!(block.records.is_empty());
        assert!(matches!(
            block.failure,
            Some(AsterixError::UnknownCategory(62))
        ));
    }

    #[test]
    fn test_malformed_fspec_aborts_block() {
        // First record fine, second record's FSPEC chains past the payload
        let payload = [0x80, 0x19, 0x0E, 0xFF];
        let buf = message(48, &payload);
        let msg = Framer::new(&buf).next().unwrap();

        let block = decode_block(&msg);
        assert_eq!(block.records.len(), 1);
        assert!(matches!(
            block.failure,
            Some(AsterixError::MalformedFspec)
        ));
    }

    #[test]
    fn test_truncated_record_keeps_earlier_records() {
        // Second record declares position but the bytes end early
        let payload = [0x80, 0x19, 0x0E, 0x90, 0x21, 0x07, 0x20];
        let buf = message(48, &payload);
        let msg = Framer::new(&buf).next().unwrap();

        let block = decode_block(&msg);
        assert_eq!(block.records.len(), 2);
        assert!(matches!(
            block.failure,
            Some(AsterixError::TruncatedStream { .. })
        ));
        match &block.records[1] {
            DecodedRecord::Cat048(rec) => {
                // SAC/SIC decoded before the fault survives
                assert_eq!(rec.data_source, Some(DataSource { sac: 0x21, sic: 0x07 }));
                assert!(rec.rho_raw.is_none());
            }
            other => panic!("expected CAT048 record, got {other:?}"),
        }
    }

    #[test]
    fn test_messages_decode_independently() {
        let mut buf = message(48, &[0xFF]); // malformed fspec
        buf.extend_from_slice(&message(48, &[0x80, 0x19, 0x0E]));

        let blocks: Vec<_> = Framer::new(&buf).map(|m| decode_block(&m)).collect();
        assert_eq!(blocks.len(), 2);
        assert!(!blocks[0].is_complete());
        assert!(blocks[1].is_complete());
        assert_eq!(blocks[1].records.len(), 1);
    }

    #[test]
    fn test_fuzzed_blocks_never_panic() {
        let payload = [
            0xF4, 0x14, 0x81, 0x21, 0x40, 0x0E, 0x10, 0x05, 0x20, 0x00, 0x00, 0xE0, 0x00, 0x00,
        ];
        for cut in 0..=payload.len() {
            let buf = message(21, &payload[..cut]);
            if let Some(msg) = Framer::new(&buf).next() {
                let _ = decode_block(&msg);
            }
        }
    }
}
