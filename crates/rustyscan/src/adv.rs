//! Advertising payload parsing
//!
//! This module walks the length-prefixed AD structures of an LE advertising
//! payload and extracts the pieces the scan coordinator cares about, chiefly
//! the 16-bit service UUID lists used for per-client result fan-out.

use crate::uuid::Uuid;
use byteorder::{ByteOrder, LittleEndian};

// AD structure types
pub const AD_TYPE_FLAGS: u8 = 0x01;
pub const AD_TYPE_16BIT_SERVICE_UUID_PARTIAL: u8 = 0x02;
pub const AD_TYPE_16BIT_SERVICE_UUID_COMPLETE: u8 = 0x03;
pub const AD_TYPE_SHORT_LOCAL_NAME: u8 = 0x08;
pub const AD_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;

/// Parse the AD structures of an advertising payload
///
/// Each structure is `[length, type, data...]` where `length` counts the type
/// byte plus the data. Returns `(type, data)` pairs borrowing from `data`.
/// A zero length or a structure running past the end of the payload
/// terminates the walk.
pub fn parse_ad_structures(data: &[u8]) -> Vec<(u8, &[u8])> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let length = data[i] as usize;
        if length == 0 || i + 1 + length > data.len() {
            break;
        }

        let ad_type = data[i + 1];
        let ad_data = &data[i + 2..i + 1 + length];
        result.push((ad_type, ad_data));

        i += 1 + length;
    }

    result
}

/// Extract the advertised 16-bit service UUIDs from a payload
///
/// Walks AD types 0x02 (partial list) and 0x03 (complete list) and widens
/// each entry to a full 128-bit UUID. Trailing odd bytes in a malformed list
/// are ignored.
pub fn extract_service_uuids(data: &[u8]) -> Vec<Uuid> {
    let mut uuids = Vec::new();

    for (ad_type, ad_data) in parse_ad_structures(data) {
        if ad_type != AD_TYPE_16BIT_SERVICE_UUID_PARTIAL
            && ad_type != AD_TYPE_16BIT_SERVICE_UUID_COMPLETE
        {
            continue;
        }
        for chunk in ad_data.chunks_exact(2) {
            uuids.push(Uuid::from_u16(LittleEndian::read_u16(chunk)));
        }
    }

    uuids
}

/// Check whether a payload satisfies a client's requested UUID set
///
/// An empty request matches everything; otherwise every requested UUID must
/// appear in the payload's advertised service UUID lists.
pub fn matches_uuid_filter(wanted: &[Uuid], data: &[u8]) -> bool {
    if wanted.is_empty() {
        return true;
    }

    let advertised = extract_service_uuids(data);
    wanted.iter().all(|uuid| advertised.contains(uuid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ad_structures() {
        // Flags + complete 16-bit UUID list (battery service)
        let data = [0x02, 0x01, 0x06, 0x03, 0x03, 0x0F, 0x18];
        let structures = parse_ad_structures(&data);

        assert_eq!(structures.len(), 2);
        assert_eq!(structures[0], (AD_TYPE_FLAGS, &[0x06u8][..]));
        assert_eq!(
            structures[1],
            (AD_TYPE_16BIT_SERVICE_UUID_COMPLETE, &[0x0Fu8, 0x18][..])
        );
    }

    #[test]
    fn test_parse_terminates_on_bad_length() {
        // Second structure claims 5 bytes but only 2 remain
        let data = [0x02, 0x01, 0x06, 0x05, 0x03, 0x0F];
        let structures = parse_ad_structures(&data);
        assert_eq!(structures.len(), 1);

        // Zero length terminates
        let data = [0x00, 0x01, 0x06];
        assert!(parse_ad_structures(&data).is_empty());
    }

    #[test]
    fn test_extract_service_uuids() {
        let data = [0x02, 0x01, 0x06, 0x03, 0x03, 0x0F, 0x18];
        let uuids = extract_service_uuids(&data);

        assert_eq!(uuids.len(), 1);
        assert_eq!(
            uuids[0].to_string(),
            "0000180f-0000-1000-8000-00805f9b34fb"
        );

        // Partial list type also counts, name structures do not
        let data = [
            0x05, 0x02, 0x0F, 0x18, 0x0A, 0x18, // partial list: 0x180F, 0x180A
            0x03, 0x09, 0x54, 0x65, // complete local name "Te"
        ];
        let uuids = extract_service_uuids(&data);
        assert_eq!(uuids.len(), 2);
        assert_eq!(uuids[0], 0x180Fu16);
        assert_eq!(uuids[1], 0x180Au16);
    }

    #[test]
    fn test_matches_uuid_filter() {
        let data = [0x02, 0x01, 0x06, 0x03, 0x03, 0x0F, 0x18];

        assert!(matches_uuid_filter(&[], &data));
        assert!(matches_uuid_filter(&[Uuid::from_u16(0x180F)], &data));
        assert!(!matches_uuid_filter(&[Uuid::from_u16(0x180A)], &data));
        assert!(!matches_uuid_filter(
            &[Uuid::from_u16(0x180F), Uuid::from_u16(0x180A)],
            &data
        ));
    }
}
