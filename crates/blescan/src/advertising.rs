//! Bluetooth LE advertising data
//!
//! Advertising data is a sequence of length-prefixed records: one length byte
//! `L` followed by `L` bytes, the first of which is the AD type. Controllers
//! usually pad the payload with a zero-length record.

/// Trim advertising data down to its usable payload.
///
/// The payload ends at the first zero-length record. If no such record is
/// found, or a record claims more bytes than remain, the input is returned
/// untouched rather than guessing where the payload ends.
///
/// # Arguments
///
/// * `data` - Raw advertising data as delivered with a report
///
/// # Returns
///
/// The bytes before the terminator, or all of `data`
pub fn trim_advertising_data(data: &[u8]) -> &[u8] {
    let mut offset = 0;

    while offset < data.len() {
        let length = data[offset] as usize;
        if length == 0 {
            return &data[..offset];
        }

        if data.len() - offset - 1 < length {
            // Truncated record
            return data;
        }

        offset += 1 + length;
    }

    data
}

/// Split advertising data into its AD structures
///
/// Parsing stops at the first zero-length or truncated record.
///
/// # Returns
///
/// A vector of (type, data) tuples
pub fn parse_advertising_data(data: &[u8]) -> Vec<(u8, &[u8])> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let length = data[i] as usize;
        if length == 0 || i + length >= data.len() {
            break;
        }

        result.push((data[i + 1], &data[i + 2..i + 1 + length]));
        i += 1 + length;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_stops_at_terminator() {
        assert_eq!(
            trim_advertising_data(&[0x02, 0x01, 0x00, 0x00]),
            &[0x02, 0x01, 0x00]
        );
        assert!(trim_advertising_data(&[0x00]).is_empty());

        // Zero padding after a name record
        let padded = [0x03, 0x09, b'h', b'i', 0x00, 0x00, 0x00, 0x00];
        assert_eq!(trim_advertising_data(&padded), &padded[..4]);
    }

    #[test]
    fn test_trim_without_terminator_keeps_everything() {
        let record: Vec<u8> = [0x01, 0x00].repeat(31);
        assert_eq!(record.len(), 62);
        assert_eq!(trim_advertising_data(&record), record.as_slice());

        assert!(trim_advertising_data(&[]).is_empty());
    }

    #[test]
    fn test_trim_malformed_keeps_everything() {
        // Second record claims 5 bytes but only 2 remain
        let data = [0x02, 0x01, 0x06, 0x05, 0xFF, 0x00];
        assert_eq!(trim_advertising_data(&data), &data);

        // A terminator after a truncated record is never reached
        let data = [0x09, 0x01, 0x00];
        assert_eq!(trim_advertising_data(&data), &data);
    }

    #[test]
    fn test_parse_advertising_data() {
        let data = [
            0x02, 0x01, 0x06, // Flags
            0x03, 0x09, b'h', b'i', // Complete local name
            0x00, 0x00,
        ];

        let structures = parse_advertising_data(&data);
        assert_eq!(structures.len(), 2);
        assert_eq!(structures[0], (0x01, &[0x06][..]));
        assert_eq!(structures[1], (0x09, &b"hi"[..]));

        // Truncated trailing record is skipped
        let structures = parse_advertising_data(&[0x02, 0x01, 0x06, 0x04, 0x09]);
        assert_eq!(structures.len(), 1);
    }
}
