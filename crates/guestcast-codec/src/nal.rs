//! Annex-B NAL unit inspection.
//!
//! The pipeline delivers each encoded frame as one Annex-B byte stream:
//! every NAL unit prefixed by a 0x000001 or 0x00000001 start code, with
//! SPS/PPS repeated before each keyframe. These helpers classify a
//! delivered payload without a full bitstream parser.

use bytes::Bytes;

/// The H.264 NAL unit types the pipeline distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NalUnitType {
    /// Coded slice of a predicted picture.
    NonIdrSlice = 1,
    /// Coded slice of an IDR picture; this is what makes a keyframe.
    IdrSlice = 5,
    /// Supplemental enhancement information metadata.
    Sei = 6,
    /// Sequence parameter set header, repeated before every keyframe.
    Sps = 7,
    /// Picture parameter set header, repeated before every keyframe.
    Pps = 8,
    /// Access unit delimiter marker.
    Aud = 9,
    /// Anything the pipeline has no reason to classify further.
    Other = 0,
}

impl From<u8> for NalUnitType {
    fn from(header: u8) -> Self {
        match header & 0x1F {
            1 => NalUnitType::NonIdrSlice,
            5 => NalUnitType::IdrSlice,
            6 => NalUnitType::Sei,
            7 => NalUnitType::Sps,
            8 => NalUnitType::Pps,
            9 => NalUnitType::Aud,
            _ => NalUnitType::Other,
        }
    }
}

/// A single NAL unit extracted from an Annex-B stream, start code stripped.
#[derive(Debug, Clone)]
pub struct NalUnit {
    /// The NAL unit type.
    pub nal_type: NalUnitType,
    /// NAL data including the header byte.
    pub data: Bytes,
}

/// Locate the next start code at or after `from`; returns (offset, prefix length).
fn next_start_code(data: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut i = from;
    while i + 3 <= data.len() {
        if data[i] == 0 && data[i + 1] == 0 {
            if data[i + 2] == 1 {
                return Some((i, 3));
            }
            if i + 4 <= data.len() && data[i + 2] == 0 && data[i + 3] == 1 {
                return Some((i, 4));
            }
        }
        i += 1;
    }
    None
}

/// Split an Annex-B byte stream into its NAL units.
pub fn parse_annex_b(data: &[u8]) -> Vec<NalUnit> {
    let mut nals = Vec::new();
    let mut cursor = 0;

    while let Some((start, prefix)) = next_start_code(data, cursor) {
        let payload_start = start + prefix;
        let payload_end = next_start_code(data, payload_start)
            .map(|(next, _)| next)
            .unwrap_or(data.len());

        if payload_start < payload_end {
            nals.push(NalUnit {
                nal_type: NalUnitType::from(data[payload_start]),
                data: Bytes::copy_from_slice(&data[payload_start..payload_end]),
            });
        }
        cursor = payload_end;
    }

    nals
}

/// Whether the stream contains an IDR slice, i.e. a keyframe.
pub fn contains_idr(data: &[u8]) -> bool {
    parse_annex_b(data)
        .iter()
        .any(|nal| nal.nal_type == NalUnitType::IdrSlice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_3byte_start_code() {
        let data = [0x00, 0x00, 0x01, 0x67, 0x42, 0x00, 0x1E];
        let nals = parse_annex_b(&data);
        assert_eq!(nals.len(), 1);
        assert_eq!(nals[0].nal_type, NalUnitType::Sps);
        assert_eq!(nals[0].data.as_ref(), &[0x67, 0x42, 0x00, 0x1E]);
    }

    #[test]
    fn test_parse_4byte_start_code() {
        let data = [0x00, 0x00, 0x00, 0x01, 0x68, 0xCE, 0x3C, 0x80];
        let nals = parse_annex_b(&data);
        assert_eq!(nals.len(), 1);
        assert_eq!(nals[0].nal_type, NalUnitType::Pps);
    }

    #[test]
    fn test_parse_keyframe_sequence() {
        // SPS, PPS, IDR as x264 emits them with b_repeat_headers
        let data = [
            0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0x00, 0x1E, // SPS
            0x00, 0x00, 0x00, 0x01, 0x68, 0xCE, 0x3C, 0x80, // PPS
            0x00, 0x00, 0x01, 0x65, 0x88, 0x84, // IDR
        ];
        let nals = parse_annex_b(&data);
        assert_eq!(nals.len(), 3);
        assert_eq!(nals[0].nal_type, NalUnitType::Sps);
        assert_eq!(nals[1].nal_type, NalUnitType::Pps);
        assert_eq!(nals[2].nal_type, NalUnitType::IdrSlice);
        assert!(contains_idr(&data));
    }

    #[test]
    fn test_non_idr_is_not_keyframe() {
        let data = [0x00, 0x00, 0x01, 0x41, 0x9A, 0x02];
        assert!(!contains_idr(&data));
    }

    #[test]
    fn test_no_start_code_yields_nothing() {
        let data = [0x65, 0x88, 0x84, 0x00];
        assert!(parse_annex_b(&data).is_empty());
    }
}
