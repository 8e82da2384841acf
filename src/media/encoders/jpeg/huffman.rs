// SPDX-License-Identifier: GPL-3.0-only

//! Standard Huffman tables (Table K.3 - K.6)
//!
//! Many UVC cameras leave these out of their MJPEG frames. They make up the
//! DHT block appended to or inserted into device-compressed frames.

/// Table specification as stored in a DHT segment
pub struct HuffmanSpec {
    /// 0 = DC, 1 = AC
    pub class: u8,
    /// 0 = luminance, 1 = chrominance
    pub id: u8,
    /// Number of codes of each length 1..=16
    pub bits: [u8; 16],
    pub values: &'static [u8],
}

pub const DC_LUMA: HuffmanSpec = HuffmanSpec {
    class: 0,
    id: 0,
    bits: [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
    values: &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
};

pub const DC_CHROMA: HuffmanSpec = HuffmanSpec {
    class: 0,
    id: 1,
    bits: [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0],
    values: &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
};

pub const AC_LUMA: HuffmanSpec = HuffmanSpec {
    class: 1,
    id: 0,
    bits: [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 0x7d],
    values: &[
        0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61,
        0x07, 0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xa1, 0x08, 0x23, 0x42, 0xb1, 0xc1, 0x15, 0x52,
        0xd1, 0xf0, 0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0a, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x25,
        0x26, 0x27, 0x28, 0x29, 0x2a, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x43, 0x44, 0x45,
        0x46, 0x47, 0x48, 0x49, 0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5a, 0x63, 0x64,
        0x65, 0x66, 0x67, 0x68, 0x69, 0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a, 0x83,
        0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99,
        0x9a, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6,
        0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2, 0xd3,
        0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe1, 0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8,
        0xe9, 0xea, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8, 0xf9, 0xfa,
    ],
};

pub const AC_CHROMA: HuffmanSpec = HuffmanSpec {
    class: 1,
    id: 1,
    bits: [0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 0x77],
    values: &[
        0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21, 0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61,
        0x71, 0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91, 0xa1, 0xb1, 0xc1, 0x09, 0x23, 0x33,
        0x52, 0xf0, 0x15, 0x62, 0x72, 0xd1, 0x0a, 0x16, 0x24, 0x34, 0xe1, 0x25, 0xf1, 0x17, 0x18,
        0x19, 0x1a, 0x26, 0x27, 0x28, 0x29, 0x2a, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x43, 0x44,
        0x45, 0x46, 0x47, 0x48, 0x49, 0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5a, 0x63,
        0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a,
        0x82, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97,
        0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4,
        0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca,
        0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7,
        0xe8, 0xe9, 0xea, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8, 0xf9, 0xfa,
    ],
};

/// DHT segment order: DC/AC luminance, then DC/AC chrominance
pub const STANDARD_TABLES: [&HuffmanSpec; 4] = [&DC_LUMA, &AC_LUMA, &DC_CHROMA, &AC_CHROMA];

/// Size in bytes of the DHT segment holding all four standard tables
pub const DHT_SEGMENT_LEN: usize = 420;

/// Append a DHT marker segment with all four standard tables
pub fn write_dht_segment(out: &mut Vec<u8>) {
    let payload: usize = STANDARD_TABLES
        .iter()
        .map(|spec| 1 + 16 + spec.values.len())
        .sum();
    let length = (payload + 2) as u16;

    out.extend_from_slice(&[0xFF, 0xC4]);
    out.extend_from_slice(&length.to_be_bytes());
    for spec in STANDARD_TABLES {
        out.push((spec.class << 4) | spec.id);
        out.extend_from_slice(&spec.bits);
        out.extend_from_slice(spec.values);
    }
}

/// The DHT segment as an owned buffer
pub fn dht_segment() -> Vec<u8> {
    let mut out = Vec::with_capacity(DHT_SEGMENT_LEN);
    write_dht_segment(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specs_are_consistent() {
        for spec in STANDARD_TABLES {
            let total: usize = spec.bits.iter().map(|&b| b as usize).sum();
            assert_eq!(total, spec.values.len());
        }
    }

    #[test]
    fn test_dht_segment_size_and_header() {
        let dht = dht_segment();
        assert_eq!(dht.len(), DHT_SEGMENT_LEN);
        assert_eq!(&dht[..5], &[0xFF, 0xC4, 0x01, 0xA2, 0x00]);
    }
}
