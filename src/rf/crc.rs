//! # CRC8-DVB-S2
//!
//! Frame checksum expected by the RF bridge.
//!
//! **Polynomial**: 0xD5 (x^8 + x^7 + x^6 + x^4 + x^2 + 1)
//! **Initial Value**: 0x00

const CRC8_POLY: u8 = 0xD5;

const CRC8_TABLE: [u8; 256] = generate_crc8_table();

const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        table[i] = crc8_step(i as u8);
        i += 1;
    }

    table
}

const fn crc8_step(mut crc: u8) -> u8 {
    let mut bit = 0;
    while bit < 8 {
        crc = if crc & 0x80 != 0 {
            (crc << 1) ^ CRC8_POLY
        } else {
            crc << 1
        };
        bit += 1;
    }
    crc
}

/// Checksum over everything between the sync byte and the CRC itself
pub fn crc8_dvb_s2(data: &[u8]) -> u8 {
    data.iter()
        .fold(0u8, |crc, &byte| CRC8_TABLE[(crc ^ byte) as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crc8_bitwise(data: &[u8]) -> u8 {
        data.iter().fold(0u8, |crc, &byte| crc8_step(crc ^ byte))
    }

    #[test]
    fn test_crc8_empty() {
        assert_eq!(crc8_dvb_s2(&[]), 0x00);
    }

    #[test]
    fn test_crc8_check_value() {
        // Standard CRC-8/DVB-S2 check value for "123456789"
        assert_eq!(crc8_dvb_s2(b"123456789"), 0xBC);
    }

    #[test]
    fn test_crc8_table_matches_bitwise() {
        let samples: [&[u8]; 4] = [
            &[0x07, 0x01, 0x00, 0xBC, 0x61, 0x52, 0x05],
            &[0xFF; 12],
            &[0x00; 8],
            b"bridge",
        ];

        for data in samples {
            assert_eq!(crc8_dvb_s2(data), crc8_bitwise(data), "data: {:02X?}", data);
        }
    }

    #[test]
    fn test_crc8_detects_flipped_bit() {
        let a = [0x07, 0x01, 0x12, 0x34, 0x56, 0x78, 0x05];
        let mut b = a;
        b[4] ^= 0x01;
        assert_ne!(crc8_dvb_s2(&a), crc8_dvb_s2(&b));
    }
}
