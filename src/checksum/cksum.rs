// CRC-style engines
// Both produce a 32-bit value that is reported as a decimal string

use super::digest::Hasher;

/// POSIX `cksum` lookup table for the 0x04C11DB7 polynomial (MSB-first)
const CKSUM_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0u32;
    while i < 256 {
        let mut crc = i << 24;
        let mut j = 0;
        while j < 8 {
            if crc & 0x8000_0000 != 0 {
                crc = (crc << 1) ^ 0x04C1_1DB7;
            } else {
                crc <<= 1;
            }
            j += 1;
        }
        table[i as usize] = crc;
        i += 1;
    }
    table
};

/// Checksum compatible with the POSIX `cksum` utility.
///
/// The byte length of the input is folded into the CRC (least significant
/// byte first, significant bytes only) before the final complement, so the
/// digest of an empty input is `0xFFFFFFFF`.
#[derive(Debug, Default, Clone)]
pub struct PosixCksum {
    crc: u32,
    length: u64,
}

impl PosixCksum {
    pub fn new() -> Self {
        Self::default()
    }

    fn feed(&mut self, byte: u8) {
        self.crc = (self.crc << 8) ^ CKSUM_TABLE[((self.crc >> 24) ^ u32::from(byte)) as usize];
    }

    /// Final checksum value
    pub fn value(mut self) -> u32 {
        let mut length = self.length;
        while length > 0 {
            self.feed((length & 0xFF) as u8);
            length >>= 8;
        }
        !self.crc
    }
}

impl Hasher for PosixCksum {
    fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.feed(byte);
        }
        self.length += data.len() as u64;
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        (*self).value().to_be_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        4
    }
}

/// Standard CRC-32 (IEEE 802.3), as computed by zlib
pub struct Crc32(crc32fast::Hasher);

impl Crc32 {
    pub fn new() -> Self {
        Self(crc32fast::Hasher::new())
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Crc32 {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_be_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        4
    }
}
