//! Running checksums used for the frame trailer.
//!
//! Both implementations are reflected CRCs from the HDLC family. Their
//! trailer bytes are emitted low byte first, which is what lets the receiver
//! fold the trailer into the same register and compare against a fixed
//! residue instead of splitting the frame first.

use crc::{Crc, Digest, CRC_16_IBM_SDLC, CRC_32_ISO_HDLC};

/// A checksum that can be computed one logical byte at a time.
///
/// Framing code only relies on this contract, so any algorithm that exposes
/// a fixed-size trailer can be plugged in.
pub trait Checksum {
    /// Number of trailer bytes appended to each frame.
    fn size(&self) -> usize;

    /// Start a new computation.
    fn reset(&mut self);

    /// Fold one byte into the running computation.
    fn update(&mut self, byte: u8);

    /// Close the computation. Must be called once before reading trailer bytes.
    fn finalize(&mut self);

    /// Trailer byte at `index` of the finalized value, `index < size()`.
    fn byte(&self, index: usize) -> u8;

    /// True when the bytes folded since the last reset form a valid
    /// payload-plus-trailer sequence.
    fn validate(&self) -> bool;
}

pub const X25: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_SDLC);
pub const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

// Finalized value left by an error-free codeword (register residue after the
// final xor).
const X25_GOOD: u16 = CRC_16_IBM_SDLC.residue ^ CRC_16_IBM_SDLC.xorout;
const CRC32_GOOD: u32 = CRC_32_ISO_HDLC.residue ^ CRC_32_ISO_HDLC.xorout;

/// CRC-16/X.25 (CCITT polynomial, reflected), 2-byte trailer.
#[derive(Clone)]
pub struct Crc16 {
    digest: Digest<'static, u16>,
    value: u16,
}

impl Crc16 {
    pub fn new() -> Self {
        Self {
            digest: X25.digest(),
            value: 0,
        }
    }

    /// Finalized value; meaningful after [`Checksum::finalize`].
    pub fn value(&self) -> u16 {
        self.value
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Crc16 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Crc16").field("value", &self.value).finish()
    }
}

impl Checksum for Crc16 {
    fn size(&self) -> usize {
        2
    }

    fn reset(&mut self) {
        self.digest = X25.digest();
        self.value = 0;
    }

    fn update(&mut self, byte: u8) {
        self.digest.update(&[byte]);
    }

    fn finalize(&mut self) {
        self.value = self.digest.clone().finalize();
    }

    fn byte(&self, index: usize) -> u8 {
        self.value.to_le_bytes()[index]
    }

    fn validate(&self) -> bool {
        self.digest.clone().finalize() == X25_GOOD
    }
}

/// CRC-32/ISO-HDLC (the Ethernet/zlib CRC), 4-byte trailer.
#[derive(Clone)]
pub struct Crc32 {
    digest: Digest<'static, u32>,
    value: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Self {
            digest: CRC32.digest(),
            value: 0,
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Crc32 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Crc32").field("value", &self.value).finish()
    }
}

impl Checksum for Crc32 {
    fn size(&self) -> usize {
        4
    }

    fn reset(&mut self) {
        self.digest = CRC32.digest();
        self.value = 0;
    }

    fn update(&mut self, byte: u8) {
        self.digest.update(&[byte]);
    }

    fn finalize(&mut self) {
        self.value = self.digest.clone().finalize();
    }

    fn byte(&self, index: usize) -> u8 {
        self.value.to_le_bytes()[index]
    }

    fn validate(&self) -> bool {
        self.digest.clone().finalize() == CRC32_GOOD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trailer<C: Checksum>(checksum: &mut C, data: &[u8]) -> Vec<u8> {
        checksum.reset();
        for &byte in data {
            checksum.update(byte);
        }
        checksum.finalize();
        (0..checksum.size()).map(|i| checksum.byte(i)).collect()
    }

    #[test]
    fn crc16_matches_known_vectors() {
        let mut crc = Crc16::new();
        assert_eq!(trailer(&mut crc, b"123456789"), vec![0x6E, 0x90]);
        assert_eq!(crc.value(), 0x906E);
        assert_eq!(trailer(&mut crc, &[0x00]), vec![0x78, 0xF0]);
        assert_eq!(trailer(&mut crc, b"~}"), vec![0xF1, 0xCD]);
    }

    #[test]
    fn crc32_matches_known_vectors() {
        let mut crc = Crc32::new();
        assert_eq!(trailer(&mut crc, b"123456789"), vec![0x26, 0x39, 0xF4, 0xCB]);
        assert_eq!(crc.value(), 0xCBF43926);
    }

    #[test]
    fn validates_payload_followed_by_trailer() {
        let mut tx = Crc16::new();
        let tail = trailer(&mut tx, b"hello");

        let mut rx = Crc16::new();
        for &byte in b"hello".iter().chain(tail.iter()) {
            rx.update(byte);
        }
        assert!(rx.validate());

        rx.update(0x00);
        assert!(!rx.validate());
    }

    #[test]
    fn crc32_validates_after_reset() {
        let mut tx = Crc32::new();
        let tail = trailer(&mut tx, b"hi");

        let mut rx = Crc32::new();
        rx.update(0xAA);
        rx.reset();
        for &byte in b"hi".iter().chain(tail.iter()) {
            rx.update(byte);
        }
        assert!(rx.validate());
    }
}
