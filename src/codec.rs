//! Wire constants and whole-buffer helpers.
//!
//! Frame layout: `7E <escaped payload> <escaped checksum trailer> 7E`. Any
//! literal `7E` or `7D` inside the frame is sent as `7D, byte ^ 0x20`. The
//! checksum covers the unescaped payload only.

use std::collections::VecDeque;

use thiserror::Error;

use crate::checksum::Checksum;
use crate::framer::Framer;
use crate::framing::{Deframer, MessageQueue, RxState};

/// Opens and closes every frame.
pub const DELIMITER: u8 = 0x7E;
/// Marks the next byte as an inverted literal.
pub const ESCAPE: u8 = 0x7D;
pub const INVERT_MASK: u8 = 0x20;

/// True for the two byte values that cannot appear literally inside a frame.
pub fn needs_escape(byte: u8) -> bool {
    byte == DELIMITER || byte == ESCAPE
}

/// Append the escaped form of `bytes` to `buf`. No delimiters, no checksum.
pub fn escape_into(bytes: &[u8], buf: &mut Vec<u8>) {
    for &byte in bytes {
        if needs_escape(byte) {
            buf.push(ESCAPE);
            buf.push(byte ^ INVERT_MASK);
        } else {
            buf.push(byte);
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("no complete frame in {0} bytes")]
    NoFrame(usize),
    #[error("frame checksum mismatch")]
    ChecksumMismatch,
}

/// Append one complete frame carrying `message` to `buf`.
pub fn encode<C: Checksum + Default>(message: &[u8], buf: &mut Vec<u8>) {
    let mut framer: Framer<&mut Vec<u8>, C> = Framer::new(buf);
    framer.transmit_frame(message);
}

/// Decode the first valid frame found in `bytes`.
///
/// Corrupt frames before it are skipped. If none validates, the error reports
/// whether a corrupt frame was seen.
pub fn decode<C: Checksum + Default>(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let source: VecDeque<u8> = bytes.iter().copied().collect();
    let mut deframer: Deframer<VecDeque<u8>, C> = Deframer::new(source);
    let mut queue = MessageQueue::new();

    while !deframer.source().is_empty() {
        deframer.receive(&mut queue);
        if deframer.state() == RxState::FrameComplete {
            break;
        }
    }

    match queue.pop_front() {
        Some(message) => Ok(message),
        None if deframer.stats().checksum_errors > 0 => Err(CodecError::ChecksumMismatch),
        None => Err(CodecError::NoFrame(bytes.len())),
    }
}
