//! Transmit path: message in, delimited and escaped frame out.

use log::trace;

use crate::checksum::Checksum;
use crate::codec::{needs_escape, DELIMITER, ESCAPE, INVERT_MASK};
use crate::port::ByteSink;

/// Writes frames byte by byte to a sink.
///
/// The only state kept across calls is the transmit checksum, which is reset
/// at the start of every frame. One instance may send any number of frames
/// in sequence.
#[derive(Debug)]
pub struct Framer<W, C> {
    sink: W,
    checksum: C,
}

impl<W: ByteSink, C: Checksum + Default> Framer<W, C> {
    pub fn new(sink: W) -> Self {
        Self::with_checksum(sink, C::default())
    }
}

impl<W: ByteSink, C: Checksum> Framer<W, C> {
    pub fn with_checksum(sink: W, checksum: C) -> Self {
        Self { sink, checksum }
    }

    /// Emit one complete frame carrying `message`.
    pub fn transmit_frame(&mut self, message: &[u8]) {
        self.transmit_start();
        self.transmit_bytes(message);
        self.transmit_end();
        trace!("framed {} payload bytes", message.len());
    }

    /// Open a frame: delimiter out, checksum reset.
    pub fn transmit_start(&mut self) {
        self.sink.write_byte(DELIMITER);
        self.checksum.reset();
    }

    /// Append one payload byte to the frame opened by [`Self::transmit_start`].
    pub fn transmit_byte(&mut self, byte: u8) {
        self.escape_and_emit(byte);
        self.checksum.update(byte);
    }

    pub fn transmit_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.transmit_byte(byte);
        }
    }

    /// Close the frame: escaped checksum trailer, then the delimiter.
    pub fn transmit_end(&mut self) {
        self.checksum.finalize();
        for index in 0..self.checksum.size() {
            let byte = self.checksum.byte(index);
            self.escape_and_emit(byte);
        }
        self.sink.write_byte(DELIMITER);
    }

    /// Write `byte` to the sink, escaped if it collides with a control byte.
    /// Does not touch the checksum.
    pub fn escape_and_emit(&mut self, byte: u8) {
        if needs_escape(byte) {
            self.sink.write_byte(ESCAPE);
            self.sink.write_byte(byte ^ INVERT_MASK);
        } else {
            self.sink.write_byte(byte);
        }
    }

    pub fn checksum(&self) -> &C {
        &self.checksum
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }
}
