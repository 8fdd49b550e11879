//! Receive state machine that turns a polled byte stream into messages.
//!
//! One byte is consumed per call. A delimiter both closes the frame collected
//! so far (if any) and opens the next one, so back-to-back delimiters and
//! line noise between frames are absorbed without special cases. A frame
//! whose trailer does not validate is dropped and parsing resumes at the next
//! delimiter.

use std::collections::VecDeque;

use log::{debug, trace, warn};

use crate::checksum::Checksum;
use crate::codec::{DELIMITER, ESCAPE, INVERT_MASK};
use crate::config::Config;
use crate::error::Error;
use crate::port::ByteSource;

/// Decoded payloads, oldest first. Owned and drained by the caller.
pub type MessageQueue = VecDeque<Vec<u8>>;

/// Where the deframer is within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxState {
    /// Collecting frame bytes.
    Receiving,
    /// Previous byte was the escape marker.
    Escaped,
    /// Last delimiter closed a valid frame. Cleared by the next byte.
    FrameComplete,
    /// Last delimiter closed a corrupt frame. Cleared by the next byte.
    ChecksumError,
    /// Frame outgrew the configured limit; bytes are ignored until a delimiter.
    Overflow,
}

impl RxState {
    fn is_terminal(self) -> bool {
        matches!(self, RxState::FrameComplete | RxState::ChecksumError)
    }
}

/// Counters since construction (not cleared by [`Deframer::reset`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeframerStats {
    pub frames: u64,
    pub checksum_errors: u64,
    pub overflows: u64,
}

#[derive(Debug)]
pub struct Deframer<S, C> {
    source: S,
    checksum: C,
    config: Config,
    state: RxState,
    buffer: Vec<u8>, // logical bytes of the current frame, trailer included
    stats: DeframerStats,
}

impl<S: ByteSource, C: Checksum + Default> Deframer<S, C> {
    pub fn new(source: S) -> Self {
        Self::build(source, C::default(), Config::default())
    }
}

impl<S: ByteSource, C: Checksum> Deframer<S, C> {
    pub fn with_checksum(source: S, checksum: C) -> Self {
        Self::build(source, checksum, Config::default())
    }

    pub fn with_config(source: S, checksum: C, config: Config) -> Result<Self, Error> {
        config.validate(checksum.size())?;
        Ok(Self::build(source, checksum, config))
    }

    fn build(source: S, mut checksum: C, config: Config) -> Self {
        checksum.reset();
        Self {
            source,
            checksum,
            config,
            state: RxState::Receiving,
            buffer: Vec::new(),
            stats: DeframerStats::default(),
        }
    }

    /// Poll the source for one byte and advance the parser.
    ///
    /// Returns the payload length when this byte closed a valid frame (the
    /// payload has then been pushed onto `queue`), otherwise 0. An empty
    /// message also returns 0; check [`Self::state`] for
    /// [`RxState::FrameComplete`] to tell it apart.
    pub fn receive(&mut self, queue: &mut MessageQueue) -> usize {
        match self.source.read_byte() {
            Some(byte) => self.feed(byte, queue),
            None => 0,
        }
    }

    /// Advance the parser with a byte obtained elsewhere.
    pub fn feed(&mut self, byte: u8, queue: &mut MessageQueue) -> usize {
        if self.state.is_terminal() {
            self.start_frame();
        }

        if byte == DELIMITER {
            if self.state == RxState::Receiving && !self.buffer.is_empty() {
                return self.close_frame(queue);
            }
            if self.state != RxState::Receiving {
                debug!(
                    "delimiter in state {:?}, discarding {} buffered bytes",
                    self.state,
                    self.buffer.len()
                );
            }
            self.start_frame();
            return 0;
        }

        match self.state {
            RxState::Receiving if byte == ESCAPE => self.state = RxState::Escaped,
            RxState::Escaped => {
                self.state = RxState::Receiving;
                self.accept(byte ^ INVERT_MASK);
            }
            RxState::Receiving => self.accept(byte),
            _ => {}
        }
        0
    }

    /// Drop any in-flight frame and wait for the next delimiter-opened one.
    pub fn reset(&mut self) {
        self.start_frame();
    }

    pub fn state(&self) -> RxState {
        self.state
    }

    pub fn stats(&self) -> DeframerStats {
        self.stats
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Logical bytes collected so far for the current frame.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_parts(self) -> (S, C) {
        (self.source, self.checksum)
    }

    fn start_frame(&mut self) {
        self.state = RxState::Receiving;
        self.buffer.clear();
        self.checksum.reset();
    }

    fn accept(&mut self, byte: u8) {
        if let Some(max) = self.config.max_frame_len {
            if self.buffer.len() >= max {
                warn!("frame exceeds {max} bytes, dropping until next delimiter");
                self.stats.overflows += 1;
                self.buffer.clear();
                self.state = RxState::Overflow;
                return;
            }
        }
        self.checksum.update(byte);
        self.buffer.push(byte);
    }

    fn close_frame(&mut self, queue: &mut MessageQueue) -> usize {
        let trailer = self.checksum.size();
        if self.buffer.len() < trailer || !self.checksum.validate() {
            warn!("dropping {}-byte frame: checksum mismatch", self.buffer.len());
            self.stats.checksum_errors += 1;
            self.state = RxState::ChecksumError;
            return 0;
        }

        let payload_len = self.buffer.len() - trailer;
        self.buffer.truncate(payload_len);
        queue.push_back(std::mem::take(&mut self.buffer));
        self.stats.frames += 1;
        self.state = RxState::FrameComplete;
        trace!("accepted frame with {payload_len} payload bytes");
        payload_len
    }
}
