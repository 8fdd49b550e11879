//! Frame reader that wraps any `std::io::Read` source.

use std::collections::VecDeque;
use std::io::Read;

use crate::checksum::Checksum;
use crate::config::Config;
use crate::error::Error;
use crate::framing::{Deframer, DeframerStats, MessageQueue};

/// Wraps a `Read` source and yields one decoded message at a time.
///
/// Bytes read from the source are queued in front of a [`Deframer`] and
/// consumed one by one. Frames that fail their checksum are skipped; the
/// count is available through [`FrameReader::stats`].
///
/// # Example
///
/// ```no_run
/// use std::fs::File;
/// use hdlcframe::{Crc16, FrameReader};
///
/// let port = File::open("/dev/ttyUSB0").unwrap();
/// let mut reader: FrameReader<_, Crc16> = FrameReader::new(port);
///
/// loop {
///     match reader.read_message() {
///         Ok(message) => println!("Received: {:02X?}", message),
///         Err(e) => {
///             eprintln!("Error: {}", e);
///             break;
///         }
///     }
/// }
/// ```
pub struct FrameReader<R, C> {
    reader: R,
    deframer: Deframer<VecDeque<u8>, C>,
    read_buffer: Vec<u8>,
    messages: MessageQueue,
}

impl<R: Read, C: Checksum + Default> FrameReader<R, C> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, 4096)
    }

    /// Create a reader with a specific read buffer size.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self::build(reader, Deframer::new(VecDeque::new()), capacity)
    }
}

impl<R: Read, C: Checksum> FrameReader<R, C> {
    pub fn with_config(reader: R, checksum: C, config: Config) -> Result<Self, Error> {
        let deframer = Deframer::with_config(VecDeque::new(), checksum, config)?;
        Ok(Self::build(reader, deframer, 4096))
    }

    fn build(reader: R, deframer: Deframer<VecDeque<u8>, C>, capacity: usize) -> Self {
        Self {
            reader,
            deframer,
            read_buffer: vec![0u8; capacity.max(1)],
            messages: MessageQueue::new(),
        }
    }

    /// Read one complete message from the stream.
    ///
    /// Blocks until a valid frame has been decoded or the source fails.
    ///
    /// # Errors
    ///
    /// - [`Error::UnexpectedEof`] if the stream ends first. Messages already
    ///   decoded are still returned by earlier calls.
    /// - [`Error::Io`] if the underlying read fails.
    pub fn read_message(&mut self) -> Result<Vec<u8>, Error> {
        loop {
            if let Some(message) = self.messages.pop_front() {
                return Ok(message);
            }

            if !self.deframer.source().is_empty() {
                self.deframer.receive(&mut self.messages);
                continue;
            }

            let bytes_read = self.reader.read(&mut self.read_buffer)?;
            if bytes_read == 0 {
                return Err(Error::UnexpectedEof);
            }
            self.deframer
                .source_mut()
                .extend(&self.read_buffer[..bytes_read]);
        }
    }

    pub fn stats(&self) -> DeframerStats {
        self.deframer.stats()
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Unwrap and return the underlying reader, discarding any buffered data.
    pub fn into_reader(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::{Crc16, Crc32};
    use crate::codec;
    use std::io::{self, Cursor};

    fn encode_messages(messages: &[&[u8]]) -> Vec<u8> {
        let mut buf = Vec::new();
        for message in messages {
            codec::encode::<Crc16>(message, &mut buf);
        }
        buf
    }

    #[test]
    fn reads_single_message() {
        let wire = encode_messages(&[b"ping"]);
        let mut reader: FrameReader<_, Crc16> = FrameReader::new(Cursor::new(wire));
        assert_eq!(reader.read_message().unwrap(), b"ping".to_vec());
    }

    #[test]
    fn reads_multiple_messages() {
        let messages: [&[u8]; 3] = [b"hello", b"", &[0x7E, 0x7D, 0x20]];
        let wire = encode_messages(&messages);
        let mut reader: FrameReader<_, Crc16> = FrameReader::new(Cursor::new(wire));

        for expected in &messages {
            assert_eq!(reader.read_message().unwrap(), expected.to_vec());
        }
    }

    #[test]
    fn handles_fragmented_reads() {
        // Create a reader that returns 1 byte at a time
        struct OneByteReader {
            data: Vec<u8>,
            pos: usize,
        }

        impl Read for OneByteReader {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.pos >= self.data.len() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.data[self.pos];
                self.pos += 1;
                Ok(1)
            }
        }

        let mut data = Vec::new();
        codec::encode::<Crc32>(b"test", &mut data);
        let mut reader: FrameReader<_, Crc32> =
            FrameReader::new(OneByteReader { data, pos: 0 });

        assert_eq!(reader.read_message().unwrap(), b"test".to_vec());
    }

    #[test]
    fn skips_corrupt_frames() {
        let mut wire = encode_messages(&[b"first"]);
        wire[2] ^= 0x04;
        wire.extend(encode_messages(&[b"second"]));

        let mut reader: FrameReader<_, Crc16> = FrameReader::new(Cursor::new(wire));
        assert_eq!(reader.read_message().unwrap(), b"second".to_vec());
        assert_eq!(reader.stats().checksum_errors, 1);
    }

    #[test]
    fn errors_on_eof() {
        let mut reader: FrameReader<_, Crc16> = FrameReader::new(Cursor::new(Vec::new()));
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof));
    }

    #[test]
    fn errors_on_eof_mid_frame() {
        let mut wire = encode_messages(&[b"partial"]);
        wire.truncate(4);
        let mut reader: FrameReader<_, Crc16> = FrameReader::new(Cursor::new(wire));
        assert!(matches!(reader.read_message(), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn applies_frame_limit() {
        let wire = encode_messages(&[&[0xAB; 32], b"small"]);
        let cfg = Config::with_max_frame_len(16);
        let mut reader = FrameReader::with_config(Cursor::new(wire), Crc16::new(), cfg).unwrap();

        assert_eq!(reader.read_message().unwrap(), b"small".to_vec());
        assert_eq!(reader.stats().overflows, 1);
    }
}
