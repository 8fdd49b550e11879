//! Frame writer that wraps any `std::io::Write` sink.

use std::io::Write;

use crate::checksum::Checksum;
use crate::config::Config;
use crate::error::Error;
use crate::framer::Framer;

/// Wraps a `Write` sink and sends one frame per message.
///
/// Each frame is assembled in an internal buffer and handed to the sink with
/// a single `write_all`, so a frame is never interleaved with other writes
/// made through this writer.
///
/// # Example
///
/// ```no_run
/// use std::fs::OpenOptions;
/// use hdlcframe::{Crc16, FrameWriter};
///
/// let port = OpenOptions::new().write(true).open("/dev/ttyUSB0").unwrap();
/// let mut writer: FrameWriter<_, Crc16> = FrameWriter::new(port);
///
/// writer.write_message(b"hello").unwrap();
/// writer.flush().unwrap();
/// ```
pub struct FrameWriter<W, C> {
    writer: W,
    framer: Framer<Vec<u8>, C>,
    config: Config,
}

impl<W: Write, C: Checksum + Default> FrameWriter<W, C> {
    pub fn new(writer: W) -> Self {
        Self::with_capacity(writer, 1024)
    }

    /// Create a writer with a specific encode buffer capacity.
    pub fn with_capacity(writer: W, capacity: usize) -> Self {
        Self {
            writer,
            framer: Framer::new(Vec::with_capacity(capacity)),
            config: Config::default(),
        }
    }
}

impl<W: Write, C: Checksum> FrameWriter<W, C> {
    /// Create a writer that refuses messages the peer's deframer would drop.
    pub fn with_config(writer: W, checksum: C, config: Config) -> Result<Self, Error> {
        config.validate(checksum.size())?;
        Ok(Self {
            writer,
            framer: Framer::with_checksum(Vec::with_capacity(1024), checksum),
            config,
        })
    }

    /// Frame `message` and write it to the underlying sink.
    ///
    /// # Errors
    ///
    /// - [`Error::MessageTooLarge`] if a frame limit is configured and the
    ///   message plus trailer exceeds it; nothing is written.
    /// - [`Error::Io`] if the underlying write fails.
    pub fn write_message(&mut self, message: &[u8]) -> Result<(), Error> {
        let trailer = self.framer.checksum().size();
        if let Some(max) = self.config.max_message_len(trailer) {
            if message.len() > max {
                return Err(Error::MessageTooLarge {
                    len: message.len(),
                    max,
                });
            }
        }

        self.framer.sink_mut().clear();
        self.framer.transmit_frame(message);
        self.writer.write_all(self.framer.sink())?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::{Crc16, Crc32};
    use crate::codec;

    #[test]
    fn writes_single_frame() {
        let mut buf = Vec::new();
        let mut writer: FrameWriter<_, Crc16> = FrameWriter::new(&mut buf);

        writer.write_message(&[0x00]).unwrap();
        writer.flush().unwrap();

        assert_eq!(buf, vec![0x7E, 0x00, 0x78, 0xF0, 0x7E]);
    }

    #[test]
    fn writes_multiple_frames() {
        let mut buf = Vec::new();
        let mut writer: FrameWriter<_, Crc32> = FrameWriter::new(&mut buf);

        let messages: [&[u8]; 3] = [b"one", b"", b"~}~}"];
        for message in &messages {
            writer.write_message(message).unwrap();
        }

        let mut expected = Vec::new();
        for message in &messages {
            codec::encode::<Crc32>(message, &mut expected);
        }
        assert_eq!(buf, expected);
    }

    #[test]
    fn rejects_oversized_message() {
        let mut buf = Vec::new();
        let cfg = Config::with_max_frame_len(10);
        let mut writer = FrameWriter::with_config(&mut buf, Crc16::new(), cfg).unwrap();

        writer.write_message(&[0u8; 8]).unwrap();
        let err = writer.write_message(&[0u8; 9]).unwrap_err();
        assert!(matches!(err, Error::MessageTooLarge { len: 9, max: 8 }));

        drop(writer);
        assert_eq!(codec::decode::<Crc16>(&buf).unwrap(), vec![0u8; 8]);
    }

    #[test]
    fn surfaces_io_errors() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer: FrameWriter<_, Crc16> = FrameWriter::new(Broken);
        let err = writer.write_message(b"x").unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::BrokenPipe));
    }
}
