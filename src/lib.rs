pub mod checksum;
pub mod codec;
pub mod config;
pub mod error;
pub mod framer;
pub mod framing;
pub mod port;

// Optional I/O helpers (require std::io)
pub mod reader;
pub mod writer;

pub use checksum::{Checksum, Crc16, Crc32};
pub use codec::{decode, encode, CodecError, DELIMITER, ESCAPE, INVERT_MASK};
pub use config::Config;
pub use error::Error;
pub use framer::Framer;
pub use framing::{Deframer, DeframerStats, MessageQueue, RxState};
pub use port::{sink_fn, source_fn, ByteSink, ByteSource};
pub use reader::FrameReader;
pub use writer::FrameWriter;
