use std::io;

use thiserror::Error;

/// Errors surfaced at setup time and by the `std::io` adapters.
///
/// The byte-at-a-time receive path never fails: corrupt frames are dropped
/// and show up in [`crate::RxState`] and [`crate::DeframerStats`] instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("frame limit of {max} bytes cannot hold a {trailer}-byte checksum trailer")]
    FrameLimitTooSmall { max: usize, trailer: usize },
    #[error("message of {len} bytes exceeds the {max}-byte limit for one frame")]
    MessageTooLarge { len: usize, max: usize },
    #[error("stream closed before a complete frame was received")]
    UnexpectedEof,
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
