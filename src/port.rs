//! Byte-level endpoints the framer writes to and the deframer polls from.

use std::collections::VecDeque;

/// Non-blocking byte source. `None` means nothing is available right now.
pub trait ByteSource {
    fn read_byte(&mut self) -> Option<u8>;
}

/// Infallible byte sink.
pub trait ByteSink {
    fn write_byte(&mut self, byte: u8);
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }
}

impl<W: ByteSink + ?Sized> ByteSink for &mut W {
    fn write_byte(&mut self, byte: u8) {
        (**self).write_byte(byte)
    }
}

impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self) -> Option<u8> {
        self.pop_front()
    }
}

impl ByteSink for Vec<u8> {
    fn write_byte(&mut self, byte: u8) {
        self.push(byte);
    }
}

/// Source backed by a closure, see [`source_fn`].
#[derive(Debug, Clone)]
pub struct SourceFn<F>(F);

/// Wrap a polling closure (a UART read register, a test script) as a source.
pub fn source_fn<F>(poll: F) -> SourceFn<F>
where
    F: FnMut() -> Option<u8>,
{
    SourceFn(poll)
}

impl<F: FnMut() -> Option<u8>> ByteSource for SourceFn<F> {
    fn read_byte(&mut self) -> Option<u8> {
        (self.0)()
    }
}

/// Sink backed by a closure, see [`sink_fn`].
#[derive(Debug, Clone)]
pub struct SinkFn<F>(F);

pub fn sink_fn<F>(write: F) -> SinkFn<F>
where
    F: FnMut(u8),
{
    SinkFn(write)
}

impl<F: FnMut(u8)> ByteSink for SinkFn<F> {
    fn write_byte(&mut self, byte: u8) {
        (self.0)(byte)
    }
}
