use std::io::{Read, Write};

use super::{ByteReader, ByteWriter, ChannelError};
use crate::messages::Message;

/// Reads `\n` terminated lines from a byte channel
pub struct LineReader<R> {
    bytes: ByteReader<R>,
}

impl<R> LineReader<R>
where
    R: Read,
{
    pub fn new(bytes: ByteReader<R>) -> Self {
        Self { bytes }
    }

    /// Read the next line, without its terminator
    ///
    /// If the channel fails part way through a line the partial line is
    /// dropped and the error returned.
    pub fn read_line(&mut self) -> Result<String, ChannelError> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            self.bytes.read_exact(&mut byte)?;
            if byte[0] == b'\n' {
                break;
            }
            line.push(byte[0]);
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    }
}

/// Writes `\n` terminated lines to a byte channel
pub struct LineWriter<W> {
    bytes: ByteWriter<W>,
}

impl<W> LineWriter<W>
where
    W: Write,
{
    pub fn new(bytes: ByteWriter<W>) -> Self {
        Self { bytes }
    }

    pub fn get_ref(&self) -> &W {
        self.bytes.get_ref()
    }

    /// Write a single line
    ///
    /// `line` must already end in `\n`; anything else is rejected with
    /// [`ChannelError::Unterminated`] before any bytes are written.
    pub fn write_line(&mut self, line: &str) -> Result<(), ChannelError> {
        if !line.ends_with('\n') {
            return Err(ChannelError::Unterminated);
        }
        self.bytes.write_exact(line.as_bytes())
    }

    /// Serialise and write a server message
    pub fn send(&mut self, message: &Message) -> Result<(), ChannelError> {
        tracing::debug!(%message, "sending message");
        self.write_line(&message.to_line())
    }
}
