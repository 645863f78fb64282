//! Byte and line channels
//!
//! A byte channel gives all-or-nothing reads and writes of a fixed number of
//! bytes over a connection. A line channel frames `\n` terminated text on top
//! of it. Both are split into independent reading and writing halves so the
//! reader can live on the network thread while the writer is shared with the
//! execution thread.

use std::io;

use eyre::Result;

use crate::io::Transport;

mod byte;
mod line;

pub use byte::{ByteReader, ByteWriter};
pub use line::{LineReader, LineWriter};

/// Check consulted by a reader whenever its transport times out
///
/// Returning `true` aborts the pending read with [`ChannelError::Cancelled`].
pub type CancelCheck = Box<dyn Fn() -> bool + Send>;

/// Errors raised by byte and line channels
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The peer closed the connection before the operation completed.
    #[error("connection closed by peer")]
    Closed,

    /// The read was abandoned because the cancel check fired.
    #[error("read cancelled")]
    Cancelled,

    /// A line passed to [`LineWriter::write_line`] did not end in `\n`.
    #[error("line is not terminated by a newline")]
    Unterminated,

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Open a line channel over a transport
///
/// Reads block until a full line arrives or the connection fails.
pub fn open<T>(transport: T) -> Result<(LineReader<T::Reader>, LineWriter<T::Writer>)>
where
    T: Transport,
{
    let (input, output) = transport.split()?;
    Ok((
        LineReader::new(ByteReader::new(input)),
        LineWriter::new(ByteWriter::new(output)),
    ))
}

/// Open a line channel whose reads can be abandoned
///
/// The `cancel` check runs every time the transport reports a read timeout,
/// so it is only effective on transports configured with one.
pub fn open_cancellable<T, F>(
    transport: T,
    cancel: F,
) -> Result<(LineReader<T::Reader>, LineWriter<T::Writer>)>
where
    T: Transport,
    F: Fn() -> bool + Send + 'static,
{
    let (input, output) = transport.split()?;
    Ok((
        LineReader::new(ByteReader::with_cancel(input, cancel)),
        LineWriter::new(ByteWriter::new(output)),
    ))
}
