//! IO abstraction layer for the control protocol
//!
//! The [`Transport`] trait lets the line channels run over different
//! connection types: TCP sockets for real clients and in-memory channels for
//! tests.
//!
//! # Examples
//!
//! ```no_run
//! use transport::{channel, io::TcpTransport};
//!
//! let transport = TcpTransport::connect("127.0.0.1:8173")?;
//! let (mut reader, mut writer) = channel::open(transport)?;
//! writer.write_line("break main.js:3\n")?;
//! let hit = reader.read_line()?;
//! # Ok::<(), eyre::Error>(())
//! ```

use std::io::{BufRead, Write};

mod memory;
mod tcp;

pub use memory::InMemoryTransport;
pub use tcp::{TcpTransport, shutdown_socket};

/// Trait for a bidirectional line protocol connection
///
/// The transport is split into a reader and a writer so that the reader can
/// be moved onto the network thread while the writer is handed to whoever
/// sends outbound messages.
///
/// Readers may be configured with a timeout, in which case they return
/// `WouldBlock` or `TimedOut` when no data arrives in time. The byte channel
/// treats those as a chance to check for cancellation and then retries.
pub trait Transport: Send + 'static {
    /// The reader type
    type Reader: BufRead + Send + 'static;

    /// The writer type
    type Writer: Write + Send + 'static;

    /// Split the transport into separate reader and writer halves
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be split (e.g. socket cloning
    /// fails)
    fn split(self) -> eyre::Result<(Self::Reader, Self::Writer)>;
}
