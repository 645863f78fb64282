//! TCP-based transport implementation

use std::io::BufReader;
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use eyre::{Context, Result};

use super::Transport;

/// TCP-based transport
///
/// Wraps a [`TcpStream`]. The server side configures a read timeout with
/// [`TcpTransport::with_poll_interval`] so that its read loop can notice a
/// shutdown request while a client sits idle; clients created with
/// [`TcpTransport::new`] block until data arrives.
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Create a blocking transport from an existing stream
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    /// Create a transport whose reads time out after `interval`
    ///
    /// The stream is switched back to blocking mode first, since accepted
    /// sockets inherit the listener's non-blocking flag on some platforms.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket options cannot be set
    pub fn with_poll_interval(stream: TcpStream, interval: Duration) -> Result<Self> {
        stream
            .set_nonblocking(false)
            .context("setting TCP stream to blocking mode")?;
        stream
            .set_read_timeout(Some(interval))
            .context("setting read timeout on TCP stream")?;
        Ok(Self { stream })
    }

    /// Connect to a control server at the given address
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use transport::io::TcpTransport;
    ///
    /// let transport = TcpTransport::connect("127.0.0.1:8173")?;
    /// # Ok::<(), eyre::Error>(())
    /// ```
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).context("connecting to control server")?;
        Ok(Self::new(stream))
    }

    /// Clone the underlying socket handle
    ///
    /// The clone can be used to shut the connection down while the reader and
    /// writer halves are owned elsewhere.
    pub fn handle(&self) -> Result<TcpStream> {
        self.stream.try_clone().context("cloning TCP stream handle")
    }
}

impl Transport for TcpTransport {
    type Reader = BufReader<TcpStream>;
    type Writer = TcpStream;

    fn split(self) -> Result<(Self::Reader, Self::Writer)> {
        let input = self
            .stream
            .try_clone()
            .context("cloning TCP stream for reader")?;
        Ok((BufReader::new(input), self.stream))
    }
}

/// Close both directions of a socket, ignoring sockets that are already gone
pub fn shutdown_socket(stream: &TcpStream) {
    if let Err(e) = stream.shutdown(Shutdown::Both) {
        tracing::trace!(error = %e, "socket already closed");
    }
}
