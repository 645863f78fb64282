//! In-memory transport implementation for testing

use std::io::{self, BufRead, Cursor, Read, Write};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use super::Transport;

/// How long a read waits for a chunk before reporting `WouldBlock`
const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// In-memory transport for testing
///
/// Uses channels for bidirectional communication without a network
/// connection. Reads behave like a TCP stream with a short read timeout: an
/// empty channel yields `WouldBlock`, and a dropped peer yields EOF.
///
/// # Examples
///
/// ```
/// use transport::{channel, io::InMemoryTransport};
///
/// let (client, server) = InMemoryTransport::pair();
/// let (_client_reader, mut client_writer) = channel::open(client)?;
/// let (mut server_reader, _server_writer) = channel::open(server)?;
///
/// client_writer.write_line("continue\n")?;
/// assert_eq!(server_reader.read_line()?, "continue");
/// # Ok::<(), eyre::Error>(())
/// ```
pub struct InMemoryTransport {
    reader: InMemoryReader,
    writer: InMemoryWriter,
}

/// Reader half of in-memory transport
pub struct InMemoryReader {
    buffer: Cursor<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

/// Writer half of in-memory transport
pub struct InMemoryWriter {
    tx: Sender<Vec<u8>>,
}

impl InMemoryTransport {
    /// Create a connected pair of in-memory transports
    ///
    /// Data written to one end can be read from the other.
    pub fn pair() -> (Self, Self) {
        let (client_tx, server_rx) = crossbeam_channel::unbounded();
        let (server_tx, client_rx) = crossbeam_channel::unbounded();

        let client = Self {
            reader: InMemoryReader::new(client_rx),
            writer: InMemoryWriter { tx: client_tx },
        };

        let server = Self {
            reader: InMemoryReader::new(server_rx),
            writer: InMemoryWriter { tx: server_tx },
        };

        (client, server)
    }
}

impl Transport for InMemoryTransport {
    type Reader = InMemoryReader;
    type Writer = InMemoryWriter;

    fn split(self) -> eyre::Result<(Self::Reader, Self::Writer)> {
        Ok((self.reader, self.writer))
    }
}

impl InMemoryReader {
    fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            buffer: Cursor::new(Vec::new()),
            rx,
        }
    }
}

impl BufRead for InMemoryReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        // empty chunks are skipped so they are not mistaken for EOF
        while self.buffer.position() >= self.buffer.get_ref().len() as u64 {
            match self.rx.recv_timeout(READ_TIMEOUT) {
                Ok(data) => {
                    self.buffer = Cursor::new(data);
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WouldBlock,
                        "no data available",
                    ));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Ok(&[]);
                }
            }
        }

        self.buffer.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.buffer.consume(amt)
    }
}

impl Read for InMemoryReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let len = std::cmp::min(available.len(), buf.len());
        buf[..len].copy_from_slice(&available[..len]);
        self.consume(len);
        Ok(len)
    }
}

impl Write for InMemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.tx
            .send(buf.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "channel disconnected"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
