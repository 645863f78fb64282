use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use eyre::{Result, WrapErr};
use retry::{delay::Exponential, retry};

use crate::channel::{ByteReader, ByteWriter, LineReader, LineWriter};
use crate::io::{TcpTransport, Transport};
use crate::{Command, Message};

/// Reading half of a [`Client`]
pub type ClientReader = LineReader<Box<dyn Read + Send>>;

/// Writing half of a [`Client`]
pub type ClientWriter = LineWriter<Box<dyn Write + Send>>;

/// Blocking client for the control protocol
///
/// # Example
///
/// ```no_run
/// use transport::{Client, Command, Message};
///
/// let mut client = Client::connect("127.0.0.1:8173")?;
/// client.send(&Command::SetBreakpoint { file: "main.js".into(), line: 3 })?;
///
/// if let Message::BreakHit { file, line } = client.receive()? {
///     println!("paused at {file}:{line}");
///     client.send(&Command::Continue)?;
/// }
/// # Ok::<(), eyre::Error>(())
/// ```
pub struct Client {
    reader: ClientReader,
    writer: ClientWriter,
}

impl Client {
    /// Create a client over any transport
    pub fn with_transport<T>(transport: T) -> Result<Self>
    where
        T: Transport,
    {
        let (input, output) = transport.split()?;
        let input: Box<dyn Read + Send> = Box::new(input);
        let output: Box<dyn Write + Send> = Box::new(output);
        Ok(Self {
            reader: LineReader::new(ByteReader::new(input)),
            writer: LineWriter::new(ByteWriter::new(output)),
        })
    }

    /// Connect to a control server over TCP with automatic retry
    ///
    /// Retries with exponential backoff (200ms, 400ms, 800ms, 1600ms, 3200ms)
    /// since the server thread may not be listening yet.
    pub fn connect<A>(addr: A) -> Result<Self>
    where
        A: ToSocketAddrs + Clone,
    {
        let stream = retry(Exponential::from_millis(200).take(5), || {
            tracing::debug!("trying to make connection");
            match TcpStream::connect(addr.clone()) {
                Ok(stream) => {
                    tracing::debug!("connection made");
                    Ok(stream)
                }
                Err(e) => {
                    tracing::debug!(error = %e, "error making connection");
                    Err(e)
                }
            }
        })
        .wrap_err("failed to connect to control server")?;

        Self::with_transport(TcpTransport::new(stream))
    }

    /// Send a command in its canonical form
    pub fn send(&mut self, command: &Command) -> Result<()> {
        self.send_line(&command.to_string())
    }

    /// Send arbitrary text as a single line
    ///
    /// A `\n` terminator is appended.
    pub fn send_line(&mut self, text: &str) -> Result<()> {
        tracing::debug!(%text, "sending line");
        self.writer
            .write_line(&format!("{text}\n"))
            .wrap_err("writing line to control server")
    }

    /// Block until the next raw line arrives from the server
    pub fn read_line(&mut self) -> Result<String> {
        self.reader
            .read_line()
            .wrap_err("reading line from control server")
    }

    /// Block until the next message arrives from the server
    pub fn receive(&mut self) -> Result<Message> {
        let line = self.read_line()?;
        Message::parse(&line).wrap_err_with(|| format!("parsing server line `{line}`"))
    }

    /// Split into independent reading and writing halves
    pub fn into_split(self) -> (ClientReader, ClientWriter) {
        (self.reader, self.writer)
    }
}
