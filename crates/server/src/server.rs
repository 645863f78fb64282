use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use eyre::WrapErr;
use transport::channel::{self, LineReader};
use transport::io::shutdown_socket;
use transport::{ChannelError, Command, LineWriter, Message, TcpTransport};

use crate::{CommandQueue, ServerConfig};

/// Host callback receiving error-level diagnostics
pub type Logger = Box<dyn Fn(&str) + Send + Sync>;

type Outbound = LineWriter<TcpStream>;

struct Shared {
    config: ServerConfig,
    stopped: AtomicBool,
    queue: CommandQueue,
    current: Mutex<Option<Outbound>>,
    // never held across blocking I/O, so shutdown can always reach the socket
    connection: Mutex<Option<TcpStream>>,
    logger: Mutex<Option<Logger>>,
    local_addr: Mutex<Option<SocketAddr>>,
}

/// TCP control server for a single debugging client
///
/// The server owns the network side of the debugger: it accepts one client
/// at a time, parses the lines it sends and pushes the resulting commands on
/// to a [`CommandQueue`] for the execution thread. Outbound messages go to
/// whichever client is currently connected.
///
/// Handles are cheap to clone and all clones refer to the same server.
#[derive(Clone)]
pub struct ControlServer {
    shared: Arc<Shared>,
}

impl ControlServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                stopped: AtomicBool::new(false),
                queue: CommandQueue::new(),
                current: Mutex::new(None),
                connection: Mutex::new(None),
                logger: Mutex::new(None),
                local_addr: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.shared.config
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.shared.queue
    }

    pub fn is_running(&self) -> bool {
        !self.shared.stopped.load(Ordering::SeqCst)
    }

    /// The address the server is listening on, once bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *lock(&self.shared.local_addr)
    }

    pub fn has_client(&self) -> bool {
        lock(&self.shared.current).is_some()
    }

    /// Install a callback that receives every error-level diagnostic
    pub fn set_logger<F>(&self, logger: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        *lock(&self.shared.logger) = Some(Box::new(logger));
    }

    /// Bind and serve until [`shutdown`](Self::shutdown) is called
    ///
    /// # Errors
    ///
    /// Returns an error if the listening socket cannot be created
    pub fn run(&self) -> eyre::Result<()> {
        let listener = self.bind()?;
        self.serve(listener)
    }

    /// Prepare the server for a run and open the listening socket
    ///
    /// Clears any earlier shutdown request, so a server can be run again
    /// after it has been stopped.
    pub fn bind(&self) -> eyre::Result<TcpListener> {
        self.shared.stopped.store(false, Ordering::SeqCst);
        self.shared.queue.reopen();

        let config = &self.shared.config;
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .and_then(|listener| {
                listener.set_nonblocking(true)?;
                Ok(listener)
            })
            .map_err(|e| {
                self.log_error(&format!(
                    "failed to listen on {}:{}: {e}",
                    config.host, config.port
                ));
                e
            })
            .wrap_err_with(|| format!("binding control server to {}:{}", config.host, config.port))?;

        let addr = listener
            .local_addr()
            .wrap_err("reading control server address")?;
        *lock(&self.shared.local_addr) = Some(addr);
        tracing::info!(%addr, "control server listening");
        Ok(listener)
    }

    /// Accept and serve clients one at a time until shut down
    pub fn serve(&self, listener: TcpListener) -> eyre::Result<()> {
        let poll_interval = self.shared.config.poll_interval;
        while self.is_running() {
            match listener.accept() {
                Ok((stream, peer)) => {
                    let span = tracing::info_span!("client", %peer);
                    let _guard = span.enter();
                    tracing::info!("client connected");
                    if let Err(e) = self.handle_client(stream) {
                        self.log_error(&format!("client session failed: {e:#}"));
                    }
                    tracing::info!("client session ended");
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(poll_interval);
                }
                Err(e) => {
                    self.log_error(&format!("failed to accept connection: {e}"));
                    thread::sleep(poll_interval);
                }
            }
        }

        *lock(&self.shared.local_addr) = None;
        tracing::info!("control server stopped");
        Ok(())
    }

    /// Stop serving and release anything blocked on the command queue
    ///
    /// The live client socket is closed as well, which fails any write
    /// stuck on a client that has stopped reading.
    pub fn shutdown(&self) {
        tracing::debug!("shutting down control server");
        self.shared.stopped.store(true, Ordering::SeqCst);
        self.shared.queue.close();
        if let Some(connection) = lock(&self.shared.connection).as_ref() {
            shutdown_socket(connection);
        }
    }

    /// Send a message to the connected client
    ///
    /// Without a client the message is dropped. A failed write ends the
    /// client's session but leaves the server running.
    pub fn send(&self, message: &Message) -> eyre::Result<()> {
        let error = {
            let mut current = lock(&self.shared.current);
            let Some(writer) = current.as_mut() else {
                tracing::debug!(%message, "no client connected, dropping message");
                return Ok(());
            };
            match writer.send(message) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if let Some(writer) = current.take() {
                        shutdown_socket(writer.get_ref());
                    }
                    e
                }
            }
        };

        self.log_error(&format!("failed to send `{message}`: {error}"));
        Err(error).wrap_err("sending message to client")
    }

    fn handle_client(&self, stream: TcpStream) -> eyre::Result<()> {
        let transport = TcpTransport::with_poll_interval(stream, self.shared.config.poll_interval)?;
        let handle = transport.handle()?;

        let shared = Arc::clone(&self.shared);
        let (reader, writer) = channel::open_cancellable(transport, move || {
            shared.stopped.load(Ordering::SeqCst)
        })
        .wrap_err("opening line channel")?;

        let connection = handle.try_clone().wrap_err("cloning client socket")?;
        *lock(&self.shared.connection) = Some(connection);
        *lock(&self.shared.current) = Some(writer);
        let _session = Session {
            shared: &self.shared,
            handle,
        };

        self.read_commands(reader);
        Ok(())
    }

    fn read_commands<R: io::Read>(&self, mut reader: LineReader<R>) {
        loop {
            let line = match reader.read_line() {
                Ok(line) => line,
                Err(ChannelError::Cancelled) => {
                    tracing::debug!("read cancelled by shutdown");
                    return;
                }
                Err(ChannelError::Closed) => {
                    tracing::info!("client disconnected");
                    return;
                }
                Err(e) => {
                    self.log_error(&format!("failed to read from client: {e}"));
                    return;
                }
            };

            match Command::parse(&line) {
                Ok(Command::Stop) => {
                    tracing::info!("client requested stop");
                    return;
                }
                Ok(command) => {
                    tracing::debug!(%command, "received command");
                    self.shared.queue.push(command);
                }
                Err(e) => {
                    tracing::debug!(%line, error = %e, "ignoring invalid command");
                }
            }
        }
    }

    fn log_error(&self, message: &str) {
        tracing::error!("{message}");
        if let Some(logger) = lock(&self.shared.logger).as_ref() {
            logger(message);
        }
    }
}

/// Tears down the current client connection when a session ends
struct Session<'a> {
    shared: &'a Shared,
    handle: TcpStream,
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        // a writer blocked on a full socket holds `current` until this fails it
        shutdown_socket(&self.handle);
        lock(&self.shared.connection).take();
        lock(&self.shared.current).take();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
