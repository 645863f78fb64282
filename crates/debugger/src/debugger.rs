use std::net::SocketAddr;
use std::thread::{self, JoinHandle};

use eyre::WrapErr;
use server::{ControlServer, ServerConfig};

use crate::{Breakpoint, Breakpoints, Bridge, Evaluator};

/// A running debugging session
///
/// Owns the network thread serving the control protocol and the [`Bridge`]
/// the host drives from its execution thread. Dropping the debugger stops
/// the server and waits for the network thread to finish.
pub struct Debugger {
    bridge: Bridge,
    network: Option<JoinHandle<eyre::Result<()>>>,
}

impl Debugger {
    /// Start listening for a client
    ///
    /// The socket is bound before this returns, so clients may connect as
    /// soon as it succeeds.
    #[tracing::instrument]
    pub fn start(config: ServerConfig) -> eyre::Result<Self> {
        let server = ControlServer::new(config);
        let listener = server.bind().wrap_err("starting control server")?;

        let network = {
            let server = server.clone();
            thread::Builder::new()
                .name("debug-server".to_string())
                .spawn(move || server.serve(listener))
                .wrap_err("spawning control server thread")?
        };

        Ok(Self {
            bridge: Bridge::new(server),
            network: Some(network),
        })
    }

    /// See [`Bridge::on_line`]
    pub fn on_line(&mut self, file: &str, line: u32) {
        self.bridge.on_line(file, line);
    }

    pub fn set_evaluator<E>(&mut self, evaluator: E)
    where
        E: Evaluator + 'static,
    {
        self.bridge.set_evaluator(evaluator);
    }

    pub fn set_logger<F>(&self, logger: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.bridge.server().set_logger(logger);
    }

    pub fn add_breakpoint(&mut self, breakpoint: Breakpoint) -> bool {
        self.bridge.add_breakpoint(breakpoint)
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        self.bridge.breakpoints()
    }

    /// A handle to the control server, usable from other threads
    ///
    /// Calling [`ControlServer::shutdown`] on it releases a blocked
    /// [`on_line`](Self::on_line).
    pub fn server(&self) -> ControlServer {
        self.bridge.server().clone()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.bridge.server().local_addr()
    }

    /// Stop the server and wait for the network thread
    pub fn shutdown(mut self) -> eyre::Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> eyre::Result<()> {
        self.bridge.server().shutdown();
        let Some(network) = self.network.take() else {
            return Ok(());
        };
        network
            .join()
            .map_err(|_| eyre::eyre!("control server thread panicked"))?
    }
}

impl Drop for Debugger {
    fn drop(&mut self) {
        // already stopped by `shutdown`
        if self.network.is_none() {
            return;
        }
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "error stopping debugger");
        }
    }
}
