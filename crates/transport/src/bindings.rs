use std::net::TcpListener;

use eyre::{Context, Result};

/// Find a local TCP port that is currently free
///
/// The port is released again before returning, so another process may grab
/// it first; callers connect with retries.
pub fn get_random_tcp_port() -> Result<u16> {
    for _ in 0..50 {
        match TcpListener::bind("127.0.0.1:0") {
            Ok(listener) => {
                let addr = listener.local_addr().context("reading bound address")?;
                return Ok(addr.port());
            }
            Err(e) => {
                tracing::warn!(%e, "binding");
            }
        }
    }

    eyre::bail!("could not get free port");
}
