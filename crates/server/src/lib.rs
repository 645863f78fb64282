//! Debugger control server
//!
//! Accepts one client connection at a time, turns the lines it sends into
//! [`Command`](transport::Command)s and queues them for the execution thread.
mod config;
mod queue;
mod semaphore;
mod server;

pub use config::{DEFAULT_POLL_INTERVAL, ServerConfig};
pub use queue::CommandQueue;
pub use semaphore::Semaphore;
pub use server::{ControlServer, Logger};
