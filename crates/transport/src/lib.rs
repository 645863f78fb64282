//! Debugger control transport
//!
//! This crate contains the pieces needed to speak the debugger control line
//! protocol: byte and line channels over a [`Transport`], the client command
//! grammar and the server message codec.
pub mod bindings;
pub mod channel;
mod client;
pub mod commands;
pub mod io;
pub mod messages;

pub use channel::{ChannelError, LineReader, LineWriter};
pub use client::{Client, ClientReader, ClientWriter};
pub use commands::{Command, ParseError};
pub use io::{InMemoryTransport, TcpTransport, Transport};
pub use messages::Message;

/// The default port the control server listens on
pub const DEFAULT_PORT: u16 = 8173;

/// The default address the control server binds to
pub const DEFAULT_HOST: &str = "0.0.0.0";
