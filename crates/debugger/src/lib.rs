//! Debugger for an embedding script interpreter
//!
//! The host starts a [`Debugger`], then calls [`Debugger::on_line`] before
//! executing each line. A client connected to the control server can set
//! breakpoints, read variables and resume execution.
//!
//! ```no_run
//! use debugger::{Breakpoint, Debugger};
//! use server::ServerConfig;
//!
//! let mut debugger = Debugger::start(ServerConfig::default())?;
//! debugger.add_breakpoint(Breakpoint::new("main.js", 3));
//! debugger.set_evaluator(|name: &str| (name == "x").then(|| "42".to_string()));
//!
//! for line in 1..=5 {
//!     debugger.on_line("main.js", line);
//! }
//! debugger.shutdown()?;
//! # Ok::<(), eyre::Error>(())
//! ```
mod breakpoints;
mod bridge;
mod debugger;
mod evaluator;

pub use breakpoints::{Breakpoint, Breakpoints};
pub use bridge::{Bridge, UNDEFINED};
pub use debugger::Debugger;
pub use evaluator::{Evaluator, NoEvaluator};
