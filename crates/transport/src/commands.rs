//! Client to server commands
//!
//! Grammar (the first word selects the command, case sensitive):
//!
//! ```text
//! command      := break_cmd | read_cmd | stop_cmd | continue_cmd
//! break_cmd    := ("break" | "b") SP location
//! location     := filename ":" integer
//! read_cmd     := ("read" | "r") SP identifier
//! stop_cmd     := "stop" | "s"
//! continue_cmd := "continue" | "c"
//! ```
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// A command sent by the debugger client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Pause execution whenever `file` reaches `line`
    SetBreakpoint { file: String, line: u32 },

    /// Report the current value of an expression
    ReadVariable { name: String },

    /// Release a paused execution thread
    Continue,

    /// End the current client session
    Stop,
}

/// Reasons a command line can be rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty command line")]
    Empty,

    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("`{command}` requires an argument")]
    MissingArgument { command: &'static str },

    #[error("location `{0}` is missing a `:` separator")]
    MissingSeparator(String),

    #[error("location `{0}` has no file name")]
    MissingFile(String),

    #[error("invalid line number `{value}`")]
    InvalidLine {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

impl Command {
    /// Parse a single protocol line, without its trailing `\n`
    ///
    /// Words are separated by spaces and anything after the expected
    /// arguments is ignored. A trailing `\r` from CRLF clients is dropped.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut words = line.split(' ').filter(|word| !word.is_empty());

        match words.next().ok_or(ParseError::Empty)? {
            "break" | "b" => {
                let location = words
                    .next()
                    .ok_or(ParseError::MissingArgument { command: "break" })?;
                let (file, line) = parse_location(location)?;
                Ok(Command::SetBreakpoint { file, line })
            }
            "read" | "r" => {
                let name = words
                    .next()
                    .ok_or(ParseError::MissingArgument { command: "read" })?;
                Ok(Command::ReadVariable {
                    name: name.to_string(),
                })
            }
            "continue" | "c" => Ok(Command::Continue),
            "stop" | "s" => Ok(Command::Stop),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

/// Parse a `FILE:LINE` location
///
/// The line number follows the last `:` so that file names containing a
/// colon (drive letters) still parse.
pub fn parse_location(location: &str) -> Result<(String, u32), ParseError> {
    let (file, line) = location
        .rsplit_once(':')
        .ok_or_else(|| ParseError::MissingSeparator(location.to_string()))?;
    if file.is_empty() {
        return Err(ParseError::MissingFile(location.to_string()));
    }
    let line = line.parse().map_err(|source| ParseError::InvalidLine {
        value: line.to_string(),
        source,
    })?;
    Ok((file.to_string(), line))
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetBreakpoint { file, line } => write!(f, "break {file}:{line}"),
            Command::ReadVariable { name } => write!(f, "read {name}"),
            Command::Continue => f.write_str("continue"),
            Command::Stop => f.write_str("stop"),
        }
    }
}
