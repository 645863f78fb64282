//! Server to client messages
//!
//! Every message is a single line. Variable values may contain anything the
//! evaluator returns, so a backslash, newline or carriage return in a value is
//! written as the two-character escape `\\`, `\n` or `\r`.
use std::borrow::Cow;
use std::fmt;

use crate::commands::{self, ParseError};

/// A message sent by the control server, one per line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Execution reached a breakpoint and is paused
    BreakHit { file: String, line: u32 },

    /// Result of a `read` request
    Variable { name: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageParseError {
    #[error("unrecognised message `{0}`")]
    Unrecognised(String),

    #[error("invalid breakpoint location")]
    Location(#[from] ParseError),
}

impl Message {
    /// Wire form of the message including the `\n` terminator
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }

    /// Parse a message line, without its trailing `\n`
    ///
    /// This is the client side of the protocol.
    pub fn parse(line: &str) -> Result<Self, MessageParseError> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(location) = line.strip_prefix("hit ") {
            let (file, line) = commands::parse_location(location)?;
            return Ok(Message::BreakHit { file, line });
        }
        if let Some(rest) = line.strip_prefix("variable ") {
            if let Some((name, value)) = rest.split_once(" = ") {
                return Ok(Message::Variable {
                    name: name.to_string(),
                    value: unescape(value),
                });
            }
        }
        Err(MessageParseError::Unrecognised(line.to_string()))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::BreakHit { file, line } => write!(f, "hit {file}:{line}"),
            Message::Variable { name, value } => {
                write!(f, "variable {name} = {}", escape(value))
            }
        }
    }
}

fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(['\\', '\n', '\r']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn unescape(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('\\') => unescaped.push('\\'),
            // unknown escapes are kept as written
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Command;

    #[test]
    fn wire_format() {
        let hit = Message::BreakHit {
            file: "a.js".to_string(),
            line: 10,
        };
        assert_eq!(hit.to_line(), "hit a.js:10\n");

        let variable = Message::Variable {
            name: "x".to_string(),
            value: "42".to_string(),
        };
        assert_eq!(variable.to_line(), "variable x = 42\n");
    }

    #[test]
    fn breakpoint_location_survives_hit_message() {
        for input in ["break a.js:10", "b dir/main.js:0", "break x:4294967295"] {
            let Ok(Command::SetBreakpoint { file, line }) = Command::parse(input) else {
                panic!("{input} did not parse as a breakpoint");
            };
            let location = input.split_once(' ').map(|(_, loc)| loc).unwrap();
            let hit = Message::BreakHit { file, line }.to_line();
            assert_eq!(hit, format!("hit {location}\n"));
        }
    }

    #[test]
    fn parse_server_lines() {
        assert_eq!(
            Message::parse("hit a.js:10"),
            Ok(Message::BreakHit {
                file: "a.js".to_string(),
                line: 10
            })
        );
        assert_eq!(
            Message::parse("variable obj = {\"a\" = 1}"),
            Ok(Message::Variable {
                name: "obj".to_string(),
                value: "{\"a\" = 1}".to_string()
            })
        );
        assert_eq!(
            Message::parse("variable x = undefined"),
            Ok(Message::Variable {
                name: "x".to_string(),
                value: "undefined".to_string()
            })
        );
    }

    #[test]
    fn reject_unknown_server_lines() {
        assert!(matches!(
            Message::parse("hello"),
            Err(MessageParseError::Unrecognised(_))
        ));
        assert!(matches!(
            Message::parse("variable x"),
            Err(MessageParseError::Unrecognised(_))
        ));
        assert!(matches!(
            Message::parse("hit a.js"),
            Err(MessageParseError::Location(_))
        ));
    }

    #[test]
    fn multi_line_values_stay_on_one_line() {
        let source = Message::Variable {
            name: "f".to_string(),
            value: "function f() {\n  return 1;\r\n}".to_string(),
        };
        let line = source.to_line();
        assert_eq!(line, "variable f = function f() {\\n  return 1;\\r\\n}\n");
        assert_eq!(line.matches('\n').count(), 1);
        assert_eq!(Message::parse(line.trim_end_matches('\n')), Ok(source));
    }

    #[test]
    fn backslashes_are_escaped() {
        let path = Message::Variable {
            name: "p".to_string(),
            value: "C:\\temp\\n".to_string(),
        };
        let line = path.to_line();
        assert_eq!(line, "variable p = C:\\\\temp\\\\n\n");
        assert_eq!(Message::parse(line.trim_end_matches('\n')), Ok(path));

        assert_eq!(
            Message::parse("variable s = a\\tb\\"),
            Ok(Message::Variable {
                name: "s".to_string(),
                value: "a\\tb\\".to_string()
            })
        );
    }
}
