use std::fmt;
use std::str::FromStr;

use transport::ParseError;
use transport::commands::parse_location;

/// A source location execution should pause at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Breakpoint {
    pub file: String,
    pub line: u32,
}

impl Breakpoint {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    fn matches(&self, file: &str, line: u32) -> bool {
        self.line == line && self.file == file
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Parses `FILE:LINE`
impl FromStr for Breakpoint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (file, line) = parse_location(s)?;
        Ok(Self { file, line })
    }
}

/// Breakpoints in the order they were first added
///
/// Locations can only be added. Adding a location that is already present
/// has no effect.
#[derive(Debug, Default, Clone)]
pub struct Breakpoints {
    entries: Vec<Breakpoint>,
}

impl Breakpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a breakpoint, returning `false` if it was already set
    pub fn add(&mut self, breakpoint: Breakpoint) -> bool {
        if self.contains(&breakpoint.file, breakpoint.line) {
            return false;
        }
        self.entries.push(breakpoint);
        true
    }

    pub fn contains(&self, file: &str, line: u32) -> bool {
        self.entries.iter().any(|b| b.matches(file, line))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<Breakpoint> for Breakpoints {
    fn extend<I: IntoIterator<Item = Breakpoint>>(&mut self, iter: I) {
        for breakpoint in iter {
            self.add(breakpoint);
        }
    }
}

impl FromIterator<Breakpoint> for Breakpoints {
    fn from_iter<I: IntoIterator<Item = Breakpoint>>(iter: I) -> Self {
        let mut breakpoints = Self::new();
        breakpoints.extend(iter);
        breakpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_breakpoint() {
        let breakpoint: Breakpoint = "src/app.js:12".parse().unwrap();
        assert_eq!(breakpoint, Breakpoint::new("src/app.js", 12));
        assert_eq!(breakpoint.to_string(), "src/app.js:12");

        assert!("app.js".parse::<Breakpoint>().is_err());
        assert!("app.js:x".parse::<Breakpoint>().is_err());
    }

    #[test]
    fn membership_is_exact() {
        let breakpoints: Breakpoints = [Breakpoint::new("a.js", 10)].into_iter().collect();

        assert!(breakpoints.contains("a.js", 10));
        assert!(!breakpoints.contains("a.js", 11));
        assert!(!breakpoints.contains("b.js", 10));
        assert!(!breakpoints.contains("A.js", 10));
    }

    #[test]
    fn duplicates_are_ignored_and_order_kept() {
        let mut breakpoints = Breakpoints::new();
        assert!(breakpoints.add(Breakpoint::new("b.js", 2)));
        assert!(breakpoints.add(Breakpoint::new("a.js", 1)));
        assert!(!breakpoints.add(Breakpoint::new("b.js", 2)));

        let listed: Vec<String> = breakpoints.iter().map(ToString::to_string).collect();
        assert_eq!(listed, ["b.js:2", "a.js:1"]);
        assert_eq!(breakpoints.len(), 2);
    }
}
