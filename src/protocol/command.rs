//! Inbound viewer commands
//!
//! Viewers send newline-terminated ASCII lines. Unrecognized lines parse to
//! `None` and are ignored by the session reader, leaving room for future
//! commands (input control, quality hints) without breaking old servers.

/// A command received from a viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Viewer asks to terminate its session
    Disconnect,
}

impl Command {
    /// Parse a single line, without its terminating newline
    ///
    /// Trailing whitespace (including a `\r` from CRLF clients) is ignored.
    pub fn parse(line: &str) -> Option<Command> {
        match line.trim_end() {
            "DISCONNECT" => Some(Command::Disconnect),
            _ => None,
        }
    }

    /// Wire token for this command
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Disconnect => "DISCONNECT",
        }
    }
}
