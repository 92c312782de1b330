//! Interpreter dialects.
//!
//! The session transports command text verbatim, but the frame wrapped
//! around it must be written in the interpreter's own language: its
//! error-trapping construct reports failures in-band, and an
//! unconditional print emits the end marker. A [`Dialect`] captures that
//! knowledge for one interpreter family.

mod posix;
mod powershell;

pub use posix::Posix;
pub use powershell::PowerShell;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::execution::CorrelationTokens;

/// Interpreter-specific knowledge needed to drive a REPL process.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Stable identifier of this dialect.
    fn name(&self) -> &'static str;

    /// Program launched when the session config does not override it.
    fn default_program(&self) -> String;

    /// Arguments selecting an interactive, non-exiting, stdin-driven mode.
    fn default_args(&self) -> Vec<String>;

    /// Command issued right after spawning to pin the output encoding to UTF-8.
    fn init_command(&self) -> Option<String>;

    /// Instruction asking the interpreter to quit.
    fn exit_command(&self) -> &'static str {
        "exit"
    }

    /// Wrap `command` so that trapped errors print `tokens.error` followed by
    /// the message on one line, and `tokens.end` is printed unconditionally.
    fn frame(&self, command: &str, tokens: &CorrelationTokens) -> String;
}

/// Selector for the built-in dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    PowerShell,
    Posix,
}

impl DialectKind {
    /// Instantiate the dialect.
    pub fn build(self) -> Arc<dyn Dialect> {
        match self {
            DialectKind::PowerShell => Arc::new(PowerShell),
            DialectKind::Posix => Arc::new(Posix),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DialectKind::PowerShell => "powershell",
            DialectKind::Posix => "posix",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "powershell" | "pwsh" | "ps" => Ok(DialectKind::PowerShell),
            "posix" | "sh" | "bash" => Ok(DialectKind::Posix),
            other => Err(format!("unknown dialect: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("pwsh".parse::<DialectKind>(), Ok(DialectKind::PowerShell));
        assert_eq!("PowerShell".parse::<DialectKind>(), Ok(DialectKind::PowerShell));
        assert_eq!("sh".parse::<DialectKind>(), Ok(DialectKind::Posix));
        assert!("cmd".parse::<DialectKind>().is_err());
    }

    #[test]
    fn test_build_matches_name() {
        assert_eq!(DialectKind::PowerShell.build().name(), "powershell");
        assert_eq!(DialectKind::Posix.build().name(), "posix");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&DialectKind::Posix).unwrap();
        assert_eq!(json, "\"posix\"");
        let kind: DialectKind = serde_json::from_str("\"powershell\"").unwrap();
        assert_eq!(kind, DialectKind::PowerShell);
    }

    #[test]
    fn test_default_exit_command() {
        assert_eq!(Posix.exit_command(), "exit");
        assert_eq!(PowerShell.exit_command(), "exit");
    }
}
