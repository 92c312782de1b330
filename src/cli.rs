//! Command-line interface for repl-bridge.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::interpreter::DialectKind;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Interpreter dialect.
    pub dialect: Option<DialectKind>,
    /// Interpreter program override.
    pub program: Option<String>,
    /// Per-command timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Commands to run, in order.
    pub exec: Vec<String>,
    /// Print each result as one JSON line.
    pub json: bool,
    /// Strip terminal escape sequences from output.
    pub strip_ansi: bool,
    /// Serve the HTTP API instead of running commands.
    pub serve: bool,
    /// Host address to bind to.
    pub host: Option<IpAddr>,
    /// Port to listen on.
    pub port: Option<u16>,
    /// API key for authentication (overrides config file).
    pub api_key: Option<String>,
    /// Disable authentication.
    pub no_auth: bool,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('d') | Long("dialect") => {
                let value: String = parser.value()?.parse()?;
                result.dialect = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("dialect", value))?,
                );
            }
            Short('P') | Long("program") => {
                result.program = Some(parser.value()?.parse()?);
            }
            Short('t') | Long("timeout") => {
                let value: String = parser.value()?.parse()?;
                let secs: u64 = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidValue("timeout", value.clone()))?;
                if secs == 0 {
                    return Err(ArgsError::InvalidValue("timeout", value));
                }
                result.timeout_secs = Some(secs);
            }
            Short('e') | Long("exec") => {
                result.exec.push(parser.value()?.parse()?);
            }
            Long("json") => {
                result.json = true;
            }
            Long("strip-ansi") => {
                result.strip_ansi = true;
            }
            Long("serve") => {
                result.serve = true;
            }
            Short('H') | Long("host") => {
                let value: String = parser.value()?.parse()?;
                result.host = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("host", value))?,
                );
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("port", value))?,
                );
            }
            Short('k') | Long("api-key") => {
                result.api_key = Some(parser.value()?.parse()?);
            }
            Long("no-auth") => {
                result.no_auth = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    if result.serve && !result.exec.is_empty() {
        return Err(ArgsError::Conflict("--serve", "--exec"));
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"repl-bridge {version}
Run commands against a long-lived interactive interpreter

USAGE:
    repl-bridge [OPTIONS]

Without --exec or --serve, commands are read from stdin, one per line.

OPTIONS:
    -d, --dialect <NAME>    Interpreter dialect: powershell, posix [default: powershell]
    -P, --program <PATH>    Interpreter executable (overrides the dialect default)
    -t, --timeout <SECS>    Per-command timeout [default: 120]
    -e, --exec <CMD>        Command to run (repeatable)
        --json              Print each result as a JSON line
        --strip-ansi        Remove terminal escape sequences from output
        --serve             Serve the HTTP API
    -H, --host <ADDR>       Host address to bind [default: 127.0.0.1]
    -p, --port <PORT>       Port to listen on [default: 3030]
    -k, --api-key <KEY>     API key for authentication
        --no-auth           Disable authentication
    -c, --config <FILE>     Path to configuration file (JSON)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    REPL_BRIDGE_DIALECT     Dialect (overrides config)
    REPL_BRIDGE_PROGRAM     Interpreter executable (overrides config)
    REPL_BRIDGE_TIMEOUT     Per-command timeout in seconds (overrides config)
    REPL_BRIDGE_HOST        Host address (overrides config)
    REPL_BRIDGE_PORT        Port number (overrides config)
    REPL_BRIDGE_API_KEY     API key (overrides config)
    REPL_BRIDGE_LOG_LEVEL   Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Query PowerShell and print JSON results
    repl-bridge --json -e 'Get-Date -Format o' -e 'Get-Process | Select -First 3 Name | ConvertTo-Json'

    # Drive /bin/sh from a script file
    repl-bridge -d posix -t 10 < commands.txt

    # Serve a PowerShell session over HTTP with an API key
    repl-bridge --serve -p 8080 -k my-secret-key
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("repl-bridge {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
    /// Two mutually exclusive options were given.
    Conflict(&'static str, &'static str),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
            Self::Conflict(a, b) => write!(f, "{} cannot be combined with {}", a, b),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<OsString> {
        std::iter::once("repl-bridge")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_default_args() {
        let result = parse_args_from(args(&[])).unwrap();
        assert!(result.dialect.is_none());
        assert!(result.exec.is_empty());
        assert!(!result.serve);
        assert!(!result.json);
    }

    #[test]
    fn test_dialect() {
        let result = parse_args_from(args(&["-d", "posix"])).unwrap();
        assert_eq!(result.dialect, Some(DialectKind::Posix));

        let result = parse_args_from(args(&["--dialect", "pwsh"])).unwrap();
        assert_eq!(result.dialect, Some(DialectKind::PowerShell));
    }

    #[test]
    fn test_unknown_dialect() {
        assert!(parse_args_from(args(&["-d", "cmd"])).is_err());
    }

    #[test]
    fn test_exec_repeatable_in_order() {
        let result = parse_args_from(args(&["-e", "first", "--exec", "second"])).unwrap();
        assert_eq!(result.exec, vec!["first", "second"]);
    }

    #[test]
    fn test_timeout() {
        let result = parse_args_from(args(&["-t", "45"])).unwrap();
        assert_eq!(result.timeout_secs, Some(45));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(parse_args_from(args(&["-t", "0"])).is_err());
        assert!(parse_args_from(args(&["-t", "soon"])).is_err());
    }

    #[test]
    fn test_serve_options() {
        let result =
            parse_args_from(args(&["--serve", "-H", "0.0.0.0", "-p", "8080", "-k", "s3cret"]))
                .unwrap();
        assert!(result.serve);
        assert_eq!(result.host.unwrap().to_string(), "0.0.0.0");
        assert_eq!(result.port, Some(8080));
        assert_eq!(result.api_key, Some("s3cret".to_string()));
    }

    #[test]
    fn test_serve_conflicts_with_exec() {
        let err = parse_args_from(args(&["--serve", "-e", "ls"])).unwrap_err();
        assert!(err.to_string().contains("--serve"));
    }

    #[test]
    fn test_program_and_flags() {
        let result = parse_args_from(args(&[
            "-P",
            "/usr/bin/pwsh",
            "--json",
            "--strip-ansi",
            "--no-auth",
        ]))
        .unwrap();
        assert_eq!(result.program.as_deref(), Some("/usr/bin/pwsh"));
        assert!(result.json);
        assert!(result.strip_ansi);
        assert!(result.no_auth);
    }

    #[test]
    fn test_help_and_version() {
        assert!(parse_args_from(args(&["-h"])).unwrap().help);
        assert!(parse_args_from(args(&["--version"])).unwrap().version);
    }

    #[test]
    fn test_positional_rejected() {
        let err = parse_args_from(args(&["echo"])).unwrap_err();
        assert!(matches!(err, ArgsError::UnexpectedArgument(_)));
    }

    #[test]
    fn test_invalid_port() {
        assert!(parse_args_from(args(&["-p", "invalid"])).is_err());
    }
}
