//! POSIX `sh` dialect.
//!
//! The shell has no exception mechanism; a non-zero exit status of the
//! command group is the trapped error, reported with the status code.

use super::Dialect;
use crate::execution::CorrelationTokens;

/// Drives `/bin/sh -s`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Posix;

impl Dialect for Posix {
    fn name(&self) -> &'static str {
        "posix"
    }

    fn default_program(&self) -> String {
        "/bin/sh".to_string()
    }

    fn default_args(&self) -> Vec<String> {
        vec!["-s".to_string()]
    }

    fn init_command(&self) -> Option<String> {
        Some("export LC_ALL=C.UTF-8".to_string())
    }

    fn frame(&self, command: &str, tokens: &CorrelationTokens) -> String {
        // The leading `:` keeps an empty command a valid group; the newline
        // before `}` lets the command end in a comment or `&`.
        format!(
            "{{ :; {command}\n}}; __rb_status=$?; \
             if [ \"$__rb_status\" -ne 0 ]; then printf '%s%s\\n' '{err}' \"command exited with status $__rb_status\"; fi; \
             printf '%s\\n' '{end}'",
            err = tokens.error,
            end = tokens.end,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> CorrelationTokens {
        CorrelationTokens {
            end: "##RB-END-2##".into(),
            error: "##RB-ERR-2##".into(),
        }
    }

    #[test]
    fn test_frame_groups_command() {
        let wire = Posix.frame("echo hello", &tokens());
        assert!(wire.starts_with("{ :; echo hello\n}"));
        assert!(wire.contains("printf '%s%s\\n' '##RB-ERR-2##'"));
        assert!(wire.ends_with("printf '%s\\n' '##RB-END-2##'"));
    }

    #[test]
    fn test_end_marker_after_status_check() {
        let wire = Posix.frame("false", &tokens());
        let status = wire.find("__rb_status=$?").unwrap();
        let end = wire.find("##RB-END-2##").unwrap();
        assert!(status < end);
    }

    #[test]
    fn test_invocation() {
        assert_eq!(Posix.default_program(), "/bin/sh");
        assert_eq!(Posix.default_args(), vec!["-s"]);
    }
}
