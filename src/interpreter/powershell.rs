//! Windows PowerShell / PowerShell 7 dialect.

use super::Dialect;
use crate::execution::CorrelationTokens;

/// Drives `powershell` (Windows) or `pwsh` reading commands from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerShell;

impl Dialect for PowerShell {
    fn name(&self) -> &'static str {
        "powershell"
    }

    fn default_program(&self) -> String {
        if cfg!(windows) {
            "powershell".to_string()
        } else {
            "pwsh".to_string()
        }
    }

    fn default_args(&self) -> Vec<String> {
        ["-NoLogo", "-NoExit", "-Command", "-"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn init_command(&self) -> Option<String> {
        Some("[Console]::OutputEncoding=[System.Text.Encoding]::UTF8".to_string())
    }

    fn frame(&self, command: &str, tokens: &CorrelationTokens) -> String {
        // `-Command -` only runs a statement once it is complete on one line,
        // so the try/catch stays on a single line.
        format!(
            "try{{{command}}}catch{{Write-Output (\"{err}\"+($_.Exception.Message -replace '\\r?\\n',' '))}}\nWrite-Output \"{end}\"",
            err = tokens.error,
            end = tokens.end,
        )
    }
}
