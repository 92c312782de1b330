//! Output post-processing.
//!
//! Helpers a caller may apply to the text returned by an invocation:
//! - ANSI escape code stripping
//! - Extraction of a JSON document embedded in log noise
//!
//! # Example
//!
//! ```
//! use repl_bridge::output::{extract_json, OutputSanitizer};
//!
//! let clean = OutputSanitizer::strip_ansi(b"\x1b[31mRed text\x1b[0m");
//! assert_eq!(clean, "Red text");
//!
//! let values = extract_json("WARNING: noisy module\n{\"Name\":\"Sales\"}");
//! assert_eq!(values[0]["Name"], "Sales");
//! ```

mod json;
mod sanitizer;

pub use json::extract_json;
pub use sanitizer::OutputSanitizer;
