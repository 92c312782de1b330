//! Interpreter session management.
//!
//! A [`Session`] owns one child interpreter, a background writer feeding
//! its input pipe, and a background reader that turns the merged output
//! stream into a FIFO of lines. The queue is consumed through an [`OutputLease`], of which at
//! most one exists at a time.

mod process;
mod queue;
mod reader;
mod state;
mod writer;

pub use process::{Session, SessionConfig};
pub use queue::{NextLine, OutputLease};
pub use reader::LineReader;
pub use state::SessionState;
pub use writer::Delivery;
