#![cfg_attr(test, allow(unused_crate_dependencies))]
// The parser runs on every keystroke inside editor hosts - diagnostics go through tracing
#![deny(clippy::print_stderr)]

//! Grammar-driven line parsing.
//!
//! [`parse_block`] classifies one line of text into contiguous [`Span`]s,
//! starting from the [`LineState`] the previous line ended in and returning
//! the state the next line starts in. It is pure and total: any text and any
//! state produced by an earlier call yield a result, and identical inputs
//! yield identical outputs.
//!
//! # Architecture
//!
//! * [`state`]: the context stack carried between lines
//! * [`span`]: parse output plus the code/comment/string predicates
//! * `matcher`: per-position rule matching with a per-line regex memo
//! * [`parser`]: the line loop, zero-width guards and line-end handling

mod matcher;
pub mod parser;
pub mod span;
pub mod state;

pub use parser::{ParseLimits, parse_block, parse_block_with};
pub use span::{ParsedLine, Span, TextKind, is_block_comment, is_code, is_comment, is_here_doc, is_string};
pub use state::{Captures, Frame, LineState};
