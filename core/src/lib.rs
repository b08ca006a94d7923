#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]
//! Shared primitives for the Qak compiler front end: source text, spans,
//! diagnostics, the AST index arena, and parser resource limits.
//!
//! This crate has no knowledge of Qak's grammar or token set; it supplies
//! the plumbing the tokenizer and parser in the `qak` crate are built on.

pub mod arena;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod source;
pub mod span;

pub use arena::{Arena, ArenaIndex};
pub use config::{LimitError, ParseConfig, RecursionGuard};
pub use diagnostic::{Diagnostic, DiagnosticSink};
pub use error::IoError;
pub use source::{Line, Source};
pub use span::Span;
