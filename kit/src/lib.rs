#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]
//! Tokenizer, parser, and AST for the Qak language front end.
//!
//! [`Compiler`] is the entry point most callers want: it turns a file path
//! or an in-memory buffer into a [`CompiledModule`] carrying the source,
//! tokens, diagnostics, and AST together. The individual stages —
//! [`tokenizer::tokenize`] and [`parser::parse`] — are public too, for
//! callers that want to drive the pipeline by hand or inspect intermediate
//! state.

pub mod ast;
pub mod compiler;
pub mod parser;
pub mod printer;
pub mod stream;
pub mod token;
pub mod tokenizer;

pub use ast::{Ast, ExprId, Expression, Function, Module, Parameter, Statement, StmtId, TypeSpecifier, Variable, VariableAccess};
pub use compiler::{CompiledModule, Compiler};
pub use parser::{parse, parse_tokens};
pub use stream::TokenStream;
pub use token::{Token, TokenType};
pub use tokenizer::tokenize;

pub use qak_core::{Diagnostic, DiagnosticSink, IoError, ParseConfig, RecursionGuard, Source, Span};
