//! The safe, embedding-facing API: construct a [`Compiler`], feed it a file
//! or an in-memory buffer, and get back a self-contained [`CompiledModule`]
//! that owns its `Source`, token vector, diagnostics, and AST together.
//!
//! This supersedes the handle-based C API a native front end would expose:
//! there is no explicit destroy call, `Compiler` and `CompiledModule` clean
//! up via ordinary `Drop`, and dropping a `Compiler` never invalidates a
//! `CompiledModule` it already produced because the two share no state.

use std::path::Path;

use qak_core::{Diagnostic, DiagnosticSink, IoError, ParseConfig, Source};

use crate::ast::Ast;
use crate::parser::parse_tokens;
use crate::printer::{print_ast, print_tokens};
use crate::token::Token;
use crate::tokenizer::tokenize;

/// Owns the resource limits applied to every compile this instance runs.
/// Stateless otherwise: nothing it produces keeps a reference back to it.
#[derive(Debug, Clone, Copy)]
pub struct Compiler {
    config: ParseConfig,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            config: ParseConfig::default(),
        }
    }

    pub fn with_config(config: ParseConfig) -> Self {
        Self { config }
    }

    /// Reads `path` and compiles its contents. The file name recorded on the
    /// resulting `Source` is the path as given, not canonicalised.
    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<CompiledModule, IoError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| IoError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.compile_source(path.display().to_string(), bytes))
    }

    pub fn compile_source(&self, file_name: impl Into<String>, bytes: impl Into<Box<[u8]>>) -> CompiledModule {
        let file_name = file_name.into();
        let span = tracing::info_span!("compile", file = %file_name);
        let _entered = span.enter();

        let source = Source::new(file_name, bytes);
        let mut diagnostics = DiagnosticSink::new();
        let tokens = tokenize(&source, &mut diagnostics);
        tracing::debug!(tokens = tokens.len(), "tokenize finished");

        let ast = if diagnostics.has_errors() {
            None
        } else {
            parse_tokens(&source, &tokens, self.config, &mut diagnostics)
        };
        tracing::debug!(errors = diagnostics.len(), ast_produced = ast.is_some(), "parse finished");

        CompiledModule {
            source,
            tokens,
            diagnostics,
            ast,
        }
    }
}

/// A single compiled source file: its `Source`, token vector, diagnostics,
/// and AST (if parsing succeeded), all with the same lifetime — dropping a
/// `CompiledModule` frees all four together.
pub struct CompiledModule {
    source: Source,
    tokens: Vec<Token>,
    diagnostics: DiagnosticSink,
    ast: Option<Ast>,
}

impl CompiledModule {
    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn errors(&self) -> &[Diagnostic] {
        self.diagnostics.as_slice()
    }

    /// Renders every diagnostic as `Error (<file>:<line>): <message>`
    /// followed by the offending source line and a caret row underneath it.
    pub fn render_errors(&self) -> String {
        self.diagnostics.render(&self.source)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn ast(&self) -> Option<&Ast> {
        self.ast.as_ref()
    }

    pub fn print_tokens(&self) {
        print!("{}", print_tokens(&self.source, &self.tokens));
    }

    pub fn print_errors(&self) {
        print!("{}", self.diagnostics.render(&self.source));
    }

    pub fn print_ast(&self) {
        match &self.ast {
            Some(ast) => print!("{}", print_ast(&self.source, ast)),
            None => println!("<no ast: compilation failed>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_source_succeeds_for_a_valid_module() {
        let compiler = Compiler::new();
        let module = compiler.compile_source("<memory>", b"module m var x = 1".to_vec());
        assert!(module.errors().is_empty());
        assert!(module.ast().is_some());
        assert!(!module.tokens().is_empty());
    }

    #[test]
    fn compile_source_collects_diagnostics_without_panicking() {
        let compiler = Compiler::new();
        let module = compiler.compile_source("<memory>", b"123".to_vec());
        assert!(module.ast().is_none());
        assert_eq!(module.errors().len(), 1);
    }

    #[test]
    fn compile_file_reports_io_error_for_missing_path() {
        let compiler = Compiler::new();
        let result = compiler.compile_file("/nonexistent/path/does/not/exist.qak");
        assert!(result.is_err());
    }

    #[test]
    fn dropping_the_compiler_does_not_invalidate_a_previously_compiled_module() {
        let compiler = Compiler::new();
        let module = compiler.compile_source("<memory>", b"module m".to_vec());
        drop(compiler);
        assert!(module.ast().is_some());
    }
}
