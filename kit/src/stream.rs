//! A read cursor over a token vector, with the peek/match/expect primitives
//! the parser is built on.

use qak_core::{DiagnosticSink, Source, Span};

use crate::token::{Token, TokenType};

/// Walks a token vector front-to-back. Never panics: every accessor past
/// the end of the stream synthesises a span from the source's last line,
/// matching how `expect`/`expectText` report end-of-input errors.
pub struct TokenStream<'t> {
    tokens: &'t [Token],
    index: usize,
}

impl<'t> TokenStream<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn has_more(&self) -> bool {
        self.index < self.tokens.len()
    }

    pub fn peek(&self) -> Option<Token> {
        self.tokens.get(self.index).copied()
    }

    pub fn consume(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    /// True iff the current token's type equals `token_type`. Advances past
    /// it when `consume` is set and it matched.
    pub fn match_type(&mut self, token_type: TokenType, consume: bool) -> bool {
        match self.peek() {
            Some(token) if token.token_type == token_type => {
                if consume {
                    self.index += 1;
                }
                true
            }
            _ => false,
        }
    }

    /// True iff the current token's span text equals `text` byte-for-byte.
    /// Used for contextual keywords, which are ordinary `Identifier` tokens
    /// distinguished only by spelling.
    pub fn match_text(&mut self, source: &Source, text: &str, consume: bool) -> bool {
        match self.peek() {
            Some(token) if source.text(token.span) == text => {
                if consume {
                    self.index += 1;
                }
                true
            }
            _ => false,
        }
    }

    /// Like `match_type(type, true)`, but records a diagnostic and returns
    /// `None` on mismatch instead of leaving the cursor untouched.
    pub fn expect(
        &mut self,
        token_type: TokenType,
        source: &Source,
        diagnostics: &mut DiagnosticSink,
    ) -> Option<Token> {
        match self.peek() {
            Some(token) if token.token_type == token_type => {
                self.index += 1;
                Some(token)
            }
            Some(token) => {
                diagnostics.push(
                    token.span,
                    format!(
                        "Expected '{}', but got '{}'.",
                        token_type.describe(),
                        source.text(token.span)
                    ),
                );
                None
            }
            None => {
                diagnostics.push(
                    self.eof_span(source),
                    format!("Expected '{}', but reached the end of the source.", token_type.describe()),
                );
                None
            }
        }
    }

    /// Symmetric text version of `expect`, for contextual keywords.
    pub fn expect_text(&mut self, text: &str, source: &Source, diagnostics: &mut DiagnosticSink) -> Option<Token> {
        match self.peek() {
            Some(token) if source.text(token.span) == text => {
                self.index += 1;
                Some(token)
            }
            Some(token) => {
                diagnostics.push(
                    token.span,
                    format!("Expected '{}', but got '{}'.", text, source.text(token.span)),
                );
                None
            }
            None => {
                diagnostics.push(
                    self.eof_span(source),
                    format!("Expected '{text}', but reached the end of the source."),
                );
                None
            }
        }
    }

    /// Synthesises an empty span at the end of the last line, for
    /// diagnostics raised when the stream is exhausted.
    pub fn eof_span(&self, source: &Source) -> Span {
        let line_number = source.last_line_number();
        let line = source.line(line_number);
        Span::new(line.end, line_number, line.end, line_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qak_core::Source;

    fn token(token_type: TokenType, start: u32, end: u32) -> Token {
        Token::new(token_type, Span::new(start, 1, end, 1))
    }

    #[test]
    fn peek_and_consume_advance_in_lockstep() {
        let tokens = vec![token(TokenType::Identifier, 0, 1), token(TokenType::Plus, 2, 3)];
        let mut stream = TokenStream::new(&tokens);
        assert_eq!(stream.peek(), stream.consume());
        assert_eq!(stream.peek().unwrap().token_type, TokenType::Plus);
        assert!(stream.has_more());
        stream.consume();
        assert!(!stream.has_more());
        assert_eq!(stream.consume(), None);
    }

    #[test]
    fn match_type_only_advances_when_requested() {
        let tokens = vec![token(TokenType::Plus, 0, 1)];
        let mut stream = TokenStream::new(&tokens);
        assert!(stream.match_type(TokenType::Plus, false));
        assert!(stream.has_more());
        assert!(stream.match_type(TokenType::Plus, true));
        assert!(!stream.has_more());
    }

    #[test]
    fn match_text_compares_source_bytes() {
        let source = Source::new("<test>", b"module".to_vec());
        let tokens = vec![token(TokenType::Identifier, 0, 6)];
        let mut stream = TokenStream::new(&tokens);
        assert!(!stream.match_text(&source, "var", false));
        assert!(stream.match_text(&source, "module", true));
        assert!(!stream.has_more());
    }

    #[test]
    fn expect_mismatch_reports_diagnostic_and_returns_none() {
        let source = Source::new("<test>", b"x".to_vec());
        let tokens = vec![token(TokenType::Identifier, 0, 1)];
        let mut stream = TokenStream::new(&tokens);
        let mut diagnostics = DiagnosticSink::new();
        assert!(stream.expect(TokenType::Plus, &source, &mut diagnostics).is_none());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.as_slice()[0].message.contains("Expected"));
    }

    #[test]
    fn expect_at_eof_synthesises_span_from_last_line() {
        let source = Source::new("<test>", b"module m".to_vec());
        let tokens = vec![token(TokenType::Identifier, 0, 6), token(TokenType::Identifier, 7, 8)];
        let mut stream = TokenStream::new(&tokens);
        stream.consume();
        stream.consume();
        let mut diagnostics = DiagnosticSink::new();
        assert!(stream.expect(TokenType::Plus, &source, &mut diagnostics).is_none());
        assert!(diagnostics.as_slice()[0].message.contains("reached the end of the source"));
    }
}
