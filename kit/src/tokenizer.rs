//! A hand-written, zero-copy UTF-8 scanner.
//!
//! This is the hard-engineering core the whole front end rests on: manual
//! UTF-8 decoding with an ASCII fast path, precise line/byte span tracking,
//! and a scan loop that never aborts — on a malformed byte or literal it
//! records one diagnostic and keeps going, so a single bad file still
//! yields every other error in it.

use qak_core::{DiagnosticSink, Source, Span};

use crate::token::{Token, TokenType};

/// Standard 1-6 byte UTF-8 shift-and-add decode. `*index` must point at the
/// first byte of a code point; on return it points just past the last byte
/// consumed. Continuation bytes (`0b10xxxxxx`) are folded in for as long as
/// they appear, capped at 6 to match the historical six-entry offset table
/// (well-formed UTF-8 never needs more than 4, but a hostile run of
/// continuation bytes must not be allowed to walk past it).
fn decode_utf8(data: &[u8], index: &mut u32, end: u32) -> u32 {
    const OFFSETS: [u32; 6] = [
        0x0000_0000,
        0x0000_3080,
        0x000E_2080,
        0x03C8_2080,
        0xFA08_2080,
        0x8208_2080,
    ];

    let mut character: u32 = 0;
    let mut size = 0usize;
    loop {
        character <<= 6;
        character = character.wrapping_add(u32::from(data[*index as usize]));
        *index += 1;
        size += 1;
        if size >= OFFSETS.len() || *index >= end {
            break;
        }
        if data[*index as usize] & 0xC0 != 0x80 {
            break;
        }
    }
    character.wrapping_sub(OFFSETS[size - 1])
}

fn is_identifier_start(c: u32) -> bool {
    (0x61..=0x7A).contains(&c) || (0x41..=0x5A).contains(&c) || c == u32::from(b'_') || c >= 0xC0
}

fn is_identifier_part(c: u32) -> bool {
    is_identifier_start(c) || (0x30..=0x39).contains(&c) || c >= 0x80
}

struct CharacterStream<'s> {
    data: &'s [u8],
    index: u32,
    end: u32,
    line: u32,
    span_start: u32,
    span_line_start: u32,
}

impl<'s> CharacterStream<'s> {
    fn new(data: &'s [u8]) -> Self {
        Self {
            data,
            index: 0,
            end: data.len() as u32,
            line: 1,
            span_start: 0,
            span_line_start: 1,
        }
    }

    #[inline]
    fn has_more(&self) -> bool {
        self.index < self.end
    }

    #[inline]
    fn peek_byte(&self) -> u8 {
        self.data[self.index as usize]
    }

    fn peek_char(&self) -> u32 {
        let mut i = self.index;
        decode_utf8(self.data, &mut i, self.end)
    }

    fn consume_char(&mut self) -> u32 {
        decode_utf8(self.data, &mut self.index, self.end)
    }

    fn consume_byte(&mut self) -> u8 {
        let byte = self.data[self.index as usize];
        self.index += 1;
        byte
    }

    fn match_byte(&mut self, byte: u8, consume: bool) -> bool {
        if self.has_more() && self.peek_byte() == byte {
            if consume {
                self.index += 1;
            }
            true
        } else {
            false
        }
    }

    fn match_str(&mut self, needle: &[u8], consume: bool) -> bool {
        let len = needle.len();
        if self.index as usize + len > self.end as usize {
            return false;
        }
        if &self.data[self.index as usize..self.index as usize + len] == needle {
            if consume {
                self.index += len as u32;
            }
            true
        } else {
            false
        }
    }

    fn match_digit(&mut self, consume: bool) -> bool {
        self.has_more() && self.peek_byte().is_ascii_digit() && {
            if consume {
                self.index += 1;
            }
            true
        }
    }

    fn match_hex(&mut self, consume: bool) -> bool {
        self.has_more() && self.peek_byte().is_ascii_hexdigit() && {
            if consume {
                self.index += 1;
            }
            true
        }
    }

    fn match_identifier_start(&mut self, consume: bool) -> bool {
        if !self.has_more() {
            return false;
        }
        let mut i = self.index;
        let c = decode_utf8(self.data, &mut i, self.end);
        if is_identifier_start(c) {
            if consume {
                self.index = i;
            }
            true
        } else {
            false
        }
    }

    fn match_identifier_part(&mut self, consume: bool) -> bool {
        if !self.has_more() {
            return false;
        }
        let mut i = self.index;
        let c = decode_utf8(self.data, &mut i, self.end);
        if is_identifier_part(c) {
            if consume {
                self.index = i;
            }
            true
        } else {
            false
        }
    }

    /// Skips whitespace and `#`-to-end-of-line comments.
    fn skip_whitespace(&mut self) {
        while self.has_more() {
            match self.peek_byte() {
                b'#' => {
                    while self.has_more() && self.peek_byte() != b'\n' {
                        self.index += 1;
                    }
                }
                b'\n' => {
                    self.index += 1;
                    self.line += 1;
                }
                b' ' | b'\r' | b'\t' => {
                    self.index += 1;
                }
                _ => break,
            }
        }
    }

    fn start_span(&mut self) {
        self.span_start = self.index;
        self.span_line_start = self.line;
    }

    fn end_span(&self) -> Span {
        Span::new(self.span_start, self.span_line_start, self.index, self.line)
    }
}

fn simple_token_for_byte(byte: u8) -> Option<TokenType> {
    use TokenType::*;
    Some(match byte {
        b'.' => Period,
        b',' => Comma,
        b';' => Semicolon,
        b':' => Colon,
        b'+' => Plus,
        b'-' => Minus,
        b'*' => Asterisk,
        b'/' => ForwardSlash,
        b'%' => Percentage,
        b'(' => LeftParenthesis,
        b')' => RightParenthesis,
        b'[' => LeftBracket,
        b']' => RightBracket,
        b'{' => LeftCurly,
        b'}' => RightCurly,
        b'<' => Less,
        b'>' => Greater,
        b'=' => Assignment,
        b'&' => And,
        b'|' => Or,
        b'^' => Xor,
        b'!' => Not,
        b'?' => QuestionMark,
        _ => return None,
    })
}

/// Two-character widening: `<`, `>`, `!`, `=` followed by another `=`.
fn widen_with_equals(first: TokenType) -> Option<TokenType> {
    use TokenType::*;
    Some(match first {
        Less => LessEqual,
        Greater => GreaterEqual,
        Not => NotEqual,
        Assignment => Equal,
        _ => return None,
    })
}

/// Scans `source` front-to-back, appending every token to the returned
/// vector in source order and every diagnostic to `diagnostics` in
/// detection order. Always completes: an unrecognised byte or a malformed
/// literal records one diagnostic and the scan continues.
pub fn tokenize(source: &Source, diagnostics: &mut DiagnosticSink) -> Vec<Token> {
    let data = source.data();
    let mut stream = CharacterStream::new(data);
    let mut tokens = Vec::new();

    while stream.has_more() {
        stream.skip_whitespace();
        if !stream.has_more() {
            break;
        }
        stream.start_span();

        if stream.match_digit(false) {
            scan_number(&mut stream, &mut tokens, diagnostics);
            continue;
        }

        if stream.match_byte(b'\'', true) {
            scan_character_literal(&mut stream, &mut tokens, diagnostics);
            continue;
        }

        if stream.match_byte(b'"', true) {
            scan_string_literal(&mut stream, &mut tokens, diagnostics);
            continue;
        }

        if stream.match_identifier_start(true) {
            while stream.match_identifier_part(true) {}
            let span = stream.end_span();
            let text = source.text(span);
            let token_type = match text {
                "true" | "false" => TokenType::BooleanLiteral,
                "nothing" => TokenType::NothingLiteral,
                _ => TokenType::Identifier,
            };
            tokens.push(Token::new(token_type, span));
            continue;
        }

        scan_punctuation(&mut stream, &mut tokens, diagnostics);
    }

    tokens
}

fn scan_number(stream: &mut CharacterStream<'_>, tokens: &mut Vec<Token>, diagnostics: &mut DiagnosticSink) {
    if stream.match_str(b"0x", true) {
        while stream.match_hex(true) {}
        tokens.push(Token::new(TokenType::IntegerLiteral, stream.end_span()));
        return;
    }

    let mut token_type = TokenType::IntegerLiteral;
    while stream.match_digit(true) {}
    if stream.peek_byte_is(b'.') && stream.peek_second_is_digit() {
        stream.match_byte(b'.', true);
        token_type = TokenType::FloatLiteral;
        while stream.match_digit(true) {}
    }

    if stream.match_byte(b'b', true) {
        if token_type == TokenType::FloatLiteral {
            diagnostics.push(stream.end_span(), "Byte literal can not have a decimal point.");
        }
        token_type = TokenType::ByteLiteral;
    } else if stream.match_byte(b's', true) {
        if token_type == TokenType::FloatLiteral {
            diagnostics.push(stream.end_span(), "Short literal can not have a decimal point.");
        }
        token_type = TokenType::ShortLiteral;
    } else if stream.match_byte(b'l', true) {
        if token_type == TokenType::FloatLiteral {
            diagnostics.push(stream.end_span(), "Long literal can not have a decimal point.");
        }
        token_type = TokenType::LongLiteral;
    } else if stream.match_byte(b'f', true) {
        token_type = TokenType::FloatLiteral;
    } else if stream.match_byte(b'd', true) {
        token_type = TokenType::DoubleLiteral;
    }

    tokens.push(Token::new(token_type, stream.end_span()));
}

fn scan_character_literal(
    stream: &mut CharacterStream<'_>,
    tokens: &mut Vec<Token>,
    diagnostics: &mut DiagnosticSink,
) {
    stream.match_byte(b'\\', true);
    if stream.has_more() {
        stream.consume_char();
    }
    if !stream.match_byte(b'\'', true) {
        diagnostics.push(stream.end_span(), "Expected closing ' for character literal.");
    }
    tokens.push(Token::new(TokenType::CharacterLiteral, stream.end_span()));
}

fn scan_string_literal(stream: &mut CharacterStream<'_>, tokens: &mut Vec<Token>, diagnostics: &mut DiagnosticSink) {
    let mut closed = false;
    while stream.has_more() {
        if stream.match_byte(b'\\', true) {
            if stream.has_more() {
                stream.consume_char();
            }
            continue;
        }
        if stream.match_byte(b'"', true) {
            closed = true;
            break;
        }
        if stream.peek_byte_is(b'\n') {
            break;
        }
        stream.consume_char();
    }
    if !closed {
        diagnostics.push(stream.end_span(), "String literal is not closed by double quote");
    }
    tokens.push(Token::new(TokenType::StringLiteral, stream.end_span()));
}

fn scan_punctuation(stream: &mut CharacterStream<'_>, tokens: &mut Vec<Token>, diagnostics: &mut DiagnosticSink) {
    let c = stream.consume_char();
    if c >= 128 {
        diagnostics.push(stream.end_span(), "Unknown token");
        return;
    }

    let Some(token_type) = simple_token_for_byte(c as u8) else {
        diagnostics.push(stream.end_span(), "Unknown token");
        return;
    };

    if stream.match_byte(b'=', true) {
        match widen_with_equals(token_type) {
            Some(widened) => tokens.push(Token::new(widened, stream.end_span())),
            None => diagnostics.push(stream.end_span(), "Found unknown two character token"),
        }
    } else {
        tokens.push(Token::new(token_type, stream.end_span()));
    }
}

impl CharacterStream<'_> {
    fn peek_byte_is(&self, byte: u8) -> bool {
        self.has_more() && self.peek_byte() == byte
    }

    fn peek_second_is_digit(&self) -> bool {
        let next = self.index + 1;
        next < self.end && self.data[next as usize].is_ascii_digit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qak_core::Source;

    fn scan(src: &str) -> (Vec<Token>, DiagnosticSink) {
        let source = Source::new("<test>", src.as_bytes().to_vec());
        let mut diagnostics = DiagnosticSink::new();
        let tokens = tokenize(&source, &mut diagnostics);
        (tokens, diagnostics)
    }

    #[test]
    fn full_punctuation_suite_scans_to_42_tokens_without_errors() {
        let src = "<= >= == != < > = . , ; : + - * / % ( ) [ ] { } & | ^ ! ? 한자🥴 123 123b 123s 123l 123.2 123.3f 123.4d 'c' '\\n' true false nothing _Some987Identifier \"Hello world. 한자🥴\"";
        let (tokens, diagnostics) = scan(src);
        assert!(!diagnostics.has_errors(), "{:?}", diagnostics.as_slice());
        assert_eq!(tokens.len(), 42);
        assert_eq!(tokens[0].token_type, TokenType::LessEqual);
        assert_eq!(tokens.last().unwrap().token_type, TokenType::StringLiteral);
    }

    #[test]
    fn identifier_covers_all_bytes_of_multibyte_codepoints() {
        let src = "한자🥴";
        let source = Source::new("<test>", src.as_bytes().to_vec());
        let mut diagnostics = DiagnosticSink::new();
        let tokens = tokenize(&source, &mut diagnostics);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::Identifier);
        assert_eq!(source.text(tokens[0].span), src);
    }

    #[test]
    fn unterminated_string_still_emits_one_token_and_one_error() {
        let (tokens, diagnostics) = scan("\"abc");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::StringLiteral);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn unterminated_character_literal_reports_error() {
        let (tokens, diagnostics) = scan("'c");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::CharacterLiteral);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn unknown_two_char_combination_is_an_error() {
        let (tokens, diagnostics) = scan("+=");
        assert!(tokens.is_empty());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn float_suffix_b_reports_decimal_point_error_but_still_produces_token() {
        let (tokens, diagnostics) = scan("1.5b");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::ByteLiteral);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn hex_literal_ignores_suffixes() {
        let (tokens, diagnostics) = scan("0xFF");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::IntegerLiteral);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn trailing_dot_without_digit_keeps_integer_literal() {
        let (tokens, _) = scan("123.");
        assert_eq!(tokens[0].token_type, TokenType::IntegerLiteral);
    }

    #[test]
    fn line_numbers_advance_across_newlines() {
        let (tokens, _) = scan("a\nb\nc");
        assert_eq!(tokens[0].span.start_line, 1);
        assert_eq!(tokens[1].span.start_line, 2);
        assert_eq!(tokens[2].span.start_line, 3);
    }

    #[test]
    fn comment_is_skipped_to_end_of_line() {
        let (tokens, diagnostics) = scan("a # comment 한자\nb");
        assert!(!diagnostics.has_errors());
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].span.start_line, 2);
    }

    #[test]
    fn token_coverage_reconstructs_source_modulo_whitespace() {
        let src = "var x : int = 1 + 2 # trailing\n";
        let source = Source::new("<test>", src.as_bytes().to_vec());
        let mut diagnostics = DiagnosticSink::new();
        let tokens = tokenize(&source, &mut diagnostics);
        for window in tokens.windows(2) {
            assert!(window[0].span.end <= window[1].span.start);
        }
        let last = tokens.last().unwrap();
        assert!((last.span.end as usize) <= src.len());
    }
}
