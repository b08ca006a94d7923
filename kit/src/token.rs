//! The token kind enumeration and the `Token` produced by the tokenizer.

use qak_core::Span;

/// Every lexical token kind Qak's tokenizer produces.
///
/// The declaration order is pinned to the published listing and verified by
/// a discriminant-order test; reordering a variant here is a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum TokenType {
    Period,
    Comma,
    Semicolon,
    Colon,
    Plus,
    Minus,
    Asterisk,
    ForwardSlash,
    Percentage,
    LeftParenthesis,
    RightParenthesis,
    LeftBracket,
    RightBracket,
    LeftCurly,
    RightCurly,
    LessEqual,
    GreaterEqual,
    NotEqual,
    Equal,
    Less,
    Greater,
    Assignment,
    And,
    Or,
    Xor,
    Not,
    QuestionMark,
    Unknown,

    BooleanLiteral,
    DoubleLiteral,
    FloatLiteral,
    LongLiteral,
    IntegerLiteral,
    ShortLiteral,
    ByteLiteral,
    CharacterLiteral,
    StringLiteral,
    NothingLiteral,
    Identifier,
}

impl TokenType {
    /// A short human-readable name, used in "Expected '<kind>'" diagnostics.
    pub fn describe(self) -> &'static str {
        use TokenType::*;
        match self {
            Period => ".",
            Comma => ",",
            Semicolon => ";",
            Colon => ":",
            Plus => "+",
            Minus => "-",
            Asterisk => "*",
            ForwardSlash => "/",
            Percentage => "%",
            LeftParenthesis => "(",
            RightParenthesis => ")",
            LeftBracket => "[",
            RightBracket => "]",
            LeftCurly => "{",
            RightCurly => "}",
            LessEqual => "<=",
            GreaterEqual => ">=",
            NotEqual => "!=",
            Equal => "==",
            Less => "<",
            Greater => ">",
            Assignment => "=",
            And => "&",
            Or => "|",
            Xor => "^",
            Not => "!",
            QuestionMark => "?",
            Unknown => "unknown token",
            BooleanLiteral => "boolean literal",
            DoubleLiteral => "double literal",
            FloatLiteral => "float literal",
            LongLiteral => "long literal",
            IntegerLiteral => "integer literal",
            ShortLiteral => "short literal",
            ByteLiteral => "byte literal",
            CharacterLiteral => "character literal",
            StringLiteral => "string literal",
            NothingLiteral => "nothing literal",
            Identifier => "identifier",
        }
    }
}

/// A classified span: the atomic output of the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub token_type: TokenType,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, span: Span) -> Self {
        Self { token_type, span }
    }
}
