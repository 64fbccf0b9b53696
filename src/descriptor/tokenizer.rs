//! logos-based tokenizer for descriptor value strings.
//!
//! Descriptor attributes carry small comma-separated value lists:
//! relation lists (`left-left,width-width%`), number tuples (`10,-4.5`),
//! colours (`#ff8800`) and the `-` "no value" sentinel.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `-3` as Number beats `-` as Dash)
//! 2. For equal length matches, earlier-defined variants win

use logos::Logos;

/// Descriptor value token produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    /// Hex colour: `#rrggbb` or `#aarrggbb`.
    #[regex(r"#[0-9a-fA-F]{6}([0-9a-fA-F]{2})?")]
    HexColor,

    /// Number: integer or float, possibly negative.
    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    /// Identifier, hyphens allowed after the first character: `left-left`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    /// `%`
    #[token("%")]
    Percent,

    /// `,`
    #[token(",")]
    Comma,

    /// `-`, the "no value" sentinel.
    #[token("-")]
    Dash,
}

/// A token with its source text and byte offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub text: String,
    pub offset: usize,
}

/// Tokenize `input`. Returns the byte offset of the first character no
/// token matches.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, usize> {
    Token::lexer(input)
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => Ok(Spanned {
                token,
                text: input[span.clone()].to_string(),
                offset: span.start,
            }),
            Err(()) => Err(span.start),
        })
        .collect()
}
