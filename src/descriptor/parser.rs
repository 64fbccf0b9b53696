//! Parsers for descriptor value strings.

use super::tokenizer::{tokenize, Spanned, Token};
use crate::gear::{GearKind, GearValue, Look};
use crate::geometry::{Point, Size};
use crate::relation::{RelationDef, RelationType};
use crate::stage::{AnimationState, Color};

/// Errors produced while parsing descriptor values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("invalid character at byte {0}")]
    InvalidCharacter(usize),
    #[error("unknown relation `{0}`")]
    UnknownRelation(String),
    #[error("invalid {kind} value `{value}`")]
    InvalidValue { kind: &'static str, value: String },
}

/// Recursive descent parser state.
struct Parser {
    tokens: Vec<Spanned>,
    cursor: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(input).map_err(ParseError::InvalidCharacter)?;
        Ok(Self { tokens, cursor: 0 })
    }

    fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<&Spanned> {
        let tok = self.tokens.get(self.cursor)?;
        self.cursor += 1;
        Some(tok)
    }

    fn expect(&mut self, expected: Token) -> Result<Spanned, ParseError> {
        let position = self.cursor;
        match self.advance() {
            Some(tok) if tok.token == expected => Ok(tok.clone()),
            Some(tok) => Err(ParseError::UnexpectedToken {
                position,
                message: format!("expected {:?}, got {:?} '{}'", expected, tok.token, tok.text),
            }),
            None => Err(ParseError::UnexpectedEof(format!("expected {:?}", expected))),
        }
    }

    /// Consume a comma if one is next. Returns whether it did.
    fn eat_comma(&mut self) -> bool {
        if self.peek().is_some_and(|t| t.token == Token::Comma) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn finish(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(tok) => Err(ParseError::UnexpectedToken {
                position: self.cursor,
                message: format!("trailing {:?} '{}'", tok.token, tok.text),
            }),
        }
    }

    fn number(&mut self) -> Result<f32, ParseError> {
        let tok = self.expect(Token::Number)?;
        tok.text.parse::<f32>().map_err(|_| ParseError::InvalidValue {
            kind: "number",
            value: tok.text,
        })
    }
}

/// Whether `input` is the `-` "no value" sentinel.
pub fn is_sentinel(input: &str) -> bool {
    input.trim() == "-"
}

/// Parse a relation list such as `left-left,width-width%`.
///
/// A trailing `%` marks a rule as percent-based. Duplicates are kept; the
/// caller decides whether they are an error.
pub fn parse_relation_list(input: &str) -> Result<Vec<RelationDef>, ParseError> {
    let mut p = Parser::new(input)?;
    let mut defs = Vec::new();
    if p.is_eof() {
        return Ok(defs);
    }
    loop {
        let name = p.expect(Token::Ident)?;
        let relation_type = RelationType::from_name(&name.text.to_ascii_lowercase())
            .ok_or_else(|| ParseError::UnknownRelation(name.text.clone()))?;
        let use_percent = p.peek().is_some_and(|t| t.token == Token::Percent);
        if use_percent {
            p.cursor += 1;
        }
        defs.push(RelationDef::new(relation_type, use_percent));
        if !p.eat_comma() {
            break;
        }
    }
    p.finish()?;
    Ok(defs)
}

/// Parse a comma-separated number tuple of exactly `n` values.
pub fn parse_numbers(input: &str, n: usize) -> Result<Vec<f32>, ParseError> {
    let mut p = Parser::new(input)?;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        if i > 0 {
            p.expect(Token::Comma)?;
        }
        out.push(p.number()?);
    }
    p.finish()?;
    Ok(out)
}

/// Parse `#rrggbb` (opaque) or `#aarrggbb`.
pub fn parse_color(input: &str) -> Result<Color, ParseError> {
    let mut p = Parser::new(input)?;
    let tok = p.expect(Token::HexColor)?;
    p.finish()?;
    let hex = &tok.text[1..];
    let raw = u32::from_str_radix(hex, 16).map_err(|_| ParseError::InvalidValue {
        kind: "color",
        value: tok.text.clone(),
    })?;
    Ok(if hex.len() == 6 { Color(0xff00_0000 | raw) } else { Color(raw) })
}

/// Parse `frame,p` (playing) or `frame,s` (stopped).
fn parse_animation(input: &str) -> Result<AnimationState, ParseError> {
    let mut p = Parser::new(input)?;
    let frame = p.number()?;
    p.expect(Token::Comma)?;
    let flag = p.expect(Token::Ident)?;
    p.finish()?;
    let playing = match flag.text.as_str() {
        "p" => true,
        "s" => false,
        _ => {
            return Err(ParseError::InvalidValue {
                kind: "animation",
                value: input.to_owned(),
            })
        }
    };
    if frame < 0.0 || frame.fract() != 0.0 {
        return Err(ParseError::InvalidValue {
            kind: "animation",
            value: input.to_owned(),
        });
    }
    Ok(AnimationState {
        playing,
        frame: frame as u32,
    })
}

/// Parse a serialized gear value. `Ok(None)` for the `-` sentinel.
///
/// | kind      | format                          |
/// |-----------|---------------------------------|
/// | xy        | `x,y`                           |
/// | size      | `width,height`                  |
/// | look      | `alpha,rotation,scaleX,scaleY`  |
/// | color     | `#rrggbb` / `#aarrggbb`         |
/// | animation | `frame,p` / `frame,s`           |
/// | text/icon | raw string                      |
pub fn parse_gear_value(kind: GearKind, input: &str) -> Result<Option<GearValue>, ParseError> {
    if is_sentinel(input) {
        return Ok(None);
    }
    let value = match kind {
        GearKind::XY => {
            let v = parse_numbers(input, 2)?;
            GearValue::XY(Point::new(v[0], v[1]))
        }
        GearKind::Size => {
            let v = parse_numbers(input, 2)?;
            GearValue::Size(Size::new(v[0], v[1]))
        }
        GearKind::Look => {
            let v = parse_numbers(input, 4)?;
            GearValue::Look(Look {
                alpha: v[0],
                rotation: v[1],
                scale_x: v[2],
                scale_y: v[3],
            })
        }
        GearKind::Color => GearValue::Color(parse_color(input)?),
        GearKind::Animation => GearValue::Animation(parse_animation(input)?),
        GearKind::Text => GearValue::Text(input.to_owned()),
        GearKind::Icon => GearValue::Icon(input.to_owned()),
        GearKind::Display => {
            return Err(ParseError::InvalidValue {
                kind: "display",
                value: input.to_owned(),
            })
        }
    };
    Ok(Some(value))
}
