use crate::error::{SyntaxError, SyntaxErrorKind};
use either::Either;
use nom::branch::alt;
use nom::character::complete::char as cchar;
use nom::character::complete::satisfy;
use nom::combinator::{map, value};
use nom::IResult;

type NResult<'a, T> = IResult<&'a str, T>;

/// Characters that other regex dialects treat as syntax. They are refused
/// rather than silently matched literally.
const RESERVED: &[char] = &['\\', '.', '?', '[', ']', '{', '}', '^', '$'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Literal(char),
    Alternation,
    Star,
    Plus,
    /// Inserted between two adjacent operands.
    Concat,
    LParen,
    RParen,
}

impl TokenKind {
    /// The pattern character this token was read from. `Concat` has no source
    /// character and reports `·`.
    pub fn as_char(&self) -> char {
        match self {
            TokenKind::Literal(c) => *c,
            TokenKind::Alternation => '|',
            TokenKind::Star => '*',
            TokenKind::Plus => '+',
            TokenKind::Concat => '·',
            TokenKind::LParen => '(',
            TokenKind::RParen => ')',
        }
    }

    fn ends_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Literal(_) | TokenKind::RParen | TokenKind::Star | TokenKind::Plus
        )
    }

    fn begins_operand(&self) -> bool {
        matches!(self, TokenKind::Literal(_) | TokenKind::LParen)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    position: usize,
}

impl Token {
    pub const fn new(kind: TokenKind, position: usize) -> Self {
        Self { kind, position }
    }

    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Character offset in the pattern.
    pub const fn position(&self) -> usize {
        self.position
    }
}

pub fn is_literal(c: char) -> bool {
    c.is_ascii_graphic() && !"|*+()".contains(c) && !RESERVED.contains(&c)
}

fn operator(input: &str) -> NResult<'_, TokenKind> {
    alt((
        value(TokenKind::Alternation, cchar('|')),
        value(TokenKind::Star, cchar('*')),
        value(TokenKind::Plus, cchar('+')),
        value(TokenKind::LParen, cchar('(')),
        value(TokenKind::RParen, cchar(')')),
    ))(input)
}

fn literal(input: &str) -> NResult<'_, char> {
    satisfy(is_literal)(input)
}

fn lexeme(input: &str) -> NResult<'_, Either<char, TokenKind>> {
    alt((map(literal, Either::Left), map(operator, Either::Right)))(input)
}

/// Splits a pattern into tokens, making concatenation explicit.
///
/// `ab` lexes to `Literal('a') Concat Literal('b')`; a `Concat` token carries
/// the position of the operand it precedes.
pub fn lex(pattern: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens: Vec<Token> = Vec::with_capacity(pattern.len() * 2);
    let mut rest = pattern;

    for position in 0.. {
        let Some(next) = rest.chars().next() else {
            break;
        };

        let (r, lexed) = lexeme(rest).map_err(|_| {
            SyntaxError::new(SyntaxErrorKind::UnrecognizedCharacter(next), position)
        })?;
        rest = r;

        let kind = lexed.either(TokenKind::Literal, |op| op);
        if tokens.last().is_some_and(|t| t.kind.ends_operand()) && kind.begins_operand() {
            tokens.push(Token::new(TokenKind::Concat, position));
        }
        tokens.push(Token::new(kind, position));
    }

    log::debug!("lexed {:?} into {} tokens", pattern, tokens.len());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(pattern: &str) -> Vec<TokenKind> {
        lex(pattern).unwrap().iter().map(Token::kind).collect()
    }

    #[test]
    fn inserts_concat_between_literals() {
        assert_eq!(kinds("ab"), vec![Literal('a'), Concat, Literal('b')]);
    }

    #[test]
    fn inserts_concat_around_groups_and_postfix() {
        assert_eq!(
            kinds("a(b)*c+(d)"),
            vec![
                Literal('a'),
                Concat,
                LParen,
                Literal('b'),
                RParen,
                Star,
                Concat,
                Literal('c'),
                Plus,
                Concat,
                LParen,
                Literal('d'),
                RParen,
            ]
        );
    }

    #[test]
    fn no_concat_next_to_alternation() {
        assert_eq!(
            kinds("a|(b"),
            vec![Literal('a'), Alternation, LParen, Literal('b')]
        );
    }

    #[test]
    fn positions_follow_characters() {
        let tokens = lex("ab|c").unwrap();
        let positions: Vec<_> = tokens.iter().map(Token::position).collect();
        // a · b | c
        assert_eq!(positions, vec![0, 1, 1, 2, 3]);
    }

    #[test]
    fn empty_pattern_has_no_tokens() {
        assert!(lex("").unwrap().is_empty());
    }

    #[test]
    fn rejects_unrecognized_characters() {
        for (pattern, c, position) in [("a b", ' ', 1), ("ab.", '.', 2), ("é", 'é', 0), ("[a]", '[', 0)] {
            let err = lex(pattern).unwrap_err();
            assert_eq!(err.kind(), SyntaxErrorKind::UnrecognizedCharacter(c));
            assert_eq!(err.position(), position);
        }
    }

    #[test]
    fn accepts_digits_and_punctuation_as_literals() {
        assert_eq!(kinds("1-"), vec![Literal('1'), Concat, Literal('-')]);
    }
}
