use crate::config::{Config, EmptyPattern};
use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::lexer::{Token, TokenKind};
use crate::regex::Ast;
use either::Either;

/// Builds the syntax tree for a token stream produced by
/// [`lex`](crate::lexer::lex).
///
/// ```text
/// expr   := term ('|' term)*
/// term   := factor (CONCAT factor)*
/// factor := atom ('*' | '+')*
/// atom   := LITERAL | '(' expr ')'
/// ```
///
/// Precedence from loosest to tightest is `|`, concatenation, then the
/// postfix `*` and `+`. Binary operators are left-associative. Open groups
/// are kept on an explicit stack, so nesting depth is bounded only by
/// memory. Parsing stops at the first error.
pub fn parse(tokens: &[Token], config: &Config) -> Result<Ast, SyntaxError> {
    if tokens.is_empty() {
        return match config.empty_pattern() {
            EmptyPattern::Reject => Err(SyntaxError::new(SyntaxErrorKind::EmptyPattern, 0)),
            EmptyPattern::MatchEmpty => Ok(Ast::Empty),
        };
    }

    Parser::new(tokens).expr()
}

/// The alternatives and the current term of one level of parentheses.
struct Group {
    /// The `(` that opened this group; `None` for the whole pattern.
    open: Option<Token>,
    alternation: Option<Ast>,
    term: Option<Ast>,
}

impl Group {
    fn new(open: Option<Token>) -> Self {
        Self {
            open,
            alternation: None,
            term: None,
        }
    }

    fn fold_term(&mut self, factor: Ast) -> Ast {
        match self.term.take() {
            Some(term) => Ast::concat(term, factor),
            None => factor,
        }
    }

    fn fold_alternation(&mut self, factor: Ast) -> Ast {
        let term = self.fold_term(factor);
        match self.alternation.take() {
            Some(alternation) => Ast::alternation(alternation, term),
            None => term,
        }
    }

    fn push_factor(&mut self, factor: Ast) {
        let term = self.fold_term(factor);
        self.term = Some(term);
    }

    fn push_alternative(&mut self, factor: Ast) {
        let alternation = self.fold_alternation(factor);
        self.alternation = Some(alternation);
    }

    fn close(mut self, factor: Ast) -> Ast {
        self.fold_alternation(factor)
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        match self.peek() {
            Some(t) if t.kind() == kind => self.advance(),
            _ => None,
        }
    }

    /// Position just past the last token.
    fn end(&self) -> usize {
        self.tokens.last().map_or(0, |t| t.position() + 1)
    }

    fn expr(&mut self) -> Result<Ast, SyntaxError> {
        let mut current = Group::new(None);
        let mut outer: Vec<Group> = Vec::new();

        loop {
            let mut factor = match self.atom(&outer)? {
                Either::Left(atom) => atom,
                Either::Right(open) => {
                    outer.push(std::mem::replace(&mut current, Group::new(Some(open))));
                    continue;
                }
            };

            loop {
                if self.eat(TokenKind::Star).is_some() {
                    factor = Ast::star(factor);
                    continue;
                }
                if self.eat(TokenKind::Plus).is_some() {
                    factor = Ast::plus(factor);
                    continue;
                }

                match self.peek() {
                    Some(t) if t.kind() == TokenKind::Concat => {
                        self.advance();
                        current.push_factor(factor);
                        break;
                    }
                    Some(t) if t.kind() == TokenKind::Alternation => {
                        self.advance();
                        current.push_alternative(factor);
                        break;
                    }
                    Some(t) if t.kind() == TokenKind::RParen => {
                        let Some(parent) = outer.pop() else {
                            return Err(SyntaxError::new(
                                SyntaxErrorKind::UnmatchedCloseParen,
                                t.position(),
                            ));
                        };
                        self.advance();
                        let group = std::mem::replace(&mut current, parent);
                        factor = group.close(factor);
                    }
                    Some(t) => {
                        return Err(SyntaxError::new(
                            SyntaxErrorKind::MissingOperand(t.kind().as_char()),
                            t.position(),
                        ))
                    }
                    None if outer.is_empty() => return Ok(current.close(factor)),
                    None => {
                        return Err(SyntaxError::new(
                            SyntaxErrorKind::UnmatchedOpenParen,
                            current.open.map_or(0, |t| t.position()),
                        ))
                    }
                }
            }
        }
    }

    /// Reads the operand that must come next, or the `(` of a group whose
    /// contents follow.
    fn atom(&mut self, outer: &[Group]) -> Result<Either<Ast, Token>, SyntaxError> {
        let Some(token) = self.advance() else {
            return Err(SyntaxError::new(SyntaxErrorKind::UnexpectedEnd, self.end()));
        };

        match token.kind() {
            TokenKind::Literal(c) => Ok(Either::Left(Ast::Literal(c))),
            TokenKind::LParen => match self.eat(TokenKind::RParen) {
                Some(close) => {
                    log::trace!("empty group spanning {}..={}", token.position(), close.position());
                    Err(SyntaxError::new(SyntaxErrorKind::EmptyGroup, token.position()))
                }
                None => Ok(Either::Right(token)),
            },
            TokenKind::RParen if outer.is_empty() => Err(SyntaxError::new(
                SyntaxErrorKind::UnmatchedCloseParen,
                token.position(),
            )),
            // Only `|` can leave a group without its right-hand operand.
            TokenKind::RParen => Err(self.missing_operand_before(token)),
            op => Err(SyntaxError::new(
                SyntaxErrorKind::MissingOperand(op.as_char()),
                token.position(),
            )),
        }
    }

    fn missing_operand_before(&self, token: Token) -> SyntaxError {
        let operator = self
            .pos
            .checked_sub(2)
            .and_then(|i| self.tokens.get(i))
            .copied()
            .unwrap_or(token);
        SyntaxError::new(
            SyntaxErrorKind::MissingOperand(operator.kind().as_char()),
            operator.position(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse_str(pattern: &str) -> Result<Ast, SyntaxError> {
        parse(&lex(pattern)?, &Config::default())
    }

    fn lit(c: char) -> Ast {
        Ast::Literal(c)
    }

    fn error_of(pattern: &str) -> (SyntaxErrorKind, usize) {
        let e = parse_str(pattern).unwrap_err();
        (e.kind(), e.position())
    }

    #[test]
    fn single_literal() {
        assert_eq!(parse_str("a").unwrap(), lit('a'));
    }

    #[test]
    fn concatenation_is_left_associative() {
        assert_eq!(
            parse_str("abc").unwrap(),
            Ast::concat(Ast::concat(lit('a'), lit('b')), lit('c'))
        );
    }

    #[test]
    fn alternation_is_left_associative() {
        assert_eq!(
            parse_str("a|b|c").unwrap(),
            Ast::alternation(Ast::alternation(lit('a'), lit('b')), lit('c'))
        );
    }

    #[test]
    fn concatenation_binds_tighter_than_alternation() {
        assert_eq!(
            parse_str("ab|c").unwrap(),
            Ast::alternation(Ast::concat(lit('a'), lit('b')), lit('c'))
        );
    }

    #[test]
    fn postfix_binds_tighter_than_concatenation() {
        assert_eq!(
            parse_str("ab*").unwrap(),
            Ast::concat(lit('a'), Ast::star(lit('b')))
        );
    }

    #[test]
    fn postfix_operators_repeat() {
        assert_eq!(
            parse_str("a*+").unwrap(),
            Ast::plus(Ast::star(lit('a')))
        );
    }

    #[test]
    fn groups_override_precedence() {
        assert_eq!(
            parse_str("a|(bc)+d").unwrap(),
            Ast::alternation(
                lit('a'),
                Ast::concat(Ast::plus(Ast::concat(lit('b'), lit('c'))), lit('d'))
            )
        );
    }

    #[test]
    fn redundant_parentheses_vanish() {
        assert_eq!(parse_str("((a))").unwrap(), lit('a'));
        assert_eq!(parse_str("((a)(b))").unwrap(), parse_str("ab").unwrap());
    }

    #[test]
    fn empty_pattern_follows_config() {
        assert_eq!(error_of(""), (SyntaxErrorKind::EmptyPattern, 0));

        let config = Config::default().with_empty_pattern(EmptyPattern::MatchEmpty);
        assert_eq!(parse(&[], &config).unwrap(), Ast::Empty);
    }

    #[test]
    fn unbalanced_parentheses() {
        assert_eq!(error_of("(a|b"), (SyntaxErrorKind::UnmatchedOpenParen, 0));
        assert_eq!(error_of("a(b(c)"), (SyntaxErrorKind::UnmatchedOpenParen, 1));
        assert_eq!(error_of("a)"), (SyntaxErrorKind::UnmatchedCloseParen, 1));
        assert_eq!(error_of("(a))b"), (SyntaxErrorKind::UnmatchedCloseParen, 3));
        assert_eq!(error_of(")"), (SyntaxErrorKind::UnmatchedCloseParen, 0));
    }

    #[test]
    fn empty_group() {
        assert_eq!(error_of("a()"), (SyntaxErrorKind::EmptyGroup, 1));
    }

    #[test]
    fn operators_without_operands() {
        assert_eq!(error_of("*a"), (SyntaxErrorKind::MissingOperand('*'), 0));
        assert_eq!(error_of("+"), (SyntaxErrorKind::MissingOperand('+'), 0));
        assert_eq!(error_of("|a"), (SyntaxErrorKind::MissingOperand('|'), 0));
        assert_eq!(error_of("a||b"), (SyntaxErrorKind::MissingOperand('|'), 2));
        assert_eq!(error_of("a|*"), (SyntaxErrorKind::MissingOperand('*'), 2));
        assert_eq!(error_of("(a|)"), (SyntaxErrorKind::MissingOperand('|'), 2));
        assert_eq!(error_of("(*a)"), (SyntaxErrorKind::MissingOperand('*'), 1));
    }

    #[test]
    fn deeply_nested_groups() {
        let depth = 50_000;
        let pattern = "(".repeat(depth) + "a" + &")".repeat(depth);
        assert_eq!(parse_str(&pattern).unwrap(), lit('a'));

        let unclosed = "(".repeat(depth) + "a" + &")".repeat(depth - 1);
        assert_eq!(error_of(&unclosed), (SyntaxErrorKind::UnmatchedOpenParen, 0));
    }

    #[test]
    fn nested_groups_keep_postfix_and_alternation() {
        assert_eq!(
            parse_str("((a|b)c)*").unwrap(),
            Ast::star(Ast::concat(Ast::alternation(lit('a'), lit('b')), lit('c')))
        );
    }

    #[test]
    fn trailing_alternation_is_unexpected_end() {
        assert_eq!(error_of("a|"), (SyntaxErrorKind::UnexpectedEnd, 2));
        assert_eq!(error_of("(a|"), (SyntaxErrorKind::UnexpectedEnd, 3));
    }
}
