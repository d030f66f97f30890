/// How the parser treats a pattern with no tokens at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyPattern {
    /// Fail with [`SyntaxErrorKind::EmptyPattern`](crate::SyntaxErrorKind::EmptyPattern).
    #[default]
    Reject,
    /// Produce [`Ast::Empty`](crate::regex::Ast::Empty), which matches only `""`.
    MatchEmpty,
}

/// Options for a single compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    empty_pattern: EmptyPattern,
}

impl Config {
    pub fn with_empty_pattern(mut self, empty_pattern: EmptyPattern) -> Self {
        self.empty_pattern = empty_pattern;
        self
    }

    pub fn empty_pattern(&self) -> EmptyPattern {
        self.empty_pattern
    }
}
