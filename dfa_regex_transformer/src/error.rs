use thiserror::Error;

/// What went wrong while lexing or parsing a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("unrecognized character {0:?}")]
    UnrecognizedCharacter(char),
    #[error("unmatched '('")]
    UnmatchedOpenParen,
    #[error("unmatched ')'")]
    UnmatchedCloseParen,
    #[error("empty group")]
    EmptyGroup,
    #[error("operator '{0}' is missing an operand")]
    MissingOperand(char),
    #[error("unexpected end of pattern")]
    UnexpectedEnd,
    #[error("empty pattern")]
    EmptyPattern,
}

/// A malformed pattern. `position` is the character offset the error was
/// detected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at position {position}")]
pub struct SyntaxError {
    kind: SyntaxErrorKind,
    position: usize,
}

impl SyntaxError {
    pub const fn new(kind: SyntaxErrorKind, position: usize) -> Self {
        Self { kind, position }
    }

    pub const fn kind(&self) -> SyntaxErrorKind {
        self.kind
    }

    pub const fn position(&self) -> usize {
        self.position
    }
}

/// A broken invariant inside one of the automaton builders. Never caused by
/// user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("internal construction error: {message}")]
pub struct InternalConstructionError {
    message: String,
}

impl InternalConstructionError {
    /// Logs the violation and returns it, so callers can `return Err(..)`.
    pub(crate) fn report(message: impl Into<String>) -> Self {
        let message = message.into();
        log::error!("aborting compilation: {message}");
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Construction(#[from] InternalConstructionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display_includes_position() {
        let e = SyntaxError::new(SyntaxErrorKind::UnmatchedOpenParen, 3);
        assert_eq!(e.to_string(), "unmatched '(' at position 3");
    }

    #[test]
    fn compile_error_is_transparent() {
        let e: CompileError = SyntaxError::new(SyntaxErrorKind::MissingOperand('*'), 0).into();
        assert_eq!(e.to_string(), "operator '*' is missing an operand at position 0");
        assert!(matches!(e, CompileError::Syntax(_)));
    }
}
