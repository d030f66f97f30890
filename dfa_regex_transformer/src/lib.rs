//! Compiles a small regular-expression language (literals, `|`, `*`, `+`
//! and grouping) into a deterministic automaton.
//!
//! ```
//! use dfa_regex_transformer::to_automata;
//!
//! let dfa = to_automata("a|(bc)+d").unwrap();
//! assert!(dfa.accepts("bcbcd"));
//! assert!(!dfa.accepts("bc"));
//! ```

pub mod automata;
mod config;
mod error;
pub mod lexer;
pub mod parser;
pub mod regex;

pub use automata::{to_dfa, to_nfa, Dfa, Nfa, StateId, Symbol};
pub use config::{Config, EmptyPattern};
pub use error::{CompileError, InternalConstructionError, SyntaxError, SyntaxErrorKind};
pub use regex::Ast;

pub fn to_regex(regex: &str) -> Result<Ast, SyntaxError> {
    to_regex_with_config(regex, &Config::default())
}

pub fn to_regex_with_config(regex: &str, config: &Config) -> Result<Ast, SyntaxError> {
    let tokens = lexer::lex(regex)?;
    parser::parse(&tokens, config)
}

/// Runs every stage: lex, parse, NFA, DFA.
pub fn to_automata(regex: &str) -> Result<Dfa, CompileError> {
    to_automata_with_config(regex, &Config::default())
}

pub fn to_automata_with_config(regex: &str, config: &Config) -> Result<Dfa, CompileError> {
    let ast = to_regex_with_config(regex, config)?;
    let nfa = to_nfa(&ast)?;
    Ok(to_dfa(&nfa)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_surface_from_the_pipeline() {
        let err = to_automata("(a|b").unwrap_err();
        assert_eq!(
            err,
            CompileError::Syntax(SyntaxError::new(SyntaxErrorKind::UnmatchedOpenParen, 0))
        );
    }

    #[test]
    fn empty_pattern_matches_empty_string_when_configured() {
        let config = Config::default().with_empty_pattern(EmptyPattern::MatchEmpty);
        let dfa = to_automata_with_config("", &config).unwrap();
        assert!(dfa.accepts(""));
        assert!(!dfa.accepts("a"));
        assert!(to_automata("").is_err());
    }
}
