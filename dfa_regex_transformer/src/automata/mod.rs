//! Automata built from a parsed pattern: Thompson construction produces the
//! [`Nfa`], subset construction turns it into a [`Dfa`].

pub mod dfa;
pub mod nfa;

pub use dfa::{to_dfa, Dfa, DfaState};
pub use nfa::{to_nfa, Nfa, NfaBuilder, NfaState, Symbol};

/// Identifier of a state, unique within one automaton.
pub type StateId = usize;
