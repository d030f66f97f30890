use super::StateId;
use crate::error::InternalConstructionError;
use crate::regex::Ast;
use derive_getters::Getters;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// Label of an NFA transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Epsilon,
    Char(char),
}

impl Symbol {
    pub fn as_char(&self) -> Option<char> {
        match self {
            Symbol::Epsilon => None,
            Symbol::Char(c) => Some(*c),
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Epsilon => write!(f, "ε"),
            Symbol::Char(c) => write!(f, "{c}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct NfaState {
    id: StateId,
    accepting: bool,
    transitions: BTreeMap<Symbol, BTreeSet<StateId>>,
}

impl NfaState {
    fn new(id: StateId) -> Self {
        Self {
            id,
            accepting: false,
            transitions: BTreeMap::new(),
        }
    }

    fn add_transition(&mut self, symbol: Symbol, dest: StateId) {
        self.transitions.entry(symbol).or_default().insert(dest);
    }

    /// States reachable from this one by consuming `symbol`.
    pub fn destinations(&self, symbol: Symbol) -> impl Iterator<Item = StateId> + '_ {
        self.transitions.get(&symbol).into_iter().flatten().copied()
    }
}

/// Non-deterministic automaton with a single start and a single accept
/// state. `Nfa::default()` is the degenerate automaton with no states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct Nfa {
    states: BTreeMap<StateId, NfaState>,
    start: StateId,
    accept: StateId,
}

impl Nfa {
    /// Assembles an automaton without checking that transitions point at
    /// existing states.
    #[cfg(test)]
    pub(crate) fn from_raw_parts(
        transitions: &[(StateId, Symbol, StateId)],
        start: StateId,
        accept: StateId,
    ) -> Self {
        let mut states = BTreeMap::new();
        for &(src, symbol, dest) in transitions {
            states
                .entry(src)
                .or_insert_with(|| NfaState::new(src))
                .add_transition(symbol, dest);
        }
        states
            .entry(accept)
            .or_insert_with(|| NfaState::new(accept))
            .accepting = true;
        Self {
            states,
            start,
            accept,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, id: StateId) -> Option<&NfaState> {
        self.states.get(&id)
    }

    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.keys().copied()
    }

    /// Every `(source, symbol, destination)` triple, ordered by source.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, Symbol, StateId)> + '_ {
        self.states.values().flat_map(|state| {
            state
                .transitions
                .iter()
                .flat_map(move |(symbol, dests)| dests.iter().map(move |d| (state.id, *symbol, *d)))
        })
    }

    /// Sorted, deduplicated literal symbols used by any transition.
    pub fn alphabet(&self) -> Vec<char> {
        self.transitions()
            .filter_map(|(_, symbol, _)| symbol.as_char())
            .sorted()
            .dedup()
            .collect_vec()
    }

    /// Smallest superset of `ids` closed under epsilon transitions.
    pub fn epsilon_closure(&self, ids: impl IntoIterator<Item = StateId>) -> BTreeSet<StateId> {
        let mut closure: BTreeSet<StateId> = BTreeSet::new();
        let mut pending: Vec<StateId> = ids.into_iter().collect();

        while let Some(id) = pending.pop() {
            if !closure.insert(id) {
                continue;
            }
            if let Some(state) = self.states.get(&id) {
                pending.extend(
                    state
                        .destinations(Symbol::Epsilon)
                        .filter(|d| !closure.contains(d)),
                );
            }
        }

        closure
    }

    /// States reachable from any of `ids` by consuming `c`, before closure.
    pub fn step<'a>(&self, ids: impl IntoIterator<Item = &'a StateId>, c: char) -> BTreeSet<StateId> {
        ids.into_iter()
            .filter_map(|id| self.states.get(id))
            .flat_map(|state| state.destinations(Symbol::Char(c)))
            .collect()
    }

    /// Runs every path at once; accepts iff the accept state is active once
    /// the input is exhausted.
    pub fn accepts(&self, input: &str) -> bool {
        if self.is_empty() {
            return false;
        }

        let mut active = self.epsilon_closure([self.start]);
        for c in input.chars() {
            active = self.epsilon_closure(self.step(&active, c));
            if active.is_empty() {
                return false;
            }
        }
        active.contains(&self.accept)
    }
}

impl Display for Nfa {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "START: {}   TERM: {}", self.start, self.accept)?;
        let lines = self
            .transitions()
            .map(|(src, symbol, dest)| format!("{src} --('{symbol}')--> {dest}"))
            .join("\n");
        write!(f, "{lines}")
    }
}

/// Entry and exit of a partially built automaton.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    accept: StateId,
}

enum Step<'a> {
    Enter(&'a Ast),
    Exit(&'a Ast),
}

/// Thompson construction for one compilation. Owns the id counter, so
/// independent builders never share ids.
#[derive(Debug, Default)]
pub struct NfaBuilder {
    next_id: StateId,
    states: BTreeMap<StateId, NfaState>,
}

impl NfaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `ast` bottom-up. The tree is walked with an explicit stack so
    /// long chains of operators do not grow the call stack.
    pub fn build(mut self, ast: &Ast) -> Result<Nfa, InternalConstructionError> {
        let mut work = vec![Step::Enter(ast)];
        let mut fragments: Vec<Fragment> = Vec::new();

        while let Some(step) = work.pop() {
            match step {
                Step::Enter(node) => {
                    work.push(Step::Exit(node));
                    work.extend(node.children().into_iter().rev().map(Step::Enter));
                }
                Step::Exit(node) => {
                    let fragment = match node {
                        Ast::Empty => self.empty()?,
                        Ast::Literal(c) => self.literal(*c)?,
                        Ast::Concat(..) => {
                            let (left, right) = pop_pair(&mut fragments)?;
                            self.concat(left, right)?
                        }
                        Ast::Alternation(..) => {
                            let (left, right) = pop_pair(&mut fragments)?;
                            self.alternation(left, right)?
                        }
                        Ast::Star(_) => {
                            let child = pop_one(&mut fragments)?;
                            self.star(child)?
                        }
                        Ast::Plus(_) => {
                            let child = pop_one(&mut fragments)?;
                            self.plus(child)?
                        }
                    };
                    log::trace!("fragment {}..{}", fragment.start, fragment.accept);
                    fragments.push(fragment);
                }
            }
        }

        let root = pop_one(&mut fragments)?;
        if !fragments.is_empty() {
            return Err(InternalConstructionError::report(format!(
                "{} fragments left unconnected",
                fragments.len()
            )));
        }
        self.finish(root)
    }

    fn finish(mut self, root: Fragment) -> Result<Nfa, InternalConstructionError> {
        self.state_mut(root.accept)?.accepting = true;
        log::debug!(
            "built NFA with {} states, start {}, accept {}",
            self.states.len(),
            root.start,
            root.accept
        );
        Ok(Nfa {
            states: self.states,
            start: root.start,
            accept: root.accept,
        })
    }

    fn fresh_state(&mut self) -> StateId {
        let id = self.next_id;
        self.next_id += 1;
        self.states.insert(id, NfaState::new(id));
        id
    }

    fn state_mut(&mut self, id: StateId) -> Result<&mut NfaState, InternalConstructionError> {
        self.states
            .get_mut(&id)
            .ok_or_else(|| InternalConstructionError::report(format!("unknown NFA state {id}")))
    }

    fn connect(
        &mut self,
        src: StateId,
        symbol: Symbol,
        dest: StateId,
    ) -> Result<(), InternalConstructionError> {
        if !self.states.contains_key(&dest) {
            return Err(InternalConstructionError::report(format!(
                "transition {src} --('{symbol}')--> {dest} targets an unknown state"
            )));
        }
        self.state_mut(src)?.add_transition(symbol, dest);
        Ok(())
    }

    fn empty(&mut self) -> Result<Fragment, InternalConstructionError> {
        let start = self.fresh_state();
        let accept = self.fresh_state();
        self.connect(start, Symbol::Epsilon, accept)?;
        Ok(Fragment { start, accept })
    }

    fn literal(&mut self, c: char) -> Result<Fragment, InternalConstructionError> {
        let start = self.fresh_state();
        let accept = self.fresh_state();
        self.connect(start, Symbol::Char(c), accept)?;
        Ok(Fragment { start, accept })
    }

    fn concat(
        &mut self,
        left: Fragment,
        right: Fragment,
    ) -> Result<Fragment, InternalConstructionError> {
        self.connect(left.accept, Symbol::Epsilon, right.start)?;
        Ok(Fragment {
            start: left.start,
            accept: right.accept,
        })
    }

    fn alternation(
        &mut self,
        left: Fragment,
        right: Fragment,
    ) -> Result<Fragment, InternalConstructionError> {
        let start = self.fresh_state();
        let accept = self.fresh_state();
        self.connect(start, Symbol::Epsilon, left.start)?;
        self.connect(start, Symbol::Epsilon, right.start)?;
        self.connect(left.accept, Symbol::Epsilon, accept)?;
        self.connect(right.accept, Symbol::Epsilon, accept)?;
        Ok(Fragment { start, accept })
    }

    fn star(&mut self, child: Fragment) -> Result<Fragment, InternalConstructionError> {
        let start = self.fresh_state();
        let accept = self.fresh_state();
        self.connect(start, Symbol::Epsilon, child.start)?;
        self.connect(start, Symbol::Epsilon, accept)?;
        self.connect(child.accept, Symbol::Epsilon, child.start)?;
        self.connect(child.accept, Symbol::Epsilon, accept)?;
        Ok(Fragment { start, accept })
    }

    // Same as star without the bypass from start to accept.
    fn plus(&mut self, child: Fragment) -> Result<Fragment, InternalConstructionError> {
        let accept = self.fresh_state();
        self.connect(child.accept, Symbol::Epsilon, child.start)?;
        self.connect(child.accept, Symbol::Epsilon, accept)?;
        Ok(Fragment {
            start: child.start,
            accept,
        })
    }
}

fn pop_one(fragments: &mut Vec<Fragment>) -> Result<Fragment, InternalConstructionError> {
    fragments
        .pop()
        .ok_or_else(|| InternalConstructionError::report("operator applied to a missing fragment"))
}

fn pop_pair(
    fragments: &mut Vec<Fragment>,
) -> Result<(Fragment, Fragment), InternalConstructionError> {
    let right = pop_one(fragments)?;
    let left = pop_one(fragments)?;
    Ok((left, right))
}

/// Thompson construction of `ast` with a fresh id counter.
pub fn to_nfa(ast: &Ast) -> Result<Nfa, InternalConstructionError> {
    NfaBuilder::new().build(ast)
}
