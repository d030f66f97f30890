use super::nfa::Nfa;
use super::StateId;
use crate::error::InternalConstructionError;
use derive_getters::Getters;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct DfaState {
    id: StateId,
    /// The NFA states this state stands for, sorted.
    label: Vec<StateId>,
    accepting: bool,
    transitions: BTreeMap<char, StateId>,
}

impl DfaState {
    fn new(id: StateId, label: Vec<StateId>, accepting: bool) -> Self {
        Self {
            id,
            label,
            accepting,
            transitions: BTreeMap::new(),
        }
    }
}

/// Deterministic automaton. A missing transition means the input is
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Dfa {
    states: BTreeMap<StateId, DfaState>,
    start: StateId,
}

impl Dfa {
    pub fn state(&self, id: StateId) -> Option<&DfaState> {
        self.states.get(&id)
    }

    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.keys().copied()
    }

    /// Every `(source, symbol, destination)` triple, ordered by source.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, char, StateId)> + '_ {
        self.states
            .values()
            .flat_map(|state| state.transitions.iter().map(move |(c, d)| (state.id, *c, *d)))
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        self.states.get(&id).is_some_and(|s| s.accepting)
    }

    pub fn accepting_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.values().filter(|s| s.accepting).map(|s| s.id)
    }

    /// The single state reached from `id` on `c`, if any.
    pub fn next(&self, id: StateId, c: char) -> Option<StateId> {
        self.states.get(&id)?.transitions.get(&c).copied()
    }

    pub fn accepts(&self, input: &str) -> bool {
        input
            .chars()
            .try_fold(self.start, |id, c| self.next(id, c))
            .is_some_and(|id| self.is_accepting(id))
    }
}

impl Display for Dfa {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "START: {}   TERM: [{}]",
            self.start,
            self.accepting_states().join(", ")
        )?;
        let lines = self
            .transitions()
            .map(|(src, c, dest)| format!("{src} --('{c}')--> {dest}"))
            .join("\n");
        write!(f, "{lines}")
    }
}

struct SubsetConstruction<'n> {
    nfa: &'n Nfa,
    /// Label to DFA id. Labels are sorted, so equal subsets share one key.
    seen: HashMap<Vec<StateId>, StateId>,
    states: BTreeMap<StateId, DfaState>,
    pending: VecDeque<StateId>,
}

impl<'n> SubsetConstruction<'n> {
    fn new(nfa: &'n Nfa) -> Self {
        Self {
            nfa,
            seen: HashMap::new(),
            states: BTreeMap::new(),
            pending: VecDeque::new(),
        }
    }

    /// Returns the id for `closure`, creating a pending state on first sight.
    fn intern(&mut self, closure: BTreeSet<StateId>) -> Result<StateId, InternalConstructionError> {
        let label = closure.into_iter().collect_vec();
        if let Some(&id) = self.seen.get(&label) {
            return Ok(id);
        }

        if let Some(missing) = label.iter().find(|&&s| self.nfa.state(s).is_none()) {
            return Err(InternalConstructionError::report(format!(
                "subset {label:?} references unknown NFA state {missing}"
            )));
        }

        let id = self.states.len();
        let accepting = label.binary_search(self.nfa.accept()).is_ok();
        log::trace!("DFA state {id} = {label:?}{}", if accepting { " (accepting)" } else { "" });

        self.seen.insert(label.clone(), id);
        self.states.insert(id, DfaState::new(id, label, accepting));
        self.pending.push_back(id);
        Ok(id)
    }

    fn run(mut self) -> Result<Dfa, InternalConstructionError> {
        let alphabet = self.nfa.alphabet();
        let start = self.intern(self.nfa.epsilon_closure([*self.nfa.start()]))?;

        while let Some(id) = self.pending.pop_front() {
            let label = self
                .states
                .get(&id)
                .map(|s| s.label.clone())
                .ok_or_else(|| InternalConstructionError::report(format!("lost DFA state {id}")))?;

            let mut transitions = BTreeMap::new();
            for &c in &alphabet {
                let moved = self.nfa.step(&label, c);
                if moved.is_empty() {
                    continue;
                }
                let dest = self.intern(self.nfa.epsilon_closure(moved))?;
                transitions.insert(c, dest);
            }

            if let Some(state) = self.states.get_mut(&id) {
                state.transitions = transitions;
            }
        }

        log::debug!(
            "subset construction produced {} DFA states from {} NFA states",
            self.states.len(),
            self.nfa.states().len()
        );
        Ok(Dfa {
            states: self.states,
            start,
        })
    }
}

/// Subset construction. DFA ids are handed out in breadth-first discovery
/// order, so the start state is always `0`.
pub fn to_dfa(nfa: &Nfa) -> Result<Dfa, InternalConstructionError> {
    if nfa.is_empty() {
        log::debug!("NFA has no states; emitting a lone rejecting DFA state");
        return Ok(Dfa {
            states: BTreeMap::from([(0, DfaState::new(0, Vec::new(), false))]),
            start: 0,
        });
    }

    SubsetConstruction::new(nfa).run()
}
