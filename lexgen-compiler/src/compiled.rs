use lexgen_automata::DfaGraph;

use std::collections::BTreeSet;



// ===============
// == RuleDfa =====
// ===============

/// A vertex id in a [`RuleDfa`]'s transition graph, local to that rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DfaStateId(pub usize);

/// The minimized-by-construction DFA one rule's clauses compile to.
///
/// `accepting` keeps the *full* set of clause indices each state accepts,
/// not just the winning (lowest-index) one — a state where more than one
/// clause is nullable is a legitimate, common situation (longest-match
/// still resolves it via clause priority), and keeping the whole set lets
/// an optional pass flag overlapping clauses as a diagnostic without
/// changing the table itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleDfa {
    /// The transition graph; vertex ids double as `DfaStateId`s.
    pub graph: DfaGraph,
    /// The start state.
    pub start: DfaStateId,
    /// `accepting[state.0]` is the set of clause indices that state
    /// accepts, empty if the state is non-accepting.
    pub accepting: Vec<BTreeSet<usize>>,
}

impl RuleDfa {
    /// The highest-priority (lowest index) clause accepted at `state`,
    /// if any.
    pub fn winning_clause(&self, state: DfaStateId) -> Option<usize> {
        self.accepting.get(state.0).and_then(|set| set.iter().next().copied())
    }

    /// Whether `state` accepts more than one clause at once.
    pub fn has_overlapping_clauses(&self, state: DfaStateId) -> bool {
        self.accepting.get(state.0).is_some_and(|set| set.len() > 1)
    }

    /// Every state with more than one accepting clause, paired with the
    /// full set of clauses it accepts.
    pub fn overlapping_states(&self) -> Vec<(DfaStateId, &BTreeSet<usize>)> {
        self.accepting
            .iter()
            .enumerate()
            .filter(|(_, set)| set.len() > 1)
            .map(|(id, set)| (DfaStateId(id), set))
            .collect()
    }
}



// ==================
// == CompiledRule ==
// ==================

/// One rule's compiled DFA plus the opaque action text for each of its
/// clauses, indexed the same way `dfa.accepting`'s clause indices are.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledRule {
    pub dfa: RuleDfa,
    pub clause_actions: Vec<String>,
}



// ===========================
// == CompiledSpecification ==
// ===========================

/// Every rule in a specification, compiled. Preserves declaration order
/// in `rules` regardless of the order rules finished compiling in,
/// since they are compiled independently in parallel.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CompiledSpecification {
    /// Opaque action-code text to splice above the generated scanner,
    /// carried through verbatim from the input specification.
    pub header: Option<String>,
    /// Opaque action-code text to splice below the generated scanner.
    pub footer: Option<String>,
    /// `(rule id, compiled rule)`, in declaration order.
    pub rules: Vec<(String, CompiledRule)>,
    /// The rule the generated scanner starts in.
    pub start_rule: String,
}

impl CompiledSpecification {
    /// The compiled rule named `id`, if any.
    pub fn rule(&self, id: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|(name, _)| name == id).map(|(_, rule)| rule)
    }
}
