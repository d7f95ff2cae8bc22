//! Worklist construction of a DFA directly from Brzozowski derivatives,
//! rather than Thompson-construction followed by subset construction:
//! every state is a canonical [`RegularVector`], and the states reachable
//! from it are found by partitioning the input alphabet into derivative
//! classes instead of iterating one input symbol at a time.

use lexgen_automata::{DfaGraph, Regex, RegularVector, Universe};

use crate::compiled::{DfaStateId, RuleDfa};

use std::collections::{BTreeSet, HashMap, VecDeque};

use tracing::{debug, instrument, trace};

/// Builds the DFA for one rule's worth of clauses, where `clauses[i]` is
/// the (already macro-expanded) regex for the `i`-th clause in priority
/// order.
#[instrument(level = "debug", skip(clauses))]
pub fn build(clauses: Vec<Regex>, universe: Universe) -> RuleDfa {
    let mut state = CompilationState::new();
    let start_vector = RegularVector::new(clauses).canonicalize(universe);
    let start = state.vertex_for(&start_vector);

    while let Some(vector) = state.worklist.pop_front() {
        let source = *state.bimap.get(&vector).expect("worklist only holds vectors already in the bimap");
        let classes = vector.derivative_classes(universe);
        trace!(state = source.0, classes = classes.len(), "expanding state");
        for class in classes {
            if class.is_empty() {
                continue;
            }
            let representative = class.min_element().expect("checked non-empty above");
            let successor = vector.derivative(representative).canonicalize(universe);
            if is_dead(&successor) {
                // No clause can ever accept from here; leaving the
                // transition out of the graph means the same thing as
                // routing it to an unreachable reject state, without
                // having to keep one around.
                continue;
            }
            let target = state.vertex_for(&successor);
            state.graph.add_edge(source.0, target.0, class);
        }
    }

    debug!(states = state.graph.vertex_count(), "dfa construction complete");
    state.finish(start)
}

/// A vector every clause of which is `Regex::Empty` can never accept or
/// transition anywhere useful again.
fn is_dead(vector: &RegularVector) -> bool {
    vector.clauses().iter().all(|r| *r == Regex::Empty)
}

struct CompilationState {
    graph: DfaGraph,
    bimap: HashMap<RegularVector, DfaStateId>,
    worklist: VecDeque<RegularVector>,
}

impl CompilationState {
    fn new() -> Self {
        CompilationState {
            graph: DfaGraph::new(),
            bimap: HashMap::new(),
            worklist: VecDeque::new(),
        }
    }

    /// The id for `vector`'s state, creating and enqueueing it on first
    /// sight.
    fn vertex_for(&mut self, vector: &RegularVector) -> DfaStateId {
        if let Some(&id) = self.bimap.get(vector) {
            return id;
        }
        let id = DfaStateId(self.graph.create_vertex());
        self.bimap.insert(vector.clone(), id);
        self.worklist.push_back(vector.clone());
        id
    }

    fn finish(self, start: DfaStateId) -> RuleDfa {
        let mut accepting = vec![BTreeSet::new(); self.graph.vertex_count()];
        for (vector, id) in &self.bimap {
            accepting[id.0] = vector.accepting();
        }
        RuleDfa { graph: self.graph, start, accepting }
    }
}



// =============
// === Tests ===
// =============

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(c: char) -> Regex {
        Regex::Character(c as u32)
    }

    #[test]
    fn single_character_rule_has_two_states() {
        let compiled = build(vec![ch('a')], Universe::Ascii);
        assert_eq!(compiled.graph.vertex_count(), 2);
        assert!(compiled.accepting[compiled.start.0].is_empty());
        let (target, label) = compiled.graph.outgoing(compiled.start.0).next().expect("one transition out of start");
        assert!(label.contains('a' as u32));
        assert_eq!(compiled.accepting[target], BTreeSet::from([0]));
    }

    #[test]
    fn star_of_character_loops_back_to_its_own_accepting_state() {
        let compiled = build(vec![ch('a').star()], Universe::Ascii);
        // ε is already accepted, and deriving by 'a' returns to the same
        // canonical vector, so `a*` needs exactly one state.
        assert_eq!(compiled.graph.vertex_count(), 1);
        assert_eq!(compiled.accepting[compiled.start.0], BTreeSet::from([0]));
        let (target, _) = compiled.graph.outgoing(compiled.start.0).next().unwrap();
        assert_eq!(target, compiled.start.0);
    }

    #[test]
    fn two_clause_rule_keeps_both_accepting_indices_when_they_overlap() {
        // Both clauses accept exactly the same one-character language, so
        // their shared accepting state should list both clause indices.
        let compiled = build(vec![ch('a'), ch('a')], Universe::Ascii);
        let (target, _) = compiled.graph.outgoing(compiled.start.0).next().unwrap();
        assert_eq!(compiled.accepting[target], BTreeSet::from([0, 1]));
        assert_eq!(compiled.winning_clause(DfaStateId(target)), Some(0));
        assert!(compiled.has_overlapping_clauses(DfaStateId(target)));
    }

    #[test]
    fn digit_plus_collapses_to_two_states() {
        use lexgen_automata::CharSet;
        let digit = Regex::char_set(CharSet::from_ranges([(u32::from(b'0'), u32::from(b'9'))]));
        let digit_plus = Regex::concat(digit.clone(), digit.star());
        let compiled = build(vec![digit_plus], Universe::Ascii);
        assert_eq!(compiled.graph.vertex_count(), 2);
    }
}
