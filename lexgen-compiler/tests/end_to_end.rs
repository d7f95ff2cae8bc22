//! End-to-end compilation scenarios driving a `Specification` all the
//! way through `compile` to its emitted tables.

use lexgen_compiler::{
    compile, CompilationOptions, Clause, CompileError, LexerPattern, LexerRule, MacroDef, Specification, Universe,
    SENTINEL,
};

fn spec(macros: Vec<MacroDef>, rules: Vec<LexerRule>, universe: Universe) -> Specification {
    Specification {
        header: None,
        footer: None,
        macros,
        start_rule: rules.first().map(|r| r.id.clone()).unwrap_or_default(),
        rules,
        options: CompilationOptions { universe, ..CompilationOptions::default() },
    }
}

fn rule(id: &str, clauses: Vec<LexerPattern>) -> LexerRule {
    LexerRule {
        id: id.to_string(),
        parameters: vec![],
        clauses: clauses.into_iter().map(|pattern| Clause { pattern, action: String::new() }).collect(),
    }
}

fn ch(c: char) -> LexerPattern {
    LexerPattern::Character(c)
}

fn lit(s: &str) -> LexerPattern {
    s.chars().map(ch).reduce(|a, b| LexerPattern::Concat(Box::new(a), Box::new(b))).expect("non-empty literal")
}

// Scenario 1: `RULE r = PARSE 'a' { A }` -> one rule, two DFA states.
#[test]
fn single_character_rule_has_exactly_one_live_transition() {
    let spec = spec(vec![], vec![rule("r", vec![ch('a')])], Universe::Ascii);
    let output = compile(&spec).expect("should compile cleanly");
    let compiled = output.dfa.rule("r").expect("rule r was compiled");

    assert_eq!(compiled.dfa.graph.vertex_count(), 2);

    let start = output.tables.start_of("r").expect("rule r has a start state") as usize;
    let alphabet = output.tables.alphabet_size;
    let accept_state = output.tables.transitions[start * alphabet + 'a' as usize];
    assert_ne!(accept_state, SENTINEL);
    assert_eq!(output.tables.actions[accept_state as usize], Some(0));

    // every other input from the start state is a reject
    for c in 0..alphabet {
        if c == 'a' as usize {
            continue;
        }
        assert_eq!(output.tables.transitions[start * alphabet + c], SENTINEL);
    }
}

// Scenario 2: `RULE r = PARSE "ab" { A } | 'a' { B }` -> three states;
// "a" alone accepts clause 1, "ab" accepts clause 0 (longest match,
// clause priority breaks same-state ties).
#[test]
fn longest_match_prefers_the_longer_clause_at_its_own_state() {
    let spec = spec(vec![], vec![rule("r", vec![lit("ab"), ch('a')])], Universe::Ascii);
    let output = compile(&spec).expect("should compile cleanly");
    let compiled = output.dfa.rule("r").expect("rule r was compiled");

    assert_eq!(compiled.dfa.graph.vertex_count(), 3);

    let alphabet = output.tables.alphabet_size;
    let start = output.tables.start_of("r").expect("rule r has a start state") as usize;
    let after_a = output.tables.transitions[start * alphabet + 'a' as usize];
    assert_ne!(after_a, SENTINEL);
    // "a" alone is accepting: clause 1 (the literal 'a' clause) wins here,
    // since clause 0 ("ab") hasn't finished matching yet.
    assert_eq!(output.tables.actions[after_a as usize], Some(1));

    let after_ab = output.tables.transitions[after_a as usize * alphabet + 'b' as usize];
    assert_ne!(after_ab, SENTINEL);
    assert_eq!(output.tables.actions[after_ab as usize], Some(0));
}

// Scenario 3: `LET digit = ['0'-'9']`, `RULE r = PARSE digit+ { NUM }`
// -> two states after canonicalization (start, and a single looping
// accept state).
#[test]
fn digit_plus_canonicalizes_to_two_states() {
    let spec = spec(
        vec![MacroDef { name: "digit".into(), pattern: LexerPattern::CharacterRange(vec![('0', '9')]) }],
        vec![rule("r", vec![LexerPattern::Plus(Box::new(LexerPattern::Macro("digit".into())))])],
        Universe::Ascii,
    );
    let output = compile(&spec).expect("should compile cleanly");
    let compiled = output.dfa.rule("r").expect("rule r was compiled");
    assert_eq!(compiled.dfa.graph.vertex_count(), 2);

    let alphabet = output.tables.alphabet_size;
    let start = output.tables.start_of("r").expect("rule r has a start state") as usize;
    let accept = output.tables.transitions[start * alphabet + '5' as usize];
    assert_ne!(accept, SENTINEL);
    assert_eq!(output.tables.actions[accept as usize], Some(0));
    // the accept state loops back to itself on any further digit
    assert_eq!(output.tables.transitions[accept as usize * alphabet + '9' as usize], accept);
}

// Scenario 4: duplicate macro name -> error, no DFA produced.
#[test]
fn duplicate_macro_definition_is_rejected() {
    let spec = spec(
        vec![
            MacroDef { name: "a".into(), pattern: ch('a') },
            MacroDef { name: "a".into(), pattern: ch('b') },
        ],
        vec![rule("r", vec![LexerPattern::Macro("a".into())])],
        Universe::Ascii,
    );
    let errors = compile(&spec).unwrap_err();
    assert!(errors.0.contains(&CompileError::DuplicateMacro { name: "a".into() }));
}

// Scenario 5: `LET m = m 'a'` -> RecursiveMacro("m").
#[test]
fn self_referential_macro_is_rejected() {
    let spec = spec(
        vec![MacroDef {
            name: "m".into(),
            pattern: LexerPattern::Concat(Box::new(LexerPattern::Macro("m".into())), Box::new(ch('a'))),
        }],
        vec![rule("r", vec![LexerPattern::Macro("m".into())])],
        Universe::Ascii,
    );
    let errors = compile(&spec).unwrap_err();
    assert!(errors.0.iter().any(|e| matches!(e, CompileError::RecursiveMacro { name, .. } if name == "m")));
}

// Scenario 6: Unicode off, `RULE r = PARSE 'é' { X }` -> UnicodeInAsciiMode.
#[test]
fn non_ascii_literal_is_rejected_outside_unicode_mode() {
    let spec = spec(vec![], vec![rule("r", vec![ch('é')])], Universe::Ascii);
    let errors = compile(&spec).unwrap_err();
    assert_eq!(errors.0, vec![CompileError::UnicodeInAsciiMode { character: 'é', used_by: "r".into() }]);
}

#[test]
fn the_same_literal_compiles_in_unicode_mode() {
    let spec = spec(vec![], vec![rule("r", vec![ch('é')])], Universe::Unicode);
    let output = compile(&spec).expect("unicode mode accepts non-ASCII literals");
    let compiled = output.dfa.rule("r").expect("rule r was compiled");
    assert_eq!(compiled.dfa.graph.vertex_count(), 2);
}
