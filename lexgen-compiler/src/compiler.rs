//! Top-level orchestration: macro expansion, DFA construction and table
//! emission, wired together behind one entry point.

use crate::ast::{LexerRule, Specification};
use crate::builder;
use crate::compiled::{CompiledRule, CompiledSpecification};
use crate::emit::{self, EmittedTables};
use crate::error::CompileErrors;
use crate::macros::{build_macro_env, lower_clause, MacroEnv};

use lexgen_automata::{Regex, Universe};

use rayon::prelude::*;

use tracing::{info, instrument};

/// Everything [`compile`] produces from a specification: every rule's
/// compiled DFA plus, when requested, the combined tables' Rust
/// rendering.
#[derive(Debug)]
pub struct CompilationOutput {
    /// Every rule, compiled, in declaration order.
    pub dfa: CompiledSpecification,
    /// The flat transition/action tables, and their Rust rendering when
    /// `CompilationOptions::emit_rust_source` was set.
    pub tables: EmittedTables,
}

/// Compiles a specification end to end: resolves macros, compiles every
/// rule's clauses into its own DFA, and emits the combined tables.
///
/// Rules compile in parallel via `rayon` — once [`build_macro_env`] has
/// fully resolved the macro environment, compiling one rule needs
/// nothing but read-only lookups into it and its own private
/// `CompilationState` (internal to [`builder::build`]), so there is no
/// shared mutable state for rules to contend over. Collecting a `rayon`
/// parallel map into a `Vec` preserves input order, so
/// `CompiledSpecification::rules` comes out in declaration order
/// regardless of which rule happens to finish compiling first.
#[instrument(level = "debug", skip(spec))]
pub fn compile(spec: &Specification) -> Result<CompilationOutput, CompileErrors> {
    let universe = spec.options.universe;

    let (env, mut macro_errors) = build_macro_env(spec);
    if !macro_errors.is_empty() {
        // Macro errors can leave every rule's patterns meaningless;
        // don't also report a cascade of undefined-macro errors per rule.
        return Err(macro_errors);
    }

    let compiled_rules: Vec<(String, Result<CompiledRule, CompileErrors>)> =
        spec.rules.par_iter().map(|rule| (rule.id.clone(), compile_rule(rule, &env, universe))).collect();

    let mut rules = Vec::with_capacity(compiled_rules.len());
    for (id, result) in compiled_rules {
        match result {
            Ok(compiled) => rules.push((id, compiled)),
            Err(errors) => macro_errors.extend(errors),
        }
    }

    if !macro_errors.is_empty() {
        return Err(macro_errors);
    }

    if spec.options.warn_on_overlapping_clauses {
        for (id, compiled) in &rules {
            for (state, set) in compiled.dfa.overlapping_states() {
                info!(rule = %id, state = state.0, clauses = ?set, "state accepts more than one clause");
            }
        }
    }

    let dfa = CompiledSpecification {
        header: spec.header.clone(),
        footer: spec.footer.clone(),
        rules,
        start_rule: spec.start_rule.clone(),
    };
    let tables = emit::emit(&dfa, spec);
    Ok(CompilationOutput { dfa, tables })
}

/// Lowers and builds one rule's DFA. Reads only from `env`, so this is
/// safe to invoke for every rule concurrently.
fn compile_rule(rule: &LexerRule, env: &MacroEnv, universe: Universe) -> Result<CompiledRule, CompileErrors> {
    let mut errors = CompileErrors::new();
    let mut clauses = Vec::with_capacity(rule.clauses.len());
    let mut clause_actions = Vec::with_capacity(rule.clauses.len());
    for clause in &rule.clauses {
        let (regex, clause_errors) = lower_clause(&clause.pattern, &rule.id, env, universe);
        errors.extend(clause_errors);
        clauses.push(regex.unwrap_or(Regex::Empty));
        clause_actions.push(clause.action.clone());
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    let dfa = builder::build(clauses, universe);
    Ok(CompiledRule { dfa, clause_actions })
}



// =============
// === Tests ===
// =============

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CompilationOptions, Clause, LexerPattern, MacroDef};

    fn clause(pattern: LexerPattern) -> Clause {
        Clause { pattern, action: String::new() }
    }

    fn spec_with(macros: Vec<MacroDef>, rules: Vec<LexerRule>, universe: Universe) -> Specification {
        Specification {
            header: None,
            footer: None,
            macros,
            start_rule: rules.first().map(|r| r.id.clone()).unwrap_or_default(),
            rules,
            options: CompilationOptions { universe, ..CompilationOptions::default() },
        }
    }

    #[test]
    fn compiles_a_two_rule_specification() {
        let spec = spec_with(
            vec![],
            vec![
                LexerRule { id: "IDENT".into(), parameters: vec![], clauses: vec![clause(LexerPattern::Plus(Box::new(LexerPattern::Character('a'))))] },
                LexerRule { id: "DIGIT".into(), parameters: vec![], clauses: vec![clause(LexerPattern::Character('0'))] },
            ],
            Universe::Ascii,
        );
        let output = compile(&spec).expect("should compile cleanly");
        assert_eq!(output.dfa.rules.len(), 2);
        assert!(output.dfa.rule("IDENT").is_some());
        assert!(output.dfa.rule("DIGIT").is_some());
    }

    #[test]
    fn reports_errors_from_every_rule_not_just_the_first() {
        let spec = spec_with(
            vec![],
            vec![
                LexerRule { id: "a".into(), parameters: vec![], clauses: vec![clause(LexerPattern::Macro("missing1".into()))] },
                LexerRule { id: "b".into(), parameters: vec![], clauses: vec![clause(LexerPattern::Macro("missing2".into()))] },
            ],
            Universe::Ascii,
        );
        let errors = compile(&spec).unwrap_err();
        assert_eq!(errors.0.len(), 2);
    }

    #[test]
    fn rules_sharing_a_macro_compile_independently_in_parallel() {
        let spec = spec_with(
            vec![MacroDef { name: "letter".into(), pattern: LexerPattern::CharacterRange(vec![('a', 'z')]) }],
            (0..8)
                .map(|i| LexerRule { id: format!("rule{i}"), parameters: vec![], clauses: vec![clause(LexerPattern::Macro("letter".into()))] })
                .collect(),
            Universe::Ascii,
        );
        let output = compile(&spec).expect("should compile cleanly");
        assert_eq!(output.dfa.rules.len(), 8);
        for (_, rule) in &output.dfa.rules {
            assert!(rule.dfa.accepting[rule.dfa.start.0].is_empty());
        }
    }

    #[test]
    fn header_and_footer_are_carried_through_verbatim() {
        let mut spec = spec_with(vec![], vec![LexerRule { id: "r".into(), parameters: vec![], clauses: vec![clause(LexerPattern::Character('a'))] }], Universe::Ascii);
        spec.header = Some("use std::fmt;".into());
        spec.footer = Some("// end".into());
        let output = compile(&spec).expect("should compile cleanly");
        assert_eq!(output.dfa.header.as_deref(), Some("use std::fmt;"));
        assert_eq!(output.dfa.footer.as_deref(), Some("// end"));
    }
}
