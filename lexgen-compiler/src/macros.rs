//! Macro expansion and pattern lowering: turns the surface
//! [`crate::ast::LexerPattern`] tree — which may reference named macros,
//! sugar and constructs the core regex algebra doesn't know about — into
//! the [`Regex`] values the automata layer operates on.
//!
//! Diagnostics accumulate rather than abort. A macro found to be bad
//! (duplicated, recursively defined, or itself referencing a bad or
//! undefined macro) is recorded once and then tainted: every later use
//! of it resolves to `None` silently, so a single root problem produces
//! one diagnostic instead of one per use site.
//!
//! Macro resolution ([`build_macro_env`]) is inherently sequential — a
//! macro's body can forward-reference another macro anywhere in the
//! declaration list, so resolving it is a stateful, cycle-tracking walk.
//! Once that pass is done, every macro name is either resolved or known
//! bad, and lowering one clause's pattern ([`lower_clause`]) only ever
//! needs a read of that fixed environment — independent of every other
//! clause and rule, and safe to run concurrently.

use crate::ast::{Clause, LexerPattern, LexerRule, Specification};
use crate::error::{CompileError, CompileErrors};
use crate::unicode::{self, UnicodeCategory};

use lexgen_automata::{CharSet, Regex, Universe};

use std::collections::{HashMap, HashSet};



// ================
// == MacroEnv ====
// ================

/// Every macro name known after [`build_macro_env`] has run, resolved to
/// its expanded `Regex`, plus the set of names that turned out bad.
#[derive(Clone, Debug, Default)]
pub struct MacroEnv {
    resolved: HashMap<String, Regex>,
    bad: HashSet<String>,
    declared: HashSet<String>,
}

impl MacroEnv {
    /// The outcome of looking a macro name up in this environment.
    fn get(&self, name: &str) -> MacroLookup {
        if let Some(r) = self.resolved.get(name) {
            MacroLookup::Ok(r.clone())
        } else if self.bad.contains(name) || self.declared.contains(name) {
            MacroLookup::Tainted
        } else {
            MacroLookup::Undefined
        }
    }
}

enum MacroLookup {
    Ok(Regex),
    /// Known bad already; a diagnostic for it was already recorded.
    Tainted,
    /// Never declared at all.
    Undefined,
}

/// Resolves every macro declared in `spec`, detecting duplicate,
/// recursive and undefined names as it goes.
pub fn build_macro_env(spec: &Specification) -> (MacroEnv, CompileErrors) {
    let mut resolver = Resolver::new(spec);
    for def in &spec.macros {
        resolver.resolve(&def.name, &mut Vec::new());
    }
    let declared = spec.macros.iter().map(|d| d.name.clone()).collect();
    let env = MacroEnv { resolved: resolver.resolved, bad: resolver.bad, declared };
    (env, resolver.errors)
}

/// Lowers one clause's pattern against an already-built `MacroEnv`. Pure
/// with respect to `env` — the only mutable state is the `CompileErrors`
/// this call accumulates into, which is local to the caller, so this is
/// safe to call for every clause of every rule in parallel.
pub fn lower_clause(pattern: &LexerPattern, used_by: &str, env: &MacroEnv, universe: Universe) -> (Option<Regex>, CompileErrors) {
    let mut errors = CompileErrors::new();
    let regex = lower(pattern, used_by, env, universe, &mut errors);
    (regex, errors)
}

/// One rule's clauses, lowered to the core regex IR, aligned by index
/// to [`LexerRule::clauses`]. A clause whose pattern could not be
/// lowered (its macro was undefined, it used `EndOfFile`, ...) is
/// represented as `Regex::Empty`; the reason is recorded separately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreprocessedRule {
    pub id: String,
    pub clauses: Vec<Regex>,
}

/// Expands macros and lowers every rule's clauses to the core regex IR,
/// sequentially. [`crate::compiler::compile`] uses [`build_macro_env`]
/// and [`lower_clause`] directly instead, to lower clauses in parallel
/// across rules.
pub fn preprocess(spec: &Specification) -> (Vec<PreprocessedRule>, CompileErrors) {
    let (env, mut errors) = build_macro_env(spec);
    let rules = spec
        .rules
        .iter()
        .map(|rule| {
            let clauses = lower_rule_clauses(rule, &env, spec.options.universe, &mut errors);
            PreprocessedRule { id: rule.id.clone(), clauses }
        })
        .collect();
    (rules, errors)
}

fn lower_rule_clauses(rule: &LexerRule, env: &MacroEnv, universe: Universe, errors: &mut CompileErrors) -> Vec<Regex> {
    rule.clauses
        .iter()
        .map(|clause: &Clause| {
            let (regex, clause_errors) = lower_clause(&clause.pattern, &rule.id, env, universe);
            errors.extend(clause_errors);
            regex.unwrap_or(Regex::Empty)
        })
        .collect()
}

/// Lowers a surface pattern to the core regex IR against `env`, reporting
/// every diagnosable problem it contains (not just the first) into
/// `errors`. Shared by [`Resolver::lower`] (which additionally knows how
/// to resolve a macro it hasn't seen yet) and [`lower_clause`] (which
/// only ever looks a macro up, since by the time a clause is lowered
/// every macro is already resolved or tainted).
fn lower(pattern: &LexerPattern, used_by: &str, env: &MacroEnv, universe: Universe, errors: &mut CompileErrors) -> Option<Regex> {
    match pattern {
        LexerPattern::Epsilon => Some(Regex::Epsilon),
        LexerPattern::Empty => Some(Regex::Empty),
        LexerPattern::Any => Some(Regex::char_set(universe.full_set())),

        LexerPattern::Character(c) => lower_character(*c, used_by, universe, errors),

        LexerPattern::CharacterRange(ranges) => {
            let mut set = CharSet::empty();
            let mut all_in_universe = true;
            for &(lo, hi) in ranges {
                if is_valid_literal(lo as u32, universe) && is_valid_literal(hi as u32, universe) {
                    set = set.add(lo as u32, hi as u32);
                } else {
                    errors.push(CompileError::UnicodeInAsciiMode {
                        character: if is_valid_literal(lo as u32, universe) { hi } else { lo },
                        used_by: used_by.to_string(),
                    });
                    all_in_universe = false;
                }
            }
            if all_in_universe { Some(Regex::char_set(set)) } else { None }
        },

        LexerPattern::UnicodeCategory(name) => {
            if universe != Universe::Unicode {
                errors.push(CompileError::UnicodeInAsciiMode { character: '\u{80}', used_by: used_by.to_string() });
                return None;
            }
            match UnicodeCategory::parse(name) {
                Some(category) => Some(Regex::char_set(unicode::category_set(category, universe))),
                None => {
                    errors.push(CompileError::UnknownUnicodeCategory { category: name.clone(), used_by: used_by.to_string() });
                    None
                },
            }
        },

        LexerPattern::Macro(name) => match env.get(name) {
            MacroLookup::Ok(r) => Some(r),
            MacroLookup::Tainted => None,
            MacroLookup::Undefined => {
                errors.push(CompileError::UndefinedMacro { name: name.clone(), used_by: used_by.to_string() });
                None
            },
        },

        LexerPattern::Concat(a, b) => lower_pair(a, b, used_by, env, universe, errors, Regex::concat),
        LexerPattern::Or(a, b) => lower_pair(a, b, used_by, env, universe, errors, Regex::or),
        LexerPattern::And(a, b) => lower_pair(a, b, used_by, env, universe, errors, Regex::and),

        LexerPattern::Negate(r) => lower(r, used_by, env, universe, errors).map(Regex::negate),
        LexerPattern::Star(r) => lower(r, used_by, env, universe, errors).map(Regex::star),

        LexerPattern::Plus(r) => {
            // r+ = r·r*
            lower(r, used_by, env, universe, errors).map(|r| Regex::concat(r.clone(), r.star()))
        },
        LexerPattern::Optional(r) => {
            // r? = ε|r
            lower(r, used_by, env, universe, errors).map(|r| Regex::or(Regex::Epsilon, r))
        },

        LexerPattern::Repetition(..) => {
            errors.push(CompileError::UnsupportedRepetition { used_by: used_by.to_string() });
            None
        },
        LexerPattern::EndOfFile => {
            errors.push(CompileError::EndOfFileInRegex { used_by: used_by.to_string() });
            None
        },
    }
}

/// The 7-bit ASCII boundary a literal character or range endpoint must
/// stay within when compiling in ASCII mode. Deliberately independent of
/// `Universe::max_code_point`: the ASCII universe itself spans a full
/// byte (`0x00..=0xFF`, so `Any`/`Negate` cover all 256 code points), but
/// a literal written directly in a pattern is still checked against true
/// ASCII, per the surface language's own rules.
const ASCII_LITERAL_MAX: u32 = 0x7F;

fn is_valid_literal(code_point: u32, universe: Universe) -> bool {
    match universe {
        Universe::Ascii => code_point <= ASCII_LITERAL_MAX,
        Universe::Unicode => universe.contains(code_point),
    }
}

fn lower_character(c: char, used_by: &str, universe: Universe, errors: &mut CompileErrors) -> Option<Regex> {
    if is_valid_literal(c as u32, universe) {
        Some(Regex::Character(c as u32))
    } else {
        errors.push(CompileError::UnicodeInAsciiMode { character: c, used_by: used_by.to_string() });
        None
    }
}

#[allow(clippy::too_many_arguments)]
fn lower_pair(
    a: &LexerPattern,
    b: &LexerPattern,
    used_by: &str,
    env: &MacroEnv,
    universe: Universe,
    errors: &mut CompileErrors,
    join: fn(Regex, Regex) -> Regex,
) -> Option<Regex> {
    // Both sides are lowered unconditionally so a problem in `a` doesn't
    // hide one in `b`.
    let a2 = lower(a, used_by, env, universe, errors);
    let b2 = lower(b, used_by, env, universe, errors);
    match (a2, b2) {
        (Some(a2), Some(b2)) => Some(join(a2, b2)),
        _ => None,
    }
}



// ================
// == Resolver ====
// ================

/// Builds a [`MacroEnv`] by resolving every declared macro, tracking the
/// chain of names currently being expanded so a reference cycle can be
/// reported instead of recursing forever.
struct Resolver {
    by_name: HashMap<String, LexerPattern>,
    universe: Universe,
    bad: HashSet<String>,
    resolved: HashMap<String, Regex>,
    errors: CompileErrors,
}

impl Resolver {
    fn new(spec: &Specification) -> Self {
        let mut errors = CompileErrors::new();
        let mut seen = HashSet::new();
        let mut bad = HashSet::new();
        for def in &spec.macros {
            if !seen.insert(def.name.clone()) {
                errors.push(CompileError::DuplicateMacro { name: def.name.clone() });
                bad.insert(def.name.clone());
            }
        }
        // A duplicated name's last declaration overwrites earlier ones in
        // `by_name`; harmless, since the name is already tainted and its
        // resolution will never be trusted downstream.
        let by_name = spec.macros.iter().map(|d| (d.name.clone(), d.pattern.clone())).collect();
        Resolver { by_name, universe: spec.options.universe, bad, resolved: HashMap::new(), errors }
    }

    /// Resolves macro `name` to a `Regex`, expanding and caching it on
    /// first use. `path` is the chain of macros currently being resolved,
    /// used to detect and report a reference cycle.
    fn resolve(&mut self, name: &str, path: &mut Vec<String>) -> Option<Regex> {
        if let Some(r) = self.resolved.get(name) {
            return Some(r.clone());
        }
        if self.bad.contains(name) {
            return None;
        }
        if let Some(start) = path.iter().position(|n| n == name) {
            let mut cycle = path[start..].to_vec();
            cycle.push(name.to_string());
            self.errors.push(CompileError::RecursiveMacro { name: name.to_string(), cycle });
            self.bad.insert(name.to_string());
            return None;
        }
        let pattern = match self.by_name.get(name) {
            Some(p) => p.clone(),
            None => return None, // caller reports UndefinedMacro, not us
        };
        path.push(name.to_string());
        let regex = self.lower(&pattern, name, path);
        path.pop();
        if let Some(r) = &regex {
            self.resolved.insert(name.to_string(), r.clone());
        } else {
            self.bad.insert(name.to_string());
        }
        regex
    }

    /// Like [`lower`], but a `Macro` reference triggers recursive,
    /// cycle-tracked resolution instead of a flat environment lookup —
    /// needed here because a macro body may forward-reference a macro
    /// this pass hasn't resolved yet.
    fn lower(&mut self, pattern: &LexerPattern, used_by: &str, path: &mut Vec<String>) -> Option<Regex> {
        if let LexerPattern::Macro(name) = pattern {
            if self.bad.contains(name) {
                return None; // tainted: already reported once, suppress the cascade
            }
            let resolved = self.resolve(name, path);
            if resolved.is_none() && !self.by_name.contains_key(name.as_str()) {
                self.errors.push(CompileError::UndefinedMacro { name: name.clone(), used_by: used_by.to_string() });
                self.bad.insert(name.clone());
            }
            return resolved;
        }
        // Every other variant has no macro-resolution concern, so it's
        // lowered the same way a clause's pattern would be; macro bodies
        // already resolved so far are visible through `self.as_env()`.
        lower(pattern, used_by, &self.as_env(), self.universe, &mut self.errors)
    }

    fn as_env(&self) -> MacroEnv {
        MacroEnv { resolved: self.resolved.clone(), bad: self.bad.clone(), declared: HashSet::new() }
    }
}



// =============
// === Tests ===
// =============
