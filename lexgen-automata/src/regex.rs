use crate::charset::CharSet;
use crate::universe::Universe;



// ===========
// == Regex ==
// ===========

/// A regular expression, as built by macro expansion and rule validation.
///
/// Before canonicalization (`Regex::canonicalize`), a `Regex` tree may
/// violate every invariant listed below; after canonicalization it never
/// does.
///
/// Canonical-form invariants (enforced only by [`Regex::canonicalize`]):
/// - `CharacterSet(s)` appears only when `s.count() >= 2`; sets of size
///   0/1 are rewritten to `Empty`/`Character`.
/// - `Concat`, `Or` and `And` are left-associated.
/// - `Or` and `And` operands are in structural (derived `Ord`) order.
/// - The algebraic identities in the doc comments of `canonicalize` hold.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Regex {
    /// Matches the empty string only.
    Epsilon,
    /// Matches nothing; the unmatchable language.
    Empty,
    /// Matches any single symbol of the universe. Rewritten to
    /// `CharacterSet(U)` by `canonicalize`.
    Any,
    /// Matches exactly one code point.
    Character(u32),
    /// Matches exactly one code point out of a set.
    CharacterSet(CharSet),
    /// Matches any symbol sequence *not* matched by the inner regex.
    Negate(Box<Regex>),
    /// Matches zero or more repetitions of the inner regex.
    Star(Box<Regex>),
    /// Matches the first regex followed by the second.
    Concat(Box<Regex>, Box<Regex>),
    /// Matches either regex (union of languages).
    Or(Box<Regex>, Box<Regex>),
    /// Matches both regexes (intersection of languages).
    And(Box<Regex>, Box<Regex>),
}

use Regex::*;

impl Regex {
    /// Builds a `Concat` node from owned operands.
    pub fn concat(a: Regex, b: Regex) -> Regex {
        Concat(Box::new(a), Box::new(b))
    }

    /// Builds an `Or` node from owned operands.
    pub fn or(a: Regex, b: Regex) -> Regex {
        Or(Box::new(a), Box::new(b))
    }

    /// Builds an `And` node from owned operands.
    pub fn and(a: Regex, b: Regex) -> Regex {
        And(Box::new(a), Box::new(b))
    }

    /// Builds a `Star` node from an owned operand.
    pub fn star(self) -> Regex {
        Star(Box::new(self))
    }

    /// Builds a `Negate` node from an owned operand.
    pub fn negate(self) -> Regex {
        Negate(Box::new(self))
    }

    /// `CharacterSet(s)`, normalized to `Empty`/`Character` when `s` has
    /// fewer than two members.
    pub fn char_set(s: CharSet) -> Regex {
        match s.count() {
            0 => Empty,
            1 => Character(s.min_element().expect("count == 1 implies non-empty")),
            _ => CharacterSet(s),
        }
    }

    /// `true` iff the empty string is in the language of this regex.
    pub fn nullable(&self) -> bool {
        match self {
            Epsilon => true,
            Empty | Any | Character(_) | CharacterSet(_) => false,
            Negate(r) => !r.nullable(),
            Star(_) => true,
            Concat(a, b) => a.nullable() && b.nullable(),
            Or(a, b) => a.nullable() || b.nullable(),
            And(a, b) => a.nullable() && b.nullable(),
        }
    }

    /// The Brzozowski derivative of this regex with respect to symbol `a`.
    ///
    /// `a` is assumed to lie within the universe the regex was built
    /// against — the DFA builder only ever derives with respect to a
    /// representative of a derivative-class partition, which is always a
    /// subset of that universe.
    ///
    /// The result is *not* canonicalized; callers compare derivatives for
    /// equality only after calling `canonicalize`.
    pub fn derivative(&self, a: u32) -> Regex {
        match self {
            Epsilon | Empty => Empty,
            Any => Epsilon,
            Character(c) => if *c == a { Epsilon } else { Empty },
            CharacterSet(s) => if s.contains(a) { Epsilon } else { Empty },
            Negate(r) => r.derivative(a).negate(),
            Star(r) => Regex::concat(r.derivative(a), Star(r.clone())),
            Concat(r, s) => {
                let d_r_then_s = Regex::concat(r.derivative(a), (**s).clone());
                if r.nullable() {
                    Regex::or(d_r_then_s, s.derivative(a))
                } else {
                    d_r_then_s
                }
            },
            Or(r, s) => Regex::or(r.derivative(a), s.derivative(a)),
            And(r, s) => Regex::and(r.derivative(a), s.derivative(a)),
        }
    }

    /// Rewrites this regex to canonical form with respect to `universe`.
    ///
    /// Identities applied: `r·ε = ε·r = r`, `r·∅ = ∅·r = ∅`, `r∨∅ = r`,
    /// `r∧∅ = ∅`, `(r*)* = r*`, `ε* = ∅* = ε`, `¬¬r = r`, `¬∅ = Any`,
    /// `¬Any = ∅`. `r∨Any = Any` and `r∧Any = r` only hold when `r` is
    /// itself a `Character`/`CharacterSet`/`Any` atom — they are realized
    /// by folding sibling atoms of `Or`/`And` into a single `CharacterSet`
    /// via union/intersection, which leaves compound operands untouched
    /// and so never weakens `L(canonicalize(r, U)) = L(r)`.
    pub fn canonicalize(&self, universe: Universe) -> Regex {
        match self {
            Epsilon => Epsilon,
            Empty => Empty,
            Any => Regex::char_set(universe.full_set()),
            Character(c) => Character(*c),
            CharacterSet(s) => Regex::char_set(s.clone()),
            Negate(r) => {
                match r.canonicalize(universe) {
                    Empty => Regex::char_set(universe.full_set()), // ¬∅ = Any
                    r2 if is_full(&r2, universe) => Empty,         // ¬Any = ∅
                    Negate(inner) => *inner,                       // ¬¬r = r
                    r2 => r2.negate(),
                }
            },
            Star(r) => {
                match r.canonicalize(universe) {
                    r2 @ Star(_) => r2,             // (r*)* = r*
                    Epsilon | Empty => Epsilon,     // ε* = ∅* = ε
                    r2 => r2.star(),
                }
            },
            Concat(a, b) => {
                let a2 = a.canonicalize(universe);
                let b2 = b.canonicalize(universe);
                if a2 == Empty || b2 == Empty {
                    return Empty; // ∅·r = r·∅ = ∅
                }
                let terms: Vec<Regex> = a2
                    .as_concat_operands()
                    .into_iter()
                    .chain(b2.as_concat_operands())
                    .filter(|t| *t != Epsilon) // ε·r = r·ε = r
                    .collect();
                match terms.len() {
                    0 => Epsilon,
                    _ => terms.into_iter().reduce(Regex::concat).expect("non-empty"),
                }
            },
            Or(a, b) => {
                // `Empty` is `Or`'s true identity for *any* operand, atomic
                // or not, so it is always safe to drop from the flattened
                // term list outright.
                let terms = fold_charsets(
                    a.canonicalize(universe).as_or_operands(),
                    b.canonicalize(universe).as_or_operands(),
                    Some(Empty),
                    CharSet::union,
                );
                build_sorted_chain(terms, Empty, Regex::or)
            },
            And(a, b) => {
                let a2 = a.canonicalize(universe);
                let b2 = b.canonicalize(universe);
                if contains_empty(&a2) || contains_empty(&b2) {
                    return Empty; // r∧∅ = ∅
                }
                // No skip element here: unlike `Empty` for `Or`,
                // `CharacterSet(U)` is not a universal identity for `And`
                // (`r∧Any = r` only when `r` is itself an atom — Any
                // restricts a language to single-symbol strings, which
                // would wrongly discard a compound sibling like `a*` if
                // dropped unconditionally). Folding it as an ordinary
                // atom via `combine` already reduces to the identity
                // exactly when every other folded term is itself atomic,
                // and otherwise correctly stays in the chain as a real
                // constraint.
                let terms = fold_charsets(a2.as_and_operands(), b2.as_and_operands(), None, CharSet::intersect);
                build_sorted_chain(terms, Regex::char_set(universe.full_set()), Regex::and)
            },
        }
    }

    /// Flattens a right- or left-nested chain of `Concat` nodes into its
    /// operands, left to right. Unlike `as_or_operands`/`as_and_operands`
    /// this never sorts: concatenation order changes the language.
    fn as_concat_operands(self) -> Vec<Regex> {
        match self {
            Concat(a, b) => { let mut v = a.as_concat_operands(); v.extend(b.as_concat_operands()); v },
            other => vec![other],
        }
    }

    fn as_or_operands(self) -> Vec<Regex> {
        match self {
            Or(a, b) => { let mut v = a.as_or_operands(); v.extend(b.as_or_operands()); v },
            other => vec![other],
        }
    }

    fn as_and_operands(self) -> Vec<Regex> {
        match self {
            And(a, b) => { let mut v = a.as_and_operands(); v.extend(b.as_and_operands()); v },
            other => vec![other],
        }
    }
}

/// `true` for the nodes `canonicalize` collapses a `Negate` over `Empty`
/// down to: the canonical `CharacterSet`/`Character` form of `Any`.
fn is_full(r: &Regex, universe: Universe) -> bool {
    match r {
        CharacterSet(s) => *s == universe.full_set(),
        Character(_) => universe.max_code_point() == 0,
        _ => false,
    }
}

fn contains_empty(r: &Regex) -> bool {
    matches!(r, Empty)
}

/// Folds every `Character`/`CharacterSet` leaf in `terms` into a single
/// `CharacterSet` (via `combine`), leaving other terms untouched. `skip`,
/// when given, is a term that is dropped outright wherever it appears
/// instead of being folded — valid only when `skip` is a universal
/// identity for every possible sibling, atomic or not (true of `Or`'s
/// `Empty`, not of `And`'s `CharacterSet(U)`).
fn fold_charsets(
    a_terms: Vec<Regex>,
    b_terms: Vec<Regex>,
    skip: Option<Regex>,
    combine: impl Fn(&CharSet, &CharSet) -> CharSet,
) -> Vec<Regex> {
    let mut acc: Option<CharSet> = None;
    let mut rest = Vec::new();
    for term in a_terms.into_iter().chain(b_terms) {
        if skip.as_ref() == Some(&term) {
            continue;
        }
        let set = match &term {
            CharacterSet(s) => Some(s.clone()),
            Character(c) => Some(CharSet::singleton(*c)),
            _ => None,
        };
        match set {
            Some(s) => acc = Some(match acc {
                Some(a) => combine(&a, &s),
                None => s,
            }),
            None => rest.push(term),
        }
    }
    if let Some(s) = acc {
        rest.push(Regex::char_set(s));
    }
    rest
}

/// Sorts `terms` into the canonical structural order and folds them into
/// a left-associated chain with `join`. An empty `terms` collapses to
/// `empty_result` (the identity for the operator being folded).
fn build_sorted_chain(mut terms: Vec<Regex>, empty_result: Regex, join: fn(Regex, Regex) -> Regex) -> Regex {
    terms.sort();
    terms.dedup();
    match terms.len() {
        0 => empty_result,
        _ => terms.into_iter().reduce(join).expect("non-empty"),
    }
}

/// The derivative-class partition of `r` with respect to `universe`: a
/// finite set of (possibly empty) `CharSet`s such that any two symbols
/// drawn from the same class induce canonically-equal derivatives.
pub fn derivative_classes(r: &Regex, universe: Universe) -> Vec<CharSet> {
    match r {
        Epsilon | Empty => vec![universe.full_set()],
        Any => vec![universe.full_set(), CharSet::empty()],
        Character(c) => {
            let s = CharSet::singleton(*c);
            let complement = s.negate(universe);
            vec![s, complement]
        },
        CharacterSet(s) => vec![s.clone(), s.negate(universe)],
        Negate(r) => derivative_classes(r, universe),
        Star(r) => derivative_classes(r, universe),
        Concat(r, s) => {
            if r.nullable() {
                meet(&derivative_classes(r, universe), &derivative_classes(s, universe))
            } else {
                derivative_classes(r, universe)
            }
        },
        Or(r, s) | And(r, s) => {
            meet(&derivative_classes(r, universe), &derivative_classes(s, universe))
        },
    }
}

/// `{ x ∩ y | x ∈ a, y ∈ b }`.
fn meet(a: &[CharSet], b: &[CharSet]) -> Vec<CharSet> {
    let mut out = Vec::with_capacity(a.len() * b.len());
    for x in a {
        for y in b {
            out.push(x.intersect(y));
        }
    }
    out
}

// =============
// === Tests ===
// =============
