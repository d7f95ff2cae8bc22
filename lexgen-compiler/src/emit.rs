//! Table emission: flattens a [`CompiledSpecification`]'s per-rule DFAs
//! into one combined set of dense arrays a generated lexer's driver loop
//! indexes into directly, and optionally renders them as Rust source.

use crate::ast::Specification;
use crate::compiled::CompiledSpecification;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// No transition is defined for this (state, code point) pair; the
/// driver loop treats it as a reject.
pub const SENTINEL: u16 = u16::MAX;

/// Where one rule's states begin in the combined tables, and which
/// combined state is its start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleLayout {
    pub id: String,
    pub state_offset: u16,
    pub start: u16,
}

/// The dense tables a generated lexer indexes into at runtime, plus
/// their Rust source rendering when requested.
///
/// Every rule's local DFA states are laid out contiguously, offset by
/// the cumulative state count of every earlier rule (declaration
/// order), so the whole specification shares one combined transition
/// array. Clause indices in `actions` stay rule-local, unchanged from
/// `RuleDfa::accepting` — only state ids are combined.
#[derive(Debug)]
pub struct EmittedTables {
    /// `transitions[state * alphabet_size + code_point]` is the next
    /// combined state, or [`SENTINEL`] if there is none.
    pub transitions: Vec<u16>,
    /// `actions[state]` is the winning (lowest-index) clause accepted at
    /// that state, local to whichever rule the state belongs to, or
    /// `None` if the state does not accept.
    pub actions: Vec<Option<u32>>,
    /// The number of code points each state's row spans: one past the
    /// highest code point actually appearing on any edge across every
    /// rule, not the full width of the compilation universe.
    pub alphabet_size: usize,
    /// Each rule's offset and start state in the combined tables, in
    /// declaration order.
    pub rule_layout: Vec<RuleLayout>,
    /// Rendered Rust source for the above, when
    /// `CompilationOptions::emit_rust_source` was set; `None` otherwise.
    pub source: Option<TokenStream>,
}

impl EmittedTables {
    /// The combined start state of rule `id`, if it exists.
    pub fn start_of(&self, id: &str) -> Option<u16> {
        self.rule_layout.iter().find(|layout| layout.id == id).map(|layout| layout.start)
    }
}

/// Flattens every rule's transition graph into one set of row-major
/// dense tables, and renders them as Rust source if
/// `spec.options.emit_rust_source` asks for it.
///
/// `alphabet_size` is derived from the edges actually present rather
/// than `spec.options.universe`'s full width: a specification compiled
/// in Unicode mode but whose rules only ever transition on ASCII
/// punctuation has no reason to pay for 65536-wide rows.
pub fn emit(dfa: &CompiledSpecification, spec: &Specification) -> EmittedTables {
    let max_char = dfa
        .rules
        .iter()
        .flat_map(|(_, rule)| rule.dfa.graph.edges())
        .flat_map(|(_, label)| label.ranges().iter().map(|&(_, hi)| hi))
        .max();
    let alphabet_size = max_char.map_or(0, |m| m as usize + 1);
    let total_states: usize = dfa.rules.iter().map(|(_, rule)| rule.dfa.graph.vertex_count()).sum();

    assert!(
        total_states <= usize::from(SENTINEL),
        "combined dfa has more states than the dense table's u16 index space can hold"
    );

    let mut transitions = vec![SENTINEL; total_states * alphabet_size];
    let mut actions = vec![None; total_states];
    let mut rule_layout = Vec::with_capacity(dfa.rules.len());

    let mut offset = 0usize;
    for (id, compiled) in &dfa.rules {
        let state_count = compiled.dfa.graph.vertex_count();
        for (&(source, target), label) in compiled.dfa.graph.edges() {
            for &(lo, hi) in label.ranges() {
                for code_point in lo..=hi {
                    transitions[(offset + source) * alphabet_size + code_point as usize] = (offset + target) as u16;
                }
            }
        }
        for local_state in 0..state_count {
            actions[offset + local_state] =
                compiled.dfa.winning_clause(crate::compiled::DfaStateId(local_state)).map(|c| c as u32);
        }
        rule_layout.push(RuleLayout {
            id: id.clone(),
            state_offset: offset as u16,
            start: (offset + compiled.dfa.start.0) as u16,
        });
        offset += state_count;
    }

    let source = if spec.options.emit_rust_source {
        Some(render(&transitions, &actions, alphabet_size, &rule_layout, dfa))
    } else {
        None
    };

    EmittedTables { transitions, actions, alphabet_size, rule_layout, source }
}

/// Renders the combined tables, plus the carried-through header/footer
/// and per-clause actions, as a `static` Rust module.
///
/// Header, footer and action fragments are opaque text handed to the
/// compiler from the (out-of-scope) parser collaborator; each is parsed
/// with `syn` to fold it into a well-formed `TokenStream` and spliced
/// back in with `quote!`. A fragment that doesn't parse as the syntax
/// category it was expected to still needs to reach the output somehow
/// (this renderer is explicitly best-effort, not a validator), so it
/// falls back to pasting the raw text as a token stream.
fn render(
    transitions: &[u16],
    actions: &[Option<u32>],
    alphabet_size: usize,
    rule_layout: &[RuleLayout],
    dfa: &CompiledSpecification,
) -> TokenStream {
    let sentinel = SENTINEL;
    let transitions_lit = transitions.iter().copied();
    let actions_lit = actions.iter().map(|a| match a {
        Some(c) => quote! { ::core::option::Option::Some(#c) },
        None => quote! { ::core::option::Option::None },
    });
    let alphabet_size_ident = format_ident!("ALPHABET_SIZE");
    let state_count = actions.len();

    let header = dfa.header.as_deref().map(parse_fragment).unwrap_or_default();
    let footer = dfa.footer.as_deref().map(parse_fragment).unwrap_or_default();

    let rule_consts = rule_layout.iter().map(|layout| {
        let const_name = format_ident!("{}_START", layout.id.to_uppercase());
        let start = layout.start;
        quote! {
            /// Combined start state for this rule.
            pub const #const_name: u16 = #start;
        }
    });

    let rule_dispatch = dfa.rules.iter().map(|(id, compiled)| {
        let fn_name = format_ident!("dispatch_{}", id.to_lowercase());
        let arms = compiled.clause_actions.iter().enumerate().map(|(clause, action)| {
            let clause = clause as u32;
            let body = parse_fragment(action);
            quote! { #clause => { #body } }
        });
        quote! {
            /// Runs the action for the clause accepted by rule `#id`.
            pub fn #fn_name(clause: u32) {
                match clause {
                    #(#arms)*
                    _ => unreachable!("clause index out of range for this rule"),
                }
            }
        }
    });

    quote! {
        #header

        /// Dense transition and action tables for the generated lexer.
        pub mod lexer_tables {
            /// No transition is defined; the driver treats this as a reject.
            pub const SENTINEL: u16 = #sentinel;
            /// The number of code points each state's row spans.
            pub const #alphabet_size_ident: usize = #alphabet_size;
            /// The number of DFA states across every rule, combined.
            pub const STATE_COUNT: usize = #state_count;
            #(#rule_consts)*
            /// `TRANSITIONS[state * ALPHABET_SIZE + code_point]` is the next
            /// state, or `SENTINEL` if there is none.
            pub static TRANSITIONS: [u16; #state_count * #alphabet_size] = [#(#transitions_lit),*];
            /// `ACTIONS[state]` is the winning clause index accepted at that
            /// state (local to its rule), or `None` if the state does not accept.
            pub static ACTIONS: [::core::option::Option<u32>; #state_count] = [#(#actions_lit),*];
        }

        #(#rule_dispatch)*

        #footer
    }
}

/// Parses an opaque action-code fragment as a sequence of Rust items via
/// `syn`, falling back to a raw token-stream parse if it isn't one (a
/// fragment may just as well be a bare expression or statement list).
fn parse_fragment(text: &str) -> TokenStream {
    if let Ok(file) = syn::parse_str::<syn::File>(text) {
        let items = file.items;
        return quote! { #(#items)* };
    }
    text.parse().unwrap_or_else(|_| quote! { compile_error!("malformed action fragment") })
}



// =============
// === Tests ===
// =============
