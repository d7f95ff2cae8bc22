use lexgen_automata::Universe;



// ===================
// == Specification ==
// ===================

/// The external interface: everything a caller hands the compiler.
/// Surface parsing (turning source text into this shape) is out of
/// scope here; this is the first thing the compiler itself touches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Specification {
    /// Opaque action-code text spliced verbatim above the generated
    /// scanner. Never inspected by the compiler beyond carrying it
    /// through to the emitted source.
    pub header: Option<String>,
    /// Opaque action-code text spliced verbatim below the generated
    /// scanner.
    pub footer: Option<String>,
    /// Named pattern declarations available for substitution inside
    /// rules and other macros, in declaration order. A `Vec` rather than
    /// a map: preprocessing needs to see repeated names in order to
    /// diagnose them, not have them silently collapse.
    pub macros: Vec<MacroDef>,
    /// The lexer rules, in declaration order. Each compiles to its own
    /// independent DFA.
    pub rules: Vec<LexerRule>,
    /// The rule the generated scanner starts in.
    pub start_rule: String,
    /// Compiler-wide options that do not change table semantics.
    pub options: CompilationOptions,
}

/// One named macro declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MacroDef {
    /// The name other patterns refer to via `LexerPattern::Macro`.
    pub name: String,
    /// The macro's (not yet expanded) pattern.
    pub pattern: LexerPattern,
}

/// One named lexer rule: a list of alternative clauses, each a pattern
/// with its own action. Clause index in `clauses` is the clause's
/// priority (earlier wins ties) and the index the builder's accepting
/// sets and the emitter's action tables refer to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexerRule {
    /// The name other rules or the scanner driver refer to this rule by.
    pub id: String,
    /// Named parameters the rule's actions may refer to. Opaque to the
    /// compiler; carried through to the emitted source.
    pub parameters: Vec<String>,
    /// The rule's clauses, in priority order.
    pub clauses: Vec<Clause>,
}

/// One clause of a rule: a pattern plus the action it triggers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clause {
    /// The pattern this clause matches.
    pub pattern: LexerPattern,
    /// Opaque action-code text, spliced into the generated dispatch
    /// `match` verbatim.
    pub action: String,
}

/// A surface-level pattern, before macro expansion. `LexerPattern` is
/// richer than the core `Regex` IR: it still contains macro references,
/// sugar (`Plus`, `Optional`), and constructs (`Any`, `UnicodeCategory`,
/// `Repetition`, `EndOfFile`) macro expansion rewrites or rejects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexerPattern {
    /// Matches the empty string.
    Epsilon,
    /// Matches nothing.
    Empty,
    /// Matches any single symbol of the compilation universe.
    Any,
    /// Matches exactly one literal character.
    Character(char),
    /// Matches one character out of an explicit set of inclusive ranges.
    CharacterRange(Vec<(char, char)>),
    /// Matches one character from a named Unicode general category
    /// (e.g. `"Lu"`, `"Nd"`). Rejected outside Unicode mode.
    UnicodeCategory(String),
    /// A reference to a named macro, resolved during preprocessing.
    Macro(String),
    /// `r·s`.
    Concat(Box<LexerPattern>, Box<LexerPattern>),
    /// `r|s`.
    Or(Box<LexerPattern>, Box<LexerPattern>),
    /// `r&s`.
    And(Box<LexerPattern>, Box<LexerPattern>),
    /// `¬r`.
    Negate(Box<LexerPattern>),
    /// `r*`.
    Star(Box<LexerPattern>),
    /// `r+`, desugared to `r·r*` by preprocessing.
    Plus(Box<LexerPattern>),
    /// `r?`, desugared to `ε|r` by preprocessing.
    Optional(Box<LexerPattern>),
    /// `r{lo,hi}`. Always rejected with `UnsupportedRepetition`; no
    /// desugaring is attempted.
    Repetition(Box<LexerPattern>, u32, Option<u32>),
    /// The end-of-input pseudo-symbol. Always rejected with
    /// `EndOfFileInRegex` when it appears inside a regex operand.
    EndOfFile,
}

/// Options that tune *how* the compiler runs without changing the
/// semantics of the tables it produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilationOptions {
    /// The character universe rules and macros are validated and
    /// compiled against.
    pub universe: Universe,
    /// Whether the combined table should also be rendered as Rust
    /// source (a `proc_macro2::TokenStream`) by the code-emitting
    /// collaborator.
    pub emit_rust_source: bool,
    /// Whether to additionally diagnose clauses whose languages overlap
    /// even though the earlier clause always wins ties. Purely
    /// informational; never changes the produced table.
    pub warn_on_overlapping_clauses: bool,
    /// Whether compilation emits `tracing` spans/events at `trace`
    /// level in addition to `debug`. Ambient, non-semantic.
    pub trace: bool,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        CompilationOptions {
            universe: Universe::default(),
            emit_rust_source: false,
            warn_on_overlapping_clauses: false,
            trace: false,
        }
    }
}
