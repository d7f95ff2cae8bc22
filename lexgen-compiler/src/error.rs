//! Diagnostics produced while preprocessing and compiling a specification.
//!
//! The compiler accumulates these rather than aborting at the first one:
//! public entry points that can fail return `Result<T, Vec<CompileError>>`
//! so a caller sees every problem in a specification in one pass, the way
//! a batch of rules is normally authored and fixed together.

use thiserror::Error;

/// A single diagnosable problem with a specification.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    /// Two macros were declared with the same name.
    #[error("macro `{name}` is defined more than once")]
    DuplicateMacro {
        /// The repeated macro name.
        name: String,
    },

    /// A macro's expansion refers to itself, directly or through a
    /// chain of other macros.
    #[error("macro `{name}` is defined recursively ({})", cycle.join(" -> "))]
    RecursiveMacro {
        /// The macro at which the cycle was detected.
        name: String,
        /// The chain of macro references that closes the cycle,
        /// starting and ending at `name`.
        cycle: Vec<String>,
    },

    /// A pattern referred to a macro that was never declared.
    #[error("macro `{name}` is not defined (referenced from `{used_by}`)")]
    UndefinedMacro {
        /// The missing macro name.
        name: String,
        /// The rule or macro whose pattern referenced it.
        used_by: String,
    },

    /// A character outside the ASCII range appeared while compiling in
    /// ASCII mode.
    #[error("character {character:?} is outside the ASCII universe (used by `{used_by}`)")]
    UnicodeInAsciiMode {
        /// The offending character.
        character: char,
        /// The rule or macro whose pattern contained it.
        used_by: String,
    },

    /// A `UnicodeCategory` pattern named a category this compiler does
    /// not recognize.
    #[error("unknown Unicode general category `{category}` (used by `{used_by}`)")]
    UnknownUnicodeCategory {
        /// The unrecognized category name, e.g. `"Lu"`.
        category: String,
        /// The rule or macro whose pattern referenced it.
        used_by: String,
    },

    /// `EndOfFile` appeared as a regex operand. It is a pseudo-symbol
    /// recognized only by the runtime driving the generated lexer, not
    /// a character the core regex algebra can derive with respect to.
    #[error("end-of-file cannot appear inside a regex (used by `{used_by}`)")]
    EndOfFileInRegex {
        /// The rule or macro whose pattern contained it.
        used_by: String,
    },

    /// `Repetition(r, lo, hi)` appeared in a pattern. Bounded repetition
    /// is not desugared by this compiler.
    #[error("bounded repetition is not supported (used by `{used_by}`)")]
    UnsupportedRepetition {
        /// The rule or macro whose pattern contained it.
        used_by: String,
    },
}

/// Every problem found while compiling a specification, in the order
/// they were discovered. Kept as a thin wrapper (rather than a bare
/// `Vec<CompileError>`) so accumulating call sites can push into it
/// without every caller re-stating the `Vec` type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompileErrors(pub Vec<CompileError>);

impl CompileErrors {
    /// No errors.
    pub fn new() -> Self {
        CompileErrors::default()
    }

    /// Whether any error has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Records one more error.
    pub fn push(&mut self, error: CompileError) {
        self.0.push(error);
    }

    /// Appends every error from `other`, draining it.
    pub fn extend(&mut self, other: CompileErrors) {
        self.0.extend(other.0);
    }
}

impl FromIterator<CompileError> for CompileErrors {
    fn from_iter<I: IntoIterator<Item = CompileError>>(iter: I) -> Self {
        CompileErrors(iter.into_iter().collect())
    }
}

impl IntoIterator for CompileErrors {
    type Item = CompileError;
    type IntoIter = std::vec::IntoIter<CompileError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
