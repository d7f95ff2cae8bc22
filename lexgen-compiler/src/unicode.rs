//! Unicode general-category classification.
//!
//! The generated tables only ever need to know, for a given code point,
//! whether it belongs to a named general category. Rather than vendor a
//! Unicode Character Database table, this scans the compilation universe
//! once per category using `char`'s own classification predicates — an
//! approximation good enough for lexer character classes, not a
//! replacement for a full UCD lookup (`Lu`/`Ll` line up with the real
//! categories; the broad `P`/`S` groups do not distinguish their
//! sub-categories the UCD does).

use lexgen_automata::{CharSet, Universe};

/// A named Unicode general-category group recognized by this compiler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnicodeCategory {
    /// `L`: any letter.
    Letter,
    /// `Lu`: uppercase letter.
    UppercaseLetter,
    /// `Ll`: lowercase letter.
    LowercaseLetter,
    /// `N`: any number.
    Number,
    /// `Nd`: decimal digit.
    DecimalDigit,
    /// `Z`: any separator (space, line, paragraph).
    Separator,
    /// `C`: any control or unassigned code point.
    Control,
    /// `P`: ASCII punctuation. Does not cover non-ASCII punctuation,
    /// which `char` has no stable classifier for.
    Punctuation,
}

impl UnicodeCategory {
    /// Parses a category code such as `"Lu"` or `"N"`.
    pub fn parse(name: &str) -> Option<UnicodeCategory> {
        match name {
            "L" => Some(UnicodeCategory::Letter),
            "Lu" => Some(UnicodeCategory::UppercaseLetter),
            "Ll" => Some(UnicodeCategory::LowercaseLetter),
            "N" => Some(UnicodeCategory::Number),
            "Nd" => Some(UnicodeCategory::DecimalDigit),
            "Z" | "Zs" => Some(UnicodeCategory::Separator),
            "C" | "Cc" => Some(UnicodeCategory::Control),
            "P" => Some(UnicodeCategory::Punctuation),
            _ => None,
        }
    }

    fn matches(self, c: char) -> bool {
        match self {
            UnicodeCategory::Letter => c.is_alphabetic(),
            UnicodeCategory::UppercaseLetter => c.is_alphabetic() && c.is_uppercase(),
            UnicodeCategory::LowercaseLetter => c.is_alphabetic() && c.is_lowercase(),
            UnicodeCategory::Number => c.is_numeric(),
            UnicodeCategory::DecimalDigit => c.is_ascii_digit() || (c.is_numeric() && c.to_digit(10).is_some()),
            UnicodeCategory::Separator => c.is_whitespace(),
            UnicodeCategory::Control => c.is_control(),
            UnicodeCategory::Punctuation => c.is_ascii_punctuation(),
        }
    }
}

/// The `CharSet` of every code point in `universe` belonging to
/// `category`.
pub fn category_set(category: UnicodeCategory, universe: Universe) -> CharSet {
    (0..=universe.max_code_point())
        .filter_map(char::from_u32)
        .filter(|&c| category.matches(c))
        .fold(CharSet::empty(), |set, c| set.add(c as u32, c as u32))
}



// =============
// === Tests ===
// =============
