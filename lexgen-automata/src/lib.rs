//! Character sets, the regex IR, regular vectors and the DFA transition
//! graph that a lexer generator compiles into: the layer below macro
//! expansion and compiler orchestration.
//!
//! Everything here is pure data plus pure functions over it — nothing in
//! this crate reads a file, prints a diagnostic, or installs a logging
//! subscriber.

pub mod charset;
pub mod dfa_graph;
pub mod error;
pub mod regex;
pub mod universe;
pub mod vector;

pub use charset::CharSet;
pub use dfa_graph::DfaGraph;
pub use error::CharSetError;
pub use regex::Regex;
pub use universe::Universe;
pub use vector::RegularVector;
