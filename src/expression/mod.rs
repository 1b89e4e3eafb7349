//! Trigger condition language: lexer, parser, and evaluatable tree
//!
//! Conditions combine trigger-path name patterns with boolean operators:
//!
//! ```text
//! HLT_Mu_v1
//! HLT_Mu_v* AND NOT HLT_Iso_v?
//! (HLT_Jet* OR HLT_MET*) AND HLT_Zero_Bias/15
//! ```
//!
//! Patterns support the glob wildcards `*` and `?`, an optional `/N`
//! prescale suffix, and quoting for names that collide with keywords.

mod lexer;
mod parser;
mod tree;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::parse;
pub use tree::{Expression, PathLeaf};
