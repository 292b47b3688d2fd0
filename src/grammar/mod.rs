pub mod first_follow;
pub mod grammar;
pub mod ll1_parsing_table;
pub mod parse;
pub mod pretty_print;
pub use first_follow::FirstFollow;
pub use grammar::Grammar;
pub use ll1_parsing_table::LL1Table;

pub const LAMBDA: &str = "λ";
pub const LAMBDA_WORD: &str = "lambda";
pub const END_MARK: &str = "$";
/// Wildcard terminal matching any string-literal token.
pub const SIGMA: &str = "σ";

/// Symbol index of [`LAMBDA`] in every grammar.
pub const LAMBDA_INDEX: usize = 0;
/// Symbol index of [`END_MARK`] in every grammar.
pub const END_MARK_INDEX: usize = 1;
