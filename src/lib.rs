extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

pub mod error;
pub mod grammar;
pub mod parser;
pub use error::{GrammarError, SyntaxError, SyntaxErrorKind};
pub use grammar::Grammar;
pub use parser::{ErrorEntries, ParseTree, Parser, Token};

fn error_json(e: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

#[wasm_bindgen]
pub fn first_follow_to_json(grammar: &str) -> String {
    let g = match crate::Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_json(e),
    };
    match g.calculate_first_follow() {
        Ok(ff) => g.to_non_terminal_output_vec(&ff).to_json(),
        Err(e) => error_json(e),
    }
}

#[wasm_bindgen]
pub fn ll1_table_to_json(grammar: &str) -> String {
    let g = match crate::Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_json(e),
    };
    let table = match g
        .calculate_first_follow()
        .and_then(|ff| g.generate_ll1_parsing_table(&ff))
    {
        Ok(table) => table,
        Err(e) => return error_json(e),
    };
    serde_json::to_string(&g.to_ll1_table_output(&table)).unwrap_or_else(error_json)
}

/// Parses a JSON array of tokens with the given grammar and returns the parse
/// tree as JSON.
#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, tokens: &str) -> String {
    let parser = match crate::Grammar::parse(grammar).and_then(crate::Parser::new) {
        Ok(parser) => parser,
        Err(e) => return error_json(e),
    };
    let tokens: Vec<crate::Token> = match serde_json::from_str(tokens) {
        Ok(tokens) => tokens,
        Err(e) => return error_json(e),
    };
    match parser.parse(&tokens) {
        Ok(tree) => serde_json::to_string(&tree.to_output()).unwrap_or_else(error_json),
        Err(e) => error_json(e),
    }
}
