use std::collections::HashSet;

use log::{debug, trace};

use super::{ErrorEntries, Location, NodeId, ParseTree, Token, TokenKind};
use crate::error::{GrammarError, SyntaxError, SyntaxErrorKind};
use crate::grammar::{grammar::Symbol, FirstFollow, Grammar, LL1Table, END_MARK, END_MARK_INDEX};

/// Table-driven LL(1) parser for the grammar it was built from.
///
/// FIRST/FOLLOW sets and the parsing table are computed once in [`Parser::new`];
/// afterwards the parser is immutable and [`Parser::parse`] can be called any
/// number of times, from any number of threads.
#[derive(Debug, Clone)]
pub struct Parser {
    grammar: Grammar,
    first_follow: FirstFollow,
    table: LL1Table,
    error_entries: ErrorEntries,
    /// Multi-character terminals; words spelled like one are never split.
    reserved: HashSet<String>,
    start: usize,
}

impl Parser {
    pub fn new(grammar: Grammar) -> Result<Self, GrammarError> {
        let start = grammar.start_symbol.ok_or(GrammarError::Empty)?;
        let first_follow = grammar.calculate_first_follow()?;
        let table = grammar.generate_ll1_parsing_table(&first_follow)?;
        let reserved = grammar
            .terminal_iter()
            .filter(|t| t.chars().count() > 1)
            .cloned()
            .collect();

        debug!(
            "parser ready: start symbol {}, {} table entries",
            grammar.get_symbol_name(start),
            table.len()
        );

        Ok(Self {
            grammar,
            first_follow,
            table,
            error_entries: ErrorEntries::default(),
            reserved,
            start,
        })
    }

    pub fn with_error_entries(mut self, error_entries: ErrorEntries) -> Self {
        self.error_entries = error_entries;
        self
    }

    pub fn set_error_entries(&mut self, error_entries: ErrorEntries) {
        self.error_entries = error_entries;
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn first_follow(&self) -> &FirstFollow {
        &self.first_follow
    }

    pub fn table(&self) -> &LL1Table {
        &self.table
    }

    /// Parses `tokens` into a tree rooted at the start symbol.
    ///
    /// Once the tokens run out the lookahead is the end marker, so trailing
    /// non-terminals can still derive lambda. Comments must already be removed.
    pub fn parse(&self, tokens: &[Token]) -> Result<ParseTree, SyntaxError> {
        let end_location = tokens.last().map(|t| t.location);
        if tokens.is_empty() {
            return Err(SyntaxError {
                kind: SyntaxErrorKind::UnexpectedEnd,
                location: None,
                found: None,
                expected: Some(self.grammar.get_symbol_name(self.start).to_string()),
                message: "unexpected end of input".to_string(),
            });
        }

        // Reversed so that the next token is always at the end.
        let mut input: Vec<Token> = tokens.iter().rev().cloned().collect();
        let mut stack: Vec<(usize, Option<NodeId>)> =
            vec![(END_MARK_INDEX, None), (self.start, None)];
        let mut tree: Option<ParseTree> = None;

        while let Some((symbol, parent)) = stack.pop() {
            self.resegment(&mut input);
            trace!(
                "top {} / next {:?}",
                self.grammar.get_symbol_name(symbol),
                input.last().map(|t| t.text.as_str())
            );

            match &self.grammar.symbols[symbol] {
                Symbol::Lambda => {}
                Symbol::Terminal(_) | Symbol::EndMarker => {
                    let token = match input.pop() {
                        Some(token) => token,
                        None if symbol == END_MARK_INDEX => continue,
                        None => {
                            return Err(self.unexpected_end(symbol, end_location, None));
                        }
                    };
                    if !self.matches(&token, symbol) {
                        return Err(if symbol == END_MARK_INDEX && parent.is_none() {
                            trailing_input(&token)
                        } else {
                            self.mismatch(symbol, &token)
                        });
                    }
                    if let (Some(parent), Some(tree)) = (parent, tree.as_mut()) {
                        tree.add_leaf(parent, token);
                    }
                }
                Symbol::NonTerminal(nt) => {
                    let token = input.last();
                    let lookahead = match token {
                        Some(token) => self.lookahead(token),
                        None => Some(END_MARK_INDEX),
                    };
                    let production = match lookahead.and_then(|t| self.table.get(symbol, t)) {
                        Some(production) => production,
                        None => {
                            return Err(match token {
                                Some(token) => self.no_production(symbol, token),
                                None => {
                                    let message = self.error_entries.lookup(&nt.name, END_MARK);
                                    self.unexpected_end(symbol, end_location, message)
                                }
                            });
                        }
                    };

                    let node = match tree.as_mut() {
                        Some(tree) => {
                            let parent = parent.unwrap_or_else(|| tree.root());
                            tree.add_node(parent, symbol, &nt.name)
                        }
                        None => {
                            let root = ParseTree::with_root(symbol, &nt.name);
                            let id = root.root();
                            tree = Some(root);
                            id
                        }
                    };

                    for &s in self.grammar.productions[production].right.iter().rev() {
                        if !matches!(self.grammar.symbols[s], Symbol::Lambda) {
                            stack.push((s, Some(node)));
                        }
                    }
                }
            }
        }

        if let Some(token) = input.last() {
            return Err(trailing_input(token));
        }

        tree.ok_or_else(|| self.unexpected_end(self.start, end_location, None))
    }

    /// Splits a multi-character word that is not a reserved terminal into one
    /// token per character.
    fn resegment(&self, input: &mut Vec<Token>) {
        while let Some(token) = input.pop() {
            if token.kind == TokenKind::Word
                && token.text.chars().count() > 1
                && !self.reserved.contains(&token.text)
            {
                trace!("splitting word {:?}", token.text);
                input.extend(token.separate().into_iter().rev());
            } else {
                input.push(token);
                break;
            }
        }
    }

    /// Column of the table the token selects: `σ` for string literals, the
    /// terminal spelled like the token otherwise.
    fn lookahead(&self, token: &Token) -> Option<usize> {
        if token.kind == TokenKind::StringLiteral {
            return self.grammar.sigma_index();
        }
        self.grammar
            .get_symbol_index(&token.text)
            .filter(|&idx| self.grammar.symbols[idx].is_terminal())
    }

    fn matches(&self, token: &Token, symbol: usize) -> bool {
        match token.kind {
            TokenKind::StringLiteral => self.grammar.sigma_index() == Some(symbol),
            _ => self.lookahead(token) == Some(symbol),
        }
    }

    fn mismatch(&self, symbol: usize, token: &Token) -> SyntaxError {
        let expected = self.grammar.get_symbol_name(symbol);
        SyntaxError {
            kind: SyntaxErrorKind::Mismatch,
            location: Some(token.location),
            found: Some(token.text.clone()),
            expected: Some(expected.to_string()),
            message: format!("unexpected terminal token, expecting {}", expected),
        }
    }

    fn no_production(&self, symbol: usize, token: &Token) -> SyntaxError {
        let expected = self.grammar.get_symbol_name(symbol);
        let message = match self.error_entries.lookup(expected, &token.text) {
            Some(message) => message.to_string(),
            None => format!("unexpected token, expecting {}", expected),
        };
        SyntaxError {
            kind: SyntaxErrorKind::NoProduction,
            location: Some(token.location),
            found: Some(token.text.clone()),
            expected: Some(expected.to_string()),
            message,
        }
    }

    fn unexpected_end(
        &self,
        symbol: usize,
        location: Option<Location>,
        message: Option<&str>,
    ) -> SyntaxError {
        let expected = self.grammar.get_symbol_name(symbol);
        SyntaxError {
            kind: SyntaxErrorKind::UnexpectedEnd,
            location,
            found: None,
            expected: Some(expected.to_string()),
            message: match message {
                Some(message) => message.to_string(),
                None => format!("unexpected end of input, expecting {}", expected),
            },
        }
    }
}

fn trailing_input(token: &Token) -> SyntaxError {
    SyntaxError {
        kind: SyntaxErrorKind::TrailingInput,
        location: Some(token.location),
        found: Some(token.text.clone()),
        expected: None,
        message: "unexpected token after end of input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Parser;
    use crate::error::{GrammarError, SyntaxErrorKind};
    use crate::parser::{ErrorEntries, Location, Token, TokenKind};
    use crate::Grammar;

    fn expression_parser() -> Parser {
        let g = Grammar::parse(
            "<S> -> <E> $
             <E> -> <T> <E'>
             <E'> -> + <T> <E'>
             <E'> -> lambda
             <T> -> id",
        )
        .unwrap();
        Parser::new(g).unwrap()
    }

    /// Tokens separated by single spaces; `"..."` becomes a string literal.
    fn tokens(source: &str) -> Vec<Token> {
        let mut offset = 0;
        source
            .split(' ')
            .map(|text| {
                let location = Location::new(offset, offset + text.len());
                offset += text.len() + 1;
                if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
                    Token::new(location, TokenKind::StringLiteral, &text[1..text.len() - 1])
                } else if text.chars().all(|c| c.is_alphanumeric()) {
                    Token::new(location, TokenKind::Word, text)
                } else {
                    Token::new(location, TokenKind::Punctuation, text)
                }
            })
            .collect()
    }

    fn leaves(tree: &crate::parser::ParseTree) -> Vec<&str> {
        tree.leaves().iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn parse_expression() {
        let parser = expression_parser();
        let tree = parser.parse(&tokens("id + id $")).unwrap();
        assert_eq!(leaves(&tree), vec!["id", "+", "id", "$"]);
        assert_eq!(tree.node(tree.root()).label, "<S>");
        assert_eq!(tree.location(tree.root()), Some(Location::new(0, 9)));
        assert_eq!(tree.extract_literals(tree.root()), "id+id$");
    }

    #[test]
    fn parse_tree_display() {
        let parser = expression_parser();
        let tree = parser.parse(&tokens("id + id $")).unwrap();
        assert_eq!(
            tree.to_string(),
            "<S>
  <E>
    <T>
      \"id\"
    <E'>
      \"+\"
      <T>
        \"id\"
      <E'>
  \"$\"
"
        );
    }

    #[test]
    fn parse_is_deterministic() {
        let parser = expression_parser();
        let input = tokens("id + id + id $");
        let first = parser.parse(&input).unwrap();
        let second = parser.parse(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_operand() {
        let parser = expression_parser();
        let err = parser.parse(&tokens("id + $")).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::NoProduction);
        assert_eq!(err.found.as_deref(), Some("$"));
        assert_eq!(err.expected.as_deref(), Some("<T>"));
        assert_eq!(err.location, Some(Location::new(5, 6)));
        assert_eq!(
            err.to_string(),
            "syntax error near word \"$\": unexpected token, expecting <T>"
        );
    }

    #[test]
    fn empty_input() {
        let parser = expression_parser();
        let err = parser.parse(&[]).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::UnexpectedEnd);
        assert_eq!(err.to_string(), "syntax error: unexpected end of input");
    }

    #[test]
    fn input_ends_early() {
        let parser = expression_parser();
        let err = parser.parse(&tokens("id +")).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::UnexpectedEnd);
        assert_eq!(err.expected.as_deref(), Some("<T>"));
        assert_eq!(err.location, Some(Location::new(3, 4)));
        assert_eq!(err.message, "unexpected end of input, expecting <T>");
        assert_eq!(
            err.render("id +"),
            "syntax error: unexpected end of input, expecting <T>\n    | id +\n    |    ^"
        );
    }

    #[test]
    fn end_of_input_matches_end_mark() {
        let parser = expression_parser();
        let tree = parser.parse(&tokens("id + id")).unwrap();
        assert_eq!(leaves(&tree), vec!["id", "+", "id"]);
    }

    #[test]
    fn terminal_mismatch() {
        let g = Grammar::parse("<S> -> ( id )").unwrap();
        let parser = Parser::new(g).unwrap();
        let err = parser.parse(&tokens("( id ]")).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Mismatch);
        assert_eq!(err.found.as_deref(), Some("]"));
        assert_eq!(err.message, "unexpected terminal token, expecting )");
    }

    #[test]
    fn trailing_input() {
        let parser = expression_parser();
        let err = parser.parse(&tokens("id $ id")).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::TrailingInput);
        assert_eq!(err.location, Some(Location::new(5, 7)));
    }

    #[test]
    fn end_of_input_derives_lambda() {
        let g = Grammar::parse(
            "<E> -> <T> <E'>
             <E'> -> + <T> <E'>
             <E'> -> lambda
             <T> -> id",
        )
        .unwrap();
        let parser = Parser::new(g).unwrap();
        let tree = parser.parse(&tokens("id + id")).unwrap();
        assert_eq!(leaves(&tree), vec!["id", "+", "id"]);
        // An explicit end marker is consumed without becoming a leaf.
        let tree = parser.parse(&tokens("id $")).unwrap();
        assert_eq!(leaves(&tree), vec!["id"]);
    }

    #[test]
    fn error_entries_override_message() {
        let entries = ErrorEntries::parse(
            "<T> $ | missing operand before end
             <T> ? | expected an identifier",
        );
        let parser = expression_parser().with_error_entries(entries);

        let err = parser.parse(&tokens("id + $")).unwrap_err();
        assert_eq!(err.message, "missing operand before end");
        let err = parser.parse(&tokens("id + +")).unwrap_err();
        assert_eq!(err.message, "expected an identifier");
        assert_eq!(err.kind, SyntaxErrorKind::NoProduction);
    }

    #[test]
    fn string_literals_match_sigma() {
        let g = Grammar::parse(
            "<S> -> print <A> ;
             <A> -> σ
             <A> -> n",
        )
        .unwrap();
        let parser = Parser::new(g).unwrap();
        let tree = parser.parse(&tokens("print \"hello\" ;")).unwrap();
        assert_eq!(leaves(&tree), vec!["print", "hello", ";"]);

        // Other tokens match `σ` by their text, like any terminal.
        let tree = parser.parse(&tokens("print σ ;")).unwrap();
        assert_eq!(leaves(&tree), vec!["print", "σ", ";"]);
        let err = parser.parse(&tokens("print x ;")).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::NoProduction);
    }

    #[test]
    fn words_are_split_into_characters() {
        let g = Grammar::parse(
            "<S> -> <C> <L> ;
             <L> -> <C> <L>
             <L> -> lambda
             <C> -> a
             <C> -> b",
        )
        .unwrap();
        let parser = Parser::new(g).unwrap();
        let tree = parser.parse(&tokens("abba ;")).unwrap();
        assert_eq!(leaves(&tree), vec!["a", "b", "b", "a", ";"]);
        assert_eq!(tree.leaves()[2].location, Location::new(2, 3));
    }

    #[test]
    fn reserved_words_are_kept_whole() {
        let g = Grammar::parse(
            "<S> -> let <V> = <V> ;
             <V> -> x
             <V> -> y",
        )
        .unwrap();
        let parser = Parser::new(g).unwrap();
        let tree = parser.parse(&tokens("let x = y ;")).unwrap();
        assert_eq!(leaves(&tree), vec!["let", "x", "=", "y", ";"]);

        let err = parser.parse(&tokens("let xy = y ;")).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Mismatch);
        assert_eq!(err.found.as_deref(), Some("y"));
        assert_eq!(err.location, Some(Location::new(5, 6)));
    }

    #[test]
    fn ambiguous_grammar_is_rejected() {
        let g = Grammar::parse("<S> -> a\n<S> -> a b").unwrap();
        assert!(matches!(
            Parser::new(g),
            Err(GrammarError::TableConflict { .. })
        ));
    }

    #[test]
    fn parser_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Parser>();
    }
}
