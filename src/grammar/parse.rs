use log::debug;

use super::{Grammar, LAMBDA_INDEX};
use crate::error::GrammarError;

impl Grammar {
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        Self::load(grammar.lines())
    }

    /// Builds a grammar from lines of the form `<A> -> X1 X2 ... Xn`.
    ///
    /// Blank lines are skipped; any other line that does not have this shape is
    /// rejected. The left side of the first production becomes the start symbol.
    pub fn load<I, S>(lines: I) -> Result<Self, GrammarError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut g = Self::new();

        let mut raw_productions: Vec<(usize, usize, Vec<String>)> = Vec::new();

        for (i, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }
            if parts.len() < 3 || parts[1] != "->" || !Self::is_non_terminal(parts[0]) {
                return Err(GrammarError::Format {
                    line_number: i + 1,
                    line: line.to_string(),
                });
            }

            let left = match g.get_symbol_index(parts[0]) {
                Some(idx) => idx,
                None => g.add_non_terminal(parts[0]),
            };
            raw_productions.push((
                i + 1,
                left,
                parts[2..].iter().map(|s| s.to_string()).collect(),
            ));
        }

        // Right sides are resolved once every left side is known, so that a
        // non-terminal may be used before its first production.
        for (line_number, left, rights) in raw_productions {
            let mut symbols = Vec::with_capacity(rights.len());
            for s in rights {
                let idx = match g.get_symbol_index(&s) {
                    Some(idx) => idx,
                    None if Self::is_non_terminal(&s) => {
                        return Err(GrammarError::UndefinedNonTerminal { name: s });
                    }
                    None => g.add_terminal(s),
                };
                symbols.push(idx);
            }
            if symbols.len() > 1 && symbols.contains(&LAMBDA_INDEX) {
                return Err(GrammarError::MisplacedLambda { line_number });
            }
            g.add_production(left, symbols);
        }

        g.start_symbol = g.start_production().map(|p| p.left);

        debug!(
            "loaded grammar: {} productions, {} non-terminals, {} terminals",
            g.productions.len(),
            g.non_terminal_iter().count(),
            g.terminal_iter().count()
        );

        Ok(g)
    }
}
