use std::collections::HashMap;

use super::{END_MARK, END_MARK_INDEX, LAMBDA, LAMBDA_INDEX, LAMBDA_WORD, SIGMA};

#[derive(Debug, Clone)]
pub struct NonTerminal {
    pub index: usize,
    pub name: String,
    /// Indices into [`Grammar::productions`], in declaration order.
    pub productions: Vec<usize>,
}

impl NonTerminal {
    pub fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            productions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Symbol {
    NonTerminal(NonTerminal),
    Terminal(String),
    Lambda,
    EndMarker,
}

impl Symbol {
    pub fn non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            _ => None,
        }
    }

    pub fn mut_non_terminal(&mut self) -> Option<&mut NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }

    /// Terminals and the end marker, i.e. everything a token can be matched against.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_) | Symbol::EndMarker)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub left: usize,
    pub right: Vec<usize>,
}

impl Production {
    pub fn is_lambda(&self) -> bool {
        self.right == [LAMBDA_INDEX]
    }
}

#[derive(Debug, Clone)]
pub struct Grammar {
    pub symbols: Vec<Symbol>,
    pub symbol_table: HashMap<String, usize>,
    pub productions: Vec<Production>,
    pub start_symbol: Option<usize>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    pub fn new() -> Self {
        let mut g = Self {
            symbols: vec![Symbol::Lambda, Symbol::EndMarker],
            symbol_table: HashMap::new(),
            productions: Vec::new(),
            start_symbol: None,
        };
        g.symbol_table.insert(LAMBDA.to_string(), LAMBDA_INDEX);
        g.symbol_table.insert(LAMBDA_WORD.to_string(), LAMBDA_INDEX);
        g.symbol_table.insert(END_MARK.to_string(), END_MARK_INDEX);
        g
    }

    /// Checks if the token is spelled as a non-terminal, e.g. `<expr>`.
    pub fn is_non_terminal(token: &str) -> bool {
        token.len() >= 2 && token.starts_with('<') && token.ends_with('>')
    }

    pub fn terminal_iter(&self) -> impl Iterator<Item = &String> {
        self.symbols.iter().filter_map(|s| {
            if let Symbol::Terminal(name) = s {
                Some(name)
            } else {
                None
            }
        })
    }

    /// Indices of the terminals followed by the end marker, the columns of an LL(1) table.
    pub fn lookahead_indices(&self) -> Vec<usize> {
        self.symbols
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s, Symbol::Terminal(_)))
            .map(|(i, _)| i)
            .chain(std::iter::once(END_MARK_INDEX))
            .collect()
    }

    /// Non-terminals in the order of their first declaration.
    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        self.symbols.iter().filter_map(|s| s.non_terminal())
    }

    pub fn start_production(&self) -> Option<&Production> {
        self.productions.first()
    }

    pub fn productions_of(&self, non_terminal: usize) -> impl Iterator<Item = &Production> {
        self.symbols[non_terminal]
            .non_terminal()
            .into_iter()
            .flat_map(move |nt| nt.productions.iter().map(move |&p| &self.productions[p]))
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<usize> {
        self.symbol_table.get(name).cloned()
    }

    /// Index of the wildcard literal terminal, if the grammar uses one.
    pub fn sigma_index(&self) -> Option<usize> {
        self.get_symbol_index(SIGMA)
            .filter(|&idx| self.symbols[idx].is_terminal())
    }

    pub fn add_non_terminal(&mut self, name: &str) -> usize {
        let idx = self.symbols.len();
        self.symbols
            .push(Symbol::NonTerminal(NonTerminal::new(idx, name.to_string())));
        self.symbol_table.insert(name.to_string(), idx);
        idx
    }

    pub fn add_terminal(&mut self, name: String) -> usize {
        let idx = self.symbols.len();
        self.symbols.push(Symbol::Terminal(name.clone()));
        self.symbol_table.insert(name, idx);
        idx
    }

    pub fn add_production(&mut self, left: usize, right: Vec<usize>) {
        let idx = self.productions.len();
        self.productions.push(Production { left, right });
        if let Some(nt) = self.symbols[left].mut_non_terminal() {
            nt.productions.push(idx);
        }
    }

    pub fn get_symbol_name(&self, index: usize) -> &str {
        match &self.symbols[index] {
            Symbol::NonTerminal(e) => e.name.as_str(),
            Symbol::Terminal(e) => e.as_str(),
            Symbol::Lambda => LAMBDA,
            Symbol::EndMarker => END_MARK,
        }
    }

    pub fn production_to_vec_str(&self, production: &[usize]) -> Vec<&str> {
        production
            .iter()
            .map(|idx| self.get_symbol_name(*idx))
            .collect()
    }
}
