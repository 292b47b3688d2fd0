use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use crate::error::GrammarError;
use crate::Grammar;

use super::pretty_print::{tex_symbols, ProductionOutput};
use super::{FirstFollow, LAMBDA_INDEX};

/// LL(1) predictive parsing table: (non-terminal, lookahead) -> production index.
///
/// Lookaheads are terminal indices or [`super::END_MARK_INDEX`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LL1Table {
    rows: HashMap<usize, BTreeMap<usize, usize>>,
}

impl LL1Table {
    pub fn get(&self, non_terminal: usize, lookahead: usize) -> Option<usize> {
        self.rows
            .get(&non_terminal)
            .and_then(|row| row.get(&lookahead))
            .cloned()
    }

    pub fn row(&self, non_terminal: usize) -> Option<&BTreeMap<usize, usize>> {
        self.rows.get(&non_terminal)
    }

    /// Number of filled cells.
    pub fn len(&self) -> usize {
        self.rows.values().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set(
        &mut self,
        grammar: &Grammar,
        non_terminal: usize,
        lookahead: usize,
        production: usize,
    ) -> Result<(), GrammarError> {
        let row = self.rows.entry(non_terminal).or_default();
        match row.get(&lookahead).cloned() {
            Some(existing)
                if grammar.productions[existing].right != grammar.productions[production].right =>
            {
                Err(GrammarError::TableConflict {
                    non_terminal: grammar.get_symbol_name(non_terminal).to_string(),
                    terminal: grammar.get_symbol_name(lookahead).to_string(),
                    existing: grammar
                        .production_to_vec_str(&grammar.productions[existing].right)
                        .join(" "),
                    conflicting: grammar
                        .production_to_vec_str(&grammar.productions[production].right)
                        .join(" "),
                })
            }
            Some(_) => Ok(()),
            None => {
                row.insert(lookahead, production);
                Ok(())
            }
        }
    }
}

impl Grammar {
    pub fn generate_ll1_parsing_table(&self, ff: &FirstFollow) -> Result<LL1Table, GrammarError> {
        let mut table = LL1Table::default();

        for nt in self.non_terminal_iter() {
            for &p in &nt.productions {
                let production = &self.productions[p];
                if production.is_lambda() {
                    for &t in ff.follow(nt.index).into_iter().flatten() {
                        table.set(self, nt.index, t, p)?;
                    }
                    continue;
                }
                if let [only] = production.right.as_slice() {
                    if self.symbols[*only].is_terminal() {
                        table.set(self, nt.index, *only, p)?;
                        continue;
                    }
                }

                let first = ff.first_of_sequence(self, &production.right);
                for &t in first.iter().filter(|&&t| t != LAMBDA_INDEX) {
                    table.set(self, nt.index, t, p)?;
                }
                if first.contains(&LAMBDA_INDEX) {
                    for &t in ff.follow(nt.index).into_iter().flatten() {
                        table.set(self, nt.index, t, p)?;
                    }
                }
            }
        }

        debug!("LL(1) table built with {} entries", table.len());
        Ok(table)
    }

    pub fn to_ll1_table_output<'a>(&'a self, table: &LL1Table) -> LL1TableOutput<'a> {
        let lookaheads = self.lookahead_indices();
        let terminals: Vec<&str> = lookaheads
            .iter()
            .map(|&idx| self.get_symbol_name(idx))
            .collect();

        let mut rows: Vec<(&str, Vec<ProductionOutput>)> = Vec::new();
        for nt in self.non_terminal_iter() {
            let left = nt.name.as_str();
            let row = lookaheads
                .iter()
                .map(|&t| ProductionOutput {
                    left,
                    rights: table
                        .get(nt.index, t)
                        .map(|p| vec![self.production_to_vec_str(&self.productions[p].right)])
                        .unwrap_or_default(),
                })
                .collect();
            rows.push((left, row));
        }

        LL1TableOutput { terminals, rows }
    }
}

#[derive(Serialize)]
pub struct LL1TableOutput<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<(&'a str, Vec<ProductionOutput<'a>>)>,
}

impl LL1TableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(
                row.iter()
                    .map(|production| production.to_plaintext(left.len(), false)),
            );
            output.push(line);
        }

        let width: Vec<usize> = (0..output[0].len())
            .map(|j| {
                output
                    .iter()
                    .map(|line| line[j].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let mut out = format!(
            "\\[\\begin{{array}}{{c{}}}\n & {} \\\\ \\hline\n",
            "|l".repeat(self.terminals.len()),
            tex_symbols(&self.terminals, " & ")
        );
        for (left, row) in &self.rows {
            let cells: Vec<String> = row.iter().map(|p| p.to_latex(false)).collect();
            let _ = writeln!(out, "{} & {} \\\\", tex_symbols(&[*left], ""), cells.join(" & "));
        }
        out.push_str("\\end{array}\\]");
        out
    }
}
