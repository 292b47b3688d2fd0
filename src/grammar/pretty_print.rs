use std::fmt::Write;

use crowbook_text_processing::escape;
use serde::Serialize;

use super::{FirstFollow, Grammar, LAMBDA};

/// Symbols for LaTeX math mode, joined with `separator`. Lambda becomes
/// `\lambda`, everything else is set upright.
pub(super) fn tex_symbols(symbols: &[&str], separator: &str) -> String {
    symbols
        .iter()
        .map(|&s| match s {
            LAMBDA => r"\lambda".to_string(),
            _ => format!(r"\text{{{}}}", escape::tex(s)),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// Every alternative of one non-terminal.
#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<&'a str>>,
}

impl ProductionOutput<'_> {
    /// `A -> x | y` on one line, or one alternative per line with the bars
    /// under the arrow when `multiline` is set.
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        let mut out = String::new();
        for (i, right) in self.rights.iter().enumerate() {
            let right = right.join(" ");
            let _ = match (i, multiline) {
                (0, _) => write!(out, "{:>w$} -> {}", self.left, right, w = left_width),
                (_, true) => write!(out, "\n{:>w$}  | {}", "", right, w = left_width),
                (_, false) => write!(out, " | {}", right),
            };
        }
        out
    }

    /// `aligned` puts the arrow in its own column for an `array` environment.
    pub fn to_latex(&self, aligned: bool) -> String {
        if self.rights.is_empty() {
            return String::new();
        }
        let arrow = if aligned { r" & \rightarrow & " } else { r" \rightarrow " };
        let alternatives = self
            .rights
            .iter()
            .map(|right| tex_symbols(right, r"\ "))
            .collect::<Vec<_>>()
            .join(r" \mid ");
        format!("{}{}{}", tex_symbols(&[self.left], ""), arrow, alternatives)
    }
}

#[derive(Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_width = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|p| p.to_plaintext(left_width, true))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let rows = self
            .productions
            .iter()
            .map(|p| p.to_latex(true))
            .collect::<Vec<_>>()
            .join(" \\\\\n");
        format!("\\[\\begin{{array}}{{rcl}}\n{}\n\\end{{array}}\\]", rows)
    }
}

impl Grammar {
    /// Productions grouped by left side, in declaration order of the left sides.
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .non_terminal_iter()
            .map(|nt| ProductionOutput {
                left: nt.name.as_str(),
                rights: nt
                    .productions
                    .iter()
                    .map(|&p| self.production_to_vec_str(&self.productions[p].right))
                    .collect(),
            })
            .collect();
        ProductionOutputVec { productions }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> String {
        format!(
            "{}: first = {{ {} }}, follow = {{ {} }}",
            self.name,
            self.first.join(" "),
            self.follow.join(" ")
        )
    }

    fn to_latex(&self) -> String {
        format!(
            r"${}$ & {} & $\{{ {} \}}$ & $\{{ {} \}}$",
            tex_symbols(&[self.name], ""),
            if self.nullable { "yes" } else { "no" },
            tex_symbols(&self.first, ", "),
            tex_symbols(&self.follow, ", ")
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(NonTerminalOutput::to_plaintext)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
    }

    pub fn to_latex(&self) -> String {
        let mut out = String::from(
            "\\begin{tabular}{l|c|l|l}\nNon-terminal & Nullable & FIRST & FOLLOW \\\\ \\hline\n",
        );
        for row in &self.data {
            out.push_str(&row.to_latex());
            out.push_str(" \\\\\n");
        }
        out.push_str("\\end{tabular}");
        out
    }
}

impl Grammar {
    /// FIRST and FOLLOW members of every non-terminal, in declaration order.
    pub fn to_non_terminal_output_vec<'a>(&'a self, ff: &FirstFollow) -> NonTerminalOutputVec<'a> {
        let data = self
            .non_terminal_iter()
            .map(|nt| NonTerminalOutput {
                name: nt.name.as_str(),
                nullable: ff.nullable(nt.index),
                first: self.set_to_vec_str(ff.first(nt.index)),
                follow: self.set_to_vec_str(ff.follow(nt.index)),
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::Grammar;

    #[test]
    fn productions_grouped_by_left_side() {
        let g = Grammar::parse("<A> -> x <B>\n<B> -> y\n<A> -> lambda").unwrap();
        assert_eq!(
            g.to_production_output_vec().to_plaintext(),
            "<A> -> x <B>\n     | λ\n<B> -> y"
        );
    }

    #[test]
    fn first_follow_plaintext() {
        let g = Grammar::parse("<S> -> <A> b\n<A> -> a\n<A> -> lambda").unwrap();
        let ff = g.calculate_first_follow().unwrap();
        assert_eq!(
            g.to_non_terminal_output_vec(&ff).to_plaintext(),
            "<S>: first = { b a }, follow = { $ }\n<A>: first = { λ a }, follow = { b }"
        );
    }

    #[test]
    fn productions_latex() {
        let g = Grammar::parse("<A> -> x <B>\n<B> -> y\n<A> -> lambda").unwrap();
        let latex = g.to_production_output_vec().to_latex();
        assert!(latex.starts_with(r"\[\begin{array}{rcl}"));
        assert!(latex.ends_with(r"\end{array}\]"));
        assert!(latex.contains(r" & \rightarrow & \text{x}\ "));
        assert!(latex.contains(r" \mid \lambda \\"));
    }

    #[test]
    fn first_follow_latex() {
        let g = Grammar::parse("<S> -> <A> b\n<A> -> a\n<A> -> lambda").unwrap();
        let ff = g.calculate_first_follow().unwrap();
        let latex = g.to_non_terminal_output_vec(&ff).to_latex();
        assert_eq!(latex.lines().count(), 5);
        assert!(latex.contains(r"& yes & $\{ \lambda, \text{a} \}$ & $\{ \text{b} \}$ \\"));
        assert!(latex.contains(r"& no & $\{ \text{b}, \text{a} \}$"));
    }

    #[test]
    fn first_follow_json() {
        let g = Grammar::parse("<S> -> a").unwrap();
        let ff = g.calculate_first_follow().unwrap();
        assert_eq!(
            g.to_non_terminal_output_vec(&ff).to_json(),
            r#"{"data":[{"name":"<S>","nullable":false,"first":["a"],"follow":["$"]}]}"#
        );
    }
}
