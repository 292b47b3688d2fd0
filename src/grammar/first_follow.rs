use std::collections::{BTreeSet, HashMap};

use log::{debug, trace};

use super::{grammar::Symbol, Grammar, END_MARK_INDEX, LAMBDA_INDEX};
use crate::error::GrammarError;

/// FIRST and FOLLOW sets of every non-terminal of a grammar.
///
/// Sets hold symbol indices of the grammar they were computed from. FIRST sets
/// contain terminals, the end marker and possibly [`LAMBDA_INDEX`]; FOLLOW sets
/// contain terminals and possibly [`END_MARK_INDEX`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstFollow {
    first: HashMap<usize, BTreeSet<usize>>,
    follow: HashMap<usize, BTreeSet<usize>>,
}

enum Memo {
    Computing,
    Done(BTreeSet<usize>),
}

impl FirstFollow {
    pub fn first(&self, non_terminal: usize) -> Option<&BTreeSet<usize>> {
        self.first.get(&non_terminal)
    }

    pub fn follow(&self, non_terminal: usize) -> Option<&BTreeSet<usize>> {
        self.follow.get(&non_terminal)
    }

    pub fn nullable(&self, non_terminal: usize) -> bool {
        self.first(non_terminal)
            .map_or(false, |first| first.contains(&LAMBDA_INDEX))
    }

    /// Symbols that can begin a derivation of `symbols`, walking left to right
    /// past every symbol that can derive lambda. Contains [`LAMBDA_INDEX`] if the
    /// whole sequence can vanish.
    pub fn first_of_sequence(&self, grammar: &Grammar, symbols: &[usize]) -> BTreeSet<usize> {
        let mut first = BTreeSet::new();
        for &idx in symbols {
            match &grammar.symbols[idx] {
                Symbol::Lambda => continue,
                Symbol::Terminal(_) | Symbol::EndMarker => {
                    first.insert(idx);
                    return first;
                }
                Symbol::NonTerminal(_) => {
                    let nt_first = match self.first.get(&idx) {
                        Some(nt_first) => nt_first,
                        None => return first,
                    };
                    first.extend(nt_first.iter().filter(|&&s| s != LAMBDA_INDEX));
                    if !nt_first.contains(&LAMBDA_INDEX) {
                        return first;
                    }
                }
            }
        }
        first.insert(LAMBDA_INDEX);
        first
    }
}

impl Grammar {
    pub fn calculate_first_follow(&self) -> Result<FirstFollow, GrammarError> {
        let start = self.start_symbol.ok_or(GrammarError::Empty)?;

        let mut ff = FirstFollow {
            first: self.calculate_first()?,
            follow: HashMap::new(),
        };
        ff.follow = self.calculate_follow(&ff, start)?;

        for nt in self.non_terminal_iter() {
            debug!(
                "{}: first = {:?}, follow = {:?}",
                nt.name,
                self.set_to_vec_str(ff.first(nt.index)),
                self.set_to_vec_str(ff.follow(nt.index)),
            );
        }
        Ok(ff)
    }

    pub fn set_to_vec_str(&self, set: Option<&BTreeSet<usize>>) -> Vec<&str> {
        set.into_iter()
            .flatten()
            .map(|idx| self.get_symbol_name(*idx))
            .collect()
    }

    fn calculate_first(&self) -> Result<HashMap<usize, BTreeSet<usize>>, GrammarError> {
        let mut memo: HashMap<usize, Memo> = HashMap::new();
        let mut first = HashMap::new();
        for nt in self.non_terminal_iter() {
            first.insert(nt.index, self.calculate_first_helper(nt.index, &mut memo)?);
        }
        Ok(first)
    }

    fn calculate_first_helper(
        &self,
        non_terminal: usize,
        memo: &mut HashMap<usize, Memo>,
    ) -> Result<BTreeSet<usize>, GrammarError> {
        match memo.get(&non_terminal) {
            Some(Memo::Done(first)) => return Ok(first.clone()),
            Some(Memo::Computing) => {
                return Err(GrammarError::LeftRecursion {
                    non_terminal: self.get_symbol_name(non_terminal).to_string(),
                })
            }
            None => {}
        }
        memo.insert(non_terminal, Memo::Computing);

        let mut first = BTreeSet::new();
        for production in self.productions_of(non_terminal) {
            let mut vanishes = true;
            for &idx in &production.right {
                match &self.symbols[idx] {
                    Symbol::Lambda => {}
                    Symbol::Terminal(_) | Symbol::EndMarker => {
                        first.insert(idx);
                        vanishes = false;
                        break;
                    }
                    Symbol::NonTerminal(_) => {
                        let nt_first = self.calculate_first_helper(idx, memo)?;
                        first.extend(nt_first.iter().filter(|&&s| s != LAMBDA_INDEX));
                        if !nt_first.contains(&LAMBDA_INDEX) {
                            vanishes = false;
                            break;
                        }
                    }
                }
            }
            if vanishes {
                first.insert(LAMBDA_INDEX);
            }
        }

        trace!(
            "FIRST({}) = {:?}",
            self.get_symbol_name(non_terminal),
            self.set_to_vec_str(Some(&first))
        );
        memo.insert(non_terminal, Memo::Done(first.clone()));
        Ok(first)
    }

    fn calculate_follow(
        &self,
        ff: &FirstFollow,
        start: usize,
    ) -> Result<HashMap<usize, BTreeSet<usize>>, GrammarError> {
        let mut follow: HashMap<usize, BTreeSet<usize>> = self
            .non_terminal_iter()
            .map(|nt| (nt.index, BTreeSet::new()))
            .collect();
        follow.entry(start).or_default().insert(END_MARK_INDEX);

        // A non-terminal index inside a FOLLOW set stands for "everything in the
        // FOLLOW set of that non-terminal" until the closure below resolves it.
        for production in &self.productions {
            for (i, &idx) in production.right.iter().enumerate() {
                if !self.symbols[idx].is_non_terminal() {
                    continue;
                }
                let rest = ff.first_of_sequence(self, &production.right[i + 1..]);
                let entry = follow.entry(idx).or_default();
                entry.extend(rest.iter().filter(|&&s| s != LAMBDA_INDEX));
                if rest.contains(&LAMBDA_INDEX) && production.left != idx {
                    entry.insert(production.left);
                }
            }
        }

        let non_terminals: Vec<usize> = self.non_terminal_iter().map(|nt| nt.index).collect();
        let bound = non_terminals.len() * non_terminals.len() + 1;
        let mut expanded: HashMap<usize, BTreeSet<usize>> = HashMap::new();
        let mut passes = 0;
        loop {
            let mut changed = false;
            for &nt in &non_terminals {
                let placeholders: Vec<usize> = follow[&nt]
                    .iter()
                    .cloned()
                    .filter(|&s| self.symbols[s].is_non_terminal())
                    .collect();
                for placeholder in placeholders {
                    let done = expanded.entry(nt).or_default();
                    let first_visit = done.insert(placeholder);
                    let inherited: Vec<usize> = if first_visit {
                        follow[&placeholder]
                            .iter()
                            .cloned()
                            .filter(|&s| s != nt && !done.contains(&s))
                            .collect()
                    } else {
                        Vec::new()
                    };

                    let entry = follow.entry(nt).or_default();
                    entry.remove(&placeholder);
                    if first_visit {
                        entry.extend(inherited);
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
            passes += 1;
            if passes > bound {
                return Err(GrammarError::FollowClosure { passes });
            }
        }
        trace!("FOLLOW closure settled after {} passes", passes);

        Ok(follow)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::GrammarError;
    use crate::Grammar;

    /// Grammar 4.28 of the dragon book, written with bracketed non-terminals.
    fn grammar_428() -> Grammar {
        Grammar::parse(
            "<E> -> <T> <E'>
             <E'> -> + <T> <E'>
             <E'> -> lambda
             <T> -> <F> <T'>
             <T'> -> * <F> <T'>
             <T'> -> lambda
             <F> -> ( <E> )
             <F> -> id",
        )
        .unwrap()
    }

    fn first_of<'a>(g: &'a Grammar, ff: &super::FirstFollow, name: &str) -> Vec<&'a str> {
        let idx = g.get_symbol_index(name).unwrap();
        let mut v = g.set_to_vec_str(ff.first(idx));
        v.sort();
        v
    }

    fn follow_of<'a>(g: &'a Grammar, ff: &super::FirstFollow, name: &str) -> Vec<&'a str> {
        let idx = g.get_symbol_index(name).unwrap();
        let mut v = g.set_to_vec_str(ff.follow(idx));
        v.sort();
        v
    }

    #[test]
    fn first_sets() {
        let g = grammar_428();
        let ff = g.calculate_first_follow().unwrap();
        assert_eq!(first_of(&g, &ff, "<E>"), vec!["(", "id"]);
        assert_eq!(first_of(&g, &ff, "<E'>"), vec!["+", "λ"]);
        assert_eq!(first_of(&g, &ff, "<T>"), vec!["(", "id"]);
        assert_eq!(first_of(&g, &ff, "<T'>"), vec!["*", "λ"]);
        assert_eq!(first_of(&g, &ff, "<F>"), vec!["(", "id"]);
    }

    #[test]
    fn follow_sets() {
        let g = grammar_428();
        let ff = g.calculate_first_follow().unwrap();
        assert_eq!(follow_of(&g, &ff, "<E>"), vec!["$", ")"]);
        assert_eq!(follow_of(&g, &ff, "<E'>"), vec!["$", ")"]);
        assert_eq!(follow_of(&g, &ff, "<T>"), vec!["$", ")", "+"]);
        assert_eq!(follow_of(&g, &ff, "<T'>"), vec!["$", ")", "+"]);
        assert_eq!(follow_of(&g, &ff, "<F>"), vec!["$", ")", "*", "+"]);
    }

    #[test]
    fn follow_of_start_contains_end_mark() {
        let g = Grammar::parse("<S> -> a <S> b\n<S> -> c").unwrap();
        let ff = g.calculate_first_follow().unwrap();
        assert_eq!(follow_of(&g, &ff, "<S>"), vec!["$", "b"]);
    }

    #[test]
    fn lambda_in_first_iff_nullable() {
        let g = Grammar::parse(
            "<S> -> <A> <B> c
             <A> -> a
             <A> -> lambda
             <B> -> <A> <A>
             <C> -> <A> b",
        )
        .unwrap();
        let ff = g.calculate_first_follow().unwrap();
        let nullable = |name: &str| ff.nullable(g.get_symbol_index(name).unwrap());
        assert!(nullable("<A>"));
        assert!(nullable("<B>"));
        assert!(!nullable("<S>"));
        assert!(!nullable("<C>"));
        assert_eq!(first_of(&g, &ff, "<S>"), vec!["a", "c"]);
        assert_eq!(first_of(&g, &ff, "<C>"), vec!["a", "b"]);
    }

    #[test]
    fn first_of_sequence_walks_nullable_prefix() {
        let g = grammar_428();
        let ff = g.calculate_first_follow().unwrap();
        let seq: Vec<usize> = ["<E'>", "<T'>", ")"]
            .iter()
            .map(|s| g.get_symbol_index(s).unwrap())
            .collect();
        let mut first = g.set_to_vec_str(Some(&ff.first_of_sequence(&g, &seq)));
        first.sort();
        assert_eq!(first, vec![")", "*", "+"]);

        let empty = ff.first_of_sequence(&g, &[]);
        assert_eq!(g.set_to_vec_str(Some(&empty)), vec!["λ"]);
    }

    #[test]
    fn mutually_dependent_follow_sets() {
        let g = Grammar::parse(
            "<S> -> <A> ;
             <A> -> x <B>
             <B> -> y <A>
             <B> -> lambda",
        )
        .unwrap();
        let ff = g.calculate_first_follow().unwrap();
        assert_eq!(follow_of(&g, &ff, "<A>"), vec![";"]);
        assert_eq!(follow_of(&g, &ff, "<B>"), vec![";"]);
    }

    #[test]
    fn left_recursion_is_reported() {
        let g = Grammar::parse("<E> -> <E> + <T>\n<E> -> <T>\n<T> -> id").unwrap();
        assert_eq!(
            g.calculate_first_follow(),
            Err(GrammarError::LeftRecursion {
                non_terminal: "<E>".to_string()
            })
        );
    }

    #[test]
    fn hidden_left_recursion_is_reported() {
        let g = Grammar::parse("<A> -> <N> <A> x\n<A> -> y\n<N> -> lambda").unwrap();
        assert!(matches!(
            g.calculate_first_follow(),
            Err(GrammarError::LeftRecursion { .. })
        ));
    }

    #[test]
    fn empty_grammar_has_no_sets() {
        let g = Grammar::parse("").unwrap();
        assert_eq!(g.calculate_first_follow(), Err(GrammarError::Empty));
    }
}
