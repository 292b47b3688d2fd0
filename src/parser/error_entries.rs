use std::collections::HashMap;

use log::warn;

/// Token key that matches any token for a non-terminal.
pub const ANY_TOKEN: &str = "?";

/// Custom syntax error messages keyed by non-terminal and offending token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEntries {
    table: HashMap<String, HashMap<String, String>>,
}

impl ErrorEntries {
    pub fn parse(entries: &str) -> Self {
        Self::load(entries.lines())
    }

    /// Reads lines of the form `<NonTerminal> token | message words...`.
    /// Lines of any other shape are skipped.
    pub fn load<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = Self::default();
        for (i, line) in lines.into_iter().enumerate() {
            let parts: Vec<&str> = line.as_ref().split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }
            if parts.len() < 4 || parts[2] != "|" {
                warn!("error entries line {}: skipped \"{}\"", i + 1, line.as_ref());
                continue;
            }
            entries.insert(parts[0], parts[1], &parts[3..].join(" "));
        }
        entries
    }

    pub fn insert(&mut self, non_terminal: &str, token: &str, message: &str) {
        self.table
            .entry(non_terminal.to_string())
            .or_default()
            .insert(token.to_string(), message.to_string());
    }

    /// Message for `token` under `non_terminal`, falling back to the `?` entry.
    pub fn lookup(&self, non_terminal: &str, token: &str) -> Option<&str> {
        let messages = self.table.get(non_terminal)?;
        messages
            .get(token)
            .or_else(|| messages.get(ANY_TOKEN))
            .map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.table.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
