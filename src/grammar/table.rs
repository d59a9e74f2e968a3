// Crust - a compiler for a small Rust-like language that lowers to C
// Copyright (C) 2026  Crust contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Predictive parsing table construction and persistence.
//!
//! The table maps `(nonterminal, lookahead terminal)` to a production
//! or a `Synch` recovery marker; an absent cell means "skip the input
//! token" during panic-mode recovery. The table can be serialized to a
//! flat text file and reloaded so that it does not have to be rebuilt
//! on every run.

use std::collections::BTreeMap;
use std::fmt;

use super::sets::FirstFollow;
use super::{Grammar, Production, Symbol};
use crate::error::{CompileError, ErrorCode, Result};

/// The two terminals every nonterminal must have a defined action for,
/// so the driver can always resynchronize after an error.
pub const RECOVERY_TERMINALS: [&str; 2] = ["T_Semicolon", "T_RC"];

/// One parsing-table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEntry {
    /// Expand this production.
    Rule(Production),
    /// Pop the nonterminal without consuming input.
    Synch,
}

impl fmt::Display for TableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableEntry::Rule(production) => write!(f, "{}", production),
            TableEntry::Synch => write!(f, "SYNCH"),
        }
    }
}

/// The predictive parsing table of an LL(1) grammar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseTable {
    entries: BTreeMap<(Symbol, Symbol), TableEntry>,
}

impl ParseTable {
    /// Build the parsing table from a grammar and its FIRST/FOLLOW sets.
    ///
    /// Conflicting cells are resolved last-write-wins: a well-formed
    /// LL(1) grammar never conflicts, so a silent overwrite is a
    /// grammar-quality defect rather than a runtime error.
    pub fn build(grammar: &Grammar, sets: &FirstFollow) -> Self {
        let mut entries = BTreeMap::new();

        for production in &grammar.productions {
            let head = &production.head;
            let mut all_epsilon = true;

            for part in &production.body {
                let mut has_epsilon = false;
                for first in sets.first(part) {
                    if first.is_epsilon() {
                        has_epsilon = true;
                    } else {
                        entries.insert(
                            (head.clone(), first.clone()),
                            TableEntry::Rule(production.clone()),
                        );
                    }
                }
                if !has_epsilon {
                    all_epsilon = false;
                    break;
                }
            }

            if all_epsilon {
                for terminal in sets.follow(head) {
                    entries.insert(
                        (head.clone(), terminal.clone()),
                        TableEntry::Rule(production.clone()),
                    );
                }
            } else {
                for terminal in sets.follow(head) {
                    let key = (head.clone(), terminal.clone());
                    if !matches!(entries.get(&key), Some(TableEntry::Rule(_))) {
                        entries.insert(key, TableEntry::Synch);
                    }
                }
            }
        }

        // Guarantee an action on the recovery terminals for every
        // nonterminal, so the driver never hits an undefined state on
        // `;` or `}`.
        for nonterminal in &grammar.nonterminals {
            for name in RECOVERY_TERMINALS {
                let key = (nonterminal.clone(), Symbol::terminal(name));
                if !matches!(entries.get(&key), Some(TableEntry::Rule(_))) {
                    entries.insert(key, TableEntry::Synch);
                }
            }
        }

        Self { entries }
    }

    /// Look up the action for a nonterminal and a lookahead terminal.
    /// `None` means an empty cell: report, skip the token, retry.
    pub fn get(&self, nonterminal: &Symbol, lookahead: &Symbol) -> Option<&TableEntry> {
        self.entries
            .get(&(nonterminal.clone(), lookahead.clone()))
    }

    /// Number of defined cells.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the table to its flat text format: a `# head lookahead`
    /// header line followed by a line holding the production or the
    /// `SYNCH` literal.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for ((head, lookahead), entry) in &self.entries {
            out.push_str(&format!("# {} {}\n", head, lookahead));
            out.push_str(&format!("{}\n", entry));
        }
        out
    }

    /// Load a table from its flat text format.
    ///
    /// `EMPTY` records are accepted and ignored: an absent cell already
    /// means empty.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        let mut current_key: Option<(Symbol, Symbol)> = None;

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let malformed = |message: String| {
                CompileError::at_line(ErrorCode::MalformedTable, message, line_no as u32 + 1)
            };

            if let Some(rest) = line.strip_prefix('#') {
                let parts: Vec<&str> = rest.split_whitespace().collect();
                if parts.len() != 2 {
                    return Err(malformed(format!("malformed table header: {:?}", line)));
                }
                let head_name = parts[0].trim_matches(|c| c == '<' || c == '>');
                if head_name.is_empty() {
                    return Err(malformed(format!("empty head in table header: {:?}", line)));
                }
                current_key = Some((
                    Symbol::nonterminal(head_name),
                    Symbol::terminal(parts[1]),
                ));
                continue;
            }

            let key = current_key
                .take()
                .ok_or_else(|| malformed(format!("table record without header: {:?}", line)))?;

            if line == "SYNCH" {
                entries.insert(key, TableEntry::Synch);
            } else if line == "EMPTY" {
                // Absent cell; nothing to insert.
            } else {
                let production = parse_production(line)
                    .ok_or_else(|| malformed(format!("malformed production: {:?}", line)))?;
                entries.insert(key, TableEntry::Rule(production));
            }
        }

        Ok(Self { entries })
    }

    /// Iterate over all defined cells.
    pub fn iter(&self) -> impl Iterator<Item = (&(Symbol, Symbol), &TableEntry)> {
        self.entries.iter()
    }
}

/// Parse one `<head> -> sym sym ...` production line.
fn parse_production(line: &str) -> Option<Production> {
    let (head_str, body_str) = line.split_once("->")?;
    let head_name = head_str.trim().trim_matches(|c| c == '<' || c == '>');
    if head_name.is_empty() {
        return None;
    }

    let mut body = Vec::new();
    for part in body_str.split_whitespace() {
        let symbol = if part == "ε" || part == super::EPSILON {
            Symbol::epsilon()
        } else if let Some(name) = part.strip_prefix('<') {
            Symbol::nonterminal(name.strip_suffix('>')?)
        } else {
            Symbol::terminal(part)
        };
        body.push(symbol);
    }
    if body.is_empty() {
        return None;
    }

    Some(Production {
        head: Symbol::nonterminal(head_name),
        body,
    })
}

/// Check that the table defines an action on both recovery terminals
/// for every nonterminal of the grammar.
pub fn is_total_over_recovery(table: &ParseTable, grammar: &Grammar) -> bool {
    grammar.nonterminals.iter().all(|nonterminal| {
        RECOVERY_TERMINALS.iter().all(|name| {
            table.get(nonterminal, &Symbol::terminal(*name)).is_some()
        })
    })
}

impl fmt::Display for ParseTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ((head, lookahead), entry) in &self.entries {
            writeln!(f, "{:<20} {:<16} {}", head.to_string(), lookahead.name, entry)?;
        }
        Ok(())
    }
}
