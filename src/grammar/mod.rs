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

//! Grammar model for the LL(1) parsing engine.
//!
//! A grammar is a set of productions over terminal and nonterminal
//! symbols, parsed from a plain-text definition with one nonterminal
//! per line:
//!
//! ```text
//! <head> -> alt1 @ alt2 @ ...
//! ```
//!
//! Nonterminals are angle-bracket-wrapped, terminals are bare tokens,
//! and the empty alternative is written `ε`.

pub mod sets;
pub mod table;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{CompileError, ErrorCode, Result};

/// The grammar of the Crust language, embedded in the binary.
pub const CRUST_GRAMMAR: &str = include_str!("crust.grammar");

/// The start nonterminal of the Crust grammar.
pub const START_SYMBOL: &str = "program";

/// Name of the empty-production marker terminal.
pub const EPSILON: &str = "eps";

/// Name of the end-of-input marker terminal.
pub const END_MARKER: &str = "$";

/// Whether a symbol is a terminal or a nonterminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolKind {
    Terminal,
    Nonterminal,
}

/// A grammar symbol, used as a map key throughout the parsing engine.
///
/// Equality and ordering are name+kind based.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
}

impl Symbol {
    /// Create a terminal symbol.
    pub fn terminal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Terminal,
        }
    }

    /// Create a nonterminal symbol.
    pub fn nonterminal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Nonterminal,
        }
    }

    /// The empty-production marker `ε`.
    pub fn epsilon() -> Self {
        Self::terminal(EPSILON)
    }

    /// The end-of-input marker `$`.
    pub fn end() -> Self {
        Self::terminal(END_MARKER)
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == SymbolKind::Terminal
    }

    pub fn is_nonterminal(&self) -> bool {
        self.kind == SymbolKind::Nonterminal
    }

    pub fn is_epsilon(&self) -> bool {
        self.kind == SymbolKind::Terminal && self.name == EPSILON
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SymbolKind::Terminal => write!(f, "{}", self.name),
            SymbolKind::Nonterminal => write!(f, "<{}>", self.name),
        }
    }
}

/// A single production `head -> body`.
///
/// Immutable once parsed from grammar text. The empty production has a
/// body of exactly `[ε]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub head: Symbol,
    pub body: Vec<Symbol>,
}

impl Production {
    /// Whether this production derives `ε` directly.
    pub fn is_epsilon(&self) -> bool {
        self.body.len() == 1 && self.body[0].is_epsilon()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.head)?;
        for part in &self.body {
            write!(f, " {}", part)?;
        }
        Ok(())
    }
}

/// A context-free grammar: productions plus symbol inventories.
#[derive(Debug, Clone)]
pub struct Grammar {
    /// The designated start nonterminal.
    pub start: Symbol,
    /// All productions in declaration order.
    pub productions: Vec<Production>,
    /// Production indices grouped by head.
    by_head: BTreeMap<Symbol, Vec<usize>>,
    /// All terminals appearing in the grammar.
    pub terminals: BTreeSet<Symbol>,
    /// All nonterminals appearing in the grammar.
    pub nonterminals: BTreeSet<Symbol>,
}

impl Grammar {
    /// Parse a grammar from its textual definition.
    ///
    /// Malformed lines are fatal: the run aborts before parsing starts.
    pub fn parse(text: &str, start: &str) -> Result<Self> {
        let mut productions = Vec::new();
        let mut by_head: BTreeMap<Symbol, Vec<usize>> = BTreeMap::new();
        let mut terminals = BTreeSet::new();
        let mut nonterminals = BTreeSet::new();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (head_str, body_str) = line.split_once("->").ok_or_else(|| {
                CompileError::at_line(
                    ErrorCode::MalformedGrammarLine,
                    format!("grammar line has no '->': {:?}", line),
                    line_no as u32 + 1,
                )
            })?;

            let head_name = head_str.trim().trim_matches(|c| c == '<' || c == '>');
            if head_name.is_empty() {
                return Err(CompileError::at_line(
                    ErrorCode::MalformedGrammarLine,
                    "grammar line has an empty head",
                    line_no as u32 + 1,
                ));
            }
            let head = Symbol::nonterminal(head_name);
            nonterminals.insert(head.clone());

            for alt in body_str.split('@') {
                let parts: Vec<&str> = alt.split_whitespace().collect();
                if parts.is_empty() {
                    return Err(CompileError::at_line(
                        ErrorCode::EmptyAlternative,
                        format!("empty alternative for <{}>", head_name),
                        line_no as u32 + 1,
                    ));
                }

                let mut body = Vec::with_capacity(parts.len());
                for part in parts {
                    let symbol = if part == "ε" || part == EPSILON {
                        Symbol::epsilon()
                    } else if let Some(name) = part.strip_prefix('<') {
                        let name = name.strip_suffix('>').ok_or_else(|| {
                            CompileError::at_line(
                                ErrorCode::MalformedGrammarLine,
                                format!("unterminated nonterminal {:?}", part),
                                line_no as u32 + 1,
                            )
                        })?;
                        Symbol::nonterminal(name)
                    } else {
                        Symbol::terminal(part)
                    };

                    match symbol.kind {
                        SymbolKind::Terminal => {
                            terminals.insert(symbol.clone());
                        }
                        SymbolKind::Nonterminal => {
                            nonterminals.insert(symbol.clone());
                        }
                    }
                    body.push(symbol);
                }

                by_head
                    .entry(head.clone())
                    .or_default()
                    .push(productions.len());
                productions.push(Production {
                    head: head.clone(),
                    body,
                });
            }
        }

        // Every nonterminal used in a body must itself have productions.
        for nt in &nonterminals {
            if !by_head.contains_key(nt) {
                return Err(CompileError::new(
                    ErrorCode::UnproductiveNonterminal,
                    format!("nonterminal <{}> has no productions", nt.name),
                ));
            }
        }

        let start = Symbol::nonterminal(start);
        if !by_head.contains_key(&start) {
            return Err(CompileError::new(
                ErrorCode::UnproductiveNonterminal,
                format!("start symbol <{}> has no productions", start.name),
            ));
        }

        Ok(Self {
            start,
            productions,
            by_head,
            terminals,
            nonterminals,
        })
    }

    /// Parse the built-in Crust grammar.
    pub fn crust() -> Result<Self> {
        Self::parse(CRUST_GRAMMAR, START_SYMBOL)
    }

    /// The productions whose head is `symbol`.
    pub fn productions_of(&self, symbol: &Symbol) -> &[usize] {
        self.by_head
            .get(symbol)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_symbol_display() {
        assert_eq!(Symbol::terminal("T_Id").to_string(), "T_Id");
        assert_eq!(Symbol::nonterminal("exp").to_string(), "<exp>");
    }

    #[test]
    fn test_symbol_identity_is_name_and_kind() {
        assert_ne!(Symbol::terminal("x"), Symbol::nonterminal("x"));
        assert_eq!(Symbol::terminal("x"), Symbol::terminal("x"));
    }

    #[test]
    fn test_parse_small_grammar() {
        let grammar = Grammar::parse("<S> -> a <S> b @ ε\n", "S").unwrap();
        assert_eq!(grammar.productions.len(), 2);
        assert_eq!(grammar.productions_of(&Symbol::nonterminal("S")).len(), 2);
        assert!(grammar.terminals.contains(&Symbol::terminal("a")));
        assert!(grammar.terminals.contains(&Symbol::epsilon()));
        assert!(grammar.productions[1].is_epsilon());
    }

    #[test]
    fn test_parse_rejects_missing_arrow() {
        let err = Grammar::parse("<S> a b\n", "S").unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedGrammarLine);
        assert!(err.code.is_fatal());
    }

    #[test]
    fn test_parse_rejects_empty_alternative() {
        let err = Grammar::parse("<S> -> a @ @ b\n", "S").unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyAlternative);
    }

    #[test]
    fn test_parse_rejects_undefined_nonterminal() {
        let err = Grammar::parse("<S> -> <T>\n", "S").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnproductiveNonterminal);
    }

    #[test]
    fn test_crust_grammar_parses() {
        let grammar = Grammar::crust().unwrap();
        assert_eq!(grammar.start, Symbol::nonterminal("program"));
        assert!(grammar.nonterminals.len() > 30);
        assert!(grammar.terminals.contains(&Symbol::terminal("T_Semicolon")));
    }

    #[test]
    fn test_production_display_round_trips_format() {
        let grammar = Grammar::parse("<S> -> a <S> b @ ε\n", "S").unwrap();
        assert_eq!(grammar.productions[0].to_string(), "<S> -> a <S> b");
        assert_eq!(grammar.productions[1].to_string(), "<S> -> eps");
    }
}
