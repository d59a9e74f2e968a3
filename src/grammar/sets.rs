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

//! FIRST and FOLLOW set computation.
//!
//! FIRST sets are computed by a memoized recursive visit over the
//! productions of each symbol. FOLLOW sets are computed in two phases:
//! a direct scan of every rule position, which also records a
//! dependency edge `head -> X` wherever FOLLOW(head) must flow into
//! FOLLOW(X), followed by worklist relaxation over that edge graph
//! until a fixpoint is reached. Both computations are bounded by the
//! terminal alphabet, so they always terminate on a well-formed grammar.

use std::collections::{BTreeMap, BTreeSet};

use super::{Grammar, Symbol};
use crate::error::{CompileError, ErrorCode, Result};

/// Visit state for the memoized FIRST computation.
///
/// The in-progress marker catches malformed circular grammars that
/// plain memoization would loop on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// The FIRST and FOLLOW sets of a grammar.
#[derive(Debug, Clone)]
pub struct FirstFollow {
    firsts: BTreeMap<Symbol, BTreeSet<Symbol>>,
    follows: BTreeMap<Symbol, BTreeSet<Symbol>>,
}

impl FirstFollow {
    /// Compute FIRST and FOLLOW sets for a grammar.
    pub fn compute(grammar: &Grammar) -> Result<Self> {
        let mut solver = Solver {
            grammar,
            firsts: BTreeMap::new(),
            marks: BTreeMap::new(),
        };

        for terminal in &grammar.terminals {
            solver.first_of(terminal)?;
        }
        for nonterminal in &grammar.nonterminals {
            solver.first_of(nonterminal)?;
        }

        let firsts = solver.firsts;
        let follows = compute_follows(grammar, &firsts);

        Ok(Self { firsts, follows })
    }

    /// FIRST(X): the terminals (plus possibly `ε`) that can begin a
    /// string derived from X.
    pub fn first(&self, symbol: &Symbol) -> &BTreeSet<Symbol> {
        static EMPTY: BTreeSet<Symbol> = BTreeSet::new();
        self.firsts.get(symbol).unwrap_or(&EMPTY)
    }

    /// FOLLOW(X): the terminals that can immediately follow X in some
    /// derivation from the start symbol. Only defined for nonterminals.
    pub fn follow(&self, symbol: &Symbol) -> &BTreeSet<Symbol> {
        static EMPTY: BTreeSet<Symbol> = BTreeSet::new();
        self.follows.get(symbol).unwrap_or(&EMPTY)
    }

    /// FIRST of a symbol sequence: the union of FIRST along the
    /// sequence while `ε` remains derivable, plus a nullability flag
    /// for the whole sequence.
    pub fn first_of_sequence(&self, sequence: &[Symbol]) -> (BTreeSet<Symbol>, bool) {
        let mut set = BTreeSet::new();
        for symbol in sequence {
            let mut has_epsilon = false;
            for first in self.first(symbol) {
                if first.is_epsilon() {
                    has_epsilon = true;
                } else {
                    set.insert(first.clone());
                }
            }
            if !has_epsilon {
                return (set, false);
            }
        }
        (set, true)
    }
}

struct Solver<'g> {
    grammar: &'g Grammar,
    firsts: BTreeMap<Symbol, BTreeSet<Symbol>>,
    marks: BTreeMap<Symbol, Mark>,
}

impl Solver<'_> {
    /// Memoized recursive FIRST computation for one symbol.
    fn first_of(&mut self, symbol: &Symbol) -> Result<()> {
        match self.marks.get(symbol).copied().unwrap_or(Mark::Unvisited) {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                return Err(CompileError::new(
                    ErrorCode::CircularGrammar,
                    format!("grammar is left-recursive or circular at {}", symbol),
                ));
            }
            Mark::Unvisited => {}
        }

        if symbol.is_terminal() {
            self.firsts
                .entry(symbol.clone())
                .or_default()
                .insert(symbol.clone());
            self.marks.insert(symbol.clone(), Mark::Done);
            return Ok(());
        }

        self.marks.insert(symbol.clone(), Mark::InProgress);

        let production_indices = self.grammar.productions_of(symbol).to_vec();
        for index in production_indices {
            let body = self.grammar.productions[index].body.clone();
            let mut all_epsilon = true;

            for part in &body {
                self.first_of(part)?;

                let mut has_epsilon = false;
                let part_firsts: Vec<Symbol> =
                    self.firsts.get(part).into_iter().flatten().cloned().collect();
                for first in part_firsts {
                    if first.is_epsilon() {
                        has_epsilon = true;
                    } else {
                        self.firsts.entry(symbol.clone()).or_default().insert(first);
                    }
                }

                if !has_epsilon {
                    all_epsilon = false;
                    break;
                }
            }

            if all_epsilon {
                self.firsts
                    .entry(symbol.clone())
                    .or_default()
                    .insert(Symbol::epsilon());
            }
        }

        self.firsts.entry(symbol.clone()).or_default();
        self.marks.insert(symbol.clone(), Mark::Done);
        Ok(())
    }
}

/// Compute FOLLOW sets: direct rule-position scan plus worklist
/// relaxation over the recorded dependency graph.
fn compute_follows(
    grammar: &Grammar,
    firsts: &BTreeMap<Symbol, BTreeSet<Symbol>>,
) -> BTreeMap<Symbol, BTreeSet<Symbol>> {
    let mut follows: BTreeMap<Symbol, BTreeSet<Symbol>> = BTreeMap::new();
    // Edges head -> X meaning FOLLOW(head) flows into FOLLOW(X).
    let mut graph: BTreeMap<Symbol, BTreeSet<Symbol>> = BTreeMap::new();

    follows
        .entry(grammar.start.clone())
        .or_default()
        .insert(Symbol::end());

    for nonterminal in &grammar.nonterminals {
        follows.entry(nonterminal.clone()).or_default();
    }

    // Direct phase: for every occurrence of a nonterminal, union in
    // FIRST of the suffix; if the suffix can derive ε, defer to the
    // relaxation phase via a dependency edge (FOLLOW(head) may still
    // be incomplete here).
    for production in &grammar.productions {
        let body = &production.body;
        for (position, symbol) in body.iter().enumerate() {
            if !symbol.is_nonterminal() {
                continue;
            }

            let mut suffix_nullable = true;
            for later in &body[position + 1..] {
                let mut has_epsilon = false;
                if let Some(later_firsts) = firsts.get(later) {
                    for first in later_firsts {
                        if first.is_epsilon() {
                            has_epsilon = true;
                        } else {
                            follows
                                .entry(symbol.clone())
                                .or_default()
                                .insert(first.clone());
                        }
                    }
                }
                if !has_epsilon {
                    suffix_nullable = false;
                    break;
                }
            }

            if suffix_nullable && production.head != *symbol {
                graph
                    .entry(production.head.clone())
                    .or_default()
                    .insert(symbol.clone());
            }
        }
    }

    // Relaxation phase: propagate along edges until no FOLLOW set
    // grows. Terminates because sets grow monotonically and are
    // bounded by the terminal alphabet.
    let mut pending: BTreeSet<Symbol> = grammar.nonterminals.iter().cloned().collect();
    while let Some(current) = pending.pop_first() {
        let Some(successors) = graph.get(&current) else {
            continue;
        };
        let source: BTreeSet<Symbol> = follows.get(&current).cloned().unwrap_or_default();
        for successor in successors.clone() {
            let target = follows.entry(successor.clone()).or_default();
            let old_size = target.len();
            target.extend(source.iter().cloned());
            if target.len() > old_size {
                pending.insert(successor);
            }
        }
    }

    follows
}
