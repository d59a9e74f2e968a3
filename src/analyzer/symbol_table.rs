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

//! Two-level scoped symbol table.
//!
//! Bindings live in an arena and never move; contexts hold per-name
//! shadowing stacks of arena ids. The global context (named by the
//! empty string) holds functions; each function gets its own context
//! for variables. Closing a scope pops the ids introduced at that
//! depth but leaves the bindings in the arena, so later passes can
//! still resolve a declaration site to its final, refined binding.

use std::collections::BTreeMap;
use std::fmt;

use crate::analyzer::symbol::Binding;
use crate::error::{CompileError, ErrorCode};

/// Name of the global context.
pub const GLOBAL: &str = "";

/// A stable index into the symbol arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub usize);

#[derive(Debug, Default)]
pub struct SymbolTable {
    arena: Vec<Binding>,
    contexts: BTreeMap<String, BTreeMap<String, Vec<SymbolId>>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Introduce a binding in `context`.
    ///
    /// A clash with a binding of the same name at the same depth is a
    /// redefinition; the existing binding stays authoritative.
    pub fn define(&mut self, context: &str, binding: Binding) -> Result<SymbolId, CompileError> {
        let visible = self
            .contexts
            .get(context)
            .and_then(|names| names.get(&binding.name))
            .and_then(|stack| stack.last().copied());
        if let Some(top) = visible {
            if self.arena[top.0].depth == binding.depth {
                let what = if binding.is_function() {
                    "function"
                } else {
                    "variable"
                };
                return Err(CompileError::at_line(
                    ErrorCode::Redefinition,
                    format!("{} '{}' is already defined in this scope", what, binding.name),
                    binding.line,
                ));
            }
        }

        let id = SymbolId(self.arena.len());
        let name = binding.name.clone();
        self.arena.push(binding);
        self.contexts
            .entry(context.to_string())
            .or_default()
            .entry(name)
            .or_default()
            .push(id);
        Ok(id)
    }

    /// Resolve a name to its innermost visible binding in `context`.
    pub fn lookup(&self, context: &str, name: &str) -> Option<SymbolId> {
        self.contexts
            .get(context)?
            .get(name)?
            .last()
            .copied()
    }

    /// Borrow a binding by id.
    pub fn binding(&self, id: SymbolId) -> &Binding {
        &self.arena[id.0]
    }

    /// Mutably borrow a binding by id.
    pub fn binding_mut(&mut self, id: SymbolId) -> &mut Binding {
        &mut self.arena[id.0]
    }

    /// Pop every binding introduced in `context` at `depth`.
    ///
    /// The bindings stay in the arena; only their visibility ends.
    pub fn close_scope(&mut self, context: &str, depth: u32) {
        let Some(names) = self.contexts.get_mut(context) else {
            return;
        };
        for stack in names.values_mut() {
            while let Some(&top) = stack.last() {
                if self.arena[top.0].depth == depth {
                    stack.pop();
                } else {
                    break;
                }
            }
        }
    }

    /// All bindings ever defined, in definition order.
    pub fn bindings(&self) -> impl Iterator<Item = (SymbolId, &Binding)> {
        self.arena
            .iter()
            .enumerate()
            .map(|(index, binding)| (SymbolId(index), binding))
    }

    /// All function bindings in definition order.
    pub fn functions(&self) -> impl Iterator<Item = (SymbolId, &Binding)> {
        self.bindings().filter(|(_, binding)| binding.is_function())
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, binding) in self.bindings() {
            if binding.is_function() {
                let params: Vec<String> = binding
                    .params
                    .iter()
                    .map(|(name, ty)| format!("{}: {}", name, ty))
                    .collect();
                writeln!(
                    f,
                    "#{} fn {}({}) -> {}",
                    id.0,
                    binding.name,
                    params.join(", "),
                    binding.ty
                )?;
            } else {
                writeln!(
                    f,
                    "#{} {}{}: {} (depth {})",
                    id.0,
                    if binding.mutable { "mut " } else { "" },
                    binding.name,
                    binding.ty,
                    binding.depth
                )?;
            }
        }
        Ok(())
    }
}
