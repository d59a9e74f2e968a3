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

//! Symbol bindings.

use crate::analyzer::fold::ConstValue;
use crate::analyzer::types::SemType;

/// What a binding names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    Parameter,
    Function,
}

/// One named entity: a variable in a function context, or a function
/// in the global context.
///
/// For variables `ty` is the variable's type; for functions it is the
/// return type. A binding's type starts as `Unknown` when the source
/// leaves it open and is narrowed exactly once.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    pub ty: SemType,
    pub mutable: bool,
    /// Scope nesting depth the binding was introduced at. Functions
    /// live at depth 0, function parameters and body variables at 1+.
    pub depth: u32,
    /// Parameter names and types, functions only.
    pub params: Vec<(String, SemType)>,
    /// Folded value, for immutable variables with a constant
    /// initializer.
    pub constant: Option<ConstValue>,
    /// Source line of the declaration.
    pub line: u32,
}

impl Binding {
    pub fn variable(name: impl Into<String>, mutable: bool, depth: u32, line: u32) -> Self {
        Self {
            name: name.into(),
            kind: BindingKind::Variable,
            ty: SemType::Unknown,
            mutable,
            depth,
            params: Vec::new(),
            constant: None,
            line,
        }
    }

    pub fn parameter(name: impl Into<String>, depth: u32, line: u32) -> Self {
        Self {
            name: name.into(),
            kind: BindingKind::Parameter,
            ty: SemType::Unknown,
            mutable: false,
            depth,
            params: Vec::new(),
            constant: None,
            line,
        }
    }

    pub fn function(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            kind: BindingKind::Function,
            ty: SemType::Unknown,
            mutable: false,
            depth: 0,
            params: Vec::new(),
            constant: None,
            line,
        }
    }

    pub fn is_function(&self) -> bool {
        self.kind == BindingKind::Function
    }
}
