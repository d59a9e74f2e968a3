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

//! Semantic types of the Crust language.

use std::fmt;

/// A Crust type as tracked by the analyzer.
///
/// `Unknown` is the inference placeholder: a binding starts out as
/// `Unknown` and is narrowed exactly once, by an annotation, an
/// initializer, or the first assignment. Once narrowed it never
/// changes again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemType {
    /// Not yet inferred.
    Unknown,
    /// `i32`.
    Int,
    /// `bool`.
    Bool,
    /// No value; the type of functions without a return value.
    Void,
    /// `[T; N]`.
    Array { elem: Box<SemType>, len: usize },
    /// `(T1, T2, ...)`.
    Tuple(Vec<SemType>),
}

impl SemType {
    pub fn is_unknown(&self) -> bool {
        matches!(self, SemType::Unknown)
    }

    /// Whether a value of this type can be printed.
    pub fn is_printable(&self) -> bool {
        matches!(self, SemType::Int | SemType::Bool)
    }
}

impl fmt::Display for SemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemType::Unknown => write!(f, "?"),
            SemType::Int => write!(f, "i32"),
            SemType::Bool => write!(f, "bool"),
            SemType::Void => write!(f, "()"),
            SemType::Array { elem, len } => write!(f, "[{}; {}]", elem, len),
            SemType::Tuple(parts) => {
                write!(f, "(")?;
                for (index, part) in parts.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", part)?;
                }
                write!(f, ")")
            }
        }
    }
}
