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

//! Error types for the Crust compiler.
//!
//! This module defines all error types used throughout the compiler:
//! grammar errors (fatal), and lexical, syntax, and semantic errors
//! (recorded and recovered from).

use thiserror::Error;

/// Error codes for the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Grammar errors (G001-G010) - fatal, abort before parsing starts
    MalformedGrammarLine,
    EmptyAlternative,
    UnproductiveNonterminal,
    CircularGrammar,
    MalformedTable,

    // Lexical errors (E001-E010)
    InvalidCharacter,

    // Syntax errors (E100-E110)
    TerminalMismatch,
    SyncRecovery,
    SkippedToken,

    // Semantic errors (E200-E242)
    Redefinition,
    UndeclaredIdentifier,
    UninitializedVariable,
    TypeMismatch,
    CannotInferType,
    AssignToImmutable,
    TupleArityMismatch,
    ArrayIndexMustBeInt,
    NegativeIndex,
    IndexOutOfBounds,
    ArraySizeMustBePositive,
    ArrayLengthMismatch,
    UndeclaredFunction,
    WrongNumberOfArguments,
    ArgumentTypeMismatch,
    ReturnTypeMismatch,
    MissingReturnStatement,
    BreakOutsideLoop,
    ContinueOutsideLoop,
    UnsupportedPrintArgument,
    MissingMain,
    IncompatibleMain,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            // Grammar errors
            ErrorCode::MalformedGrammarLine => "G001",
            ErrorCode::EmptyAlternative => "G002",
            ErrorCode::UnproductiveNonterminal => "G003",
            ErrorCode::CircularGrammar => "G004",
            ErrorCode::MalformedTable => "G010",

            // Lexical errors
            ErrorCode::InvalidCharacter => "E001",

            // Syntax errors
            ErrorCode::TerminalMismatch => "E100",
            ErrorCode::SyncRecovery => "E101",
            ErrorCode::SkippedToken => "E102",

            // Semantic errors
            ErrorCode::Redefinition => "E200",
            ErrorCode::UndeclaredIdentifier => "E201",
            ErrorCode::UninitializedVariable => "E202",
            ErrorCode::TypeMismatch => "E210",
            ErrorCode::CannotInferType => "E211",
            ErrorCode::AssignToImmutable => "E212",
            ErrorCode::TupleArityMismatch => "E213",
            ErrorCode::ArrayIndexMustBeInt => "E214",
            ErrorCode::NegativeIndex => "E215",
            ErrorCode::IndexOutOfBounds => "E216",
            ErrorCode::ArraySizeMustBePositive => "E217",
            ErrorCode::ArrayLengthMismatch => "E218",
            ErrorCode::UndeclaredFunction => "E220",
            ErrorCode::WrongNumberOfArguments => "E221",
            ErrorCode::ArgumentTypeMismatch => "E222",
            ErrorCode::ReturnTypeMismatch => "E223",
            ErrorCode::MissingReturnStatement => "E224",
            ErrorCode::BreakOutsideLoop => "E230",
            ErrorCode::ContinueOutsideLoop => "E231",
            ErrorCode::UnsupportedPrintArgument => "E232",
            ErrorCode::MissingMain => "E240",
            ErrorCode::IncompatibleMain => "E241",
        }
    }

    /// Whether this error aborts the run before parsing starts.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorCode::MalformedGrammarLine
                | ErrorCode::EmptyAlternative
                | ErrorCode::UnproductiveNonterminal
                | ErrorCode::CircularGrammar
                | ErrorCode::MalformedTable
        )
    }
}

/// A compiler error with an optional source line.
#[derive(Debug, Clone, Error)]
#[error("[{code}] {message}")]
pub struct CompileError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// The source line where the error occurred (1-indexed), if known.
    pub line: Option<u32>,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl CompileError {
    /// Create a new compile error without a source line.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            line: None,
            hint: None,
        }
    }

    /// Create a new compile error at a source line.
    pub fn at_line(code: ErrorCode, message: impl Into<String>, line: u32) -> Self {
        Self {
            code,
            message: message.into(),
            line: Some(line),
            hint: None,
        }
    }

    /// Add a hint to this error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Get the error code string.
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }
}

/// Result type for compiler operations that can fail fatally.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Format an error with source context.
pub fn format_error(error: &CompileError, source: &str, filename: Option<&str>) -> String {
    let filename = filename.unwrap_or("<input>");

    let mut output = String::new();
    output.push_str(&format!("error[{}]: {}\n", error.code_str(), error.message));

    if let Some(line) = error.line {
        output.push_str(&format!("  --> {}:{}\n", filename, line));

        if let Some(content) = source.lines().nth(line as usize - 1) {
            let line_num_width = line.to_string().len();
            output.push_str(&format!("{:>width$} |\n", "", width = line_num_width));
            output.push_str(&format!("{} | {}\n", line, content));
        }
    } else {
        output.push_str(&format!("  --> {}\n", filename));
    }

    if let Some(hint) = &error.hint {
        output.push_str(&format!("  = hint: {}\n", hint));
    }

    output
}

/// A collection of compile errors.
#[derive(Debug, Default)]
pub struct Errors {
    errors: Vec<CompileError>,
}

impl Errors {
    /// Create a new empty error collection.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection.
    pub fn push(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get an iterator over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &CompileError> {
        self.errors.iter()
    }

    /// Convert into a vector of errors.
    pub fn into_vec(self) -> Vec<CompileError> {
        self.errors
    }
}

impl IntoIterator for Errors {
    type Item = CompileError;
    type IntoIter = std::vec::IntoIter<CompileError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl Extend<CompileError> for Errors {
    fn extend<T: IntoIterator<Item = CompileError>>(&mut self, iter: T) {
        self.errors.extend(iter);
    }
}
