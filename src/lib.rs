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

//! Crust Compiler Library
//!
//! A grammar-driven compiler front end for Crust, a small Rust-like
//! language, lowering to portable C.
//!
//! # Modules
//!
//! - [`error`] - Error types and error reporting
//! - [`grammar`] - Grammar model, FIRST/FOLLOW solver, parsing table
//! - [`lexer`] - Tokenization of source code
//! - [`parser`] - Table-driven predictive parsing into a parse tree
//! - [`analyzer`] - Scoped semantic analysis and constant folding
//! - [`codegen`] - C code emission
//!
//! # Example
//!
//! ```no_run
//! use crust::Session;
//!
//! fn compile(source: &str) -> Result<String, Box<dyn std::error::Error>> {
//!     let session = Session::new()?;
//!     let artifacts = session
//!         .compile(source)
//!         .map_err(|errors| errors.into_iter().next().unwrap())?;
//!     Ok(artifacts.c_source)
//! }
//! ```

pub mod analyzer;
pub mod codegen;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;

// Re-export commonly used types
pub use analyzer::{Analysis, SemType};
pub use error::{format_error, CompileError, ErrorCode, Result};
pub use grammar::sets::FirstFollow;
pub use grammar::table::ParseTable;
pub use grammar::{Grammar, Symbol};
pub use lexer::Token;
pub use parser::ParseTree;

/// The version of the Crust compiler.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of the compiler.
pub const NAME: &str = "Crust";

/// Everything a successful compilation produces.
#[derive(Debug)]
pub struct Artifacts {
    /// The parse tree of the program.
    pub tree: ParseTree,
    /// Symbols, types, and folded constants.
    pub analysis: Analysis,
    /// The emitted C translation unit.
    pub c_source: String,
}

/// A compilation session: the grammar, its FIRST/FOLLOW sets, and the
/// parsing table, built once and reused across compilations.
#[derive(Debug)]
pub struct Session {
    grammar: Grammar,
    sets: FirstFollow,
    table: ParseTable,
}

impl Session {
    /// Build a session for the built-in Crust grammar.
    ///
    /// Grammar problems (left recursion, unproductive nonterminals)
    /// are fatal and surface here, before any source is touched.
    pub fn new() -> Result<Self> {
        Self::with_grammar(grammar::CRUST_GRAMMAR, grammar::START_SYMBOL)
    }

    /// Build a session for an arbitrary grammar text.
    pub fn with_grammar(text: &str, start: &str) -> Result<Self> {
        let grammar = Grammar::parse(text, start)?;
        let sets = FirstFollow::compute(&grammar)?;
        let table = ParseTable::build(&grammar, &sets);
        Ok(Self {
            grammar,
            sets,
            table,
        })
    }

    /// Build a session for the Crust grammar with a previously
    /// persisted parsing table instead of a freshly built one.
    pub fn with_table_text(table_text: &str) -> Result<Self> {
        let grammar = Grammar::crust()?;
        let sets = FirstFollow::compute(&grammar)?;
        let table = ParseTable::from_text(table_text)?;
        Ok(Self {
            grammar,
            sets,
            table,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn sets(&self) -> &FirstFollow {
        &self.sets
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    /// Compile Crust source code to C.
    ///
    /// All lexical, syntactic, and semantic errors are collected and
    /// returned together; artifacts are withheld whenever any stage
    /// reported an error.
    pub fn compile(&self, source: &str) -> std::result::Result<Artifacts, Vec<CompileError>> {
        let (tokens, mut errors) = lexer::tokenize(source);

        let outcome = parser::parse(&tokens, &self.table, &self.grammar.start);
        errors.extend(outcome.errors);
        if !errors.is_empty() {
            // Analyzing a broken tree would only add noise.
            return Err(errors);
        }

        let analysis = analyzer::analyze(&outcome.tree);
        if !analysis.is_ok() {
            return Err(analysis.errors);
        }

        let c_source = codegen::emit(&outcome.tree, &analysis);
        Ok(Artifacts {
            tree: outcome.tree,
            analysis,
            c_source,
        })
    }
}

/// Compile Crust source code to C in a one-shot session.
pub fn compile(source: &str) -> std::result::Result<String, Vec<CompileError>> {
    let session = Session::new().map_err(|error| vec![error])?;
    session.compile(source).map(|artifacts| artifacts.c_source)
}
