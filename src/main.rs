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

//! Crust Compiler CLI
//!
//! Compiles Crust source files into portable C.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use crust::error::format_error;
use crust::Session;

/// Crust - a compiler for a small Rust-like language
#[derive(Parser, Debug)]
#[command(name = "crustc")]
#[command(version)]
#[command(about = "Compiles Crust source files into portable C")]
#[command(long_about = r#"
crustc compiles source files written in Crust, a small Rust-like
language, into a single C translation unit.

Example usage:
  crustc hello.crust
  crustc hello.crust -o hello.c
  crustc hello.crust --emit-tree

Parsing-table round trips:
  crustc --emit-table > crust.tbl
  crustc hello.crust --table crust.tbl
"#)]
struct Cli {
    /// Source file to compile (.crust)
    #[arg(required_unless_present = "emit_table")]
    source_file: Option<PathBuf>,

    /// Output C file (defaults to the source file with a .c extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the parse tree after parsing
    #[arg(long)]
    emit_tree: bool,

    /// Print the parsing table and exit when no source is given
    #[arg(long)]
    emit_table: bool,

    /// Reuse a previously emitted parsing table instead of building one
    #[arg(long)]
    table: Option<PathBuf>,

    /// Use a grammar file instead of the built-in Crust grammar
    #[arg(long, conflicts_with = "table")]
    grammar: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let session = match (&cli.table, &cli.grammar) {
        (Some(path), _) => match std::fs::read_to_string(path) {
            Ok(text) => Session::with_table_text(&text),
            Err(error) => {
                eprintln!("Error: Cannot read {}: {}", path.display(), error);
                return ExitCode::from(2);
            }
        },
        (None, Some(path)) => match std::fs::read_to_string(path) {
            Ok(text) => Session::with_grammar(&text, crust::grammar::START_SYMBOL),
            Err(error) => {
                eprintln!("Error: Cannot read {}: {}", path.display(), error);
                return ExitCode::from(2);
            }
        },
        (None, None) => Session::new(),
    };
    let session = match session {
        Ok(session) => session,
        Err(error) => {
            // A broken grammar or table is fatal before any source.
            eprintln!("Fatal: {}", error);
            return ExitCode::from(3);
        }
    };

    if cli.emit_table {
        print!("{}", session.table().to_text());
        if cli.source_file.is_none() {
            return ExitCode::SUCCESS;
        }
    }

    let source_path = cli.source_file.expect("clap enforces the source argument");
    let source = match std::fs::read_to_string(&source_path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Error: Cannot read {}: {}", source_path.display(), error);
            return ExitCode::from(2);
        }
    };

    if cli.verbose {
        println!("Compiling {}...", source_path.display());
    }

    let artifacts = match session.compile(&source) {
        Ok(artifacts) => artifacts,
        Err(errors) => {
            let filename = source_path.display().to_string();
            for error in &errors {
                eprintln!("{}", format_error(error, &source, Some(&filename)));
            }
            eprintln!(
                "{} error{} found, no output written",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            );
            return ExitCode::from(1);
        }
    };

    if cli.emit_tree {
        print!("{}", artifacts.tree.render());
    }
    if cli.verbose {
        print!("{}", artifacts.analysis.symbols);
    }

    let output_path = cli
        .output
        .unwrap_or_else(|| source_path.with_extension("c"));
    if let Err(error) = std::fs::write(&output_path, &artifacts.c_source) {
        eprintln!("Error: Cannot write {}: {}", output_path.display(), error);
        return ExitCode::from(2);
    }
    if cli.verbose {
        println!("Wrote {}", output_path.display());
    }

    ExitCode::SUCCESS
}
