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

//! Grammar engine tests: grammar parsing, FIRST/FOLLOW sets, and the
//! parsing table with its persistence format.

use crust::grammar::table::{is_total_over_recovery, ParseTable, TableEntry, RECOVERY_TERMINALS};
use crust::grammar::Grammar;
use crust::{ErrorCode, FirstFollow, Session, Symbol};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn crust_setup() -> (Grammar, FirstFollow, ParseTable) {
    let grammar = Grammar::crust().expect("built-in grammar must parse");
    let sets = FirstFollow::compute(&grammar).expect("built-in grammar must be acyclic");
    let table = ParseTable::build(&grammar, &sets);
    (grammar, sets, table)
}

// ============================================================================
// Grammar Parsing
// ============================================================================

/// Malformed grammar text aborts before anything else runs.
#[test_case("<S> a b\n", ErrorCode::MalformedGrammarLine; "missing_arrow")]
#[test_case("<S> -> a @ @ b\n", ErrorCode::EmptyAlternative; "empty_alternative")]
#[test_case("<S> -> <T>\n", ErrorCode::UnproductiveNonterminal; "undefined_nonterminal")]
fn test_malformed_grammars_are_fatal(text: &str, expected: ErrorCode) {
    let err = Grammar::parse(text, "S").unwrap_err();
    assert_eq!(err.code, expected);
    assert!(err.code.is_fatal());
}

#[test]
fn test_left_recursion_is_fatal() {
    let grammar = Grammar::parse("<S> -> <S> a @ b\n", "S").unwrap();
    let err = FirstFollow::compute(&grammar).unwrap_err();
    assert_eq!(err.code, ErrorCode::CircularGrammar);
    assert!(err.code.is_fatal());
}

// ============================================================================
// FIRST / FOLLOW
// ============================================================================

/// FIRST of a terminal is exactly the terminal itself.
#[test]
fn test_first_of_every_terminal_is_itself() {
    let (grammar, sets, _) = crust_setup();
    for terminal in &grammar.terminals {
        let first = sets.first(terminal);
        assert_eq!(first.len(), 1, "FIRST({}) has more than one entry", terminal);
        assert!(first.contains(terminal));
    }
}

#[test]
fn test_nullable_nonterminals_carry_epsilon() {
    let (_, sets, _) = crust_setup();
    for name in ["func_ls", "param_ls", "stmt_ls", "else_opt", "ret_val"] {
        let symbol = Symbol::nonterminal(name);
        assert!(
            sets.first(&symbol).contains(&Symbol::epsilon()),
            "<{}> should be nullable",
            name
        );
    }
    for name in ["func", "stmt", "exp", "var_decl"] {
        let symbol = Symbol::nonterminal(name);
        assert!(
            !sets.first(&symbol).contains(&Symbol::epsilon()),
            "<{}> should not be nullable",
            name
        );
    }
}

#[test]
fn test_follow_of_start_has_end_marker() {
    let (grammar, sets, _) = crust_setup();
    assert!(sets.follow(&grammar.start).contains(&Symbol::end()));
}

/// The expression ladder inherits its followers from statement context.
#[test]
fn test_follow_of_expression_contains_statement_enders() {
    let (_, sets, _) = crust_setup();
    let exp = Symbol::nonterminal("exp");
    let follow = sets.follow(&exp);
    assert!(follow.contains(&Symbol::terminal("T_Semicolon")));
    assert!(follow.contains(&Symbol::terminal("T_RP")));
    assert!(follow.contains(&Symbol::terminal("T_RB")));
    assert!(follow.contains(&Symbol::terminal("T_LC")));
}

// ============================================================================
// Parsing Table
// ============================================================================

/// Every nonterminal has a defined action on `;` and `}`.
#[test]
fn test_table_is_total_over_recovery_terminals() {
    let (grammar, _, table) = crust_setup();
    assert!(is_total_over_recovery(&table, &grammar));
    for nonterminal in &grammar.nonterminals {
        for name in RECOVERY_TERMINALS {
            assert!(
                table.get(nonterminal, &Symbol::terminal(name)).is_some(),
                "({}, {}) is undefined",
                nonterminal,
                name
            );
        }
    }
}

/// LL(1) selection: the statement dispatcher picks one production per
/// lookahead.
#[test_case("T_Let", "var_decl"; "let_selects_declaration")]
#[test_case("T_If", "if_stmt"; "if_selects_conditional")]
#[test_case("T_Loop", "loop_stmt"; "loop_selects_loop")]
#[test_case("T_Return", "ret_stmt"; "return_selects_return")]
#[test_case("T_Break", "break_stmt"; "break_selects_break")]
#[test_case("T_Print", "print_stmt"; "print_selects_print")]
fn test_statement_dispatch(lookahead: &str, expected_head: &str) {
    let (_, _, table) = crust_setup();
    let stmt = Symbol::nonterminal("stmt");
    match table.get(&stmt, &Symbol::terminal(lookahead)) {
        Some(TableEntry::Rule(production)) => {
            assert_eq!(production.body[0], Symbol::nonterminal(expected_head));
        }
        other => panic!("expected a rule on (stmt, {}), got {:?}", lookahead, other),
    }
}

#[test]
fn test_table_round_trips_through_text() {
    let (_, _, table) = crust_setup();
    let reloaded = ParseTable::from_text(&table.to_text()).unwrap();
    assert_eq!(table, reloaded);
}

#[test]
fn test_table_round_trips_through_a_file() {
    let (_, _, table) = crust_setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crust.tbl");

    std::fs::write(&path, table.to_text()).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let reloaded = ParseTable::from_text(&text).unwrap();
    assert_eq!(table, reloaded);
}

#[test]
fn test_reloaded_table_drives_an_identical_parse() {
    let built = Session::new().unwrap();
    let reloaded = Session::with_table_text(&built.table().to_text()).unwrap();

    let source = "fn main() { let x = 1 + 2 * 3; if x > 3 { println!(x); } }\n";
    let first = built.compile(source).unwrap();
    let second = reloaded.compile(source).unwrap();
    assert_eq!(first.tree.render(), second.tree.render());
    assert_eq!(first.c_source, second.c_source);
}

#[test]
fn test_malformed_table_text_is_fatal() {
    let err = ParseTable::from_text("# <S>\nSYNCH\n").unwrap_err();
    assert_eq!(err.code, ErrorCode::MalformedTable);
    assert!(err.code.is_fatal());

    let err = ParseTable::from_text("<S> -> a\n").unwrap_err();
    assert_eq!(err.code, ErrorCode::MalformedTable);
}
