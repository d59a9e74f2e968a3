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

//! Semantic analysis tests, driven through the full compilation
//! pipeline: programs that must be rejected with specific error codes,
//! and programs that must be accepted.

use crust::{ErrorCode, Session};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn errors_of(source: &str) -> Vec<ErrorCode> {
    let session = Session::new().unwrap();
    match session.compile(source) {
        Ok(_) => Vec::new(),
        Err(errors) => errors.iter().map(|e| e.code).collect(),
    }
}

// ============================================================================
// Accepted Programs
// ============================================================================

/// Programs exercising the whole semantic surface that must compile.
#[test_case("fn main() { }\n" ; "empty_main")]
#[test_case("fn main() { let x = 1; let y = x + 1; println!(y); }\n" ; "inference_chain")]
#[test_case("fn main() { let x: bool = true; if x { println!(1); } }\n" ; "annotated_bool")]
#[test_case("fn main() { let x; x = 5; println!(x); }\n" ; "deferred_initialization")]
#[test_case("fn main() { let mut a = [1, 2, 3]; a[2] = a[0]; println!(a[2]); }\n" ; "array_round_trip")]
#[test_case("fn main() { let (q, r) = (17 / 5, 17 % 5); println!(q); println!(r); }\n" ; "tuple_destructuring")]
#[test_case("fn gcd(a: i32, b: i32) -> i32 { if b == 0 { return a; } return gcd(b, a % b); } fn main() { println!(gcd(12, 8)); }\n" ; "recursion")]
#[test_case("fn main() { let x = 1; { let x = true; if x { println!(0); } } println!(x); }\n" ; "shadowing")]
#[test_case("fn main() { let mut i = 0; loop { i = i + 1; if i == 10 { break; } continue; } }\n" ; "loop_control")]
#[test_case("fn main() { println!(later(4)); } fn later(n: i32) -> i32 { return n * 2; }\n" ; "forward_reference")]
fn test_valid_programs_are_accepted(source: &str) {
    assert_eq!(errors_of(source), Vec::new(), "source:\n{}", source);
}

// ============================================================================
// Rejected Programs
// ============================================================================

/// One source construct, one expected error code.
#[test_case("fn main() { let x = 1; let x = 2; }\n", ErrorCode::Redefinition ; "variable_redefinition")]
#[test_case("fn f() { } fn f() { } fn main() { }\n", ErrorCode::Redefinition ; "function_redefinition")]
#[test_case("fn main() { println!(ghost); }\n", ErrorCode::UndeclaredIdentifier ; "undeclared_variable")]
#[test_case("fn main() { let x; println!(x); }\n", ErrorCode::UninitializedVariable ; "use_before_value")]
#[test_case("fn main() { let x: i32 = true; }\n", ErrorCode::TypeMismatch ; "annotation_mismatch")]
#[test_case("fn main() { let x = 1 + true; }\n", ErrorCode::TypeMismatch ; "operator_mismatch")]
#[test_case("fn main() { if 1 { } }\n", ErrorCode::TypeMismatch ; "non_bool_condition")]
#[test_case("fn main() { let x = 1; x = 2; }\n", ErrorCode::AssignToImmutable ; "assign_to_immutable")]
#[test_case("fn main() { let (a, b) = (1, 2, 3); }\n", ErrorCode::TupleArityMismatch ; "tuple_arity")]
#[test_case("fn main() { let a = [1, 2]; println!(a[true]); }\n", ErrorCode::ArrayIndexMustBeInt ; "boolean_index")]
#[test_case("fn main() { let a = [1, 2]; println!(a[0 - 1]); }\n", ErrorCode::NegativeIndex ; "negative_index")]
#[test_case("fn main() { let a = [1, 2]; println!(a[2]); }\n", ErrorCode::IndexOutOfBounds ; "index_out_of_bounds")]
#[test_case("fn main() { let a: [i32; 0]; }\n", ErrorCode::ArraySizeMustBePositive ; "zero_length_array_type")]
#[test_case("fn main() { let a: [i32; 3] = [1, 2]; }\n", ErrorCode::ArrayLengthMismatch ; "array_length_mismatch")]
#[test_case("fn main() { ghost(); }\n", ErrorCode::UndeclaredFunction ; "undeclared_function")]
#[test_case("fn f(a) { println!(a); } fn main() { }\n", ErrorCode::CannotInferType ; "unnarrowed_parameter")]
#[test_case("fn f(a: i32) { } fn main() { f(); }\n", ErrorCode::WrongNumberOfArguments ; "missing_argument")]
#[test_case("fn f(a: i32) { } fn main() { f(true); }\n", ErrorCode::ArgumentTypeMismatch ; "argument_type")]
#[test_case("fn f() -> i32 { return true; } fn main() { }\n", ErrorCode::ReturnTypeMismatch ; "return_type")]
#[test_case("fn f() -> i32 { } fn main() { }\n", ErrorCode::MissingReturnStatement ; "missing_return")]
#[test_case("fn main() { break; }\n", ErrorCode::BreakOutsideLoop ; "stray_break")]
#[test_case("fn main() { continue; }\n", ErrorCode::ContinueOutsideLoop ; "stray_continue")]
#[test_case("fn main() { let a = [1]; println!(a); }\n", ErrorCode::UnsupportedPrintArgument ; "print_array")]
#[test_case("fn helper() { }\n", ErrorCode::MissingMain ; "no_main")]
#[test_case("fn main(argc: i32) { }\n", ErrorCode::IncompatibleMain ; "main_with_parameters")]
#[test_case("fn main() -> i32 { return 0; }\n", ErrorCode::IncompatibleMain ; "main_with_return_type")]
fn test_invalid_programs_are_rejected(source: &str, expected: ErrorCode) {
    let errors = errors_of(source);
    assert!(
        errors.contains(&expected),
        "expected {:?} in {:?} for source:\n{}",
        expected,
        errors,
        source
    );
}

// ============================================================================
// Error Accumulation
// ============================================================================

/// Analysis keeps going after the first problem and reports each one.
#[test]
fn test_multiple_independent_errors_are_all_reported() {
    let errors = errors_of(
        "fn main() {\n\
         let a = ghost1;\n\
         let b = ghost2;\n\
         break;\n\
         }\n",
    );
    assert_eq!(
        errors,
        vec![
            ErrorCode::UndeclaredIdentifier,
            ErrorCode::UndeclaredIdentifier,
            ErrorCode::BreakOutsideLoop,
        ]
    );
}

/// A call mismatch names the offending argument position.
#[test]
fn test_argument_mismatch_names_the_position() {
    let session = Session::new().unwrap();
    let errors = session
        .compile("fn f(a: i32, b: i32) { } fn main() { f(1, true); }\n")
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::ArgumentTypeMismatch);
    assert!(errors[0].message.contains("argument 2"), "{}", errors[0].message);
}

/// An empty source reports exactly one error: the missing main.
#[test]
fn test_empty_source_reports_exactly_missing_main() {
    assert_eq!(errors_of(""), vec![ErrorCode::MissingMain]);
}

/// Division by a folded zero poisons the value instead of erroring, so
/// the bound check stays quiet and the program still compiles.
#[test]
fn test_poisoned_constant_suppresses_bound_checks() {
    assert_eq!(
        errors_of("fn main() { let a = [1, 2, 3]; let i = 1 / 0; println!(a[i]); }\n"),
        Vec::new()
    );
}

/// Re-analyzing the same tree converges on the same result: the
/// single-shot narrowing never drifts across runs.
#[test]
fn test_analysis_is_repeatable() {
    let session = Session::new().unwrap();
    let source = "fn twice(n: i32) -> i32 { return n * 2; } \
                  fn main() { let x; x = twice(21); println!(x); }\n";
    let (tokens, lex_errors) = crust::lexer::tokenize(source);
    assert!(lex_errors.is_empty());
    let outcome = crust::parser::parse(&tokens, session.table(), &session.grammar().start);
    assert!(outcome.is_ok());

    let first = crust::analyzer::analyze(&outcome.tree);
    let second = crust::analyzer::analyze(&outcome.tree);
    assert!(first.is_ok());
    assert_eq!(first.symbols.to_string(), second.symbols.to_string());
    assert_eq!(
        first.errors.iter().map(|e| e.code).collect::<Vec<_>>(),
        second.errors.iter().map(|e| e.code).collect::<Vec<_>>()
    );
}
