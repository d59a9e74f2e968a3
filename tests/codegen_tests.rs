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

//! End-to-end lowering tests: Crust source in, C translation unit out.

use crust::{compile, Session};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn c_of(source: &str) -> String {
    compile(source).expect("program should compile")
}

// ============================================================================
// Whole Translation Units
// ============================================================================

/// The smallest interesting program, asserted byte for byte.
#[test]
fn test_minimal_program_output() {
    let c = c_of("fn main() { let x = 1; println!(x); }\n");
    assert_eq!(
        c,
        "#include <stdio.h>\n\
         \n\
         int main(void) {\n    \
             int x = 1;\n    \
             printf(\"%d\\n\", 1);\n    \
             return 0;\n\
         }\n\
         \n"
    );
}

/// Prototypes come before every definition, so source order between
/// functions never matters in the emitted C.
#[test]
fn test_prototypes_precede_definitions() {
    let c = c_of(
        "fn main() { println!(double(4)); }\n\
         fn double(x: i32) -> i32 { return x * 2; }\n",
    );
    let prototype = c.find("int double(int x);").expect("prototype missing");
    let definition = c.find("int double(int x) {").expect("definition missing");
    assert!(prototype < definition, "emitted:\n{}", c);
    assert!(!c.contains("int main(void);"), "main must not get a prototype");
}

// ============================================================================
// Construct Lowering
// ============================================================================

/// One construct, one expected C fragment.
#[test_case("fn main() { let x = 0x10; println!(x); }\n", "int x = 16;" ; "hexadecimal_literal")]
#[test_case("fn main() { let y = -5; println!(y); }\n", "int y = -5;" ; "negated_literal")]
#[test_case("fn main() { let b = true; }\n", "int b = 1;" ; "bool_to_int")]
#[test_case("fn main() { let mut i = 0; loop { i = i + 1; } }\n", "for (;;) {" ; "loop_to_for")]
#[test_case("fn main() { let mut i = 0; i = (i + 2) * 3; }\n", "i = (((i + 2)) * 3);" ; "parenthesized_chain")]
#[test_case("fn main() { let t = (1, 2); }\n", "int t[2] = { 1, 2 };" ; "tuple_to_array")]
#[test_case("fn main() { let a: [i32; 2] = [7, 8]; }\n", "int a[2] = { 7, 8 };" ; "array_initializer")]
#[test_case("fn side() { return; } fn main() { side(); }\n", "return;" ; "bare_return")]
#[test_case("fn side() { } fn main() { side(); }\n", "side();" ; "call_statement")]
#[test_case("fn main() { let f = 1 < 2 && 3 != 4; }\n", "int f = 1;" ; "folded_logic")]
fn test_construct_lowering(source: &str, expected: &str) {
    let c = c_of(source);
    assert!(c.contains(expected), "missing `{}` in:\n{}", expected, c);
}

/// Indexed reads and writes keep their C spelling; the bound check ran
/// during analysis and leaves no trace in the output.
#[test]
fn test_array_element_round_trip() {
    let c = c_of("fn main() { let mut a = [1, 2, 3]; a[2] = a[0] + a[1]; println!(a[2]); }\n");
    assert!(c.contains("a[2] = (a[0] + a[1]);"), "emitted:\n{}", c);
    assert!(c.contains("printf(\"%d\\n\", a[2]);"));
}

/// A non-literal tuple initializer copies element-wise, because arrays
/// do not assign in C.
#[test]
fn test_tuple_copy_is_element_wise() {
    let c = c_of("fn main() { let t = (1, 2); let u: (i32, i32) = t; }\n");
    assert!(c.contains("int u[2];"), "emitted:\n{}", c);
    assert!(c.contains("u[0] = t[0];"));
    assert!(c.contains("u[1] = t[1];"));
}

/// Nested blocks survive as C blocks and keep their indentation depth.
#[test]
fn test_nested_block_indentation() {
    let c = c_of("fn main() { { let x = 1; println!(x); } }\n");
    assert!(c.contains("    {\n"), "emitted:\n{}", c);
    assert!(c.contains("        int x = 1;\n"));
}

// ============================================================================
// Artifacts Are Withheld On Error
// ============================================================================

/// No C is produced for a program with any error, in any stage.
#[test_case("fn main() { let x = @; }\n" ; "lexical_error")]
#[test_case("fn main() { let x = 1 }\n" ; "syntax_error")]
#[test_case("fn main() { println!(ghost); }\n" ; "semantic_error")]
fn test_no_output_on_error(source: &str) {
    let session = Session::new().unwrap();
    assert!(session.compile(source).is_err(), "source:\n{}", source);
}
