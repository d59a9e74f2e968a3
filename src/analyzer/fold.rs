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

//! Compile-time constant folding.
//!
//! Values that can be computed at compile time are folded bottom-up
//! alongside type synthesis. Division or remainder by a folded zero
//! poisons the result rather than erroring: the expression stays legal
//! and is emitted unfolded, but downstream folding (array-bound checks
//! included) must not trust a poisoned value.

/// A folded compile-time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstValue {
    Int(i64),
    Bool(bool),
    /// Result of folding through a division or remainder by zero.
    Poison,
}

impl ConstValue {
    pub fn as_int(self) -> Option<i64> {
        match self {
            ConstValue::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            ConstValue::Bool(value) => Some(value),
            _ => None,
        }
    }
}

/// Fold a binary operator over two folded operands, keyed by the
/// operator's grammar terminal name.
///
/// Returns `None` when the operands do not fit the operator; poison
/// propagates through every operator.
pub fn fold_binary(op: &str, lhs: ConstValue, rhs: ConstValue) -> Option<ConstValue> {
    if lhs == ConstValue::Poison || rhs == ConstValue::Poison {
        return Some(ConstValue::Poison);
    }

    match op {
        "T_AOp_AD" => int_op(lhs, rhs, |a, b| Some(ConstValue::Int(a.wrapping_add(b)))),
        "T_AOp_MN" => int_op(lhs, rhs, |a, b| Some(ConstValue::Int(a.wrapping_sub(b)))),
        "T_AOp_ML" => int_op(lhs, rhs, |a, b| Some(ConstValue::Int(a.wrapping_mul(b)))),
        "T_AOp_DV" => int_op(lhs, rhs, |a, b| {
            if b == 0 {
                Some(ConstValue::Poison)
            } else {
                Some(ConstValue::Int(a.wrapping_div(b)))
            }
        }),
        "T_AOp_RM" => int_op(lhs, rhs, |a, b| {
            if b == 0 {
                Some(ConstValue::Poison)
            } else {
                Some(ConstValue::Int(a.wrapping_rem(b)))
            }
        }),

        "T_ROp_L" => int_op(lhs, rhs, |a, b| Some(ConstValue::Bool(a < b))),
        "T_ROp_G" => int_op(lhs, rhs, |a, b| Some(ConstValue::Bool(a > b))),
        "T_ROp_LE" => int_op(lhs, rhs, |a, b| Some(ConstValue::Bool(a <= b))),
        "T_ROp_GE" => int_op(lhs, rhs, |a, b| Some(ConstValue::Bool(a >= b))),
        "T_ROp_E" => Some(ConstValue::Bool(lhs == rhs)),
        "T_ROp_NE" => Some(ConstValue::Bool(lhs != rhs)),

        "T_LOp_AND" => bool_op(lhs, rhs, |a, b| a && b),
        "T_LOp_OR" => bool_op(lhs, rhs, |a, b| a || b),

        _ => None,
    }
}

/// Fold a unary operator, keyed by its grammar terminal name.
pub fn fold_unary(op: &str, operand: ConstValue) -> Option<ConstValue> {
    if operand == ConstValue::Poison {
        return Some(ConstValue::Poison);
    }
    match op {
        "T_AOp_MN" => operand.as_int().map(|v| ConstValue::Int(v.wrapping_neg())),
        "T_LOp_NOT" => operand.as_bool().map(|v| ConstValue::Bool(!v)),
        _ => None,
    }
}

/// Parse an integer literal lexeme, decimal or `0x` hexadecimal.
pub fn parse_int_literal(lexeme: &str) -> Option<i64> {
    if let Some(digits) = lexeme.strip_prefix("0x") {
        i64::from_str_radix(digits, 16).ok()
    } else {
        lexeme.parse().ok()
    }
}

fn int_op(
    lhs: ConstValue,
    rhs: ConstValue,
    apply: impl Fn(i64, i64) -> Option<ConstValue>,
) -> Option<ConstValue> {
    apply(lhs.as_int()?, rhs.as_int()?)
}

fn bool_op(lhs: ConstValue, rhs: ConstValue, apply: impl Fn(bool, bool) -> bool) -> Option<ConstValue> {
    Some(ConstValue::Bool(apply(lhs.as_bool()?, rhs.as_bool()?)))
}
