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

//! Parse-tree node categories.
//!
//! A closed variant per nonterminal of the Crust grammar. The analyzer
//! and the C emitter match on these instead of comparing node-name
//! strings, so a missing case is a compile-time error.

/// The nonterminal a parse-tree node was expanded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCat {
    Program,
    FuncLs,
    Func,
    ParamLs,
    ParamLsTail,
    Param,
    ParamTy,
    RetTy,
    Type,
    TypeLs,
    TypeLsTail,
    StmtLs,
    Stmt,
    Block,
    VarDecl,
    MutOpt,
    Pattern,
    IdLs,
    IdLsTail,
    TyOpt,
    InitOpt,
    StmtAfterId,
    IfStmt,
    ElseOpt,
    LoopStmt,
    RetStmt,
    RetVal,
    BreakStmt,
    ContStmt,
    PrintStmt,
    Exp,
    LogExp,
    LogExpTail,
    LogOp,
    RelExp,
    RelExpTail,
    RelOp,
    ArithExp,
    ArithExpTail,
    AddOp,
    ArithTerm,
    ArithTermTail,
    MulOp,
    ArithFactor,
    FactorSuf,
    ParenTail,
    ExpLs,
    ExpLsTail,
    ArgLs,
}

impl NodeCat {
    /// Map a nonterminal name from the Crust grammar to its category.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "program" => NodeCat::Program,
            "func_ls" => NodeCat::FuncLs,
            "func" => NodeCat::Func,
            "param_ls" => NodeCat::ParamLs,
            "param_ls_tail" => NodeCat::ParamLsTail,
            "param" => NodeCat::Param,
            "param_ty" => NodeCat::ParamTy,
            "ret_ty" => NodeCat::RetTy,
            "type" => NodeCat::Type,
            "type_ls" => NodeCat::TypeLs,
            "type_ls_tail" => NodeCat::TypeLsTail,
            "stmt_ls" => NodeCat::StmtLs,
            "stmt" => NodeCat::Stmt,
            "block" => NodeCat::Block,
            "var_decl" => NodeCat::VarDecl,
            "mut_opt" => NodeCat::MutOpt,
            "pattern" => NodeCat::Pattern,
            "id_ls" => NodeCat::IdLs,
            "id_ls_tail" => NodeCat::IdLsTail,
            "ty_opt" => NodeCat::TyOpt,
            "init_opt" => NodeCat::InitOpt,
            "stmt_after_id" => NodeCat::StmtAfterId,
            "if_stmt" => NodeCat::IfStmt,
            "else_opt" => NodeCat::ElseOpt,
            "loop_stmt" => NodeCat::LoopStmt,
            "ret_stmt" => NodeCat::RetStmt,
            "ret_val" => NodeCat::RetVal,
            "break_stmt" => NodeCat::BreakStmt,
            "cont_stmt" => NodeCat::ContStmt,
            "print_stmt" => NodeCat::PrintStmt,
            "exp" => NodeCat::Exp,
            "log_exp" => NodeCat::LogExp,
            "log_exp_tail" => NodeCat::LogExpTail,
            "log_op" => NodeCat::LogOp,
            "rel_exp" => NodeCat::RelExp,
            "rel_exp_tail" => NodeCat::RelExpTail,
            "rel_op" => NodeCat::RelOp,
            "arith_exp" => NodeCat::ArithExp,
            "arith_exp_tail" => NodeCat::ArithExpTail,
            "add_op" => NodeCat::AddOp,
            "arith_term" => NodeCat::ArithTerm,
            "arith_term_tail" => NodeCat::ArithTermTail,
            "mul_op" => NodeCat::MulOp,
            "arith_factor" => NodeCat::ArithFactor,
            "factor_suf" => NodeCat::FactorSuf,
            "paren_tail" => NodeCat::ParenTail,
            "exp_ls" => NodeCat::ExpLs,
            "exp_ls_tail" => NodeCat::ExpLsTail,
            "arg_ls" => NodeCat::ArgLs,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    #[test]
    fn test_every_grammar_nonterminal_has_a_category() {
        let grammar = Grammar::crust().unwrap();
        for nonterminal in &grammar.nonterminals {
            assert!(
                NodeCat::from_name(&nonterminal.name).is_some(),
                "no category for <{}>",
                nonterminal.name
            );
        }
    }

    #[test]
    fn test_unknown_name_has_no_category() {
        assert_eq!(NodeCat::from_name("no_such_rule"), None);
    }
}
