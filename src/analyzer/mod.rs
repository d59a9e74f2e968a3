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

//! Scope-aware semantic analysis over the parse tree.
//!
//! The analyzer makes one post-order pass: types and folded constants
//! are synthesized bottom-up into side tables indexed by node id, and
//! scopes open around statement lists and close only after their
//! enclosing construct has synthesized. Inference is single-shot: a
//! binding enters as `Unknown` and is narrowed at most once, by an
//! annotation, an initializer, a first assignment, or a call argument.
//!
//! Errors accumulate; analysis never stops at the first problem.

pub mod fold;
pub mod symbol;
pub mod symbol_table;
pub mod types;

pub use fold::ConstValue;
pub use symbol::{Binding, BindingKind};
pub use symbol_table::{SymbolId, SymbolTable, GLOBAL};
pub use types::SemType;

use crate::error::{CompileError, ErrorCode, Errors};
use crate::parser::{NodeCat, NodeId, ParseTree};

/// Everything the analyzer learned about one parse tree.
#[derive(Debug)]
pub struct Analysis {
    pub symbols: SymbolTable,
    pub errors: Vec<CompileError>,
    types: Vec<SemType>,
    folded: Vec<Option<ConstValue>>,
    decls: Vec<Option<SymbolId>>,
}

impl Analysis {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The synthesized type of a node.
    pub fn type_of(&self, id: NodeId) -> &SemType {
        &self.types[id.index()]
    }

    /// The folded compile-time value of a node, if any.
    pub fn const_of(&self, id: NodeId) -> Option<ConstValue> {
        self.folded[id.index()]
    }

    /// The binding introduced at a declaration-site identifier node.
    pub fn decl_of(&self, id: NodeId) -> Option<SymbolId> {
        self.decls[id.index()]
    }
}

/// Analyze a parse tree.
pub fn analyze(tree: &ParseTree) -> Analysis {
    Analyzer::new(tree).run()
}

struct Analyzer<'t> {
    tree: &'t ParseTree,
    symbols: SymbolTable,
    errors: Errors,
    types: Vec<SemType>,
    folded: Vec<Option<ConstValue>>,
    decls: Vec<Option<SymbolId>>,
    /// Current function context; `GLOBAL` outside any function.
    context: String,
    depth: u32,
    loop_depth: u32,
    /// Types and lines of `return` statements in the current function.
    returns: Vec<(SemType, u32)>,
}

impl<'t> Analyzer<'t> {
    fn new(tree: &'t ParseTree) -> Self {
        Self {
            tree,
            symbols: SymbolTable::new(),
            errors: Errors::new(),
            types: vec![SemType::Unknown; tree.len()],
            folded: vec![None; tree.len()],
            decls: vec![None; tree.len()],
            context: GLOBAL.to_string(),
            depth: 0,
            loop_depth: 0,
            returns: Vec::new(),
        }
    }

    fn run(mut self) -> Analysis {
        self.declare_headers();
        self.visit(self.tree.root());
        self.check_inference();
        self.check_main();
        Analysis {
            symbols: self.symbols,
            errors: self.errors.into_vec(),
            types: self.types,
            folded: self.folded,
            decls: self.decls,
        }
    }

    // ---- small accessors -------------------------------------------------

    fn cat(&self, id: NodeId) -> Option<NodeCat> {
        let symbol = &self.tree.node(id).symbol;
        if symbol.is_nonterminal() {
            NodeCat::from_name(&symbol.name)
        } else {
            None
        }
    }

    fn term(&self, id: NodeId) -> Option<&str> {
        let symbol = &self.tree.node(id).symbol;
        if symbol.is_terminal() {
            Some(symbol.name.as_str())
        } else {
            None
        }
    }

    fn lexeme(&self, id: NodeId) -> Option<&str> {
        self.tree.node(id).lexeme.as_deref()
    }

    fn line(&self, id: NodeId) -> u32 {
        self.tree.node(id).line.unwrap_or(1)
    }

    fn ty(&self, id: NodeId) -> SemType {
        self.types[id.index()].clone()
    }

    fn set(&mut self, id: NodeId, ty: SemType) {
        self.types[id.index()] = ty;
    }

    fn copy_up(&mut self, to: NodeId, from: NodeId) {
        self.types[to.index()] = self.types[from.index()].clone();
        self.folded[to.index()] = self.folded[from.index()];
    }

    fn error(&mut self, code: ErrorCode, message: impl Into<String>, line: u32) {
        self.errors.push(CompileError::at_line(code, message, line));
    }

    // ---- traversal -------------------------------------------------------

    fn visit(&mut self, id: NodeId) {
        if self.tree.node(id).symbol.is_terminal() {
            self.visit_terminal(id);
            return;
        }
        match self.cat(id) {
            Some(NodeCat::Func) => self.visit_func(id),
            Some(NodeCat::Block) => self.visit_block(id),
            Some(NodeCat::IfStmt) => self.visit_if(id),
            Some(NodeCat::LoopStmt) => self.visit_loop(id),
            Some(NodeCat::VarDecl) => self.visit_var_decl(id),
            Some(NodeCat::Stmt)
                if self
                    .tree
                    .children(id)
                    .first()
                    .and_then(|&c| self.term(c))
                    == Some("T_Id") =>
            {
                self.visit_id_stmt(id)
            }
            _ => {
                for &child in self.tree.children(id).to_vec().iter() {
                    self.visit(child);
                }
                self.synthesize(id);
            }
        }
    }

    fn visit_terminal(&mut self, id: NodeId) {
        match self.term(id) {
            Some("T_Decimal") | Some("T_Hexadecimal") => {
                self.set(id, SemType::Int);
                if let Some(lexeme) = self.lexeme(id) {
                    self.folded[id.index()] =
                        fold::parse_int_literal(lexeme).map(ConstValue::Int);
                }
            }
            Some("T_True") => {
                self.set(id, SemType::Bool);
                self.folded[id.index()] = Some(ConstValue::Bool(true));
            }
            Some("T_False") => {
                self.set(id, SemType::Bool);
                self.folded[id.index()] = Some(ConstValue::Bool(false));
            }
            _ => {}
        }
    }

    fn synthesize(&mut self, id: NodeId) {
        match self.cat(id) {
            Some(NodeCat::Exp) | Some(NodeCat::RetVal) => {
                if let Some(&child) = self.tree.children(id).first() {
                    if !self.tree.node(child).symbol.is_epsilon() {
                        self.copy_up(id, child);
                    }
                }
            }
            Some(NodeCat::LogExp)
            | Some(NodeCat::RelExp)
            | Some(NodeCat::ArithExp)
            | Some(NodeCat::ArithTerm) => self.synthesize_chain(id),
            Some(NodeCat::ArithFactor) => self.synthesize_factor(id),
            Some(NodeCat::RetStmt) => self.synthesize_return(id),
            Some(NodeCat::PrintStmt) => self.synthesize_print(id),
            Some(NodeCat::BreakStmt) => {
                if self.loop_depth == 0 {
                    self.error(
                        ErrorCode::BreakOutsideLoop,
                        "'break' outside of a loop",
                        self.line(id),
                    );
                }
            }
            Some(NodeCat::ContStmt) => {
                if self.loop_depth == 0 {
                    self.error(
                        ErrorCode::ContinueOutsideLoop,
                        "'continue' outside of a loop",
                        self.line(id),
                    );
                }
            }
            _ => {}
        }
    }

    // ---- expressions -----------------------------------------------------

    /// Type and fold a left-associative operator chain: a head operand
    /// followed by a (possibly empty) tail of operator/operand pairs.
    fn synthesize_chain(&mut self, id: NodeId) {
        let kids = self.tree.children(id);
        let (&head, mut tail) = match kids {
            [head, tail] => (head, *tail),
            _ => return,
        };

        let mut ty = self.ty(head);
        let mut val = self.folded[head.index()];

        loop {
            let kids = self.tree.children(tail).to_vec();
            if kids.len() < 2 {
                break;
            }
            let Some(&op_leaf) = self.tree.children(kids[0]).first() else {
                break;
            };
            let Some(op) = self.term(op_leaf).map(str::to_string) else {
                break;
            };
            let rhs = kids[1];
            let rhs_ty = self.ty(rhs);
            let rhs_val = self.folded[rhs.index()];
            let line = self.line(op_leaf);

            ty = self.binary_type(&op, &ty, &rhs_ty, line);
            val = match (val, rhs_val) {
                (Some(lhs), Some(rhs)) => fold::fold_binary(&op, lhs, rhs),
                _ => None,
            };

            match kids.get(2) {
                Some(&next) => tail = next,
                None => break,
            }
        }

        self.set(id, ty);
        self.folded[id.index()] = val;
    }

    /// The result type of a binary operator, with operand checking.
    fn binary_type(&mut self, op: &str, lhs: &SemType, rhs: &SemType, line: u32) -> SemType {
        let operator = op_symbol(op);
        match op {
            "T_LOp_AND" | "T_LOp_OR" => {
                for side in [lhs, rhs] {
                    if !side.is_unknown() && *side != SemType::Bool {
                        self.error(
                            ErrorCode::TypeMismatch,
                            format!("operator '{}' expects bool operands, found {}", operator, side),
                            line,
                        );
                    }
                }
                SemType::Bool
            }
            "T_ROp_E" | "T_ROp_NE" => {
                if !lhs.is_unknown() && !rhs.is_unknown() && lhs != rhs {
                    self.error(
                        ErrorCode::TypeMismatch,
                        format!("operator '{}' compares {} with {}", operator, lhs, rhs),
                        line,
                    );
                }
                SemType::Bool
            }
            "T_ROp_L" | "T_ROp_G" | "T_ROp_LE" | "T_ROp_GE" => {
                for side in [lhs, rhs] {
                    if !side.is_unknown() && *side != SemType::Int {
                        self.error(
                            ErrorCode::TypeMismatch,
                            format!("operator '{}' expects i32 operands, found {}", operator, side),
                            line,
                        );
                    }
                }
                SemType::Bool
            }
            _ => {
                for side in [lhs, rhs] {
                    if !side.is_unknown() && *side != SemType::Int {
                        self.error(
                            ErrorCode::TypeMismatch,
                            format!("operator '{}' expects i32 operands, found {}", operator, side),
                            line,
                        );
                    }
                }
                SemType::Int
            }
        }
    }

    fn synthesize_factor(&mut self, id: NodeId) {
        let kids = self.tree.children(id).to_vec();
        let Some(&first) = kids.first() else {
            return;
        };
        match self.term(first) {
            Some("T_Decimal") | Some("T_Hexadecimal") | Some("T_True") | Some("T_False") => {
                self.copy_up(id, first);
            }
            Some("T_LOp_NOT") => {
                let operand = kids[1];
                let ty = self.ty(operand);
                if !ty.is_unknown() && ty != SemType::Bool {
                    self.error(
                        ErrorCode::TypeMismatch,
                        format!("operator '!' expects a bool operand, found {}", ty),
                        self.line(first),
                    );
                }
                self.set(id, SemType::Bool);
                self.folded[id.index()] = self.folded[operand.index()]
                    .and_then(|v| fold::fold_unary("T_LOp_NOT", v));
            }
            Some("T_AOp_MN") => {
                let operand = kids[1];
                let ty = self.ty(operand);
                if !ty.is_unknown() && ty != SemType::Int {
                    self.error(
                        ErrorCode::TypeMismatch,
                        format!("operator '-' expects an i32 operand, found {}", ty),
                        self.line(first),
                    );
                }
                self.set(id, SemType::Int);
                self.folded[id.index()] = self.folded[operand.index()]
                    .and_then(|v| fold::fold_unary("T_AOp_MN", v));
            }
            Some("T_Id") => self.synthesize_id_factor(id, first, kids[1]),
            Some("T_LP") => self.synthesize_paren_factor(id, &kids),
            Some("T_LB") => self.synthesize_array_literal(id, kids[1]),
            _ => {}
        }
    }

    /// An identifier factor: a variable read, a call, or an indexing.
    fn synthesize_id_factor(&mut self, id: NodeId, name_node: NodeId, suffix: NodeId) {
        let Some(name) = self.lexeme(name_node).map(str::to_string) else {
            return;
        };
        let line = self.line(name_node);
        let suffix_kids = self.tree.children(suffix).to_vec();

        match suffix_kids.first().and_then(|&c| self.term(c)) {
            Some("T_LP") => {
                let args = self.collect_list(suffix_kids[1]);
                let ret = self.check_call(&name, line, &args);
                self.set(id, ret);
            }
            Some("T_LB") => {
                let index = suffix_kids[1];
                match self.symbols.lookup(&self.context, &name) {
                    None => {
                        self.error(
                            ErrorCode::UndeclaredIdentifier,
                            format!("variable '{}' is not declared", name),
                            line,
                        );
                    }
                    Some(sym) => match self.symbols.binding(sym).ty.clone() {
                        SemType::Array { elem, len } => {
                            self.check_index(index, Some(len));
                            self.set(id, *elem);
                        }
                        SemType::Unknown => {
                            if self.symbols.binding(sym).kind != BindingKind::Parameter {
                                self.error(
                                    ErrorCode::UninitializedVariable,
                                    format!("variable '{}' is used before it has a value", name),
                                    line,
                                );
                            }
                        }
                        other => {
                            self.error(
                                ErrorCode::TypeMismatch,
                                format!("variable '{}' of type {} cannot be indexed", name, other),
                                line,
                            );
                        }
                    },
                }
            }
            _ => {
                // Plain variable read.
                match self.symbols.lookup(&self.context, &name) {
                    None => {
                        self.error(
                            ErrorCode::UndeclaredIdentifier,
                            format!("variable '{}' is not declared", name),
                            line,
                        );
                    }
                    Some(sym) => {
                        let binding = self.symbols.binding(sym);
                        if binding.ty.is_unknown() {
                            // A parameter whose type is still open is
                            // not an uninitialized read.
                            if binding.kind != BindingKind::Parameter {
                                let message = format!(
                                    "variable '{}' is used before it has a value",
                                    name
                                );
                                self.error(ErrorCode::UninitializedVariable, message, line);
                            }
                        } else {
                            let ty = binding.ty.clone();
                            let constant = if binding.mutable {
                                None
                            } else {
                                binding.constant
                            };
                            self.set(id, ty);
                            self.folded[id.index()] = constant;
                        }
                    }
                }
            }
        }
    }

    /// `( exp )` or a tuple literal `( exp, ... )`.
    fn synthesize_paren_factor(&mut self, id: NodeId, kids: &[NodeId]) {
        if kids.len() < 3 {
            return;
        }
        let exp = kids[1];
        let tail_kids = self.tree.children(kids[2]).to_vec();
        match tail_kids.first().and_then(|&c| self.term(c)) {
            Some("T_RP") => self.copy_up(id, exp),
            Some("T_Comma") => {
                let mut parts = vec![self.ty(exp)];
                for item in self.collect_list(tail_kids[1]) {
                    parts.push(self.ty(item));
                }
                self.set(id, SemType::Tuple(parts));
            }
            _ => {}
        }
    }

    /// `[ e1, e2, ... ]`: every element must share one type.
    fn synthesize_array_literal(&mut self, id: NodeId, list: NodeId) {
        let items = self.collect_list(list);
        let mut elem = SemType::Unknown;
        for &item in &items {
            let ty = self.ty(item);
            if ty.is_unknown() {
                continue;
            }
            if elem.is_unknown() {
                elem = ty;
            } else if ty != elem {
                self.error(
                    ErrorCode::TypeMismatch,
                    format!("array elements must share one type, found {} and {}", elem, ty),
                    self.line(item),
                );
            }
        }
        self.set(
            id,
            SemType::Array {
                elem: Box::new(elem),
                len: items.len(),
            },
        );
    }

    /// Flatten an `exp_ls`/`arg_ls` chain into its expression nodes.
    fn collect_list(&self, list: NodeId) -> Vec<NodeId> {
        let mut items = Vec::new();
        let kids = self.tree.children(list);
        let (&head, mut tail) = match kids {
            [head, tail] => (head, *tail),
            _ => return items,
        };
        items.push(head);
        loop {
            let kids = self.tree.children(tail);
            if kids.len() < 3 {
                break;
            }
            items.push(kids[1]);
            tail = kids[2];
        }
        items
    }

    /// Check a call against the callee's signature and return its type.
    ///
    /// A parameter whose type is still open is narrowed by the first
    /// call that provides a typed argument.
    fn check_call(&mut self, name: &str, line: u32, args: &[NodeId]) -> SemType {
        let Some(sym) = self.symbols.lookup(GLOBAL, name) else {
            self.error(
                ErrorCode::UndeclaredFunction,
                format!("function '{}' is not defined", name),
                line,
            );
            return SemType::Unknown;
        };

        let params = self.symbols.binding(sym).params.clone();
        let ret = self.symbols.binding(sym).ty.clone();

        if args.len() != params.len() {
            self.error(
                ErrorCode::WrongNumberOfArguments,
                format!(
                    "function '{}' takes {} argument{}, {} given",
                    name,
                    params.len(),
                    if params.len() == 1 { "" } else { "s" },
                    args.len()
                ),
                line,
            );
            return ret;
        }

        for (position, (&arg, (_, param_ty))) in args.iter().zip(params.iter()).enumerate() {
            let arg_ty = self.ty(arg);
            if arg_ty.is_unknown() {
                continue;
            }
            if param_ty.is_unknown() {
                self.symbols.binding_mut(sym).params[position].1 = arg_ty;
            } else if arg_ty != *param_ty {
                self.error(
                    ErrorCode::ArgumentTypeMismatch,
                    format!(
                        "argument {} of '{}' expects {}, found {}",
                        position + 1,
                        name,
                        param_ty,
                        arg_ty
                    ),
                    self.line(arg),
                );
            }
        }
        ret
    }

    /// Check an index expression against an optional known length.
    fn check_index(&mut self, index: NodeId, len: Option<usize>) {
        let ty = self.ty(index);
        if !ty.is_unknown() && ty != SemType::Int {
            self.error(
                ErrorCode::ArrayIndexMustBeInt,
                format!("array index must be i32, found {}", ty),
                self.line(index),
            );
            return;
        }
        if let Some(ConstValue::Int(value)) = self.folded[index.index()] {
            if value < 0 {
                self.error(
                    ErrorCode::NegativeIndex,
                    format!("array index is {}, indices start at 0", value),
                    self.line(index),
                );
            } else if let Some(len) = len {
                if value as usize >= len {
                    self.error(
                        ErrorCode::IndexOutOfBounds,
                        format!("index {} is out of bounds for length {}", value, len),
                        self.line(index),
                    );
                }
            }
        }
    }

    // ---- statements ------------------------------------------------------

    fn synthesize_return(&mut self, id: NodeId) {
        let kids = self.tree.children(id);
        if kids.len() < 3 {
            return;
        }
        let ret_val = kids[1];
        let line = self.line(id);
        let value = self
            .tree
            .children(ret_val)
            .first()
            .filter(|&&c| !self.tree.node(c).symbol.is_epsilon())
            .copied();
        match value {
            Some(exp) => {
                let ty = self.ty(exp);
                self.returns.push((ty, line));
            }
            None => self.returns.push((SemType::Void, line)),
        }
    }

    fn synthesize_print(&mut self, id: NodeId) {
        let kids = self.tree.children(id);
        if kids.len() < 5 {
            return;
        }
        for arg in self.collect_list(kids[2]) {
            let ty = self.ty(arg);
            if !ty.is_unknown() && !ty.is_printable() {
                self.error(
                    ErrorCode::UnsupportedPrintArgument,
                    format!("println! cannot print a value of type {}", ty),
                    self.line(arg),
                );
            }
        }
    }

    fn visit_block(&mut self, id: NodeId) {
        let kids = self.tree.children(id);
        if kids.len() < 3 {
            return;
        }
        self.visit_scoped(kids[1]);
    }

    fn visit_if(&mut self, id: NodeId) {
        let kids = self.tree.children(id).to_vec();
        if kids.len() < 6 {
            return;
        }
        self.visit(kids[1]);
        let cond_ty = self.ty(kids[1]);
        if !cond_ty.is_unknown() && cond_ty != SemType::Bool {
            self.error(
                ErrorCode::TypeMismatch,
                format!("if condition must be bool, found {}", cond_ty),
                self.line(kids[1]),
            );
        }
        self.visit_scoped(kids[3]);

        let else_kids = self.tree.children(kids[5]).to_vec();
        if else_kids.len() == 4 {
            self.visit_scoped(else_kids[2]);
        }
    }

    fn visit_loop(&mut self, id: NodeId) {
        let kids = self.tree.children(id).to_vec();
        if kids.len() < 4 {
            return;
        }
        self.loop_depth += 1;
        self.visit_scoped(kids[2]);
        self.loop_depth -= 1;
    }

    /// Visit a statement list inside a fresh nested scope. The scope
    /// closes only after the whole list has synthesized.
    fn visit_scoped(&mut self, stmt_ls: NodeId) {
        self.depth += 1;
        self.visit(stmt_ls);
        let context = self.context.clone();
        self.symbols.close_scope(&context, self.depth);
        self.depth -= 1;
    }

    fn visit_var_decl(&mut self, id: NodeId) {
        let kids = self.tree.children(id).to_vec();
        if kids.len() < 6 {
            return;
        }
        let line = self.line(id);
        let mutable = self
            .tree
            .children(kids[1])
            .first()
            .and_then(|&c| self.term(c))
            == Some("T_Mut");

        let ty_opt_kids = self.tree.children(kids[3]).to_vec();
        let declared = if ty_opt_kids.len() == 2 {
            Some(self.parse_type(ty_opt_kids[1]))
        } else {
            None
        };

        // The initializer is evaluated before any new name is visible.
        let init_kids = self.tree.children(kids[4]).to_vec();
        let init = if init_kids.len() == 2 {
            self.visit(init_kids[1]);
            Some(init_kids[1])
        } else {
            None
        };

        let pattern_kids = self.tree.children(kids[2]).to_vec();
        match pattern_kids.first().and_then(|&c| self.term(c)) {
            Some("T_Id") => {
                self.declare_single(id, pattern_kids[0], declared, init, mutable, line);
            }
            Some("T_LP") => {
                self.declare_tuple(pattern_kids[1], declared, init, mutable, line);
            }
            _ => {}
        }
    }

    fn declare_single(
        &mut self,
        decl: NodeId,
        name_node: NodeId,
        declared: Option<SemType>,
        init: Option<NodeId>,
        mutable: bool,
        line: u32,
    ) {
        let Some(name) = self.lexeme(name_node).map(str::to_string) else {
            return;
        };

        let mut ty = declared.clone().unwrap_or(SemType::Unknown);
        if let Some(exp) = init {
            let init_ty = self.ty(exp);
            if ty.is_unknown() {
                ty = init_ty;
            } else if !init_ty.is_unknown() && init_ty != ty {
                match (&ty, &init_ty) {
                    (
                        SemType::Array { elem: d, len: dl },
                        SemType::Array { elem: i, len: il },
                    ) if d == i => {
                        self.error(
                            ErrorCode::ArrayLengthMismatch,
                            format!("expected {} elements, initializer has {}", dl, il),
                            line,
                        );
                    }
                    (SemType::Tuple(d), SemType::Tuple(i)) if d.len() != i.len() => {
                        self.error(
                            ErrorCode::TupleArityMismatch,
                            format!(
                                "expected a tuple of {} elements, initializer has {}",
                                d.len(),
                                i.len()
                            ),
                            line,
                        );
                    }
                    _ => {
                        self.error(
                            ErrorCode::TypeMismatch,
                            format!(
                                "variable '{}' is declared {} but initialized with {}",
                                name, ty, init_ty
                            ),
                            line,
                        );
                    }
                }
            }
        }

        let mut binding = Binding::variable(&name, mutable, self.depth, line);
        binding.ty = ty.clone();
        if !mutable {
            binding.constant = init.and_then(|exp| self.folded[exp.index()]);
        }
        let context = self.context.clone();
        match self.symbols.define(&context, binding) {
            Ok(sym) => {
                self.decls[name_node.index()] = Some(sym);
                self.set(decl, ty);
            }
            // The earlier binding stays authoritative.
            Err(error) => self.errors.push(error),
        }
    }

    fn declare_tuple(
        &mut self,
        id_ls: NodeId,
        declared: Option<SemType>,
        init: Option<NodeId>,
        mutable: bool,
        line: u32,
    ) {
        // Flatten the pattern names.
        let mut names = Vec::new();
        let kids = self.tree.children(id_ls).to_vec();
        if kids.len() == 2 {
            names.push(kids[0]);
            let mut tail = kids[1];
            loop {
                let kids = self.tree.children(tail).to_vec();
                if kids.len() < 3 {
                    break;
                }
                names.push(kids[1]);
                tail = kids[2];
            }
        }
        let count = names.len();

        let mut elems = vec![SemType::Unknown; count];
        match declared {
            Some(SemType::Tuple(parts)) => {
                if parts.len() != count {
                    self.error(
                        ErrorCode::TupleArityMismatch,
                        format!(
                            "pattern binds {} names but the type has {} elements",
                            count,
                            parts.len()
                        ),
                        line,
                    );
                    // Positional best effort, so reads of the bound
                    // names do not pile further errors on top.
                    for (slot, part) in elems.iter_mut().zip(parts) {
                        *slot = part;
                    }
                } else {
                    elems = parts;
                }
            }
            Some(other) => {
                self.error(
                    ErrorCode::TypeMismatch,
                    format!("tuple pattern cannot have type {}", other),
                    line,
                );
            }
            None => {}
        }

        if let Some(exp) = init {
            match self.ty(exp) {
                SemType::Tuple(parts) => {
                    if parts.len() != count {
                        self.error(
                            ErrorCode::TupleArityMismatch,
                            format!(
                                "pattern binds {} names but initializer has {} elements",
                                count,
                                parts.len()
                            ),
                            line,
                        );
                        for (slot, part) in elems.iter_mut().zip(parts) {
                            if slot.is_unknown() {
                                *slot = part;
                            }
                        }
                    } else {
                        for (slot, part) in elems.iter_mut().zip(parts) {
                            if slot.is_unknown() {
                                *slot = part;
                            } else if !part.is_unknown() && part != *slot {
                                self.error(
                                    ErrorCode::TypeMismatch,
                                    format!("expected {}, initializer element has {}", slot, part),
                                    line,
                                );
                            }
                        }
                    }
                }
                SemType::Unknown => {}
                other => {
                    self.error(
                        ErrorCode::TypeMismatch,
                        format!("destructuring needs a tuple initializer, found {}", other),
                        line,
                    );
                }
            }
        }

        let context = self.context.clone();
        for (name_node, elem) in names.into_iter().zip(elems) {
            let Some(name) = self.lexeme(name_node).map(str::to_string) else {
                continue;
            };
            let mut binding = Binding::variable(&name, mutable, self.depth, line);
            binding.ty = elem.clone();
            match self.symbols.define(&context, binding) {
                Ok(sym) => {
                    self.decls[name_node.index()] = Some(sym);
                    self.set(name_node, elem);
                }
                Err(error) => self.errors.push(error),
            }
        }
    }

    /// An identifier-led statement: assignment, indexed assignment, or
    /// a call used as a statement.
    fn visit_id_stmt(&mut self, id: NodeId) {
        let kids = self.tree.children(id).to_vec();
        if kids.len() < 2 {
            return;
        }
        let name_node = kids[0];
        let said = kids[1];
        self.visit(said);

        let Some(name) = self.lexeme(name_node).map(str::to_string) else {
            return;
        };
        let line = self.line(name_node);
        let said_kids = self.tree.children(said).to_vec();

        match said_kids.first().and_then(|&c| self.term(c)) {
            Some("T_Assign") => self.check_assign(&name, line, said_kids[1]),
            Some("T_LB") => {
                if said_kids.len() >= 6 {
                    self.check_indexed_assign(&name, line, said_kids[1], said_kids[4]);
                }
            }
            Some("T_LP") => {
                let args = self.collect_list(said_kids[1]);
                self.check_call(&name, line, &args);
            }
            _ => {}
        }
    }

    fn check_assign(&mut self, name: &str, line: u32, exp: NodeId) {
        let Some(sym) = self.symbols.lookup(&self.context, name) else {
            self.error(
                ErrorCode::UndeclaredIdentifier,
                format!("variable '{}' is not declared", name),
                line,
            );
            return;
        };
        let binding = self.symbols.binding(sym);
        let (ty, mutable) = (binding.ty.clone(), binding.mutable);
        let exp_ty = self.ty(exp);
        let exp_val = self.folded[exp.index()];

        if ty.is_unknown() {
            // Deferred initialization narrows the type, once.
            if !exp_ty.is_unknown() {
                let binding = self.symbols.binding_mut(sym);
                binding.ty = exp_ty;
                if !mutable {
                    binding.constant = exp_val;
                }
            }
            return;
        }
        if !mutable {
            self.error(
                ErrorCode::AssignToImmutable,
                format!("cannot assign twice to immutable variable '{}'", name),
                line,
            );
            return;
        }
        if !exp_ty.is_unknown() && exp_ty != ty {
            self.error(
                ErrorCode::TypeMismatch,
                format!("cannot assign {} to variable '{}' of type {}", exp_ty, name, ty),
                line,
            );
        }
        self.symbols.binding_mut(sym).constant = None;
    }

    fn check_indexed_assign(&mut self, name: &str, line: u32, index: NodeId, value: NodeId) {
        let Some(sym) = self.symbols.lookup(&self.context, name) else {
            self.error(
                ErrorCode::UndeclaredIdentifier,
                format!("variable '{}' is not declared", name),
                line,
            );
            return;
        };
        let binding = self.symbols.binding(sym);
        let (ty, mutable) = (binding.ty.clone(), binding.mutable);
        if !mutable {
            self.error(
                ErrorCode::AssignToImmutable,
                format!("cannot assign to an element of immutable variable '{}'", name),
                line,
            );
        }
        match ty {
            SemType::Array { elem, len } => {
                self.check_index(index, Some(len));
                let value_ty = self.ty(value);
                if !value_ty.is_unknown() && value_ty != *elem {
                    self.error(
                        ErrorCode::TypeMismatch,
                        format!("cannot store {} in an array of {}", value_ty, elem),
                        line,
                    );
                }
            }
            SemType::Unknown => {}
            other => {
                self.error(
                    ErrorCode::TypeMismatch,
                    format!("variable '{}' of type {} cannot be indexed", name, other),
                    line,
                );
            }
        }
    }

    // ---- functions -------------------------------------------------------

    /// Register every function signature before any body is visited,
    /// so a call may name a function defined later in the file.
    fn declare_headers(&mut self) {
        for index in 0..self.tree.len() {
            let id = NodeId(index);
            if self.cat(id) == Some(NodeCat::Func) {
                self.declare_header(id);
            }
        }
    }

    fn declare_header(&mut self, id: NodeId) {
        let kids = self.tree.children(id).to_vec();
        if kids.len() < 9 {
            return;
        }
        let Some(name) = self.lexeme(kids[1]).map(str::to_string) else {
            return;
        };
        let line = self.line(id);

        let sym = match self.symbols.define(GLOBAL, Binding::function(&name, line)) {
            Ok(sym) => sym,
            // The earlier definition stays authoritative; the duplicate
            // re-reads its own header when its body is visited.
            Err(error) => {
                self.errors.push(error);
                return;
            }
        };
        self.decls[kids[1].index()] = Some(sym);

        let mut params = Vec::new();
        for param in self.collect_params(kids[3]) {
            let param_kids = self.tree.children(param).to_vec();
            if param_kids.len() < 2 {
                continue;
            }
            let Some(param_name) = self.lexeme(param_kids[0]).map(str::to_string) else {
                continue;
            };
            let annot_kids = self.tree.children(param_kids[1]).to_vec();
            let ty = if annot_kids.len() == 2 {
                self.parse_type(annot_kids[1])
            } else {
                SemType::Unknown
            };
            params.push((param_name, ty));
        }

        let ret_kids = self.tree.children(kids[5]).to_vec();
        let declared = if ret_kids.len() == 2 {
            self.parse_type(ret_kids[1])
        } else {
            SemType::Unknown
        };

        let binding = self.symbols.binding_mut(sym);
        binding.params = params;
        binding.ty = declared;
    }

    fn visit_func(&mut self, id: NodeId) {
        let kids = self.tree.children(id).to_vec();
        if kids.len() < 9 {
            return;
        }
        let Some(name) = self.lexeme(kids[1]).map(str::to_string) else {
            return;
        };
        let line = self.line(id);

        // The header pass already registered the signature (and folded
        // duplicates into a redefinition error).
        let fn_sym = self.decls[kids[1].index()];
        let header_params = fn_sym.map(|sym| self.symbols.binding(sym).params.clone());
        let declared = match fn_sym {
            Some(sym) => self.symbols.binding(sym).ty.clone(),
            None => {
                let ret_kids = self.tree.children(kids[5]).to_vec();
                if ret_kids.len() == 2 {
                    self.parse_type(ret_kids[1])
                } else {
                    SemType::Unknown
                }
            }
        };

        let saved_context = std::mem::replace(&mut self.context, name.clone());
        let saved_returns = std::mem::take(&mut self.returns);
        self.depth += 1;

        // Parameters become bindings in the function's own context.
        // Types come from the registered header, which a call before
        // this body may already have narrowed.
        for (position, param) in self.collect_params(kids[3]).into_iter().enumerate() {
            let param_kids = self.tree.children(param).to_vec();
            if param_kids.len() < 2 {
                continue;
            }
            let Some(param_name) = self.lexeme(param_kids[0]).map(str::to_string) else {
                continue;
            };
            let ty = match &header_params {
                Some(params) => params
                    .get(position)
                    .map(|(_, ty)| ty.clone())
                    .unwrap_or(SemType::Unknown),
                None => {
                    let annot_kids = self.tree.children(param_kids[1]).to_vec();
                    if annot_kids.len() == 2 {
                        self.parse_type(annot_kids[1])
                    } else {
                        SemType::Unknown
                    }
                }
            };

            let mut binding = Binding::parameter(&param_name, self.depth, self.line(param));
            binding.ty = ty;
            match self.symbols.define(&name, binding) {
                Ok(sym) => self.decls[param_kids[0].index()] = Some(sym),
                Err(error) => self.errors.push(error),
            }
        }

        self.visit(kids[7]);

        // Reconcile the declared return type with every return site.
        let mut effective = declared.clone();
        let mut saw_value = false;
        let returns = std::mem::take(&mut self.returns);
        for (ty, ret_line) in returns {
            if ty != SemType::Void {
                saw_value = true;
            }
            if effective.is_unknown() {
                if !ty.is_unknown() {
                    effective = ty;
                }
            } else if !ty.is_unknown() && ty != effective {
                self.error(
                    ErrorCode::ReturnTypeMismatch,
                    format!("function '{}' returns {}, this return gives {}", name, effective, ty),
                    ret_line,
                );
            }
        }
        if effective.is_unknown() {
            effective = SemType::Void;
        }
        if !declared.is_unknown() && declared != SemType::Void && !saw_value {
            self.error(
                ErrorCode::MissingReturnStatement,
                format!("function '{}' must return a value of type {}", name, declared),
                line,
            );
        }
        if let Some(sym) = fn_sym {
            self.symbols.binding_mut(sym).ty = effective;
        }

        // Parameter and body bindings retire only now, after synthesis.
        self.symbols.close_scope(&name, self.depth);
        self.depth -= 1;
        self.returns = saved_returns;
        self.context = saved_context;
    }

    fn collect_params(&self, param_ls: NodeId) -> Vec<NodeId> {
        let mut params = Vec::new();
        let kids = self.tree.children(param_ls);
        let (&head, mut tail) = match kids {
            [head, tail] => (head, *tail),
            _ => return params,
        };
        params.push(head);
        loop {
            let kids = self.tree.children(tail);
            if kids.len() < 3 {
                break;
            }
            params.push(kids[1]);
            tail = kids[2];
        }
        params
    }

    /// Resolve a `<type>` subtree to a semantic type.
    fn parse_type(&mut self, id: NodeId) -> SemType {
        let kids = self.tree.children(id).to_vec();
        match kids.first().and_then(|&c| self.term(c)) {
            Some("T_Int") => SemType::Int,
            Some("T_Bool") => SemType::Bool,
            Some("T_LB") if kids.len() >= 5 => {
                let elem = self.parse_type(kids[1]);
                let len = self
                    .lexeme(kids[3])
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(0);
                if len == 0 {
                    self.error(
                        ErrorCode::ArraySizeMustBePositive,
                        "array size must be at least 1",
                        self.line(id),
                    );
                }
                SemType::Array {
                    elem: Box::new(elem),
                    len,
                }
            }
            Some("T_LP") if kids.len() >= 3 => {
                let mut parts = Vec::new();
                let list_kids = self.tree.children(kids[1]).to_vec();
                if list_kids.len() == 2 {
                    parts.push(self.parse_type(list_kids[0]));
                    let mut tail = list_kids[1];
                    loop {
                        let kids = self.tree.children(tail).to_vec();
                        if kids.len() < 3 {
                            break;
                        }
                        parts.push(self.parse_type(kids[1]));
                        tail = kids[2];
                    }
                }
                if parts.is_empty() {
                    SemType::Void
                } else {
                    SemType::Tuple(parts)
                }
            }
            _ => SemType::Unknown,
        }
    }

    // ---- whole-program checks --------------------------------------------

    /// A parameter with no annotation that no call ever narrowed has
    /// no type to lower with.
    fn check_inference(&mut self) {
        let mut open = Vec::new();
        for (_, binding) in self.symbols.functions() {
            for (param, ty) in &binding.params {
                if ty.is_unknown() {
                    open.push((param.clone(), binding.name.clone(), binding.line));
                }
            }
        }
        for (param, func, line) in open {
            self.error(
                ErrorCode::CannotInferType,
                format!(
                    "cannot infer the type of parameter '{}' of function '{}'",
                    param, func
                ),
                line,
            );
        }
    }

    fn check_main(&mut self) {
        match self.symbols.lookup(GLOBAL, "main") {
            None => {
                self.errors.push(CompileError::new(
                    ErrorCode::MissingMain,
                    "program has no 'main' function",
                ));
            }
            Some(sym) => {
                let binding = self.symbols.binding(sym);
                let bad_ret = binding.ty != SemType::Void && !binding.ty.is_unknown();
                if !binding.params.is_empty() || bad_ret {
                    let line = binding.line;
                    self.error(
                        ErrorCode::IncompatibleMain,
                        "'main' takes no parameters and returns no value",
                        line,
                    );
                }
            }
        }
    }
}

/// Human-readable spelling of an operator terminal.
fn op_symbol(op: &str) -> &'static str {
    match op {
        "T_AOp_AD" => "+",
        "T_AOp_MN" => "-",
        "T_AOp_ML" => "*",
        "T_AOp_DV" => "/",
        "T_AOp_RM" => "%",
        "T_ROp_L" => "<",
        "T_ROp_G" => ">",
        "T_ROp_LE" => "<=",
        "T_ROp_GE" => ">=",
        "T_ROp_E" => "==",
        "T_ROp_NE" => "!=",
        "T_LOp_AND" => "&&",
        "T_LOp_OR" => "||",
        "T_LOp_NOT" => "!",
        _ => "?",
    }
}
