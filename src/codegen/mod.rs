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

//! C code emission.
//!
//! The emitter is a mechanical walk over the analyzed parse tree. It
//! runs only on error-free programs, so it resolves declaration sites
//! through the analysis side tables and trusts what it finds. Booleans
//! lower to `int`, tuples to flat `int` arrays, `loop` to `for (;;)`,
//! and folded constants are emitted as literals.

use crate::analyzer::{Analysis, ConstValue, SemType};
use crate::parser::{NodeCat, NodeId, ParseTree};

/// Emit a complete C translation unit for an analyzed program.
pub fn emit(tree: &ParseTree, analysis: &Analysis) -> String {
    Emitter {
        tree,
        analysis,
        out: String::new(),
        indent: 0,
        in_main: false,
    }
    .run()
}

struct Emitter<'a> {
    tree: &'a ParseTree,
    analysis: &'a Analysis,
    out: String,
    indent: usize,
    in_main: bool,
}

impl<'a> Emitter<'a> {
    fn run(mut self) -> String {
        self.out.push_str("#include <stdio.h>\n\n");

        // Prototypes first, so definition order never matters.
        let mut wrote_prototype = false;
        for (_, binding) in self.analysis.symbols.functions() {
            if binding.name == "main" {
                continue;
            }
            let signature = self.signature(&binding.name, &binding.ty, &binding.params);
            self.out.push_str(&signature);
            self.out.push_str(";\n");
            wrote_prototype = true;
        }
        if wrote_prototype {
            self.out.push('\n');
        }

        for func in self.collect_chain(self.tree.child(self.tree.root(), 0)) {
            self.emit_func(func);
        }
        self.out
    }

    // ---- helpers ---------------------------------------------------------

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

    fn lexeme(&self, id: NodeId) -> &str {
        self.tree.node(id).lexeme.as_deref().unwrap_or("")
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Flatten a head/tail list chain (`func_ls`, `stmt_ls`, `exp_ls`,
    /// `arg_ls`) into its item nodes.
    fn collect_chain(&self, list: NodeId) -> Vec<NodeId> {
        let mut items = Vec::new();
        let mut current = list;
        loop {
            let kids = self.tree.children(current);
            if kids.len() < 2 {
                break;
            }
            // Tail lists carry a leading comma.
            let (item, next) = if kids.len() == 3 {
                (kids[1], kids[2])
            } else {
                (kids[0], kids[1])
            };
            items.push(item);
            current = next;
        }
        items
    }

    fn signature(&self, name: &str, ret: &SemType, params: &[(String, SemType)]) -> String {
        let ret_c = match ret {
            SemType::Void | SemType::Unknown => "void",
            _ => "int",
        };
        let params_c = if params.is_empty() {
            "void".to_string()
        } else {
            params
                .iter()
                .map(|(name, ty)| self.declarator(name, ty))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("{} {}({})", ret_c, name, params_c)
    }

    /// A C declarator for a name of the given Crust type.
    fn declarator(&self, name: &str, ty: &SemType) -> String {
        match ty {
            SemType::Array { len, .. } => format!("int {}[{}]", name, len),
            SemType::Tuple(parts) => format!("int {}[{}]", name, parts.len()),
            _ => format!("int {}", name),
        }
    }

    // ---- functions -------------------------------------------------------

    fn emit_func(&mut self, func: NodeId) {
        let kids = self.tree.children(func).to_vec();
        if kids.len() < 9 {
            return;
        }
        let Some(sym) = self.analysis.decl_of(kids[1]) else {
            return;
        };
        let binding = self.analysis.symbols.binding(sym);
        let name = binding.name.clone();
        self.in_main = name == "main";

        let signature = if self.in_main {
            "int main(void)".to_string()
        } else {
            self.signature(&name, &binding.ty, &binding.params)
        };
        self.line(&format!("{} {{", signature));
        self.indent += 1;
        self.emit_stmt_ls(kids[7]);
        if self.in_main {
            self.line("return 0;");
        }
        self.indent -= 1;
        self.line("}");
        self.out.push('\n');
        self.in_main = false;
    }

    fn emit_stmt_ls(&mut self, stmt_ls: NodeId) {
        for stmt in self.collect_chain(stmt_ls) {
            self.emit_stmt(stmt);
        }
    }

    fn emit_stmt(&mut self, stmt: NodeId) {
        let kids = self.tree.children(stmt).to_vec();
        let Some(&first) = kids.first() else {
            return;
        };
        if self.term(first) == Some("T_Id") {
            self.emit_id_stmt(first, kids[1]);
            return;
        }
        match self.cat(first) {
            Some(NodeCat::VarDecl) => self.emit_var_decl(first),
            Some(NodeCat::IfStmt) => self.emit_if(first),
            Some(NodeCat::LoopStmt) => self.emit_loop(first),
            Some(NodeCat::RetStmt) => self.emit_return(first),
            Some(NodeCat::BreakStmt) => self.line("break;"),
            Some(NodeCat::ContStmt) => self.line("continue;"),
            Some(NodeCat::PrintStmt) => self.emit_print(first),
            Some(NodeCat::Block) => {
                let block_kids = self.tree.children(first).to_vec();
                if block_kids.len() == 3 {
                    self.line("{");
                    self.indent += 1;
                    self.emit_stmt_ls(block_kids[1]);
                    self.indent -= 1;
                    self.line("}");
                }
            }
            _ => {}
        }
    }

    // ---- statements ------------------------------------------------------

    fn emit_var_decl(&mut self, decl: NodeId) {
        let kids = self.tree.children(decl).to_vec();
        if kids.len() < 6 {
            return;
        }
        let init_kids = self.tree.children(kids[4]).to_vec();
        let init = if init_kids.len() == 2 {
            Some(init_kids[1])
        } else {
            None
        };

        let pattern_kids = self.tree.children(kids[2]).to_vec();
        match pattern_kids.first().and_then(|&c| self.term(c)) {
            Some("T_Id") => self.emit_single_decl(pattern_kids[0], init),
            Some("T_LP") => self.emit_destructuring(pattern_kids[1], init),
            _ => {}
        }
    }

    fn emit_single_decl(&mut self, name_node: NodeId, init: Option<NodeId>) {
        let Some(sym) = self.analysis.decl_of(name_node) else {
            return;
        };
        let binding = self.analysis.symbols.binding(sym);
        let name = binding.name.clone();
        let ty = binding.ty.clone();
        let declarator = self.declarator(&name, &ty);

        match (&ty, init) {
            (SemType::Array { len, .. }, Some(exp)) => {
                if let Some(elements) = self.as_array_literal(exp) {
                    let parts: Vec<String> =
                        elements.iter().map(|&e| self.emit_exp(e)).collect();
                    self.line(&format!("{} = {{ {} }};", declarator, parts.join(", ")));
                } else {
                    // Arrays do not assign in C; copy element-wise.
                    let source = self.emit_exp(exp);
                    self.line(&format!("{};", declarator));
                    for index in 0..*len {
                        self.line(&format!("{}[{}] = {}[{}];", name, index, source, index));
                    }
                }
            }
            (SemType::Tuple(parts), Some(exp)) => {
                if let Some(elements) = self.as_tuple_literal(exp) {
                    let parts: Vec<String> =
                        elements.iter().map(|&e| self.emit_exp(e)).collect();
                    self.line(&format!("{} = {{ {} }};", declarator, parts.join(", ")));
                } else {
                    let source = self.emit_exp(exp);
                    self.line(&format!("{};", declarator));
                    for index in 0..parts.len() {
                        self.line(&format!("{}[{}] = {}[{}];", name, index, source, index));
                    }
                }
            }
            (_, Some(exp)) => {
                let value = self.emit_exp(exp);
                self.line(&format!("{} = {};", declarator, value));
            }
            (_, None) => self.line(&format!("{};", declarator)),
        }
    }

    fn emit_destructuring(&mut self, id_ls: NodeId, init: Option<NodeId>) {
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

        let elements = init.and_then(|exp| self.as_tuple_literal(exp));
        for (index, &name_node) in names.iter().enumerate() {
            let name = self.lexeme(name_node).to_string();
            match &elements {
                Some(items) => {
                    let value = self.emit_exp(items[index]);
                    self.line(&format!("int {} = {};", name, value));
                }
                None => match init {
                    Some(exp) => {
                        let source = self.emit_exp(exp);
                        self.line(&format!("int {} = {}[{}];", name, source, index));
                    }
                    None => self.line(&format!("int {};", name)),
                },
            }
        }
    }

    fn emit_if(&mut self, stmt: NodeId) {
        let kids = self.tree.children(stmt).to_vec();
        if kids.len() < 6 {
            return;
        }
        let condition = self.emit_exp(kids[1]);
        self.line(&format!("if ({}) {{", condition));
        self.indent += 1;
        self.emit_stmt_ls(kids[3]);
        self.indent -= 1;

        let else_kids = self.tree.children(kids[5]).to_vec();
        if else_kids.len() == 4 {
            self.line("} else {");
            self.indent += 1;
            self.emit_stmt_ls(else_kids[2]);
            self.indent -= 1;
        }
        self.line("}");
    }

    fn emit_loop(&mut self, stmt: NodeId) {
        let kids = self.tree.children(stmt).to_vec();
        if kids.len() < 4 {
            return;
        }
        self.line("for (;;) {");
        self.indent += 1;
        self.emit_stmt_ls(kids[2]);
        self.indent -= 1;
        self.line("}");
    }

    fn emit_return(&mut self, stmt: NodeId) {
        let kids = self.tree.children(stmt).to_vec();
        if kids.len() < 3 {
            return;
        }
        let value = self
            .tree
            .children(kids[1])
            .first()
            .filter(|&&c| !self.tree.node(c).symbol.is_epsilon())
            .copied();
        match value {
            Some(exp) => {
                let value = self.emit_exp(exp);
                self.line(&format!("return {};", value));
            }
            None if self.in_main => self.line("return 0;"),
            None => self.line("return;"),
        }
    }

    fn emit_print(&mut self, stmt: NodeId) {
        let kids = self.tree.children(stmt).to_vec();
        if kids.len() < 5 {
            return;
        }
        for arg in self.collect_chain(kids[2]) {
            let value = self.emit_exp(arg);
            self.line(&format!("printf(\"%d\\n\", {});", value));
        }
    }

    fn emit_id_stmt(&mut self, name_node: NodeId, said: NodeId) {
        let name = self.lexeme(name_node).to_string();
        let kids = self.tree.children(said).to_vec();
        match kids.first().and_then(|&c| self.term(c)) {
            Some("T_Assign") => {
                let value = self.emit_exp(kids[1]);
                self.line(&format!("{} = {};", name, value));
            }
            Some("T_LB") if kids.len() >= 6 => {
                let index = self.emit_exp(kids[1]);
                let value = self.emit_exp(kids[4]);
                self.line(&format!("{}[{}] = {};", name, index, value));
            }
            Some("T_LP") => {
                let args: Vec<String> = self
                    .collect_chain(kids[1])
                    .iter()
                    .map(|&a| self.emit_exp(a))
                    .collect();
                self.line(&format!("{}({});", name, args.join(", ")));
            }
            _ => {}
        }
    }

    // ---- expressions -----------------------------------------------------

    fn emit_exp(&self, id: NodeId) -> String {
        // Folded constants become literals.
        match self.analysis.const_of(id) {
            Some(ConstValue::Int(value)) => return value.to_string(),
            Some(ConstValue::Bool(value)) => return if value { "1" } else { "0" }.to_string(),
            _ => {}
        }

        match self.cat(id) {
            Some(NodeCat::Exp) | Some(NodeCat::RetVal) => {
                self.emit_exp(self.tree.child(id, 0))
            }
            Some(NodeCat::LogExp)
            | Some(NodeCat::RelExp)
            | Some(NodeCat::ArithExp)
            | Some(NodeCat::ArithTerm) => self.emit_chain(id),
            Some(NodeCat::ArithFactor) => self.emit_factor(id),
            _ => String::new(),
        }
    }

    fn emit_chain(&self, id: NodeId) -> String {
        let kids = self.tree.children(id);
        let (&head, mut tail) = match kids {
            [head, tail] => (head, *tail),
            _ => return String::new(),
        };
        let mut acc = self.emit_exp(head);
        loop {
            let kids = self.tree.children(tail);
            if kids.len() < 2 {
                break;
            }
            let Some(&op_leaf) = self.tree.children(kids[0]).first() else {
                break;
            };
            let op = c_operator(self.term(op_leaf).unwrap_or(""));
            let rhs = self.emit_exp(kids[1]);
            acc = format!("({} {} {})", acc, op, rhs);
            match kids.get(2) {
                Some(&next) => tail = next,
                None => break,
            }
        }
        acc
    }

    fn emit_factor(&self, id: NodeId) -> String {
        let kids = self.tree.children(id).to_vec();
        let Some(&first) = kids.first() else {
            return String::new();
        };
        match self.term(first) {
            Some("T_Decimal") | Some("T_Hexadecimal") => self.lexeme(first).to_string(),
            Some("T_True") => "1".to_string(),
            Some("T_False") => "0".to_string(),
            Some("T_LOp_NOT") => format!("(!{})", self.emit_exp(kids[1])),
            Some("T_AOp_MN") => format!("(-{})", self.emit_exp(kids[1])),
            Some("T_Id") => {
                let name = self.lexeme(first).to_string();
                let suffix_kids = self.tree.children(kids[1]).to_vec();
                match suffix_kids.first().and_then(|&c| self.term(c)) {
                    Some("T_LP") => {
                        let args: Vec<String> = self
                            .collect_chain(suffix_kids[1])
                            .iter()
                            .map(|&a| self.emit_exp(a))
                            .collect();
                        format!("{}({})", name, args.join(", "))
                    }
                    Some("T_LB") => format!("{}[{}]", name, self.emit_exp(suffix_kids[1])),
                    _ => name,
                }
            }
            Some("T_LP") if kids.len() >= 3 => {
                let tail_kids = self.tree.children(kids[2]).to_vec();
                match tail_kids.first().and_then(|&c| self.term(c)) {
                    Some("T_Comma") => {
                        // Tuple literal; valid only in initializers.
                        let mut parts = vec![self.emit_exp(kids[1])];
                        for item in self.collect_chain(tail_kids[1]) {
                            parts.push(self.emit_exp(item));
                        }
                        format!("{{ {} }}", parts.join(", "))
                    }
                    _ => format!("({})", self.emit_exp(kids[1])),
                }
            }
            Some("T_LB") if kids.len() >= 3 => {
                let parts: Vec<String> = self
                    .collect_chain(kids[1])
                    .iter()
                    .map(|&e| self.emit_exp(e))
                    .collect();
                format!("{{ {} }}", parts.join(", "))
            }
            _ => String::new(),
        }
    }

    /// Descend single-operand expression wrappers down to an array
    /// literal factor.
    fn as_array_literal(&self, exp: NodeId) -> Option<Vec<NodeId>> {
        let factor = self.as_plain_factor(exp)?;
        let kids = self.tree.children(factor);
        if kids.len() == 3 && self.term(kids[0]) == Some("T_LB") {
            Some(self.collect_chain(kids[1]))
        } else {
            None
        }
    }

    /// Descend down to a tuple literal factor `( e1, e2, ... )`.
    fn as_tuple_literal(&self, exp: NodeId) -> Option<Vec<NodeId>> {
        let factor = self.as_plain_factor(exp)?;
        let kids = self.tree.children(factor);
        if kids.len() == 3 && self.term(kids[0]) == Some("T_LP") {
            let tail_kids = self.tree.children(kids[2]);
            if tail_kids.first().and_then(|&c| self.term(c)) == Some("T_Comma") {
                let mut items = vec![kids[1]];
                items.extend(self.collect_chain(tail_kids[1]));
                return Some(items);
            }
        }
        None
    }

    /// The factor of an expression that applies no operator at all.
    fn as_plain_factor(&self, exp: NodeId) -> Option<NodeId> {
        let mut current = exp;
        loop {
            match self.cat(current) {
                Some(NodeCat::Exp) => current = self.tree.child(current, 0),
                Some(NodeCat::LogExp)
                | Some(NodeCat::RelExp)
                | Some(NodeCat::ArithExp)
                | Some(NodeCat::ArithTerm) => {
                    let kids = self.tree.children(current);
                    if kids.len() != 2 {
                        return None;
                    }
                    // The tail must derive ε.
                    let tail_kids = self.tree.children(kids[1]);
                    let is_empty = tail_kids.len() == 1
                        && self.tree.node(tail_kids[0]).symbol.is_epsilon();
                    if !is_empty {
                        return None;
                    }
                    current = kids[0];
                }
                Some(NodeCat::ArithFactor) => return Some(current),
                _ => return None,
            }
        }
    }
}

fn c_operator(op: &str) -> &'static str {
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
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::sets::FirstFollow;
    use crate::grammar::table::ParseTable;
    use crate::grammar::Grammar;

    fn emit_source(source: &str) -> String {
        let grammar = Grammar::crust().unwrap();
        let sets = FirstFollow::compute(&grammar).unwrap();
        let table = ParseTable::build(&grammar, &sets);
        let (tokens, lex_errors) = crate::lexer::tokenize(source);
        assert!(lex_errors.is_empty());
        let outcome = crate::parser::parse(&tokens, &table, &grammar.start);
        assert!(outcome.is_ok(), "parse errors: {:?}", outcome.errors);
        let analysis = crate::analyzer::analyze(&outcome.tree);
        assert!(analysis.is_ok(), "semantic errors: {:?}", analysis.errors);
        emit(&outcome.tree, &analysis)
    }

    #[test]
    fn test_main_becomes_int_main() {
        let c = emit_source("fn main() { println!(1); }\n");
        assert!(c.contains("int main(void) {"), "emitted:\n{}", c);
        assert!(c.contains("printf(\"%d\\n\", 1);"));
        assert!(c.contains("return 0;"));
    }

    #[test]
    fn test_functions_get_prototypes() {
        let c = emit_source(
            "fn add(a: i32, b: i32) -> i32 { return a + b; }\n\
             fn main() { println!(add(1, 2)); }\n",
        );
        assert!(c.contains("int add(int a, int b);"), "emitted:\n{}", c);
        assert!(c.contains("int add(int a, int b) {"));
        assert!(c.contains("return (a + b);"));
    }

    #[test]
    fn test_folded_constants_become_literals() {
        let c = emit_source("fn main() { let mut x = 2 + 3 * 4; x = x + 1; println!(x); }\n");
        assert!(c.contains("int x = 14;"), "emitted:\n{}", c);
        // The mutable read does not fold.
        assert!(c.contains("x = (x + 1);"));
    }

    #[test]
    fn test_loop_and_break() {
        let c = emit_source(
            "fn main() { let mut i = 0; loop { i = i + 1; if i > 3 { break; } } }\n",
        );
        assert!(c.contains("for (;;) {"), "emitted:\n{}", c);
        assert!(c.contains("break;"));
        assert!(c.contains("if ((i > 3)) {"));
    }

    #[test]
    fn test_arrays_lower_to_c_arrays() {
        let c = emit_source(
            "fn main() { let mut a = [1, 2, 3]; a[0] = 9; println!(a[0]); }\n",
        );
        assert!(c.contains("int a[3] = { 1, 2, 3 };"), "emitted:\n{}", c);
        assert!(c.contains("a[0] = 9;"));
    }

    #[test]
    fn test_booleans_lower_to_int() {
        let c = emit_source(
            "fn main() { let mut flag = true; flag = !flag; if flag { println!(1); } else { println!(0); } }\n",
        );
        assert!(c.contains("int flag = 1;"), "emitted:\n{}", c);
        assert!(c.contains("flag = (!flag);"));
        assert!(c.contains("} else {"));
    }

    #[test]
    fn test_destructuring_splits_into_scalars() {
        let c = emit_source("fn main() { let (a, b) = (1, 2); println!(a + b); }\n");
        assert!(c.contains("int a = 1;"), "emitted:\n{}", c);
        assert!(c.contains("int b = 2;"));
    }
}
