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

//! Arena-allocated parse tree.
//!
//! Nodes are addressed by stable index: each node stores its children
//! as an ordered list of indices and an optional parent index, which
//! keeps back-traversal index-safe and cycle-free by construction.
//! Interior nodes carry nonterminal symbols; leaves carry terminals
//! (with lexeme and line number) or the `ε` marker.

use std::fmt;

use crate::grammar::Symbol;

/// A stable index into the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One parse tree node.
#[derive(Debug, Clone)]
pub struct Node {
    /// The grammar symbol this node was expanded from or matched as.
    pub symbol: Symbol,
    /// The matched lexeme, for terminal leaves that carry content.
    pub lexeme: Option<String>,
    /// The source line this node was matched or expanded at.
    pub line: Option<u32>,
    /// Parent node, absent for the root and detached nodes.
    pub parent: Option<NodeId>,
    /// Children in left-to-right order.
    pub children: Vec<NodeId>,
}

impl Node {
    fn new(symbol: Symbol, parent: Option<NodeId>) -> Self {
        Self {
            symbol,
            lexeme: None,
            line: None,
            parent,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The parse tree arena. Owns every node for the lifetime of the
/// compilation unit.
#[derive(Debug, Clone)]
pub struct ParseTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ParseTree {
    /// Create a tree containing only a root node.
    pub fn new(root_symbol: Symbol) -> Self {
        Self {
            nodes: vec![Node::new(root_symbol, None)],
            root: NodeId(0),
        }
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, detached nodes included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Mutably borrow a node.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Append a new child under `parent` and return its id.
    pub fn add_child(&mut self, parent: NodeId, symbol: Symbol) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(symbol, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Allocate a node that belongs to no parent (used for the `$`
    /// sentinel at the bottom of the parse stack).
    pub fn add_detached(&mut self, symbol: Symbol) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(symbol, None));
        id
    }

    /// The ordered children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// The parent of a node, if any.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Child `index` of `id`. Panics if out of range; parse trees built
    /// from a production always have the full body expanded.
    pub fn child(&self, id: NodeId, index: usize) -> NodeId {
        self.nodes[id.0].children[index]
    }

    /// Render the tree as an indented dump with box-drawing connectors.
    /// Terminal lexemes are shown beneath their node. Diagnostic only.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut continuations: Vec<bool> = Vec::new();
        self.render_node(self.root, &mut out, &mut continuations, true);
        out
    }

    fn render_node(
        &self,
        id: NodeId,
        out: &mut String,
        continuations: &mut Vec<bool>,
        last: bool,
    ) {
        let node = &self.nodes[id.0];
        let depth = continuations.len();

        for &open in continuations[..depth.saturating_sub(1)].iter() {
            out.push_str(if open { "│   " } else { "    " });
        }
        if depth > 0 {
            out.push_str(if last { "└── " } else { "├── " });
        }
        out.push_str(&node.symbol.to_string());
        out.push('\n');

        if let Some(lexeme) = &node.lexeme {
            for &open in continuations.iter() {
                out.push_str(if open { "│   " } else { "    " });
            }
            out.push_str(&format!("└── '{}'\n", lexeme));
        }

        let count = node.children.len();
        for (index, &child) in node.children.iter().enumerate() {
            let child_last = index + 1 == count;
            continuations.push(!child_last);
            self.render_node(child, out, continuations, child_last);
            continuations.pop();
        }
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
