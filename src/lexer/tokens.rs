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

//! Token definitions for the Crust language.

use logos::Logos;

/// A token kind in the Crust language, derived with `logos`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenKind {
    // Keywords
    /// `bool` - boolean type.
    #[token("bool")]
    Bool,
    /// `break` - exit loop.
    #[token("break")]
    Break,
    /// `continue` - skip to next iteration.
    #[token("continue")]
    Continue,
    /// `else` - else branch.
    #[token("else")]
    Else,
    /// `false` - boolean false literal.
    #[token("false")]
    False,
    /// `fn` - function definition.
    #[token("fn")]
    Fn,
    /// `i32` - 32-bit integer type.
    #[token("i32")]
    Int,
    /// `if` - conditional statement.
    #[token("if")]
    If,
    /// `let` - variable declaration.
    #[token("let")]
    Let,
    /// `loop` - unconditional loop.
    #[token("loop")]
    Loop,
    /// `mut` - mutable binding.
    #[token("mut")]
    Mut,
    /// `println!` - print statement.
    #[token("println!")]
    Println,
    /// `return` - return from function.
    #[token("return")]
    Return,
    /// `true` - boolean true literal.
    #[token("true")]
    True,

    // Arithmetic operators
    /// `+` - addition.
    #[token("+")]
    Plus,
    /// `-` - subtraction or unary negation.
    #[token("-")]
    Minus,
    /// `*` - multiplication.
    #[token("*")]
    Star,
    /// `/` - division.
    #[token("/")]
    Slash,
    /// `%` - remainder.
    #[token("%")]
    Percent,

    // Relational operators
    /// `<` - less than.
    #[token("<")]
    Less,
    /// `>` - greater than.
    #[token(">")]
    Greater,
    /// `<=` - less or equal.
    #[token("<=")]
    LessEqual,
    /// `>=` - greater or equal.
    #[token(">=")]
    GreaterEqual,
    /// `==` - equal.
    #[token("==")]
    EqualEqual,
    /// `!=` - not equal.
    #[token("!=")]
    NotEqual,

    // Logical operators
    /// `&&` - logical AND.
    #[token("&&")]
    AndAnd,
    /// `||` - logical OR.
    #[token("||")]
    OrOr,
    /// `!` - logical NOT.
    #[token("!")]
    Not,

    // Punctuation
    /// `=` - assignment.
    #[token("=")]
    Assign,
    /// `(` - left parenthesis.
    #[token("(")]
    LeftParen,
    /// `)` - right parenthesis.
    #[token(")")]
    RightParen,
    /// `{` - left brace.
    #[token("{")]
    LeftBrace,
    /// `}` - right brace.
    #[token("}")]
    RightBrace,
    /// `[` - left bracket.
    #[token("[")]
    LeftBracket,
    /// `]` - right bracket.
    #[token("]")]
    RightBracket,
    /// `;` - statement terminator.
    #[token(";")]
    Semicolon,
    /// `,` - comma.
    #[token(",")]
    Comma,
    /// `:` - colon.
    #[token(":")]
    Colon,
    /// `->` - return type arrow.
    #[token("->")]
    Arrow,

    // Literals and identifiers
    /// Identifier (variable or function name).
    #[regex("[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
    /// Decimal integer literal.
    #[regex("[0-9]+")]
    Decimal,
    /// Hexadecimal integer literal.
    #[regex("0x[0-9A-Fa-f]+")]
    Hexadecimal,

    // Trivia, dropped before parsing
    /// Line comment.
    #[regex("//[^\n]*")]
    Comment,
    /// Newline, tracked for line numbers.
    #[token("\n")]
    Newline,

    /// End-of-input sentinel appended by the driver.
    Eof,
}

impl TokenKind {
    /// The grammar terminal name this token maps to in the parsing
    /// table.
    pub fn terminal_name(self) -> &'static str {
        match self {
            TokenKind::Bool => "T_Bool",
            TokenKind::Break => "T_Break",
            TokenKind::Continue => "T_Continue",
            TokenKind::Else => "T_Else",
            TokenKind::False => "T_False",
            TokenKind::Fn => "T_Fn",
            TokenKind::Int => "T_Int",
            TokenKind::If => "T_If",
            TokenKind::Let => "T_Let",
            TokenKind::Loop => "T_Loop",
            TokenKind::Mut => "T_Mut",
            TokenKind::Println => "T_Print",
            TokenKind::Return => "T_Return",
            TokenKind::True => "T_True",

            TokenKind::Plus => "T_AOp_AD",
            TokenKind::Minus => "T_AOp_MN",
            TokenKind::Star => "T_AOp_ML",
            TokenKind::Slash => "T_AOp_DV",
            TokenKind::Percent => "T_AOp_RM",

            TokenKind::Less => "T_ROp_L",
            TokenKind::Greater => "T_ROp_G",
            TokenKind::LessEqual => "T_ROp_LE",
            TokenKind::GreaterEqual => "T_ROp_GE",
            TokenKind::EqualEqual => "T_ROp_E",
            TokenKind::NotEqual => "T_ROp_NE",

            TokenKind::AndAnd => "T_LOp_AND",
            TokenKind::OrOr => "T_LOp_OR",
            TokenKind::Not => "T_LOp_NOT",

            TokenKind::Assign => "T_Assign",
            TokenKind::LeftParen => "T_LP",
            TokenKind::RightParen => "T_RP",
            TokenKind::LeftBrace => "T_LC",
            TokenKind::RightBrace => "T_RC",
            TokenKind::LeftBracket => "T_LB",
            TokenKind::RightBracket => "T_RB",
            TokenKind::Semicolon => "T_Semicolon",
            TokenKind::Comma => "T_Comma",
            TokenKind::Colon => "T_Colon",
            TokenKind::Arrow => "T_Arrow",

            TokenKind::Identifier => "T_Id",
            TokenKind::Decimal => "T_Decimal",
            TokenKind::Hexadecimal => "T_Hexadecimal",

            // Trivia never reaches the parser; give it a name anyway
            // so the mapping stays total.
            TokenKind::Comment => "T_Comment",
            TokenKind::Newline => "T_Whitespace",

            TokenKind::Eof => "$",
        }
    }

    /// Whether the token carries content worth keeping in the tree.
    pub fn carries_text(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier | TokenKind::Decimal | TokenKind::Hexadecimal
        )
    }

    /// Whether this token is dropped before parsing.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::Newline)
    }
}

/// A token: kind, source line, and content for identifiers and
/// literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32, text: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.text.is_empty() {
            write!(f, "< type: {}, line: {} >", self.kind.terminal_name(), self.line)
        } else {
            write!(
                f,
                "< type: {}, line: {}, content: {} >",
                self.kind.terminal_name(),
                self.line,
                self.text
            )
        }
    }
}
