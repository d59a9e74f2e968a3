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

//! Tokenization of Crust source code.
//!
//! The lexer turns source text into the ordered token sequence the
//! parser driver consumes. Unrecognized characters are recorded as
//! lexical errors and skipped; lexing never aborts.

mod tokens;

pub use tokens::{Token, TokenKind};

use logos::Logos;

use crate::error::{CompileError, ErrorCode};

/// Tokenize source code.
///
/// Returns the token stream (trivia removed) and any lexical errors.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<CompileError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut line: u32 = 1;

    let mut lexer = TokenKind::lexer(source);
    while let Some(result) = lexer.next() {
        match result {
            Ok(kind) => {
                if kind == TokenKind::Newline {
                    line += 1;
                    continue;
                }
                if kind.is_trivia() {
                    continue;
                }
                let text = if kind.carries_text() {
                    lexer.slice().to_string()
                } else {
                    String::new()
                };
                tokens.push(Token::new(kind, line, text));
            }
            Err(()) => {
                errors.push(CompileError::at_line(
                    ErrorCode::InvalidCharacter,
                    format!("unrecognized character {:?}", lexer.slice()),
                    line,
                ));
            }
        }
    }

    (tokens, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("let mut count"),
            vec![TokenKind::Let, TokenKind::Mut, TokenKind::Identifier]
        );
        // A keyword prefix inside a longer word is an identifier.
        assert_eq!(kinds("letter"), vec![TokenKind::Identifier]);
    }

    #[test]
    fn test_numbers() {
        let (tokens, errors) = tokenize("42 0x2A");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Decimal);
        assert_eq!(tokens[0].text, "42");
        assert_eq!(tokens[1].kind, TokenKind::Hexadecimal);
        assert_eq!(tokens[1].text, "0x2A");
    }

    #[test]
    fn test_compound_operators() {
        assert_eq!(
            kinds("<= >= == != && || ->"),
            vec![
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Arrow,
            ]
        );
    }

    #[test]
    fn test_println_bang_is_one_token() {
        assert_eq!(kinds("println!(x)"), vec![
            TokenKind::Println,
            TokenKind::LeftParen,
            TokenKind::Identifier,
            TokenKind::RightParen,
        ]);
    }

    #[test]
    fn test_line_tracking_and_comments() {
        let source = "let a; // declaration\nlet b;\n";
        let (tokens, errors) = tokenize(source);
        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[3].line, 2);
        assert!(tokens.iter().all(|t| t.kind != TokenKind::Comment));
    }

    #[test]
    fn test_invalid_character_is_recorded_and_skipped() {
        let (tokens, errors) = tokenize("let @ x");
        assert_eq!(tokens.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::InvalidCharacter);
        assert_eq!(errors[0].line, Some(1));
    }

    #[test]
    fn test_token_display() {
        let token = Token::new(TokenKind::Identifier, 3, "x");
        assert_eq!(token.to_string(), "< type: T_Id, line: 3, content: x >");
    }
}
