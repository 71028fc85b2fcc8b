//! Lexer module

pub mod tokens;

use tokens::*;

pub use tokenizer::tokenize;

/// Tokenize source code
mod tokenizer {
    use super::*;
    use crate::frontend::ParseError;
    use crate::util::span::{Position, Span};
    use std::iter::Peekable;
    use std::str::Chars;

    pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();

        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }

        let end = lexer.position();
        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(end, end),
        });
        Ok(tokens)
    }

    struct Lexer<'a> {
        chars: Peekable<Chars<'a>>,
        offset: usize,
        line: usize,
        column: usize,
        start: Position,
    }

    impl<'a> Lexer<'a> {
        fn new(source: &'a str) -> Self {
            Self {
                chars: source.chars().peekable(),
                offset: 0,
                line: 1,
                column: 1,
                start: Position::with_offset(1, 1, 0),
            }
        }

        fn position(&self) -> Position {
            Position::with_offset(self.line, self.column, self.offset)
        }

        fn make_token(
            &self,
            kind: TokenKind,
        ) -> Token {
            Token {
                kind,
                span: Span::new(self.start, self.position()),
            }
        }

        fn advance(&mut self) -> Option<char> {
            match self.chars.next() {
                Some('\n') => {
                    self.offset += 1;
                    self.line += 1;
                    self.column = 1;
                    Some('\n')
                }
                Some(c) => {
                    self.offset += c.len_utf8();
                    self.column += 1;
                    Some(c)
                }
                None => None,
            }
        }

        fn peek(&mut self) -> Option<&char> {
            self.chars.peek()
        }

        fn skip_whitespace(&mut self) {
            while let Some(&c) = self.peek() {
                if c.is_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
            self.skip_whitespace();
            self.start = self.position();

            let Some(c) = self.advance() else {
                return Ok(None);
            };

            let token = match c {
                c if c.is_ascii_uppercase() => self.make_token(TokenKind::Upper(c)),
                c if is_identifier_start(c) => self.scan_identifier(c),
                c if c.is_ascii_digit() => self.scan_numeral(c)?,
                '+' => self.make_token(TokenKind::Plus),
                '=' => self.make_token(TokenKind::Eq),
                ';' => self.make_token(TokenKind::Semicolon),
                '(' => self.make_token(TokenKind::LParen),
                ')' => self.make_token(TokenKind::RParen),
                '-' if self.peek() == Some(&'>') => {
                    self.advance();
                    self.make_token(TokenKind::Arrow)
                }
                ch => {
                    return Err(ParseError::UnexpectedChar {
                        ch,
                        position: self.start,
                    })
                }
            };
            Ok(Some(token))
        }

        fn scan_identifier(
            &mut self,
            first_char: char,
        ) -> Token {
            let mut value = String::new();
            value.push(first_char);

            while let Some(&c) = self.peek() {
                if is_identifier_char(c) {
                    value.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            self.make_token(TokenKind::Ident(value))
        }

        fn scan_numeral(
            &mut self,
            first_char: char,
        ) -> Result<Token, ParseError> {
            let mut value = String::new();
            value.push(first_char);

            while let Some(&c) = self.peek() {
                if c.is_ascii_digit() {
                    value.push(c);
                    self.advance();
                } else {
                    break;
                }
            }

            match value.parse::<u64>() {
                Ok(n) => Ok(self.make_token(TokenKind::Numeral(n))),
                Err(_) => Err(ParseError::InvalidNumeral {
                    text: value,
                    position: self.start,
                }),
            }
        }
    }

    fn is_identifier_start(c: char) -> bool {
        c.is_ascii_lowercase() || c == '_'
    }

    fn is_identifier_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
    }
}

#[cfg(test)]
mod tests;
