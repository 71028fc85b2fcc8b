//! Parser state and token stream management

use crate::frontend::lexer::tokens::*;
use crate::frontend::ParseError;
use crate::util::span::Position;

/// Parser state for tracking position
#[derive(Debug)]
pub struct ParserState<'a> {
    /// Token stream, always terminated by `Eof`
    tokens: &'a [Token],
    /// Current position in token stream
    pos: usize,
}

impl<'a> ParserState<'a> {
    /// Create a new parser state
    #[inline]
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Check if at end of token stream
    #[inline]
    pub fn at_end(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    /// Get current token kind
    #[inline]
    pub fn kind(&self) -> &TokenKind {
        self.peek_kind(0)
    }

    /// Kind of the nth token ahead
    #[inline]
    pub fn peek_kind(
        &self,
        n: usize,
    ) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    /// Check current token kind
    #[inline]
    pub fn at(
        &self,
        kind: &TokenKind,
    ) -> bool {
        self.kind() == kind
    }

    /// Position of the current token
    #[inline]
    pub fn position(&self) -> Position {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.span.start)
            .unwrap_or_default()
    }

    /// Advance to next token
    #[inline]
    pub fn bump(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    /// Skip a specific token
    #[inline]
    pub fn skip(
        &mut self,
        kind: &TokenKind,
    ) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// 当前是否为 `ident ->`
    #[inline]
    pub fn at_binder(&self) -> bool {
        matches!(self.kind(), TokenKind::Ident(_)) && self.peek_kind(1) == &TokenKind::Arrow
    }

    /// 当前是否为 `NAME =`
    #[inline]
    pub fn at_definition(&self) -> bool {
        self.kind().name().is_some() && self.peek_kind(1) == &TokenKind::Eq
    }

    /// Check if current token can start an atom
    #[inline]
    pub fn can_start_atom(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::LParen
                | TokenKind::Upper(_)
                | TokenKind::Ident(_)
                | TokenKind::Numeral(_)
                | TokenKind::Plus
        )
    }

    /// 当前 token 不符合预期时的错误
    pub fn unexpected(&self) -> ParseError {
        let position = self.position();
        match self.kind() {
            TokenKind::Eof => ParseError::UnexpectedEof { position },
            TokenKind::RParen => ParseError::UnbalancedParen { position },
            other => ParseError::UnexpectedToken {
                found: other.to_string(),
                position,
            },
        }
    }
}
