//! Token types

use crate::util::span::Span;
use std::fmt;

/// Token kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// 单个大写字母，相邻的大写字母各自成为一个 token（`SKK` = `S K K`）
    Upper(char),
    /// 小写标识符 `[a-z_][a-z_0-9]*`
    Ident(String),
    /// 十进制数字
    Numeral(u64),

    // Operators
    Plus,
    Arrow,
    Eq,

    // Delimiters
    LParen,
    RParen,
    Semicolon,

    // Special
    Eof,
}

impl TokenKind {
    /// 名字类 token 的文本
    pub fn name(&self) -> Option<String> {
        match self {
            TokenKind::Upper(c) => Some(c.to_string()),
            TokenKind::Ident(name) => Some(name.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            TokenKind::Upper(c) => write!(f, "{}", c),
            TokenKind::Ident(name) => write!(f, "{}", name),
            TokenKind::Numeral(n) => write!(f, "{}", n),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Arrow => write!(f, "->"),
            TokenKind::Eq => write!(f, "="),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// Token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl From<TokenKind> for Token {
    fn from(kind: TokenKind) -> Self {
        Token {
            kind,
            span: Span::dummy(),
        }
    }
}
