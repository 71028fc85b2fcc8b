//! Lexer 单元测试
//!
//! 测试词法分析器的分词功能
use crate::frontend::lexer::{tokenize, tokens::TokenKind};
use crate::frontend::ParseError;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[cfg(test)]
mod lexer_basic_tests {
    use super::*;

    #[test]
    fn test_empty_source() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0].kind, TokenKind::Eof));
    }

    #[test]
    fn test_whitespace() {
        let tokens = tokenize("   \t\n\r   ").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0].kind, TokenKind::Eof));
    }

    #[test]
    fn test_uppercase_letters_split() {
        assert_eq!(
            kinds("SKK"),
            vec![
                TokenKind::Upper('S'),
                TokenKind::Upper('K'),
                TokenKind::Upper('K'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifier_with_underscore() {
        assert_eq!(
            kinds("my_var x1"),
            vec![
                TokenKind::Ident("my_var".to_string()),
                TokenKind::Ident("x1".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifier_stops_at_uppercase() {
        assert_eq!(
            kinds("fooK"),
            vec![
                TokenKind::Ident("foo".to_string()),
                TokenKind::Upper('K'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numeral() {
        assert_eq!(kinds("42"), vec![TokenKind::Numeral(42), TokenKind::Eof]);
    }
}

#[cfg(test)]
mod lexer_operator_tests {
    use super::*;

    #[test]
    fn test_lambda_arrow() {
        assert_eq!(
            kinds("x->x"),
            vec![
                TokenKind::Ident("x".to_string()),
                TokenKind::Arrow,
                TokenKind::Ident("x".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_definition() {
        assert_eq!(
            kinds("T = C I; T"),
            vec![
                TokenKind::Upper('T'),
                TokenKind::Eq,
                TokenKind::Upper('C'),
                TokenKind::Upper('I'),
                TokenKind::Semicolon,
                TokenKind::Upper('T'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_parens_and_plus() {
        assert_eq!(
            kinds("(+2)"),
            vec![
                TokenKind::LParen,
                TokenKind::Plus,
                TokenKind::Numeral(2),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }
}

#[cfg(test)]
mod lexer_error_tests {
    use super::*;

    #[test]
    fn test_lone_minus() {
        let err = tokenize("x - y").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedChar { ch: '-', .. }));
    }

    #[test]
    fn test_unexpected_char_position() {
        match tokenize("S\n  K %").unwrap_err() {
            ParseError::UnexpectedChar { ch, position } => {
                assert_eq!(ch, '%');
                assert_eq!(position.line, 2);
                assert_eq!(position.column, 5);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_numeral_overflow() {
        let err = tokenize("99999999999999999999999").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumeral { .. }));
    }
}

#[cfg(test)]
mod lexer_span_tests {
    use super::*;

    #[test]
    fn test_span_tracking() {
        let tokens = tokenize("ab ->").unwrap();
        assert_eq!(tokens[0].span.start.column, 1);
        assert_eq!(tokens[0].span.end.column, 3);
        assert_eq!(tokens[1].span.start.column, 4);
        assert_eq!(tokens[1].span.len(), 2);
    }
}
