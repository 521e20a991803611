//! Argument tokenizer
//!
//!     Parameters of `[apply]` and the `key=value` lists of `[set]` and `[global]` share one
//!     tiny token set. A quoted literal is delimited by single quotes; a doubled quote inside
//!     stands for one quote.

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, PartialEq, Eq, Clone)]
#[logos(skip r"[ \t\r\n]+")]
pub enum ArgToken {
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(",")]
    Comma,
    #[token("=")]
    Equals,
    #[regex(r"'([^']|'')*'", |lex| unquote(lex.slice()))]
    Quoted(String),
    #[regex(r"[A-Za-z0-9_$/#%@+\-][A-Za-z0-9_$/#%@+\-.:]*", |lex| lex.slice().to_string())]
    Word(String),
}

/// Strip the quotes and collapse doubled quotes
pub fn unquote(quoted: &str) -> String {
    quoted[1..quoted.len() - 1].replace("''", "'")
}

/// Tokenize an argument string; `Err` carries the span of the first unrecognised input
pub fn tokenize(text: &str) -> Result<Vec<(ArgToken, Range<usize>)>, Range<usize>> {
    let mut lexer = ArgToken::lexer(text);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next() {
        match token {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => return Err(lexer.span()),
        }
    }
    Ok(tokens)
}

/// Parse `key=value, key=value` (commas optional). Values may be words or quoted literals.
pub fn parse_settings(text: &str) -> Result<Vec<(String, String)>, String> {
    let tokens = tokenize(text).map_err(|span| format!("unexpected `{}`", &text[span]))?;
    let mut settings = Vec::new();
    let mut tokens = tokens.into_iter().map(|(t, _)| t).peekable();
    while let Some(token) = tokens.next() {
        let key = match token {
            ArgToken::Word(key) => key,
            ArgToken::Comma => continue,
            other => return Err(format!("expected a setting name, found {other}")),
        };
        match tokens.next() {
            Some(ArgToken::Equals) => {}
            _ => return Err(format!("expected `=` after `{key}`")),
        }
        let value = match tokens.next() {
            Some(ArgToken::Word(value)) | Some(ArgToken::Quoted(value)) => value,
            _ => return Err(format!("missing value for `{key}`")),
        };
        settings.push((key, value));
    }
    Ok(settings)
}

impl std::fmt::Display for ArgToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgToken::OpenParen => write!(f, "`(`"),
            ArgToken::CloseParen => write!(f, "`)`"),
            ArgToken::Comma => write!(f, "`,`"),
            ArgToken::Equals => write!(f, "`=`"),
            ArgToken::Quoted(text) => write!(f, "'{text}'"),
            ArgToken::Word(word) => write!(f, "`{word}`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<ArgToken> {
        tokenize(text)
            .expect("tokenize")
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_apply_arguments() {
        assert_eq!(
            kinds("out = fmt.money( total, 'it''s', )"),
            vec![
                ArgToken::Word("out".into()),
                ArgToken::Equals,
                ArgToken::Word("fmt.money".into()),
                ArgToken::OpenParen,
                ArgToken::Word("total".into()),
                ArgToken::Comma,
                ArgToken::Quoted("it's".into()),
                ArgToken::Comma,
                ArgToken::CloseParen,
            ]
        );
    }

    #[test]
    fn test_unrecognised_input() {
        assert_eq!(tokenize("a ; b"), Err(2..3));
        assert!(tokenize("'open").is_err());
    }

    #[test]
    fn test_settings() {
        assert_eq!(
            parse_settings("bundle=messages, escape='html strict' version=2").expect("settings"),
            vec![
                ("bundle".to_string(), "messages".to_string()),
                ("escape".to_string(), "html strict".to_string()),
                ("version".to_string(), "2".to_string()),
            ]
        );
        assert!(parse_settings("bundle").is_err());
        assert!(parse_settings("bundle=").is_err());
        assert!(parse_settings("=x").is_err());
    }
}
