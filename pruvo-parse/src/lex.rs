//! Tokens of the S-expression syntax.

use core::fmt::{self, Display};
use logos::Logos;

/// Raw token produced by the derived lexer.
#[derive(Logos, Clone, Debug, Eq, PartialEq)]
#[logos(type S = &str)]
pub enum Raw<S> {
    #[token("(")]
    Open,

    #[token(")")]
    Close,

    /// Maximal run of characters that are neither whitespace, parentheses,
    /// nor the comment marker. UTF-8 is accepted.
    #[regex(r"[^ \t\r\n\f()#]+")]
    Word(S),

    // Logos requires one token variant to handle errors;
    // whitespace and line comments are skipped on the way.
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    #[regex(r"#[^\n]*", logos::skip)]
    #[error]
    Error,
}

/// Token handed to the parser; end of input is a token of its own.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Token<'s> {
    Open,
    Close,
    Word(&'s str),
    Eof,
}

impl<'s> Display for Token<'s> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Open => "opening parenthesis".fmt(f),
            Self::Close => "closing parenthesis".fmt(f),
            Self::Word(w) if w.is_empty() => "word".fmt(f),
            Self::Word(w) => write!(f, "word {}", w),
            Self::Eof => "end of file".fmt(f),
        }
    }
}

/// A line/column pair, both starting at 1.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Lexer that tracks the position of the current token.
pub struct Lexer<'s> {
    src: &'s str,
    inner: logos::Lexer<'s, Raw<&'s str>>,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self {
            src,
            inner: Raw::lexer(src),
        }
    }

    /// The next token; `Eof` once the input is exhausted.
    pub fn token(&mut self) -> Token<'s> {
        loop {
            match self.inner.next() {
                Some(Raw::Open) => break Token::Open,
                Some(Raw::Close) => break Token::Close,
                Some(Raw::Word(w)) => break Token::Word(w),
                // the word rule covers every non-skipped character
                Some(Raw::Error) => continue,
                None => break Token::Eof,
            }
        }
    }

    /// Position of the most recently produced token.
    pub fn position(&self) -> Position {
        let before = &self.src[..self.inner.span().start.min(self.src.len())];
        let line = before.matches('\n').count() + 1;
        let col = before.chars().rev().take_while(|c| *c != '\n').count() + 1;
        Position { line, col }
    }
}

impl<'s> Iterator for Lexer<'s> {
    type Item = Token<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.token() {
            Token::Eof => None,
            tok => Some(tok),
        }
    }
}
