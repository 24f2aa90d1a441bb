// Copyright (c) 2017-2021 Fabian Schuiki

//! Lexical scanning of the restricted WGSL surface.
//!
//! The passes in this crate do not parse the full language. They only need to
//! see identifiers, integer literals, comments, and the handful of
//! punctuation marks that make up loop and conditional headers; any other
//! byte comes out as an opaque token. Whitespace carries no structure and is
//! skipped, but the spans of adjacent tokens still allow the original text
//! between them to be recovered verbatim.

use itertools::Itertools;

/// The kind of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// An identifier or keyword.
    Ident,
    /// An unsigned integer literal.
    Int,
    /// A line or block comment.
    ///
    /// Comments are regular tokens rather than skipped trivia: a comment
    /// inside a pattern head is a structural non-match, which is what keeps
    /// marker comments effective.
    Comment,
    /// A `(`.
    LParen,
    /// A `)`.
    RParen,
    /// A `{`.
    LBrace,
    /// A `}`.
    RBrace,
    /// A `;`.
    Semicolon,
    /// A `:`.
    Colon,
    /// A `=`.
    Assign,
    /// A `<`.
    Lt,
    /// A `++`.
    Incr,
    /// Any other byte.
    Other,
}

/// A token, as a kind plus the byte range it covers in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// Get the text this token covers.
    pub fn text<'a>(&self, code: &'a str) -> &'a str {
        &code[self.start..self.end]
    }
}

/// Split source text into tokens.
///
/// Scanning never fails; bytes that mean nothing to the matchers come out as
/// `Other` tokens. An unterminated block comment extends to the end of the
/// input.
pub fn tokenize(code: &str) -> Vec<Token> {
    let mut tokens = vec![];
    let mut it = code.char_indices().peekable();
    while let Some((start, c)) = it.next() {
        let kind = match c {
            c if c.is_whitespace() => continue,
            c if is_ident_start(c) => {
                it.peeking_take_while(|&(_, c)| is_ident_cont(c)).for_each(drop);
                TokenKind::Ident
            }
            '0'..='9' => {
                it.peeking_take_while(|&(_, c)| c.is_ascii_digit()).for_each(drop);
                TokenKind::Int
            }
            '/' if it.peek().map(|&(_, c)| c) == Some('/') => {
                it.peeking_take_while(|&(_, c)| c != '\n').for_each(drop);
                TokenKind::Comment
            }
            '/' if it.peek().map(|&(_, c)| c) == Some('*') => {
                it.next();
                let mut prev = '\0';
                while let Some(&(_, c)) = it.peek() {
                    it.next();
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                TokenKind::Comment
            }
            '+' if it.peek().map(|&(_, c)| c) == Some('+') => {
                it.next();
                TokenKind::Incr
            }
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '=' => TokenKind::Assign,
            '<' => TokenKind::Lt,
            _ => TokenKind::Other,
        };
        let end = it.peek().map(|&(i, _)| i).unwrap_or_else(|| code.len());
        tokens.push(Token { kind, start, end });
    }
    tokens
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_cont(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A cursor for recursive-descent matching over a token slice.
///
/// A matcher creates a cursor at a candidate position, consumes the tokens
/// its pattern requires, and simply drops the cursor on a non-match; the
/// underlying slice is never modified.
pub struct Cursor<'a> {
    code: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor over `tokens`, positioned at `pos`.
    pub fn new(code: &'a str, tokens: &'a [Token], pos: usize) -> Self {
        Cursor { code, tokens, pos }
    }

    /// Get the current token index.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Create an independent cursor at the current position, for lookahead
    /// that must not consume anything.
    pub fn fork(&self) -> Cursor<'a> {
        Cursor {
            code: self.code,
            tokens: self.tokens,
            pos: self.pos,
        }
    }

    /// Look at the current token without consuming it.
    pub fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).cloned()
    }

    /// Consume and return the current token.
    pub fn bump(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Consume a token of the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        match self.peek() {
            Some(token) if token.kind == kind => self.bump(),
            _ => None,
        }
    }

    /// Consume an identifier token.
    pub fn ident(&mut self) -> Option<Token> {
        self.eat(TokenKind::Ident)
    }

    /// Consume an identifier with exactly the given text.
    pub fn keyword(&mut self, word: &str) -> Option<Token> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Ident && token.text(self.code) == word => {
                self.bump()
            }
            _ => None,
        }
    }

    /// Consume an integer literal token.
    pub fn int(&mut self) -> Option<Token> {
        self.eat(TokenKind::Int)
    }

    /// Consume up to and including the brace that closes the current block,
    /// assuming the opening brace was already consumed.
    ///
    /// Returns the closing brace and whether any nested braces were seen, or
    /// `None` if the block never closes.
    pub fn block_end(&mut self) -> Option<(Token, bool)> {
        let mut depth = 1;
        let mut nested = false;
        while let Some(token) = self.bump() {
            match token.kind {
                TokenKind::LBrace => {
                    depth += 1;
                    nested = true;
                }
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Some((token, nested));
                    }
                }
                _ => (),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(code: &str) -> Vec<TokenKind> {
        tokenize(code).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn spans_cover_tokens() {
        let code = "for (var i: u32 = 0; i < 3; i++) { x[i] = i; }";
        for token in tokenize(code) {
            assert!(!token.text(code).is_empty());
            assert!(token.text(code).trim() == token.text(code));
        }
    }

    #[test]
    fn increment_is_one_token() {
        use TokenKind::*;
        assert_eq!(kinds("i++"), vec![Ident, Incr]);
        assert_eq!(kinds("i + +1"), vec![Ident, Other, Other, Int]);
    }

    #[test]
    fn comments_are_tokens() {
        use TokenKind::*;
        assert_eq!(kinds(") /* Skipped */ {"), vec![RParen, Comment, LBrace]);
        assert_eq!(kinds("a // rest of line\nb"), vec![Ident, Comment, Ident]);
        // Unterminated block comments run to the end of the input.
        assert_eq!(kinds("a /* open"), vec![Ident, Comment]);
    }

    #[test]
    fn identifiers_swallow_digits() {
        let code = "idx0 = i0;";
        let tokens = tokenize(code);
        assert_eq!(tokens[0].text(code), "idx0");
        assert_eq!(tokens[2].text(code), "i0");
    }
}
