// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

// A byte-driven scanner for calc() values.  Every token is committed
// from a single advancing cursor, so token spans are contiguous and
// cover the whole input.

use std::fmt;

use log::{debug, trace};
use serde::Serialize;
use smallvec::SmallVec;

use crate::common::{ErrorCode, Loc, ParseError};
use crate::options::ParseOptions;
use crate::unicode::*;


#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Whitespace,
    Comment,
    InlineComment,
    String,
    Word,
    Operator,
    Punctuator,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::InlineComment => "inline-comment",
            TokenKind::String => "string",
            TokenKind::Word => "word",
            TokenKind::Operator => "operator",
            TokenKind::Punctuator => "punctuator",
        }
    }

    /// Whitespace and comments carry no meaning and are attached to the
    /// following node as its leading raw text.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::InlineComment
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub value: String,
    #[serde(rename = "source")]
    pub loc: Loc,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, loc: Loc) -> Self {
        Token {
            kind,
            value: value.into(),
            loc,
        }
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    pub fn is_punctuator(&self, value: &str) -> bool {
        self.kind == TokenKind::Punctuator && self.value == value
    }
}

pub struct Tokenizer<'input> {
    text: &'input str,
    bytes: &'input [u8],
    pos: usize,
    last_kind: Option<TokenKind>,
    allow_inline_comments: bool,
    errors: Vec<ParseError>,
}

impl<'input> Tokenizer<'input> {
    pub fn new(text: &'input str, options: ParseOptions) -> Self {
        Tokenizer {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            last_kind: None,
            allow_inline_comments: options.allow_inline_comments,
            errors: vec![],
        }
    }

    /// Lexical errors seen so far, in the order they were found.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// Scans and returns the next token, or `None` once the input is
    /// exhausted.  Malformed input never fails: an unterminated string,
    /// comment or bracket still yields a token running to the end of the
    /// input, and the problem is recorded in `errors`.
    pub fn next_token(&mut self) -> Option<Token> {
        let start = self.pos;
        let c = *self.bytes.get(start)?;

        let (kind, end) = match c {
            c if is_whitespace(c) => (TokenKind::Whitespace, self.skip_whitespace(start + 1)),
            DQUOTE | SQUOTE => (TokenKind::String, self.string(start, c)),
            SLASH => self.slash(start),
            MINUS => self.hyphen(start),
            PLUS => self.plus(start),
            STAR => (TokenKind::Operator, start + 1),
            c if is_punctuator(c) => (TokenKind::Punctuator, start + 1),
            LBRACE | LBRACKET => (TokenKind::Word, self.bracketed_word(start, c)),
            _ => (TokenKind::Word, self.word(start, start + 1)),
        };

        Some(self.commit(kind, start, end))
    }

    fn commit(&mut self, kind: TokenKind, start: usize, end: usize) -> Token {
        let loc = Loc::new(start, end);
        let token = Token::new(kind, &self.text[start..end], loc);
        trace!("token {} {:?} at {}", kind, token.value, loc);

        self.pos = end;
        self.last_kind = Some(kind);
        token
    }

    fn report(&mut self, code: ErrorCode) {
        let index = self.text.len();
        debug!("tokenizer: {} at {}", code, index);
        self.errors.push(ParseError::new(code, index));
    }

    fn skip_whitespace(&self, mut i: usize) -> usize {
        while i < self.bytes.len() && is_whitespace(self.bytes[i]) {
            i += 1;
        }
        i
    }

    // `from` is the first byte not yet examined; the byte at `start` has
    // already decided that this is a word.
    fn word(&mut self, start: usize, from: usize) -> usize {
        let mut i = from;
        while let Some(&c) = self.bytes.get(i) {
            if is_whitespace(c) || is_punctuator(c) || is_quote(c) || matches!(c, PLUS | STAR | SLASH)
            {
                break;
            }
            match c {
                // `10px-5px` or `-1-2`: a word that looks numeric ends
                // before an embedded minus
                MINUS if self.is_numeric_start(start) => return i,
                LBRACE | LBRACKET => {
                    let close = closing_bracket(c).unwrap_or(c);
                    match self.skip_brackets(i + 1, close) {
                        Some(end) => i = end,
                        None => return self.bytes.len(),
                    }
                }
                _ => {}
            }
            i += 1;
        }
        i.min(self.bytes.len())
    }

    fn is_numeric_start(&self, start: usize) -> bool {
        let first = self.bytes[start];
        let second = self.bytes.get(start + 1).copied();
        maybe_number(first) || (is_sign(first) && second.is_some_and(maybe_number))
    }

    fn bracketed_word(&mut self, start: usize, open: u8) -> usize {
        let close = closing_bracket(open).unwrap_or(open);
        match self.skip_brackets(start + 1, close) {
            Some(end) => self.word(start, end + 1),
            None => self.bytes.len(),
        }
    }

    /// Returns the index of the bracket closing the current nesting, or
    /// `None` (after reporting it) if the input ends first.
    fn skip_brackets(&mut self, mut i: usize, mut close: u8) -> Option<usize> {
        let mut pending: SmallVec<[u8; 8]> = SmallVec::new();
        while let Some(&c) = self.bytes.get(i) {
            if c == close {
                match pending.pop() {
                    Some(outer) => close = outer,
                    None => return Some(i),
                }
            } else if let Some(inner) = closing_bracket(c) {
                pending.push(close);
                close = inner;
            }
            i += 1;
        }
        self.report(ErrorCode::EofInBracket);
        None
    }

    fn string(&mut self, start: usize, quote: u8) -> usize {
        let mut i = start + 1;
        while let Some(&c) = self.bytes.get(i) {
            if c == BACKSLASH {
                i += 2;
                continue;
            }
            if c == quote {
                return i + 1;
            }
            i += 1;
        }
        self.report(ErrorCode::EofInString);
        self.bytes.len()
    }

    fn slash(&mut self, start: usize) -> (TokenKind, usize) {
        match self.bytes.get(start + 1) {
            Some(&STAR) => (TokenKind::Comment, self.comment(start)),
            Some(&SLASH) if self.allow_inline_comments => {
                (TokenKind::InlineComment, self.inline_comment(start))
            }
            _ => (TokenKind::Operator, start + 1),
        }
    }

    fn comment(&mut self, start: usize) -> usize {
        match self.text[start + 2..].find("*/") {
            Some(off) => start + 2 + off + 2,
            None => {
                self.report(ErrorCode::EofInComment);
                self.bytes.len()
            }
        }
    }

    // the terminating newline belongs to the comment; CR LF counts as
    // one newline
    fn inline_comment(&self, start: usize) -> usize {
        let mut i = start + 2;
        while let Some(&c) = self.bytes.get(i) {
            match c {
                LF | FF => return i + 1,
                CR if self.bytes.get(i + 1) == Some(&LF) => return i + 2,
                CR => return i + 1,
                _ => i += 1,
            }
        }
        self.bytes.len()
    }

    fn hyphen(&mut self, start: usize) -> (TokenKind, usize) {
        let after_word = self.last_kind == Some(TokenKind::Word);
        match self.bytes.get(start + 1) {
            // signed number, or an identifier like `-webkit-calc` / `--x`
            Some(&c) if !after_word && (c == MINUS || maybe_number(c) || is_letter(c)) => {
                (TokenKind::Word, self.word(start, start + 2))
            }
            _ => (TokenKind::Operator, start + 1),
        }
    }

    fn plus(&mut self, start: usize) -> (TokenKind, usize) {
        let after_word = self.last_kind == Some(TokenKind::Word);
        match self.bytes.get(start + 1) {
            Some(&c) if !after_word && maybe_number(c) => {
                (TokenKind::Word, self.word(start, start + 2))
            }
            _ => (TokenKind::Operator, start + 1),
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenizes all of `text`, returning the tokens alongside any lexical
/// errors.
pub fn tokenize(text: &str, options: ParseOptions) -> (Vec<Token>, Vec<ParseError>) {
    let mut tokenizer = Tokenizer::new(text, options);
    let tokens: Vec<Token> = tokenizer.by_ref().collect();
    (tokens, tokenizer.take_errors())
}
